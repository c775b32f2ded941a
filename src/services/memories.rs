//! Memories service for translation memory operations.

use crate::config::LaraConfig;
use crate::error::LaraError;
use crate::http::{decode_content, ApiClient, FilePart, HttpMethod};
use crate::polling::{Poller, UpdateCallback};
use crate::transfer;
use crate::types::{IdSelector, ImportJob, Memory, TranslationUnit};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Result of [`MemoriesService::connect`], shaped like its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Connected {
    /// Connection by a single id.
    One(Option<Memory>),
    /// Connection by a list of ids.
    Many(Vec<Memory>),
}

impl Connected {
    /// The memory connected by a single id.
    pub fn one(self) -> Option<Memory> {
        match self {
            Connected::One(memory) => memory,
            Connected::Many(mut memories) => {
                if memories.is_empty() {
                    None
                } else {
                    Some(memories.remove(0))
                }
            }
        }
    }

    /// All connected memories.
    pub fn into_vec(self) -> Vec<Memory> {
        match self {
            Connected::One(memory) => memory.into_iter().collect(),
            Connected::Many(memories) => memories,
        }
    }
}

/// Service for translation memory operations.
pub struct MemoriesService {
    client: Arc<ApiClient>,
    config: Arc<LaraConfig>,
}

impl MemoriesService {
    /// Create a new memories service.
    pub fn new(client: Arc<ApiClient>, config: Arc<LaraConfig>) -> Self {
        Self { client, config }
    }

    /// List the memories visible to the caller.
    pub async fn list(&self) -> Result<Vec<Memory>, LaraError> {
        let content = self.client.get("/memories").await?;
        decode_content(content, "memories.list")
    }

    /// Create a memory.
    pub async fn create(&self, name: &str, external_id: Option<&str>) -> Result<Memory, LaraError> {
        let body = object(json!({
            "name": name,
            "external_id": external_id,
        }));
        let content = self.client.post("/memories", Some(body)).await?;
        decode_content(content, "memories.create")
    }

    /// Get a memory, `None` when it does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<Memory>, LaraError> {
        match self.client.get(&format!("/memories/{}", id)).await {
            Ok(content) => decode_content(content, "memories.get").map(Some),
            Err(e) if e.is_not_found() => {
                debug!(memory_id = id, "Memory not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Rename a memory.
    pub async fn update(&self, id: &str, name: &str) -> Result<Memory, LaraError> {
        let body = object(json!({ "name": name }));
        let content = self.client.put(&format!("/memories/{}", id), Some(body)).await?;
        decode_content(content, "memories.update")
    }

    /// Delete a memory and return its last snapshot.
    pub async fn delete(&self, id: &str) -> Result<Memory, LaraError> {
        let content = self.client.delete(&format!("/memories/{}", id), None).await?;
        decode_content(content, "memories.delete")
    }

    /// Connect shared memories to the caller's account.
    ///
    /// A single id yields [`Connected::One`], a list yields
    /// [`Connected::Many`] even when it holds one id.
    pub async fn connect(&self, ids: impl Into<IdSelector>) -> Result<Connected, LaraError> {
        let ids = ids.into();
        let body = object(json!({ "ids": ids.to_vec() }));
        let content = self.client.post("/memories/connect", Some(body)).await?;
        let memories: Vec<Memory> = decode_content(content, "memories.connect")?;

        Ok(match ids {
            IdSelector::One(_) => Connected::One(memories.into_iter().next()),
            IdSelector::Many(_) => Connected::Many(memories),
        })
    }

    /// Add a translation unit to one or more memories.
    pub async fn add_translation(
        &self,
        ids: impl Into<IdSelector>,
        unit: &TranslationUnit,
    ) -> Result<ImportJob, LaraError> {
        self.change_content(HttpMethod::PUT, ids.into(), unit).await
    }

    /// Remove a translation unit from one or more memories.
    ///
    /// Without a `tuid` every unit matching the other fields is removed.
    pub async fn delete_translation(
        &self,
        ids: impl Into<IdSelector>,
        unit: &TranslationUnit,
    ) -> Result<ImportJob, LaraError> {
        self.change_content(HttpMethod::DELETE, ids.into(), unit).await
    }

    async fn change_content(
        &self,
        method: HttpMethod,
        ids: IdSelector,
        unit: &TranslationUnit,
    ) -> Result<ImportJob, LaraError> {
        let mut body = object(serde_json::to_value(unit).map_err(crate::error::ResponseError::from)?);

        let path = match ids {
            IdSelector::One(id) => format!("/memories/{}/content", id),
            IdSelector::Many(ids) => {
                body.insert("ids".to_string(), Value::from(ids));
                "/memories/content".to_string()
            }
        };

        let content = self
            .client
            .request(method, &path, Some(body), Vec::new())
            .await?;
        decode_content(content, "memories.content")
    }

    /// Import a TMX file into a memory.
    ///
    /// The file is gzip-compressed before upload.
    pub async fn import_tmx(&self, id: &str, tmx: impl AsRef<Path>) -> Result<ImportJob, LaraError> {
        let tmx = tmx.as_ref();
        let data = transfer::read_compressed(tmx).await?;
        let filename = format!("{}.gz", transfer::file_name(tmx, "memory.tmx"));

        debug!(memory_id = id, bytes = data.len(), "Importing TMX");

        let body = object(json!({ "compression": "gzip" }));
        let content = self
            .client
            .request(
                HttpMethod::POST,
                &format!("/memories/{}/import", id),
                Some(body),
                vec![FilePart::new("tmx", filename, data)],
            )
            .await?;
        decode_content(content, "memories.import_tmx")
    }

    /// Get the status of an import.
    pub async fn get_import_status(&self, job_id: &str) -> Result<ImportJob, LaraError> {
        let content = self.client.get(&format!("/memories/imports/{}", job_id)).await?;
        decode_content(content, "memories.get_import_status")
    }

    /// Wait until an import completes.
    ///
    /// `max_wait` of zero waits indefinitely.
    pub async fn wait_for_import(
        &self,
        job: &ImportJob,
        on_update: Option<UpdateCallback<'_, ImportJob>>,
        max_wait: Duration,
    ) -> Result<ImportJob, LaraError> {
        let poller = Poller::new(self.config.poll_config(max_wait));
        let job_id = job.id.as_str();

        poller
            .wait_for(
                || self.get_import_status(job_id),
                ImportJob::is_complete,
                on_update,
            )
            .await
    }
}

impl std::fmt::Debug for MemoriesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoriesService").finish_non_exhaustive()
    }
}

/// Unwrap a `json!` object literal.
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport, TestFixtures};
    use crate::signing::LaraSigner;

    fn service(transport: Arc<MockTransport>) -> MemoriesService {
        let config = Arc::new(LaraConfig::default());
        let client = Arc::new(ApiClient::new(
            config.clone(),
            transport,
            Arc::new(LaraSigner::unsigned()),
        ));
        MemoriesService::new(client, config)
    }

    fn body_of(transport: &MockTransport) -> Value {
        let request = transport.last_request().unwrap();
        serde_json::from_slice(&request.body.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_create_strips_missing_external_id() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            TestFixtures::memory_json("mem_1", "Demo"),
        )));
        let service = service(transport.clone());

        let memory = service.create("Demo", None).await.unwrap();

        assert_eq!(memory.id, "mem_1");
        assert_eq!(body_of(&transport), json!({"name": "Demo"}));
    }

    #[tokio::test]
    async fn test_connect_single_id() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            json!([TestFixtures::memory_json("mem_1", "Shared")]),
        )));
        let service = service(transport.clone());

        let connected = service.connect("mem_1").await.unwrap();

        assert!(matches!(connected, Connected::One(Some(ref m)) if m.id == "mem_1"));
        assert_eq!(body_of(&transport), json!({"ids": ["mem_1"]}));
    }

    #[tokio::test]
    async fn test_connect_single_id_without_result() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(json!([]))));
        let service = service(transport);

        assert_eq!(service.connect("mem_x").await.unwrap(), Connected::One(None));
    }

    #[tokio::test]
    async fn test_connect_list_of_one_stays_a_list() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            json!([TestFixtures::memory_json("mem_1", "Shared")]),
        )));
        let service = service(transport);

        let connected = service.connect(vec!["mem_1"]).await.unwrap();
        match connected {
            Connected::Many(memories) => assert_eq!(memories.len(), 1),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_translation_single_memory_path() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            TestFixtures::import_job_json("imp_1", 0.0),
        )));
        let service = service(transport.clone());

        let unit = TranslationUnit::new("en-US", "it-IT", "Hello", "Ciao");
        service.add_translation("mem_1", &unit).await.unwrap();

        let request = transport.last_request().unwrap();
        assert!(request.url.ends_with("/memories/mem_1/content"));
        assert_eq!(request.get_header("x-http-method-override"), Some("PUT"));

        let body = body_of(&transport);
        assert!(body.get("tuid").is_none());
        assert!(body.get("ids").is_none());
    }

    #[tokio::test]
    async fn test_delete_translation_many_memories_path() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            TestFixtures::import_job_json("imp_1", 0.0),
        )));
        let service = service(transport.clone());

        let unit = TranslationUnit::new("en-US", "it-IT", "Hello", "Ciao");
        service
            .delete_translation(vec!["mem_1", "mem_2"], &unit)
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert!(request.url.ends_with("/memories/content"));
        assert_eq!(request.get_header("x-http-method-override"), Some("DELETE"));

        let body = body_of(&transport);
        assert_eq!(body["ids"], json!(["mem_1", "mem_2"]));
        assert!(body.get("tuid").is_none());
    }

    #[tokio::test]
    async fn test_get_not_found_is_none() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::api_error(
            404,
            "NotFoundError",
            "Memory not found",
        )));
        let service = service(transport);

        assert_eq!(service.get("mem_missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_server_error_propagates() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::api_error(
            500,
            "InternalServerError",
            "boom",
        )));
        let service = service(transport);

        let err = service.get("mem_1").await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_import_polls_until_complete() {
        let transport = Arc::new(MockTransport::with_responses(vec![
            MockResponse::json_content(TestFixtures::import_job_json("imp_1", 0.25)),
            MockResponse::json_content(TestFixtures::import_job_json("imp_1", 0.75)),
            MockResponse::json_content(TestFixtures::import_job_json("imp_1", 1.0)),
        ]));
        let service = service(transport.clone());

        let job: ImportJob =
            serde_json::from_value(TestFixtures::import_job_json("imp_1", 0.0)).unwrap();
        let mut progress = Vec::new();
        let mut record = |job: &ImportJob| progress.push(job.progress);
        let callback: UpdateCallback<'_, ImportJob> = &mut record;

        let done = service
            .wait_for_import(&job, Some(callback), Duration::ZERO)
            .await
            .unwrap();

        assert!(done.is_complete());
        assert_eq!(progress, vec![0.25, 0.75, 1.0]);
        assert!(transport
            .last_request()
            .unwrap()
            .url
            .ends_with("/memories/imports/imp_1"));
    }
}
