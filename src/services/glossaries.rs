//! Glossaries service.

use super::memories::object;
use crate::config::LaraConfig;
use crate::error::LaraError;
use crate::http::{decode_content, ApiClient, FilePart, HttpMethod};
use crate::polling::{Poller, UpdateCallback};
use crate::transfer;
use crate::types::{Glossary, GlossaryCounts, GlossaryExportFormat, ImportJob};
use bytes::Bytes;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Service for glossary operations.
pub struct GlossariesService {
    client: Arc<ApiClient>,
    config: Arc<LaraConfig>,
}

impl GlossariesService {
    /// Create a new glossaries service.
    pub fn new(client: Arc<ApiClient>, config: Arc<LaraConfig>) -> Self {
        Self { client, config }
    }

    /// List the glossaries visible to the caller.
    pub async fn list(&self) -> Result<Vec<Glossary>, LaraError> {
        let content = self.client.get("/glossaries").await?;
        decode_content(content, "glossaries.list")
    }

    /// Create a glossary.
    pub async fn create(&self, name: &str) -> Result<Glossary, LaraError> {
        let body = object(json!({ "name": name }));
        let content = self.client.post("/glossaries", Some(body)).await?;
        decode_content(content, "glossaries.create")
    }

    /// Get a glossary, `None` when it does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<Glossary>, LaraError> {
        match self.client.get(&format!("/glossaries/{}", id)).await {
            Ok(content) => decode_content(content, "glossaries.get").map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rename a glossary.
    pub async fn update(&self, id: &str, name: &str) -> Result<Glossary, LaraError> {
        let body = object(json!({ "name": name }));
        let content = self
            .client
            .put(&format!("/glossaries/{}", id), Some(body))
            .await?;
        decode_content(content, "glossaries.update")
    }

    /// Delete a glossary and return its last snapshot.
    pub async fn delete(&self, id: &str) -> Result<Glossary, LaraError> {
        let content = self
            .client
            .delete(&format!("/glossaries/{}", id), None)
            .await?;
        decode_content(content, "glossaries.delete")
    }

    /// Term counts of a glossary.
    pub async fn counts(&self, id: &str) -> Result<GlossaryCounts, LaraError> {
        let content = self.client.get(&format!("/glossaries/{}/counts", id)).await?;
        decode_content(content, "glossaries.counts")
    }

    /// Import a CSV file into a glossary.
    ///
    /// The file is gzip-compressed before upload.
    pub async fn import_csv(&self, id: &str, csv: impl AsRef<Path>) -> Result<ImportJob, LaraError> {
        let csv = csv.as_ref();
        let data = transfer::read_compressed(csv).await?;
        let filename = format!("{}.gz", transfer::file_name(csv, "glossary.csv"));

        debug!(glossary_id = id, bytes = data.len(), "Importing CSV");

        let body = object(json!({ "compression": "gzip" }));
        let content = self
            .client
            .request(
                HttpMethod::POST,
                &format!("/glossaries/{}/import", id),
                Some(body),
                vec![FilePart::new("csv", filename, data)],
            )
            .await?;
        decode_content(content, "glossaries.import_csv")
    }

    /// Get the status of an import.
    pub async fn get_import_status(&self, job_id: &str) -> Result<ImportJob, LaraError> {
        let content = self
            .client
            .get(&format!("/glossaries/imports/{}", job_id))
            .await?;
        decode_content(content, "glossaries.get_import_status")
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

    /// Export a glossary as raw file content.
    pub async fn export(
        &self,
        id: &str,
        format: GlossaryExportFormat,
        source: Option<&str>,
    ) -> Result<Bytes, LaraError> {
        let body = object(json!({
            "content_type": format.as_str(),
            "source": source,
        }));
        self.client
            .request_raw(
                HttpMethod::GET,
                &format!("/glossaries/{}/export", id),
                Some(body),
            )
            .await
    }
}

impl std::fmt::Debug for GlossariesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlossariesService").finish_non_exhaustive()
    }
}
