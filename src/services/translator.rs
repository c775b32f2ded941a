//! Text translation and language detection.

use super::memories::object;
use crate::error::{LaraError, ResponseError};
use crate::http::{decode_content, ApiClient};
use crate::types::{DetectResult, TextResult, TranslateInput, TranslateOptions};
use serde_json::{json, Value};
use std::sync::Arc;

/// Service for text translation.
pub struct TranslatorService {
    client: Arc<ApiClient>,
}

impl TranslatorService {
    /// Create a new translator service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Supported language codes.
    pub async fn languages(&self) -> Result<Vec<String>, LaraError> {
        let content = self.client.get("/languages").await?;
        decode_content(content, "languages")
    }

    /// Translate text.
    ///
    /// The translation in the result has the same shape as `input`.
    pub async fn translate(
        &self,
        input: impl Into<TranslateInput>,
        options: &TranslateOptions,
    ) -> Result<TextResult, LaraError> {
        let input = input.into();

        let mut body = object(serde_json::to_value(options).map_err(ResponseError::from)?);
        body.insert("q".to_string(), input.to_query());

        let content = self.client.post("/translate", Some(body)).await?;
        let content = content.ok_or_else(|| ResponseError::EmptyContent {
            operation: "translate".to_string(),
        })?;

        Ok(TextResult::from_content(content, input.shape())?)
    }

    /// Detect the language of text.
    pub async fn detect(
        &self,
        input: impl Into<TranslateInput>,
        hint: Option<&str>,
        passlist: Option<&[&str]>,
    ) -> Result<DetectResult, LaraError> {
        let input = input.into();
        let body = object(json!({
            "q": input.to_query(),
            "hint": hint,
            "passlist": passlist.map(|langs| langs.iter().map(|l| Value::from(*l)).collect::<Vec<_>>()),
        }));

        let content = self.client.post("/detect", Some(body)).await?;
        decode_content(content, "detect")
    }
}

impl std::fmt::Debug for TranslatorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaraConfig;
    use crate::mocks::{MockResponse, MockTransport, TestFixtures};
    use crate::signing::LaraSigner;
    use crate::types::{TextBlock, Translation};

    fn service(transport: Arc<MockTransport>) -> TranslatorService {
        let client = Arc::new(ApiClient::new(
            Arc::new(LaraConfig::default()),
            transport,
            Arc::new(LaraSigner::unsigned()),
        ));
        TranslatorService::new(client)
    }

    fn body_of(transport: &MockTransport) -> Value {
        serde_json::from_slice(&transport.last_request().unwrap().body.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_translate_text() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            TestFixtures::text_result_json(json!("Bonjour")),
        )));
        let service = service(transport.clone());

        let result = service
            .translate("Hello", &TranslateOptions::new("fr-FR").with_source("en-US"))
            .await
            .unwrap();

        assert_eq!(result.translation, Translation::Text("Bonjour".to_string()));

        let body = body_of(&transport);
        assert_eq!(body["q"], json!("Hello"));
        assert_eq!(body["target"], json!("fr-FR"));
        assert_eq!(body["source"], json!("en-US"));
        assert!(body.get("adapt_to").is_none());
    }

    #[tokio::test]
    async fn test_translate_blocks() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            TestFixtures::text_result_json(json!([
                {"text": "Bonjour", "translatable": true},
                {"text": "<br>", "translatable": false}
            ])),
        )));
        let service = service(transport.clone());

        let input = vec![TextBlock::new("Hello"), TextBlock::verbatim("<br>")];
        let result = service
            .translate(input, &TranslateOptions::new("fr-FR"))
            .await
            .unwrap();

        match result.translation {
            Translation::Blocks(blocks) => assert!(!blocks[1].translatable),
            other => panic!("unexpected translation: {:?}", other),
        }
        assert_eq!(body_of(&transport)["q"][1]["translatable"], json!(false));
    }

    #[tokio::test]
    async fn test_languages() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            json!(["en-US", "fr-FR", "it-IT"]),
        )));
        let service = service(transport);

        assert_eq!(service.languages().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_detect() {
        let transport = Arc::new(MockTransport::with_default(MockResponse::json_content(
            json!({"language": "it-IT", "content_type": "text/plain"}),
        )));
        let service = service(transport.clone());

        let result = service
            .detect("Ciao mondo", None, Some(&["it-IT", "es-ES"]))
            .await
            .unwrap();

        assert_eq!(result.language, "it-IT");
        let body = body_of(&transport);
        assert_eq!(body, json!({"q": "Ciao mondo", "passlist": ["it-IT", "es-ES"]}));
    }
}
