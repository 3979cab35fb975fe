use anyhow::{Context, Result};
use tracing::debug;

use super::types::{
    EvaluateQuestionsRequest, EvaluateQuestionsResponse, FillFormRequest, FillFormResponse,
};

/// Remote LLM boundary.
///
/// The backend performs the actual provider calls; this crate only
/// carries the request/response contract. Network and HTTP failures
/// surface as a single generic error: callers treat every remote
/// failure the same way (roll back, notify, retry on the next
/// qualifying event).
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    async fn fill_form(&self, request: FillFormRequest) -> Result<FillFormResponse>;

    async fn evaluate_questions(
        &self,
        request: EvaluateQuestionsRequest,
    ) -> Result<EvaluateQuestionsResponse>;
}

/// JSON-over-HTTP implementation against the backend service.
pub struct HttpLlmService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLlmService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: serde::Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("request to {} rejected", url))?;

        response
            .json()
            .await
            .with_context(|| format!("malformed response from {}", url))
    }
}

#[async_trait::async_trait]
impl LlmService for HttpLlmService {
    async fn fill_form(&self, request: FillFormRequest) -> Result<FillFormResponse> {
        self.post_json("/form-output/fill", &request).await
    }

    async fn evaluate_questions(
        &self,
        request: EvaluateQuestionsRequest,
    ) -> Result<EvaluateQuestionsResponse> {
        self.post_json("/live-questions/evaluate", &request).await
    }
}
