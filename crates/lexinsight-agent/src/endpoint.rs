use async_trait::async_trait;
use lexinsight_core::{
    config::Config,
    transport::{AnalysisTransport, ByteStream},
    AnalysisFailure,
};
use serde::Serialize;
use tracing::info;

use crate::response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeCaseRequest<'a> {
    case_text: &'a str,
}

/// Posts `{caseText}` to the relay, which adds the instruction and holds
/// the gateway credential.
pub struct EndpointTransport {
    pub url: String,
    publishable_key: String,
    client: reqwest::Client,
}

impl EndpointTransport {
    pub fn new(url: impl Into<String>, publishable_key: impl Into<String>) -> Result<Self, AnalysisFailure> {
        Ok(Self {
            url: url.into(),
            publishable_key: publishable_key.into(),
            client: response::build_client()?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalysisFailure> {
        Self::new(
            config.analyze_endpoint.clone(),
            config.analyze_publishable_key.clone(),
        )
    }
}

#[async_trait]
impl AnalysisTransport for EndpointTransport {
    async fn open(&self, case_text: &str) -> Result<ByteStream, AnalysisFailure> {
        info!(
            category = "relay",
            url = %self.url,
            case_len = case_text.len(),
            "posting case to analysis endpoint"
        );
        let mut request = self
            .client
            .post(&self.url)
            .json(&AnalyzeCaseRequest { case_text });
        if !self.publishable_key.is_empty() {
            request = request.bearer_auth(&self.publishable_key);
        }
        response::into_byte_stream(request.send().await, "endpoint").await
    }

    fn name(&self) -> &str {
        "endpoint"
    }
}
