use async_trait::async_trait;
use lexinsight_core::{
    config::Config,
    transport::{AnalysisTransport, ByteStream},
    types::AnalysisProfile,
    AnalysisFailure,
};
use tracing::{error, info};

use crate::{instruction::build_request, response};

/// Talks to an OpenAI-compatible chat-completions gateway directly, with
/// the profile's system instruction and `stream: true`.
pub struct GatewayTransport {
    pub url: String,
    api_key: String,
    pub model: String,
    profile: AnalysisProfile,
    client: reqwest::Client,
}

impl GatewayTransport {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        profile: AnalysisProfile,
    ) -> Result<Self, AnalysisFailure> {
        Ok(Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            profile,
            client: response::build_client()?,
        })
    }

    pub fn from_config(config: &Config, profile: AnalysisProfile) -> Result<Self, AnalysisFailure> {
        Self::new(
            config.gateway_url.clone(),
            config.gateway_api_key.clone(),
            config.model.clone(),
            profile,
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl AnalysisTransport for GatewayTransport {
    async fn open(&self, case_text: &str) -> Result<ByteStream, AnalysisFailure> {
        if !self.is_configured() {
            error!(category = "relay", "GATEWAY_API_KEY is not configured");
            return Err(AnalysisFailure::Service {
                status: 500,
                message: "AI service not configured".into(),
            });
        }

        let body = build_request(&self.profile, &self.model, case_text);
        info!(
            category = "relay",
            model = %self.model,
            profile = %self.profile.name,
            case_len = case_text.len(),
            "calling chat-completions gateway"
        );

        let sent = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;
        response::into_byte_stream(sent, "gateway").await
    }

    fn name(&self) -> &str {
        "gateway"
    }
}
