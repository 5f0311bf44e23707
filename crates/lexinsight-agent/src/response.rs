use futures_util::TryStreamExt;
use lexinsight_core::{transport::ByteStream, AnalysisFailure};
use tracing::{info, warn};

/// Map a sent request to either its SSE body or the failure its status
/// stands for. Error bodies are read in full; success bodies are not
/// touched.
pub(crate) async fn into_byte_stream(
    sent: Result<reqwest::Response, reqwest::Error>,
    target: &str,
) -> Result<ByteStream, AnalysisFailure> {
    let response = match sent {
        Ok(r) => r,
        Err(e) => {
            warn!(category = "relay", via = target, "analysis request failed: {}", e);
            return Err(AnalysisFailure::Transport(e.to_string()));
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(
            category = "relay",
            via = target,
            status = status.as_u16(),
            "analysis service returned non-200: {}",
            body
        );
        return Err(AnalysisFailure::from_status(status.as_u16(), &body));
    }

    info!(category = "relay", via = target, "analysis stream opened");
    Ok(Box::pin(response.bytes_stream().map_err(anyhow::Error::from)))
}

pub(crate) fn build_client() -> Result<reqwest::Client, AnalysisFailure> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| AnalysisFailure::Transport(e.to_string()))
}
