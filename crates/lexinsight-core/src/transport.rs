use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::error::AnalysisFailure;

/// Raw response body of a successful analysis request, pulled chunk by
/// chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send>>;

/// Issues one analysis request and hands back the SSE body.
///
/// Implementations map non-success statuses through
/// [`AnalysisFailure::from_status`] before any body is consumed, so a
/// returned stream always belongs to an accepted request.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn open(&self, case_text: &str) -> Result<ByteStream, AnalysisFailure>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: AnalysisTransport + ?Sized> AnalysisTransport for Box<T> {
    async fn open(&self, case_text: &str) -> Result<ByteStream, AnalysisFailure> {
        (**self).open(case_text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: AnalysisTransport + ?Sized> AnalysisTransport for std::sync::Arc<T> {
    async fn open(&self, case_text: &str) -> Result<ByteStream, AnalysisFailure> {
        (**self).open(case_text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
