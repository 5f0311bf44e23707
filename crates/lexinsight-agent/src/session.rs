use std::time::Duration;

use lexinsight_core::{
    document::CaseInput,
    history::HistoryStore,
    normalize::normalize,
    progress::{Milestone, ProgressReporter},
    state::{AnalysisEvent, AnalysisState},
    stream::{consume, DeltaAccumulator},
    transport::AnalysisTransport,
    types::{AnalysisProfile, CaseAnalysis},
    AnalysisFailure,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// One user's analysis session: a transport, the state machine and the
/// bounded history. Analyses run one at a time; `analyze` takes `&mut self`.
pub struct AnalysisSession<T: AnalysisTransport> {
    transport: T,
    profile: AnalysisProfile,
    timeout: Duration,
    state: AnalysisState,
    history: HistoryStore,
    progress: Option<UnboundedSender<String>>,
}

impl<T: AnalysisTransport> AnalysisSession<T> {
    pub fn new(transport: T, profile: AnalysisProfile, timeout: Duration) -> Self {
        Self {
            transport,
            profile,
            timeout,
            state: AnalysisState::Idle,
            history: HistoryStore::new(),
            progress: None,
        }
    }

    /// Every milestone and content-length label is sent here as it happens.
    pub fn with_progress(mut self, tx: UnboundedSender<String>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn profile(&self) -> &AnalysisProfile {
        &self.profile
    }

    /// Back to `Idle` after a finished or failed analysis.
    pub fn reset(&mut self) {
        self.advance(AnalysisEvent::Reset);
    }

    /// Run one analysis to completion. On success the record is also
    /// prepended to the session history; on any failure nothing is kept.
    pub async fn analyze(&mut self, input: &CaseInput) -> Result<CaseAnalysis, AnalysisFailure> {
        if self.state.is_busy() {
            return Err(AnalysisFailure::Busy);
        }
        let case_text = match input.case_text() {
            Ok(text) => text,
            Err(failure) => return Err(self.fail(failure)),
        };

        emit(self.progress.as_ref(), Milestone::Initializing.label());
        if !self.advance(AnalysisEvent::Submit) {
            return Err(AnalysisFailure::Busy);
        }
        emit(self.progress.as_ref(), Milestone::Connecting.label());

        info!(
            category = "analysis",
            transport = self.transport.name(),
            case_len = case_text.len(),
            timeout_s = self.timeout.as_secs(),
            "starting case analysis"
        );

        let reply = tokio::time::timeout(
            self.timeout,
            stream_reply(
                &self.transport,
                &mut self.state,
                &self.profile.progress_labels,
                self.progress.as_ref(),
                &case_text,
            ),
        )
        .await;

        let content = match reply {
            Ok(Ok(content)) => content,
            Ok(Err(failure)) => return Err(self.fail(failure)),
            Err(_) => {
                warn!(
                    category = "analysis",
                    timeout_s = self.timeout.as_secs(),
                    "analysis timed out, discarding partial reply"
                );
                let secs = self.timeout.as_secs();
                return Err(self.fail(AnalysisFailure::TimedOut { secs }));
            }
        };

        self.advance(AnalysisEvent::StreamEnded);
        emit(self.progress.as_ref(), Milestone::Finalizing.label());

        let analysis = normalize(&content, &input.description);
        self.advance(AnalysisEvent::Normalized(Box::new(analysis.clone())));
        let evicting = self.history.len() == lexinsight_core::history::MAX_HISTORY_ITEMS;
        self.history.push(analysis.clone());
        info!(
            category = "analysis",
            id = %analysis.id,
            domain = %analysis.classification.primary_domain,
            success = %analysis.risk_outcome.success_probability,
            history = self.history.len(),
            evicted = evicting,
            "case analysis complete"
        );
        Ok(analysis)
    }

    fn advance(&mut self, event: AnalysisEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!(category = "analysis", from = self.state.name(), to = next.name(), "state change");
                self.state = next;
                true
            }
            None => false,
        }
    }

    fn fail(&mut self, failure: AnalysisFailure) -> AnalysisFailure {
        warn!(
            category = "analysis",
            title = failure.title(),
            "analysis failed: {}",
            failure
        );
        self.advance(AnalysisEvent::Fail(failure.clone()));
        failure
    }
}

fn emit(sink: Option<&UnboundedSender<String>>, label: &str) {
    if let Some(tx) = sink {
        let _ = tx.send(label.to_string());
    }
}

/// Open the stream and read it to termination. Dropping this future (on
/// timeout) drops the response body and with it the connection.
async fn stream_reply<T: AnalysisTransport>(
    transport: &T,
    state: &mut AnalysisState,
    labels: &[String],
    sink: Option<&UnboundedSender<String>>,
    case_text: &str,
) -> Result<String, AnalysisFailure> {
    let stream = transport.open(case_text).await?;
    if let Some(next) = state.next(AnalysisEvent::StreamOpened) {
        *state = next;
    }
    emit(sink, Milestone::Receiving.label());

    let mut acc = DeltaAccumulator::new(ProgressReporter::new(labels.to_vec()));
    consume(stream, &mut acc, |label| emit(sink, &label)).await?;

    info!(
        category = "analysis",
        content_chars = acc.content_chars(),
        events = acc.events(),
        terminated = acc.is_done(),
        finish_reason = acc.finish_reason().unwrap_or(""),
        "analysis stream finished"
    );
    Ok(acc.into_content())
}
