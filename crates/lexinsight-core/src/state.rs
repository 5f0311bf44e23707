use crate::error::AnalysisFailure;
use crate::types::CaseAnalysis;

/// Lifecycle of one analysis request as seen by whoever triggered it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    /// Request issued, no response yet.
    Awaiting,
    /// Upstream accepted; deltas are arriving.
    Streaming,
    /// Stream ended; turning the reply into an analysis.
    Normalizing,
    Done(Box<CaseAnalysis>),
    Failed(AnalysisFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Submit,
    StreamOpened,
    StreamEnded,
    Normalized(Box<CaseAnalysis>),
    Fail(AnalysisFailure),
    Reset,
}

impl AnalysisState {
    /// Pure transition. `None` means the event is not valid in this state
    /// and the state is left as it was.
    pub fn next(&self, event: AnalysisEvent) -> Option<AnalysisState> {
        use AnalysisEvent as E;
        use AnalysisState as S;
        match (self, event) {
            (S::Idle | S::Done(_) | S::Failed(_), E::Submit) => Some(S::Awaiting),
            (S::Awaiting, E::StreamOpened) => Some(S::Streaming),
            (S::Streaming, E::StreamEnded) => Some(S::Normalizing),
            (S::Normalizing, E::Normalized(analysis)) => Some(S::Done(analysis)),
            (S::Awaiting | S::Streaming, E::Fail(reason)) => Some(S::Failed(reason)),
            // Rejected input never leaves the resting states.
            (S::Idle | S::Done(_) | S::Failed(_), E::Fail(reason)) => Some(S::Failed(reason)),
            (S::Done(_) | S::Failed(_) | S::Idle, E::Reset) => Some(S::Idle),
            _ => None,
        }
    }

    /// A request is outstanding; new submissions must be refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Awaiting | Self::Streaming | Self::Normalizing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Awaiting => "awaiting",
            Self::Streaming => "streaming",
            Self::Normalizing => "normalizing",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }

    pub fn analysis(&self) -> Option<&CaseAnalysis> {
        match self {
            Self::Done(a) => Some(a),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match self {
            Self::Failed(f) => Some(f),
            _ => None,
        }
    }
}
