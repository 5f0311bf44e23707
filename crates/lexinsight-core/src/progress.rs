//! Cosmetic progress labels derived from how much content has streamed in.
//!
//! The labels carry no meaning about the analysis itself. The only
//! guarantees are that the index never moves backwards, never runs past
//! the end of the label list, and that the same content-length trajectory
//! always yields the same labels.

/// Content-length window; one label per boundary crossing.
pub const PROGRESS_WINDOW: usize = 500;

/// Named points in a request's lifecycle, shown independently of the
/// content-length labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Initializing,
    Connecting,
    /// Upstream accepted the request and the stream is open.
    Receiving,
    Finalizing,
}

impl Milestone {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing analysis...",
            Self::Connecting => "Connecting to AI analysis engine...",
            Self::Receiving => "Analyzing legal provisions and jurisdiction...",
            Self::Finalizing => "Processing analysis results...",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressReporter {
    labels: Vec<String>,
    /// Number of labels handed out so far.
    index: usize,
    window: usize,
    /// Highest window boundary that produced a label.
    last_window: usize,
}

impl ProgressReporter {
    pub fn new(labels: Vec<String>) -> Self {
        Self::with_window(labels, PROGRESS_WINDOW)
    }

    pub fn with_window(labels: Vec<String>, window: usize) -> Self {
        Self {
            labels,
            index: 0,
            window: window.max(1),
            last_window: 0,
        }
    }

    /// Report the current accumulated content length. Returns the next label
    /// when a window boundary has been crossed since the last label and
    /// labels remain. Observing the same length twice never advances.
    pub fn observe(&mut self, content_len: usize) -> Option<&str> {
        let window_no = content_len / self.window;
        if window_no <= self.last_window || self.index >= self.labels.len() {
            return None;
        }
        let label = self.labels.get(self.index)?;
        self.last_window = window_no;
        self.index += 1;
        Some(label.as_str())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The most recently handed-out label.
    pub fn current(&self) -> Option<&str> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.labels.len()
    }
}
