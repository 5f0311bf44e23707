use thiserror::Error;

/// Every way an analysis request can end without producing a record.
///
/// Unparseable model output is deliberately absent: it is absorbed by the
/// normalizer and still yields a complete analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error("no case description or document supplied")]
    EmptyInput,

    #[error("an analysis is already in progress")]
    Busy,

    /// Upstream 429.
    #[error("rate limited by the analysis service")]
    RateLimited,

    /// Upstream 402.
    #[error("analysis service quota exhausted")]
    QuotaExhausted,

    #[error("analysis timed out after {secs}s")]
    TimedOut { secs: u64 },

    /// Any other non-2xx answer.
    #[error("analysis service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// Connection, body read or other transport-level failure.
    #[error("analysis request failed: {0}")]
    Transport(String),
}

impl AnalysisFailure {
    /// Map a non-success HTTP status to its failure kind.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::QuotaExhausted,
            _ => Self::Service {
                status,
                message: error_message(body),
            },
        }
    }

    /// Short user-facing heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Input required",
            Self::Busy => "Analysis in progress",
            Self::RateLimited => "Rate limit exceeded",
            Self::QuotaExhausted => "Service unavailable",
            Self::TimedOut { .. } | Self::Service { .. } | Self::Transport(_) => "Analysis Failed",
        }
    }

    /// User-facing explanation; each failure kind reads differently.
    pub fn description(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Please describe your case or upload a document.",
            Self::Busy => "Please wait for the current analysis to finish.",
            Self::RateLimited => "Too many requests. Please wait a moment and try again.",
            Self::QuotaExhausted => "AI service quota reached. Please try again later.",
            Self::TimedOut { .. } => {
                "The analysis took too long. Please try again with a shorter input or retry."
            }
            Self::Service { .. } | Self::Transport(_) => {
                "Unable to complete the analysis. Please try again."
            }
        }
    }

    /// HTTP status to report this failure with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyInput => 400,
            Self::Busy => 409,
            Self::RateLimited => 429,
            Self::QuotaExhausted => 402,
            Self::TimedOut { .. } => 504,
            Self::Service { .. } | Self::Transport(_) => 502,
        }
    }

    /// Worth retrying right away once the user has waited a moment.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::TimedOut { .. } | Self::Transport(_) | Self::Busy
        )
    }
}

/// Pull `{"error": "..."}` out of a JSON error body, else return the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AnalysisFailure::from_status(429, ""), AnalysisFailure::RateLimited);
        assert_eq!(AnalysisFailure::from_status(402, ""), AnalysisFailure::QuotaExhausted);
        match AnalysisFailure::from_status(500, r#"{"error":"AI gateway error"}"#) {
            AnalysisFailure::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "AI gateway error");
            }
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_body_kept() {
        let f = AnalysisFailure::from_status(503, " upstream down \n");
        assert_eq!(
            f,
            AnalysisFailure::Service {
                status: 503,
                message: "upstream down".into()
            }
        );
    }

    #[test]
    fn test_messages_are_distinct() {
        let kinds = [
            AnalysisFailure::RateLimited,
            AnalysisFailure::QuotaExhausted,
            AnalysisFailure::TimedOut { secs: 120 },
            AnalysisFailure::Transport("reset".into()),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(
                    (a.title(), a.description()),
                    (b.title(), b.description()),
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_timeout_not_confused_with_generic_failure() {
        let timeout = AnalysisFailure::TimedOut { secs: 120 };
        let generic = AnalysisFailure::Service {
            status: 500,
            message: String::new(),
        };
        assert_ne!(timeout.description(), generic.description());
        assert!(timeout.description().contains("shorter input"));
    }
}
