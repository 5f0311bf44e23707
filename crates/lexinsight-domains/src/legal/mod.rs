pub mod prompt;

use lexinsight_core::types::AnalysisProfile;

pub use prompt::LEGAL_ANALYSIS_SYSTEM;

pub const LEGAL_USER_PREFIX: &str =
    "Analyze the following case and provide your analysis in the specified JSON format:";

// ── Progress labels, one per 500 characters of streamed reply ───────
const LEGAL_PROGRESS_LABELS: &[&str] = &[
    "Identifying applicable IPC sections...",
    "Assessing evidence strength...",
    "Determining correct forum...",
    "Calculating success probability...",
    "Compiling precedents...",
    "Generating procedural roadmap...",
];

pub fn legal_profile() -> AnalysisProfile {
    AnalysisProfile {
        name: "legal".into(),
        label: "Indian Law".into(),
        system_prompt: LEGAL_ANALYSIS_SYSTEM.into(),
        user_prompt_prefix: LEGAL_USER_PREFIX.into(),
        progress_labels: LEGAL_PROGRESS_LABELS.iter().map(|s| s.to_string()).collect(),
    }
}
