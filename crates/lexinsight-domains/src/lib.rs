pub mod legal;

use lexinsight_core::types::AnalysisProfile;
use tracing::warn;

/// Return every built-in analysis profile.
pub fn all_profiles() -> Vec<AnalysisProfile> {
    vec![legal::legal_profile()]
}

/// Look up a built-in profile by name (with short aliases).
pub fn get_profile(name: &str) -> Option<AnalysisProfile> {
    match name.trim().to_ascii_lowercase().as_str() {
        "law" | "india" => get_profile("legal"),
        name => all_profiles().into_iter().find(|p| p.name == name),
    }
}

/// Profile named by configuration, falling back to `legal` when unknown.
pub fn profile_or_default(name: &str) -> AnalysisProfile {
    get_profile(name).unwrap_or_else(|| {
        warn!(category = "system", profile = %name, "unknown analysis profile, using legal");
        legal::legal_profile()
    })
}
