use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Enumerated assessments ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceStrength {
    Weak,
    Moderate,
    Strong,
}

impl EvidenceStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
        }
    }

    /// Case-insensitive parse of a model-supplied label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Some(Self::Weak),
            "moderate" => Some(Self::Moderate),
            "strong" => Some(Self::Strong),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitationStatus {
    Safe,
    Borderline,
    #[serde(rename = "Time-barred")]
    TimeBarred,
}

impl LimitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Borderline => "Borderline",
            Self::TimeBarred => "Time-barred",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Some(Self::Safe),
            "borderline" => Some(Self::Borderline),
            "time-barred" | "time barred" | "timebarred" => Some(Self::TimeBarred),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuccessProbability {
    Low,
    Medium,
    High,
}

impl SuccessProbability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for EvidenceStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LimitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SuccessProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Analysis sections ────────────────────────────────────────────────────
//
// Section defaults live in `defaults.rs`; list items below default to empty
// strings field by field.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub primary_domain: String,
    pub secondary_domains: Vec<String>,
    pub procedural_stage: String,
    /// 0.0 ..= 1.0
    pub complexity_score: f64,
    /// 0.0 ..= 1.0
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalProvisions {
    pub core_section: String,
    pub applicable_sections: Vec<String>,
    pub misused_sections: Vec<String>,
    pub constitutional_angles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactEvidence {
    pub key_facts: Vec<String>,
    pub evidence_strength: EvidenceStrength,
    pub court_requirements: Vec<String>,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurisdiction {
    pub correct_forum: String,
    pub alternative_forums: Vec<String>,
    pub limitation_status: LimitationStatus,
    pub limitation_details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralStep {
    pub step: String,
    pub timeline: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProceduralPath {
    pub steps: Vec<ProceduralStep>,
    pub total_timeline: String,
    pub urgent_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOutcome {
    pub success_probability: SuccessProbability,
    pub risk_factors: Vec<String>,
    pub tactical_considerations: Vec<String>,
    pub strength_factors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevantCase {
    pub name: String,
    pub citation: String,
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precedents {
    pub settled_principles: Vec<String>,
    pub relevant_cases: Vec<RelevantCase>,
    pub judicial_attitude: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyArgument {
    pub argument: String,
    pub how_to_present: String,
    pub why_it_works: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreparedQuestion {
    pub question: String,
    pub suggested_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningStrategy {
    pub overview: String,
    pub key_arguments: Vec<KeyArgument>,
    pub exact_words_to_use: Vec<String>,
    pub things_to_avoid_saying: Vec<String>,
    pub court_behavior_tips: Vec<String>,
    pub documents_to_prepare: Vec<String>,
    pub questions_to_prepare_for: Vec<PreparedQuestion>,
    pub opening_statement: String,
    pub closing_statement: String,
}

// ── Analysis record ──────────────────────────────────────────────────────

/// A fully normalized case analysis. Every field carries a concrete value;
/// anything the model left out has already been replaced by its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysis {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Original description, truncated for display.
    pub input_summary: String,
    pub classification: Classification,
    pub legal_provisions: LegalProvisions,
    pub fact_evidence: FactEvidence,
    pub jurisdiction: Jurisdiction,
    pub procedural_path: ProceduralPath,
    pub risk_outcome: RiskOutcome,
    pub precedents: Precedents,
    pub winning_strategy: WinningStrategy,
    /// The reassembled model output exactly as streamed.
    pub raw_analysis: String,
}

/// Denormalized list entry; summary fields are copied out of the analysis
/// at save time so list rendering never has to re-derive them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub input_summary: String,
    pub primary_domain: String,
    pub success_probability: SuccessProbability,
    pub analysis: CaseAnalysis,
}

impl From<CaseAnalysis> for HistoryItem {
    fn from(analysis: CaseAnalysis) -> Self {
        Self {
            id: analysis.id.clone(),
            timestamp: analysis.timestamp,
            input_summary: analysis.input_summary.clone(),
            primary_domain: analysis.classification.primary_domain.clone(),
            success_probability: analysis.risk_outcome.success_probability,
            analysis,
        }
    }
}

// ── Analysis profile ─────────────────────────────────────────────────────

/// Prompts and progress labels for one kind of analysis (e.g. "legal").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub name: String,
    pub label: String,
    pub system_prompt: String,
    /// Placed before the case text in the user message.
    pub user_prompt_prefix: String,
    /// Ordered labels shown as streamed content grows.
    pub progress_labels: Vec<String>,
}
