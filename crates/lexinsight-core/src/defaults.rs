//! Substitutes used whenever the model leaves a field out.
//!
//! Every section default is declared here and nowhere else; the normalizer
//! starts from `Section::default()` and only overwrites the leaves the model
//! actually supplied.

use crate::types::{
    Classification, EvidenceStrength, FactEvidence, Jurisdiction, LegalProvisions,
    LimitationStatus, Precedents, ProceduralPath, ProceduralStep, RiskOutcome,
    SuccessProbability, WinningStrategy,
};

pub const PRIMARY_DOMAIN: &str = "General Legal Matter";
pub const PROCEDURAL_STAGE: &str = "Pre-litigation";
pub const COMPLEXITY_SCORE: f64 = 0.5;
pub const CONFIDENCE_SCORE: f64 = 0.7;

pub const CORE_SECTION: &str = "To be determined based on specific facts";

pub const KEY_FACT: &str = "Facts to be analyzed from provided documents";

pub const CORRECT_FORUM: &str = "To be determined";

pub const FIRST_STEP: &str = "Initial consultation";
pub const FIRST_STEP_TIMELINE: &str = "1 week";
pub const FIRST_STEP_NOTES: &str = "Gather all documents";
pub const TOTAL_TIMELINE: &str = "To be determined";

pub const JUDICIAL_ATTITUDE: &str = "Neutral";

pub const STRATEGY_OVERVIEW: &str = "Strategy to be determined based on case details.";

impl Default for EvidenceStrength {
    fn default() -> Self {
        Self::Moderate
    }
}

impl Default for LimitationStatus {
    fn default() -> Self {
        Self::Safe
    }
}

impl Default for SuccessProbability {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            primary_domain: PRIMARY_DOMAIN.into(),
            secondary_domains: Vec::new(),
            procedural_stage: PROCEDURAL_STAGE.into(),
            complexity_score: COMPLEXITY_SCORE,
            confidence_score: CONFIDENCE_SCORE,
        }
    }
}

impl Default for LegalProvisions {
    fn default() -> Self {
        Self {
            core_section: CORE_SECTION.into(),
            applicable_sections: Vec::new(),
            misused_sections: Vec::new(),
            constitutional_angles: Vec::new(),
        }
    }
}

impl Default for FactEvidence {
    fn default() -> Self {
        Self {
            key_facts: vec![KEY_FACT.into()],
            evidence_strength: EvidenceStrength::default(),
            court_requirements: Vec::new(),
            gaps: Vec::new(),
        }
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Self {
            correct_forum: CORRECT_FORUM.into(),
            alternative_forums: Vec::new(),
            limitation_status: LimitationStatus::default(),
            limitation_details: String::new(),
        }
    }
}

impl Default for ProceduralPath {
    fn default() -> Self {
        Self {
            steps: vec![ProceduralStep {
                step: FIRST_STEP.into(),
                timeline: FIRST_STEP_TIMELINE.into(),
                notes: FIRST_STEP_NOTES.into(),
            }],
            total_timeline: TOTAL_TIMELINE.into(),
            urgent_actions: Vec::new(),
        }
    }
}

impl Default for RiskOutcome {
    fn default() -> Self {
        Self {
            success_probability: SuccessProbability::default(),
            risk_factors: Vec::new(),
            tactical_considerations: Vec::new(),
            strength_factors: Vec::new(),
        }
    }
}

impl Default for Precedents {
    fn default() -> Self {
        Self {
            settled_principles: Vec::new(),
            relevant_cases: Vec::new(),
            judicial_attitude: JUDICIAL_ATTITUDE.into(),
        }
    }
}

impl Default for WinningStrategy {
    fn default() -> Self {
        Self {
            overview: STRATEGY_OVERVIEW.into(),
            key_arguments: Vec::new(),
            exact_words_to_use: Vec::new(),
            things_to_avoid_saying: Vec::new(),
            court_behavior_tips: Vec::new(),
            documents_to_prepare: Vec::new(),
            questions_to_prepare_for: Vec::new(),
            opening_statement: String::new(),
            closing_statement: String::new(),
        }
    }
}
