//! Turns the model's free-form reply into a complete `CaseAnalysis`.
//!
//! Extraction tries, in order: a fenced ```json block, the whole reply as
//! JSON, then a handful of labelled-field patterns. Whatever comes out of
//! that is walked field by field, so every leaf is resolved independently
//! and anything missing or mistyped falls back to its default.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::defaults;
use crate::types::{
    CaseAnalysis, Classification, EvidenceStrength, FactEvidence, Jurisdiction, LegalProvisions,
    LimitationStatus, Precedents, ProceduralPath, RiskOutcome, SuccessProbability,
    WinningStrategy,
};

/// Input summaries longer than this are cut and suffixed with `...`.
pub const SUMMARY_MAX_CHARS: usize = 150;

/// Which extraction stage produced the structured fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    FencedJson,
    WholeJson,
    Heuristic,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FencedJson => "fenced_json",
            Self::WholeJson => "whole_json",
            Self::Heuristic => "heuristic",
        }
    }
}

static FENCED_JSON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)```").ok());

/// (section, field, pattern) triples for the heuristic stage. Capture group
/// 1 is the value.
const LABELLED_FIELDS: &[(&str, &str, &str)] = &[
    (
        "classification",
        "primaryDomain",
        r#"(?i)primary[\s_]*domain[\s*"':]+([^\n,.;"*]+)"#,
    ),
    (
        "riskOutcome",
        "successProbability",
        r#"(?i)success[\s_]*probability[\s*"':]+(low|medium|high)\b"#,
    ),
    (
        "factEvidence",
        "evidenceStrength",
        r#"(?i)evidence[\s_]*strength[\s*"':]+(weak|moderate|strong)\b"#,
    ),
    (
        "jurisdiction",
        "limitationStatus",
        r#"(?i)limitation[\s_]*status[\s*"':]+(safe|borderline|time[\s-]?barred)"#,
    ),
    (
        "jurisdiction",
        "correctForum",
        r#"(?i)correct[\s_]*forum[\s*"':]+([^\n;"*]+)"#,
    ),
    (
        "legalProvisions",
        "coreSection",
        r#"(?i)core[\s_]*section[\s*"':]+([^\n;"*]+)"#,
    ),
];

static HEURISTICS: LazyLock<Vec<(&'static str, &'static str, Regex)>> = LazyLock::new(|| {
    LABELLED_FIELDS
        .iter()
        .filter_map(|(section, field, pattern)| {
            Regex::new(pattern).ok().map(|re| (*section, *field, re))
        })
        .collect()
});

// ── Extraction ───────────────────────────────────────────────────────────

/// Run the three extraction stages; the first that yields a JSON object
/// wins. The heuristic stage always succeeds, possibly with no fields.
pub fn extract(raw: &str) -> (Map<String, Value>, ParseSource) {
    if let Some(fields) = fenced_block(raw).and_then(parse_object) {
        return (fields, ParseSource::FencedJson);
    }
    if let Some(fields) = parse_object(raw) {
        return (fields, ParseSource::WholeJson);
    }
    (heuristic_fields(raw), ParseSource::Heuristic)
}

fn fenced_block(raw: &str) -> Option<&str> {
    let re = FENCED_JSON.as_ref()?;
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!(category = "analysis", "reply parsed as JSON but is not an object");
            None
        }
        Err(_) => None,
    }
}

/// Build a JSON-shaped object from whichever labelled fields appear in
/// free text, so it can go through the same schema walk as parsed JSON.
fn heuristic_fields(raw: &str) -> Map<String, Value> {
    let mut root = Map::new();
    for (section, field, re) in HEURISTICS.iter() {
        let Some(value) = re.captures(raw).and_then(|c| c.get(1)) else {
            continue;
        };
        let value = value.as_str().trim().trim_end_matches('.').trim();
        if value.is_empty() {
            continue;
        }
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(obj) = entry {
            obj.insert(field.to_string(), Value::String(value.to_string()));
        }
    }
    root
}

// ── Field resolution ─────────────────────────────────────────────────────

fn section<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    root.get(key).and_then(Value::as_object)
}

/// Non-empty string, else `default`.
fn text(obj: Option<&Map<String, Value>>, key: &str, default: &str) -> String {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn number(obj: Option<&Map<String, Value>>, key: &str, default: f64) -> f64 {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(default)
}

fn array<'a>(obj: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Vec<Value>> {
    obj.and_then(|o| o.get(key)).and_then(Value::as_array)
}

/// String elements of a list; anything else in it is skipped.
fn strings(obj: Option<&Map<String, Value>>, key: &str) -> Option<Vec<String>> {
    array(obj, key).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Object elements of a list that deserialize into `T`.
fn records<T: DeserializeOwned>(obj: Option<&Map<String, Value>>, key: &str) -> Option<Vec<T>> {
    array(obj, key).map(|items| {
        items
            .iter()
            .filter(|v| v.is_object())
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    })
}

fn label<T>(obj: Option<&Map<String, Value>>, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .and_then(parse)
}

fn classification(root: &Map<String, Value>) -> Classification {
    let s = section(root, "classification");
    Classification {
        primary_domain: text(s, "primaryDomain", defaults::PRIMARY_DOMAIN),
        secondary_domains: strings(s, "secondaryDomains").unwrap_or_default(),
        procedural_stage: text(s, "proceduralStage", defaults::PROCEDURAL_STAGE),
        complexity_score: number(s, "complexityScore", defaults::COMPLEXITY_SCORE),
        confidence_score: number(s, "confidenceScore", defaults::CONFIDENCE_SCORE),
    }
}

fn legal_provisions(root: &Map<String, Value>) -> LegalProvisions {
    let s = section(root, "legalProvisions");
    LegalProvisions {
        core_section: text(s, "coreSection", defaults::CORE_SECTION),
        applicable_sections: strings(s, "applicableSections").unwrap_or_default(),
        misused_sections: strings(s, "misusedSections").unwrap_or_default(),
        constitutional_angles: strings(s, "constitutionalAngles").unwrap_or_default(),
    }
}

fn fact_evidence(root: &Map<String, Value>) -> FactEvidence {
    let s = section(root, "factEvidence");
    let fallback = FactEvidence::default();
    FactEvidence {
        key_facts: strings(s, "keyFacts").unwrap_or(fallback.key_facts),
        evidence_strength: label(s, "evidenceStrength", EvidenceStrength::parse)
            .unwrap_or_default(),
        court_requirements: strings(s, "courtRequirements").unwrap_or_default(),
        gaps: strings(s, "gaps").unwrap_or_default(),
    }
}

fn jurisdiction(root: &Map<String, Value>) -> Jurisdiction {
    let s = section(root, "jurisdiction");
    Jurisdiction {
        correct_forum: text(s, "correctForum", defaults::CORRECT_FORUM),
        alternative_forums: strings(s, "alternativeForums").unwrap_or_default(),
        limitation_status: label(s, "limitationStatus", LimitationStatus::parse)
            .unwrap_or_default(),
        limitation_details: text(s, "limitationDetails", ""),
    }
}

fn procedural_path(root: &Map<String, Value>) -> ProceduralPath {
    let s = section(root, "proceduralPath");
    let fallback = ProceduralPath::default();
    ProceduralPath {
        steps: records(s, "steps").unwrap_or(fallback.steps),
        total_timeline: text(s, "totalTimeline", defaults::TOTAL_TIMELINE),
        urgent_actions: strings(s, "urgentActions").unwrap_or_default(),
    }
}

fn risk_outcome(root: &Map<String, Value>) -> RiskOutcome {
    let s = section(root, "riskOutcome");
    RiskOutcome {
        success_probability: label(s, "successProbability", SuccessProbability::parse)
            .unwrap_or_default(),
        risk_factors: strings(s, "riskFactors").unwrap_or_default(),
        tactical_considerations: strings(s, "tacticalConsiderations").unwrap_or_default(),
        strength_factors: strings(s, "strengthFactors").unwrap_or_default(),
    }
}

fn precedents(root: &Map<String, Value>) -> Precedents {
    let s = section(root, "precedents");
    Precedents {
        settled_principles: strings(s, "settledPrinciples").unwrap_or_default(),
        relevant_cases: records(s, "relevantCases").unwrap_or_default(),
        judicial_attitude: text(s, "judicialAttitude", defaults::JUDICIAL_ATTITUDE),
    }
}

fn winning_strategy(root: &Map<String, Value>) -> WinningStrategy {
    let s = section(root, "winningStrategy");
    WinningStrategy {
        overview: text(s, "overview", defaults::STRATEGY_OVERVIEW),
        key_arguments: records(s, "keyArguments").unwrap_or_default(),
        exact_words_to_use: strings(s, "exactWordsToUse").unwrap_or_default(),
        things_to_avoid_saying: strings(s, "thingsToAvoidSaying").unwrap_or_default(),
        court_behavior_tips: strings(s, "courtBehaviorTips").unwrap_or_default(),
        documents_to_prepare: strings(s, "documentsToPrepare").unwrap_or_default(),
        questions_to_prepare_for: records(s, "questionsToPrepareFor").unwrap_or_default(),
        opening_statement: text(s, "openingStatement", ""),
        closing_statement: text(s, "closingStatement", ""),
    }
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Display summary: the first `SUMMARY_MAX_CHARS` characters of the input,
/// with `...` appended when anything was cut.
pub fn summarize(input: &str) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(SUMMARY_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Normalize a complete model reply. Never fails; an unusable reply yields
/// an all-default analysis.
pub fn normalize(raw: &str, input: &str) -> CaseAnalysis {
    let (root, source) = extract(raw);
    info!(
        category = "analysis",
        source = source.as_str(),
        sections = root.len(),
        raw_len = raw.len(),
        "normalized analysis reply"
    );
    CaseAnalysis {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        input_summary: summarize(input),
        classification: classification(&root),
        legal_provisions: legal_provisions(&root),
        fact_evidence: fact_evidence(&root),
        jurisdiction: jurisdiction(&root),
        procedural_path: procedural_path(&root),
        risk_outcome: risk_outcome(&root),
        precedents: precedents(&root),
        winning_strategy: winning_strategy(&root),
        raw_analysis: raw.to_string(),
    }
}
