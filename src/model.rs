use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Check classification
// ---------------------------------------------------------------------------

/// Terminal classification of a recitation check.
///
/// `Incorrect` and `Partial` are valid outcomes, not failures; `Error` covers
/// operational failures (transcription service down, unreadable audio) that
/// degrade to a result rather than propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Correct,
    Partial,
    Incorrect,
    Error,
}

impl CheckStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Partial => "partial",
            Self::Incorrect => "incorrect",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Checker output
// ---------------------------------------------------------------------------

/// One mismatched word pair from the capped diff preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiff {
    pub reference: String,
    pub recognized: String,
}

/// Placeholder for a reference word with no spoken counterpart.
pub const MISSING_WORD: &str = "<missing>";
/// Placeholder for a spoken word with no reference counterpart.
pub const EXTRA_WORD: &str = "<extra>";

/// Per-verse slice of a whole-chapter check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseBreakdown {
    /// Display form, diacritics retained.
    pub display: String,
    /// Normalized form used for comparison.
    pub normalized: String,
    /// The hypothesis fragment the aligner attributed to this verse.
    pub recognized: String,
}

/// Chapter number → verse number → breakdown entry.
pub type Breakdown = BTreeMap<u32, BTreeMap<u32, VerseBreakdown>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub normalized_ref: String,
    pub normalized_hyp: String,
    pub score: f64,
    pub score_percent: f64,
    pub diffs: Vec<WordDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    /// Raw failure message when `status == error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
}

/// Output of the recitation checker: classification, blended score, raw
/// transcript, and supporting detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub status: CheckStatus,
    pub score: f64,
    pub transcript: String,
    pub details: ScoreDetails,
}

// ---------------------------------------------------------------------------
// Formatter output (the API surface)
// ---------------------------------------------------------------------------

/// Word-by-word diff op used for UI highlighting. Computed fresh per
/// formatting call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AlignmentOp {
    Equal { ref_word: String, ref_idx: usize },
    Replace { ref_word: String, ref_idx: usize },
    Delete { ref_word: String, ref_idx: usize },
    Insert { hyp_word: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAlignment {
    pub word: Vec<AlignmentOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    /// Word-error-rate proxy: `1 - score`.
    pub wer: f64,
}

/// Marks whether an [`ApiResult`] describes a single verse or a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Single-verse check: one flat alignment over the whole reference.
    Text,
    /// Whole-chapter check: per-verse results with local scores.
    Chapter,
}

/// One verse in a chapter-level result. The score here is a fresh,
/// verse-local comparison of the verse's normalized text against its
/// recognized fragment; it is deliberately not a slice of the blended
/// full-text score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseResult {
    pub verse_number: u32,
    pub verse_text: String,
    pub is_correct: bool,
    pub score: f64,
    pub alignment: WordAlignment,
    pub read_words: Vec<String>,
    pub remaining_words: Vec<String>,
}

/// UI-ready result shape for the "check a recitation" operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResult {
    pub success: bool,
    pub transcription: String,
    pub is_correct: bool,
    pub score: f64,
    pub score_percent: f64,
    pub advice: String,
    pub normalized_ref: String,
    pub normalized_hyp: String,
    pub diffs: Vec<WordDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<WordAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verses: Option<Vec<VerseResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_correct: Option<bool>,
}

// ---------------------------------------------------------------------------
// Lead capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
}

/// The slice of an analysis result the spreadsheet row cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

/// A structured lead record as submitted by the quiz frontend.
/// Field names follow the existing wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "leadData", default)]
    pub lead: ContactInfo,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(rename = "analysisResult", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSummary>,
}

/// Acknowledgement of a stored lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadReceipt {
    pub success: bool,
    /// 1-based row index the record landed in.
    pub row: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(CheckStatus::Incorrect).unwrap(),
            json!("incorrect")
        );
        assert_eq!(CheckStatus::Partial.to_string(), "partial");
    }

    #[test]
    fn alignment_op_uses_op_tag() {
        let op = AlignmentOp::Replace {
            ref_word: "الله".to_owned(),
            ref_idx: 1,
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["op"], "replace");
        assert_eq!(value["ref_idx"], 1);
    }

    #[test]
    fn insert_op_carries_hypothesis_word() {
        let op = AlignmentOp::Insert {
            hyp_word: "زائد".to_owned(),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["op"], "insert");
        assert_eq!(value["hyp_word"], "زائد");
    }

    #[test]
    fn lead_record_parses_frontend_wire_format() {
        let record: LeadRecord = serde_json::from_value(json!({
            "timestamp": "2025-11-02T12:00:00Z",
            "leadData": {"name": "Aisha", "contact": "+77001234567"},
            "answers": {"q1_age": "age_18_25", "q2_gender": "female"},
            "analysisResult": {"score_percent": 85.5, "correct_count": 5, "total_count": 6}
        }))
        .unwrap();
        assert_eq!(record.lead.name, "Aisha");
        assert_eq!(record.answers["q1_age"], "age_18_25");
        assert_eq!(record.analysis.unwrap().total_count, Some(6));
    }

    #[test]
    fn lead_record_tolerates_missing_fields() {
        let record: LeadRecord = serde_json::from_value(json!({})).unwrap();
        assert!(record.lead.name.is_empty());
        assert!(record.answers.is_empty());
        assert!(record.analysis.is_none());
    }

    #[test]
    fn api_result_omits_absent_sections() {
        let result = ApiResult {
            success: false,
            transcription: "[ERROR] timeout".to_owned(),
            is_correct: false,
            score: 0.0,
            score_percent: 0.0,
            advice: String::new(),
            normalized_ref: String::new(),
            normalized_hyp: String::new(),
            diffs: Vec::new(),
            error: Some("[ERROR] timeout".to_owned()),
            message_type: None,
            reference: None,
            alignment: None,
            metrics: None,
            verses: None,
            correct_count: None,
            total_count: None,
            all_correct: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("verses").is_none());
        assert!(value.get("message_type").is_none());
        assert_eq!(value["error"], "[ERROR] timeout");
    }
}
