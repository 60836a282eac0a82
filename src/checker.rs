//! Soft recitation scoring.
//!
//! "Soft" means the verdict is graded rather than binary: the normalized
//! transcript is compared to the normalized reference with a character-level
//! similarity ratio, then bucketed into correct / partial / incorrect.
//! Operational failures (the transcription channel reporting its sentinel,
//! or the transcriber erroring outright) degrade to an error-status result
//! instead of propagating, so one flaky inference call never aborts a check.

use std::collections::BTreeMap;
use std::path::Path;

use crate::align::{align_to_verses, WordSpan};
use crate::model::{
    Breakdown, CheckStatus, ScoreDetails, ScoreResult, VerseBreakdown, WordDiff, EXTRA_WORD,
    MISSING_WORD,
};
use crate::quran::VerseInfo;
use crate::similarity::similarity;
use crate::text::normalize_arabic;
use crate::transcribe::{is_error_transcript, Transcriber, ERROR_SENTINEL};

/// Scores at or above this are a correct recitation.
pub const THRESHOLD_CORRECT: f64 = 0.92;
/// Scores at or above this (but below correct) are partially correct.
pub const THRESHOLD_PARTIAL: f64 = 0.70;

/// Diff preview is capped so feedback stays readable for long chapters.
pub const MAX_DIFF_PREVIEW: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub correct: f64,
    pub partial: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            correct: THRESHOLD_CORRECT,
            partial: THRESHOLD_PARTIAL,
        }
    }
}

impl Thresholds {
    #[must_use]
    pub fn classify(&self, score: f64) -> CheckStatus {
        if score >= self.correct {
            CheckStatus::Correct
        } else if score >= self.partial {
            CheckStatus::Partial
        } else {
            CheckStatus::Incorrect
        }
    }
}

pub struct RecitationChecker<'a> {
    transcriber: &'a dyn Transcriber,
    thresholds: Thresholds,
}

impl<'a> RecitationChecker<'a> {
    pub fn new(transcriber: &'a dyn Transcriber) -> Self {
        Self {
            transcriber,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(transcriber: &'a dyn Transcriber, thresholds: Thresholds) -> Self {
        Self {
            transcriber,
            thresholds,
        }
    }

    /// Transcribe a prepared WAV and score it against the reference text.
    ///
    /// `verse_info`, when given, requests a per-verse breakdown: the
    /// transcript is aligned to verse boundaries and each verse records
    /// the fragment the reciter was heard reading.
    pub fn check(
        &self,
        wav: &Path,
        reference: &str,
        verse_info: Option<&VerseInfo>,
    ) -> ScoreResult {
        let transcript = match self.transcriber.transcribe(wav) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, code = err.error_code(), "transcriber failed");
                return error_result(format!("{ERROR_SENTINEL} {err}"));
            }
        };
        if is_error_transcript(&transcript) {
            tracing::warn!(transcript = %transcript, "transcription reported failure");
            return error_result(transcript);
        }

        let hyp = normalize_arabic(&transcript);
        let reference_norm = normalize_arabic(reference);

        let score = similarity(&reference_norm, &hyp);
        let status = self.thresholds.classify(score);
        tracing::info!(status = status.label(), score, "recitation scored");

        let breakdown = verse_info.map(|info| build_breakdown(info, &hyp));

        let details = ScoreDetails {
            diffs: diff_preview(&reference_norm, &hyp, MAX_DIFF_PREVIEW),
            score: round4(score),
            score_percent: round2(score * 100.0),
            advice: Some(advice_for(status).to_owned()),
            msg: None,
            breakdown,
            normalized_ref: reference_norm,
            normalized_hyp: hyp,
        };

        ScoreResult {
            status,
            score,
            transcript,
            details,
        }
    }
}

fn error_result(transcript: String) -> ScoreResult {
    ScoreResult {
        status: CheckStatus::Error,
        score: 0.0,
        details: ScoreDetails {
            msg: Some(transcript.clone()),
            ..ScoreDetails::default()
        },
        transcript,
    }
}

fn advice_for(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Correct => "Excellent, the verse was read correctly (or close to it).",
        CheckStatus::Partial => {
            "Partially correct. Pay attention to individual words; try reading slower and more clearly."
        }
        CheckStatus::Incorrect | CheckStatus::Error => {
            "This needs another attempt. Try reading slower and focus on articulating the uncertain words."
        }
    }
}

/// Short positional word-by-word preview of where the texts disagree.
///
/// Reference words with no counterpart show as `<missing>`; when the
/// transcript runs longer than the reference, trailing words show as
/// `<extra>` in whatever preview room remains.
fn diff_preview(reference: &str, hypothesis: &str, max_items: usize) -> Vec<WordDiff> {
    let ref_words: Vec<&str> = reference.split_whitespace().collect();
    let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();
    let mut diffs = Vec::new();

    for (i, ref_word) in ref_words.iter().enumerate() {
        if diffs.len() >= max_items {
            return diffs;
        }
        match hyp_words.get(i) {
            Some(hyp_word) if hyp_word == ref_word => {}
            Some(hyp_word) => diffs.push(WordDiff {
                reference: (*ref_word).to_owned(),
                recognized: (*hyp_word).to_owned(),
            }),
            None => diffs.push(WordDiff {
                reference: (*ref_word).to_owned(),
                recognized: MISSING_WORD.to_owned(),
            }),
        }
    }

    if hyp_words.len() > ref_words.len() {
        for hyp_word in &hyp_words[ref_words.len()..] {
            if diffs.len() >= max_items {
                break;
            }
            diffs.push(WordDiff {
                reference: EXTRA_WORD.to_owned(),
                recognized: (*hyp_word).to_owned(),
            });
        }
    }

    diffs
}

/// Map the transcript onto each chapter's verses.
///
/// Boundaries come from cumulative word counts of the normalized verse
/// texts; the transcript fragment per verse comes from the word-level
/// alignment over the chapter as a whole.
fn build_breakdown(info: &VerseInfo, hypothesis: &str) -> Breakdown {
    let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();
    let mut breakdown = Breakdown::new();

    for (chapter, verses) in info {
        let mut boundaries: Vec<WordSpan> = Vec::with_capacity(verses.len());
        let mut ref_words: Vec<&str> = Vec::new();
        for verse in verses.values() {
            let start = ref_words.len();
            ref_words.extend(verse.normalized.split_whitespace());
            boundaries.push((start, ref_words.len()));
        }

        let spans = align_to_verses(&ref_words, &hyp_words, &boundaries);

        let mut chapter_breakdown = BTreeMap::new();
        for ((number, verse), span) in verses.iter().zip(spans) {
            let (hyp_start, hyp_end) = span;
            let recognized = hyp_words
                .get(hyp_start..hyp_end)
                .map(|words| words.join(" "))
                .unwrap_or_default();
            chapter_breakdown.insert(
                *number,
                VerseBreakdown {
                    display: verse.display.clone(),
                    normalized: verse.normalized.clone(),
                    recognized,
                },
            );
        }
        breakdown.insert(*chapter, chapter_breakdown);
    }

    breakdown
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
