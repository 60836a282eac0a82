//! Outward result shaping.
//!
//! Turns a [`ScoreResult`] into the flat JSON envelope downstream clients
//! consume. Single-verse checks get one word alignment over the whole
//! reference plus a word-error-rate proxy; whole-chapter checks get a
//! per-verse listing, each verse re-scored locally against the fragment
//! the reciter was heard reading.

use crate::checker::THRESHOLD_CORRECT;
use crate::model::{
    AlignmentOp, ApiResult, CheckStatus, Metrics, MessageType, ScoreResult, VerseResult,
    WordAlignment,
};
use crate::similarity::{opcodes, similarity, OpTag};
use crate::text::normalize_arabic;

pub fn format_api_result(result: &ScoreResult, single_verse: bool, chapter: u32) -> ApiResult {
    let details = &result.details;
    let mut api = ApiResult {
        success: result.status != CheckStatus::Error,
        transcription: result.transcript.clone(),
        is_correct: result.status == CheckStatus::Correct,
        score: details.score,
        score_percent: details.score_percent,
        advice: details.advice.clone().unwrap_or_default(),
        normalized_ref: details.normalized_ref.clone(),
        normalized_hyp: details.normalized_hyp.clone(),
        diffs: details.diffs.clone(),
        error: None,
        message_type: None,
        reference: None,
        alignment: None,
        metrics: None,
        verses: None,
        correct_count: None,
        total_count: None,
        all_correct: None,
    };

    if result.status == CheckStatus::Error {
        api.error = Some(result.transcript.clone());
        return api;
    }

    if single_verse {
        let ref_words: Vec<&str> = details.normalized_ref.split_whitespace().collect();
        let hyp_words: Vec<&str> = details.normalized_hyp.split_whitespace().collect();

        api.message_type = Some(MessageType::Text);
        api.reference = Some(details.normalized_ref.clone());
        api.alignment = Some(word_alignment(&ref_words, &hyp_words));
        api.metrics = Some(Metrics {
            wer: 1.0 - result.score,
        });
        return api;
    }

    let Some(breakdown) = details.breakdown.as_ref() else {
        return api;
    };
    let Some(chapter_breakdown) = breakdown.get(&chapter) else {
        return api;
    };

    let mut verses = Vec::with_capacity(chapter_breakdown.len());
    for (number, verse) in chapter_breakdown {
        let verse_score = similarity(
            &normalize_arabic(&verse.normalized),
            &normalize_arabic(&verse.recognized),
        );

        let ref_words: Vec<&str> = verse.normalized.split_whitespace().collect();
        let hyp_words: Vec<&str> = verse.recognized.split_whitespace().collect();

        verses.push(VerseResult {
            verse_number: *number,
            verse_text: verse.display.clone(),
            is_correct: verse_score >= THRESHOLD_CORRECT,
            score: round4(verse_score),
            alignment: word_alignment(&ref_words, &hyp_words),
            read_words: hyp_words.iter().map(|w| (*w).to_owned()).collect(),
            remaining_words: Vec::new(),
        });
    }

    let correct_count = verses.iter().filter(|v| v.is_correct).count();
    let total_count = verses.len();

    api.message_type = Some(MessageType::Chapter);
    api.all_correct = Some(correct_count == total_count);
    api.correct_count = Some(correct_count);
    api.total_count = Some(total_count);
    api.verses = Some(verses);
    api
}

/// Word-level alignment annotations over reference and recognized words.
fn word_alignment(ref_words: &[&str], hyp_words: &[&str]) -> WordAlignment {
    let mut word = Vec::new();
    for opcode in opcodes(ref_words, hyp_words) {
        match opcode.tag {
            OpTag::Equal => {
                for idx in opcode.a_start..opcode.a_end {
                    word.push(AlignmentOp::Equal {
                        ref_word: ref_words[idx].to_owned(),
                        ref_idx: idx,
                    });
                }
            }
            OpTag::Replace => {
                for idx in opcode.a_start..opcode.a_end {
                    word.push(AlignmentOp::Replace {
                        ref_word: ref_words[idx].to_owned(),
                        ref_idx: idx,
                    });
                }
            }
            OpTag::Delete => {
                for idx in opcode.a_start..opcode.a_end {
                    word.push(AlignmentOp::Delete {
                        ref_word: ref_words[idx].to_owned(),
                        ref_idx: idx,
                    });
                }
            }
            OpTag::Insert => {
                for idx in opcode.b_start..opcode.b_end {
                    word.push(AlignmentOp::Insert {
                        hyp_word: hyp_words[idx].to_owned(),
                    });
                }
            }
        }
    }
    WordAlignment { word }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
