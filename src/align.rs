//! Mapping a concatenated reference text onto a hypothesis transcript,
//! verse by verse.
//!
//! The reference side of a whole-chapter check is the space-joined text of
//! every verse, so each verse owns a half-open word-index range in the
//! reference word sequence. This module finds the corresponding range in the
//! hypothesis words: word-level opcode alignment provides anchor matches,
//! and each verse's hypothesis boundary spans all anchors overlapping it.
//!
//! When no anchor overlaps a verse (the verse was skipped entirely, or the
//! recognition is garbage), the boundary falls back to a proportional
//! estimate over the hypothesis length. That keeps every verse addressable
//! in the breakdown at the cost of accuracy in the degenerate case; it is a
//! deliberate approximation.

use crate::similarity::{OpTag, opcodes};

/// A half-open word-index range `[start, end)`.
pub type WordSpan = (usize, usize);

/// For each reference verse boundary, locate the matching hypothesis span.
///
/// Returns exactly one span per input boundary, in input order. With empty
/// `ref_words`, every span is `(0, 0)`.
#[must_use]
pub fn align_to_verses(
    ref_words: &[&str],
    hyp_words: &[&str],
    verse_boundaries: &[WordSpan],
) -> Vec<WordSpan> {
    if verse_boundaries.is_empty() {
        return Vec::new();
    }
    if ref_words.is_empty() {
        return vec![(0, 0); verse_boundaries.len()];
    }

    // Anchor matches: equal and replace spans both witness positional
    // correspondence between the two sides.
    let anchors: Vec<_> = opcodes(ref_words, hyp_words)
        .into_iter()
        .filter(|op| matches!(op.tag, OpTag::Equal | OpTag::Replace))
        .collect();

    verse_boundaries
        .iter()
        .map(|&(ref_start, ref_end)| {
            let mut hyp_start = None;
            let mut hyp_end = 0;
            for anchor in &anchors {
                if anchor.a_start < ref_end && anchor.a_end > ref_start {
                    if hyp_start.is_none() {
                        hyp_start = Some(anchor.b_start);
                    }
                    hyp_end = anchor.b_end;
                }
            }

            match hyp_start {
                Some(start) => (start, hyp_end),
                None => proportional_estimate(ref_start, ref_end, ref_words.len(), hyp_words.len()),
            }
        })
        .collect()
}

/// Fallback span: scale the reference range onto the hypothesis length.
fn proportional_estimate(
    ref_start: usize,
    ref_end: usize,
    total_ref: usize,
    total_hyp: usize,
) -> WordSpan {
    let start = (ref_start as f64 / total_ref as f64 * total_hyp as f64) as usize;
    let end = (ref_end as f64 / total_ref as f64 * total_hyp as f64) as usize;
    (start, end)
}
