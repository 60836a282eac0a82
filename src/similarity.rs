//! Edit-similarity scoring and block-matching alignment.
//!
//! Implements SequenceMatcher-style longest-common-block matching over
//! arbitrary element slices. Three views of the same alignment are exposed:
//!
//! - [`ratio`] — the classic similarity ratio `2 * M / T`, where `M` is the
//!   number of elements inside matching blocks and `T` the combined length of
//!   both sequences.
//! - [`matching_blocks`] — the maximal matching blocks themselves, in
//!   sequence order.
//! - [`opcodes`] — the full diff as equal/replace/delete/insert spans,
//!   suitable for word-level highlighting.
//!
//! Block selection is deterministic: ties are broken toward the earliest
//! position in both sequences, so repeated calls on the same input always
//! produce the same alignment.

use std::collections::HashMap;
use std::hash::Hash;

/// A maximal run of identical elements: `a[a_start..a_start+len]`
/// equals `b[b_start..b_start+len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Diff operation tag, difflib-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// A contiguous diff span: `a[a_start..a_end]` versus `b[b_start..b_end]`.
/// For `Delete` the b-range is empty; for `Insert` the a-range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// Character-level similarity ratio between two strings, in `[0.0, 1.0]`.
///
/// Two empty strings compare as `1.0` (full match by convention); one empty
/// side against a non-empty side is `0.0`.
#[must_use]
pub fn similarity(reference: &str, hypothesis: &str) -> f64 {
    let a: Vec<char> = reference.chars().collect();
    let b: Vec<char> = hypothesis.chars().collect();
    ratio(&a, &b)
}

/// Similarity ratio `2 * M / T` over element slices.
#[must_use]
pub fn ratio<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches: usize = matching_blocks(a, b).iter().map(|block| block.len).sum();
    2.0 * matches as f64 / total as f64
}

/// All maximal matching blocks between `a` and `b`, ordered by position.
/// Adjacent blocks are merged.
#[must_use]
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<Block> {
    let mut b_positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, element) in b.iter().enumerate() {
        b_positions.entry(element).or_default().push(j);
    }

    let mut raw = Vec::new();
    collect_blocks(a, b, 0, a.len(), 0, b.len(), &b_positions, &mut raw);

    // Merge blocks that abut in both sequences.
    let mut merged: Vec<Block> = Vec::with_capacity(raw.len());
    for block in raw {
        match merged.last_mut() {
            Some(prev)
                if prev.a_start + prev.len == block.a_start
                    && prev.b_start + prev.len == block.b_start =>
            {
                prev.len += block.len;
            }
            _ => merged.push(block),
        }
    }
    merged
}

/// The diff between `a` and `b` as ordered equal/replace/delete/insert spans.
#[must_use]
pub fn opcodes<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let blocks = matching_blocks(a, b);
    let mut ops = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    let mut emit_gap = |ops: &mut Vec<Opcode>, i: usize, j: usize, ai: usize, bj: usize| {
        let tag = if i < ai && j < bj {
            Some(OpTag::Replace)
        } else if i < ai {
            Some(OpTag::Delete)
        } else if j < bj {
            Some(OpTag::Insert)
        } else {
            None
        };
        if let Some(tag) = tag {
            ops.push(Opcode {
                tag,
                a_start: i,
                a_end: ai,
                b_start: j,
                b_end: bj,
            });
        }
    };

    for block in &blocks {
        emit_gap(&mut ops, i, j, block.a_start, block.b_start);
        ops.push(Opcode {
            tag: OpTag::Equal,
            a_start: block.a_start,
            a_end: block.a_start + block.len,
            b_start: block.b_start,
            b_end: block.b_start + block.len,
        });
        i = block.a_start + block.len;
        j = block.b_start + block.len;
    }
    emit_gap(&mut ops, i, j, a.len(), b.len());
    ops
}

/// Recursively split around the longest match, collecting blocks in order.
#[allow(clippy::too_many_arguments)]
fn collect_blocks<'a, T: Eq + Hash>(
    a: &'a [T],
    b: &'a [T],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
    b_positions: &HashMap<&'a T, Vec<usize>>,
    blocks: &mut Vec<Block>,
) {
    let Some(found) = find_longest_match(a, b, a_lo, a_hi, b_lo, b_hi, b_positions) else {
        return;
    };

    if found.a_start > a_lo && found.b_start > b_lo {
        collect_blocks(
            a,
            b,
            a_lo,
            found.a_start,
            b_lo,
            found.b_start,
            b_positions,
            blocks,
        );
    }
    blocks.push(found);
    if found.a_start + found.len < a_hi && found.b_start + found.len < b_hi {
        collect_blocks(
            a,
            b,
            found.a_start + found.len,
            a_hi,
            found.b_start + found.len,
            b_hi,
            b_positions,
            blocks,
        );
    }
}

/// Longest matching block within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Rolling `j2len` table: `j2len[j]` is the length of the longest match
/// ending at `a[i]` / `b[j]`, rebuilt per row from the previous row.
fn find_longest_match<'a, T: Eq + Hash>(
    a: &'a [T],
    b: &'a [T],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
    b_positions: &HashMap<&'a T, Vec<usize>>,
) -> Option<Block> {
    let mut best = Block {
        a_start: a_lo,
        b_start: b_lo,
        len: 0,
    };
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in a_lo..a_hi {
        let mut next_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(&a[i]) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev).copied())
                    .unwrap_or(0)
                    + 1;
                next_j2len.insert(j, k);
                if k > best.len {
                    best = Block {
                        a_start: i + 1 - k,
                        b_start: j + 1 - k,
                        len: k,
                    };
                }
            }
        }
        j2len = next_j2len;
    }

    if best.len > 0 { Some(best) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn identical_strings_score_one() {
        let text = "بسم الله الرحمن الرحيم";
        assert!((similarity(text, text) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn both_empty_scores_one() {
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_empty_side_scores_zero() {
        assert!(similarity("بسم", "").abs() < f64::EPSILON);
        assert!(similarity("", "بسم").abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_is_symmetric() {
        let pairs = [
            ("بسم الله", "بسم الله الرحمن"),
            ("abcd", "bcde"),
            ("قل هو الله احد", "قل هو الله"),
        ];
        for (x, y) in pairs {
            let forward = similarity(x, y);
            let backward = similarity(y, x);
            assert!(
                (forward - backward).abs() < 1e-12,
                "asymmetric for ({x}, {y}): {forward} vs {backward}"
            );
        }
    }

    #[test]
    fn ratio_matches_known_difflib_value() {
        // difflib.SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "bcde".chars().collect();
        assert!((ratio(&a, &b) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ratio_is_deterministic() {
        let a = words("الحمد لله رب العالمين");
        let b = words("الحمد لله رب");
        let first = ratio(&a, &b);
        for _ in 0..10 {
            assert!((ratio(&a, &b) - first).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn matching_blocks_cover_common_run() {
        let a = words("a b c d");
        let b = words("x b c y");
        let blocks = matching_blocks(&a, &b);
        assert_eq!(
            blocks,
            vec![Block {
                a_start: 1,
                b_start: 1,
                len: 2
            }]
        );
    }

    #[test]
    fn adjacent_blocks_are_merged() {
        let a = words("a b c");
        let b = words("a b c");
        let blocks = matching_blocks(&a, &b);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len, 3);
    }

    #[test]
    fn opcodes_equal_only_for_identical_input() {
        let a = words("بسم الله");
        let ops = opcodes(&a, &a);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, OpTag::Equal);
        assert_eq!((ops[0].a_start, ops[0].a_end), (0, 2));
    }

    #[test]
    fn opcodes_classify_replace_delete_insert() {
        let a = words("a b c d");
        let b = words("a x c d e");
        let ops = opcodes(&a, &b);
        let tags: Vec<OpTag> = ops.iter().map(|op| op.tag).collect();
        assert_eq!(
            tags,
            vec![OpTag::Equal, OpTag::Replace, OpTag::Equal, OpTag::Insert]
        );
        // The replace span covers b vs x.
        let replace = ops[1];
        assert_eq!((replace.a_start, replace.a_end), (1, 2));
        assert_eq!((replace.b_start, replace.b_end), (1, 2));
    }

    #[test]
    fn opcodes_delete_covers_dropped_tail() {
        let a = words("a b c");
        let b = words("a");
        let ops = opcodes(&a, &b);
        assert_eq!(ops.last().unwrap().tag, OpTag::Delete);
        assert_eq!(ops.last().unwrap().a_end, 3);
    }

    #[test]
    fn opcodes_spans_are_contiguous_and_exhaustive() {
        let a = words("الحمد لله رب العالمين الرحمن الرحيم");
        let b = words("الحمد لله العالمين الرحيم مالك");
        let ops = opcodes(&a, &b);
        let (mut i, mut j) = (0usize, 0usize);
        for op in &ops {
            assert_eq!(op.a_start, i, "a gap before {op:?}");
            assert_eq!(op.b_start, j, "b gap before {op:?}");
            i = op.a_end;
            j = op.b_end;
        }
        assert_eq!(i, a.len());
        assert_eq!(j, b.len());
    }

    #[test]
    fn empty_against_nonempty_is_one_insert() {
        let a: Vec<&str> = Vec::new();
        let b = words("a b");
        let ops = opcodes(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, OpTag::Insert);
    }
}
