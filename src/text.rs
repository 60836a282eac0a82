//! Arabic text normalization for recitation comparison.
//!
//! Strips everything that legitimately varies between the printed mushaf text
//! and an ASR transcript before any similarity is computed:
//! - harakat and extended Quranic annotation marks
//! - alef variant unification to bare alef
//! - tatweel (kashida) elongation
//! - standalone recitation marks (pause, sajdah, hizb, ...)
//! - whitespace runs
//!
//! The result is idempotent: `normalize_arabic(normalize_arabic(x))` equals
//! `normalize_arabic(x)`.

/// Above/below-letter vowel marks and the extended Quranic annotation block.
///
/// Covers U+064B..=U+065F (fathatan through wavy hamza below), the
/// superscript alef U+0670, and U+06D6..=U+06ED (small high ligatures,
/// stop signs, rub el hizb internals).
fn is_harakat(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

/// Alef variants unified to bare alef: wasla, hamza above, hamza below,
/// madda above. Bare alef maps to itself.
fn is_alef_variant(c: char) -> bool {
    matches!(
        c,
        '\u{0671}' | '\u{0623}' | '\u{0625}' | '\u{0622}' | '\u{0627}'
    )
}

/// Standalone Quranic recitation-mark symbols. A fixed closed set; most of
/// these also fall inside the harakat range, the residue is the start-of-ayah
/// and sajdah signs plus the two dochashmee forms outside U+06D6..=U+06ED.
fn is_recitation_mark(c: char) -> bool {
    matches!(
        c,
        '\u{06DD}' // end of ayah
            | '\u{06DE}' // start of rub el hizb
            | '\u{06E9}' // place of sajdah
            | '\u{06D7}'
            | '\u{06DA}'
            | '\u{06DB}'
            | '\u{06DC}'
            | '\u{06DF}'
            | '\u{06E0}'
            | '\u{06E2}'
            | '\u{06E3}'
            | '\u{06E4}'
            | '\u{06E7}'
            | '\u{06E8}'
            | '\u{06EA}'
            | '\u{06EB}'
            | '\u{06EC}'
            | '\u{06ED}'
            | '\u{06EE}'
            | '\u{06EF}'
    )
}

const TATWEEL: char = '\u{0640}';
const BARE_ALEF: char = '\u{0627}';

/// Normalize Arabic text for comparison.
///
/// No case folding (Arabic has no case) and no stemming; only the removals
/// and unifications listed in the module docs, in that order.
#[must_use]
pub fn normalize_arabic(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    // Start true so leading whitespace is dropped.
    let mut last_was_space = true;

    for c in text.chars() {
        if is_harakat(c) || is_recitation_mark(c) || c == TATWEEL {
            continue;
        }

        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
            continue;
        }

        if is_alef_variant(c) {
            result.push(BARE_ALEF);
        } else {
            result.push(c);
        }
        last_was_space = false;
    }

    if result.ends_with(' ') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_harakat_from_basmalah() {
        let input = "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ";
        assert_eq!(normalize_arabic(input), "بسم الله الرحمن الرحيم");
    }

    #[test]
    fn unifies_alef_variants() {
        assert_eq!(normalize_arabic("أَعُوذُ"), "اعوذ");
        assert_eq!(normalize_arabic("إِلَيْهِ"), "اليه");
        assert_eq!(normalize_arabic("آمَنُوا"), "امنوا");
        assert_eq!(normalize_arabic("ٱللَّه"), "الله");
    }

    #[test]
    fn removes_tatweel() {
        assert_eq!(normalize_arabic("بـــسم"), "بسم");
    }

    #[test]
    fn removes_recitation_marks() {
        assert_eq!(normalize_arabic("قل ۚ هو ۞ الله ۩"), "قل هو الله");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize_arabic("  بسم   الله \t الرحمن \n"), "بسم الله الرحمن");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_arabic(""), "");
        assert_eq!(normalize_arabic("   \n\t "), "");
    }

    #[test]
    fn idempotent_on_mixed_input() {
        let inputs = [
            "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ",
            "قُلْ هُوَ ٱللَّهُ أَحَدٌ ۞",
            "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ",
            "",
        ];
        for input in inputs {
            let once = normalize_arabic(input);
            assert_eq!(normalize_arabic(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn every_harakat_codepoint_is_removed() {
        for code in 0x064B..=0x065F {
            let c = char::from_u32(code).unwrap();
            let input = format!("ب{c}س");
            assert_eq!(normalize_arabic(&input), "بس", "left U+{code:04X} in place");
        }
        for code in 0x06D6..=0x06ED {
            let c = char::from_u32(code).unwrap();
            let input = format!("ب{c}س");
            assert_eq!(normalize_arabic(&input), "بس", "left U+{code:04X} in place");
        }
        assert_eq!(normalize_arabic("ب\u{0670}س"), "بس");
    }

    #[test]
    fn non_arabic_text_passes_through() {
        assert_eq!(normalize_arabic("hello world"), "hello world");
    }
}
