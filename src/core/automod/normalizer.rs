// Text normalizer - defeats the common evasion tricks (leet speak, Unicode
// confusables, diacritic/zalgo stacking, separator insertion) before the
// bad-word detector runs. Pure string transform, no I/O.
//
// Order matters: lowercase -> confusables -> NFKD + strip combining marks
// -> leet fold -> separator stripping. Each step feeds the next.
//
// The output is only ever used for detection. Log embeds and DMs always
// show the original content.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Unicode look-alikes that survive lowercasing: Cyrillic letters, small
/// caps and circled letters that visually pass for Latin.
fn fold_confusable(c: char) -> Option<char> {
    let folded = match c {
        // Cyrillic
        'а' => 'a',
        'в' => 'b',
        'е' => 'e',
        'к' => 'k',
        'м' => 'm',
        'н' => 'h',
        'о' => 'o',
        'р' => 'p',
        'с' => 'c',
        'т' => 't',
        'у' => 'y',
        'х' => 'x',
        // Small caps
        'ᴀ' => 'a',
        'ʙ' => 'b',
        'ᴄ' => 'c',
        'ᴅ' => 'd',
        'ᴇ' => 'e',
        'ꜰ' => 'f',
        'ɢ' => 'g',
        'ʜ' => 'h',
        'ɪ' => 'i',
        'ᴊ' => 'j',
        'ᴋ' => 'k',
        'ʟ' => 'l',
        'ᴍ' => 'm',
        'ɴ' => 'n',
        'ᴏ' => 'o',
        'ᴘ' => 'p',
        'ǫ' => 'q',
        'ʀ' => 'r',
        'ꜱ' => 's',
        'ᴛ' => 't',
        'ᴜ' => 'u',
        'ᴠ' => 'v',
        'ᴡ' => 'w',
        'ʏ' => 'y',
        'ᴢ' => 'z',
        // Circled letters
        'ⓐ' => 'a',
        'ⓑ' => 'b',
        'ⓒ' => 'c',
        'ⓓ' => 'd',
        'ⓔ' => 'e',
        'ⓕ' => 'f',
        'ⓖ' => 'g',
        'ⓗ' => 'h',
        'ⓘ' => 'i',
        'ⓙ' => 'j',
        'ⓚ' => 'k',
        'ⓛ' => 'l',
        'ⓜ' => 'm',
        'ⓝ' => 'n',
        'ⓞ' => 'o',
        'ⓟ' => 'p',
        'ⓠ' => 'q',
        'ⓡ' => 'r',
        'ⓢ' => 's',
        'ⓣ' => 't',
        'ⓤ' => 'u',
        'ⓥ' => 'v',
        'ⓦ' => 'w',
        'ⓧ' => 'x',
        'ⓨ' => 'y',
        'ⓩ' => 'z',
        _ => return None,
    };
    Some(folded)
}

/// Digits and symbols commonly substituted for letters.
fn fold_leet(c: char) -> Option<char> {
    let folded = match c {
        '0' => 'o',
        '1' => 'i',
        '2' => 'z',
        '3' => 'e',
        '4' => 'a',
        '5' => 's',
        '6' => 'g',
        '7' => 't',
        '8' => 'b',
        '9' => 'g',
        '@' => 'a',
        '$' => 's',
        '!' => 'i',
        '+' => 't',
        '€' => 'e',
        '£' => 'l',
        '¥' => 'y',
        _ => return None,
    };
    Some(folded)
}

fn is_separator(c: char) -> bool {
    matches!(
        c,
        '.' | '-' | '_' | '*' | '|' | '/' | '\\' | ',' | ';' | ':' | '~' | '`'
    ) || c.is_whitespace()
}

/// Normalize text for detection.
///
/// `normalize("F.Ù.C.K")` contains `"fuck"`; `normalize` applied twice is
/// a no-op for the tables above (no residual leet/confusable characters
/// remain after one pass).
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    // Confusables, then NFKD with combining marks dropped (kills stacked
    // diacritics and zalgo), then leet folding. All single passes.
    let folded: String = lowered
        .chars()
        .map(|c| fold_confusable(c).unwrap_or(c))
        .collect::<String>()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| fold_leet(c).unwrap_or(c))
        .collect();

    strip_separators(&folded)
}

/// Delete a separator run when it sits strictly between two word characters
/// and at least one of the adjacent word-character runs is a single
/// character. `f.u.c.k` and `f u c k` collapse to `fuck`, while `you ass`
/// keeps its space so word-boundary matching still works downstream.
fn strip_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    // Length of the maximal alphanumeric run covering each index.
    let mut run_len = vec![0usize; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_alphanumeric() {
            let start = i;
            while i < chars.len() && chars[i].is_alphanumeric() {
                i += 1;
            }
            for slot in run_len.iter_mut().take(i).skip(start) {
                *slot = i - start;
            }
        } else {
            i += 1;
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if !is_separator(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && is_separator(chars[i]) {
            i += 1;
        }

        let prev_word = start > 0 && chars[start - 1].is_alphanumeric();
        let next_word = i < chars.len() && chars[i].is_alphanumeric();
        let single_fragment = (prev_word && run_len[start - 1] == 1)
            || (next_word && i < chars.len() && run_len[i] == 1);

        if prev_word && next_word && single_fragment {
            continue; // drop the run
        }
        for &c in &chars[start..i] {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(normalize("HELLO"), "hello");
    }

    #[test]
    fn collapses_separator_evasion() {
        assert!(normalize("f.u.c.k").contains("fuck"));
        assert!(normalize("f_u_c_k").contains("fuck"));
        assert!(normalize("f u c k").contains("fuck"));
        assert!(normalize("f-u-c-k").contains("fuck"));
    }

    #[test]
    fn keeps_real_word_gaps() {
        assert_eq!(normalize("you ass"), "you ass");
        assert_eq!(normalize("hello world"), "hello world");
    }

    #[test]
    fn folds_leet_speak() {
        assert!(normalize("sh1t").contains("shit"));
        assert!(normalize("a$$").contains("ass"));
        assert!(normalize("n00b").contains("noob"));
    }

    #[test]
    fn strips_diacritics() {
        assert!(normalize("FùCK").contains("fuck"));
        assert!(normalize("café").contains("cafe"));
    }

    #[test]
    fn folds_confusables() {
        // Cyrillic а and о
        assert!(normalize("fаck оk").contains("fack"));
        assert!(normalize("ꜰᴜᴄᴋ").contains("fuck"));
        assert!(normalize("ⓕⓤⓒⓚ").contains("fuck"));
    }

    #[test]
    fn strips_zalgo_stacking() {
        // 'f' + three combining marks per letter
        let zalgo = "f\u{0300}\u{0301}\u{0302}uck";
        assert!(normalize(zalgo).contains("fuck"));
    }

    #[test]
    fn second_pass_is_identity() {
        for input in [
            "F.Ù.C.K",
            "sh1t happens",
            "ⓕⓤⓒⓚ this",
            "plain text stays put",
            "a$$hole",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn does_not_collapse_repeats() {
        // Repeated characters are the repeated-char detector's job.
        assert!(normalize("fuuuuck").contains("fuuuuck"));
    }
}
