// src/game/normalize.rs — Answer canonicalization
//
// Every text comparison in the bot goes through `normalize`: case-fold,
// drop harakat and tatweel, fold letter variants, and optionally drop the
// definite article. Numeric answers are parsed first by `parse_number`.

use serde::{Deserialize, Serialize};

/// Per-kind switches for `normalize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizePolicy {
    /// Drop a leading "ال" from every word that keeps at least two letters.
    pub strip_article: bool,
}

impl NormalizePolicy {
    pub const LITERAL: NormalizePolicy = NormalizePolicy {
        strip_article: false,
    };
    pub const ARTICLE_INSENSITIVE: NormalizePolicy = NormalizePolicy {
        strip_article: true,
    };
}

const ARTICLE: &str = "ال";
const TATWEEL: char = '\u{0640}';

fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}') || c == TATWEEL
}

/// Fold glyph variants onto one representative.
///
/// أ إ آ ٱ → ا, ى → ي, ة → ه.
pub fn fold_letter(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
        'ى' => 'ي',
        'ة' => 'ه',
        other => other,
    }
}

fn strip_article(word: &str) -> &str {
    match word.strip_prefix(ARTICLE) {
        Some(rest) if rest.chars().count() >= 2 => rest,
        _ => word,
    }
}

/// Canonical form used for every text comparison.
pub fn normalize(text: &str, policy: NormalizePolicy) -> String {
    let folded: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !is_diacritic(*c))
        .map(fold_letter)
        .collect();

    let words = folded.split_whitespace().map(|w| {
        if policy.strip_article {
            strip_article(w)
        } else {
            w
        }
    });

    words.collect::<Vec<_>>().join(" ")
}

/// Parse an integer written with Western, Arabic-Indic or Eastern
/// Arabic-Indic digits. Thousands separators and surrounding spaces are
/// ignored; anything else makes the text non-numeric.
pub fn parse_number(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix(['-', '−']) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '\u{0660}'..='\u{0669}' => digits.push(ascii_digit(c, '\u{0660}')),
            '\u{06F0}'..='\u{06F9}' => digits.push(ascii_digit(c, '\u{06F0}')),
            ',' | '٬' | '_' => {}
            _ => return None,
        }
    }

    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn ascii_digit(c: char, zero: char) -> char {
    let offset = c as u32 - zero as u32;
    char::from_digit(offset, 10).unwrap_or('0')
}

/// Render an integer with Arabic-Indic digits, for prompts.
pub fn to_arabic_digits(value: i64) -> String {
    value
        .to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32('\u{0660}' as u32 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// First letter of an already-normalized word.
pub fn first_letter(normalized: &str) -> Option<char> {
    normalized.chars().find(|c| c.is_alphabetic())
}

/// Last letter of an already-normalized word.
pub fn last_letter(normalized: &str) -> Option<char> {
    normalized.chars().rev().find(|c| c.is_alphabetic())
}

/// Letter a word chain continues with. A trailing hamza hands over alef.
pub fn chain_letter(c: char) -> char {
    match c {
        'ء' | 'ئ' | 'ؤ' => 'ا',
        other => other,
    }
}

/// Mutual containment between two normalized strings.
///
/// Either side may contain the other, but the shorter side must carry at
/// least two letters so a lone letter never matches everything.
pub fn contains_either(candidate: &str, expected: &str) -> bool {
    if candidate.is_empty() || expected.is_empty() {
        return false;
    }
    if candidate == expected {
        return true;
    }
    let (short, long) = if candidate.chars().count() <= expected.chars().count() {
        (candidate, expected)
    } else {
        (expected, candidate)
    };
    short.chars().filter(|c| c.is_alphanumeric()).count() >= 2 && long.contains(short)
}

/// Whether `word` can be spelled from the multiset `letters`.
pub fn letters_cover(letters: &str, word: &str) -> bool {
    let mut pool: Vec<char> = letters.chars().filter(|c| c.is_alphabetic()).collect();
    for c in word.chars().filter(|c| !c.is_whitespace()) {
        match pool.iter().position(|p| *p == c) {
            Some(i) => {
                pool.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}
