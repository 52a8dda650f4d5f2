//! Kölner Phonetik.
//!
//! A German-language phonetic hash: every character is coded from its
//! three-character context window against an ordered rule table, runs of
//! repeated digits collapse, and zeros vanish everywhere but position 0.
//! Names sharing a code land in the same bucket, giving an exact-bucket
//! fallback that is independent of edit distance.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

// ============================================================================
// Encoder
// ============================================================================

/// Characters surviving the input strip: Latin letters, the German extras,
/// the accented vowel ranges, and whitespace.
fn is_permitted(c: char) -> bool {
    c.is_ascii_lowercase()
        || matches!(c, 'ä' | 'ö' | 'ü' | 'ß')
        || ('à'..='ã').contains(&c)
        || ('è'..='ï').contains(&c)
        || ('ò'..='õ').contains(&c)
        || ('ù'..='û').contains(&c)
        || c.is_whitespace()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'j' | 'o' | 'u' | 'y' | 'ä' | 'ö' | 'ü')
        || ('à'..='ã').contains(&c)
        || ('è'..='ï').contains(&c)
        || ('ò'..='õ').contains(&c)
        || ('ù'..='û').contains(&c)
}

/// The ordered context-rule table; first match wins. The windows at the
/// string boundaries are padded with a space. Two of the rules only
/// constrain (prev, cur) — the table is reproduced as-is, quirks included.
fn encode_window(prev: char, cur: char, next: char) -> Option<&'static str> {
    if is_vowel(cur) {
        return Some("0");
    }
    if cur == 'b' {
        return Some("1");
    }
    if cur == 'p' && next != 'h' {
        return Some("1");
    }
    if matches!(cur, 'd' | 't') && !matches!(next, 'c' | 's' | 'z') {
        return Some("2");
    }
    if matches!(cur, 'f' | 'v' | 'w') {
        return Some("3");
    }
    if cur == 'p' && next == 'h' {
        return Some("3");
    }
    if matches!(cur, 'g' | 'k' | 'q') {
        return Some("4");
    }
    if prev.is_whitespace()
        && cur == 'c'
        && matches!(next, 'a' | 'h' | 'k' | 'l' | 'o' | 'q' | 'r' | 'u' | 'x')
    {
        return Some("4");
    }
    if !matches!(prev, 's' | 'z')
        && cur == 'c'
        && matches!(next, 'a' | 'h' | 'k' | 'o' | 'q' | 'u' | 'x')
    {
        return Some("4");
    }
    if !matches!(prev, 'c' | 'k' | 'q') && cur == 'x' {
        return Some("48");
    }
    if cur == 'l' {
        return Some("5");
    }
    if matches!(cur, 'm' | 'n') {
        return Some("6");
    }
    if cur == 'r' {
        return Some("7");
    }
    if matches!(cur, 's' | 'z' | 'ß') {
        return Some("8");
    }
    if matches!(prev, 's' | 'z') && cur == 'c' {
        return Some("8");
    }
    if prev.is_whitespace()
        && cur == 'c'
        && !matches!(next, 'a' | 'h' | 'k' | 'l' | 'o' | 'q' | 'r' | 'u' | 'x')
    {
        return Some("8");
    }
    if prev == 'c' && !matches!(cur, 'a' | 'h' | 'k' | 'o' | 'q' | 'u' | 'x') {
        return Some("8");
    }
    if matches!(cur, 'd' | 't') && matches!(next, 'c' | 's' | 'z') {
        return Some("8");
    }
    if matches!(prev, 'c' | 'k' | 'q') && cur == 'x' {
        return Some("8");
    }
    None
}

/// Phonetic code of a string. Pure function; deterministic.
pub fn encode(input: &str) -> String {
    let chars: Vec<char> = input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| is_permitted(c))
        .collect();

    let mut raw = String::with_capacity(chars.len());
    for (i, &cur) in chars.iter().enumerate() {
        let prev = if i == 0 { ' ' } else { chars[i - 1] };
        let next = chars.get(i + 1).copied().unwrap_or(' ');
        if let Some(code) = encode_window(prev, cur, next) {
            raw.push_str(code);
        }
    }

    // Collapse runs of repeated digits, then delete every '0' except a
    // leading one.
    let mut encoded = String::with_capacity(raw.len());
    for digit in raw.chars() {
        if encoded.chars().next_back() != Some(digit) {
            encoded.push(digit);
        }
    }
    let mut out = String::with_capacity(encoded.len());
    for (i, digit) in encoded.chars().enumerate() {
        if i == 0 || digit != '0' {
            out.push(digit);
        }
    }
    out
}

// ============================================================================
// Bucket index
// ============================================================================

/// Code → the set of names sharing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneticIndex {
    names_by_code: HashMap<String, HashSet<String>>,
}

impl PhoneticIndex {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names_by_code: HashMap<String, HashSet<String>> = HashMap::new();
        for name in names {
            let name = name.into();
            names_by_code.entry(encode(&name)).or_default().insert(name);
        }
        Self { names_by_code }
    }

    pub fn bucket(&self, code: &str) -> Option<&HashSet<String>> {
        self.names_by_code.get(code)
    }

    /// All names phonetically equal to `query`, sorted for stable output.
    pub fn candidates_for(&self, query: &str) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .bucket(&encode(query))
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();
        candidates.sort();
        candidates
    }

    pub fn len(&self) -> usize {
        self.names_by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_code.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
