//! Raw generator lines to the canonical uppercase `A-Z` word set.

use std::collections::BTreeSet;

use wordlist_shared::{Result, WordlistError};

/// Name recorded in metadata for the normalization below.
pub const NORMALIZATION_METHOD: &str = "uppercase-alpha-strip";

/// Uppercase each line, drop every character outside `A-Z`, dedupe, sort.
///
/// Empty results are discarded, so every returned word matches `^[A-Z]+$`.
pub fn normalize_words(raw: &str) -> Vec<String> {
    raw.split(is_line_break)
        .filter_map(normalize_line)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every Unicode line boundary, not just `\n` and `\r\n`. A stray form feed
/// or vertical tab separates words instead of gluing them together.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn normalize_line(line: &str) -> Option<String> {
    let word: String = line
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_uppercase)
        .collect();
    (!word.is_empty()).then_some(word)
}

/// Check that `words` is strictly ascending (sorted, no duplicates).
///
/// A failure here means the normalizer itself is broken.
pub fn assert_sorted_unique(words: &[String]) -> Result<()> {
    for (idx, pair) in words.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(WordlistError::Invariant {
                index: idx + 1,
                previous: pair[0].clone(),
                current: pair[1].clone(),
            });
        }
    }
    Ok(())
}

/// File contents for the word list: one word per line, trailing newline.
pub fn render_word_list(words: &[String]) -> String {
    let mut out = words.join("\n");
    out.push('\n');
    out
}
