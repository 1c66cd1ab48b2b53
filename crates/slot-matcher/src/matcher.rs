//! Substring matchers over slot dictionaries.
//!
//! Neither matcher folds case. Pages that want case-insensitive matching pass
//! an already lowercased query.

use crate::Dictionary;

/// Return the last canonical value whose trigger occurs in `query`.
///
/// Every `(value, trigger)` pair is scanned in definition order and a later
/// match replaces an earlier one, so when several values match the one defined
/// last in the dictionary wins.
pub fn match_single<'d>(query: &str, dictionary: &'d Dictionary) -> Option<&'d str> {
    let mut found = None;
    for (value, trigger) in dictionary.pairs() {
        if query.contains(trigger) {
            found = Some(value);
        }
    }
    found
}

/// Return every canonical value with a trigger occurring in `query`.
///
/// Values come out in definition order, once per matching trigger. A value
/// with two matching triggers is reported twice.
pub fn match_multiple<'d>(query: &str, dictionary: &'d Dictionary) -> Vec<&'d str> {
    dictionary
        .pairs()
        .filter(|(_, trigger)| query.contains(trigger))
        .map(|(value, _)| value)
        .collect()
}

/// Like [`match_single`], but a trigger only counts when it stands as whole
/// words: "one" matches "just one" and not "someone", "1" does not match "11".
pub fn match_single_word<'d>(query: &str, dictionary: &'d Dictionary) -> Option<&'d str> {
    let mut found = None;
    for (value, trigger) in dictionary.pairs() {
        if find_phrase(query, trigger).is_some() {
            found = Some(value);
        }
    }
    found
}

/// True when any phrase occurs in `query` as a substring
pub fn contains_any(query: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| query.contains(p))
}

/// Byte offset of the earliest substring occurrence of any phrase
pub fn find_any(query: &str, phrases: &[&str]) -> Option<usize> {
    phrases.iter().filter_map(|p| query.find(p)).min()
}

/// True when any of `words` appears in `query` as a whole word
pub fn contains_word(query: &str, words: &[&str]) -> bool {
    find_word(query, words).is_some()
}

/// Byte offset of the first token of `query` that is one of `words`
pub fn find_word(query: &str, words: &[&str]) -> Option<usize> {
    let mut start = None;
    let ends = query.char_indices().chain(std::iter::once((query.len(), ' ')));
    for (i, c) in ends {
        if is_word_char(c) {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            if words.contains(&&query[s..i]) {
                return Some(s);
            }
        }
    }
    None
}

/// Byte offset of the first occurrence of `phrase` bounded by non-word
/// characters (or the ends of `query`)
pub fn find_phrase(query: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return None;
    }
    query.match_indices(phrase).map(|(i, _)| i).find(|&i| {
        let before = query[..i].chars().next_back();
        let after = query[i + phrase.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\''
}
