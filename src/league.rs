//! League-name folding and the league filter predicates.
//!
//! League names reach the filter as display names ("Séria B"), accented or
//! plain, or as route slugs ("seria-b"). Each accepted form has its own
//! predicate; a record matches when any of them holds.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static RE_NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w-]").expect("Invalid regex"));

/// Canonical decomposition with combining marks removed. Letters without a
/// decomposition (`ß`, `ø`, CJK) pass through unchanged.
pub fn fold_diacritics(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapse each whitespace run to a single hyphen.
pub fn hyphenate(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, "-").into_owned()
}

/// URL-safe token: lowercase, no diacritics, whitespace to `-`, and only word
/// characters or hyphens kept.
pub fn slugify(s: &str) -> String {
    let folded = fold_diacritics(&s.to_lowercase()).to_lowercase();
    let hyphens = hyphenate(&folded);
    RE_NON_SLUG.replace_all(&hyphens, "").into_owned()
}

/// Case-insensitive equality of the raw strings.
pub fn matches_exact(league: &str, filter: &str) -> bool {
    league.to_lowercase() == filter.to_lowercase()
}

/// Case-insensitive equality once diacritics are stripped from both sides.
pub fn matches_folded(league: &str, filter: &str) -> bool {
    fold_diacritics(league).to_lowercase() == fold_diacritics(filter).to_lowercase()
}

/// Slug comparison. The filter side is only lowercased and hyphenated; the
/// league side is compared both fully slugified and folded-then-hyphenated.
pub fn matches_slug(league: &str, filter: &str) -> bool {
    let wanted = hyphenate(&filter.to_lowercase());
    if slugify(league) == wanted {
        return true;
    }
    hyphenate(&fold_diacritics(league).to_lowercase()) == wanted
}

const PREDICATES: [fn(&str, &str) -> bool; 3] = [matches_exact, matches_folded, matches_slug];

/// True when `league` satisfies any of the league predicates for `filter`.
pub fn league_matches(league: &str, filter: &str) -> bool {
    PREDICATES.iter().any(|p| p(league, filter))
}
