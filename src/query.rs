use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    league::{fold_diacritics, league_matches},
    snapshot::MatchRecord,
    utils::parse_leading_digits,
};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Time,
    League,
    Home,
    Away,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "time" => Some(Self::Time),
            "league" => Some(Self::League),
            "home" => Some(Self::Home),
            "away" => Some(Self::Away),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub league: Option<String>,
    pub search: Option<String>,
    /// Set when only fixtures on this calendar day are wanted.
    pub on_date: Option<NaiveDate>,
    pub page: usize,
    pub page_size: usize,
    /// `None` keeps input order (unrecognised sort value).
    pub sort: Option<SortKey>,
    pub include_stats: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            league: None,
            search: None,
            on_date: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Some(SortKey::Time),
            include_stats: false,
        }
    }
}

/// Raw `/api/matches` query string. Every field stays a string so no input
/// can be rejected at extraction time.
#[derive(Debug, Clone, Default)]
pub struct MatchesParams {
    pub league: Option<String>,
    pub search: Option<String>,
    pub today: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub include_stats: Option<String>,
}

fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(parse_leading_digits)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

impl MatchesParams {
    /// Build from decoded `key=value` pairs. The first occurrence of a key
    /// wins; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut p = Self::default();
        for (k, v) in pairs {
            let slot = match k.as_ref() {
                "league" => &mut p.league,
                "search" => &mut p.search,
                "today" => &mut p.today,
                "page" => &mut p.page,
                "limit" => &mut p.limit,
                "sort" => &mut p.sort,
                "includeStats" => &mut p.include_stats,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(v.into());
            }
        }
        p
    }

    /// Resolve to engine options. `as_of` is the day `today=true` refers to.
    pub fn to_options(&self, as_of: NaiveDate) -> QueryOptions {
        let sort = match self.sort.as_deref() {
            None | Some("") => Some(SortKey::Time),
            Some(s) => SortKey::parse(s),
        };
        QueryOptions {
            league: non_empty(self.league.as_deref()),
            search: non_empty(self.search.as_deref()),
            on_date: (self.today.as_deref() == Some("true")).then_some(as_of),
            page: positive_or(self.page.as_deref(), DEFAULT_PAGE),
            page_size: positive_or(self.limit.as_deref(), DEFAULT_PAGE_SIZE),
            sort,
            include_stats: self.include_stats.as_deref() == Some("true"),
        }
    }
}

/// One page of results plus pagination and aggregate metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub matches: Vec<MatchRecord>,
    pub count: usize,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "leagueStats", skip_serializing_if = "Option::is_none")]
    pub league_stats: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<JsonValue>,
}

/// Per-league fixture counts over every record. Blank leagues are skipped.
pub fn league_counts(records: &[MatchRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for league in records.iter().filter_map(|m| m.league.as_deref()) {
        if league.is_empty() {
            continue;
        }
        *counts.entry(league.to_string()).or_insert(0) += 1;
    }
    counts
}

fn contains_ci(field: Option<&str>, needle_lower: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle_lower))
}

/// Approximates a locale collation: accent- and case-insensitive first, raw
/// text as the tie-breaker.
fn collation_key(s: &str) -> (String, String) {
    (fold_diacritics(s).to_lowercase(), s.to_string())
}

/// Stable; text keys are computed once per record.
fn sort_records(records: &mut [&MatchRecord], key: SortKey) {
    match key {
        SortKey::Time => records.sort_by_key(|m| m.ts.unwrap_or(0)),
        SortKey::League => records.sort_by_cached_key(|m| collation_key(m.league_str())),
        SortKey::Home => records.sort_by_cached_key(|m| collation_key(m.home_str())),
        SortKey::Away => records.sort_by_cached_key(|m| collation_key(m.away_str())),
    }
}

/// Filter, sort and paginate `records`. Never fails; the input is not modified.
///
/// Order of work: league counts over the full input (if asked), league
/// filter, date filter, text search, stable sort, then the page slice.
pub fn query(
    records: &[MatchRecord],
    opts: &QueryOptions,
    generated_at: Option<JsonValue>,
) -> ResultEnvelope {
    let league_stats = opts.include_stats.then(|| league_counts(records));

    let mut selected: Vec<&MatchRecord> = records.iter().collect();

    if let Some(filter) = opts.league.as_deref().filter(|s| !s.is_empty()) {
        selected.retain(|m| m.league.as_deref().is_some_and(|l| league_matches(l, filter)));
    }

    if let Some(day) = opts.on_date {
        let wanted = day.format("%Y-%m-%d").to_string();
        selected.retain(|m| m.date.as_deref() == Some(wanted.as_str()));
    }

    if let Some(term) = opts.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = term.to_lowercase();
        selected.retain(|m| {
            contains_ci(m.home.as_deref(), &needle)
                || contains_ci(m.away.as_deref(), &needle)
                || contains_ci(m.league.as_deref(), &needle)
        });
    }

    if let Some(key) = opts.sort {
        sort_records(&mut selected, key);
    }

    let page = if opts.page == 0 { DEFAULT_PAGE } else { opts.page };
    let limit = if opts.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        opts.page_size
    };

    let total = selected.len();
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);
    let matches: Vec<MatchRecord> = selected[start..end].iter().map(|m| (*m).clone()).collect();

    ResultEnvelope {
        count: matches.len(),
        matches,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
        league_stats,
        generated_at,
    }
}
