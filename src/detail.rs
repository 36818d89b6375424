use serde::Serialize;

use crate::{
    league::slugify,
    query::{query, QueryOptions, SortKey},
    snapshot::MatchRecord,
};

/// Canonical route for a fixture: `<league>/<home>-vs-<away>-<ts>`.
pub fn match_path(m: &MatchRecord) -> String {
    let league = m.league.as_deref().unwrap_or("match");
    let home = m.home.as_deref().unwrap_or("home");
    let away = m.away.as_deref().unwrap_or("away");
    format!(
        "{}/{}-vs-{}-{}",
        slugify(league),
        slugify(home),
        slugify(away),
        m.ts.unwrap_or(0)
    )
}

/// Kickoff timestamp carried as the last `-` segment of a match slug.
pub fn ts_from_slug(slug: &str) -> Option<i64> {
    slug.rsplit('-').next()?.parse::<i64>().ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    #[serde(rename = "match")]
    pub fixture: MatchRecord,
    pub path: String,
    pub related: Vec<MatchRecord>,
}

/// Find the fixture addressed by `league_slug`/`match_slug` and up to
/// `related_limit` other fixtures of the same league, earliest first.
pub fn find_match(
    records: &[MatchRecord],
    league_slug: &str,
    match_slug: &str,
    related_limit: usize,
) -> Option<MatchDetail> {
    let ts = ts_from_slug(match_slug)?;
    let fixture = records
        .iter()
        .find(|m| m.ts == Some(ts) && slugify(m.league.as_deref().unwrap_or("match")) == league_slug)?
        .clone();

    let related = match fixture.league.as_deref().filter(|l| !l.is_empty()) {
        Some(league) if related_limit > 0 => {
            let opts = QueryOptions {
                league: Some(league.to_string()),
                sort: Some(SortKey::Time),
                page_size: usize::MAX,
                ..Default::default()
            };
            query(records, &opts, None)
                .matches
                .into_iter()
                .filter(|m| m.ts != Some(ts))
                .take(related_limit)
                .collect()
        }
        _ => Vec::new(),
    };

    Some(MatchDetail {
        path: match_path(&fixture),
        fixture,
        related,
    })
}
