 use std::{
     path::{Path, PathBuf},
     sync::Arc,
     time::SystemTime,
 };

 use anyhow::{Context, Result};
 use parking_lot::RwLock;
 use serde::{Deserialize, Deserializer, Serialize};
 use serde_json::{Map, Value as JsonValue};

 /// Kickoff seconds from an integer, a float (truncated) or a numeric string.
 /// Anything else reads as missing.
 fn lenient_ts<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
     let raw = Option::<JsonValue>::deserialize(d)?;
     let as_f64 = |f: f64| f.is_finite().then(|| f.trunc() as i64);
     Ok(match raw {
         Some(JsonValue::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(as_f64)),
         Some(JsonValue::String(s)) => {
             let t = s.trim();
             t.parse::<i64>()
                 .ok()
                 .or_else(|| t.parse::<f64>().ok().and_then(as_f64))
         }
         _ => None,
     })
 }

 /// One fixture from the snapshot. Only `ts`, `date`, `league`, `home` and
 /// `away` drive queries; everything else is echoed back untouched.
 #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
 pub struct MatchRecord {
     #[serde(default, deserialize_with = "lenient_ts", skip_serializing_if = "Option::is_none")]
     pub ts: Option<i64>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub date: Option<String>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub time: Option<JsonValue>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub time_display: Option<JsonValue>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub league: Option<String>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub home: Option<String>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub away: Option<String>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub status: Option<JsonValue>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub score: Option<JsonValue>,
     #[serde(default, skip_serializing_if = "Option::is_none")]
     pub stadium: Option<JsonValue>,
     #[serde(flatten)]
     pub extra: Map<String, JsonValue>,
 }

 impl MatchRecord {
     pub fn league_str(&self) -> &str {
         self.league.as_deref().unwrap_or("")
     }

     pub fn home_str(&self) -> &str {
         self.home.as_deref().unwrap_or("")
     }

     pub fn away_str(&self) -> &str {
         self.away.as_deref().unwrap_or("")
     }
 }

 /// The persisted document: `{ "matches": [...], "generated_at": ... }`.
 #[derive(Debug, Clone, Default, Serialize, Deserialize)]
 pub struct Snapshot {
     #[serde(default)]
     pub matches: Vec<MatchRecord>,
     #[serde(default)]
     pub generated_at: Option<JsonValue>,
 }

 impl Snapshot {
     pub fn from_json(raw: &str) -> Result<Self> {
         serde_json::from_str(raw).context("parse matches snapshot")
     }
 }

 struct Cached {
     modified: Option<SystemTime>,
     snapshot: Arc<Snapshot>,
 }

 /// Reads the snapshot file. Without caching every `load` re-reads and
 /// re-parses the file; with caching the parsed document is kept until the
 /// file's modification time changes.
 #[derive(Clone)]
 pub struct SnapshotSource {
     path: PathBuf,
     cache: Option<Arc<RwLock<Option<Cached>>>>,
 }

 impl SnapshotSource {
     pub fn new(path: impl AsRef<Path>, cache: bool) -> Self {
         Self {
             path: path.as_ref().to_path_buf(),
             cache: cache.then(|| Arc::new(RwLock::new(None))),
         }
     }

     pub fn path(&self) -> &Path {
         &self.path
     }

     pub fn is_cached(&self) -> bool {
         self.cache.is_some()
     }

     pub fn load(&self) -> Result<Arc<Snapshot>> {
         let Some(cache) = &self.cache else {
             return self.read().map(Arc::new);
         };

         let modified = std::fs::metadata(&self.path)
             .with_context(|| format!("stat {}", self.path.display()))?
             .modified()
             .ok();

         if let Some(c) = cache.read().as_ref() {
             if modified.is_some() && c.modified == modified {
                 return Ok(c.snapshot.clone());
             }
         }

         let snapshot = Arc::new(self.read()?);
         log::info!(
             "snapshot.reload path={} matches={}",
             self.path.display(),
             snapshot.matches.len()
         );
         *cache.write() = Some(Cached {
             modified,
             snapshot: snapshot.clone(),
         });
         Ok(snapshot)
     }

     fn read(&self) -> Result<Snapshot> {
         let raw = std::fs::read_to_string(&self.path)
             .with_context(|| format!("read {}", self.path.display()))?;
         let snapshot = Snapshot::from_json(&raw)
             .with_context(|| format!("decode {}", self.path.display()))?;
         log::debug!(
             "snapshot.load path={} matches={}",
             self.path.display(),
             snapshot.matches.len()
         );
         Ok(snapshot)
     }
 }
