/// Top-N high-score table and its on-disk store.
///
/// The table is kept sorted by score, highest first.  Loading and saving
/// never interrupt play: failures are logged and the game carries on with
/// whatever is in memory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::config::RankingConfig;
use crate::entities::RankingEntry;

// ── Persistence ───────────────────────────────────────────────────────────────

pub trait RankingStore {
    fn load(&self) -> Result<Vec<RankingEntry>>;
    fn save(&self, entries: &[RankingEntry]) -> Result<()>;
}

/// JSON array in a single file.  A missing file is an empty table.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.anti_aircraft_rankings.json`, or the working directory when
    /// `HOME` is unset.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".anti_aircraft_rankings.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RankingStore for JsonFileStore {
    fn load(&self) -> Result<Vec<RankingEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read(&self.path)
            .with_context(|| format!("reading rankings {}", self.path.display()))?;
        let entries = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing rankings {}", self.path.display()))?;
        Ok(entries)
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<()> {
        let raw = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing rankings {}", self.path.display()))?;
        Ok(())
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    entries: Vec<RankingEntry>,
    capacity: usize,
    max_name_len: usize,
}

impl Ranking {
    pub fn new(cfg: &RankingConfig) -> Self {
        Self::with_entries(cfg, Vec::new())
    }

    /// Adopt existing entries, re-sorting and trimming to capacity.
    pub fn with_entries(cfg: &RankingConfig, mut entries: Vec<RankingEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(cfg.capacity);
        Self {
            entries,
            capacity: cfg.capacity,
            max_name_len: cfg.max_name_len,
        }
    }

    /// Load from `store`, falling back to an empty table on any error.
    pub fn load_or_empty(store: &dyn RankingStore, cfg: &RankingConfig) -> Self {
        match store.load() {
            Ok(entries) => Self::with_entries(cfg, entries),
            Err(err) => {
                tracing::warn!("could not load rankings, starting empty: {err:#}");
                Self::new(cfg)
            }
        }
    }

    /// Write to `store`.  Returns whether it worked; errors are only logged.
    pub fn persist(&self, store: &dyn RankingStore) -> bool {
        match store.save(&self.entries) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("could not save rankings: {err:#}");
                false
            }
        }
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// A score makes the table if there is a free slot or it beats the
    /// current lowest.
    pub fn qualifies(&self, score: u32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries
            .iter()
            .map(|e| e.score)
            .min()
            .map_or(true, |lowest| score > lowest)
    }

    /// Record `score` for `name` and return its 0-based position, or `None`
    /// if the name is blank or the score doesn't qualify.
    pub fn insert(&mut self, name: &str, score: u32, now_unix_s: u64) -> Option<usize> {
        let name: String = name.trim().chars().take(self.max_name_len).collect();
        let name = name.trim_end().to_string();
        if name.is_empty() || !self.qualifies(score) {
            return None;
        }

        let id = Uuid::new_v4().to_string();
        self.entries.push(RankingEntry {
            id: id.clone(),
            player_name: name,
            score,
            date: format_date(now_unix_s),
            recorded_at_unix_s: now_unix_s,
        });
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// `YYYY-MM-DD` for a unix timestamp, UTC (days-to-civil conversion).
pub fn format_date(unix_s: u64) -> String {
    let days = (unix_s / 86_400) as i64;
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    format!("{year:04}-{month:02}-{day:02}")
}
