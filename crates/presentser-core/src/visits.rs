use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitStats {
    pub unique_visitors: usize,
    pub total_hits: u64,
}

/// Hit counter plus the set of distinct visitor ids seen so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitLog {
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub visitors: BTreeMap<String, Visitor>,
}

impl VisitLog {
    pub fn load(path: &Path) -> Result<Self> {
        match crate::io::read_optional(path)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Count one hit from `vid`, keeping its original `first_seen`.
    pub fn track(&mut self, vid: &str, path: &str, now: DateTime<Utc>) {
        self.total_hits += 1;
        let first_seen = self
            .visitors
            .get(vid)
            .map(|v| v.first_seen)
            .unwrap_or(now);
        self.visitors.insert(
            vid.to_string(),
            Visitor {
                first_seen,
                last_seen: now,
                path: path.to_string(),
            },
        );
    }

    pub fn stats(&self) -> VisitStats {
        VisitStats {
            unique_visitors: self.visitors.len(),
            total_hits: self.total_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn track_counts_hits_and_unique_visitors() {
        let mut log = VisitLog::default();
        let t0 = Utc::now();
        log.track("v1", "/", t0);
        log.track("v1", "/about", t0 + Duration::seconds(5));
        log.track("v2", "/", t0);

        let stats = log.stats();
        assert_eq!(stats.total_hits, 3);
        assert_eq!(stats.unique_visitors, 2);
    }

    #[test]
    fn track_keeps_first_seen() {
        let mut log = VisitLog::default();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(1);
        log.track("v1", "/", t0);
        log.track("v1", "/about", t1);

        let v = &log.visitors["v1"];
        assert_eq!(v.first_seen, t0);
        assert_eq!(v.last_seen, t1);
        assert_eq!(v.path, "/about");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("visits.json");
        let mut log = VisitLog::default();
        log.track("v1", "/", Utc::now());
        log.save(&path).unwrap();
        assert_eq!(VisitLog::load(&path).unwrap().stats().total_hits, 1);
    }

    #[test]
    fn load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = VisitLog::load(&dir.path().join("visits.json")).unwrap();
        assert_eq!(log.stats().unique_visitors, 0);
    }
}
