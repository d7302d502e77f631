// Memoizing loaded tables per source file.
//
// The loaded table is the only long-lived resource of a session. It is
// immutable, so embedding hosts can hand out shared references freely;
// the cache is keyed by path and fingerprinted with the file metadata so
// a replaced file is picked up on the next load.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, info};

use survey_map::Table;

use crate::app::AppResult;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Fingerprint {
    len: u64,
    modified_ns: u128,
}

fn fingerprint(path: &str) -> Option<Fingerprint> {
    let meta = fs::metadata(path).ok()?;
    let modified_ns = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Some(Fingerprint {
        len: meta.len(),
        modified_ns,
    })
}

#[derive(Default)]
pub struct TableCache {
    entries: HashMap<String, (Fingerprint, Arc<Table>)>,
}

impl TableCache {
    pub fn new() -> TableCache {
        TableCache::default()
    }

    /// Returns the cached table for `path` if the file is unchanged,
    /// otherwise reads it with `read` and caches the result.
    pub fn load<F>(&mut self, path: &str, read: F) -> AppResult<Arc<Table>>
    where
        F: FnOnce(&str) -> AppResult<Table>,
    {
        let fp = fingerprint(path);
        if let (Some(fp), Some((cached_fp, table))) = (fp, self.entries.get(path)) {
            if *cached_fp == fp {
                debug!("TableCache: hit for {}", path);
                return Ok(table.clone());
            }
        }
        info!("TableCache: loading {}", path);
        let table = Arc::new(read(path)?);
        if let Some(fp) = fp {
            self.entries.insert(path.to_string(), (fp, table.clone()));
        }
        Ok(table)
    }

    /// Drops the cached entry for `path`, forcing a re-read on the next
    /// load.
    pub fn invalidate(&mut self, path: &str) {
        self.entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn repeated_loads_reuse_the_table() {
        let path = std::env::temp_dir().join(format!("parkmap-cache-{}.csv", std::process::id()));
        fs::write(&path, "x").unwrap();
        let key = path.to_str().unwrap();

        let calls = Cell::new(0usize);
        let mut cache = TableCache::new();

        let t1 = cache
            .load(key, |_| {
                calls.set(calls.get() + 1);
                Ok(Table::default())
            })
            .unwrap();
        let t2 = cache
            .load(key, |_| {
                calls.set(calls.get() + 1);
                Ok(Table::default())
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(t1, t2);

        cache.invalidate(key);
        cache
            .load(key, |_| {
                calls.set(calls.get() + 1);
                Ok(Table::default())
            })
            .unwrap();
        assert_eq!(calls.get(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn a_missing_file_is_not_cached() {
        let mut cache = TableCache::new();
        let res = cache.load("/does/not/exist.xlsx", |_| Ok(Table::default()));
        // The read closure decides the error; here it succeeded, but the
        // entry has no fingerprint so nothing was cached.
        assert!(res.is_ok());
        let calls = Cell::new(0usize);
        cache
            .load("/does/not/exist.xlsx", |_| {
                calls.set(calls.get() + 1);
                Ok(Table::default())
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
    }
}
