//! Cache of calibration files known to be updatable.
//!
//! dispcal can only update (`-u`) a calibration that records how it was
//! made. Checking means parsing the file, so results are cached per path and
//! invalidated when the file's modification time changes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use dcal_cgats::Cgats;
use tracing::{debug, warn};

/// Keywords an updatable CAL must define.
pub const UPDATE_KEYWORDS: [&str; 4] = [
    "TARGET_WHITE_XYZ",
    "TARGET_GAMMA",
    "BLACK_POINT_CORRECTION",
    "QUALITY",
];

#[derive(Debug)]
struct CachedCal {
    mtime: SystemTime,
    cal: Cgats,
}

/// Thread-safe, path-keyed cache of updatable CAL files.
///
/// # Example
///
/// ```rust,no_run
/// use dcal_calib::CalCache;
///
/// let cache = CalCache::new();
/// if cache.can_update_cal("display.cal") {
///     println!("dispcal -u will work");
/// }
/// ```
#[derive(Debug, Default)]
pub struct CalCache {
    entries: Mutex<HashMap<PathBuf, CachedCal>>,
}

impl CalCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the CAL at `path` can be updated by dispcal.
    ///
    /// True when the file is a display calibration (`DEVICE_CLASS
    /// "DISPLAY"`) and defines all of [`UPDATE_KEYWORDS`]. Unreadable or
    /// unparseable files give `false` and are evicted.
    pub fn can_update_cal<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let mtime = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                warn!("Cannot stat '{}': {}", path.display(), e);
                return false;
            }
        };
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.get(&key).is_some_and(|c| c.mtime == mtime) {
            return true;
        }

        match Cgats::from_path(path) {
            Ok(cal) if is_updatable(&cal) => {
                debug!("Caching updatable calibration {}", key.display());
                entries.insert(key, CachedCal { mtime, cal });
                true
            }
            Ok(_) => {
                entries.remove(&key);
                false
            }
            Err(e) => {
                entries.remove(&key);
                warn!("Couldn't process CGATS file '{}': {}", path.display(), e);
                false
            }
        }
    }

    /// Cached calibration for `path`, if it was found updatable.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Cgats> {
        let path = path.as_ref();
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).map(|c| c.cal.clone())
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Parses the CGATS file at `path`, logging and swallowing any error.
pub fn validate_cgats<P: AsRef<Path>>(path: P) -> Option<Cgats> {
    let path = path.as_ref();
    match Cgats::from_path(path) {
        Ok(cgats) => Some(cgats),
        Err(e) => {
            warn!("Couldn't process CGATS file '{}': {}", path.display(), e);
            None
        }
    }
}

fn is_updatable(cal: &Cgats) -> bool {
    cal.query_value_first("DEVICE_CLASS") == Some("DISPLAY")
        && UPDATE_KEYWORDS
            .iter()
            .all(|k| cal.query_value_first(k).is_some())
}
