//! The immutable in-memory snapshot
//!
//! Loading happens once: the database image is read into record vectors,
//! indexes are built, and the result never changes again. Concurrent reads
//! need no locking because there is no writer. The process-wide default
//! instance is guarded by a one-shot initializer so only one thread ever
//! performs the load, and a failed load is remembered and surfaced to every
//! caller as `SnapshotUnavailable`.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;

use crate::constants::VIN_LENGTH;
use crate::snapshot::records::{PatternRecord, SnapshotStats, WmiRecord};
use crate::snapshot::sqlite::{read_snapshot_image, RawSnapshot};
use crate::types::{Result, VinError};

/// The bundled vPIC database image, shipped inside the library
const BUNDLED_IMAGE: &[u8] = include_bytes!("../../data/vpic.db");

/// Pattern keys start at VIN position 4 and may reach through position 10
const MAX_KEY_LENGTH: usize = 7;

/// Process-wide default snapshot; the `Err` arm remembers a failed load
static SHARED: OnceLock<std::result::Result<Arc<Snapshot>, String>> = OnceLock::new();

/// An immutable, indexed view of the vPIC reference tables
pub struct Snapshot {
    /// 3-char code -> the mass-market WMI record (null suffix)
    by_wmi3: HashMap<String, WmiRecord>,
    /// 3-char code -> specialized WMI records, sorted by suffix
    by_wmi6: HashMap<String, Vec<WmiRecord>>,
    /// Full WMI key -> pattern rows in evaluation order
    patterns_by_wmi: HashMap<String, Vec<PatternRecord>>,
    /// Element id -> element name
    element_name_by_id: HashMap<i64, String>,
    version: String,
    release_date: NaiveDate,
    max_model_year: u16,
}

impl Snapshot {
    /// Load a snapshot from a vPIC database image on disk.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("loading vPIC snapshot from {}", path.display());
        let raw = read_snapshot_image(path)?;
        let snapshot = Self::from_raw(raw);
        let stats = snapshot.stats();
        log::info!(
            "vPIC snapshot {} ({}) loaded: {} WMIs, {} patterns, {} elements",
            snapshot.version,
            snapshot.release_date,
            stats.num_wmis,
            stats.num_patterns,
            stats.num_elements
        );
        Ok(snapshot)
    }

    /// Load the database image bundled with the library.
    ///
    /// The embedded bytes are materialized to a temporary file for the
    /// one-time read; the file is gone as soon as loading finishes.
    pub fn bundled() -> Result<Self> {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| {
            VinError::SnapshotUnavailable(format!("cannot stage bundled snapshot: {}", e))
        })?;
        file.write_all(BUNDLED_IMAGE)
            .and_then(|_| file.flush())
            .map_err(|e| {
                VinError::SnapshotUnavailable(format!("cannot stage bundled snapshot: {}", e))
            })?;
        Self::load(file.path())
    }

    /// The process-wide default snapshot, loaded from the bundled image on
    /// first use. Exactly one caller performs the load; everyone else waits
    /// and shares the result.
    pub fn shared() -> Result<Arc<Self>> {
        let entry = SHARED.get_or_init(|| {
            Self::bundled()
                .map(Arc::new)
                .map_err(|e| e.to_string())
        });
        match entry {
            Ok(snapshot) => Ok(Arc::clone(snapshot)),
            Err(message) => Err(VinError::SnapshotUnavailable(message.clone())),
        }
    }

    /// Build the indexes from raw records.
    pub(crate) fn from_raw(raw: RawSnapshot) -> Self {
        let mut by_wmi3 = HashMap::new();
        let mut by_wmi6: HashMap<String, Vec<WmiRecord>> = HashMap::new();
        for wmi in raw.wmis {
            match wmi.vis_suffix {
                None => {
                    by_wmi3.insert(wmi.wmi_code.clone(), wmi);
                }
                Some(_) => {
                    by_wmi6.entry(wmi.wmi_code.clone()).or_default().push(wmi);
                }
            }
        }
        for records in by_wmi6.values_mut() {
            records.sort_by(|a, b| a.vis_suffix.cmp(&b.vis_suffix));
        }

        let mut patterns_by_wmi: HashMap<String, Vec<PatternRecord>> = HashMap::new();
        for pattern in raw.patterns {
            if pattern.key_pattern.len() > MAX_KEY_LENGTH {
                log::warn!(
                    "dropping pattern {} for WMI {}: key {:?} reaches past position 10",
                    pattern.id,
                    pattern.wmi,
                    pattern.key_pattern
                );
                continue;
            }
            patterns_by_wmi
                .entry(pattern.wmi.clone())
                .or_default()
                .push(pattern);
        }
        for rows in patterns_by_wmi.values_mut() {
            // Evaluation order: most specific key first (fewest wildcards,
            // then longest), then narrowest year range, then stable row id.
            rows.sort_by(|a, b| {
                a.wildcard_count()
                    .cmp(&b.wildcard_count())
                    .then(b.key_pattern.len().cmp(&a.key_pattern.len()))
                    .then(a.year_span().cmp(&b.year_span()))
                    .then(a.id.cmp(&b.id))
            });
        }

        let element_name_by_id = raw
            .elements
            .into_iter()
            .map(|element| (element.id, element.name))
            .collect();

        let max_model_year = max_model_year_for(raw.release_date);

        Snapshot {
            by_wmi3,
            by_wmi6,
            patterns_by_wmi,
            element_name_by_id,
            version: raw.version,
            release_date: raw.release_date,
            max_model_year,
        }
    }

    /// The mass-market WMI record for a 3-character code, if any
    pub fn wmi3(&self, code: &str) -> Option<&WmiRecord> {
        self.by_wmi3.get(code)
    }

    /// The specialized WMI record matching a 3-character prefix and the
    /// characters at VIN positions 12-14, if any
    pub fn wmi6(&self, prefix: &str, vis_suffix: &str) -> Option<&WmiRecord> {
        self.by_wmi6.get(prefix)?.iter().find(|record| {
            record
                .vis_suffix
                .as_deref()
                .is_some_and(|suffix| suffix == vis_suffix)
        })
    }

    /// Pattern rows for a full WMI key, already in evaluation order
    pub fn patterns_for(&self, wmi: &str) -> &[PatternRecord] {
        self.patterns_by_wmi
            .get(wmi)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The name of an element, if the snapshot defines it
    pub fn element_name(&self, element_id: i64) -> Option<&str> {
        self.element_name_by_id.get(&element_id).map(String::as_str)
    }

    /// The vPIC version string and release date of this snapshot
    pub fn vpic_version(&self) -> (&str, NaiveDate) {
        (&self.version, self.release_date)
    }

    /// The newest model year this snapshot can describe
    pub fn max_model_year(&self) -> u16 {
        self.max_model_year
    }

    /// Table sizes, mostly useful for logging and diagnostics
    pub fn stats(&self) -> SnapshotStats {
        let num_wmis =
            self.by_wmi3.len() + self.by_wmi6.values().map(Vec::len).sum::<usize>();
        let num_patterns = self.patterns_by_wmi.values().map(Vec::len).sum();
        SnapshotStats {
            num_wmis,
            num_patterns,
            num_elements: self.element_name_by_id.len(),
        }
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("release_date", &self.release_date)
            .field("wmis", &stats.num_wmis)
            .field("patterns", &stats.num_patterns)
            .field("elements", &stats.num_elements)
            .finish()
    }
}

/// vPIC releases mid-year and already carries next-model-year patterns.
fn max_model_year_for(release_date: NaiveDate) -> u16 {
    use chrono::Datelike;
    (release_date.year().clamp(1980, i32::from(u16::MAX) - 1) as u16) + 1
}

// Sanity check: a key of MAX_KEY_LENGTH starting at position 4 ends at
// position 10, inside the 17-character VIN.
const _: () = assert!(3 + MAX_KEY_LENGTH < VIN_LENGTH);


#[cfg(test)]
mod tests {
    use super::testing::{pattern, snapshot, wmi};
    use super::*;

    #[test]
    fn test_wmi_indexes_split_by_suffix() {
        let snap = snapshot(
            vec![
                wmi("5FN", None, "Honda", "Honda"),
                wmi("YT9", Some("007"), "Koenigsegg", "Koenigsegg"),
                wmi("YT9", Some("032"), "Polestar", "Polestar"),
            ],
            vec![],
        );

        assert!(snap.wmi3("5FN").is_some());
        assert!(snap.wmi3("YT9").is_none());
        assert_eq!(
            snap.wmi6("YT9", "007").unwrap().manufacturer_name,
            "Koenigsegg"
        );
        assert_eq!(
            snap.wmi6("YT9", "032").unwrap().manufacturer_name,
            "Polestar"
        );
        assert!(snap.wmi6("YT9", "999").is_none());
        assert_eq!(snap.stats().num_wmis, 3);
    }

    #[test]
    fn test_pattern_evaluation_order() {
        let snap = snapshot(
            vec![wmi("4T1", None, "Toyota", "Toyota")],
            vec![
                pattern(1, "4T1", "B*", 28, "wildcard-short", None),
                pattern(2, "4T1", "BE46K", 28, "exact-long", None),
                pattern(3, "4T1", "BE46K", 28, "narrow-years", Some((2008, 2010))),
                pattern(4, "4T1", "BE4", 28, "exact-short", None),
            ],
        );

        let order: Vec<i64> = snap.patterns_for("4T1").iter().map(|p| p.id).collect();
        // No wildcards first (longest key, then narrower years before the
        // unbounded row with the same key), wildcard rows last.
        assert_eq!(order, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_overlong_keys_are_dropped() {
        let snap = snapshot(
            vec![wmi("4T1", None, "Toyota", "Toyota")],
            vec![pattern(1, "4T1", "BE46K19U", 28, "too-long", None)],
        );
        assert!(snap.patterns_for("4T1").is_empty());
    }

    #[test]
    fn test_element_names() {
        let snap = snapshot(vec![], vec![]);
        assert_eq!(snap.element_name(28), Some("Model"));
        assert_eq!(snap.element_name(9999), None);
    }

    #[test]
    fn test_max_model_year_follows_release_date() {
        let snap = snapshot(vec![], vec![]);
        assert_eq!(snap.max_model_year(), 2025);
    }

    #[test]
    fn test_bundled_snapshot_loads() {
        let snap = Snapshot::bundled().unwrap();
        let (version, release) = snap.vpic_version();
        assert!(!version.is_empty());
        assert!(release > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(snap.stats().num_patterns > 0);
    }
}
