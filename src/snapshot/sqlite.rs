//! Reader for the vPIC database image
//!
//! Converts the bundled SQLite image into plain record vectors. The
//! connection lives only for the duration of the load and is opened
//! read-only; after this module returns, no database handle remains.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags};

use crate::snapshot::records::{ElementRecord, PatternRecord, WmiRecord};
use crate::types::{Result, VinError};

/// Everything read from the image, before index construction
#[derive(Debug)]
pub(crate) struct RawSnapshot {
    pub wmis: Vec<WmiRecord>,
    pub patterns: Vec<PatternRecord>,
    pub elements: Vec<ElementRecord>,
    pub version: String,
    pub release_date: NaiveDate,
}

/// Read the whole snapshot image at `path`.
pub(crate) fn read_snapshot_image(path: &Path) -> Result<RawSnapshot> {
    log::debug!("opening vPIC snapshot image {:?}", path);

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| unavailable(path, "open", e))?;

    let (version, release) = read_version(&conn).map_err(|e| unavailable(path, "version", e))?;
    let release_date = parse_date(&release).ok_or_else(|| {
        VinError::SnapshotUnavailable(format!(
            "malformed release date {:?} in {}",
            release,
            path.display()
        ))
    })?;
    let wmis = read_wmis(&conn).map_err(|e| unavailable(path, "wmi", e))?;
    let patterns = read_patterns(&conn).map_err(|e| unavailable(path, "pattern", e))?;
    let elements = read_elements(&conn).map_err(|e| unavailable(path, "element", e))?;

    Ok(RawSnapshot {
        wmis,
        patterns,
        elements,
        version,
        release_date,
    })
}

fn unavailable(path: &Path, table: &str, err: rusqlite::Error) -> VinError {
    VinError::SnapshotUnavailable(format!(
        "failed reading {} from {}: {}",
        table,
        path.display(),
        err
    ))
}

fn read_version(conn: &Connection) -> rusqlite::Result<(String, String)> {
    conn.query_row(
        "SELECT version, release_date FROM vpic_version LIMIT 1;",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

fn read_wmis(conn: &Connection) -> rusqlite::Result<Vec<WmiRecord>> {
    let mut stmt = conn.prepare(
        "SELECT w.wmi, w.vis_suffix, m.name, k.name, t.name, w.country, \
                w.created_on, w.updated_on \
         FROM wmi w \
         JOIN manufacturer m ON m.id = w.manufacturer_id \
         LEFT JOIN make k ON k.id = w.make_id \
         LEFT JOIN vehicle_type t ON t.id = w.vehicle_type_id;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(WmiRecord {
            wmi_code: row.get(0)?,
            vis_suffix: row.get(1)?,
            manufacturer_name: row.get(2)?,
            make_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            vehicle_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            country: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            created_on: row.get::<_, Option<String>>(6)?.as_deref().and_then(parse_date),
            updated_on: row.get::<_, Option<String>>(7)?.as_deref().and_then(parse_date),
        })
    })?;
    rows.collect()
}

fn read_patterns(conn: &Connection) -> rusqlite::Result<Vec<PatternRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, wmi, key_pattern, element_id, value, year_from, year_to \
         FROM pattern;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PatternRecord {
            id: row.get(0)?,
            wmi: row.get(1)?,
            key_pattern: row.get(2)?,
            element_id: row.get(3)?,
            element_value: row.get(4)?,
            year_from: row.get::<_, Option<i64>>(5)?.map(|y| y as u16),
            year_to: row.get::<_, Option<i64>>(6)?.map(|y| y as u16),
        })
    })?;
    rows.collect()
}

fn read_elements(conn: &Connection) -> rusqlite::Result<Vec<ElementRecord>> {
    let mut stmt = conn.prepare("SELECT element_id, name, \"group\" FROM element;")?;
    let rows = stmt.query_map([], |row| {
        Ok(ElementRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            group: row.get(2)?,
        })
    })?;
    rows.collect()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-10-21"),
            NaiveDate::from_ymd_opt(2024, 10, 21)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_missing_image_is_unavailable() {
        let err = read_snapshot_image(Path::new("/nonexistent/vpic.db")).unwrap_err();
        assert!(matches!(err, VinError::SnapshotUnavailable(_)));
    }
}
