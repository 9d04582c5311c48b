//! Pattern resolution engine
//!
//! Given a validated VIN and its model year, this module picks the matching
//! WMI record and walks that WMI's pattern rows in precedence order,
//! collecting element assignments. Rows are gated twice before they can
//! assign anything: the model year must fall inside the row's year scope,
//! and the row's key must match the VIN starting at position 4. The first
//! matching row wins for any given element; later rows never overwrite.

use std::collections::HashMap;

use crate::snapshot::{PatternRecord, Snapshot, WmiRecord};
use crate::types::ModelYear;
use crate::vin::Vin;

/// The outcome of resolving one VIN against the snapshot
#[derive(Debug)]
pub(crate) struct Resolution<'a> {
    /// The matched WMI record, if the snapshot knows this manufacturer
    pub wmi: Option<&'a WmiRecord>,
    /// Element name -> assigned value, first match per element
    pub elements: HashMap<&'a str, &'a str>,
}

/// Select the WMI record for a VIN. Specialized six-character manufacturers
/// (matching both the 3-character prefix and characters 12-14) take
/// precedence over mass-market three-character WMIs.
pub(crate) fn select_wmi<'a>(snapshot: &'a Snapshot, vin: &Vin) -> Option<&'a WmiRecord> {
    if let Some(record) = snapshot.wmi6(vin.wmi3(), vin.wmi6_suffix()) {
        return Some(record);
    }
    snapshot.wmi3(vin.wmi3())
}

/// Resolve element assignments for a VIN.
pub(crate) fn resolve<'a>(
    snapshot: &'a Snapshot,
    vin: &Vin,
    model_year: ModelYear,
) -> Resolution<'a> {
    let wmi = select_wmi(snapshot, vin);

    // Patterns are keyed by the full WMI string; with no WMI record the
    // 3-character prefix is still tried, in case the snapshot carries
    // orphaned pattern rows for it.
    let pattern_key = match wmi {
        Some(record) => record.full_code(),
        None => vin.wmi3().to_string(),
    };
    log::debug!(
        "resolving {} against WMI {} ({} patterns)",
        vin,
        pattern_key,
        snapshot.patterns_for(&pattern_key).len()
    );

    let mut elements: HashMap<&str, &str> = HashMap::new();
    for pattern in snapshot.patterns_for(&pattern_key) {
        if !year_in_scope(pattern, model_year) {
            continue;
        }
        if !key_matches(pattern, vin) {
            continue;
        }
        let Some(name) = snapshot.element_name(pattern.element_id) else {
            log::trace!("pattern {} references unknown element {}", pattern.id, pattern.element_id);
            continue;
        };
        elements.entry(name).or_insert(&pattern.element_value);
    }

    Resolution { wmi, elements }
}

/// A row applies when the decoded year falls inside its scope. An unknown
/// model year admits only rows that are unbounded on both ends.
fn year_in_scope(pattern: &PatternRecord, model_year: ModelYear) -> bool {
    match model_year {
        ModelYear::Year(year) => pattern.includes_year(year),
        ModelYear::Unknown => pattern.is_year_unbounded(),
    }
}

/// Match the key against the VIN starting at position 4; `*` matches any
/// single position.
fn key_matches(pattern: &PatternRecord, vin: &Vin) -> bool {
    let vin_bytes = &vin.as_str().as_bytes()[3..];
    pattern
        .key_pattern
        .bytes()
        .zip(vin_bytes)
        .all(|(key_byte, &vin_byte)| key_byte == b'*' || key_byte == vin_byte)
}
