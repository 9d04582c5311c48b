//! Record types for the vPIC reference snapshot
//!
//! These are plain owned rows read once from the bundled database image.
//! Lookup tables (manufacturer, make, vehicle type) are joined away at load
//! time so records carry resolved names, not foreign keys.

use chrono::NaiveDate;

/// A World Manufacturer Identifier record
///
/// `(wmi_code, vis_suffix)` is unique across the snapshot. A record without
/// a suffix is a mass-market three-character WMI; a record with one belongs
/// to a specialized manufacturer whose VINs carry `9` at position 3 and the
/// suffix at positions 12-14.
#[derive(Debug, Clone)]
pub struct WmiRecord {
    /// The three-character code at VIN positions 1-3
    pub wmi_code: String,
    /// Characters 12-14 for specialized (six-character) manufacturers
    pub vis_suffix: Option<String>,
    /// Manufacturer name
    pub manufacturer_name: String,
    /// Make name assigned to this WMI (may be empty)
    pub make_name: String,
    /// Vehicle type name assigned to this WMI (may be empty)
    pub vehicle_type: String,
    /// ISO 3166 alpha-2 country of the manufacturer
    pub country: String,
    /// Date the WMI was registered in vPIC
    pub created_on: Option<NaiveDate>,
    /// Date the WMI record was last updated in vPIC
    pub updated_on: Option<NaiveDate>,
}

impl WmiRecord {
    /// The surface form: three characters, or six for specialized
    /// manufacturers (`wmi_code` plus `vis_suffix`).
    pub fn full_code(&self) -> String {
        match &self.vis_suffix {
            Some(suffix) => format!("{}{}", self.wmi_code, suffix),
            None => self.wmi_code.clone(),
        }
    }
}

/// A vPIC pattern row: one element assignment scoped to a WMI, a key over
/// VIN positions 4 and up, and an optional model-year range
#[derive(Debug, Clone)]
pub struct PatternRecord {
    /// Stable row id, the final precedence tie-break
    pub id: i64,
    /// Full WMI key this row belongs to (three or six characters)
    pub wmi: String,
    /// Characters over `0-9A-Z*` matched against VIN positions 4-10;
    /// `*` matches any single position
    pub key_pattern: String,
    /// The element this row assigns
    pub element_id: i64,
    /// The assigned value
    pub element_value: String,
    /// First model year this row applies to (unbounded if absent)
    pub year_from: Option<u16>,
    /// Last model year this row applies to (unbounded if absent)
    pub year_to: Option<u16>,
}

impl PatternRecord {
    /// Number of single-position wildcards in the key
    pub fn wildcard_count(&self) -> usize {
        self.key_pattern.bytes().filter(|&b| b == b'*').count()
    }

    /// Width of the year range, used for precedence ordering. Rows with an
    /// unbounded endpoint sort after every bounded row.
    pub fn year_span(&self) -> u32 {
        match (self.year_from, self.year_to) {
            (Some(from), Some(to)) => u32::from(to.saturating_sub(from)),
            _ => u32::MAX,
        }
    }

    /// True if both year endpoints are unbounded
    pub fn is_year_unbounded(&self) -> bool {
        self.year_from.is_none() && self.year_to.is_none()
    }

    /// True if the row's year scope includes `year` (unbounded endpoints
    /// behave as infinities)
    pub fn includes_year(&self, year: u16) -> bool {
        self.year_from.map_or(true, |from| from <= year)
            && self.year_to.map_or(true, |to| year <= to)
    }
}

/// A vPIC element: a named, decodable vehicle attribute
#[derive(Debug, Clone)]
pub struct ElementRecord {
    /// vPIC element id
    pub id: i64,
    /// Element name, e.g. `"Make"` or `"Plant City"`
    pub name: String,
    /// Element group, e.g. `"General"` (informational)
    pub group: Option<String>,
}

/// Snapshot statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Total number of WMI records
    pub num_wmis: usize,
    /// Total number of pattern rows
    pub num_patterns: usize,
    /// Total number of elements
    pub num_elements: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(key: &str, from: Option<u16>, to: Option<u16>) -> PatternRecord {
        PatternRecord {
            id: 1,
            wmi: "5FN".to_string(),
            key_pattern: key.to_string(),
            element_id: 28,
            element_value: "Pilot".to_string(),
            year_from: from,
            year_to: to,
        }
    }

    #[test]
    fn test_wildcard_count() {
        assert_eq!(pattern("YF5H5", None, None).wildcard_count(), 0);
        assert_eq!(pattern("YF*H*", None, None).wildcard_count(), 2);
        assert_eq!(pattern("*", None, None).wildcard_count(), 1);
    }

    #[test]
    fn test_year_scope() {
        let bounded = pattern("YF5", Some(2016), Some(2022));
        assert!(bounded.includes_year(2016));
        assert!(bounded.includes_year(2022));
        assert!(!bounded.includes_year(2015));
        assert!(!bounded.includes_year(2023));
        assert_eq!(bounded.year_span(), 6);
        assert!(!bounded.is_year_unbounded());

        let open_ended = pattern("YF5", Some(2016), None);
        assert!(open_ended.includes_year(2050));
        assert!(!open_ended.includes_year(2015));
        assert_eq!(open_ended.year_span(), u32::MAX);

        let unbounded = pattern("YF5", None, None);
        assert!(unbounded.includes_year(1980));
        assert!(unbounded.is_year_unbounded());
    }

    #[test]
    fn test_wmi_full_code() {
        let mass_market = WmiRecord {
            wmi_code: "5FN".to_string(),
            vis_suffix: None,
            manufacturer_name: "Honda".to_string(),
            make_name: "Honda".to_string(),
            vehicle_type: "Multipurpose Passenger Vehicle (MPV)".to_string(),
            country: "US".to_string(),
            created_on: None,
            updated_on: None,
        };
        assert_eq!(mass_market.full_code(), "5FN");

        let specialized = WmiRecord {
            wmi_code: "YT9".to_string(),
            vis_suffix: Some("007".to_string()),
            ..mass_market
        };
        assert_eq!(specialized.full_code(), "YT9007");
    }
}
