//! Main decoder API
//!
//! The `Decoder` struct ties the pieces together: it owns a handle to the
//! reference snapshot, runs the pattern resolver, and assembles decoded
//! vehicle records. Decoding never fails structurally - the snapshot is
//! inevitably incomplete, and anything it cannot say simply comes back as
//! an empty field.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::model_year::decode_model_year;
use crate::resolver::{self, Resolution};
use crate::snapshot::Snapshot;
use crate::types::{DecodedVehicle, ModelYear, Result};
use crate::vin::{validate, Vin};

/// The main decoder - entry point for all decoding operations
///
/// # Example
/// ```
/// use vin_decoder::Decoder;
///
/// let decoder = Decoder::new().unwrap();
/// let vehicle = decoder.decode_str("5FNYF5H59HB011946").unwrap();
/// assert_eq!(vehicle.manufacturer, "Honda");
/// ```
pub struct Decoder {
    /// Shared reference snapshot (read-only after load)
    snapshot: Arc<Snapshot>,
}

impl Decoder {
    /// Create a decoder backed by the process-wide bundled snapshot.
    ///
    /// The first call loads the snapshot; later calls share it. Fails only
    /// when the bundled data cannot be loaded.
    pub fn new() -> Result<Self> {
        Ok(Self {
            snapshot: Snapshot::shared()?,
        })
    }

    /// Create a decoder backed by an explicit snapshot.
    pub fn with_snapshot(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// The snapshot this decoder reads from
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The vPIC version string and release date of the backing snapshot
    pub fn vpic_version(&self) -> (&str, NaiveDate) {
        self.snapshot.vpic_version()
    }

    /// Decode an already validated VIN.
    pub fn decode(&self, vin: &Vin) -> DecodedVehicle {
        let model_year = decode_model_year(
            vin.year_char(),
            vin.cycle_char(),
            self.snapshot.max_model_year(),
        );
        let resolution = resolver::resolve(&self.snapshot, vin, model_year);
        assemble(vin, model_year, resolution)
    }

    /// Validate (without check-digit correction) and decode a VIN string.
    pub fn decode_str(&self, text: &str) -> Result<DecodedVehicle> {
        let vin = validate(text, false)?;
        Ok(self.decode(&vin))
    }
}

/// Validate (without check-digit correction) and decode a VIN string
/// against the shared bundled snapshot.
///
/// # Example
/// ```
/// use vin_decoder::decode;
///
/// let vehicle = decode("KNDCE3LG2L5073161").unwrap();
/// assert_eq!(vehicle.description, "2020 Kia Niro EX Premium");
/// ```
pub fn decode(text: &str) -> Result<DecodedVehicle> {
    Decoder::new()?.decode_str(text)
}

/// The vPIC version string of the bundled snapshot.
pub fn vpic_version() -> Result<String> {
    let snapshot = Snapshot::shared()?;
    Ok(snapshot.vpic_version().0.to_string())
}

/// The release date of the bundled snapshot.
pub fn vpic_release_date() -> Result<NaiveDate> {
    let snapshot = Snapshot::shared()?;
    Ok(snapshot.vpic_version().1)
}

/// Merge resolved elements and the matched WMI into a `DecodedVehicle`.
fn assemble(vin: &Vin, model_year: ModelYear, resolution: Resolution<'_>) -> DecodedVehicle {
    let element = |name: &str| -> String {
        resolution
            .elements
            .get(name)
            .copied()
            .unwrap_or_default()
            .to_string()
    };

    let (wmi_code, manufacturer, make_fallback, vehicle_type_fallback) = match resolution.wmi {
        Some(record) => (
            record.full_code(),
            record.manufacturer_name.clone(),
            record.make_name.as_str(),
            record.vehicle_type.as_str(),
        ),
        None => (vin.wmi(), String::new(), "", ""),
    };

    let make = non_empty_or(element("Make"), make_fallback);
    let vehicle_type = non_empty_or(element("Vehicle Type"), vehicle_type_fallback);
    let model = element("Model");
    let series = element("Series");
    let trim = element("Trim");

    let description = build_description(model_year, &make, &model, &series, &trim);

    DecodedVehicle {
        vin: vin.clone(),
        wmi_code,
        manufacturer,
        make,
        model,
        series,
        trim,
        body_class: element("Body Class"),
        vehicle_type,
        model_year,
        plant_country: element("Plant Country"),
        plant_city: element("Plant City"),
        plant_company: element("Plant Company Name"),
        plant_state: element("Plant State"),
        electrification_level: element("Electrification Level"),
        description,
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Join the non-empty parts of year, make, model, series, and trim with
/// single spaces.
fn build_description(
    model_year: ModelYear,
    make: &str,
    model: &str,
    series: &str,
    trim: &str,
) -> String {
    let year = model_year.to_string();
    [year.as_str(), make, model, series, trim]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
