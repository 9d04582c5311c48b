//! Core types for the VIN decoder library
//!
//! This module defines the error enum, the model-year representation, and the
//! decoded vehicle record that the decoder emits. The decoder itself is
//! stateless: it validates a VIN, resolves it against the reference snapshot,
//! and hands back one of these values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vin::Vin;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, VinError>;

/// Errors that can occur while validating or decoding a VIN
#[derive(Debug, thiserror::Error)]
pub enum VinError {
    /// Input was not exactly 17 characters long
    #[error("VIN must be exactly 17 characters long, got {0}")]
    InvalidLength(usize),

    /// Input contains a character outside `0-9A-HJ-NPR-Z`.
    /// The position is 1-based, matching the regulation's numbering.
    #[error("invalid character {character:?} at VIN position {position}")]
    InvalidCharacter { position: usize, character: char },

    /// The weighted check digit does not match position 9
    #[error("incorrect check digit: expected {expected:?}, found {found:?}")]
    InvalidCheckDigit { expected: char, found: char },

    /// The bundled vPIC snapshot could not be loaded
    #[error("vPIC snapshot unavailable: {0}")]
    SnapshotUnavailable(String),
}

/// A vehicle model year decoded from VIN position 10
///
/// Year codes repeat every 30 years; position 7 disambiguates the cycle.
/// A VIN whose position 10 is `0` (or any character outside the year table)
/// has no decodable model year and maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelYear {
    /// The year code could not be interpreted
    Unknown,
    /// A four-digit model year, 1980 or later
    Year(u16),
}

impl ModelYear {
    /// The year as a number, or `None` when unknown
    pub fn as_u16(self) -> Option<u16> {
        match self {
            ModelYear::Year(y) => Some(y),
            ModelYear::Unknown => None,
        }
    }

    /// True unless the model year is the unknown sentinel
    pub fn is_known(self) -> bool {
        matches!(self, ModelYear::Year(_))
    }
}

impl Default for ModelYear {
    fn default() -> Self {
        ModelYear::Unknown
    }
}

impl fmt::Display for ModelYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelYear::Year(y) => write!(f, "{}", y),
            ModelYear::Unknown => Ok(()),
        }
    }
}

/// A fully decoded vehicle record - the primary output of the decoder
///
/// Every string field defaults to the empty string when the reference
/// snapshot has no value for it; an incomplete snapshot is normal and is
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedVehicle {
    /// The validated VIN this record was decoded from
    pub vin: Vin,
    /// The matched WMI in surface form (3 characters, or 6 for specialized manufacturers)
    pub wmi_code: String,
    /// Manufacturer name from the WMI record
    pub manufacturer: String,
    /// Make (brand) name
    pub make: String,
    /// Model name
    pub model: String,
    /// Series within the model
    pub series: String,
    /// Trim level
    pub trim: String,
    /// Body class (e.g. "Sedan/Saloon")
    pub body_class: String,
    /// Vehicle type (e.g. "Passenger Car")
    pub vehicle_type: String,
    /// Model year decoded from position 10
    pub model_year: ModelYear,
    /// Country of the assembly plant
    pub plant_country: String,
    /// City of the assembly plant
    pub plant_city: String,
    /// Company operating the assembly plant
    pub plant_company: String,
    /// State or province of the assembly plant
    pub plant_state: String,
    /// Electrification level (e.g. "PHEV (Plug-in Hybrid Electric Vehicle)")
    pub electrification_level: String,
    /// Human-readable summary: year, make, model, series, and trim
    pub description: String,
}
