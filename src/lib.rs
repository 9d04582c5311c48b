//! VIN Decoder Library
//!
//! Validates and decodes 17-character Vehicle Identification Numbers
//! (49 CFR Part 565) against a bundled snapshot of the NHTSA vPIC reference
//! database.
//!
//! # Architecture
//!
//! The library is intentionally minimal and focused on decoding:
//! - Validates the VIN alphabet and the weighted check digit
//! - Decodes the model year, including the 30-year cycle rule
//! - Resolves the WMI and vPIC pattern rows for the vehicle descriptor
//! - Assembles a decoded vehicle record (manufacturer, make, model, series,
//!   trim, body class, vehicle type, plant, electrification level)
//!
//! The library does NOT:
//! - Talk to NHTSA over the network
//! - Modify the reference snapshot at runtime
//! - Decode buses, heavy trucks, motorcycles, trailers, or incomplete
//!   vehicles
//! - Look up recalls or market values
//!
//! # Example Usage
//!
//! ```
//! use vin_decoder::Vin;
//!
//! let vin = Vin::parse("5FNYF5H59HB011946").unwrap();
//! assert_eq!(vin.manufacturer().unwrap(), "Honda");
//! assert_eq!(vin.model_year().unwrap().as_u16(), Some(2017));
//!
//! // Validation alone never touches the reference data:
//! assert_eq!(vin.wmi3(), "5FN");
//! assert_eq!(vin.vds(), "YF5H5");
//! ```
//!
//! Decoding against an explicit snapshot instead of the bundled one:
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vin_decoder::{Decoder, Snapshot};
//!
//! let snapshot = Arc::new(Snapshot::load(Path::new("vpic.db")).unwrap());
//! let decoder = Decoder::with_snapshot(snapshot);
//! let vehicle = decoder.decode_str("4T1BE46K19U856421").unwrap();
//! println!("{}", vehicle.description);
//! ```

// Public modules
pub mod constants;
pub mod decoder;
pub mod snapshot;
pub mod types;
pub mod vin;

// Re-export main types for convenience
pub use decoder::{decode, vpic_release_date, vpic_version, Decoder};
pub use snapshot::{Snapshot, SnapshotStats};
pub use types::{DecodedVehicle, ModelYear, Result, VinError};
pub use vin::{compute_check_digit, validate, Vin};

// Internal modules (not exposed in public API)
mod model_year;
mod resolver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
