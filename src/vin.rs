//! VIN validation and the `Vin` value object
//!
//! A `Vin` is a syntactically valid 17-character Vehicle Identification
//! Number: every character is drawn from `0-9A-HJ-NPR-Z` (the letters I, O,
//! and Q are forbidden) and the weighted check digit at position 9 is
//! consistent with the other 16 positions. Once constructed, a `Vin` is
//! immutable.
//!
//! ```text
//!                                     model year
//!                                         |
//!                WMI          check digit | plant
//!              |-----|                 |  |  |  |--- serial ----|
//!   Position   1  2  3  4  5  6  7  8  9  10 11 12 13 14 15 16 17
//!                       |-----------|     |---------------------|
//!                            VDS                    VIS
//! ```
//!
//! Field accessors (`wmi3`, `vds`, `vis`, ...) are pure slices of the
//! canonical string and never fail. Vehicle accessors (`make`, `model`, ...)
//! lazily decode against the shared reference snapshot and memoize the
//! result, so repeated reads cost nothing.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    is_vin_char, CHECK_DIGIT_CHARACTERS, CHECK_DIGIT_INDEX, PLANT_CODE_INDEX, POSITION_WEIGHTS,
    VIN_LENGTH, YEAR_CODE_INDEX,
};
use crate::decoder::Decoder;
use crate::types::{DecodedVehicle, ModelYear, Result, VinError};

/// Validate a 17-character VIN string.
///
/// Lowercase ASCII input is canonicalized to uppercase before validation;
/// any non-ASCII character fails as `InvalidCharacter`. When
/// `correct_check_digit` is true, a wrong character at position 9 is
/// replaced with the computed one instead of failing; the returned `Vin`
/// always carries the corrected character.
///
/// # Example
/// ```
/// use vin_decoder::validate;
///
/// let vin = validate("4T1BE46K19U856421", false).unwrap();
/// assert_eq!(vin.to_string(), "4T1BE46K19U856421");
/// ```
pub fn validate(text: &str, correct_check_digit: bool) -> Result<Vin> {
    let length = text.chars().count();
    if length != VIN_LENGTH {
        return Err(VinError::InvalidLength(length));
    }

    let mut canonical = String::with_capacity(VIN_LENGTH);
    for (i, c) in text.chars().enumerate() {
        let c = c.to_ascii_uppercase();
        if !is_vin_char(c) {
            return Err(VinError::InvalidCharacter {
                position: i + 1,
                character: c,
            });
        }
        canonical.push(c);
    }

    let expected = weighted_check_digit(canonical.as_bytes());
    let found = canonical.as_bytes()[CHECK_DIGIT_INDEX] as char;
    if found != expected {
        if !correct_check_digit {
            return Err(VinError::InvalidCheckDigit { expected, found });
        }
        log::debug!("correcting VIN check digit {:?} -> {:?}", found, expected);
        canonical.replace_range(CHECK_DIGIT_INDEX..CHECK_DIGIT_INDEX + 1, &expected.to_string());
    }

    Ok(Vin {
        vin: canonical,
        decoded: OnceLock::new(),
    })
}

/// Compute the check digit a 17-character VIN should carry at position 9.
///
/// The input is validated the same way as [`validate`] except that the
/// current position-9 character is ignored (it carries weight 0).
pub fn compute_check_digit(text: &str) -> Result<char> {
    let length = text.chars().count();
    if length != VIN_LENGTH {
        return Err(VinError::InvalidLength(length));
    }
    let mut canonical = String::with_capacity(VIN_LENGTH);
    for (i, c) in text.chars().enumerate() {
        let c = c.to_ascii_uppercase();
        if !is_vin_char(c) {
            return Err(VinError::InvalidCharacter {
                position: i + 1,
                character: c,
            });
        }
        canonical.push(c);
    }
    Ok(weighted_check_digit(canonical.as_bytes()))
}

/// Weighted sum mod 11 over canonical VIN bytes (value 10 encodes as `X`).
/// Callers guarantee every byte is in the VIN alphabet.
fn weighted_check_digit(vin: &[u8]) -> char {
    let mut sum = 0u32;
    for (i, &b) in vin.iter().enumerate() {
        if i == CHECK_DIGIT_INDEX {
            continue;
        }
        // Unwrap is fine: the alphabet was checked during canonicalization.
        let value = crate::constants::char_value(b as char).unwrap_or(0);
        sum += value * POSITION_WEIGHTS[i];
    }
    CHECK_DIGIT_CHARACTERS[(sum % 11) as usize] as char
}

/// A validated 17-character Vehicle Identification Number
///
/// Construct one with [`Vin::parse`], [`validate`], or `str::parse`. The
/// canonical (uppercase, possibly check-digit-corrected) string is available
/// through `as_str()` and `Display`.
#[derive(Clone)]
pub struct Vin {
    /// Canonical 17-character uppercase form
    vin: String,
    /// Memoized decode result, filled on first vehicle accessor call
    decoded: OnceLock<Box<DecodedVehicle>>,
}

impl Vin {
    /// Validate `text` without check-digit correction.
    ///
    /// # Example
    /// ```
    /// use vin_decoder::Vin;
    ///
    /// let vin = Vin::parse("5FNYF5H59HB011946").unwrap();
    /// assert_eq!(vin.wmi3(), "5FN");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        validate(text, false)
    }

    /// The canonical 17-character string
    pub fn as_str(&self) -> &str {
        &self.vin
    }

    // -- field splitter (pure, infallible) ----------------------------------

    /// The three-character World Manufacturer Identifier (positions 1-3)
    pub fn wmi3(&self) -> &str {
        &self.vin[0..3]
    }

    /// Characters 12-14, the WMI extension used by specialized manufacturers
    pub fn wmi6_suffix(&self) -> &str {
        &self.vin[11..14]
    }

    /// The WMI in surface form.
    ///
    /// Mass-market manufacturers are assigned a three-character WMI.
    /// Specialized (low-volume) manufacturers have `9` at position 3 and are
    /// identified by six characters: positions 1-3 plus 12-14.
    ///
    /// # Example
    /// ```
    /// use vin_decoder::Vin;
    ///
    /// assert_eq!(Vin::parse("5FNYF5H59HB011946").unwrap().wmi(), "5FN");
    /// assert_eq!(Vin::parse("YT9NN1U14KA007175").unwrap().wmi(), "YT9007");
    /// ```
    pub fn wmi(&self) -> String {
        if self.vin.as_bytes()[2] == b'9' {
            format!("{}{}", self.wmi3(), self.wmi6_suffix())
        } else {
            self.wmi3().to_string()
        }
    }

    /// The Vehicle Descriptor Section (positions 4-8)
    pub fn vds(&self) -> &str {
        &self.vin[3..8]
    }

    /// The check digit character (position 9)
    pub fn check_digit(&self) -> char {
        self.vin.as_bytes()[CHECK_DIGIT_INDEX] as char
    }

    /// The Vehicle Identifier Section (positions 10-17)
    pub fn vis(&self) -> &str {
        &self.vin[9..17]
    }

    /// The model-year code (position 10)
    pub fn year_char(&self) -> char {
        self.vin.as_bytes()[YEAR_CODE_INDEX] as char
    }

    /// The plant code (position 11)
    pub fn plant_char(&self) -> char {
        self.vin.as_bytes()[PLANT_CODE_INDEX] as char
    }

    /// Position 7, which disambiguates the 30-year model-year cycle
    pub(crate) fn cycle_char(&self) -> char {
        self.vin.as_bytes()[6] as char
    }

    /// The masked descriptor used for pattern lookups: the VIN with the
    /// check digit replaced by `*`, cut after position 14 for specialized
    /// manufacturers and position 11 otherwise.
    pub fn descriptor(&self) -> String {
        let mut descriptor = self.vin.clone();
        descriptor.replace_range(CHECK_DIGIT_INDEX..CHECK_DIGIT_INDEX + 1, "*");
        if self.vin.as_bytes()[2] == b'9' {
            descriptor.truncate(14);
        } else {
            descriptor.truncate(11);
        }
        descriptor
    }

    // -- lazy decoding ------------------------------------------------------

    /// Decode this VIN against the shared bundled snapshot, memoizing the
    /// result. The only possible failure is an unavailable snapshot; missing
    /// reference data shows up as empty fields, never as an error.
    pub fn decoded(&self) -> Result<&DecodedVehicle> {
        if let Some(vehicle) = self.decoded.get() {
            return Ok(vehicle);
        }
        let decoder = Decoder::new()?;
        let vehicle = decoder.decode(self);
        Ok(self.decoded.get_or_init(|| Box::new(vehicle)))
    }

    /// Manufacturer name, e.g. `"Honda"`
    pub fn manufacturer(&self) -> Result<&str> {
        Ok(&self.decoded()?.manufacturer)
    }

    /// Make (brand) name, e.g. `"Kia"`
    pub fn make(&self) -> Result<&str> {
        Ok(&self.decoded()?.make)
    }

    /// Model name, e.g. `"Niro"`
    pub fn model(&self) -> Result<&str> {
        Ok(&self.decoded()?.model)
    }

    /// Series within the model
    pub fn series(&self) -> Result<&str> {
        Ok(&self.decoded()?.series)
    }

    /// Trim level
    pub fn trim(&self) -> Result<&str> {
        Ok(&self.decoded()?.trim)
    }

    /// Body class
    pub fn body_class(&self) -> Result<&str> {
        Ok(&self.decoded()?.body_class)
    }

    /// Vehicle type
    pub fn vehicle_type(&self) -> Result<&str> {
        Ok(&self.decoded()?.vehicle_type)
    }

    /// Model year decoded from position 10
    pub fn model_year(&self) -> Result<ModelYear> {
        Ok(self.decoded()?.model_year)
    }

    /// Assembly plant city
    pub fn plant_city(&self) -> Result<&str> {
        Ok(&self.decoded()?.plant_city)
    }

    /// Assembly plant state or province
    pub fn plant_state(&self) -> Result<&str> {
        Ok(&self.decoded()?.plant_state)
    }

    /// Assembly plant country
    pub fn plant_country(&self) -> Result<&str> {
        Ok(&self.decoded()?.plant_country)
    }

    /// Company operating the assembly plant
    pub fn plant_company(&self) -> Result<&str> {
        Ok(&self.decoded()?.plant_company)
    }

    /// Electrification level
    pub fn electrification_level(&self) -> Result<&str> {
        Ok(&self.decoded()?.electrification_level)
    }

    /// Human-readable summary: year, make, model, series, and trim
    pub fn description(&self) -> Result<&str> {
        Ok(&self.decoded()?.description)
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vin)
    }
}

impl fmt::Debug for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vin({})", self.vin)
    }
}

impl PartialEq for Vin {
    fn eq(&self, other: &Self) -> bool {
        self.vin == other.vin
    }
}

impl Eq for Vin {}

impl Hash for Vin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vin.hash(state);
    }
}

impl FromStr for Vin {
    type Err = VinError;

    fn from_str(s: &str) -> Result<Self> {
        validate(s, false)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.vin
    }
}

impl Serialize for Vin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.vin)
    }
}

impl<'de> Deserialize<'de> for Vin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        validate(&text, false).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VALID_VINS: &[&str] = &[
        "5FNYF5H59HB011946",
        "YT9NN1U14KA007175",
        "KNDCE3LG2L5073161",
        "4T1BE46K19U856421",
        "3FAHP0JA0AR281181",
        "JM3KE4BY6G0636881",
        "5YFB4MDE8PP030258",
        "2GCEC19Z0S1245490",
    ];

    const VIN_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKLMNPRSTUVWXYZ";

    #[test]
    fn test_valid_vins() {
        for vin in VALID_VINS {
            let parsed = Vin::parse(vin).unwrap();
            assert_eq!(parsed.as_str(), *vin);
            assert_eq!(parsed.to_string(), *vin);
        }
    }

    #[test]
    fn test_lowercase_is_canonicalized() {
        let vin = Vin::parse("4t1be46k19u856421").unwrap();
        assert_eq!(vin.as_str(), "4T1BE46K19U856421");
    }

    #[test]
    fn test_invalid_length() {
        for text in ["", "4T1B", "JM3KE4BY6G06", "4T1BE46K19U8564211"] {
            match Vin::parse(text) {
                Err(VinError::InvalidLength(n)) => assert_eq!(n, text.chars().count()),
                other => panic!("expected InvalidLength, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_forbidden_letters_rejected_at_any_position() {
        // 'I' at position 4
        match Vin::parse("4T1IE46K19U856421") {
            Err(VinError::InvalidCharacter { position, character }) => {
                assert_eq!(position, 4);
                assert_eq!(character, 'I');
            }
            other => panic!("expected InvalidCharacter, got {:?}", other),
        }
        // 'O' and 'Q' elsewhere
        assert!(Vin::parse("OT1BE46K19U856421").is_err());
        assert!(Vin::parse("4T1BE46K19U85642Q").is_err());
    }

    #[test]
    fn test_non_ascii_rejected() {
        match Vin::parse("4T1BE46K19U85642Ä") {
            Err(VinError::InvalidCharacter { position, .. }) => assert_eq!(position, 17),
            other => panic!("expected InvalidCharacter, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_check_digit_reports_expected_and_found() {
        match Vin::parse("4T1BE46K09U856421") {
            Err(VinError::InvalidCheckDigit { expected, found }) => {
                assert_eq!(expected, '1');
                assert_eq!(found, '0');
            }
            other => panic!("expected InvalidCheckDigit, got {:?}", other),
        }
    }

    #[test]
    fn test_check_digit_correction() {
        let vin = validate("4T1BE46K09U856421", true).unwrap();
        assert_eq!(vin.as_str(), "4T1BE46K19U856421");
        assert_eq!(vin.check_digit(), '1');
    }

    #[test]
    fn test_compute_check_digit() {
        assert_eq!(compute_check_digit("5FNYF5H59HB011946").unwrap(), '9');
        assert_eq!(compute_check_digit("4T1BE46K09U856421").unwrap(), '1');
        assert!(compute_check_digit("TOO SHORT").is_err());
    }

    #[test]
    fn test_field_splitter() {
        let vin = Vin::parse("5FNYF5H59HB011946").unwrap();
        assert_eq!(vin.wmi3(), "5FN");
        assert_eq!(vin.wmi(), "5FN");
        assert_eq!(vin.vds(), "YF5H5");
        assert_eq!(vin.check_digit(), '9');
        assert_eq!(vin.vis(), "HB011946");
        assert_eq!(vin.year_char(), 'H');
        assert_eq!(vin.plant_char(), 'B');
        assert_eq!(vin.wmi6_suffix(), "011");
    }

    #[test]
    fn test_specialized_manufacturer_wmi() {
        let vin = Vin::parse("YT9NN1U14KA007175").unwrap();
        assert_eq!(vin.wmi3(), "YT9");
        assert_eq!(vin.wmi6_suffix(), "007");
        assert_eq!(vin.wmi(), "YT9007");
    }

    #[test]
    fn test_descriptor() {
        let vin = Vin::parse("5FNYF5H59HB011946").unwrap();
        assert_eq!(vin.descriptor(), "5FNYF5H5*HB");

        let vin = Vin::parse("YT9NN1U14KA007175").unwrap();
        assert_eq!(vin.descriptor(), "YT9NN1U1*KA007");
    }

    #[test]
    fn test_from_str_round_trip() {
        for text in VALID_VINS {
            let vin: Vin = text.parse().unwrap();
            let again: Vin = vin.to_string().parse().unwrap();
            assert_eq!(vin, again);
        }
    }

    #[test]
    fn test_equality_and_hash_ignore_decode_state() {
        use std::collections::HashSet;

        let a = Vin::parse("4T1BE46K19U856421").unwrap();
        let b = Vin::parse("4T1BE46K19U856421").unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_serde_round_trip() {
        let vin = Vin::parse("JM3KE4BY6G0636881").unwrap();
        let json = serde_json::to_string(&vin).unwrap();
        assert_eq!(json, "\"JM3KE4BY6G0636881\"");
        let back: Vin = serde_json::from_str(&json).unwrap();
        assert_eq!(vin, back);

        let bad: std::result::Result<Vin, _> = serde_json::from_str("\"not a vin\"");
        assert!(bad.is_err());
    }

    proptest! {
        /// Correction always yields a VIN that satisfies the check-digit
        /// algorithm and differs from the input in at most position 9.
        #[test]
        fn prop_correction_touches_only_position_nine(
            chars in proptest::collection::vec(
                proptest::sample::select(VIN_ALPHABET.to_vec()), VIN_LENGTH)
        ) {
            let text: String = chars.iter().map(|&b| b as char).collect();
            let vin = validate(&text, true).unwrap();
            prop_assert_eq!(vin.check_digit(), compute_check_digit(vin.as_str()).unwrap());
            for (i, (a, b)) in text.chars().zip(vin.as_str().chars()).enumerate() {
                if i != CHECK_DIGIT_INDEX {
                    prop_assert_eq!(a, b);
                }
            }
        }

        /// The canonical form always re-validates to an equal value.
        #[test]
        fn prop_canonical_round_trip(
            chars in proptest::collection::vec(
                proptest::sample::select(VIN_ALPHABET.to_vec()), VIN_LENGTH)
        ) {
            let text: String = chars.iter().map(|&b| b as char).collect();
            let vin = validate(&text, true).unwrap();
            let again = validate(vin.as_str(), false).unwrap();
            prop_assert_eq!(vin, again);
        }
    }
}
