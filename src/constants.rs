//! Character tables and constants for VIN arithmetic
//!
//! The tables here come straight out of 49 CFR Part 565: the transliteration
//! values used by the check-digit computation, the per-position weights, and
//! the model-year code table. Everything is fixed by regulation and never
//! changes at runtime.

/// A VIN is always exactly 17 characters long
pub const VIN_LENGTH: usize = 17;

/// 0-based index of the check digit (position 9 in the regulation's 1-based numbering)
pub const CHECK_DIGIT_INDEX: usize = 8;

/// 0-based index of the model-year code (position 10)
pub const YEAR_CODE_INDEX: usize = 9;

/// 0-based index of the plant code (position 11)
pub const PLANT_CODE_INDEX: usize = 10;

/// Weights applied per position when computing the check digit.
/// Position 9 carries weight 0 because it is the check position itself.
pub const POSITION_WEIGHTS: [u32; VIN_LENGTH] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Check-digit characters indexed by the weighted sum mod 11 (10 encodes as `X`)
pub const CHECK_DIGIT_CHARACTERS: &[u8; 11] = b"0123456789X";

/// Model years repeat on a 30-year cycle
pub const MODEL_YEAR_CYCLE: u16 = 30;

/// VINs encode model years from 1980 onward
pub const MIN_MODEL_YEAR: u16 = 1980;

/// Transliteration value of a VIN character.
///
/// Digits map to themselves; letters map to the values assigned by
/// 49 CFR 565.15. Returns `None` for anything outside the VIN alphabet,
/// including the forbidden letters I, O, and Q.
pub fn char_value(c: char) -> Option<u32> {
    let value = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A' => 1,
        'B' => 2,
        'C' => 3,
        'D' => 4,
        'E' => 5,
        'F' => 6,
        'G' => 7,
        'H' => 8,
        'J' => 1,
        'K' => 2,
        'L' => 3,
        'M' => 4,
        'N' => 5,
        'P' => 7,
        'R' => 9,
        'S' => 2,
        'T' => 3,
        'U' => 4,
        'V' => 5,
        'W' => 6,
        'X' => 7,
        'Y' => 8,
        'Z' => 9,
        _ => return None,
    };
    Some(value)
}

/// True if `c` belongs to the VIN alphabet `0-9A-HJ-NPR-Z`
pub fn is_vin_char(c: char) -> bool {
    char_value(c).is_some()
}

/// Base model year for a position-10 code, in the 1980-2009 cycle.
///
/// The letters I, O, Q, U, Z and the digit 0 are not valid year codes and
/// return `None`. Cycle disambiguation (adding 30 years when position 7 is
/// alphabetic) happens in the model-year decoder, not here.
pub fn base_model_year(code: char) -> Option<u16> {
    let year = match code {
        'A' => 1980,
        'B' => 1981,
        'C' => 1982,
        'D' => 1983,
        'E' => 1984,
        'F' => 1985,
        'G' => 1986,
        'H' => 1987,
        'J' => 1988,
        'K' => 1989,
        'L' => 1990,
        'M' => 1991,
        'N' => 1992,
        'P' => 1993,
        'R' => 1994,
        'S' => 1995,
        'T' => 1996,
        'V' => 1997,
        'W' => 1998,
        'X' => 1999,
        'Y' => 2000,
        '1'..='9' => 2000 + (code as u16 - '0' as u16),
        _ => return None,
    };
    Some(year)
}
