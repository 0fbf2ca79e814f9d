//! Quaternary symbol alphabet for the colored-light channel.
//!
//! Each byte travels as four 2-bit symbols, and each symbol is carried by one
//! colored pulse. This module provides the bidirectional map between the four
//! non-off light levels and the symbol values `{0, 1, 2, 3}`.
//!
//! ## Symbol Table
//!
//! | symbol | color |
//! |--------|-------|
//! | 0      | Red   |
//! | 1      | Green |
//! | 2      | Blue  |
//! | 3      | White |
//!
//! `Off` carries no data: the decoder treats an off-level pulse in a mark
//! position as a rejection.

use crate::signal::LightLevel;

/// Color assignment for each 2-bit symbol value, in symbol order.
static SYMBOL_COLORS: [LightLevel; 4] = [
    LightLevel::Red,
    LightLevel::Green,
    LightLevel::Blue,
    LightLevel::White,
];

/// Maps a 2-bit symbol to its carrier color.
///
/// Total over all inputs: only the low two bits select the color.
pub fn symbol_to_color(symbol: u8) -> LightLevel {
    SYMBOL_COLORS[(symbol & 0b11) as usize]
}

/// Maps a light level back to its 2-bit symbol.
///
/// Returns `None` for [`LightLevel::Off`], which carries no data.
pub fn color_to_symbol(level: LightLevel) -> Option<u8> {
    match level {
        LightLevel::Red => Some(0),
        LightLevel::Green => Some(1),
        LightLevel::Blue => Some(2),
        LightLevel::White => Some(3),
        LightLevel::Off => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_map_to_distinct_colors() {
        assert_eq!(symbol_to_color(0), LightLevel::Red);
        assert_eq!(symbol_to_color(1), LightLevel::Green);
        assert_eq!(symbol_to_color(2), LightLevel::Blue);
        assert_eq!(symbol_to_color(3), LightLevel::White);
    }

    #[test]
    fn high_bits_are_ignored() {
        assert_eq!(symbol_to_color(0b111110), symbol_to_color(0b10));
    }

    #[test]
    fn color_to_symbol_inverts_symbol_to_color() {
        for symbol in 0..4u8 {
            assert_eq!(color_to_symbol(symbol_to_color(symbol)), Some(symbol));
        }
    }

    #[test]
    fn off_is_not_a_symbol() {
        assert_eq!(color_to_symbol(LightLevel::Off), None);
    }
}
