//! Protocol configuration and timing tolerance.
//!
//! A [`ProtocolConfig`] fixes every parameter the encoder and decoder must
//! agree on: the unit clock, the preamble and symbol timings, the framing
//! words, and the payload limit. Both sides of a link must be constructed
//! from equal configurations, with two exceptions that only affect the
//! transmitter: `frame_gap_units` and `allowed_drift_fraction`.

use core::fmt;

use libm::ceil;

#[cfg(not(feature = "std"))]
use crate::consts::MAX_PAYLOAD_LEN;
use crate::consts::{DEFAULT_ENDER, DEFAULT_MAGIC, MIN_DRIFT_FRACTION, PROTOCOL_VERSION};
use crate::encoding::color_to_symbol;
use crate::signal::LightLevel;

/// Rejected configuration invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `unit_duration_micros` was zero or negative.
    NonPositiveUnitDuration,
    /// `preamble_mark_units` or `preamble_space_units` was zero or negative.
    NonPositivePreambleUnits,
    /// `symbol_mark_units` or `separator_units` was zero or negative.
    NonPositiveSymbolUnits,
    /// `preamble_color` does not carry a symbol (it was `Off`).
    InvalidPreambleColor,
    /// `max_payload_bytes` exceeds what the frame format or the bounded
    /// buffers of a `no_std` build can represent.
    PayloadLimitTooLarge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NonPositiveUnitDuration => "unit duration must be positive",
            Self::NonPositivePreambleUnits => "preamble mark and space units must be positive",
            Self::NonPositiveSymbolUnits => "symbol mark and separator units must be positive",
            Self::InvalidPreambleColor => "preamble color must be one of the four data colors",
            Self::PayloadLimitTooLarge => "maximum payload length exceeds the supported frame size",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Link parameters shared by the encoder and decoder.
///
/// All `*_units` fields are expressed in multiples of `unit_duration_micros`,
/// the fundamental time quantum of the link.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolConfig {
    /// Width of one time unit, in microseconds. Must be positive.
    pub unit_duration_micros: i64,
    /// Units of preamble-color pulse opening a frame. Must be positive.
    pub preamble_mark_units: i64,
    /// Units of `Off` immediately following the preamble mark. Must be positive.
    pub preamble_space_units: i64,
    /// Units of colored pulse for each data symbol. Must be positive.
    pub symbol_mark_units: i64,
    /// Units of `Off` between data symbols. Must be positive.
    pub separator_units: i64,
    /// Units of `Off` emitted after a frame. Encoder only; a non-positive
    /// value omits the gap.
    pub frame_gap_units: i64,
    /// The level that marks a preamble. Any of the four data colors.
    pub preamble_color: LightLevel,
    /// Fractional clock-drift tolerance, floored at
    /// [`MIN_DRIFT_FRACTION`](crate::consts::MIN_DRIFT_FRACTION).
    pub allowed_drift_fraction: f64,
    /// Upper bound on payload length, in bytes.
    pub max_payload_bytes: usize,
    /// Frame start word.
    pub magic: u16,
    /// Frame end word.
    pub ender: u16,
    /// Protocol version asserted after the magic word.
    pub version: u8,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            unit_duration_micros: 600,
            preamble_mark_units: 16,
            preamble_space_units: 8,
            symbol_mark_units: 1,
            separator_units: 1,
            frame_gap_units: 12,
            preamble_color: LightLevel::White,
            allowed_drift_fraction: 0.20,
            max_payload_bytes: 512,
            magic: DEFAULT_MAGIC,
            ender: DEFAULT_ENDER,
            version: PROTOCOL_VERSION,
        }
    }
}

impl ProtocolConfig {
    /// Checks every invariant the codec relies on.
    ///
    /// `Encoder::new` and `Decoder::new` run this before accepting a
    /// configuration, so code past construction may assume it holds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_duration_micros <= 0 {
            return Err(ConfigError::NonPositiveUnitDuration);
        }
        if self.preamble_mark_units <= 0 || self.preamble_space_units <= 0 {
            return Err(ConfigError::NonPositivePreambleUnits);
        }
        if self.symbol_mark_units <= 0 || self.separator_units <= 0 {
            return Err(ConfigError::NonPositiveSymbolUnits);
        }
        if color_to_symbol(self.preamble_color).is_none() {
            return Err(ConfigError::InvalidPreambleColor);
        }
        // The length field on the wire is two bytes.
        if self.max_payload_bytes > u16::MAX as usize {
            return Err(ConfigError::PayloadLimitTooLarge);
        }
        #[cfg(not(feature = "std"))]
        if self.max_payload_bytes > MAX_PAYLOAD_LEN {
            return Err(ConfigError::PayloadLimitTooLarge);
        }
        Ok(())
    }

    /// Acceptance window (in units) around an expected pulse width.
    ///
    /// `max(1, ceil(expected_units * drift))`, so even the tightest timing
    /// accepts one unit of error.
    pub fn tolerance(&self, expected_units: i64) -> i64 {
        let raw = ceil(expected_units as f64 * self.drift_limit()) as i64;
        raw.max(1)
    }

    /// The configured drift fraction with the protocol floor applied.
    pub(crate) fn drift_limit(&self) -> f64 {
        self.allowed_drift_fraction.max(MIN_DRIFT_FRACTION)
    }
}
