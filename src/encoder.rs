//! Framer and pulse generator for the transmit path.
//!
//! The [`Encoder`] wraps a payload in the wire frame
//! `[magic | version | length | crc | payload | ender]` and renders it as a
//! timed [`SignalChange`] sequence: a preamble mark/space pair, one
//! mark/space pair per 2-bit symbol, and a trailing inter-frame gap.
//!
//! The encoder is stateless between calls; a single instance may encode any
//! number of frames.

use core::fmt;

use crate::config::{ConfigError, ProtocolConfig};
use crate::crc::crc16;
use crate::diag::diag;
use crate::encoding::symbol_to_color;
use crate::signal::{FrameBuffer, LightLevel, SignalBuffer, SignalChange};

/// Errors reported by the encode entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The payload is longer than `max_payload_bytes`.
    PayloadTooLarge,
    /// The output buffer filled before the frame was complete. Only
    /// reachable with the bounded buffers of a `no_std` build.
    BufferOverflow,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::PayloadTooLarge => "payload exceeds the configured maximum",
            Self::BufferOverflow => "signal buffer filled before the frame was complete",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Turns payloads into timed signal sequences.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: ProtocolConfig,
}

impl Encoder {
    /// Creates an encoder, validating the configuration.
    pub fn new(config: ProtocolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Replaces the configuration.
    ///
    /// On failure the previous configuration stays in effect.
    pub fn configure(&mut self, config: ProtocolConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Encodes one payload into a freshly allocated signal sequence.
    pub fn encode(&self, payload: &[u8]) -> Result<SignalBuffer, EncodeError> {
        let mut out = SignalBuffer::new();
        self.encode_into(payload, &mut out)?;
        Ok(out)
    }

    /// Encodes one payload, appending the signal sequence to `out`.
    ///
    /// Memory-constrained callers can reuse a single buffer across frames;
    /// `out` is not cleared first.
    pub fn encode_into(&self, payload: &[u8], out: &mut SignalBuffer) -> Result<(), EncodeError> {
        if payload.len() > self.config.max_payload_bytes {
            return Err(EncodeError::PayloadTooLarge);
        }

        let frame = self.build_frame(payload)?;

        self.emit(out, self.config.preamble_color, self.config.preamble_mark_units)?;
        self.emit(out, LightLevel::Off, self.config.preamble_space_units)?;

        for &byte in frame.iter() {
            for shift in [6u8, 4, 2, 0] {
                let symbol = (byte >> shift) & 0b11;
                self.emit(out, symbol_to_color(symbol), self.config.symbol_mark_units)?;
                self.emit(out, LightLevel::Off, self.config.separator_units)?;
            }
        }

        self.emit(out, LightLevel::Off, self.config.frame_gap_units)?;

        diag!(
            "encoded frame: {} payload bytes, {} signal changes",
            payload.len(),
            out.len()
        );
        Ok(())
    }

    /// Assembles the wire frame, computing the CRC over the payload only.
    fn build_frame(&self, payload: &[u8]) -> Result<FrameBuffer, EncodeError> {
        let mut frame = FrameBuffer::new();
        push_bytes(&mut frame, &self.config.magic.to_be_bytes())?;
        push_bytes(&mut frame, &[self.config.version])?;
        push_bytes(&mut frame, &(payload.len() as u16).to_be_bytes())?;
        push_bytes(&mut frame, &crc16(payload).to_be_bytes())?;
        push_bytes(&mut frame, payload)?;
        push_bytes(&mut frame, &self.config.ender.to_be_bytes())?;
        Ok(frame)
    }

    /// Appends one pulse. Non-positive unit counts emit nothing.
    fn emit(
        &self,
        out: &mut SignalBuffer,
        level: LightLevel,
        units: i64,
    ) -> Result<(), EncodeError> {
        if units <= 0 {
            return Ok(());
        }
        push_change(
            out,
            SignalChange {
                level,
                duration: units * self.config.unit_duration_micros,
            },
        )
    }
}

#[cfg(feature = "std")]
fn push_bytes(frame: &mut FrameBuffer, bytes: &[u8]) -> Result<(), EncodeError> {
    frame.extend_from_slice(bytes);
    Ok(())
}

#[cfg(not(feature = "std"))]
fn push_bytes(frame: &mut FrameBuffer, bytes: &[u8]) -> Result<(), EncodeError> {
    frame
        .extend_from_slice(bytes)
        .map_err(|_| EncodeError::BufferOverflow)
}

#[cfg(feature = "std")]
fn push_change(out: &mut SignalBuffer, change: SignalChange) -> Result<(), EncodeError> {
    out.push(change);
    Ok(())
}

#[cfg(not(feature = "std"))]
fn push_change(out: &mut SignalBuffer, change: SignalChange) -> Result<(), EncodeError> {
    out.push(change).map_err(|_| EncodeError::BufferOverflow)
}
