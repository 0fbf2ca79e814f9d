//! Streaming, fault-tolerant decoder for the receive path.
//!
//! The [`Decoder`] consumes [`SignalChange`] records one at a time and drives
//! a four-state machine: synchronize on a preamble mark and space, then
//! alternate between reading colored marks and off-level separators while
//! accumulating 2-bit symbols into frame bytes. A completely validated frame
//! is handed to the callback; everything else increments exactly one
//! diagnostic counter and aborts the frame in progress.
//!
//! ## Recovery
//!
//! The decoder is built to survive arbitrary noise. Whenever it rejects an
//! input it *re-arms* on that same input: a pulse that killed a frame in
//! progress may simultaneously be the preamble mark of the next frame. A
//! stray preamble embedded in noise therefore never costs more than the
//! frame it interrupted.
//!
//! ## Timing
//!
//! Pulse widths are quantized to whole units of `unit_duration_micros`.
//! A pulse is rejected outright when its fractional quantization error
//! exceeds the configured drift limit; quantized widths are then matched
//! against their expected unit counts within
//! [`ProtocolConfig::tolerance`].

use core::fmt;

use libm::{fabs, round};

use crate::config::{ConfigError, ProtocolConfig};
use crate::consts::{
    FRAME_CRC_OFFSET, FRAME_ENDER_LEN, FRAME_LENGTH_OFFSET, FRAME_MAGIC_OFFSET,
    FRAME_OVERHEAD_LEN, FRAME_PAYLOAD_OFFSET, FRAME_VERSION_OFFSET,
};
use crate::crc::crc16;
use crate::diag::diag;
use crate::encoding::color_to_symbol;
use crate::signal::{FrameBuffer, LightLevel, SignalChange};
use crate::stats::DecoderStats;

/// Demodulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Waiting for a preamble mark.
    #[default]
    Idle,
    /// Preamble mark seen; waiting for the preamble space.
    WaitSpace,
    /// In-frame; expecting a colored symbol mark.
    ReadMark,
    /// In-frame; expecting the off-level separator after a mark.
    ReadSpace,
}

/// Streaming decoder delivering validated payloads to a callback.
///
/// The callback is a generic function value owned by the decoder; it runs
/// synchronously inside [`feed`](Decoder::feed) and must not call back into
/// the same decoder. Payload bytes are borrowed for the duration of the
/// call.
pub struct Decoder<F>
where
    F: FnMut(&[u8]),
{
    config: ProtocolConfig,
    callback: F,
    stats: DecoderStats,
    state: State,
    frame_buffer: FrameBuffer,
    current_byte: u8,
    bits_filled: u8,
    expected_payload_len: usize,
    payload_len_known: bool,
    pending_symbol: u8,
    frame_active: bool,
}

impl<F> fmt::Debug for Decoder<F>
where
    F: FnMut(&[u8]),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("buffered_bytes", &self.frame_buffer.len())
            .field("frame_active", &self.frame_active)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<F> Decoder<F>
where
    F: FnMut(&[u8]),
{
    /// Creates a decoder, validating the configuration.
    pub fn new(callback: F, config: ProtocolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            callback,
            stats: DecoderStats::default(),
            state: State::Idle,
            frame_buffer: FrameBuffer::new(),
            current_byte: 0,
            bits_filled: 0,
            expected_payload_len: 0,
            payload_len_known: false,
            pending_symbol: 0,
            frame_active: false,
        })
    }

    /// Replaces the payload sink.
    pub fn set_callback(&mut self, callback: F) {
        self.callback = callback;
    }

    /// The active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The diagnostic counters accumulated so far.
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Replaces the configuration and clears link state.
    ///
    /// Counters are preserved. On failure the previous configuration and
    /// any frame in progress stay untouched.
    pub fn configure(&mut self, config: ProtocolConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Clears all link state: state machine, frame buffer, and symbol
    /// accumulator. Counters are preserved.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.frame_buffer.clear();
        self.current_byte = 0;
        self.bits_filled = 0;
        self.expected_payload_len = 0;
        self.payload_len_known = false;
        self.pending_symbol = 0;
        self.frame_active = false;
    }

    /// Consumes one level transition.
    ///
    /// Never blocks and never fails: rejected inputs are absorbed into the
    /// counters. Changes with a non-positive duration are discarded without
    /// any state change.
    pub fn feed(&mut self, change: SignalChange) {
        if change.duration <= 0 {
            return;
        }

        let ratio = change.duration as f64 / self.config.unit_duration_micros as f64;
        let units = round(ratio) as i64;
        let error = fabs(ratio - units as f64);

        if units <= 0 || error > self.config.drift_limit() {
            self.stats.duration_rejections += 1;
            self.abort_and_rearm(change.level, units);
            return;
        }

        match self.state {
            State::Idle => {
                if self.is_preamble_mark(change.level, units) {
                    self.state = State::WaitSpace;
                }
            }
            State::WaitSpace => {
                if change.level == LightLevel::Off
                    && self.matches(units, self.config.preamble_space_units)
                {
                    self.start_frame();
                } else if self.is_preamble_mark(change.level, units) {
                    // A repeated preamble mark keeps the decoder armed.
                } else {
                    self.abort_and_rearm(change.level, units);
                }
            }
            State::ReadMark => match self.decode_mark(change.level, units) {
                Some(symbol) => {
                    self.pending_symbol = symbol;
                    self.state = State::ReadSpace;
                }
                None => {
                    self.stats.mark_rejections += 1;
                    self.abort_and_rearm(change.level, units);
                }
            },
            State::ReadSpace => {
                if change.level != LightLevel::Off {
                    self.stats.duration_rejections += 1;
                    self.abort_and_rearm(change.level, units);
                } else if !self.matches(units, self.config.separator_units)
                    && units < self.config.separator_units
                {
                    // A short separator inside a frame is corruption. An
                    // over-long one is tolerated: it may simply run into the
                    // gap before the next preamble.
                    self.stats.duration_rejections += 1;
                    self.abort_and_rearm(change.level, units);
                } else {
                    let symbol = self.pending_symbol;
                    self.accumulate(symbol);
                    if self.state == State::ReadSpace {
                        self.state = State::ReadMark;
                    }
                }
            }
        }
    }

    /// Begins frame data accumulation after a complete preamble.
    fn start_frame(&mut self) {
        self.frame_buffer.clear();
        self.current_byte = 0;
        self.bits_filled = 0;
        self.expected_payload_len = 0;
        self.payload_len_known = false;
        self.pending_symbol = 0;
        self.frame_active = true;
        self.state = State::ReadMark;
    }

    /// Aborts any frame in progress, then arms on the rejected input if it
    /// looks like a preamble mark.
    fn abort_and_rearm(&mut self, level: LightLevel, units: i64) {
        self.abort();
        if self.is_preamble_mark(level, units) {
            self.state = State::WaitSpace;
        }
    }

    /// Aborts any frame in progress. Counts a truncated frame only once
    /// data accumulation has begun.
    fn abort(&mut self) {
        if self.frame_active {
            self.stats.truncated_frames += 1;
        }
        self.reset();
    }

    fn is_preamble_mark(&self, level: LightLevel, units: i64) -> bool {
        level == self.config.preamble_color
            && self.matches(units, self.config.preamble_mark_units)
    }

    fn matches(&self, units: i64, expected: i64) -> bool {
        (units - expected).abs() <= self.config.tolerance(expected)
    }

    /// Interprets a pulse as a data symbol, if its color and width allow.
    fn decode_mark(&self, level: LightLevel, units: i64) -> Option<u8> {
        if !self.matches(units, self.config.symbol_mark_units) {
            return None;
        }
        color_to_symbol(level)
    }

    /// Shifts a symbol into the accumulator and handles completed bytes.
    fn accumulate(&mut self, symbol: u8) {
        self.current_byte = (self.current_byte << 2) | (symbol & 0b11);
        self.bits_filled += 2;
        if self.bits_filled < 8 {
            return;
        }

        let byte = self.current_byte;
        self.current_byte = 0;
        self.bits_filled = 0;
        if !self.push_frame_byte(byte) {
            self.abort();
            return;
        }

        if self.frame_buffer.len() == FRAME_CRC_OFFSET {
            // Magic, version, and length are in; the declared payload
            // length bounds the rest of the frame.
            self.expected_payload_len =
                read_be_u16(&self.frame_buffer, FRAME_LENGTH_OFFSET) as usize;
            self.payload_len_known = true;
            if self.expected_payload_len > self.config.max_payload_bytes {
                self.stats.length_violations += 1;
                self.abort();
                return;
            }
        }

        if self.payload_len_known {
            let total = FRAME_OVERHEAD_LEN + self.expected_payload_len;
            if self.frame_buffer.len() > total {
                self.abort();
            } else if self.frame_buffer.len() == total {
                self.finalize();
            }
        }
    }

    /// Validates the accumulated frame and commits its payload.
    fn finalize(&mut self) {
        let len = self.frame_buffer.len();
        if len < FRAME_OVERHEAD_LEN {
            self.stats.header_rejects += 1;
            self.abort();
            return;
        }

        let magic = read_be_u16(&self.frame_buffer, FRAME_MAGIC_OFFSET);
        if magic != self.config.magic {
            self.stats.magic_mismatches += 1;
            self.abort();
            return;
        }

        if self.frame_buffer[FRAME_VERSION_OFFSET] != self.config.version {
            self.stats.header_rejects += 1;
            self.abort();
            return;
        }

        let payload_len = read_be_u16(&self.frame_buffer, FRAME_LENGTH_OFFSET) as usize;
        if payload_len > self.config.max_payload_bytes {
            self.stats.length_violations += 1;
            self.abort();
            return;
        }

        let expected_crc = read_be_u16(&self.frame_buffer, FRAME_CRC_OFFSET);

        if len != FRAME_OVERHEAD_LEN + payload_len {
            self.stats.truncated_frames += 1;
            self.abort();
            return;
        }

        let ender = read_be_u16(&self.frame_buffer, len - FRAME_ENDER_LEN);
        if ender != self.config.ender {
            self.stats.ender_mismatches += 1;
            self.abort();
            return;
        }

        let payload_end = FRAME_PAYLOAD_OFFSET + payload_len;
        let computed = crc16(&self.frame_buffer[FRAME_PAYLOAD_OFFSET..payload_end]);
        if computed != expected_crc {
            self.stats.crc_failures += 1;
            diag!("frame rejected: crc mismatch over {} payload bytes", payload_len);
            self.abort();
            return;
        }

        (self.callback)(&self.frame_buffer[FRAME_PAYLOAD_OFFSET..payload_end]);
        self.stats.frames_decoded += 1;
        diag!("frame decoded: {} payload bytes", payload_len);
        self.reset();
    }

    #[cfg(feature = "std")]
    fn push_frame_byte(&mut self, byte: u8) -> bool {
        self.frame_buffer.push(byte);
        true
    }

    #[cfg(not(feature = "std"))]
    fn push_frame_byte(&mut self, byte: u8) -> bool {
        self.frame_buffer.push(byte).is_ok()
    }
}

fn read_be_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}
