//! Constants shared by the framer, encoder, and decoder.
//!
//! This module defines the protocol-wide constants used for frame layout,
//! buffer sizing, and symbol packing.
//!
//! ## Key Concepts
//!
//! - **Frame layout**: fixed byte offsets of the header and trailer fields
//!   within one wire frame.
//! - **Symbol packing**: each byte travels as four 2-bit symbols, one colored
//!   pulse per symbol.
//! - **Buffer sizing**: compile-time capacities for the `no_std` build, where
//!   frame and signal buffers are fixed-capacity arrays.
//!
//! These values should be used wherever framing or buffer logic is implemented
//! to ensure consistent frame boundaries across the transmit and receive paths.

/// Byte offset of the 2-byte big-endian magic word within a wire frame.
pub const FRAME_MAGIC_OFFSET: usize = 0;

/// Byte offset of the protocol version byte within a wire frame.
pub const FRAME_VERSION_OFFSET: usize = 2;

/// Byte offset of the 2-byte big-endian payload length within a wire frame.
pub const FRAME_LENGTH_OFFSET: usize = 3;

/// Byte offset of the 2-byte big-endian payload CRC within a wire frame.
///
/// The CRC covers the payload bytes only, never the header.
pub const FRAME_CRC_OFFSET: usize = 5;

/// Byte offset of the first payload byte within a wire frame.
pub const FRAME_PAYLOAD_OFFSET: usize = 7;

/// Length (in bytes) of the fixed frame header: magic, version, length, CRC.
pub const FRAME_HEADER_LEN: usize = FRAME_PAYLOAD_OFFSET;

/// Length (in bytes) of the frame trailer holding the ender word.
pub const FRAME_ENDER_LEN: usize = 2;

/// Total fixed overhead of one wire frame; a frame carrying `L` payload bytes
/// occupies `FRAME_OVERHEAD_LEN + L` bytes on the wire.
pub const FRAME_OVERHEAD_LEN: usize = FRAME_HEADER_LEN + FRAME_ENDER_LEN;

/// Number of 2-bit symbols carrying one byte, most-significant pair first.
pub const SYMBOLS_PER_BYTE: usize = 4;

/// Number of payload bits carried by one colored pulse.
pub const BITS_PER_SYMBOL: u8 = 2;

/// Default frame start word.
pub const DEFAULT_MAGIC: u16 = 0xC39A;

/// Default frame end word.
pub const DEFAULT_ENDER: u16 = 0x51AA;

/// Protocol version asserted after the magic word.
pub const PROTOCOL_VERSION: u8 = 1;

/// Effective floor applied to the configured drift fraction.
///
/// Guards against a misconfigured near-zero tolerance that would reject
/// every real-world pulse.
pub const MIN_DRIFT_FRACTION: f64 = 0.01;

/// Upper bound on payload length supported by the `no_std` build.
///
/// Hosted builds may configure larger limits; fixed-capacity builds size
/// their frame buffer from this constant.
pub const MAX_PAYLOAD_LEN: usize = 512;

/// Capacity (in bytes) of the bounded frame buffer in the `no_std` build.
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD_LEN + MAX_PAYLOAD_LEN;

/// Capacity (in signal changes) of the bounded encoder output buffer.
///
/// One frame emits a preamble mark/space pair, a mark/space pair per symbol,
/// and a trailing inter-frame gap.
pub const MAX_SIGNAL_CHANGES: usize = 2 + SYMBOLS_PER_BYTE * 2 * MAX_FRAME_LEN + 1;
