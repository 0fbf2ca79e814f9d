//! # csklink
//!
//! A portable, no_std link-layer codec for color-shift-keyed (CSK) infrared
//! and visible-light channels, as driven by RGBW LEDs and color-filtered
//! photodiodes.
//!
//! The codec is a software modem split across a transmit and a receive path:
//! - an [`Encoder`] that frames a payload with a magic word, version, length,
//!   CRC-16/CCITT and end word, then renders it as timed colored pulses
//! - a streaming [`Decoder`] that synchronizes on a framing preamble,
//!   demodulates quaternary symbols under clock drift, validates the frame,
//!   and delivers payloads through a callback
//!
//! ## Crate features
//! | Feature | Description |
//! |---------|-------------|
//! | `std`   | Disables `#![no_std]` support and replaces `heapless::Vec`s with `std::vec::Vec`s |
//! | `defmt` | Uses `defmt` logging and derives `defmt::Format` on public types |
//! | `log`   | Uses `log` logging |
//!
//! ## Software Features
//!
//! - **Transmitter and receiver** in pure software (no timers, pins, or DMA);
//!   all timing is carried by `(level, duration)` records
//! - Quaternary symbol alphabet: four colors, two bits per pulse
//! - Fault-tolerant reception: per-pulse drift tolerance, on-the-fly
//!   re-arming after rejections, and per-field validation with diagnostic
//!   counters
//! - Bounded buffers throughout; suitable for allocator-free targets
//!
//! ## Usage
//!
//! ```rust
//! use csklink::{Decoder, Encoder, ProtocolConfig};
//!
//! let config = ProtocolConfig::default();
//! let encoder = Encoder::new(config).expect("valid configuration");
//! let signal = encoder.encode(b"hello").expect("payload fits");
//!
//! let mut decoded = Vec::new();
//! let mut decoder = Decoder::new(
//!     |payload: &[u8]| decoded.push(payload.to_vec()),
//!     config,
//! )
//! .expect("valid configuration");
//!
//! for change in signal.iter().copied() {
//!     decoder.feed(change);
//! }
//!
//! assert_eq!(decoder.stats().frames_decoded, 1);
//! drop(decoder);
//! assert_eq!(decoded, vec![b"hello".to_vec()]);
//! ```
//!
//! ## Integration Notes
//!
//! - The decoder expects its inputs in temporal order; there is no
//!   reordering buffer.
//! - The callback runs synchronously inside [`Decoder::feed`] and must not
//!   call back into the same decoder.
//! - Counters survive [`Decoder::reset`] so long-lived links can be
//!   monitored between frames.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded
//! environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(not(feature = "std"))]
pub use heapless;

pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod decoder;
mod diag;
pub mod encoder;
pub mod encoding;
pub mod signal;
pub mod stats;

pub use config::{ConfigError, ProtocolConfig};
pub use decoder::Decoder;
pub use encoder::{EncodeError, Encoder};
pub use encoding::{color_to_symbol, symbol_to_color};
pub use signal::{LightLevel, SignalBuffer, SignalChange};
pub use stats::DecoderStats;
