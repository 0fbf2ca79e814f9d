//! Signal-level types observed on the colored-light channel.
//!
//! The codec never talks to hardware directly. A transmitter driver replays
//! [`SignalChange`] sequences onto an LED; a receiver driver timestamps level
//! transitions on a photodiode and feeds them to the decoder. Everything in
//! between is expressed with the types in this module.

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::consts::{MAX_FRAME_LEN, MAX_SIGNAL_CHANGES};

/// Observable level of the light channel.
///
/// `Off` means no light. The four colors are distinct data symbols; any of
/// them may also serve as the preamble color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightLevel {
    /// No light on the channel.
    #[default]
    Off,
    /// White light.
    White,
    /// Red light.
    Red,
    /// Green light.
    Green,
    /// Blue light.
    Blue,
}

/// One level transition on the channel.
///
/// `duration` is how long the channel held `level`, in microseconds.
/// The decoder silently ignores changes with a non-positive duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalChange {
    /// The level the channel changed to.
    pub level: LightLevel,
    /// How long the level was held, in microseconds.
    pub duration: i64,
}

/// Signal sequence produced by the encoder for one frame.
#[cfg(feature = "std")]
pub type SignalBuffer = Vec<SignalChange>;

/// Signal sequence produced by the encoder for one frame.
#[cfg(not(feature = "std"))]
pub type SignalBuffer = Vec<SignalChange, MAX_SIGNAL_CHANGES>;

/// Bounded byte buffer holding one wire frame.
#[cfg(feature = "std")]
pub(crate) type FrameBuffer = Vec<u8>;

/// Bounded byte buffer holding one wire frame.
#[cfg(not(feature = "std"))]
pub(crate) type FrameBuffer = Vec<u8, MAX_FRAME_LEN>;
