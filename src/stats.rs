//! Decoder diagnostic counters.

/// Monotonic counters maintained by the decoder.
///
/// Every rejected input increments exactly one counter chosen by the failing
/// check, so the counter block doubles as the decoder's error taxonomy.
/// Counters survive [`Decoder::reset`](crate::Decoder::reset) and are cleared
/// only by constructing a new decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Completely validated frames delivered through the callback.
    pub frames_decoded: usize,
    /// Frames whose magic word did not match the configuration.
    pub magic_mismatches: usize,
    /// Frames rejected for a short header or a version mismatch.
    pub header_rejects: usize,
    /// Frames whose declared payload length exceeded the configured limit.
    pub length_violations: usize,
    /// Frames whose payload CRC did not match the header CRC.
    pub crc_failures: usize,
    /// Frames whose end word did not match the configuration.
    pub ender_mismatches: usize,
    /// Pulses rejected for quantization error or an ill-timed space.
    pub duration_rejections: usize,
    /// Mark pulses rejected for an invalid color or width.
    pub mark_rejections: usize,
    /// Frames aborted after data accumulation had begun.
    pub truncated_frames: usize,
}
