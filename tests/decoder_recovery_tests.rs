//! Decoder recovery under noise, truncation, and crafted corruption.

use std::cell::RefCell;
use std::rc::Rc;

use csklink::{
    symbol_to_color, Decoder, DecoderStats, Encoder, LightLevel, ProtocolConfig, SignalChange,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn decode_all(config: ProtocolConfig, signal: &[SignalChange]) -> (Vec<Vec<u8>>, DecoderStats) {
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let mut decoder = Decoder::new(
        move |payload: &[u8]| sink.borrow_mut().push(payload.to_vec()),
        config,
    )
    .expect("valid config");
    for &change in signal {
        decoder.feed(change);
    }
    let stats = *decoder.stats();
    drop(decoder);
    let payloads = Rc::try_unwrap(received).expect("sole owner").into_inner();
    (payloads, stats)
}

fn noise(rng: &mut StdRng, count: usize, config: &ProtocolConfig) -> Vec<SignalChange> {
    let max_duration = 2 * config.frame_gap_units * config.unit_duration_micros;
    (0..count)
        .map(|_| {
            let level = match rng.gen_range(0u8..5) {
                0 => LightLevel::Off,
                1 => LightLevel::White,
                2 => LightLevel::Red,
                3 => LightLevel::Green,
                _ => LightLevel::Blue,
            };
            SignalChange {
                level,
                duration: rng.gen_range(1..=max_duration),
            }
        })
        .collect()
}

/// Renders raw frame bytes as pulses: preamble, then one mark/space pair
/// per 2-bit symbol. Lets tests craft frames the encoder refuses to build.
fn pulses_for_bytes(config: &ProtocolConfig, bytes: &[u8]) -> Vec<SignalChange> {
    let unit = config.unit_duration_micros;
    let mut out = vec![
        SignalChange {
            level: config.preamble_color,
            duration: config.preamble_mark_units * unit,
        },
        SignalChange {
            level: LightLevel::Off,
            duration: config.preamble_space_units * unit,
        },
    ];
    for &byte in bytes {
        for shift in [6u8, 4, 2, 0] {
            out.push(SignalChange {
                level: symbol_to_color((byte >> shift) & 0b11),
                duration: config.symbol_mark_units * unit,
            });
            out.push(SignalChange {
                level: LightLevel::Off,
                duration: config.separator_units * unit,
            });
        }
    }
    out
}

#[test]
fn recovers_after_noise_bursts() {
    let config = ProtocolConfig::default();
    let encoder = Encoder::new(config).expect("valid config");
    let frame = encoder.encode(b"signal in the noise").expect("payload encodes");

    let mut rng = StdRng::seed_from_u64(0xC39A);
    let mut signal = noise(&mut rng, 1000, &config);
    signal.extend(frame.iter().copied());
    signal.extend(noise(&mut rng, 1000, &config));

    let (payloads, stats) = decode_all(config, &signal);
    assert_eq!(payloads, [b"signal in the noise".to_vec()]);
    assert_eq!(stats.frames_decoded, 1);
    // Two thousand random pulses cannot all have been quietly absorbed.
    assert!(
        stats.duration_rejections + stats.mark_rejections + stats.truncated_frames > 0,
        "noise left no trace in {stats:?}"
    );
}

#[test]
fn garbage_alone_never_commits_a_frame() {
    let config = ProtocolConfig::default();
    let mut rng = StdRng::seed_from_u64(0x51AA);
    let signal = noise(&mut rng, 5000, &config);

    let (payloads, stats) = decode_all(config, &signal);
    assert!(payloads.is_empty());
    assert_eq!(stats.frames_decoded, 0);
}

#[test]
fn stray_preamble_pulse_does_not_poison_the_next_frame() {
    let config = ProtocolConfig::default();
    let encoder = Encoder::new(config).expect("valid config");
    let frame = encoder.encode(b"ok").expect("payload encodes");

    let mut signal = vec![SignalChange {
        level: config.preamble_color,
        duration: config.preamble_mark_units * config.unit_duration_micros,
    }];
    signal.extend(frame.iter().copied());

    let (payloads, stats) = decode_all(config, &signal);
    assert_eq!(payloads, [b"ok".to_vec()]);
    assert_eq!(stats.frames_decoded, 1);
}

#[test]
fn truncated_frame_then_retransmission() {
    let config = ProtocolConfig::default();
    let encoder = Encoder::new(config).expect("valid config");
    let frame = encoder.encode(b"Hello").expect("payload encodes");

    // Lose the transmitter mid-frame, then retransmit in full.
    let mut signal: Vec<SignalChange> = frame.iter().take(40).copied().collect();
    signal.extend(frame.iter().copied());

    let (payloads, stats) = decode_all(config, &signal);
    assert_eq!(payloads, [b"Hello".to_vec()]);
    assert_eq!(stats.frames_decoded, 1);
    assert!(stats.truncated_frames >= 1);
}

#[test]
fn crafted_wrong_magic_is_counted() {
    let config = ProtocolConfig::default();
    let bytes = [0xDE, 0xAD, 0x01, 0x00, 0x00, 0x00, 0x00, 0x51, 0xAA];
    let signal = pulses_for_bytes(&config, &bytes);

    let (payloads, stats) = decode_all(config, &signal);
    assert!(payloads.is_empty());
    assert_eq!(
        stats,
        DecoderStats {
            magic_mismatches: 1,
            truncated_frames: 1,
            ..DecoderStats::default()
        }
    );
}

#[test]
fn crafted_crc_mismatch_is_counted() {
    let config = ProtocolConfig::default();
    // Length 1, payload 0xAB, but a zeroed CRC field.
    let bytes = [0xC3, 0x9A, 0x01, 0x00, 0x01, 0x00, 0x00, 0xAB, 0x51, 0xAA];
    let signal = pulses_for_bytes(&config, &bytes);

    let (payloads, stats) = decode_all(config, &signal);
    assert!(payloads.is_empty());
    assert_eq!(
        stats,
        DecoderStats {
            crc_failures: 1,
            truncated_frames: 1,
            ..DecoderStats::default()
        }
    );
}

#[test]
fn crafted_wrong_ender_is_counted() {
    let config = ProtocolConfig::default();
    // Empty payload with the correct empty-input CRC but a bad end word.
    let bytes = [0xC3, 0x9A, 0x01, 0x00, 0x00, 0xFF, 0xFF, 0x12, 0x34];
    let signal = pulses_for_bytes(&config, &bytes);

    let (payloads, stats) = decode_all(config, &signal);
    assert!(payloads.is_empty());
    assert_eq!(
        stats,
        DecoderStats {
            ender_mismatches: 1,
            truncated_frames: 1,
            ..DecoderStats::default()
        }
    );
}
