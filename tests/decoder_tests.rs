// Integration tests for telemetry decoding
//
// These tests verify that every wire format the insole firmware may emit is
// recognized, in priority order, through the public decoding API.

use insole_telemetry::telemetry::Side;
use insole_telemetry::{decode, decode_raw, is_well_formed, Encoding, Payload};

#[test]
fn test_tagged_csv_in_range_is_unclamped() {
    let cases = [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [1, 2, 3, 4, 5, 6, 7, 8],
        [4294967295, 17, 0, 65536, 255, 256, 1000000, 42],
    ];

    for values in cases {
        let text = format!(
            "PRESSURE_RIGHT:{}",
            values.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
        );

        let reading = decode(&Payload::Text(text)).expect("tagged frame should decode");

        assert_eq!(reading.values(), &values);
        assert_eq!(reading.encoding(), Encoding::TaggedCsv { side: Side::Right });
    }
}

#[test]
fn test_tagged_csv_keeps_first_eight() {
    let reading = decode(&"PRESSURE_LEFT: 8,7,6,5,4,3,2,1,100,200".into()).unwrap();

    assert_eq!(reading.values(), &[8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_tagged_csv_pads_missing_channels() {
    let reading = decode(&"PRESSURE_LEFT: 9,9,9".into()).unwrap();

    assert_eq!(reading.values(), &[9, 9, 9, 0, 0, 0, 0, 0]);
}

#[test]
fn test_binary32_one_to_eight() {
    let bytes: Vec<u8> = (1u32..=8).flat_map(|v| v.to_le_bytes()).collect();

    let reading = decode(&Payload::Binary(bytes)).unwrap();

    assert_eq!(reading.values(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(reading.encoding(), Encoding::Binary32);
}

#[test]
fn test_untyped_buffers_try_every_view() {
    let text = decode_raw(b"PRESSURE_LEFT: 1,2,3,4,5,6,7,8").unwrap();
    assert!(matches!(text.encoding(), Encoding::TaggedCsv { .. }));

    let binary = decode_raw(&[5, 0, 6, 0, 7, 0, 8, 0]).unwrap();
    assert_eq!(binary.encoding(), Encoding::Binary8);
    assert_eq!(binary.values(), &[5, 0, 6, 0, 7, 0, 8, 0]);

    let printable = decode_raw(b"ABCDEFGH").unwrap();
    assert_eq!(printable.encoding(), Encoding::Binary8);
    assert_eq!(printable.values(), &[65, 66, 67, 68, 69, 70, 71, 72]);
}

#[test]
fn test_scalar_is_distinguishable_from_real_frame() {
    let scalar = decode(&"250".into()).unwrap();
    let legacy = decode(&"250 250 250 250 250 250 250 250".into()).unwrap();

    assert_eq!(scalar.values(), legacy.values());
    assert!(scalar.encoding().is_degraded());
    assert!(!legacy.encoding().is_degraded());
}

#[test]
fn test_noise_is_rejected() {
    for noise in ["", "   ", "OK", "1,2", "a,b,c,d,e", "PRESSURE_LEFT:"] {
        assert!(decode(&noise.into()).is_err(), "{:?} should not decode", noise);
    }
}

#[test]
fn test_line_validator() {
    assert!(!is_well_formed("PRESSURE_LEFT: 1,2,3"));
    assert!(is_well_formed("PRESSURE_LEFT: 1,2,3,4,5,6,7,8"));
    assert!(is_well_formed("firmware 2.1 ready"));
}
