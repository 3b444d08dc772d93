//! Tolerant decoding of 8-channel pressure frames
//!
//! The insole firmware does not announce its wire format, so every payload is
//! run through an ordered list of independent strategies and the first one
//! that accepts it wins:
//!
//! 1. Tagged CSV (`PRESSURE_LEFT: 1,2,...`)
//! 2. Untagged CSV (at least 4 numeric tokens)
//! 3. Eight whitespace-separated 8-bit values
//! 4. 32-byte binary, eight little-endian u32
//! 5. 8-byte binary, one channel per byte
//! 6. A single bare integer broadcast to all channels
//!
//! Typed payloads only offer the view they carry: text strategies skip a
//! [`Payload::Binary`] and binary strategies skip a [`Payload::Text`]. An
//! untyped buffer given to [`decode_raw`] offers both, so a printable 8-byte
//! frame that no text strategy accepts still reaches the binary strategies.

use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use super::reading::{ChannelReading, Encoding, Side, CHANNEL_COUNT};

/// Matches the side tag that opens a tagged CSV frame.
static PRESSURE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PRESSURE_(LEFT|RIGHT):").expect("pressure tag regex is valid"));

/// Untagged CSV frames need this many numeric tokens to be trusted.
const MIN_NUMERIC_TOKENS: usize = 4;

/// Width of a legacy 8-bit channel value.
const LEGACY_CHANNEL_MAX: i64 = u8::MAX as i64;

const BINARY32_LEN: usize = CHANNEL_COUNT * 4;
const BINARY8_LEN: usize = CHANNEL_COUNT;

/// Raw notification payload as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// Best-effort text rendering for diagnostics (binary is shown as hex)
    pub fn to_lossy_text(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Binary(bytes) => to_hex(bytes),
        }
    }

    fn view(&self) -> FrameView<'_> {
        match self {
            Payload::Text(text) => FrameView {
                text: Some(Cow::Borrowed(text)),
                bytes: None,
            },
            Payload::Binary(bytes) => FrameView {
                text: None,
                bytes: Some(bytes),
            },
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

/// A payload none of the strategies accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized telemetry payload: {payload:?}")]
pub struct DecodeFailure {
    payload: String,
}

impl DecodeFailure {
    /// The rejected payload, as text
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// The interpretations of one payload that strategies may look at
struct FrameView<'a> {
    text: Option<Cow<'a, str>>,
    bytes: Option<&'a [u8]>,
}

impl<'a> FrameView<'a> {
    /// Both views of an untyped buffer. Trailing NULs are dropped from the
    /// text view and invalid UTF-8 is replaced; the byte view is untouched.
    fn untyped(bytes: &'a [u8]) -> Self {
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);

        Self {
            text: Some(String::from_utf8_lossy(&bytes[..end])),
            bytes: Some(bytes),
        }
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn bytes(&self) -> Option<&[u8]> {
        self.bytes
    }

    /// Valid printable text as-is, any other buffer as hex
    fn describe(&self) -> String {
        match (&self.text, self.bytes) {
            (Some(Cow::Borrowed(text)), Some(_)) if is_printable(text) => text.to_string(),
            (_, Some(bytes)) => to_hex(bytes),
            (text, None) => text.as_deref().unwrap_or_default().to_string(),
        }
    }
}

fn is_printable(text: &str) -> bool {
    text.chars().all(|c| !c.is_control() || c.is_whitespace())
}

type Strategy = fn(&FrameView<'_>) -> Option<ChannelReading>;

const STRATEGIES: [Strategy; 6] = [
    decode_tagged_csv,
    decode_untagged_csv,
    decode_space_separated,
    decode_binary32,
    decode_binary8,
    decode_scalar,
];

/// Decode one notification payload into a channel reading
pub fn decode(payload: &Payload) -> Result<ChannelReading, DecodeFailure> {
    decode_view(&payload.view())
}

/// Decode an untyped buffer, trying it both as text and as raw bytes
pub fn decode_raw(bytes: &[u8]) -> Result<ChannelReading, DecodeFailure> {
    decode_view(&FrameView::untyped(bytes))
}

fn decode_view(view: &FrameView<'_>) -> Result<ChannelReading, DecodeFailure> {
    match STRATEGIES.iter().find_map(|strategy| strategy(view)) {
        Some(reading) => {
            debug!("Decoded {} frame: {:?}", reading.encoding(), reading.values());
            Ok(reading)
        }
        None => Err(DecodeFailure {
            payload: view.describe(),
        }),
    }
}

fn decode_tagged_csv(view: &FrameView<'_>) -> Option<ChannelReading> {
    let text = view.text()?;
    let captures = PRESSURE_TAG.captures(text)?;
    let side = match &captures[1] {
        "LEFT" => Side::Left,
        _ => Side::Right,
    };
    let body = &text[captures.get(0)?.end()..];

    let tokens: Vec<&str> = body.split(',').collect();
    if !tokens.iter().any(|token| parse_integer(token).is_some()) {
        return None;
    }

    // Out-of-range tokens become 0 here, unlike the other text paths.
    let values = tokens.iter().map(|token| {
        parse_integer(token)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0)
    });

    Some(ChannelReading::new(
        fill_channels(values),
        Encoding::TaggedCsv { side },
    ))
}

fn decode_untagged_csv(view: &FrameView<'_>) -> Option<ChannelReading> {
    let text = view.text()?;
    if !text.contains(',') || PRESSURE_TAG.is_match(text) {
        return None;
    }

    let parsed: Vec<Option<i64>> = text.split(',').map(parse_integer).collect();
    let numeric = parsed.iter().filter(|value| value.is_some()).count();
    if numeric < MIN_NUMERIC_TOKENS {
        return None;
    }

    let values = parsed
        .into_iter()
        .map(|value| value.map(clamp_to_u32).unwrap_or(0));

    Some(ChannelReading::new(
        fill_channels(values),
        Encoding::UntaggedCsv,
    ))
}

fn decode_space_separated(view: &FrameView<'_>) -> Option<ChannelReading> {
    let text = view.text()?;
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != CHANNEL_COUNT {
        return None;
    }

    let mut channels = [0u32; CHANNEL_COUNT];
    for (slot, token) in channels.iter_mut().zip(&tokens) {
        let value = parse_integer(token)?;
        *slot = value.clamp(0, LEGACY_CHANNEL_MAX) as u32;
    }

    Some(ChannelReading::new(channels, Encoding::SpaceSeparated))
}

fn decode_binary32(view: &FrameView<'_>) -> Option<ChannelReading> {
    let bytes = view.bytes()?;
    if bytes.len() != BINARY32_LEN {
        return None;
    }

    let mut channels = [0u32; CHANNEL_COUNT];
    for (slot, chunk) in channels.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    Some(ChannelReading::new(channels, Encoding::Binary32))
}

fn decode_binary8(view: &FrameView<'_>) -> Option<ChannelReading> {
    let bytes = view.bytes()?;
    if bytes.len() != BINARY8_LEN {
        return None;
    }

    Some(ChannelReading::new(
        fill_channels(bytes.iter().map(|&byte| u32::from(byte))),
        Encoding::Binary8,
    ))
}

fn decode_scalar(view: &FrameView<'_>) -> Option<ChannelReading> {
    let text = view.text()?;
    let value = clamp_to_u32(parse_integer(text)?);

    Some(ChannelReading::new([value; CHANNEL_COUNT], Encoding::Scalar))
}

/// Parse an optionally signed decimal integer, saturating overlong digit runs.
fn parse_integer(token: &str) -> Option<i64> {
    let token = token.trim();
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

fn clamp_to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Take up to 8 values, zero-padding missing channels.
fn fill_channels(values: impl IntoIterator<Item = u32>) -> [u32; CHANNEL_COUNT] {
    let mut channels = [0u32; CHANNEL_COUNT];
    for (slot, value) in channels.iter_mut().zip(values) {
        *slot = value;
    }
    channels
}
