use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pressure channels in one frame (P1..P8)
pub const CHANNEL_COUNT: usize = 8;

/// Which insole a tagged frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Wire encoding that produced a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// `PRESSURE_LEFT:` / `PRESSURE_RIGHT:` followed by comma-separated values
    TaggedCsv { side: Side },
    /// Comma-separated values without a tag
    UntaggedCsv,
    /// Eight whitespace-separated 8-bit values (legacy firmware)
    SpaceSeparated,
    /// 32 bytes, eight little-endian u32
    Binary32,
    /// 8 bytes, one channel per byte
    Binary8,
    /// A single integer broadcast to every channel
    Scalar,
}

impl Encoding {
    /// Whether this frame carries less than eight independent measurements.
    ///
    /// Only the scalar fallback is degraded: its eight channels are copies of
    /// one value and should not be presented as a genuine pressure map.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Encoding::Scalar)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::TaggedCsv { side: Side::Left } => f.write_str("tagged-csv(left)"),
            Encoding::TaggedCsv { side: Side::Right } => f.write_str("tagged-csv(right)"),
            Encoding::UntaggedCsv => f.write_str("untagged-csv"),
            Encoding::SpaceSeparated => f.write_str("space-separated"),
            Encoding::Binary32 => f.write_str("binary32"),
            Encoding::Binary8 => f.write_str("binary8"),
            Encoding::Scalar => f.write_str("scalar"),
        }
    }
}

/// One decoded frame: simultaneous samples for channels P1..P8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelReading {
    values: [u32; CHANNEL_COUNT],
    encoding: Encoding,
}

impl ChannelReading {
    pub(crate) fn new(values: [u32; CHANNEL_COUNT], encoding: Encoding) -> Self {
        Self { values, encoding }
    }

    /// Channel values in P1..P8 order
    pub fn values(&self) -> &[u32; CHANNEL_COUNT] {
        &self.values
    }

    /// Value of a single channel (0-based), if the index is in range
    pub fn channel(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}
