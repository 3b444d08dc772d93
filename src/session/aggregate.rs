//! Reduction of a finalized sample set to summary statistics
//!
//! Averages are rounded per channel first, and the overall average is the
//! rounded mean of those rounded values. Reports produced downstream depend on
//! this two-stage rounding, so it must not be collapsed into a single mean.

use serde::{Deserialize, Serialize};

use crate::telemetry::{ChannelReading, CHANNEL_COUNT};

/// Summary of one completed session, as consumed by report export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Rounded average per channel, P1..P8
    pub per_channel_average: [u32; CHANNEL_COUNT],

    /// 0-based index of the channel with the highest average
    pub peak_channel_index: usize,

    /// Average of the peak channel
    pub peak_value: u32,

    /// Rounded mean of the eight rounded channel averages
    pub overall_average: u32,

    /// Number of readings reduced
    pub sample_count: usize,
}

/// Reduce readings (in arrival order) to a summary.
///
/// Returns `None` for an empty sequence; an empty session has no summary.
pub fn reduce<'a>(readings: impl IntoIterator<Item = &'a ChannelReading>) -> Option<SummaryResult> {
    let mut sums = [0u64; CHANNEL_COUNT];
    let mut count = 0u64;

    for reading in readings {
        for (sum, &value) in sums.iter_mut().zip(reading.values()) {
            *sum += u64::from(value);
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let mut per_channel_average = [0u32; CHANNEL_COUNT];
    for (average, &sum) in per_channel_average.iter_mut().zip(&sums) {
        *average = saturate_u32(round_half_up(sum, count));
    }

    // Strict comparison keeps the lowest index on ties.
    let mut peak_channel_index = 0;
    let mut peak_value = per_channel_average[0];
    for (index, &average) in per_channel_average.iter().enumerate().skip(1) {
        if average > peak_value {
            peak_channel_index = index;
            peak_value = average;
        }
    }

    let averages_sum: u64 = per_channel_average.iter().map(|&a| u64::from(a)).sum();
    let overall_average = saturate_u32(round_half_up(averages_sum, CHANNEL_COUNT as u64));

    Some(SummaryResult {
        per_channel_average,
        peak_channel_index,
        peak_value,
        overall_average,
        sample_count: count as usize,
    })
}

/// Integer division rounding halves away from zero.
fn round_half_up(sum: u64, count: u64) -> u64 {
    let rounded = (u128::from(sum) + u128::from(count) / 2) / u128::from(count);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
