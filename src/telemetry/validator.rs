use super::reading::CHANNEL_COUNT;

/// Tags that mark a line as a telemetry record
const TELEMETRY_TAGS: [&str; 3] = ["PRESSURE_LEFT:", "PRESSURE_RIGHT:", "RAW_FRAME:"];

/// Check whether a free-text log line is a well-formed telemetry record.
///
/// Untagged lines are always well-formed. A tagged line must carry exactly
/// eight comma-separated non-negative numbers after the tag. Used for display
/// emphasis only; decoding is far more lenient.
pub fn is_well_formed(line: &str) -> bool {
    let Some(body) = TELEMETRY_TAGS
        .iter()
        .find_map(|tag| line.find(tag).map(|at| &line[at + tag.len()..]))
    else {
        return true;
    };

    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();
    tokens.len() == CHANNEL_COUNT
        && tokens.iter().all(|token| {
            token
                .parse::<f64>()
                .map(|value| value.is_finite() && value >= 0.0)
                .unwrap_or(false)
        })
}
