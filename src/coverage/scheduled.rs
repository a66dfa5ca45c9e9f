//! Scheduled headcount from shift windows.

use crate::error::StaffingResult;
use crate::models::{IntervalMap, TimeWindow};

/// Counts, for each interval of `template`, the windows covering its start.
///
/// The result has exactly `template`'s keys in `template`'s order, so it
/// can be compared against the template without a key mismatch. Windows
/// that run past midnight also cover the early intervals of the day.
pub fn scheduled_coverage<'a, I>(template: &IntervalMap, windows: I) -> StaffingResult<IntervalMap>
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    let timeline = template.timeline()?;
    let mut counts = vec![0.0_f64; timeline.len()];
    for window in windows {
        for (slot, (_, minute, _)) in counts.iter_mut().zip(&timeline) {
            if window.covers_time_of_day(*minute) {
                *slot += 1.0;
            }
        }
    }
    IntervalMap::from_pairs(
        timeline
            .into_iter()
            .zip(counts)
            .map(|((label, _, _), count)| (label, count)),
    )
}
