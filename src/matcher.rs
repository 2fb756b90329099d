use crate::time::Timestamp;
use crate::types::Sample;

/// Value of the sample closest in time to `target`.
///
/// `series` must be sorted ascending by time. Ties go to the earliest
/// sample, so the result is the same as a linear stable minimum.
pub fn nearest<V: Copy>(target: Timestamp, series: &[Sample<V>]) -> Option<V> {
    if series.is_empty() {
        return None;
    }

    let idx = series.partition_point(|s| s.time < target);

    let after = series.get(idx);
    let before = idx.checked_sub(1).map(|mut i| {
        // Walk back to the first sample sharing this timestamp.
        while i > 0 && series[i - 1].time == series[i].time {
            i -= 1;
        }
        &series[i]
    });

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if target.abs_diff(b.time) <= target.abs_diff(a.time) {
                b
            } else {
                a
            }
        }
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => return None,
    };

    Some(best.value)
}
