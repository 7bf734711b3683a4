//! Quantizes countdown seconds into "fine" display values.
//!
//! A total is fine when the iterated digit sum of its minutes plus the iterated
//! digit sum of its seconds is a multiple of three. The display never shows a raw
//! reading: it rounds forward to the next fine second and renders that.
//!
//! | total seconds | fine value | display |
//! |---------------|------------|---------|
//! | 0             | 0          | `000`   |
//! | 300           | 301        | `501`   |
//! | 780           | 782        | `12°`   |

use crate::common::SECONDS_IN_MINUTE;

/// Minutes above which the display collapses to a single `N°` marker.
const COMPACT_ABOVE_MINUTES: u64 = 9;

/// Marker shown when the compacted minute value would fall back into single digits.
const COMPACT_FLOOR_MINUTES: u64 = 12;

/// True when `n` is divisible by three.
pub fn is_fine(n: u64) -> bool {
    n % 3 == 0
}

/// Iterated decimal digit sum, reduced until it is a single digit.
pub fn digit_sum(n: u64) -> u64 {
    let mut sum = 0;
    let mut rest = n;
    while rest != 0 {
        sum += rest % 10;
        rest /= 10;
    }
    if sum > 9 {
        digit_sum(sum)
    } else {
        sum
    }
}

/// The first total `t >= total_seconds` whose minutes/seconds digit sums add up
/// to a fine value. Only ever scans forward.
pub fn nearest_fine(total_seconds: u64) -> u64 {
    let mut current = total_seconds;
    loop {
        let minutes = current / SECONDS_IN_MINUTE;
        let seconds = current % SECONDS_IN_MINUTE;
        if is_fine(digit_sum(minutes) + digit_sum(seconds)) {
            return current;
        }
        current += 1;
    }
}

/// The largest `m' <= minutes` that is fine. Zero is fine, so this terminates.
pub fn nearest_fine_down(minutes: u64) -> u64 {
    let mut current = minutes;
    while !is_fine(current) {
        current -= 1;
    }
    current
}

/// Renders an already fine total.
///
/// Up to nine minutes the result is `M` followed by two-digit seconds. Longer
/// totals drop the seconds and show a quantized minute marker such as `15°`.
pub fn format_fine(total_seconds: u64) -> String {
    let minutes = total_seconds / SECONDS_IN_MINUTE;
    let seconds = total_seconds % SECONDS_IN_MINUTE;

    if minutes > COMPACT_ABOVE_MINUTES {
        let mut marker = nearest_fine_down(minutes);
        if marker <= COMPACT_ABOVE_MINUTES {
            marker = COMPACT_FLOOR_MINUTES;
        }
        return format!("{marker}°");
    }

    let out = format!("{minutes}{seconds:02}");
    if out.len() < 3 {
        format!("0{out}")
    } else {
        out
    }
}

/// Snaps `total_seconds` to the next fine value and renders it.
pub fn total_seconds_to_string(total_seconds: u64) -> String {
    format_fine(nearest_fine(total_seconds))
}
