//! Tick planning for the year axis.

use crate::aggregation::round_half_up;

/// Evenly spaced tick values covering a set of years.
///
/// The step is roughly a tenth of the range, snapped to a multiple of 10, else of 5,
/// else 1. The first tick is the smallest year rounded to the step; ticks continue
/// until one lies past the largest year, so the last tick always exceeds it.
///
/// # Example
///
/// ```rust
/// use coin_stats_engine::ticks;
///
/// assert_eq!(ticks([1400, 1500]), vec![1400, 1410, 1420, 1430, 1440, 1450, 1460,
///                                      1470, 1480, 1490, 1500, 1510]);
/// assert!(ticks(Vec::new()).is_empty());
/// ```
pub fn ticks(years: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut years = years.into_iter();
    let Some(first) = years.next() else {
        return Vec::new();
    };
    let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));

    let step = round_half_up(f64::from(max - min) / 10.0);
    let mut nearest = round_half_up(step / 10.0) * 10.0;
    if nearest == 0.0 {
        nearest = round_half_up(step / 5.0) * 5.0;
    }
    if nearest == 0.0 {
        nearest = 1.0;
    }
    let nearest = nearest as i32;

    let start = round_half_up(f64::from(min) / f64::from(nearest)) as i32 * nearest;
    let mut ticks = vec![start];
    let mut last = start;
    while last <= max {
        last += nearest;
        ticks.push(last);
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_single_year() {
        assert_eq!(ticks([1450]), vec![1450, 1451]);
    }

    #[test]
    fn test_ticks_short_range_uses_unit_step() {
        // step = round(0.4) = 0 -> nearest falls through to 1
        assert_eq!(ticks([1400, 1404]), vec![1400, 1401, 1402, 1403, 1404, 1405]);
    }

    #[test]
    fn test_ticks_step_of_five() {
        // range 30: step 3 -> round(0.3)*10 = 0 -> round(0.6)*5 = 5
        let t = ticks([1402, 1432, 1410]);
        assert_eq!(t.first(), Some(&1400));
        assert_eq!(t.last(), Some(&1435));
        assert!(t.windows(2).all(|w| w[1] - w[0] == 5));
    }

    #[test]
    fn test_ticks_start_rounds_to_step() {
        // range 200: step 20 -> nearest 20; start round(1333/20)*20 = 1340
        let t = ticks([1333, 1533]);
        assert_eq!(t[0], 1340);
        assert_eq!(t.last(), Some(&1540));
    }

    #[test]
    fn test_ticks_always_pass_max() {
        for (min, max) in [(1300, 1301), (1350, 1599), (1000, 1999), (1456, 1457)] {
            let t = ticks([min, max]);
            assert!(*t.last().unwrap() > max);
            assert!(t[t.len() - 2] <= max);
        }
    }
}
