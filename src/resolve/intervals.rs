use crate::core::call::Interval;

/// Merge intervals into the minimal sorted, non-overlapping covering set.
///
/// Overlapping and touching intervals (next start <= current end) are merged.
#[must_use]
pub fn merge_intervals(intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.into_iter().collect();
    sorted.sort_unstable();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(current) if interval.start <= current.end => {
                current.end = current.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged
}

/// Total length spanned by merged intervals
#[must_use]
pub fn covered_length(merged: &[Interval]) -> u64 {
    merged.iter().map(Interval::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: u64, end: u64) -> Interval {
        Interval::new(start, end)
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_intervals(vec![iv(180, 260), iv(100, 200)]);
        assert_eq!(merged, vec![iv(100, 260)]);
        assert_eq!(covered_length(&merged), 160);
    }

    #[test]
    fn test_merge_touching_and_contained() {
        let merged = merge_intervals(vec![iv(1, 10), iv(10, 20), iv(12, 15), iv(30, 40)]);
        assert_eq!(merged, vec![iv(1, 20), iv(30, 40)]);
        assert_eq!(covered_length(&merged), 29);
    }

    #[test]
    fn test_merge_empty_and_single() {
        assert!(merge_intervals(Vec::new()).is_empty());
        assert_eq!(merge_intervals(vec![iv(5, 9)]), vec![iv(5, 9)]);
    }

    #[test]
    fn test_merged_sorted_and_disjoint() {
        // Deterministic pseudo-random intervals
        let mut seed: u64 = 42;
        let mut next = || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (seed >> 33) % 1000
        };

        for _ in 0..50 {
            let intervals: Vec<Interval> = (0..20)
                .map(|_| {
                    let start = next();
                    iv(start, start + next() % 100)
                })
                .collect();

            let merged = merge_intervals(intervals.clone());
            assert!(merged.windows(2).all(|w| w[0].end < w[1].start));
            for interval in &intervals {
                assert!(merged
                    .iter()
                    .any(|m| m.start <= interval.start && interval.end <= m.end));
            }
        }
    }

    #[test]
    fn test_coverage_never_decreases() {
        let mut intervals = vec![iv(50, 80)];
        let mut previous = covered_length(&merge_intervals(intervals.clone()));
        for extra in [iv(70, 120), iv(10, 20), iv(15, 60), iv(200, 210), iv(0, 300)] {
            intervals.push(extra);
            let current = covered_length(&merge_intervals(intervals.clone()));
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 300);
    }
}
