use std::collections::HashMap;

use crate::core::hit::ScoredHit;

/// Pick the category predicted by most hits.
///
/// Ties go to the category with the highest summed probability, then to the
/// lexicographically smallest name, so the result never depends on hit order.
pub fn majority_category<'a>(hits: impl IntoIterator<Item = &'a ScoredHit>) -> Option<String> {
    let mut tally: HashMap<&str, (usize, f64)> = HashMap::new();
    for hit in hits {
        let entry = tally.entry(hit.predicted_category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += hit.probability;
    }

    tally
        .into_iter()
        .max_by(|(name_a, (count_a, sum_a)), (name_b, (count_b, sum_b))| {
            count_a
                .cmp(count_b)
                .then_with(|| sum_a.partial_cmp(sum_b).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hit::test_support::hit;
    use crate::filtering::HitFilter;

    fn scored(entries: &[(f64, &str)]) -> Vec<ScoredHit> {
        let hits = entries
            .iter()
            .enumerate()
            .map(|(i, _)| hit(&format!("q{i}"), "ref1", 90.0, 1e-20, (1, 100)))
            .collect();
        HitFilter::new(0.0, 1.0)
            .apply(hits)
            .0
            .into_iter()
            .zip(entries)
            .map(|(h, (p, c))| ScoredHit::new(h, *p, *c))
            .collect()
    }

    #[test]
    fn test_majority_wins() {
        let hits = scored(&[(0.9, "a"), (0.8, "b"), (0.85, "b")]);
        assert_eq!(majority_category(&hits).as_deref(), Some("b"));
    }

    #[test]
    fn test_tie_broken_by_summed_probability() {
        let hits = scored(&[(0.99, "a"), (0.81, "b"), (0.82, "b"), (0.9, "a")]);
        assert_eq!(majority_category(&hits).as_deref(), Some("a"));
    }

    #[test]
    fn test_full_tie_broken_by_name() {
        let hits = scored(&[(0.9, "zeta"), (0.9, "alpha")]);
        assert_eq!(majority_category(&hits).as_deref(), Some("alpha"));
        let reversed = scored(&[(0.9, "alpha"), (0.9, "zeta")]);
        assert_eq!(majority_category(&reversed).as_deref(), Some("alpha"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(majority_category(&Vec::new()), None);
    }
}
