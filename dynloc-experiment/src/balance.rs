//! Counterbalanced selection of categories across repeated draws.

use dynloc_core::{DesignError, Result};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Draws `n` categories, preferring the least-drawn ones, and bumps `counts`
/// for every category returned.
///
/// When the least-drawn categories cannot cover `n` on their own, all of
/// them are taken, followed by as many full passes over every category as
/// fit and a random partial pass for the rest. The result is shuffled, so it
/// may name a category more than once when `n` exceeds the category count.
pub fn balanced_select<R>(
    categories: &[String],
    n: usize,
    counts: &mut [u32],
    rng: &mut R,
) -> Result<Vec<String>>
where
    R: Rng + ?Sized,
{
    if categories.len() != counts.len() {
        return Err(DesignError::InvalidDesign(format!(
            "{} counters for {} categories",
            counts.len(),
            categories.len()
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    let Some(&min) = counts.iter().min() else {
        return Err(DesignError::InvalidDesign(
            "cannot select from an empty category list".into(),
        ));
    };

    let least: Vec<usize> = (0..counts.len()).filter(|&i| counts[i] == min).collect();
    let mut picked: Vec<usize> = if n <= least.len() {
        least.choose_multiple(rng, n).copied().collect()
    } else {
        let all: Vec<usize> = (0..categories.len()).collect();
        let mut picked = least.clone();
        let mut remaining = n - least.len();
        while remaining >= all.len() {
            picked.extend_from_slice(&all);
            remaining -= all.len();
        }
        picked.extend(all.choose_multiple(rng, remaining).copied());
        picked
    };

    for &i in &picked {
        counts[i] += 1;
    }
    picked.shuffle(rng);
    Ok(picked.into_iter().map(|i| categories[i].clone()).collect())
}

/// A category list together with how often each one has been drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBalancer {
    categories: Vec<String>,
    counts: Vec<u32>,
}

impl CategoryBalancer {
    pub fn new(categories: Vec<String>) -> Self {
        let counts = vec![0; categories.len()];
        Self { categories, counts }
    }

    /// Resumes from previously recorded counters.
    pub fn with_counts(categories: Vec<String>, counts: Vec<u32>) -> Result<Self> {
        if categories.len() != counts.len() {
            return Err(DesignError::InvalidDesign(format!(
                "{} counters for {} categories",
                counts.len(),
                categories.len()
            )));
        }
        Ok(Self { categories, counts })
    }

    pub fn select<R>(&mut self, n: usize, rng: &mut R) -> Result<Vec<String>>
    where
        R: Rng + ?Sized,
    {
        balanced_select(&self.categories, n, &mut self.counts, rng)
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn count(&self, category: &str) -> Option<u32> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.counts[i])
    }

    /// Difference between the most and least drawn category.
    pub fn spread(&self) -> u32 {
        let max = self.counts.iter().max().copied().unwrap_or(0);
        let min = self.counts.iter().min().copied().unwrap_or(0);
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cat{i}")).collect()
    }

    #[test]
    fn prefers_least_drawn_categories() {
        let cats = names(4);
        let mut counts = vec![1, 0, 1, 0];
        let mut rng = StdRng::seed_from_u64(3);
        let mut picked = balanced_select(&cats, 2, &mut counts, &mut rng).unwrap();
        picked.sort();
        assert_eq!(picked, vec!["cat1", "cat3"]);
        assert_eq!(counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn fills_beyond_the_least_drawn_with_full_passes() {
        let cats = names(3);
        let mut counts = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(11);
        let picked = balanced_select(&cats, 5, &mut counts, &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
        // one for the least-drawn, a full pass, one more at random
        assert_eq!(counts.iter().sum::<u32>(), 2 + 5);
        let spread = counts.iter().max().unwrap() - counts.iter().min().unwrap();
        assert!(spread <= 1, "{counts:?}");
        assert_eq!(picked.iter().filter(|c| *c == "cat0").count() as u32, counts[0]);
    }

    #[test]
    fn stays_balanced_over_many_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        for n_categories in [2, 3, 5, 8] {
            let mut balancer = CategoryBalancer::new(names(n_categories));
            for round in 0..200 {
                let n = 1 + (round * 7) % (2 * n_categories + 1);
                let picked = balancer.select(n, &mut rng).unwrap();
                assert_eq!(picked.len(), n);
                assert!(balancer.spread() <= 1, "{:?}", balancer.counts());
            }
        }
    }

    #[test]
    fn zero_request_changes_nothing() {
        let mut balancer = CategoryBalancer::new(names(3));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(balancer.select(0, &mut rng).unwrap().is_empty());
        assert_eq!(balancer.counts(), &[0, 0, 0]);
    }

    #[test]
    fn mismatched_counters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut counts = vec![0];
        assert!(balanced_select(&names(2), 1, &mut counts, &mut rng).is_err());
        assert!(CategoryBalancer::with_counts(names(2), vec![0]).is_err());
        assert!(balanced_select(&[], 1, &mut [], &mut rng).is_err());
    }

    #[test]
    fn resumes_from_recorded_counts() {
        let mut balancer =
            CategoryBalancer::with_counts(names(3), vec![2, 1, 2]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(balancer.select(1, &mut rng).unwrap(), vec!["cat1"]);
        assert_eq!(balancer.count("cat1"), Some(2));
    }
}
