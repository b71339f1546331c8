//! Built-in domain-agnostic operators.
//!
//! # Crossover Operators
//!
//! - [`SinglePointCrosser`]: cut both parents at one point and swap tails
//!
//! # Mutation Operators
//!
//! - [`GaussianMutator`]: perturb every real-valued gene with normal noise
//!
//! Graph-constrained mutation for group assignments lives in
//! [`district::DistrictMutator`](crate::district::DistrictMutator).

use super::types::{Crosser, Genome, Mutator};
use crate::error::NoNeighborsError;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::instrument;

// ============================================================================
// Crossover operators
// ============================================================================

/// Single-point crossover.
///
/// Picks a cut index `k` uniformly in `[0, len - 1)` and returns
/// `a[..k] ++ b[k..]` and `b[..k] ++ a[k..]`. Both offspring always have the
/// full length. Genomes with fewer than two genes have no valid cut and are
/// returned as copies.
///
/// # Complexity
/// O(n)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinglePointCrosser;

impl SinglePointCrosser {
    /// Builds both offspring for an explicit cut index.
    ///
    /// # Panics
    /// Panics if the parents differ in length or `cut > len`.
    pub fn cross_at<G: Clone>(a: &Genome<G>, b: &Genome<G>, cut: usize) -> (Genome<G>, Genome<G>) {
        assert_eq!(a.len(), b.len(), "parents must have equal length");
        let (a, b) = (a.genes(), b.genes());

        let mut first = Vec::with_capacity(a.len());
        first.extend_from_slice(&a[..cut]);
        first.extend_from_slice(&b[cut..]);

        let mut second = Vec::with_capacity(b.len());
        second.extend_from_slice(&b[..cut]);
        second.extend_from_slice(&a[cut..]);

        (Genome::new(first), Genome::new(second))
    }
}

impl<G: Clone + Send + Sync> Crosser<G> for SinglePointCrosser {
    #[instrument(level = "trace", skip_all, fields(genome_length = a.len()))]
    fn cross<R: Rng>(&self, a: &Genome<G>, b: &Genome<G>, rng: &mut R) -> (Genome<G>, Genome<G>) {
        let n = a.len();
        if n < 2 {
            return (a.clone(), b.clone());
        }
        let cut = rng.random_range(0..n - 1);
        Self::cross_at(a, b, cut)
    }
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Gaussian mutation for real-valued genomes.
///
/// Every gene `x` is replaced by a draw from `Normal(x, sigma)`. Never fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianMutator {
    sigma: f64,
}

impl GaussianMutator {
    /// Creates a mutator with standard deviation `sigma`.
    ///
    /// Negative or non-finite values are treated as 0, which makes the
    /// mutator an identity copy.
    pub fn new(sigma: f64) -> Self {
        let sigma = if sigma.is_finite() { sigma.max(0.0) } else { 0.0 };
        Self { sigma }
    }

    /// The standard deviation.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Mutator<f64> for GaussianMutator {
    fn mutate<R: Rng>(
        &self,
        genome: &Genome<f64>,
        rng: &mut R,
    ) -> Result<Genome<f64>, NoNeighborsError> {
        if self.sigma == 0.0 {
            return Ok(genome.clone());
        }
        Ok(genome
            .iter()
            .map(|&x| match Normal::new(x, self.sigma) {
                Ok(normal) => normal.sample(rng),
                // Non-finite mean: leave the gene alone.
                Err(_) => x,
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cross_at_partitions() {
        let a = Genome::new(vec![1, 1, 1, 1, 1]);
        let b = Genome::new(vec![2, 2, 2, 2, 2]);
        let (x, y) = SinglePointCrosser::cross_at(&a, &b, 2);
        assert_eq!(x.genes(), &[1, 1, 2, 2, 2]);
        assert_eq!(y.genes(), &[2, 2, 1, 1, 1]);
    }

    #[test]
    fn test_cross_at_zero_swaps_everything() {
        let a = Genome::new(vec![1, 2, 3]);
        let b = Genome::new(vec![4, 5, 6]);
        let (x, y) = SinglePointCrosser::cross_at(&a, &b, 0);
        assert_eq!(x, b);
        assert_eq!(y, a);
    }

    #[test]
    fn test_cross_keeps_length_and_parents() {
        let mut rng = StdRng::seed_from_u64(42);
        let a: Genome<u32> = (0..20).collect();
        let b: Genome<u32> = (100..120).collect();
        let (a_before, b_before) = (a.clone(), b.clone());

        for _ in 0..100 {
            let (x, y) = SinglePointCrosser.cross(&a, &b, &mut rng);
            assert_eq!(x.len(), 20);
            assert_eq!(y.len(), 20);
            // The last gene always comes from the other parent.
            assert_eq!(x[19], b[19]);
            assert_eq!(y[19], a[19]);
        }
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    fn test_cross_single_gene() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Genome::new(vec![1]);
        let b = Genome::new(vec![2]);
        let (x, y) = SinglePointCrosser.cross(&a, &b, &mut rng);
        assert_eq!(x, a);
        assert_eq!(y, b);
    }

    #[test]
    fn test_cut_covers_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Genome::new(vec![0u8; 4]);
        let b = Genome::new(vec![1u8; 4]);
        let mut cuts = [false; 3];
        for _ in 0..200 {
            let (x, _) = SinglePointCrosser.cross(&a, &b, &mut rng);
            let cut = x.iter().take_while(|&&g| g == 0).count();
            assert!(cut < 3, "cut {cut} outside [0, 3)");
            cuts[cut] = true;
        }
        assert!(cuts.iter().all(|&seen| seen));
    }

    #[test]
    fn test_gaussian_perturbs_every_gene() {
        let mut rng = StdRng::seed_from_u64(42);
        let genome = Genome::new(vec![0.0; 8]);
        let mutated = GaussianMutator::new(1.0).mutate(&genome, &mut rng).unwrap();
        assert_eq!(mutated.len(), 8);
        assert!(mutated.iter().all(|&x| x != 0.0));
        assert!(genome.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_gaussian_zero_sigma_is_identity() {
        let mut rng = StdRng::seed_from_u64(42);
        let genome = Genome::new(vec![1.5, -2.0]);
        let mutator = GaussianMutator::new(-3.0);
        assert_eq!(mutator.sigma(), 0.0);
        assert_eq!(mutator.mutate(&genome, &mut rng).unwrap(), genome);
    }
}
