use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand::SeedableRng;

use crate::acuity::Acuity;

/// The single seeded pseudo-random source for every stochastic draw in a run.
/// Deterministic replay requires the same seed and the same event-insertion
/// order for equal timestamps -- see the scheduler's tiebreaking sequence.
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Inclusive integer draw, matching Python's `random.randint(lo, hi)`.
    pub fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        self.inner.gen_range(lo..=hi)
    }

    pub fn uniform_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.inner.gen::<f64>() < p
    }

    /// Exponential inter-arrival draw with rate `lambda` (events per minute).
    /// `rand_distr::Exp` is not in the dependency tree here, so this inverts
    /// the CDF directly: `-ln(1 - U) / lambda`.
    pub fn exponential(&mut self, lambda: f64) -> f64 {
        let u: f64 = self.inner.gen();
        -(1.0 - u).ln() / lambda
    }

    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.inner.gen_range(0..items.len());
        &items[idx]
    }

    /// Weighted acuity draw over `PATIENT_ACUITY`.
    pub fn weighted_acuity(&mut self, weights: &[(Acuity, f64)]) -> Acuity {
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let mut roll = self.uniform_f64() * total;
        for (acuity, weight) in weights {
            if roll < *weight {
                return *acuity;
            }
            roll -= weight;
        }
        weights.last().map(|(a, _)| *a).unwrap_or(Acuity::NonUrgent)
    }
}
