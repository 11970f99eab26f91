use super::error::Error;
use super::policy::Policy;
use super::value::Value;
use crate::Features;
use crate::Probability;
use rand::rngs::SmallRng;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// the seam between tree search and whatever produces priors and
/// leaf values. search depends only on this capability, so the
/// backing can be the in-process heads below or a remote transport.
///
/// batched calls must return results in request order. singles may
/// run concurrently with one another; none may overlap training.
pub trait Oracle: Send + Sync {
    fn priors(&self, x: &Features) -> Result<[Probability; crate::SLOTS], Error>;
    fn priors_batch(&self, xs: &[Features]) -> Result<Vec<[Probability; crate::SLOTS]>, Error>;
    fn leaf(&self, x: &Features) -> Result<f64, Error>;
    fn leaf_batch(&self, xs: &[Features]) -> Result<Vec<f64>, Error>;
    fn stats(&self) -> Stats;
}

/// running totals for one oracle instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub singles: u64,
    pub batches: u64,
    pub states: u64,
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} singles, {} batches, {} states",
            self.singles, self.batches, self.states
        )
    }
}

/// the in-process oracle: both heads behind rw-locks. inference
/// shares read access; training takes the write side, so no forward
/// pass ever overlaps a weight update.
pub struct Nets {
    policy: RwLock<Policy>,
    value: RwLock<Value>,
    singles: AtomicU64,
    batches: AtomicU64,
    states: AtomicU64,
}

impl Nets {
    pub fn new(hidden: usize, rng: &mut SmallRng) -> Self {
        Self::from_parts(Policy::new(hidden, rng), Value::new(hidden, rng))
    }
    pub fn from_parts(policy: Policy, value: Value) -> Self {
        Self {
            policy: RwLock::new(policy),
            value: RwLock::new(value),
            singles: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            states: AtomicU64::new(0),
        }
    }
    pub fn load(policy: &std::path::Path, value: &std::path::Path) -> Result<Self, Error> {
        Ok(Self::from_parts(Policy::load(policy)?, Value::load(value)?))
    }
    pub fn save(&self, policy: &std::path::Path, value: &std::path::Path) -> Result<(), Error> {
        self.read_policy().save(policy)?;
        self.read_value().save(value)?;
        Ok(())
    }
    pub fn hidden(&self) -> usize {
        self.read_policy().hidden()
    }

    pub fn train_policy(&self, xs: &[Features], targets: &[[Probability; crate::SLOTS]], lr: f64) -> f64 {
        self.policy.write().expect("policy lock").train(xs, targets, lr)
    }
    pub fn train_value(&self, xs: &[Features], targets: &[f64], lr: f64) -> f64 {
        self.value.write().expect("value lock").train(xs, targets, lr)
    }

    pub fn snapshot_policy(&self) -> Policy {
        self.read_policy().clone()
    }
    pub fn snapshot_value(&self) -> Value {
        self.read_value().clone()
    }

    fn read_policy(&self) -> std::sync::RwLockReadGuard<'_, Policy> {
        self.policy.read().expect("policy lock")
    }
    fn read_value(&self) -> std::sync::RwLockReadGuard<'_, Value> {
        self.value.read().expect("value lock")
    }
}

impl Oracle for Nets {
    fn priors(&self, x: &Features) -> Result<[Probability; crate::SLOTS], Error> {
        self.singles.fetch_add(1, Ordering::Relaxed);
        self.states.fetch_add(1, Ordering::Relaxed);
        Ok(self.read_policy().predict(x))
    }
    fn priors_batch(&self, xs: &[Features]) -> Result<Vec<[Probability; crate::SLOTS]>, Error> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.states.fetch_add(xs.len() as u64, Ordering::Relaxed);
        Ok(self.read_policy().predict_batch(xs))
    }
    fn leaf(&self, x: &Features) -> Result<f64, Error> {
        self.singles.fetch_add(1, Ordering::Relaxed);
        self.states.fetch_add(1, Ordering::Relaxed);
        Ok(self.read_value().predict(x))
    }
    fn leaf_batch(&self, xs: &[Features]) -> Result<Vec<f64>, Error> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.states.fetch_add(xs.len() as u64, Ordering::Relaxed);
        Ok(self.read_value().predict_batch(xs))
    }
    fn stats(&self) -> Stats {
        Stats {
            singles: self.singles.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            states: self.states.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn stats_count_singles_batches_and_states() {
        let mut rng = SmallRng::seed_from_u64(30);
        let nets = Nets::new(8, &mut rng);
        let x = crate::game::Game::root(&mut rng).features();
        nets.priors(&x).unwrap();
        nets.leaf(&x).unwrap();
        nets.priors_batch(&[x, x, x]).unwrap();
        let stats = nets.stats();
        assert!(stats.singles == 2);
        assert!(stats.batches == 1);
        assert!(stats.states == 5);
    }

    #[test]
    fn training_through_the_lock_moves_the_weights() {
        let mut rng = SmallRng::seed_from_u64(31);
        let nets = Nets::new(8, &mut rng);
        let x = crate::game::Game::root(&mut rng).features();
        let before = nets.leaf(&x).unwrap();
        for _ in 0..50 {
            nets.train_value(&[x], &[1.0], 0.05);
        }
        let after = nets.leaf(&x).unwrap();
        assert!(after > before);
    }
}
