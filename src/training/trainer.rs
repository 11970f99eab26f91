use super::example::Example;
use crate::nn::Nets;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// drives minibatch descent over a harvest of self-play examples.
/// the list is shuffled once, then every epoch walks it in
/// fixed-size minibatches, feeding the same inputs to both heads
/// with their respective targets.
pub struct Trainer {
    pub epochs: usize,
    pub batch: usize,
    pub rate: f64,
}

impl Trainer {
    pub fn new(epochs: usize, batch: usize, rate: f64) -> Self {
        assert!(batch > 0, "minibatches hold at least one example");
        Self { epochs, batch, rate }
    }

    /// returns the per-epoch (policy, value) mean losses.
    pub fn fit(&self, nets: &Nets, examples: &mut [Example], rng: &mut SmallRng) -> Vec<(f64, f64)> {
        if examples.is_empty() {
            log::warn!("nothing to fit");
            return Vec::new();
        }
        examples.shuffle(rng);
        let progress = crate::progress(self.epochs);
        let mut history = Vec::with_capacity(self.epochs);
        for epoch in 1..=self.epochs {
            let mut policy_loss = 0.0;
            let mut value_loss = 0.0;
            let mut batches = 0;
            for chunk in examples.chunks(self.batch) {
                let xs: Vec<crate::Features> = chunk.iter().map(|e| e.features).collect();
                let pis: Vec<[f64; crate::SLOTS]> = chunk.iter().map(|e| e.pi).collect();
                let zs: Vec<f64> = chunk.iter().map(|e| e.z).collect();
                policy_loss += nets.train_policy(&xs, &pis, self.rate);
                value_loss += nets.train_value(&xs, &zs, self.rate);
                batches += 1;
            }
            let entry = (policy_loss / batches as f64, value_loss / batches as f64);
            log::info!("epoch {:>3} policy {:.4} value {:.4}", epoch, entry.0, entry.1);
            history.push(entry);
            progress.inc(1);
        }
        progress.finish();
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::SelfPlay;
    use rand::SeedableRng;

    #[test]
    fn fitting_returns_one_loss_pair_per_epoch() {
        let mut rng = SmallRng::seed_from_u64(80);
        let nets = Nets::new(8, &mut rng);
        let mut examples = SelfPlay::new(2, 10, 1.0, 81).run(&nets);
        let history = Trainer::new(3, 8, 0.01).fit(&nets, &mut examples, &mut rng);
        assert!(history.len() == 3);
        assert!(history.iter().all(|(p, v)| p.is_finite() && v.is_finite()));
    }

    #[test]
    fn an_empty_harvest_is_a_no_op() {
        let mut rng = SmallRng::seed_from_u64(82);
        let nets = Nets::new(8, &mut rng);
        let history = Trainer::new(3, 8, 0.01).fit(&nets, &mut [], &mut rng);
        assert!(history.is_empty());
    }
}
