use super::blob::PolicyBlob;
use super::error::Error;
use super::network::Network;
use super::network::softmax;
use crate::Features;
use crate::Probability;
use rand::rngs::SmallRng;

/// position-policy head: 81 -> hidden -> 9, softmax over board slots.
#[derive(Debug, Clone)]
pub struct Policy {
    net: Network,
}

impl Policy {
    pub fn new(hidden: usize, rng: &mut SmallRng) -> Self {
        Self {
            net: Network::new(crate::ENCODING, hidden, crate::SLOTS, rng),
        }
    }
    pub fn hidden(&self) -> usize {
        self.net.hidden()
    }

    pub fn predict(&self, x: &Features) -> [Probability; crate::SLOTS] {
        Self::head(self.net.forward(x).logits)
    }
    pub fn predict_batch(&self, xs: &[Features]) -> Vec<[Probability; crate::SLOTS]> {
        self.net
            .forward_batch(xs)
            .into_iter()
            .map(|pass| Self::head(pass.logits))
            .collect()
    }
    fn head(mut logits: Vec<f64>) -> [Probability; crate::SLOTS] {
        if logits.iter().any(|v| !v.is_finite()) {
            log::warn!("non-finite policy logits, substituting uniform");
            return [1.0 / crate::SLOTS as f64; crate::SLOTS];
        }
        softmax(&mut logits);
        logits.try_into().expect("one probability per slot")
    }

    /// one minibatch of cross-entropy descent against visit targets.
    /// returns the mean loss, or the sentinel when the forward pass
    /// went non-finite (in which case the weights are untouched).
    pub fn train(&mut self, xs: &[Features], targets: &[[Probability; crate::SLOTS]], lr: f64) -> f64 {
        assert!(xs.len() == targets.len());
        assert!(!xs.is_empty());
        let passes = self.net.forward_batch(xs);
        if passes.iter().flat_map(|p| p.logits.iter()).any(|v| !v.is_finite()) {
            log::error!("non-finite policy forward pass, aborting step");
            return crate::LOSS_SENTINEL;
        }
        let mut loss = 0.0;
        let mut grads = Vec::with_capacity(xs.len());
        for (pass, pi) in passes.iter().zip(targets) {
            for logit in pass.logits.iter() {
                if logit.abs() > crate::LOGIT_LIMIT {
                    log::debug!("policy logit magnitude {:.1} exceeds {}", logit, crate::LOGIT_LIMIT);
                }
            }
            let mut p = pass.logits.clone();
            softmax(&mut p);
            loss -= pi
                .iter()
                .zip(&p)
                .map(|(t, p)| t * p.max(crate::PROBABILITY_FLOOR).ln())
                .sum::<f64>();
            grads.push(p.iter().zip(pi).map(|(p, t)| p - t).collect());
        }
        self.net.descend(xs, &passes, &grads, lr);
        loss / xs.len() as f64
    }

    pub fn save(&self, path: &std::path::Path) -> Result<(), Error> {
        let blob = PolicyBlob::from(&self.net);
        std::fs::write(path, serde_json::to_string(&blob)?)?;
        Ok(())
    }
    /// load a head, adopting the file's hidden width. input and
    /// output sizes must match this build's board encoding.
    pub fn load(path: &std::path::Path) -> Result<Self, Error> {
        let blob: PolicyBlob = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if blob.input_size != crate::ENCODING || blob.output_size != crate::SLOTS {
            return Err(Error::ShapeMismatch {
                expected: format!("{} inputs, {} outputs", crate::ENCODING, crate::SLOTS),
                found: format!("{} inputs, {} outputs", blob.input_size, blob.output_size),
            });
        }
        blob.check()?;
        Ok(Self { net: blob.into() })
    }

    pub fn weights(&self) -> Vec<f64> {
        self.net.weights()
    }
    pub fn set_weights(&mut self, flat: &[f64]) {
        self.net.set_weights(flat)
    }
}
