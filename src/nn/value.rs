use super::blob::ValueBlob;
use super::error::Error;
use super::network::Network;
use super::network::sigmoid;
use crate::Features;
use rand::rngs::SmallRng;

/// value head: 81 -> hidden -> 1, sigmoid. outputs live in [0, 1]
/// from the mover's perspective; search remaps them to [-1, 1] when
/// backing up leaves.
#[derive(Debug, Clone)]
pub struct Value {
    net: Network,
}

impl Value {
    pub fn new(hidden: usize, rng: &mut SmallRng) -> Self {
        Self {
            net: Network::new(crate::ENCODING, hidden, 1, rng),
        }
    }
    pub fn hidden(&self) -> usize {
        self.net.hidden()
    }

    pub fn predict(&self, x: &Features) -> f64 {
        Self::head(self.net.forward(x).logits[0])
    }
    pub fn predict_batch(&self, xs: &[Features]) -> Vec<f64> {
        self.net
            .forward_batch(xs)
            .into_iter()
            .map(|pass| Self::head(pass.logits[0]))
            .collect()
    }
    fn head(logit: f64) -> f64 {
        if !logit.is_finite() {
            log::warn!("non-finite value logit, substituting a draw");
            return 0.5;
        }
        sigmoid(logit)
    }

    /// one minibatch of mse descent against game outcomes in [0, 1].
    /// returns the mean loss, or the sentinel when the forward pass
    /// went non-finite (in which case the weights are untouched).
    pub fn train(&mut self, xs: &[Features], targets: &[f64], lr: f64) -> f64 {
        assert!(xs.len() == targets.len());
        assert!(!xs.is_empty());
        let passes = self.net.forward_batch(xs);
        if passes.iter().any(|p| !p.logits[0].is_finite()) {
            log::error!("non-finite value forward pass, aborting step");
            return crate::LOSS_SENTINEL;
        }
        let mut loss = 0.0;
        let mut grads = Vec::with_capacity(xs.len());
        for (pass, z) in passes.iter().zip(targets) {
            let logit = pass.logits[0];
            if logit.abs() > crate::LOGIT_LIMIT {
                log::debug!("value logit magnitude {:.1} exceeds {}", logit, crate::LOGIT_LIMIT);
            }
            let y = sigmoid(logit);
            loss += (y - z) * (y - z);
            grads.push(vec![2.0 * (y - z) * y * (1.0 - y)]);
        }
        self.net.descend(xs, &passes, &grads, lr);
        loss / xs.len() as f64
    }

    pub fn save(&self, path: &std::path::Path) -> Result<(), Error> {
        let blob = ValueBlob::from(&self.net);
        std::fs::write(path, serde_json::to_string(&blob)?)?;
        Ok(())
    }
    /// load a head, adopting the file's hidden width. input and
    /// output sizes must match this build's board encoding.
    pub fn load(path: &std::path::Path) -> Result<Self, Error> {
        let blob: ValueBlob = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if blob.input_size != crate::ENCODING || blob.output_size != 1 {
            return Err(Error::ShapeMismatch {
                expected: format!("{} inputs, 1 output", crate::ENCODING),
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
