use rand::Rng;
use rand::rngs::SmallRng;

/// single-hidden-layer perceptron with relu activation, shared by
/// both heads. weights live in flat row-major buffers so the batched
/// forward pass runs one contiguous matmul per layer and the whole
/// parameter vector can be viewed flat by non-gradient optimizers.
#[derive(Debug, Clone)]
pub struct Network {
    input: usize,
    hidden: usize,
    output: usize,
    w1: Vec<f64>, // hidden x input
    b1: Vec<f64>,
    w2: Vec<f64>, // output x hidden
    b2: Vec<f64>,
}

/// one forward pass: post-relu hidden activations and raw output
/// logits, both kept around for backprop.
#[derive(Debug, Clone)]
pub struct Pass {
    pub hidden: Vec<f64>,
    pub logits: Vec<f64>,
}

impl Network {
    /// xavier-uniform weights, zero biases.
    pub fn new(input: usize, hidden: usize, output: usize, rng: &mut SmallRng) -> Self {
        Self {
            input,
            hidden,
            output,
            w1: Self::xavier(hidden * input, input, hidden, rng),
            b1: vec![0.0; hidden],
            w2: Self::xavier(output * hidden, hidden, output, rng),
            b2: vec![0.0; output],
        }
    }
    fn xavier(n: usize, fan_in: usize, fan_out: usize, rng: &mut SmallRng) -> Vec<f64> {
        let bound = (6.0 / (fan_in + fan_out) as f64).sqrt();
        (0..n).map(|_| rng.random_range(-bound..bound)).collect()
    }

    pub fn input(&self) -> usize {
        self.input
    }
    pub fn hidden(&self) -> usize {
        self.hidden
    }
    pub fn output(&self) -> usize {
        self.output
    }

    pub fn forward(&self, x: &[f64]) -> Pass {
        debug_assert!(x.len() == self.input);
        let mut hidden = self.b1.clone();
        for h in 0..self.hidden {
            let row = &self.w1[h * self.input..(h + 1) * self.input];
            let sum: f64 = row.iter().zip(x).map(|(w, x)| w * x).sum();
            hidden[h] = (hidden[h] + sum).max(0.0);
        }
        let mut logits = self.b2.clone();
        for o in 0..self.output {
            let row = &self.w2[o * self.hidden..(o + 1) * self.hidden];
            logits[o] += row.iter().zip(&hidden).map(|(w, h)| w * h).sum::<f64>();
        }
        Pass { hidden, logits }
    }

    /// batched forward. results come back in input order; callers
    /// build on that to pair outputs with queued states.
    pub fn forward_batch(&self, xs: &[crate::Features]) -> Vec<Pass> {
        xs.iter().map(|x| self.forward(x)).collect()
    }

    /// one sgd step from head-supplied output gradients (d loss / d
    /// logit, one vector per example). gradients are averaged over
    /// the batch, clipped per weight, then the lr-scaled update is
    /// clipped again before application.
    pub(crate) fn descend(&mut self, xs: &[crate::Features], passes: &[Pass], grads: &[Vec<f64>], lr: f64) {
        let n = xs.len() as f64;
        let mut gw1 = vec![0.0; self.w1.len()];
        let mut gb1 = vec![0.0; self.b1.len()];
        let mut gw2 = vec![0.0; self.w2.len()];
        let mut gb2 = vec![0.0; self.b2.len()];
        for ((x, pass), grad) in xs.iter().zip(passes).zip(grads) {
            for o in 0..self.output {
                gb2[o] += grad[o];
                for h in 0..self.hidden {
                    gw2[o * self.hidden + h] += grad[o] * pass.hidden[h];
                }
            }
            for h in 0..self.hidden {
                if pass.hidden[h] <= 0.0 {
                    continue; // relu gate
                }
                let gh: f64 = (0..self.output)
                    .map(|o| grad[o] * self.w2[o * self.hidden + h])
                    .sum();
                gb1[h] += gh;
                for i in 0..self.input {
                    gw1[h * self.input + i] += gh * x[i];
                }
            }
        }
        Self::nudge(&mut self.w1, &gw1, n, lr);
        Self::nudge(&mut self.b1, &gb1, n, lr);
        Self::nudge(&mut self.w2, &gw2, n, lr);
        Self::nudge(&mut self.b2, &gb2, n, lr);
    }
    fn nudge(weights: &mut [f64], grads: &[f64], n: f64, lr: f64) {
        for (w, g) in weights.iter_mut().zip(grads) {
            let g = (g / n).clamp(-crate::GRADIENT_CLIP, crate::GRADIENT_CLIP);
            *w -= (lr * g).clamp(-crate::UPDATE_CLIP, crate::UPDATE_CLIP);
        }
    }

    /// flat parameter view: w1 | b1 | w2 | b2.
    pub fn weights(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.w1.len() + self.b1.len() + self.w2.len() + self.b2.len());
        flat.extend(&self.w1);
        flat.extend(&self.b1);
        flat.extend(&self.w2);
        flat.extend(&self.b2);
        flat
    }
    pub fn set_weights(&mut self, flat: &[f64]) {
        assert!(flat.len() == self.w1.len() + self.b1.len() + self.w2.len() + self.b2.len());
        let (w1, rest) = flat.split_at(self.w1.len());
        let (b1, rest) = rest.split_at(self.b1.len());
        let (w2, b2) = rest.split_at(self.w2.len());
        self.w1.copy_from_slice(w1);
        self.b1.copy_from_slice(b1);
        self.w2.copy_from_slice(w2);
        self.b2.copy_from_slice(b2);
    }

    pub(crate) fn rows_input_hidden(&self) -> Vec<Vec<f64>> {
        self.w1.chunks(self.input).map(|r| r.to_vec()).collect()
    }
    pub(crate) fn rows_hidden_output(&self) -> Vec<Vec<f64>> {
        self.w2.chunks(self.hidden).map(|r| r.to_vec()).collect()
    }
    pub(crate) fn biases_hidden(&self) -> &[f64] {
        &self.b1
    }
    pub(crate) fn biases_output(&self) -> &[f64] {
        &self.b2
    }
    pub(crate) fn assemble(
        input: usize,
        hidden: usize,
        output: usize,
        w1: Vec<Vec<f64>>,
        b1: Vec<f64>,
        w2: Vec<Vec<f64>>,
        b2: Vec<f64>,
    ) -> Self {
        Self {
            input,
            hidden,
            output,
            w1: w1.into_iter().flatten().collect(),
            b1,
            w2: w2.into_iter().flatten().collect(),
            b2,
        }
    }
}

/// numerically stabilized softmax, in place.
pub fn softmax(xs: &mut [f64]) {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for x in xs.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    for x in xs.iter_mut() {
        *x /= sum;
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn softmax_is_a_distribution() {
        let mut xs = vec![1.0, 2.0, 3.0, -1.0, 700.0];
        softmax(&mut xs);
        assert!((xs.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(xs.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn sigmoid_stays_in_unit_interval() {
        for x in [-30.0, -1.0, 0.0, 1.0, 30.0] {
            let y = sigmoid(x);
            assert!((0.0..=1.0).contains(&y));
        }
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn weight_views_round_trip() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut net = Network::new(4, 8, 2, &mut rng);
        let flat = net.weights();
        assert!(flat.len() == 4 * 8 + 8 + 8 * 2 + 2);
        let mut other = Network::new(4, 8, 2, &mut rng);
        other.set_weights(&flat);
        assert!(other.weights() == flat);
    }

    #[test]
    fn xavier_respects_the_bound() {
        let mut rng = SmallRng::seed_from_u64(4);
        let net = Network::new(81, 16, 9, &mut rng);
        let bound = (6.0 / (81 + 16) as f64).sqrt();
        assert!(net.w1.iter().all(|w| w.abs() <= bound));
        assert!(net.b1.iter().all(|b| *b == 0.0));
        assert!(net.b2.iter().all(|b| *b == 0.0));
    }
}
