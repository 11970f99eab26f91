use super::error::Error;
use super::network::Network;
use serde::Deserialize;
use serde::Serialize;

/// on-disk schema for a policy head. self-describing: layer sizes
/// travel with the weights, and loaders renegotiate the hidden width
/// to whatever the file says while rejecting input/output drift.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBlob {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub weights_input_hidden: Vec<Vec<f64>>,
    pub biases_hidden: Vec<f64>,
    pub weights_hidden_output: Vec<Vec<f64>>,
    pub biases_output: Vec<f64>,
}

/// on-disk schema for a value head. identical to the policy blob
/// except the single output bias is a scalar field.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueBlob {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub weights_input_hidden: Vec<Vec<f64>>,
    pub biases_hidden: Vec<f64>,
    pub weights_hidden_output: Vec<Vec<f64>>,
    pub bias_output: f64,
}

impl PolicyBlob {
    pub fn check(&self) -> Result<(), Error> {
        check_matrices(
            self.input_size,
            self.hidden_size,
            self.output_size,
            &self.weights_input_hidden,
            &self.biases_hidden,
            &self.weights_hidden_output,
            self.biases_output.len(),
        )
    }
}
impl ValueBlob {
    pub fn check(&self) -> Result<(), Error> {
        check_matrices(
            self.input_size,
            self.hidden_size,
            self.output_size,
            &self.weights_input_hidden,
            &self.biases_hidden,
            &self.weights_hidden_output,
            1,
        )
    }
}

fn check_matrices(
    input: usize,
    hidden: usize,
    output: usize,
    w1: &[Vec<f64>],
    b1: &[f64],
    w2: &[Vec<f64>],
    outputs_found: usize,
) -> Result<(), Error> {
    let consistent = w1.len() == hidden
        && w1.iter().all(|row| row.len() == input)
        && b1.len() == hidden
        && w2.len() == output
        && w2.iter().all(|row| row.len() == hidden)
        && outputs_found == output;
    if consistent {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: format!("{}x{}x{} weight matrices", input, hidden, output),
            found: format!(
                "{}x{} input rows, {} hidden biases, {}x{} output rows",
                w1.len(),
                w1.first().map(|r| r.len()).unwrap_or(0),
                b1.len(),
                w2.len(),
                w2.first().map(|r| r.len()).unwrap_or(0),
            ),
        })
    }
}

impl From<&Network> for PolicyBlob {
    fn from(net: &Network) -> Self {
        Self {
            input_size: net.input(),
            hidden_size: net.hidden(),
            output_size: net.output(),
            weights_input_hidden: net.rows_input_hidden(),
            biases_hidden: net.biases_hidden().to_vec(),
            weights_hidden_output: net.rows_hidden_output(),
            biases_output: net.biases_output().to_vec(),
        }
    }
}
impl From<PolicyBlob> for Network {
    fn from(blob: PolicyBlob) -> Self {
        Network::assemble(
            blob.input_size,
            blob.hidden_size,
            blob.output_size,
            blob.weights_input_hidden,
            blob.biases_hidden,
            blob.weights_hidden_output,
            blob.biases_output,
        )
    }
}

impl From<&Network> for ValueBlob {
    fn from(net: &Network) -> Self {
        Self {
            input_size: net.input(),
            hidden_size: net.hidden(),
            output_size: net.output(),
            weights_input_hidden: net.rows_input_hidden(),
            biases_hidden: net.biases_hidden().to_vec(),
            weights_hidden_output: net.rows_hidden_output(),
            bias_output: net.biases_output()[0],
        }
    }
}
impl From<ValueBlob> for Network {
    fn from(blob: ValueBlob) -> Self {
        Network::assemble(
            blob.input_size,
            blob.hidden_size,
            blob.output_size,
            blob.weights_input_hidden,
            blob.biases_hidden,
            blob.weights_hidden_output,
            vec![blob.bias_output],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn policy_blob_uses_the_wire_field_names() {
        let mut rng = SmallRng::seed_from_u64(1);
        let net = Network::new(crate::ENCODING, 4, crate::SLOTS, &mut rng);
        let json = serde_json::to_string(&PolicyBlob::from(&net)).unwrap();
        for field in [
            "inputSize",
            "hiddenSize",
            "outputSize",
            "weightsInputHidden",
            "biasesHidden",
            "weightsHiddenOutput",
            "biasesOutput",
        ] {
            assert!(json.contains(field));
        }
    }

    #[test]
    fn value_blob_flattens_the_output_bias() {
        let mut rng = SmallRng::seed_from_u64(2);
        let net = Network::new(crate::ENCODING, 4, 1, &mut rng);
        let json = serde_json::to_string(&ValueBlob::from(&net)).unwrap();
        assert!(json.contains("biasOutput"));
        assert!(!json.contains("biasesOutput"));
    }

    #[test]
    fn jagged_matrices_are_rejected() {
        let mut rng = SmallRng::seed_from_u64(3);
        let net = Network::new(4, 2, 3, &mut rng);
        let mut blob = PolicyBlob::from(&net);
        assert!(blob.check().is_ok());
        blob.weights_input_hidden[1].pop();
        assert!(blob.check().is_err());
    }
}
