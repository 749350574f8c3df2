use crate::{
    error::{NnError, Result},
    loss::mse::MseLoss,
    network::network::NeuralNetwork,
};

/// One pass of per-sample SGD over arbitrary `(input, target)` buffers.
///
/// Returns the mean squared error of the predictions made before each update.
/// Fails with `InvalidLength` before any update when the two slices differ in
/// length.
pub fn train_network(
    network: &mut NeuralNetwork,
    inputs: &[Vec<f32>],
    expected_outputs: &[Vec<f32>],
) -> Result<f32> {
    if inputs.len() != expected_outputs.len() {
        return Err(NnError::InvalidLength {
            expected: inputs.len(),
            actual: expected_outputs.len(),
        });
    }

    let mut total_loss = 0.0;

    for (input, expected) in inputs.iter().zip(expected_outputs.iter()) {
        let output = network.backpropagate(input, expected)?;
        total_loss += MseLoss::loss(&output, expected);
    }

    Ok(total_loss / inputs.len().max(1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_mean_loss_and_updates_weights() {
        let mut nn = NeuralNetwork::new(2, 3, 1);
        let before = nn.clone();
        let loss = train_network(&mut nn, &[vec![1.0, 0.0], vec![0.0, 1.0]], &[vec![1.0], vec![0.0]]).unwrap();
        assert!(loss > 0.0 && loss < 1.0);
        assert_ne!(nn, before);
    }

    #[test]
    fn propagates_shape_errors() {
        let mut nn = NeuralNetwork::new(2, 3, 1);
        assert!(train_network(&mut nn, &[vec![1.0]], &[vec![1.0]]).is_err());
    }

    #[test]
    fn rejects_unpaired_samples() {
        let mut nn = NeuralNetwork::new(2, 3, 1);
        let before = nn.clone();
        let err = train_network(&mut nn, &[vec![1.0, 0.0], vec![0.0, 1.0]], &[vec![1.0]]).unwrap_err();
        assert!(matches!(err, NnError::InvalidLength { expected: 2, actual: 1 }));
        assert_eq!(nn, before);
    }
}
