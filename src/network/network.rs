use rand::Rng;

use crate::activation::activation::{dsigmoid, ActivationFunction};
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

pub const DEFAULT_LEARNING_RATE: f32 = 0.1;

/// A three-layer (input → hidden → output) fully connected network.
///
/// Shapes are fixed at construction and never change:
/// - `weights_ih`: hidden × input
/// - `weights_ho`: output × hidden
/// - `bias_h`:     hidden × 1
/// - `bias_o`:     output × 1
///
/// `clone()` deep-copies all four matrices, so a clone can be moved to another
/// thread for concurrent inference.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    weights_ih: Matrix,
    weights_ho: Matrix,
    bias_h: Matrix,
    bias_o: Matrix,
    learning_rate: f32,
    activation: ActivationFunction,
}

impl NeuralNetwork {
    /// Builds a network with every weight and bias uniform in [-1, 1),
    /// learning rate 0.1 and sigmoid activation.
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize) -> NeuralNetwork {
        NeuralNetwork::with_rng(input_nodes, hidden_nodes, output_nodes, &mut rand::thread_rng())
    }

    /// Seedable variant of [`NeuralNetwork::new`].
    pub fn with_rng<R: Rng + ?Sized>(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        rng: &mut R,
    ) -> NeuralNetwork {
        let mut weights_ih = Matrix::new(hidden_nodes, input_nodes);
        let mut weights_ho = Matrix::new(output_nodes, hidden_nodes);
        let mut bias_h = Matrix::new(hidden_nodes, 1);
        let mut bias_o = Matrix::new(output_nodes, 1);
        weights_ih.randomize_with(rng);
        weights_ho.randomize_with(rng);
        bias_h.randomize_with(rng);
        bias_o.randomize_with(rng);

        NeuralNetwork {
            input_nodes,
            hidden_nodes,
            output_nodes,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate: DEFAULT_LEARNING_RATE,
            activation: ActivationFunction::Sigmoid,
        }
    }

    /// Assembles a network from existing matrices, checking every shape
    /// against the node counts.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        weights_ih: Matrix,
        weights_ho: Matrix,
        bias_h: Matrix,
        bias_o: Matrix,
        learning_rate: f32,
        activation: ActivationFunction,
    ) -> Result<NeuralNetwork> {
        check_shape("weights_ih", &weights_ih, (hidden_nodes, input_nodes))?;
        check_shape("weights_ho", &weights_ho, (output_nodes, hidden_nodes))?;
        check_shape("bias_h", &bias_h, (hidden_nodes, 1))?;
        check_shape("bias_o", &bias_o, (output_nodes, 1))?;

        Ok(NeuralNetwork {
            input_nodes,
            hidden_nodes,
            output_nodes,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            learning_rate,
            activation,
        })
    }

    pub fn input_nodes(&self) -> usize {
        self.input_nodes
    }

    pub fn hidden_nodes(&self) -> usize {
        self.hidden_nodes
    }

    pub fn output_nodes(&self) -> usize {
        self.output_nodes
    }

    pub fn weights_ih(&self) -> &Matrix {
        &self.weights_ih
    }

    pub fn weights_ho(&self) -> &Matrix {
        &self.weights_ho
    }

    pub fn bias_h(&self) -> &Matrix {
        &self.bias_h
    }

    pub fn bias_o(&self) -> &Matrix {
        &self.bias_o
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        self.activation = activation;
    }

    /// Forward pass. `input` must hold exactly `input_nodes` values; anything
    /// else is reported as a dimension mismatch.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        let (_, _, outputs) = self.feed_forward(input)?;
        Ok(outputs.to_array())
    }

    /// One step of stochastic gradient descent on a single sample.
    ///
    /// Shape errors in `input` or `target` are reported before any weight is
    /// touched.
    pub fn train(&mut self, input: &[f32], target: &[f32]) -> Result<()> {
        self.backpropagate(input, target).map(|_| ())
    }

    /// Runs [`NeuralNetwork::train`] and returns the prediction made before
    /// the update, so callers can track the loss without a second forward pass.
    pub(crate) fn backpropagate(&mut self, input: &[f32], target: &[f32]) -> Result<Vec<f32>> {
        let (inputs, hidden, outputs) = self.feed_forward(input)?;

        let targets = Matrix::from_array(target);
        let output_errors = Matrix::subtract(&targets, &outputs)?;

        // δ_o = (t - o) ⊙ o(1 - o) · lr
        let mut gradients = outputs.mapped(dsigmoid);
        gradients.hadamard(&output_errors)?;
        gradients.multiply_scalar(self.learning_rate);

        let weight_ho_deltas = Matrix::multiply(&gradients, &hidden.transpose())?;
        self.weights_ho.add_matrix(&weight_ho_deltas)?;
        self.bias_o.add_matrix(&gradients)?;

        // Hidden errors are propagated through the already-updated weights_ho.
        let hidden_errors = Matrix::multiply(&self.weights_ho.transpose(), &output_errors)?;

        let mut hidden_gradient = hidden.mapped(dsigmoid);
        hidden_gradient.hadamard(&hidden_errors)?;
        hidden_gradient.multiply_scalar(self.learning_rate);

        let weight_ih_deltas = Matrix::multiply(&hidden_gradient, &inputs.transpose())?;
        self.weights_ih.add_matrix(&weight_ih_deltas)?;
        self.bias_h.add_matrix(&hidden_gradient)?;

        Ok(outputs.to_array())
    }

    /// Returns `(inputs, hidden, outputs)` as column vectors.
    fn feed_forward(&self, input: &[f32]) -> Result<(Matrix, Matrix, Matrix)> {
        let inputs = Matrix::from_array(input);
        let hidden = self.layer(&self.weights_ih, &inputs, &self.bias_h)?;
        let outputs = self.layer(&self.weights_ho, &hidden, &self.bias_o)?;
        Ok((inputs, hidden, outputs))
    }

    fn layer(&self, weights: &Matrix, input: &Matrix, bias: &Matrix) -> Result<Matrix> {
        let mut z = Matrix::multiply(weights, input)?;
        z.add_matrix(bias)?;
        let activation = self.activation;
        z.map(|x| activation.function(x));
        Ok(z)
    }
}

fn check_shape(name: &'static str, m: &Matrix, expected: (usize, usize)) -> Result<()> {
    if m.shape() == expected {
        Ok(())
    } else {
        Err(NnError::DimensionMismatch {
            op: name,
            left: m.shape(),
            right: expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::sigmoid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scalar(x: f32) -> Matrix {
        Matrix::from_array(&[x])
    }

    /// 1-1-1 network with hand-picked weights.
    fn tiny() -> NeuralNetwork {
        NeuralNetwork::from_parts(
            1, 1, 1,
            scalar(0.5),
            scalar(-0.3),
            scalar(0.1),
            scalar(0.2),
            0.1,
            ActivationFunction::Sigmoid,
        )
        .unwrap()
    }

    #[test]
    fn new_has_expected_shapes_and_defaults() {
        let nn = NeuralNetwork::new(3, 5, 2);
        assert_eq!(nn.weights_ih().shape(), (5, 3));
        assert_eq!(nn.weights_ho().shape(), (2, 5));
        assert_eq!(nn.bias_h().shape(), (5, 1));
        assert_eq!(nn.bias_o().shape(), (2, 1));
        assert_eq!(nn.learning_rate(), 0.1);
        assert_eq!(nn.activation(), ActivationFunction::Sigmoid);
    }

    #[test]
    fn weights_are_in_unit_range() {
        let nn = NeuralNetwork::with_rng(4, 6, 3, &mut StdRng::seed_from_u64(1));
        for m in [nn.weights_ih(), nn.weights_ho(), nn.bias_h(), nn.bias_o()] {
            assert!(m.as_slice().iter().all(|&x| (-1.0..1.0).contains(&x)));
        }
    }

    #[test]
    fn seeded_construction_is_reproducible() {
        let a = NeuralNetwork::with_rng(2, 3, 1, &mut StdRng::seed_from_u64(42));
        let b = NeuralNetwork::with_rng(2, 3, 1, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn predict_matches_manual_forward_pass() {
        let nn = tiny();
        let h = sigmoid(0.5 * 1.0 + 0.1);
        let o = sigmoid(-0.3 * h + 0.2);
        let out = nn.predict(&[1.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - o).abs() < 1e-6);
    }

    #[test]
    fn predict_output_length_and_range() {
        let nn = NeuralNetwork::new(4, 8, 3);
        let out = nn.predict(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&y| y > 0.0 && y < 1.0));
    }

    #[test]
    fn predict_rejects_wrong_input_length() {
        let nn = NeuralNetwork::new(3, 2, 1);
        assert!(matches!(
            nn.predict(&[1.0, 2.0]),
            Err(NnError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn train_rejects_bad_shapes_without_mutating() {
        let mut nn = NeuralNetwork::new(2, 3, 2);
        let before = nn.clone();
        assert!(nn.train(&[1.0, 0.0], &[1.0]).is_err());
        assert!(nn.train(&[1.0], &[1.0, 0.0]).is_err());
        assert_eq!(nn, before);
    }

    #[test]
    fn single_step_matches_hand_computation() {
        let mut nn = tiny();
        nn.train(&[1.0], &[1.0]).unwrap();

        let lr = 0.1;
        let h = sigmoid(0.6);
        let o = sigmoid(-0.3 * h + 0.2);
        let e_o = 1.0 - o;
        let g_o = o * (1.0 - o) * e_o * lr;
        let w_ho = -0.3 + g_o * h;
        let b_o = 0.2 + g_o;
        let e_h = w_ho * e_o;
        let g_h = h * (1.0 - h) * e_h * lr;
        let w_ih = 0.5 + g_h;
        let b_h = 0.1 + g_h;

        let close = |a: f32, b: f32| (a - b).abs() < 1e-6;
        assert!(close(nn.weights_ho().as_slice()[0], w_ho));
        assert!(close(nn.bias_o().as_slice()[0], b_o));
        assert!(close(nn.weights_ih().as_slice()[0], w_ih));
        assert!(close(nn.bias_h().as_slice()[0], b_h));

        // Propagating through the pre-update weights_ho would give a different w_ih.
        let g_h_pre = h * (1.0 - h) * (-0.3 * e_o) * lr;
        assert!((nn.weights_ih().as_slice()[0] - (0.5 + g_h_pre)).abs() > 1e-6);
    }

    #[test]
    fn clone_is_independent() {
        let mut a = NeuralNetwork::new(2, 2, 1);
        let b = a.clone();
        a.train(&[1.0, 0.0], &[1.0]).unwrap();
        assert_ne!(a.weights_ho(), b.weights_ho());
    }

    #[test]
    fn from_parts_rejects_wrong_shapes() {
        let err = NeuralNetwork::from_parts(
            2, 3, 1,
            Matrix::new(2, 3),
            Matrix::new(1, 3),
            Matrix::new(3, 1),
            Matrix::new(1, 1),
            0.1,
            ActivationFunction::Sigmoid,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NnError::DimensionMismatch { op: "weights_ih", left: (2, 3), right: (3, 2) }
        ));
    }
}
