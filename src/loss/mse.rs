pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²). Zero for empty input.
    pub fn loss(predicted: &[f32], expected: &[f32]) -> f32 {
        if predicted.is_empty() {
            return 0.0;
        }
        let n = predicted.len() as f32;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>() / n
    }
}
