use serde::{Deserialize, Serialize};
use std::f32::consts::E;

use crate::error::NnError;

/// Logistic sigmoid: `1 / (1 + e^-x)`.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + E.powf(-x))
}

/// Sigmoid derivative expressed in terms of the sigmoid *output* `y`.
///
/// Callers pass already-activated values, not the pre-activation input.
pub fn dsigmoid(y: f32) -> f32 {
    y * (1.0 - y)
}

/// Selects the element-wise function a network applies after each layer.
///
/// Serialized as its integer code (`1` = Sigmoid, `2` = DSigmoid); the enum
/// value is the source of truth and the scalar function is resolved by
/// [`ActivationFunction::function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActivationFunction {
    #[default]
    Sigmoid,
    DSigmoid,
}

impl ActivationFunction {
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::DSigmoid => dsigmoid(x),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ActivationFunction::Sigmoid => 1,
            ActivationFunction::DSigmoid => 2,
        }
    }
}

impl From<ActivationFunction> for u8 {
    fn from(activation: ActivationFunction) -> u8 {
        activation.code()
    }
}

impl TryFrom<u8> for ActivationFunction {
    type Error = NnError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ActivationFunction::Sigmoid),
            2 => Ok(ActivationFunction::DSigmoid),
            other => Err(NnError::malformed(format!("unknown activation function code {other}"))),
        }
    }
}
