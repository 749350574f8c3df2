use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::NeuralNetwork;

/// On-disk layout of a network; field names are the JSON keys.
#[derive(Deserialize)]
struct NetworkData {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    weights_ih: Matrix,
    weights_ho: Matrix,
    bias_h: Matrix,
    bias_o: Matrix,
    learning_rate: f32,
    activation_function: ActivationFunction,
}

impl NetworkData {
    fn into_network(self) -> Result<NeuralNetwork> {
        NeuralNetwork::from_parts(
            self.input_nodes,
            self.hidden_nodes,
            self.output_nodes,
            self.weights_ih,
            self.weights_ho,
            self.bias_h,
            self.bias_o,
            self.learning_rate,
            self.activation_function,
        )
    }
}

impl NeuralNetwork {
    pub fn to_json(&self) -> Value {
        json!({
            "input_nodes": self.input_nodes(),
            "hidden_nodes": self.hidden_nodes(),
            "output_nodes": self.output_nodes(),
            "weights_ih": self.weights_ih().to_json(),
            "weights_ho": self.weights_ho().to_json(),
            "bias_h": self.bias_h().to_json(),
            "bias_o": self.bias_o().to_json(),
            "learning_rate": self.learning_rate(),
            "activation_function": self.activation().code(),
        })
    }

    /// Rebuilds a network from [`NeuralNetwork::to_json`] output.
    ///
    /// Missing or mistyped fields, an unknown activation code, and matrices
    /// whose shapes disagree with the node counts are all reported as
    /// `MalformedSerializedData`.
    pub fn from_json(value: &Value) -> Result<NeuralNetwork> {
        let raw = NetworkData::deserialize(value).map_err(NnError::malformed)?;
        raw.into_network().map_err(NnError::malformed)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let value = self.to_json();
        let text = if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(NnError::malformed)
    }

    pub fn from_json_str(text: &str) -> Result<NeuralNetwork> {
        let value: Value = serde_json::from_str(text).map_err(NnError::malformed)?;
        NeuralNetwork::from_json(&value)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_json())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        debug!(
            "saved {}-{}-{} network to {}",
            self.input_nodes(),
            self.hidden_nodes(),
            self.output_nodes(),
            path.display()
        );
        Ok(())
    }

    /// Loads a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader).map_err(NnError::malformed)?;
        let network = NeuralNetwork::from_json(&value)?;
        debug!(
            "loaded {}-{}-{} network from {}",
            network.input_nodes(),
            network.hidden_nodes(),
            network.output_nodes(),
            path.display()
        );
        Ok(network)
    }
}

impl Serialize for NeuralNetwork {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NeuralNetwork {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        NetworkData::deserialize(deserializer)?
            .into_network()
            .map_err(de::Error::custom)
    }
}
