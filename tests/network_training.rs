//! End-to-end behaviour of the network: learning, persistence, and sharing
//! across threads.

use std::thread;

use nn_digits::{sigmoid, dsigmoid, ActivationFunction, NeuralNetwork, NnError};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn abs_error(nn: &NeuralNetwork) -> f32 {
    (1.0 - nn.predict(&[1.0, 0.0]).unwrap()[0]).abs()
}

#[test]
fn training_reduces_error_on_a_trivial_task() {
    let mut nn = NeuralNetwork::new(2, 4, 1);
    assert_eq!(nn.learning_rate(), 0.1);

    let initial = abs_error(&nn);
    let mut checkpoints = vec![initial];
    for i in 1..=1000 {
        nn.train(&[1.0, 0.0], &[1.0]).unwrap();
        if i % 100 == 0 {
            checkpoints.push(abs_error(&nn));
        }
    }

    assert_eq!(checkpoints.len(), 11);
    assert!(checkpoints[10] < checkpoints[0], "{checkpoints:?}");
}

#[test]
fn seeded_training_is_deterministic() {
    let mut a = NeuralNetwork::with_rng(2, 3, 2, &mut StdRng::seed_from_u64(9));
    let mut b = NeuralNetwork::with_rng(2, 3, 2, &mut StdRng::seed_from_u64(9));
    for _ in 0..50 {
        a.train(&[0.3, 0.7], &[1.0, 0.0]).unwrap();
        b.train(&[0.3, 0.7], &[1.0, 0.0]).unwrap();
    }
    assert_eq!(a, b);
}

#[test]
fn scalar_functions() {
    assert_eq!(sigmoid(0.0), 0.5);
    assert_eq!(dsigmoid(0.5), 0.25);
}

#[test]
fn network_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("net.json");

    let mut nn = NeuralNetwork::new(6, 5, 4);
    nn.train(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], &[1.0, 0.0, 0.0, 1.0]).unwrap();
    nn.save_json(&path).unwrap();

    let loaded = NeuralNetwork::load_json(&path).unwrap();
    assert_eq!(loaded.input_nodes(), 6);
    assert_eq!(loaded.hidden_nodes(), 5);
    assert_eq!(loaded.output_nodes(), 4);
    assert_eq!(loaded.learning_rate(), nn.learning_rate());
    assert_eq!(loaded.activation(), ActivationFunction::Sigmoid);
    assert_eq!(loaded.weights_ih().to_array(), nn.weights_ih().to_array());
    assert_eq!(loaded.weights_ho().to_array(), nn.weights_ho().to_array());
    assert_eq!(loaded.bias_h().to_array(), nn.bias_h().to_array());
    assert_eq!(loaded.bias_o().to_array(), nn.bias_o().to_array());

    let input = [0.6, 0.5, 0.4, 0.3, 0.2, 0.1];
    assert_eq!(loaded.predict(&input).unwrap(), nn.predict(&input).unwrap());
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NeuralNetwork::load_json(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, NnError::Io(_)));
}

#[test]
fn loading_garbage_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.json");
    std::fs::write(&path, r#"{"input_nodes": 2}"#).unwrap();
    assert!(matches!(
        NeuralNetwork::load_json(&path),
        Err(NnError::MalformedSerializedData(_))
    ));
}

#[test]
fn clones_predict_independently_on_other_threads() {
    let nn = NeuralNetwork::new(3, 4, 2);
    let input = [0.2, 0.4, 0.6];
    let expected = nn.predict(&input).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let local = nn.clone();
            thread::spawn(move || local.predict(&input).unwrap())
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
