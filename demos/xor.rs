use nn_digits::{train_network, NeuralNetwork};

fn main() -> nn_digits::Result<()> {
    let mut network = NeuralNetwork::new(2, 4, 1);

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    network.set_learning_rate(0.5);
    let epochs = 10000;

    for epoch in 0..epochs {
        let loss = train_network(&mut network, &inputs, &expected_outputs)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }

    println!("\n{}", network.to_json_string(true)?);
    Ok(())
}
