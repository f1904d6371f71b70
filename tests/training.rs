use handgrad::prelude::*;
use handgrad::{Error, modelio};
use std::path::PathBuf;

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("handgrad-{}-{name}.bpat", std::process::id()))
}

fn xor_data() -> (Tensor, Tensor) {
    (
        tensor!([[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]),
        tensor!([[0.0], [1.0], [1.0], [0.0]]),
    )
}

fn xor_model() -> Sequential {
    Sequential::new()
        .with(Dense::seeded(2, 8, 17))
        .with(Activation::tanh())
        .with(Dense::seeded(8, 1, 18))
        .with(Activation::sigmoid())
}

#[test]
fn test_training_reduces_loss() {
    let (x, t) = xor_data();
    let mut model = xor_model();
    let mut sgd = Sgd::new(0.5);

    let mut losses = Vec::new();
    for _ in 0..300 {
        let y = model.forward(&x).unwrap();
        losses.push(MseLoss.forward(&y, &t).unwrap().data()[0]);

        let grad = MseLoss.backward(&y, &t).unwrap();
        model.zero_grad();
        model.backward(&grad).unwrap();
        sgd.apply(&mut model.parameters_mut()).unwrap();
    }

    let first = losses[0];
    let last = *losses.last().unwrap();
    assert!(last < first, "loss did not decrease: {first} -> {last}");
}

#[test]
fn test_training_is_deterministic() {
    let (x, t) = xor_data();
    let run = || {
        let mut model = xor_model();
        let mut sgd = Sgd::new(0.1);
        for _ in 0..5 {
            let y = model.forward(&x).unwrap();
            let grad = MseLoss.backward(&y, &t).unwrap();
            model.backward(&grad).unwrap();
            sgd.apply(&mut model.parameters_mut()).unwrap();
        }
        model.forward(&x).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_sgd_via_parameter_lists() {
    let mut model = Sequential::new().with(Dense::seeded(3, 2, 5));
    model.forward(&tensor!([1.0, 0.0, -1.0])).unwrap();
    model.backward(&tensor!([1.0, 1.0])).unwrap();

    let before: Vec<Tensor> = model.parameters().into_iter().cloned().collect();
    let grads: Vec<Tensor> = model.gradients().into_iter().cloned().collect();

    let mut sgd = Sgd::new(0.25);
    let mut set = model.parameters_mut();
    sgd.apply(&mut set).unwrap();
    drop(set);

    for ((p, b), g) in model.parameters().iter().zip(&before).zip(&grads) {
        let expected = b.sub(&g.scale(0.25)).unwrap();
        assert!(p.approx_eq(&expected, 1e-12));
    }
}

#[test]
fn test_bpat_save_and_load() {
    let a = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let b = Tensor::new(vec![1, 4], vec![7.0, 8.0, 9.0, 10.0]).unwrap();
    let path = temp_file("tensors");

    modelio::save_parameters(&path, &[&a, &b]).unwrap();
    let loaded = modelio::load_parameters(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, vec![a, b]);
}

#[test]
fn test_model_save_and_load() {
    let path = temp_file("model");
    let (x, _) = xor_data();

    let mut trained = xor_model();
    trained.save(&path).unwrap();
    let expected = trained.forward(&x).unwrap();

    let mut fresh = Sequential::new()
        .with(Dense::seeded(2, 8, 99))
        .with(Activation::tanh())
        .with(Dense::seeded(8, 1, 100))
        .with(Activation::sigmoid());
    assert_ne!(fresh.forward(&x).unwrap(), expected);

    fresh.load(&path).unwrap();
    assert_eq!(fresh.forward(&x).unwrap(), expected);

    // a different architecture is refused without modifying the model
    let mut other = Sequential::new().with(Dense::seeded(2, 3, 0));
    let before = other.parameters()[0].clone();
    assert!(matches!(other.load(&path), Err(Error::Format { .. })));
    assert_eq!(other.parameters()[0], &before);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_missing_file_is_io_error() {
    let path = temp_file("missing");
    assert!(matches!(
        modelio::load_parameters(&path),
        Err(Error::Io(_))
    ));
}
