use handgrad::approx::approx_eq;
use handgrad::{Error, tensor, tensors::Tensor};

#[test]
fn test_tensor_creation() {
    let t = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(t.shape(), &[2, 2]);
    assert_eq!(t.rank(), 2);
    assert_eq!(t.len(), 4);
    assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_tensor_shape_mismatch_is_error() {
    let err = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, Error::Shape { op: "new", .. }));
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(t.shape(), &[2, 2]);
    assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0]);

    let cube = tensor!([[[1.0], [2.0]], [[3.0], [4.0]]]);
    assert_eq!(cube.shape(), &[2, 2, 1]);
}

#[test]
fn test_factories() {
    assert_eq!(Tensor::zeros(vec![2, 3]).sum(), 0.0);
    assert_eq!(Tensor::ones(vec![2, 3]).sum(), 6.0);
    assert_eq!(Tensor::full(vec![3], 1.5).data(), &[1.5, 1.5, 1.5]);

    let r = Tensor::random_seeded(vec![64], 9);
    assert!(r.data().iter().all(|&x| (0.0..1.0).contains(&x)));
    assert_eq!(r, Tensor::random_seeded(vec![64], 9));
}

#[test]
fn test_indexing_checks_arity_and_range() {
    let mut t = Tensor::zeros(vec![2, 3]);
    *t.at(&[1, 2]).unwrap() = 7.0;
    assert_eq!(t.get(&[1, 2]).unwrap(), 7.0);
    assert_eq!(t.data()[5], 7.0);

    assert!(matches!(t.get(&[2, 0]), Err(Error::Index { .. })));
    assert!(matches!(t.get(&[0, 3]), Err(Error::Index { .. })));
    assert!(matches!(t.get(&[0]), Err(Error::Index { .. })));
    assert!(matches!(t.at(&[0, 0, 0]), Err(Error::Index { .. })));
}

#[test]
fn test_reshape_round_trip() {
    let data: Vec<f64> = (0..24).map(f64::from).collect();
    let t = Tensor::new(vec![2, 3, 4], data).unwrap();

    for shape in [vec![24], vec![4, 6], vec![2, 12], vec![3, 2, 4], vec![1, 24, 1]] {
        let back = t.reshape(shape).unwrap().reshape(vec![2, 3, 4]).unwrap();
        assert_eq!(back, t);
    }
    assert_eq!(t.flatten().shape(), &[24]);
    assert_eq!(t.flatten().data(), t.data());
    assert!(matches!(t.reshape(vec![5, 5]), Err(Error::Shape { .. })));
}

#[test]
fn test_reshape_does_not_alias() {
    let t = Tensor::ones(vec![2, 2]);
    let mut r = t.reshape(vec![4]).unwrap();
    r.fill(3.0);
    assert_eq!(t.sum(), 4.0);
}

#[test]
fn test_elementwise_ops() {
    let a = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    let b = tensor!([[0.5, 0.5], [2.0, -1.0]]);

    assert_eq!(a.add(&b).unwrap(), tensor!([[1.5, 2.5], [5.0, 3.0]]));
    assert_eq!(a.sub(&b).unwrap(), tensor!([[0.5, 1.5], [1.0, 5.0]]));
    assert_eq!(a.hadamard(&b).unwrap(), tensor!([[0.5, 1.0], [6.0, -4.0]]));
    assert_eq!(a.scale(-2.0), tensor!([[-2.0, -4.0], [-6.0, -8.0]]));

    // no broadcasting, not even between equal element counts
    let flat = a.flatten();
    assert!(matches!(a.add(&flat), Err(Error::Shape { op: "add", .. })));
    assert!(a.sub(&flat).is_err());
    assert!(a.hadamard(&flat).is_err());
}

#[test]
fn test_matmul_values_and_shape() {
    let a = tensor!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let b = tensor!([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
    let c = a.matmul(&b).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c, tensor!([[58.0, 64.0], [139.0, 154.0]]));
}

#[test]
fn test_matmul_rejects_bad_operands() {
    let a = Tensor::zeros(vec![2, 3]);
    assert!(matches!(
        a.matmul(&Tensor::zeros(vec![2, 3])),
        Err(Error::Shape { op: "matmul", .. })
    ));
    assert!(a.matmul(&Tensor::zeros(vec![3])).is_err());
    assert!(Tensor::zeros(vec![2, 3, 1]).matmul(&a).is_err());
}

#[test]
fn test_transpose_is_an_involution() {
    let a = Tensor::random_seeded(vec![3, 5], 11);
    let t = a.transpose().unwrap();
    assert_eq!(t.shape(), &[5, 3]);
    assert_eq!(t.get(&[4, 1]).unwrap(), a.get(&[1, 4]).unwrap());
    assert_eq!(t.transpose().unwrap(), a);
    assert!(Tensor::zeros(vec![3]).transpose().is_err());
}

#[test]
fn test_matmul_transpose_identity() {
    // (AB)ᵀ = BᵀAᵀ
    let a = Tensor::random_seeded(vec![4, 3], 1);
    let b = Tensor::random_seeded(vec![3, 5], 2);

    let lhs = a.matmul(&b).unwrap().transpose().unwrap();
    let rhs = b
        .transpose()
        .unwrap()
        .matmul(&a.transpose().unwrap())
        .unwrap();
    assert_eq!(lhs.shape(), &[5, 4]);
    assert!(approx_eq(lhs.data(), rhs.data()));
}

#[test]
fn test_fill_and_strides() {
    let mut t = Tensor::zeros(vec![2, 3, 4]);
    t.fill(0.5);
    assert_eq!(t.sum(), 12.0);
    assert_eq!(t.strides(), vec![12, 4, 1]);
}
