// tests/generators_test.rs
//! Equidistribution and integration-accuracy tests for the low-discrepancy
//! generators and the randomization operators.

use ndarray::Axis;
use qmc_options::generators::{
    good_lattice_points, good_lattice_points_nd, halton, random_permutation, random_shift,
    van_der_corput,
};
use qmc_options::periodization::{compare_periodizations, Periodization};
use qmc_options::rng::seed_rng_from_u64;

#[test]
fn test_van_der_corput_equidistributes_base2() {
    // Count points per dyadic bin; a (0,1)-sequence fills each of the 8
    // eighths exactly n/8 times for n a multiple of 8.
    let n = 1024u64;
    let mut bins = [0usize; 8];
    for i in 1..=n {
        let v = van_der_corput(2, i);
        bins[(v * 8.0) as usize] += 1;
    }
    for (b, &count) in bins.iter().enumerate() {
        assert_eq!(count, 128, "bin {} has {} points", b, count);
    }
}

#[test]
fn test_halton_coordinate_means() {
    let points = halton(&[2, 3, 5], 2000);

    for j in 0..3 {
        let column = points.index_axis(Axis(1), j);
        let mean = column.sum() / column.len() as f64;
        assert!(
            (mean - 0.5).abs() < 0.01,
            "dimension {} mean {} too far from 0.5",
            j,
            mean
        );
    }
}

#[test]
fn test_fibonacci_lattice_integrates_smooth_product() {
    // ∫∫ xy over the unit square = 1/4; fib(16) = 987 points
    let points = good_lattice_points(16).unwrap();

    let mut acc = 0.0;
    for row in points.axis_iter(Axis(0)) {
        acc += row[0] * row[1];
    }
    let estimate = acc / points.nrows() as f64;

    println!("lattice estimate of 1/4: {}", estimate);
    assert!((estimate - 0.25).abs() < 1e-3);
}

#[test]
fn test_glp_nd_default_vector_in_unit_cube() {
    let points = good_lattice_points_nd(610, 4, None).unwrap();
    assert_eq!(points.dim(), (610, 4));
    for &p in points.iter() {
        assert!((0.0..1.0).contains(&p));
    }
}

#[test]
fn test_random_shift_reproducible_under_seed() {
    let points = good_lattice_points(12).unwrap();

    let mut rng1 = seed_rng_from_u64(7);
    let mut rng2 = seed_rng_from_u64(7);
    let shifted1 = random_shift(points.view(), &mut rng1);
    let shifted2 = random_shift(points.view(), &mut rng2);

    assert_eq!(shifted1, shifted2);
}

#[test]
fn test_random_permutation_preserves_marginals() {
    let points = halton(&[2, 3], 256);
    let mut rng = seed_rng_from_u64(11);
    let permuted = random_permutation(points.view(), &mut rng);

    for j in 0..2 {
        let mut before: Vec<f64> = points.index_axis(Axis(1), j).to_vec();
        let mut after: Vec<f64> = permuted.index_axis(Axis(1), j).to_vec();
        before.sort_by(|a, b| a.partial_cmp(b).unwrap());
        after.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(before, after, "column {} marginal changed", j);
    }
}

#[test]
fn test_periodization_improves_nonperiodic_integrand() {
    // f(x, y) = e^(x + y): smooth but non-periodic, exact integral (e - 1)²
    let exact = (std::f64::consts::E - 1.0) * (std::f64::consts::E - 1.0);
    let points = good_lattice_points(16).unwrap();

    let results = compare_periodizations(
        |x, y| (x + y).exp(),
        points.view(),
        &[Periodization::Identity, Periodization::Sin2],
    );

    let err_identity = (results[0].1 - exact).abs();
    let err_sin2 = (results[1].1 - exact).abs();
    println!(
        "identity error {:e}, sin-2 error {:e}",
        err_identity, err_sin2
    );

    assert!(err_sin2 < err_identity);
    assert!(err_sin2 < 1e-4);
}
