//! Detector → tangent plane → sky chains driven by one flat parameter vector.

use astrocov::{
    check_deltas, covariance, ChainConfig, Direction, Gnomonic, GnomonicConfig, Matrix2,
    ParamError, PointSet, PolyConfig, PolyTransform, TangentPlane, XyToEqu,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// One pixel ≈ one arcsecond.
const SCALE: f64 = 1.0 / 3600.0;

fn raw_pixels() -> ChainConfig {
    ChainConfig {
        poly: PolyConfig {
            no_rescale: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Tangent point (35°, 35°), a slight rotation plus mild quadratic distortion.
fn chain_parameters() -> Vec<f64> {
    let rot = 0.3_f64.to_radians();
    vec![
        35.0,
        35.0,
        0.01,
        SCALE * rot.cos(),
        -SCALE * rot.sin(),
        1e-10,
        0.0,
        2e-10,
        -0.02,
        SCALE * rot.sin(),
        SCALE * rot.cos(),
        1e-10,
        3e-10,
        0.0,
    ]
}

fn random_pixels(rng: &mut StdRng, n: usize) -> PointSet {
    PointSet::new(
        (0..n)
            .map(|_| {
                (
                    rng.random_range(-1000.0..1000.0),
                    rng.random_range(-1000.0..1000.0),
                )
            })
            .collect(),
    )
}

fn random_covariances(rng: &mut StdRng, n: usize) -> Vec<Matrix2> {
    (0..n)
        .map(|_| {
            covariance::from_sigmas(
                rng.random_range(0.05..0.5),
                rng.random_range(0.05..0.5),
                rng.random_range(-0.8..0.8),
            )
        })
        .collect()
}

/// The chain is exactly the polynomial followed by the inverse gnomonic map.
#[test]
fn test_chain_matches_stagewise_composition() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let mut rng = StdRng::seed_from_u64(42);
    let pixels = random_pixels(&mut rng, 250);
    let covs = random_covariances(&mut rng, 250);
    let pars = chain_parameters();

    let chain = XyToEqu::with_data(&raw_pixels(), &pars, pixels.clone(), covs.clone())
        .expect("valid parameters");

    let poly = PolyTransform::with_data(
        &raw_pixels().poly,
        &pars[2..8],
        &pars[8..],
        pixels,
        covs,
    );
    let tan = Gnomonic::with_data(
        Direction::TanToEqu,
        &GnomonicConfig::default(),
        [35.0, 35.0],
        poly.transformed().points.clone(),
        poly.transformed().covariance.clone(),
    );

    assert_eq!(chain.transformed().points, tan.transformed().points);
    for (a, b) in chain
        .transformed()
        .covariance
        .iter()
        .zip(&tan.transformed().covariance)
    {
        assert!((a - b).abs().max() < 1e-20);
    }
    assert_eq!(chain.intermediate().points, poly.transformed().points);
}

#[test]
fn test_chain_jacobian_matches_brute_force_deltas() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();

    let mut rng = StdRng::seed_from_u64(123);
    let chain = XyToEqu::with_data(
        &raw_pixels(),
        &chain_parameters(),
        random_pixels(&mut rng, 200),
        Vec::new(),
    )
    .expect("valid parameters");

    let coarse = check_deltas(&chain, 10.0, 10.0);
    let fine = check_deltas(&chain, 0.1, 0.1);
    println!(
        "XyToEqu: max frac {:.3e} at 10 px, {:.3e} at 0.1 px",
        coarse.max_frac(),
        fine.max_frac()
    );
    assert_eq!(coarse.len(), 200);
    assert!(coarse.max_frac() < 1e-2);
    assert!(fine.max_frac() < 1e-4);
}

/// Sky covariances stay symmetric and shrink to the pixel-scale squared.
#[test]
fn test_sky_covariances_symmetric() {
    let mut rng = StdRng::seed_from_u64(9);
    let n = 500;
    let covs = random_covariances(&mut rng, n);
    let chain = XyToEqu::with_data(
        &raw_pixels(),
        &chain_parameters(),
        random_pixels(&mut rng, n),
        covs.clone(),
    )
    .expect("valid parameters");

    let sky = &chain.transformed().covariance;
    assert_eq!(sky.len(), n);
    let scale = sky.iter().map(|c| c.abs().max()).fold(0.0, f64::max);
    assert!(covariance::max_asymmetry(sky) <= 1e-12 * scale);

    // Dec variance is bounded by the total pixel variance in degrees²
    for (pix, s) in covs.iter().zip(sky) {
        let ratio = s[(1, 1)] / (pix.trace() * SCALE * SCALE);
        assert!(ratio > 0.0 && ratio < 1.01, "ratio {ratio}");
    }
}

#[test]
fn test_invalid_update_leaves_chain_unchanged() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut chain = XyToEqu::with_data(
        &ChainConfig {
            verbose: true,
            ..raw_pixels()
        },
        &chain_parameters(),
        random_pixels(&mut rng, 10),
        Vec::new(),
    )
    .expect("valid parameters");
    let before = chain.transformed().points.clone();

    assert_eq!(chain.update_transform(&[1.0]), Err(ParamError::TooShort(1)));
    assert_eq!(
        chain.update_transform(&[35.0, 35.0, 1.0, 2.0, 3.0]),
        Err(ParamError::OddCount(3))
    );
    assert_eq!(
        chain.update_transform(&[35.0, 35.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
        Err(ParamError::NotPolynomial(4))
    );
    assert_eq!(chain.transformed().points, before);
    assert_eq!(chain.params().tangent_point, [35.0, 35.0]);

    // empty update is a no-op
    assert!(chain.update_transform(&[]).is_ok());
    assert_eq!(chain.transformed().points, before);

    // moving the tangent point moves every output by about the same amount
    let mut moved = chain_parameters();
    moved[0] = 36.0;
    chain.update_transform(&moved).expect("valid parameters");
    for (a, b) in chain.transformed().points.iter().zip(before.iter()) {
        assert!((a.0 - b.0 - 1.0).abs() < 0.01);
    }
}

/// Catalog targets generated through the chain land on the projected
/// detector positions, with noise inside the combined covariance.
#[test]
fn test_tangent_plane_residuals() {
    let mut rng = StdRng::seed_from_u64(77);
    let n = 300;
    let sigma = 0.2;
    let noise = Normal::new(0.0, sigma).expect("valid sigma");
    let pars = chain_parameters();
    let truth = random_pixels(&mut rng, n);

    let chain = XyToEqu::with_data(&raw_pixels(), &pars, truth.clone(), Vec::new())
        .expect("valid parameters");
    let radec = chain.transformed().points.clone();

    let measured = PointSet::new(
        truth
            .iter()
            .map(|&(x, y)| (x + noise.sample(&mut rng), y + noise.sample(&mut rng)))
            .collect(),
    );
    let cov_xy = vec![covariance::from_sigmas(sigma, sigma, 0.0); n];
    let cov_radec = vec![covariance::from_sigmas(1e-3 * SCALE, 1e-3 * SCALE, 0.0); n];

    let plane = TangentPlane::with_data(&raw_pixels(), &pars, measured, cov_xy, radec, cov_radec)
        .expect("valid parameters");
    let residuals = plane.residuals();
    let combined = plane.residual_covariance();
    assert_eq!(residuals.len(), n);
    assert_eq!(combined.len(), n);

    // normalized residuals: mean χ² per point should be near 2
    let chi2: f64 = residuals
        .iter()
        .zip(&combined)
        .map(|(&(dx, dy), c)| {
            let w = c.try_inverse().expect("invertible");
            let r = nalgebra::Vector2::new(dx, dy);
            (r.transpose() * w * r)[(0, 0)]
        })
        .sum::<f64>()
        / n as f64;
    println!("Mean chi2 per point: {chi2:.3}");
    assert!(chi2 > 1.5 && chi2 < 2.5, "chi2 {chi2}");
}
