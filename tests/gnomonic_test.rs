//! Gnomonic projection end to end: tangent plane → sky → tangent plane over a
//! wide grid, and analytic Jacobians against brute-force nudges.

use astrocov::grid::grid_xieta;
use astrocov::{check_deltas, covariance, Direction, Gnomonic, GnomonicConfig, Matrix2, Units};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TANGENT_POINT: [f64; 2] = [35.0, 35.0];

fn tan_to_equ_on_grid() -> Gnomonic {
    let grid = grid_xieta(2.1, 11, 41, false);
    Gnomonic::with_data(
        Direction::TanToEqu,
        &GnomonicConfig::default(),
        TANGENT_POINT,
        grid,
        Vec::new(),
    )
}

fn equ_to_tan_from(forward: &Gnomonic) -> Gnomonic {
    Gnomonic::with_data(
        Direction::EquToTan,
        &GnomonicConfig::default(),
        TANGENT_POINT,
        forward.transformed().points.clone(),
        Vec::new(),
    )
}

/// Project a ±2.1° grid onto the sky at (35°, 35°) and back again.
#[test]
fn test_round_trip_recovers_grid() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let to_sky = tan_to_equ_on_grid();
    let back = equ_to_tan_from(&to_sky);
    assert_eq!(back.transformed().len(), to_sky.samples().len());

    let mut max_err = 0.0_f64;
    for (orig, rec) in to_sky
        .samples()
        .points
        .iter()
        .zip(back.transformed().points.iter())
    {
        max_err = max_err.max((orig.0 - rec.0).abs()).max((orig.1 - rec.1).abs());
    }
    println!("Round-trip max error: {max_err:.3e} deg");
    assert!(max_err < 1e-9, "round trip error {max_err:.3e} deg");
}

/// Analytic Jacobians of both directions agree with nudged evaluations, and
/// the agreement tightens as the nudge shrinks.
#[test]
fn test_jacobians_match_brute_force_deltas() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();

    let to_sky = tan_to_equ_on_grid();
    let to_plane = equ_to_tan_from(&to_sky);

    for (name, check_10, check_01) in [
        (
            "tan→equ",
            check_deltas(&to_sky, 10.0, 10.0),
            check_deltas(&to_sky, 0.1, 0.1),
        ),
        (
            "equ→tan",
            check_deltas(&to_plane, 10.0, 10.0),
            check_deltas(&to_plane, 0.1, 0.1),
        ),
    ] {
        assert_eq!(check_10.len(), to_sky.samples().len());
        println!(
            "{name}: max frac {:.3e} at 10\", {:.3e} at 0.1\"",
            check_10.max_frac(),
            check_01.max_frac()
        );
        assert!(check_10.max_frac() < 1e-2);
        assert!(check_01.max_frac() < 1e-4);
        assert!(check_01.max_frac() < check_10.max_frac());
        assert!(check_10.det.iter().all(|d| *d > 0.0));
    }
}

#[test]
fn test_forward_and_inverse_jacobians_are_inverses() {
    let to_sky = tan_to_equ_on_grid();
    let to_plane = equ_to_tan_from(&to_sky);

    let products = covariance::compose(to_plane.jacobian(), to_sky.jacobian());
    assert_eq!(products.len(), to_sky.samples().len());
    for p in &products {
        assert!((p - Matrix2::identity()).abs().max() < 1e-9, "J_f·J_i = {p}");
    }
}

/// Random covariances pushed to the sky and back come out symmetric and
/// unchanged.
#[test]
fn test_random_covariances_survive_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let grid = grid_xieta(2.1, 5, 5, false);
    let covs: Vec<Matrix2> = (0..grid.len())
        .map(|_| {
            let sx = rng.random_range(0.1..2.0) / 3600.0;
            let sy = rng.random_range(0.1..2.0) / 3600.0;
            let rho = rng.random_range(-0.9..0.9);
            covariance::from_sigmas(sx, sy, rho)
        })
        .collect();

    let to_sky = Gnomonic::with_data(
        Direction::TanToEqu,
        &GnomonicConfig::default(),
        TANGENT_POINT,
        grid,
        covs.clone(),
    );
    let sky = to_sky.transformed();
    assert_eq!(sky.covariance.len(), covs.len());
    let scale = covs.iter().map(|c| c.abs().max()).fold(0.0, f64::max);
    assert!(covariance::max_asymmetry(&sky.covariance) < 1e-12 * scale);

    let to_plane = Gnomonic::with_data(
        Direction::EquToTan,
        &GnomonicConfig::default(),
        TANGENT_POINT,
        sky.points.clone(),
        sky.covariance.clone(),
    );
    for (orig, rec) in covs.iter().zip(&to_plane.transformed().covariance) {
        assert!((orig - rec).abs().max() < 1e-9 * scale);
    }
}

/// Radians in, radians out: the same sky positions as the degree setup.
#[test]
fn test_radian_units_agree_with_degrees() {
    let deg = tan_to_equ_on_grid();
    let rad_grid = grid_xieta(2.1_f64.to_radians(), 11, 41, false);
    let rad = Gnomonic::with_data(
        Direction::TanToEqu,
        &GnomonicConfig {
            units: Units::Radians,
            ..Default::default()
        },
        [TANGENT_POINT[0].to_radians(), TANGENT_POINT[1].to_radians()],
        rad_grid,
        Vec::new(),
    );
    for (d, r) in deg
        .transformed()
        .points
        .iter()
        .zip(rad.transformed().points.iter())
    {
        assert!((d.0.to_radians() - r.0).abs() < 1e-12);
        assert!((d.1.to_radians() - r.1).abs() < 1e-12);
    }
    // Jacobians are unitless ratios, identical in both conventions
    for (jd, jr) in deg.jacobian().iter().zip(rad.jacobian()) {
        assert!((jd - jr).abs().max() < 1e-9);
    }
}
