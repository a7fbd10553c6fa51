//! Random variates used by the simulators.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator, or one drawn from OS entropy when `seed` is `None`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform draw from `[low, high)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    rng.gen_range(low..high)
}

/// Standard normal draw (Box–Muller).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln never sees zero.
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Log-normal draw where `mean` and `sigma` parameterise the underlying normal.
pub fn lognormal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    (mean + sigma * standard_normal(rng)).exp()
}

/// Exponential waiting time with the given rate.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    debug_assert!(rate > 0.0);
    let u = 1.0 - rng.gen::<f64>();
    -u.ln() / rate
}

/// Poisson count with mean `lambda`.
///
/// Counts exponential inter-arrival times within unit time, which stays exact
/// for the small means the mutation model produces.
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if lambda <= 0.0 {
        return 0;
    }
    let mut count = 0u64;
    let mut elapsed = exponential(rng, lambda);
    while elapsed < 1.0 {
        count += 1;
        elapsed += exponential(rng, lambda);
    }
    count
}
