// crates/chronos-dynamics/src/ou.rs
//
// Ornstein-Uhlenbeck building blocks shared by the jump-diffusion update,
// trajectory generation, and stochastic decay.

/// Lower clamp of the mean-reversion speed.
pub const THETA_MIN: f64 = 1e-4;
/// Upper clamp of the mean-reversion speed.
pub const THETA_MAX: f64 = 10.0;

/// Stationary noise scale sigma / sqrt(2·theta), with the root floored at 1e-8.
pub fn noise_floor(sigma: f64, theta: f64) -> f64 {
    sigma / (2.0 * theta).max(0.0).sqrt().max(1e-8)
}

/// Surprise magnitude relative to the noise floor; 0.0 for a zero floor.
pub fn surprise_ratio(epsilon: f64, sigma: f64, theta: f64) -> f64 {
    let floor = noise_floor(sigma, theta);
    if floor > 0.0 {
        epsilon.abs() / floor
    } else {
        0.0
    }
}

/// Bounded gradient step on theta toward the observed surprise.
pub fn adapt_theta(theta: f64, epsilon: f64, alpha: f64, dt: f64) -> f64 {
    (theta + alpha * (epsilon - theta * dt)).clamp(THETA_MIN, THETA_MAX)
}

/// One Euler-Maruyama increment of dX = theta·(mu - X)dt + sigma·dW, given a
/// standard normal draw. Not clipped.
pub fn euler_maruyama(x: f64, mu: f64, theta: f64, sigma: f64, dt: f64, normal: f64) -> f64 {
    x + theta * (mu - x) * dt + sigma * normal * dt.max(0.0).sqrt()
}
