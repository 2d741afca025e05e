//! Poisson goal distribution
//!
//! Thin wrapper over `statrs::distribution::Poisson` that treats a zero rate
//! as the point mass at zero instead of an error.

use statrs::distribution::{Discrete, DiscreteCDF, Poisson};

#[derive(Debug, Clone, Copy)]
pub struct GoalDistribution {
    lambda: f64,
    inner: Option<Poisson>,
}

impl GoalDistribution {
    /// Non-finite or non-positive rates collapse to the point mass at zero
    pub fn new(lambda: f64) -> Self {
        let lambda = if lambda.is_finite() && lambda > 0.0 {
            lambda
        } else {
            0.0
        };
        let inner = if lambda > 0.0 {
            Poisson::new(lambda).ok()
        } else {
            None
        };
        Self { lambda, inner }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// P(X = k)
    pub fn pmf(&self, k: u64) -> f64 {
        match &self.inner {
            Some(dist) => dist.pmf(k),
            None if k == 0 => 1.0,
            None => 0.0,
        }
    }

    /// P(X <= k); zero for negative `k`
    pub fn cdf(&self, k: i64) -> f64 {
        if k < 0 {
            return 0.0;
        }
        match &self.inner {
            Some(dist) => dist.cdf(k as u64).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// P(X > k)
    pub fn survival(&self, k: u64) -> f64 {
        (1.0 - self.cdf(k as i64)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_point_mass() {
        let dist = GoalDistribution::new(0.0);
        assert_eq!(dist.pmf(0), 1.0);
        assert_eq!(dist.pmf(3), 0.0);
        assert_eq!(dist.cdf(0), 1.0);
        assert_eq!(dist.cdf(-1), 0.0);
        assert_eq!(dist.survival(2), 0.0);
    }

    #[test]
    fn matches_closed_form() {
        let lambda: f64 = 1.3;
        let dist = GoalDistribution::new(lambda);
        let p0 = (-lambda).exp();
        let p1 = lambda * p0;
        assert!((dist.pmf(0) - p0).abs() < 1e-12);
        assert!((dist.pmf(1) - p1).abs() < 1e-12);
        assert!((dist.cdf(1) - (p0 + p1)).abs() < 1e-9);
    }

    #[test]
    fn invalid_rates_degrade() {
        assert_eq!(GoalDistribution::new(-2.0).lambda(), 0.0);
        assert_eq!(GoalDistribution::new(f64::NAN).pmf(0), 1.0);
    }
}
