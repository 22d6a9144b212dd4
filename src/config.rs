use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerMethod {
    Hmc,
    Nuts,
}

impl TryFrom<&str> for SamplerMethod {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "hmc" => Ok(Self::Hmc),
            "nuts" => Ok(Self::Nuts),
            _ => Err(format!("unknown method '{s}', expected 'hmc' or 'nuts'")),
        }
    }
}

/// Couplings of the Heisenberg Hamiltonian. A coupling of exactly zero
/// disables its term entirely rather than multiplying through by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianOptions {
    /// Nearest-neighbor exchange coupling.
    pub j: f64,
    /// External field along z.
    pub h: f64,
}

fn validate_sampler_config(cfg: &SamplerConfig) -> Result<(), ValidationError> {
    if cfg.method == SamplerMethod::Hmc && cfg.leapfrog_steps < 1 {
        return Err(ValidationError::new("leapfrog_steps must be >= 1"));
    }
    if cfg.max_tree_depth < 1 {
        return Err(ValidationError::new("max_tree_depth must be >= 1"));
    }
    if !(cfg.divergence_threshold.is_finite() && cfg.divergence_threshold > 0.0) {
        return Err(ValidationError::new(
            "divergence_threshold must be finite and > 0",
        ));
    }
    Ok(())
}

/// Sampler settings not carried by the run file (the step size lives there).
#[derive(Debug, Clone, Copy, Validate)]
#[validate(schema(function = "validate_sampler_config"))]
pub struct SamplerConfig {
    pub method: SamplerMethod,
    /// Trajectory length for fixed-length HMC; ignored by NUTS.
    pub leapfrog_steps: usize,
    pub max_tree_depth: usize,
    pub divergence_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            method: SamplerMethod::Nuts,
            leapfrog_steps: 10,
            max_tree_depth: 15,
            divergence_threshold: 1000.0,
        }
    }
}

fn validate_run_config(cfg: &RunConfig) -> Result<(), ValidationError> {
    if cfg.n_samples < 1 {
        return Err(ValidationError::new("n_samples must be >= 1"));
    }
    if cfg.dims.is_empty() || cfg.dims.len() > 3 {
        return Err(ValidationError::new("dims must have 1 to 3 entries"));
    }
    if cfg.dims.iter().any(|&d| d < 1) {
        return Err(ValidationError::new("every lattice dimension must be >= 1"));
    }
    if !(cfg.beta.is_finite() && cfg.beta > 0.0) {
        return Err(ValidationError::new("beta must be finite and > 0"));
    }
    if !(cfg.eps.is_finite() && cfg.eps > 0.0) {
        return Err(ValidationError::new("eps must be finite and > 0"));
    }
    Ok(())
}

/// One simulation run, as read from a run file.
///
/// The file is eight whitespace-separated numbers in fixed order:
/// `n_samples d0 d1 d2 H J beta eps`. Trailing lattice dimensions equal
/// to 1 are dropped so `8 8 1` runs as a true 2D lattice (at least one
/// dimension is always kept).
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_run_config"))]
pub struct RunConfig {
    pub n_samples: usize,
    pub dims: Vec<usize>,
    pub options: HamiltonianOptions,
    pub beta: f64,
    pub eps: f64,
}

impl RunConfig {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 8 {
            return Err(Error::Config(format!(
                "run file must hold 8 values (n_samples d0 d1 d2 H J beta eps), got {}",
                tokens.len()
            )));
        }

        let int = |i: usize| -> Result<usize, Error> {
            tokens[i]
                .parse()
                .map_err(|_| Error::Config(format!("invalid integer '{}'", tokens[i])))
        };
        let float = |i: usize| -> Result<f64, Error> {
            tokens[i]
                .parse()
                .map_err(|_| Error::Config(format!("invalid number '{}'", tokens[i])))
        };

        let n_samples = int(0)?;
        let mut dims = vec![int(1)?, int(2)?, int(3)?];
        while dims.len() > 1 && dims.last() == Some(&1) {
            dims.pop();
        }

        Ok(Self {
            n_samples,
            dims,
            options: HamiltonianOptions {
                h: float(4)?,
                j: float(5)?,
            },
            beta: float(6)?,
            eps: float(7)?,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_run_file() {
        let cfg = RunConfig::parse("1000 8 8 1 0.5 1.0 0.25 0.1").unwrap();
        assert_eq!(cfg.n_samples, 1000);
        assert_eq!(cfg.dims, vec![8, 8]);
        assert_eq!(cfg.options.h, 0.5);
        assert_eq!(cfg.options.j, 1.0);
        assert_eq!(cfg.beta, 0.25);
        assert_eq!(cfg.eps, 0.1);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_trailing_unit_dims_dropped_but_one_kept() {
        let cfg = RunConfig::parse("10 6 1 1 0.0 1.0 1.0 0.1").unwrap();
        assert_eq!(cfg.dims, vec![6]);
        let cfg = RunConfig::parse("10 1 1 1 0.0 1.0 1.0 0.1").unwrap();
        assert_eq!(cfg.dims, vec![1]);
        // An interior 1 is load-bearing and stays.
        let cfg = RunConfig::parse("10 4 1 4 0.0 1.0 1.0 0.1").unwrap();
        assert_eq!(cfg.dims, vec![4, 1, 4]);
    }

    #[test]
    fn test_parse_rejects_wrong_arity_and_bad_tokens() {
        assert!(RunConfig::parse("10 8 8").is_err());
        assert!(RunConfig::parse("ten 8 8 1 0.5 1.0 0.25 0.1").is_err());
        assert!(RunConfig::parse("10 8 8 1 0.5 one 0.25 0.1").is_err());
    }

    #[test]
    fn test_run_config_validation() {
        let mut cfg = RunConfig::parse("10 8 8 1 0.5 1.0 0.25 0.1").unwrap();
        cfg.beta = 0.0;
        assert!(cfg.validate().is_err());
        cfg.beta = 1.0;
        cfg.eps = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_sampler_method_parsing() {
        assert_eq!(SamplerMethod::try_from("hmc").unwrap(), SamplerMethod::Hmc);
        assert_eq!(SamplerMethod::try_from("nuts").unwrap(), SamplerMethod::Nuts);
        assert!(SamplerMethod::try_from("gibbs").is_err());
    }

    #[test]
    fn test_sampler_config_validation() {
        let cfg = SamplerConfig::default();
        cfg.validate().unwrap();

        let bad = SamplerConfig {
            method: SamplerMethod::Hmc,
            leapfrog_steps: 0,
            ..SamplerConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = SamplerConfig {
            max_tree_depth: 0,
            ..SamplerConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
