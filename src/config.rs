use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{lattice::VelocitySet, Float};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub domain: DomainConfig,
    pub physics: PhysicsConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub boundaries: BoundaryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub nx: usize,
    pub ny: usize,
    #[serde(default = "default_nz")]
    pub nz: usize,
    #[serde(default = "default_spacing")]
    pub dx: Float,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub reynolds_number: Float,
    pub inlet_velocity: [Float; 3],
    pub density: Float,
    pub viscosity: Option<Float>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub max_iterations: usize,
    pub convergence_tolerance: Float,
    pub tau: Option<Float>, // relaxation time
    #[serde(default)]
    pub velocity_set: VelocitySetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VelocitySetKind {
    #[default]
    D2Q9,
    D3Q27,
}

impl VelocitySetKind {
    pub fn build(self) -> VelocitySet {
        match self {
            VelocitySetKind::D2Q9 => VelocitySet::d2q9(),
            VelocitySetKind::D3Q27 => VelocitySet::d3q27(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Solid walls on every face normal to y (and z in 3D)
    #[serde(default = "enabled")]
    pub walls: bool,
    #[serde(default = "enabled")]
    pub inlet: bool,
    #[serde(default = "enabled")]
    pub outlet: bool,
    #[serde(default)]
    pub obstacle: Option<ObstacleConfig>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            walls: true,
            inlet: true,
            outlet: true,
            obstacle: None,
        }
    }
}

/// Cylinder (2D) or sphere (3D), in lattice units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub center: [Float; 3],
    pub radius: Float,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_directory: String,
    pub output_frequency: usize,
}

fn default_nz() -> usize {
    1
}

fn default_spacing() -> Float {
    1.0
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("domain {nx}x{ny}x{nz} has an empty axis")]
    EmptyDomain { nx: usize, ny: usize, nz: usize },
    #[error("D2Q9 needs nz = 1, got {0}")]
    TwoDimensionalDepth(usize),
    #[error("output_frequency must be at least 1")]
    ZeroOutputFrequency,
    #[error("relaxation time {0} is not above 0.5")]
    UnstableTau(Float),
    #[error("obstacle radius {0} must be positive")]
    ObstacleRadius(Float),
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let DomainConfig { nx, ny, nz, .. } = self.domain;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ConfigError::EmptyDomain { nx, ny, nz });
        }
        if self.simulation.velocity_set == VelocitySetKind::D2Q9 && nz != 1 {
            return Err(ConfigError::TwoDimensionalDepth(nz));
        }
        if self.output.output_frequency == 0 {
            return Err(ConfigError::ZeroOutputFrequency);
        }
        let tau = self.calculate_tau();
        if tau.is_nan() || tau <= 0.5 {
            return Err(ConfigError::UnstableTau(tau));
        }
        if let Some(obstacle) = &self.boundaries.obstacle {
            if obstacle.radius.is_nan() || obstacle.radius <= 0.0 {
                return Err(ConfigError::ObstacleRadius(obstacle.radius));
            }
        }
        Ok(())
    }

    pub fn calculate_tau(&self) -> Float {
        if let Some(tau) = self.simulation.tau {
            tau
        } else {
            // Kinematic viscosity in lattice units from the channel width
            let characteristic_length = self.domain.ny as Float;
            let characteristic_velocity = self.physics.inlet_velocity[0].max(
                self.physics.inlet_velocity[1].max(self.physics.inlet_velocity[2])
            );

            let viscosity = if let Some(nu) = self.physics.viscosity {
                nu
            } else {
                (characteristic_velocity * characteristic_length) / self.physics.reynolds_number
            };

            viscosity / VelocitySet::CS2 + 0.5
        }
    }

    pub fn omega(&self) -> Float {
        1.0 / self.calculate_tau()
    }

    /// Inlet velocity truncated to the dimensions of the chosen velocity set.
    pub fn inlet_velocity(&self) -> Vec<Float> {
        let dims = match self.simulation.velocity_set {
            VelocitySetKind::D2Q9 => 2,
            VelocitySetKind::D3Q27 => 3,
        };
        self.physics.inlet_velocity[..dims].to_vec()
    }
}
