pub mod config;
pub mod moments;
pub mod relaxation;
pub mod lattice;
pub mod equilibrium;
pub mod collision;
pub mod streaming;
pub mod kernel;
pub mod recorder;
pub mod doubles;
pub mod geometry;
pub mod solver;
pub mod output;

pub use config::Config;
pub use geometry::Geometry;
pub use lattice::{Lattice, PeriodicLattice, VelocitySet};
pub use kernel::{KernelError, LocalKernel, Simulation};
pub use recorder::{Arg, CallRecord, CallRecorder};
pub use streaming::NodeClass;
pub use solver::Solver;
pub use output::VtkWriter;

pub type Float = f64;
