//! Per-site collide-and-stream step.
//!
//! The kernel owns no physics itself. Equilibrium, collision, neighbor lookup
//! and streaming are all reached through traits, so any of them can be
//! replaced by a test double.

use std::collections::HashMap;

use log::trace;
use nalgebra::DMatrix;
use thiserror::Error;

use crate::{
    collision::{Bgk, CollisionOperator},
    equilibrium::{EquilibriumProvider, SecondOrderEquilibrium},
    lattice::Lattice,
    moments::MomentsError,
    streaming::{BounceBack, NodeClass, PeriodicStream, StreamingPolicy},
    Float,
};

#[derive(Debug, Error, PartialEq)]
pub enum KernelError {
    #[error("population matrix is {rows}x{columns} but the lattice has {sites} sites and {q} directions")]
    PopulationShape { rows: usize, columns: usize, sites: usize, q: usize },
    #[error("classification grid has {classes} entries for {sites} sites")]
    ClassificationShape { classes: usize, sites: usize },
    #[error("site {site} is outside a lattice of {sites} sites")]
    SiteOutOfRange { site: usize, sites: usize },
    #[error("neighbor {neighbor} of site {site} along direction {direction} is outside a lattice of {sites} sites")]
    NeighborOutOfRange { site: usize, direction: usize, neighbor: usize, sites: usize },
    #[error("collision returned {actual} values for {expected} populations")]
    CollisionShape { expected: usize, actual: usize },
    #[error("no streaming policy for {class} neighbor {neighbor} of site {site} (direction {direction})")]
    UnmappedClassification { site: usize, neighbor: usize, direction: usize, class: NodeClass },
    #[error(transparent)]
    Moments(#[from] MomentsError),
}

/// Populations, their post-streaming buffer and the site classification.
pub struct Simulation {
    populations: DMatrix<Float>,
    next: DMatrix<Float>,
    classes: Vec<NodeClass>,
    lattice: Box<dyn Lattice>,
}

impl Simulation {
    /// `populations` is `sites x q`; `classes` has one entry per site.
    pub fn new(
        populations: DMatrix<Float>,
        classes: Vec<NodeClass>,
        lattice: Box<dyn Lattice>,
    ) -> Result<Self, KernelError> {
        let sites = lattice.site_count();
        let q = lattice.velocity_set().q();
        if populations.nrows() != sites || populations.ncols() != q {
            return Err(KernelError::PopulationShape {
                rows: populations.nrows(),
                columns: populations.ncols(),
                sites,
                q,
            });
        }
        if classes.len() != sites {
            return Err(KernelError::ClassificationShape {
                classes: classes.len(),
                sites,
            });
        }

        let next = populations.clone();
        Ok(Self {
            populations,
            next,
            classes,
            lattice,
        })
    }

    pub fn populations(&self) -> &DMatrix<Float> {
        &self.populations
    }

    pub fn populations_mut(&mut self) -> &mut DMatrix<Float> {
        &mut self.populations
    }

    pub fn next(&self) -> &DMatrix<Float> {
        &self.next
    }

    pub fn classes(&self) -> &[NodeClass] {
        &self.classes
    }

    pub fn lattice(&self) -> &dyn Lattice {
        self.lattice.as_ref()
    }

    pub fn site_count(&self) -> usize {
        self.classes.len()
    }

    /// Seeds the streaming buffer with the current populations so rows no
    /// policy writes to keep their values.
    pub fn begin_step(&mut self) {
        self.next.copy_from(&self.populations);
    }

    /// Makes the streamed populations current.
    pub fn finish_step(&mut self) {
        std::mem::swap(&mut self.populations, &mut self.next);
    }
}

pub struct LocalKernel {
    equilibrium: Box<dyn EquilibriumProvider>,
    collision: Box<dyn CollisionOperator>,
    streaming: HashMap<NodeClass, Box<dyn StreamingPolicy>>,
}

impl LocalKernel {
    pub fn new(
        equilibrium: impl EquilibriumProvider + 'static,
        collision: impl CollisionOperator + 'static,
    ) -> Self {
        Self {
            equilibrium: Box::new(equilibrium),
            collision: Box::new(collision),
            streaming: HashMap::new(),
        }
    }

    /// BGK with the second-order equilibrium. Open classes propagate,
    /// solids bounce back.
    pub fn standard(omega: Float) -> Self {
        Self::new(SecondOrderEquilibrium, Bgk::new(omega))
            .with_streaming(NodeClass::Fluid, PeriodicStream)
            .with_streaming(NodeClass::Inlet, PeriodicStream)
            .with_streaming(NodeClass::Outlet, PeriodicStream)
            .with_streaming(NodeClass::Solid, BounceBack)
    }

    /// Routes neighbors of `class` to `policy`, replacing any earlier one.
    pub fn with_streaming(mut self, class: NodeClass, policy: impl StreamingPolicy + 'static) -> Self {
        self.streaming.insert(class, Box::new(policy));
        self
    }

    pub fn streams(&self, class: NodeClass) -> bool {
        self.streaming.contains_key(&class)
    }

    /// Collides `site` in place, then streams each of its populations into
    /// the post-streaming buffer.
    ///
    /// Collaborators are called in a fixed order: equilibrium, collision,
    /// direction count, then neighbor and stream for each direction in
    /// ascending order. Only row `site` of the current populations changes.
    pub fn step_site(&self, sim: &mut Simulation, site: usize) -> Result<(), KernelError> {
        let sites = sim.site_count();
        if site >= sites {
            return Err(KernelError::SiteOutOfRange { site, sites });
        }

        let f = sim.populations.row(site).transpose();
        let f_eq = self.equilibrium.equilibrium(sim.lattice.velocity_set(), &f)?;
        let delta = self.collision.collide(&f, &f_eq);
        if delta.len() != f.len() {
            return Err(KernelError::CollisionShape {
                expected: f.len(),
                actual: delta.len(),
            });
        }
        for (i, d) in delta.iter().enumerate() {
            sim.populations[(site, i)] += d;
        }

        let q = sim.lattice.direction_count();
        for direction in 0..q {
            let neighbor = sim.lattice.neighbor(site, direction);
            let class = *sim.classes.get(neighbor).ok_or(KernelError::NeighborOutOfRange {
                site,
                direction,
                neighbor,
                sites,
            })?;
            let policy = self.streaming.get(&class).ok_or(KernelError::UnmappedClassification {
                site,
                neighbor,
                direction,
                class,
            })?;
            trace!("site {} -> {} along {} ({})", site, neighbor, direction, class);
            policy.stream(
                sim.lattice.velocity_set(),
                &sim.populations,
                &mut sim.next,
                site,
                neighbor,
                direction,
            );
        }

        Ok(())
    }
}
