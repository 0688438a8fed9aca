//! Recording stand-ins for the kernel's collaborators.
//!
//! Each double returns a fixed answer and logs its call to a shared
//! [`CallRecorder`], so a test can check which collaborators the kernel
//! called, in what order and with which arguments.

use nalgebra::{DMatrix, DVector};

use crate::{
    collision::CollisionOperator,
    equilibrium::EquilibriumProvider,
    lattice::{Lattice, VelocitySet},
    moments::MomentsError,
    recorder::{Arg, CallRecorder},
    streaming::StreamingPolicy,
    Float,
};

pub struct StubEquilibrium {
    recorder: CallRecorder,
    value: DVector<Float>,
}

impl StubEquilibrium {
    pub fn new(recorder: &CallRecorder, value: DVector<Float>) -> Self {
        Self {
            recorder: recorder.clone(),
            value,
        }
    }
}

impl EquilibriumProvider for StubEquilibrium {
    fn equilibrium(&self, _velocity_set: &VelocitySet, f: &DVector<Float>) -> Result<DVector<Float>, MomentsError> {
        self.recorder.record("equilibrium", vec![Arg::from(f)]);
        Ok(self.value.clone())
    }
}

pub struct StubCollision {
    recorder: CallRecorder,
    delta: DVector<Float>,
}

impl StubCollision {
    pub fn new(recorder: &CallRecorder, delta: DVector<Float>) -> Self {
        Self {
            recorder: recorder.clone(),
            delta,
        }
    }
}

impl CollisionOperator for StubCollision {
    fn collide(&self, f: &DVector<Float>, f_eq: &DVector<Float>) -> DVector<Float> {
        self.recorder.record("collision", vec![Arg::from(f), Arg::from(f_eq)]);
        self.delta.clone()
    }
}

/// Lattice of `sites` sites where the neighbor of `site` along `direction`
/// is `(site + direction) % sites`.
pub struct StubLattice {
    recorder: CallRecorder,
    velocity_set: VelocitySet,
    sites: usize,
}

impl StubLattice {
    pub fn new(recorder: &CallRecorder, velocity_set: VelocitySet, sites: usize) -> Self {
        Self {
            recorder: recorder.clone(),
            velocity_set,
            sites,
        }
    }
}

impl Lattice for StubLattice {
    fn velocity_set(&self) -> &VelocitySet {
        &self.velocity_set
    }

    fn site_count(&self) -> usize {
        self.sites
    }

    fn direction_count(&self) -> usize {
        self.recorder.record("direction_count", Vec::new());
        self.velocity_set.q()
    }

    fn neighbor(&self, site: usize, direction: usize) -> usize {
        self.recorder
            .record("neighbor", vec![Arg::Site(site), Arg::Direction(direction)]);
        (site + direction) % self.sites
    }
}

/// Streaming policy that only logs. `name` tells policies apart in the log.
pub struct StubStreaming {
    recorder: CallRecorder,
    name: &'static str,
}

impl StubStreaming {
    pub fn new(recorder: &CallRecorder, name: &'static str) -> Self {
        Self {
            recorder: recorder.clone(),
            name,
        }
    }
}

impl StreamingPolicy for StubStreaming {
    fn stream(
        &self,
        _velocity_set: &VelocitySet,
        _current: &DMatrix<Float>,
        _next: &mut DMatrix<Float>,
        source: usize,
        destination: usize,
        direction: usize,
    ) {
        self.recorder.record(
            self.name,
            vec![Arg::Site(source), Arg::Site(destination), Arg::Direction(direction)],
        );
    }
}
