use std::fmt;

use nalgebra::DMatrix;

use crate::{lattice::VelocitySet, Float};

/// Site classification. The discriminants are the node-type codes written to
/// output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NodeClass {
    Fluid = 0,
    Solid = 1,
    Inlet = 2,
    Outlet = 3,
}

impl NodeClass {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for NodeClass {
    type Error = u32;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NodeClass::Fluid),
            1 => Ok(NodeClass::Solid),
            2 => Ok(NodeClass::Inlet),
            3 => Ok(NodeClass::Outlet),
            other => Err(other),
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeClass::Fluid => "fluid",
            NodeClass::Solid => "solid",
            NodeClass::Inlet => "inlet",
            NodeClass::Outlet => "outlet",
        };
        write!(f, "{name}")
    }
}

/// Moves one population of `source` along `direction` into the post-streaming
/// buffer. Which policy runs is decided by the class of `destination`.
///
/// `current` and `next` are `sites x q` matrices.
pub trait StreamingPolicy {
    fn stream(
        &self,
        velocity_set: &VelocitySet,
        current: &DMatrix<Float>,
        next: &mut DMatrix<Float>,
        source: usize,
        destination: usize,
        direction: usize,
    );
}

/// Plain propagation into an open neighbor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodicStream;

impl StreamingPolicy for PeriodicStream {
    fn stream(
        &self,
        _velocity_set: &VelocitySet,
        current: &DMatrix<Float>,
        next: &mut DMatrix<Float>,
        source: usize,
        destination: usize,
        direction: usize,
    ) {
        next[(destination, direction)] = current[(source, direction)];
    }
}

/// Halfway bounce-back off a solid neighbor: the population comes back to
/// `source` travelling the other way.
#[derive(Debug, Clone, Copy, Default)]
pub struct BounceBack;

impl StreamingPolicy for BounceBack {
    fn stream(
        &self,
        velocity_set: &VelocitySet,
        current: &DMatrix<Float>,
        next: &mut DMatrix<Float>,
        source: usize,
        _destination: usize,
        direction: usize,
    ) {
        next[(source, velocity_set.opposite(direction))] = current[(source, direction)];
    }
}
