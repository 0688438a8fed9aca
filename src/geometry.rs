use log::{debug, info};

use crate::{
    config::{BoundaryConfig, DomainConfig},
    streaming::NodeClass,
    Float,
};

/// Classification of every site of a channel domain.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    classes: Vec<NodeClass>,
}

impl Geometry {
    pub fn channel(domain: &DomainConfig, boundaries: &BoundaryConfig) -> Self {
        let (nx, ny, nz) = (domain.nx, domain.ny, domain.nz);
        let mut geometry = Self {
            nx,
            ny,
            nz,
            classes: vec![NodeClass::Fluid; nx * ny * nz],
        };

        // Inlet at x=0 plane, outlet at x=nx-1 plane
        for k in 0..nz {
            for j in 0..ny {
                if boundaries.inlet {
                    geometry.set(0, j, k, NodeClass::Inlet);
                }
                if boundaries.outlet && nx > 1 {
                    geometry.set(nx - 1, j, k, NodeClass::Outlet);
                }
            }
        }

        // Walls are applied last so the channel corners are solid
        if boundaries.walls {
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let wall_y = j == 0 || j == ny - 1;
                        let wall_z = nz > 1 && (k == 0 || k == nz - 1);
                        if wall_y || wall_z {
                            geometry.set(i, j, k, NodeClass::Solid);
                        }
                    }
                }
            }
        }

        if let Some(obstacle) = &boundaries.obstacle {
            let r2 = obstacle.radius * obstacle.radius;
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let dx = i as Float - obstacle.center[0];
                        let dy = j as Float - obstacle.center[1];
                        let dz = if nz > 1 { k as Float - obstacle.center[2] } else { 0.0 };
                        if dx * dx + dy * dy + dz * dz <= r2 {
                            geometry.set(i, j, k, NodeClass::Solid);
                        }
                    }
                }
            }
            debug!("Obstacle at {:?} with radius {}", obstacle.center, obstacle.radius);
        }

        info!(
            "Geometry: {} fluid, {} solid, {} inlet, {} outlet nodes",
            geometry.count(NodeClass::Fluid),
            geometry.count(NodeClass::Solid),
            geometry.count(NodeClass::Inlet),
            geometry.count(NodeClass::Outlet)
        );

        geometry
    }

    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.nx + k * self.nx * self.ny
    }

    fn set(&mut self, i: usize, j: usize, k: usize, class: NodeClass) {
        let idx = self.index(i, j, k);
        self.classes[idx] = class;
    }

    pub fn class(&self, i: usize, j: usize, k: usize) -> NodeClass {
        self.classes[self.index(i, j, k)]
    }

    pub fn classes(&self) -> &[NodeClass] {
        &self.classes
    }

    pub fn count(&self, class: NodeClass) -> usize {
        self.classes.iter().filter(|c| **c == class).count()
    }

    pub fn is_solid(&self, i: usize, j: usize, k: usize) -> bool {
        self.class(i, j, k) == NodeClass::Solid
    }
}
