use anyhow::{Context, Result};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::{
    config::Config,
    equilibrium::equilibrium_distribution,
    geometry::Geometry,
    kernel::{LocalKernel, Simulation},
    lattice::{Lattice, PeriodicLattice},
    moments,
    output::VtkWriter,
    streaming::NodeClass,
    Float,
};

/// Density and velocity of every site. Velocities are padded to three
/// components for 2D runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Macroscopic {
    pub density: Vec<Float>,
    pub velocity: Vec<[Float; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub converged: bool,
    pub files_written: usize,
}

pub struct Solver {
    config: Config,
    geometry: Geometry,
    kernel: LocalKernel,
    simulation: Simulation,
    /// Sites the kernel runs on: everything but solids
    active_sites: Vec<usize>,
    inlet_populations: DVector<Float>,
    previous_velocity: Option<Vec<[Float; 3]>>,
    iteration: usize,
}

impl Solver {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!(
            "Initializing LBM solver with domain size: {}x{}x{}",
            config.domain.nx, config.domain.ny, config.domain.nz
        );

        let geometry = Geometry::channel(&config.domain, &config.boundaries);
        let lattice = PeriodicLattice::new(
            config.simulation.velocity_set.build(),
            config.domain.nx,
            config.domain.ny,
            config.domain.nz,
        )?;
        let velocity_set = lattice.velocity_set().clone();
        info!("Velocity set {} with tau {}", velocity_set.name(), config.calculate_tau());

        let inlet_velocity = DVector::from_vec(config.inlet_velocity());
        let inlet_populations = equilibrium_distribution(&velocity_set, config.physics.density, &inlet_velocity)?;
        let rest_populations = equilibrium_distribution(
            &velocity_set,
            config.physics.density,
            &DVector::zeros(velocity_set.dimensions()),
        )?;

        let classes = geometry.classes().to_vec();
        let populations = DMatrix::from_fn(classes.len(), velocity_set.q(), |site, i| {
            if classes[site] == NodeClass::Inlet {
                inlet_populations[i]
            } else {
                rest_populations[i]
            }
        });

        let active_sites = (0..classes.len())
            .filter(|site| classes[*site] != NodeClass::Solid)
            .collect();
        let simulation = Simulation::new(populations, classes, Box::new(lattice))?;
        let kernel = LocalKernel::standard(config.omega());

        Ok(Self {
            config,
            geometry,
            kernel,
            simulation,
            active_sites,
            inlet_populations,
            previous_velocity: None,
            iteration: 0,
        })
    }

    /// One collide-and-stream pass over every non-solid site, followed by
    /// the inlet and outlet conditions.
    pub fn step(&mut self) -> Result<()> {
        self.simulation.begin_step();
        for site in self.active_sites.iter().copied() {
            self.kernel
                .step_site(&mut self.simulation, site)
                .with_context(|| format!("iteration {}", self.iteration + 1))?;
        }
        self.simulation.finish_step();
        self.apply_open_boundaries();
        self.iteration += 1;
        Ok(())
    }

    fn apply_open_boundaries(&mut self) {
        let (nx, ny, nz) = (self.geometry.nx, self.geometry.ny, self.geometry.nz);
        let q = self.inlet_populations.len();
        for k in 0..nz {
            for j in 0..ny {
                if self.geometry.class(0, j, k) == NodeClass::Inlet {
                    let site = self.geometry.index(0, j, k);
                    for i in 0..q {
                        self.simulation.populations_mut()[(site, i)] = self.inlet_populations[i];
                    }
                }
                if nx > 1 && self.geometry.class(nx - 1, j, k) == NodeClass::Outlet {
                    // Zero-gradient: copy the upstream column
                    let site = self.geometry.index(nx - 1, j, k);
                    let upstream = self.geometry.index(nx - 2, j, k);
                    let populations = self.simulation.populations_mut();
                    for i in 0..q {
                        populations[(site, i)] = populations[(upstream, i)];
                    }
                }
            }
        }
    }

    /// Runs until `max_iterations` or convergence, writing output every
    /// `output_frequency` iterations. `on_step` is called after every step.
    pub fn run<F: FnMut(usize)>(&mut self, mut on_step: F) -> Result<RunSummary> {
        info!("Starting LBM simulation for {} iterations", self.config.simulation.max_iterations);

        let directory = self.config.output.output_directory.clone();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("creating output directory {}", directory))?;

        let mut writer = VtkWriter::new(&self.config);
        writer.write_geometry(&format!("{}/geometry.vtk", directory), &self.geometry)?;

        // Write initial state
        self.write_output(&mut writer)?;

        let mut converged = false;
        while self.iteration < self.config.simulation.max_iterations && !converged {
            self.step()?;
            on_step(self.iteration);

            if self.iteration % self.config.output.output_frequency == 0 {
                self.write_output(&mut writer)?;
                converged = self.check_convergence();

                debug!("Iteration {}: mass {:.6}, {}", self.iteration, self.total_mass(),
                       if converged { "converged" } else { "continuing" });
            }
        }

        if converged {
            info!("Simulation converged after {} iterations", self.iteration);
        } else {
            info!("Simulation completed {} iterations", self.iteration);
        }

        writer.write_collection(&format!("{}/solution.pvd", directory))?;

        Ok(RunSummary {
            iterations: self.iteration,
            converged,
            files_written: writer.get_file_count(),
        })
    }

    fn write_output(&self, writer: &mut VtkWriter) -> Result<()> {
        let filename = format!("{}/output_{:06}.vtk", self.config.output.output_directory, self.iteration);
        writer.write(&filename, &self.geometry, &self.macroscopic(), self.iteration)?;
        info!("Wrote output file: {}", filename);
        Ok(())
    }

    /// Converged once no velocity component moved by more than the tolerance
    /// since the previous check.
    fn check_convergence(&mut self) -> bool {
        let velocity = self.macroscopic().velocity;
        let converged = match &self.previous_velocity {
            Some(previous) => {
                let change = previous
                    .iter()
                    .zip(&velocity)
                    .flat_map(|(a, b)| (0..3).map(move |d| (a[d] - b[d]).abs()))
                    .fold(0.0, Float::max);
                debug!("Maximum velocity change {:.3e}", change);
                change < self.config.simulation.convergence_tolerance
            }
            None => false,
        };
        self.previous_velocity = Some(velocity);
        converged
    }

    pub fn macroscopic(&self) -> Macroscopic {
        let velocity_set = self.simulation.lattice().velocity_set();
        let populations = self.simulation.populations();
        let sites = self.simulation.site_count();
        let mut density = Vec::with_capacity(sites);
        let mut velocity = Vec::with_capacity(sites);

        for (site, class) in self.simulation.classes().iter().enumerate() {
            if *class == NodeClass::Solid {
                density.push(self.config.physics.density);
                velocity.push([0.0; 3]);
                continue;
            }
            let f = populations.row(site).transpose();
            density.push(moments::density(&f));
            let mut u = [0.0; 3];
            // dimensions are checked when the lattice is built
            if let Ok(v) = moments::velocity(velocity_set, &f) {
                for (d, value) in v.iter().enumerate() {
                    u[d] = *value;
                }
            }
            velocity.push(u);
        }

        Macroscopic { density, velocity }
    }

    /// Total density over the non-solid sites.
    pub fn total_mass(&self) -> Float {
        let populations = self.simulation.populations();
        self.active_sites
            .iter()
            .map(|site| populations.row(*site).sum())
            .sum()
    }

    pub fn populations(&self) -> &DMatrix<Float> {
        self.simulation.populations()
    }

    pub fn get_iteration(&self) -> usize {
        self.iteration
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_geometry(&self) -> &Geometry {
        &self.geometry
    }
}
