use lattice_kernel_rs::{Config, Solver};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::env;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!("  config.json - JSON file containing simulation parameters");
        std::process::exit(1);
    }

    let config_path = &args[1];

    info!("Loading configuration from: {}", config_path);
    let config = Config::from_file(config_path)?;

    info!("Simulation parameters:");
    info!("  Domain: {}x{}x{}", config.domain.nx, config.domain.ny, config.domain.nz);
    info!("  Velocity set: {:?}", config.simulation.velocity_set);
    info!("  Reynolds number: {}", config.physics.reynolds_number);
    info!("  Inlet velocity: {:?}", config.physics.inlet_velocity);
    info!("  Max iterations: {}", config.simulation.max_iterations);
    info!("  Output frequency: {}", config.output.output_frequency);
    info!("  Tau (relaxation time): {}", config.calculate_tau());

    let progress = ProgressBar::new(config.simulation.max_iterations as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} iterations ({eta})")?,
    );

    let mut solver = Solver::new(config)?;
    let summary = solver.run(|iteration| progress.set_position(iteration as u64))?;
    progress.finish_and_clear();

    info!(
        "Finished after {} iterations ({}), total mass {:.6}",
        summary.iterations,
        if summary.converged { "converged" } else { "not converged" },
        solver.total_mass()
    );
    info!("{} output files written to: {}", summary.files_written, solver.get_config().output.output_directory);

    Ok(())
}
