use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use crate::{config::Config, geometry::Geometry, lattice::VelocitySet, solver::Macroscopic, Float};

/// Legacy ASCII VTK writer for structured-grid results.
pub struct VtkWriter {
    config: Config,
    collection_entries: Vec<(usize, f64, String)>, // (iteration, time, filename)
}

impl VtkWriter {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            collection_entries: Vec::new(),
        }
    }

    fn write_header(&self, file: &mut impl Write, title: &str) -> Result<()> {
        let (nx, ny, nz) = (self.config.domain.nx, self.config.domain.ny, self.config.domain.nz);
        let dx = self.config.domain.dx;

        writeln!(file, "# vtk DataFile Version 3.0")?;
        writeln!(file, "{}", title)?;
        writeln!(file, "ASCII")?;
        writeln!(file, "DATASET STRUCTURED_GRID")?;
        writeln!(file, "DIMENSIONS {} {} {}", nx, ny, nz)?;

        writeln!(file, "POINTS {} float", nx * ny * nz)?;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    writeln!(file, "{} {} {}", i as Float * dx, j as Float * dx, k as Float * dx)?;
                }
            }
        }

        writeln!(file, "POINT_DATA {}", nx * ny * nz)?;
        Ok(())
    }

    pub fn write(&mut self, filename: &str, geometry: &Geometry, fields: &Macroscopic, iteration: usize) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);

        // One lattice time step per iteration
        let time = iteration as f64;
        self.collection_entries.push((iteration, time, filename.to_string()));

        self.write_header(&mut file, &format!("LBM Solution - Iteration {} Time {:.3}", iteration, time))?;

        // Density
        writeln!(file, "SCALARS Density float")?;
        writeln!(file, "LOOKUP_TABLE default")?;
        for density in &fields.density {
            writeln!(file, "{:.6}", density)?;
        }

        // Velocity
        writeln!(file, "VECTORS Velocity float")?;
        for u in &fields.velocity {
            writeln!(file, "{:.6} {:.6} {:.6}", u[0], u[1], u[2])?;
        }

        writeln!(file, "SCALARS VelocityMagnitude float")?;
        writeln!(file, "LOOKUP_TABLE default")?;
        for u in &fields.velocity {
            writeln!(file, "{:.6}", (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt())?;
        }

        self.write_node_types(&mut file, geometry)?;

        // Pressure (from density)
        writeln!(file, "SCALARS Pressure float")?;
        writeln!(file, "LOOKUP_TABLE default")?;
        for density in &fields.density {
            let pressure = (density - self.config.physics.density) * VelocitySet::CS2;
            writeln!(file, "{:.6}", pressure)?;
        }

        file.flush()?;
        Ok(())
    }

    fn write_node_types(&self, file: &mut impl Write, geometry: &Geometry) -> Result<()> {
        writeln!(file, "SCALARS NodeType float")?;
        writeln!(file, "LOOKUP_TABLE default")?;
        for class in geometry.classes() {
            writeln!(file, "{:.1}", class.code() as f32)?;
        }
        Ok(())
    }

    pub fn write_geometry(&self, filename: &str, geometry: &Geometry) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);
        self.write_header(&mut file, "LBM Geometry")?;
        self.write_node_types(&mut file, geometry)?;
        file.flush()?;
        Ok(())
    }

    /// Write a ParaView collection file that groups all VTK files with time information
    pub fn write_collection(&self, collection_filename: &str) -> Result<()> {
        let mut file = BufWriter::new(File::create(collection_filename)?);

        writeln!(file, "<?xml version=\"1.0\"?>")?;
        writeln!(file, "<VTKFile type=\"Collection\" version=\"0.1\">")?;
        writeln!(file, "  <Collection>")?;

        for (_iteration, time, filename) in &self.collection_entries {
            // The collection sits next to the data files
            let basename = std::path::Path::new(filename)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(filename);
            writeln!(file, "    <DataSet timestep=\"{:.6}\" part=\"0\" file=\"{}\"/>", time, basename)?;
        }

        writeln!(file, "  </Collection>")?;
        writeln!(file, "</VTKFile>")?;
        file.flush()?;

        Ok(())
    }

    /// Get the number of files written so far
    pub fn get_file_count(&self) -> usize {
        self.collection_entries.len()
    }
}
