//! Bifurcated pipe pipeline
//!
//! Builds the pipe with the default parameters, meshes it and converts the
//! mesh, writing `bifurcation.msh` and `bifurcation.xml` into the current
//! directory. Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use bifurcation::{run, PipeParameters};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let params = PipeParameters::default();
    let report = run(&params, ".").context("bifurcation pipeline failed")?;

    tracing::info!(
        "Wrote {} ({} tetrahedra) and {} ({} cells)",
        report.native_path.display(),
        report.mesh.tetrahedra,
        report.interchange_path.display(),
        report.conversion.cells_written
    );
    Ok(())
}
