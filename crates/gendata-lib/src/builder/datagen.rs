//! Runs the data generator bundled in the server jar to produce `reports/`.

use crate::builder::config::{DATA_GENERATOR_COMMANDS, GENERATED_DIR};
use crate::builder::core::process::GeneratorCommandExt;
use crate::builder::error::BuildError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Resolve the java executable: the configured path, else `java` on PATH.
pub fn locate_java(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(BuildError::DataGenerator(format!(
            "configured java executable {:?} does not exist",
            path
        ))
        .into());
    }

    which::which("java").map_err(|e| {
        BuildError::DataGenerator(format!("java executable not found on PATH: {}", e)).into()
    })
}

/// Generator output directory for a scratch dir
pub fn reports_dir(scratch: &Path) -> PathBuf {
    scratch.join(GENERATED_DIR).join("reports")
}

/// Run the generator in `scratch`, trying the bundler launch form first and
/// the plain classpath form if no reports appeared.
pub async fn run_data_generator(scratch: &Path, java: &Path) -> Result<()> {
    for args in DATA_GENERATOR_COMMANDS {
        if reports_dir(scratch).is_dir() {
            break;
        }

        log::info!("Running data generator: {:?} {}", java, args.join(" "));
        let status = Command::new(java)
            .args(args.iter())
            .current_dir(scratch)
            .suppress_console()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|e| BuildError::DataGenerator(format!("failed to spawn {:?}: {}", java, e)))?;

        if !status.success() {
            log::warn!("Data generator exited with {:?}", status.code());
        }
    }

    if !reports_dir(scratch).is_dir() {
        return Err(BuildError::DataGenerator(format!(
            "no reports produced in {:?}",
            reports_dir(scratch)
        ))
        .into());
    }

    Ok(())
}
