// src/config/local.rs
// DOCUMENTATION: Local development environment loading
// PURPOSE: Populate the process environment from a .env file

use std::io;
use std::path::{Path, PathBuf};

/// Log entry into an operation under an explicit label
pub fn log_execution_start(label: &str) {
    log::info!("Executing {}", label);
}

/// Load the nearest .env file into the process environment
/// DOCUMENTATION: Only used for local development, deployed instances
/// receive their variables from the platform
pub fn load_environment_variables() -> Result<PathBuf, dotenv::Error> {
    log_execution_start("load_environment_variables");

    let path = dotenv::dotenv()?;

    log::info!("Local environment variables successfully loaded");
    Ok(path)
}

/// Load a specific env file into the process environment
/// Variables already present in the environment are left untouched
pub fn load_environment_file(path: &Path) -> Result<(), dotenv::Error> {
    log_execution_start("load_environment_file");

    dotenv::from_path(path)?;

    log::info!("Environment variables loaded from {}", path.display());
    Ok(())
}

/// Populate the environment for a local development run
/// DOCUMENTATION: A named file must load. Without one, a missing .env is
/// only a warning so variables exported in the shell still work.
pub fn load_local_environment(env_file: Option<&Path>) -> Result<(), dotenv::Error> {
    match env_file {
        Some(path) => load_environment_file(path),
        None => tolerate_missing(load_environment_variables()),
    }
}

fn tolerate_missing(result: Result<PathBuf, dotenv::Error>) -> Result<(), dotenv::Error> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("No .env file found, using the process environment");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
