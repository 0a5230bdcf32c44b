//! Standalone cleanup of leftover rendered artifacts.

use std::fs;
use std::path::Path;

use crate::console;
use crate::domain::{AppError, artifacts};

/// Remove any registered temp file still present in `dir`.
///
/// A leftover means a step failed between rendering and installing. Absent
/// files are fine; a failed removal aborts with the offending name. Runs
/// without any provisioning step and without privilege checks.
pub fn run_cleanup(dir: &Path) -> Result<(), AppError> {
    console::header("Cleaning up temporary files");

    for name in artifacts::TEMP_ARTIFACTS {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }

        console::status(&format!("Removing temporary file: {name}"));
        fs::remove_file(&path).map_err(|e| {
            console::error(&format!("Failed to remove temporary file: {name}"));
            AppError::Configuration(format!("Failed to remove temporary file {name}: {e}"))
        })?;
    }

    console::status("All temporary files have been cleaned up");
    Ok(())
}
