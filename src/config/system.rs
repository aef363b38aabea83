// Directory provisioning and pre-flight checks

use std::fs;
use std::path::Path;

use super::paths::parent_or_current;
use super::Config;
use crate::constants::{BYTES_PER_GB, WRITE_TEST_FILENAME};
use crate::error::{PfvError, Result};

impl Config {
    /// Create the cache dir, the temp dir (if set) and the log file's parent (if set).
    /// Existing directories are fine. Any other failure is an error.
    pub fn create_directories(&self) -> Result<()> {
        ensure_dir(&self.storage.cache_directory)?;

        if let Some(temp_dir) = &self.storage.temp_directory {
            ensure_dir(temp_dir)?;
        }

        if let Some(log_file) = &self.logging.log_file {
            if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
        }

        Ok(())
    }

    /// Advisory pre-flight pass. Returns human-readable issues and raises nothing.
    /// An empty list does not guarantee the run will succeed.
    pub fn validate_system_requirements(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let cache_dir = &self.storage.cache_directory;

        // Free space where the cache lives
        match fs2::available_space(parent_or_current(cache_dir)) {
            Ok(bytes) => {
                let available_gb = bytes as f64 / BYTES_PER_GB;
                if available_gb < self.storage.max_cache_size_gb {
                    issues.push(format!(
                        "Insufficient disk space. Available: {:.1}GB, Required: {:?}GB",
                        available_gb, self.storage.max_cache_size_gb
                    ));
                }
            }
            Err(e) => issues.push(format!("Could not check disk space: {}", e)),
        }

        if let Err(e) = probe_writable(cache_dir) {
            issues.push(format!("Cache directory not writable: {}", e));
        }

        for issue in &issues {
            log::warn!("System check: {}", issue);
        }
        issues
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| PfvError::Filesystem {
        path: path.display().to_string(),
        source,
    })
}

/// Create and remove a marker file inside `dir`.
fn probe_writable(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let marker = dir.join(WRITE_TEST_FILENAME);
    fs::write(&marker, b"")?;
    fs::remove_file(&marker)
}
