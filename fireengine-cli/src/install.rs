//! Per-project installation record.
//!
//! `fireengine init` drops `.fireengine/installation.json` into the project
//! directory the first time it runs. The record is never rewritten.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Directory holding FireEngine's local state, relative to the project root.
pub const STATE_DIR: &str = ".fireengine";

const RECORD_FILE: &str = "installation.json";

/// Printed after `init`.
pub const GETTING_STARTED: &str = "\
Thank you for installing FireEngine!

Documentation: https://www.fireengine.dev/docs
Purchase a license: https://www.fireengine.dev/#pricing
Support: support@fireengine.dev

Get started: see demos/fireengine.json for a sample configuration
";

/// Identifies one installation of the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub platform: String,
    pub arch: String,
}

impl InstallationRecord {
    /// A fresh record for this machine and crate version.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
        }
    }
}

/// Path of the record under `project_dir`.
pub fn record_path(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_DIR).join(RECORD_FILE)
}

/// Returns the existing record, or writes a new one.
///
/// The flag is `true` when the record was created by this call.
pub fn ensure_installation(project_dir: &Path) -> Result<(InstallationRecord, bool)> {
    let path = record_path(project_dir);

    if path.exists() {
        debug!(path = %path.display(), "installation record already present");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok((record, false));
    }

    let dir = project_dir.join(STATE_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let record = InstallationRecord::collect();
    let json = serde_json::to_string_pretty(&record)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(id = %record.id, path = %path.display(), "installation recorded");
    Ok((record, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_fills_platform_fields() {
        let record = InstallationRecord::collect();
        assert_eq!(record.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(record.platform, env::consts::OS);
        assert_eq!(record.arch, env::consts::ARCH);
        assert_ne!(record.id, Uuid::nil());
    }

    #[test]
    fn record_path_is_under_state_dir() {
        let path = record_path(Path::new("/srv/app"));
        assert_eq!(path, Path::new("/srv/app/.fireengine/installation.json"));
    }
}
