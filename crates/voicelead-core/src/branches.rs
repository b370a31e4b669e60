use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A fixed service branch with a known address and service radius.
///
/// Static reference data: loaded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub service_radius_miles: f64,
}

#[derive(Debug, Deserialize)]
pub struct BranchesFile {
    pub branches: Vec<Branch>,
}

/// Load and validate the branch reference data from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_branches(path: &Path) -> Result<Vec<Branch>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BranchesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let branches_file: BranchesFile = serde_yaml::from_str(&content)?;
    validate_branches(&branches_file)?;

    Ok(branches_file.branches)
}

fn validate_branches(branches_file: &BranchesFile) -> Result<(), ConfigError> {
    if branches_file.branches.is_empty() {
        return Err(ConfigError::Validation(
            "at least one branch is required".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for branch in &branches_file.branches {
        if branch.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "branch id must be non-empty".to_string(),
            ));
        }

        if !seen_ids.insert(branch.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate branch id: '{}'",
                branch.id
            )));
        }

        if !(-90.0..=90.0).contains(&branch.latitude)
            || !(-180.0..=180.0).contains(&branch.longitude)
        {
            return Err(ConfigError::Validation(format!(
                "branch '{}' has out-of-range coordinates ({}, {})",
                branch.id, branch.latitude, branch.longitude
            )));
        }

        if branch.service_radius_miles <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "branch '{}' has non-positive service radius {}",
                branch.id, branch.service_radius_miles
            )));
        }
    }

    Ok(())
}
