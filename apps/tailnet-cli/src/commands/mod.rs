//! Subcommand implementations.
//!
//! Every command resolves against the directory first; `ensure` and `release`
//! accept `--dry-run` to print the planned writes without issuing them.

pub mod ensure;
pub mod import;
pub mod release;
pub mod resolve;

use std::path::Path;

use tailnet_membership::DesiredMembership;

use crate::error::{CliError, CliResult};

/// Read a desired membership document.
pub(crate) fn load_desired(path: &Path) -> CliResult<DesiredMembership> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Validation(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(DesiredMembership::from_yaml(&content)?)
}
