//! Host environment utility functions

use std::path::PathBuf;

/// The environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "TRAJ_SW_ROOT";

/// Retrieve the software root directory from the environment.
///
/// Parameter files and session directories are resolved relative to this
/// directory.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
