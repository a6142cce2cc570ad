//! CLI command implementations

pub mod add_options;
pub mod can_update;
pub mod cal_to_vcgt;
pub mod extract_cal;
pub mod fix_cal;
pub mod subset;
pub mod ti3_to_ti1;
pub mod verify;

use anyhow::{Context, Result};
use dcal_cgats::Cgats;
use dcal_icc::Profile;
use std::path::Path;

/// Load CGATS file from path
pub fn load_cgats(path: &Path) -> Result<Cgats> {
    Cgats::from_path(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save CGATS document to path
pub fn save_cgats(path: &Path, cgats: &Cgats) -> Result<()> {
    cgats
        .write(path)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Load ICC profile from path
pub fn load_profile(path: &Path) -> Result<Profile> {
    Profile::from_path(path).with_context(|| format!("Failed to load: {}", path.display()))
}
