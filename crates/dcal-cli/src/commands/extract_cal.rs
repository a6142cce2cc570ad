//! Calibration recovery from display profiles

use crate::ExtractCalArgs;
use anyhow::{Context, Result};
use dcal_calib::{extract_cal_from_profile, ExtractOptions};
use tracing::debug;

pub fn run(args: ExtractCalArgs, verbose: u8) -> Result<()> {
    let mut profile = super::load_profile(&args.input)?;
    debug!(tags = profile.tags().len(), "loaded profile");

    let opts = ExtractOptions {
        out_cal_path: args.output.clone(),
        raise_on_missing: true,
        prefer_cal: args.prefer_cal,
    };
    let cal = extract_cal_from_profile(&mut profile, &opts)
        .with_context(|| format!("No usable calibration in {}", args.input.display()))?
        .context("Profile has no calibration data")?;

    match &args.output {
        Some(path) => {
            if verbose > 0 {
                println!("Wrote {}", path.display());
            }
        }
        None => print!("{}", cal),
    }
    Ok(())
}
