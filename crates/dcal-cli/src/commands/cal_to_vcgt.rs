//! Calibration-only profile from a .cal file

use crate::CalToVcgtArgs;
use anyhow::{Context, Result};
use dcal_calib::cal_to_fake_profile;

pub fn run(args: CalToVcgtArgs, verbose: u8) -> Result<()> {
    let cal = super::load_cgats(&args.input)?;
    let profile = cal_to_fake_profile(&cal).with_context(|| {
        format!(
            "{} is not a calibration (expected RGB_I RGB_R RGB_G RGB_B data)",
            args.input.display()
        )
    })?;

    profile
        .write(&args.output)
        .with_context(|| format!("Failed to save: {}", args.output.display()))?;

    if verbose > 0 {
        let entries = profile.vcgt().map_or(0, |v| v.entry_count());
        println!("Wrote {} ({} vcgt entries)", args.output.display(), entries);
    }
    Ok(())
}
