//! Record Argyll tool arguments in a CGATS file

use crate::AddOptionsArgs;
use anyhow::{bail, Context, Result};
use dcal_calib::options::split_args;
use dcal_calib::{add_dispcal_options_to_cal, add_options_to_ti3};
use tracing::info;

pub fn run(args: AddOptionsArgs, verbose: u8) -> Result<()> {
    if args.dispcal.is_none() && args.colprof.is_none() {
        bail!("Nothing to add: pass --dispcal and/or --colprof");
    }
    let mut cgats = super::load_cgats(&args.input)?;
    let dispcal = args.dispcal.as_deref().map(split_args);
    let colprof = args.colprof.as_deref().map(split_args);

    let file_type = cgats
        .sections()
        .first()
        .map(|s| s.file_type().to_string())
        .unwrap_or_default();
    match file_type.as_str() {
        "CAL" => {
            if colprof.is_some() {
                bail!("colprof arguments only apply to .ti3 files");
            }
            let dispcal = dispcal.unwrap_or_default();
            add_dispcal_options_to_cal(&mut cgats, &dispcal)
                .context("Failed to add dispcal arguments")?;
        }
        "CTI3" => {
            if dispcal.is_some() && cgats.len() < 2 {
                info!("No calibration section, dispcal arguments skipped");
            }
            add_options_to_ti3(&mut cgats, dispcal.as_deref(), colprof.as_deref())
                .context("Failed to add arguments")?;
        }
        other => bail!("Unsupported file type '{}' (expected CAL or CTI3)", other),
    }

    super::save_cgats(&args.input, &cgats)?;
    if verbose > 0 {
        println!("Updated {}", args.input.display());
    }
    Ok(())
}
