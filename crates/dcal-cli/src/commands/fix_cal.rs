//! Updatable copy of a profile's embedded calibration

use crate::FixCalArgs;
use anyhow::{Context, Result};
use dcal_calib::extract_fix_copy_cal;

pub fn run(args: FixCalArgs, verbose: u8) -> Result<()> {
    let lines = extract_fix_copy_cal(&args.input, args.output.as_deref())
        .with_context(|| format!("Failed to process {}", args.input.display()))?
        .with_context(|| format!("{} has no embedded calibration", args.input.display()))?;

    match &args.output {
        Some(path) => {
            if verbose > 0 {
                println!("Wrote {} ({} lines)", path.display(), lines.len());
            }
        }
        None => println!("{}", lines.join("\n")),
    }
    Ok(())
}
