//! Measurement to target conversion

use crate::Ti3ToTi1Args;
use anyhow::{Context, Result};
use dcal_cgats::to_ti1;

pub fn run(args: Ti3ToTi1Args, verbose: u8) -> Result<()> {
    let ti3 = super::load_cgats(&args.input)?;
    let ti1 = to_ti1(&ti3).with_context(|| format!("Cannot convert {}", args.input.display()))?;
    super::save_cgats(&args.output, &ti1)?;

    if verbose > 0 {
        let sets = ti1.sections().first().map_or(0, |s| s.row_count());
        println!("Wrote {} ({} patches)", args.output.display(), sets);
    }
    Ok(())
}
