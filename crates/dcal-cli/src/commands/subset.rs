//! Gray / primaries subset extraction

use crate::SubsetArgs;
use anyhow::{Context, Result};
use dcal_calib::{extract_device_gray_primaries, SubsetOptions};
use dcal_cgats::Cgats;

pub fn run(args: SubsetArgs, verbose: u8) -> Result<()> {
    let ti3 = super::load_cgats(&args.input)?;

    let mut opts = SubsetOptions {
        gray: !args.primaries,
        ..Default::default()
    };
    if let Some(threshold) = args.neutrals {
        opts.include_neutrals = true;
        opts.neutrals_ab_threshold = threshold;
    }

    let subset = extract_device_gray_primaries(&ti3, &opts)
        .with_context(|| format!("Cannot extract subset from {}", args.input.display()))?;

    if verbose > 0 || args.output.is_none() {
        println!(
            "{}: {} extracted, {} remaining",
            args.input.display(),
            subset.extracted.len(),
            subset.remaining.len()
        );
    }
    if verbose > 1 {
        for (rgb, xyz) in subset.extracted.iter() {
            println!(
                "  RGB {:>7.3} {:>7.3} {:>7.3}  XYZ {:>9.4} {:>9.4} {:>9.4}",
                rgb[0], rgb[1], rgb[2], xyz[0], xyz[1], xyz[2]
            );
        }
    }

    if let Some(path) = &args.output {
        super::save_cgats(path, &Cgats::from_section(subset.table))?;
    }
    Ok(())
}
