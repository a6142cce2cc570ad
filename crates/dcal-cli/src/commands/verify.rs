//! Data field verification

use crate::VerifyArgs;
use anyhow::{Context, Result};
use dcal_cgats::RGB_XYZ_FIELDS;

pub fn run(args: VerifyArgs, verbose: u8) -> Result<()> {
    let cgats = super::load_cgats(&args.input)?;

    let fields: Vec<&str> = if args.fields.is_empty() {
        RGB_XYZ_FIELDS.to_vec()
    } else {
        args.fields.iter().map(String::as_str).collect()
    };

    let section = cgats
        .verify(&fields, !args.strict)
        .with_context(|| format!("{} failed verification", args.input.display()))?;

    println!("{}: OK", args.input.display());
    if verbose > 0 {
        println!("  type: {}", section.file_type());
        println!("  sets: {}", section.row_count());
        if let Some(format) = section.data_format() {
            println!("  fields: {}", format.join(" "));
        }
    }
    Ok(())
}
