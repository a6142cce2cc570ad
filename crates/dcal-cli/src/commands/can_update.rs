//! dispcal update check

use crate::CanUpdateArgs;
use anyhow::{bail, Result};
use dcal_calib::{CalCache, UPDATE_KEYWORDS};

pub fn run(args: CanUpdateArgs, verbose: u8) -> Result<()> {
    let cache = CalCache::new();
    let mut failed = 0usize;

    for path in &args.input {
        if cache.can_update_cal(path) {
            println!("{}: yes", path.display());
        } else {
            failed += 1;
            println!("{}: no", path.display());
            if verbose > 0 {
                println!(
                    "  requires DEVICE_CLASS \"DISPLAY\" and {}",
                    UPDATE_KEYWORDS.join(", ")
                );
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) cannot be updated", failed, args.input.len());
    }
    Ok(())
}
