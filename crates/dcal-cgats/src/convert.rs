//! Conversions between CGATS file kinds.

use crate::{Cgats, CgatsError, CgatsResult};

/// Keywords that only make sense once a chart has been measured.
const MEASUREMENT_KEYWORDS: &[&str] = &["DEVICE_CLASS", "LUMINANCE_XYZ_CDM2"];

/// Converts measured chart data (TI3) into a target chart (TI1).
///
/// Only the first section is kept. The type becomes `CTI1`, descriptor and
/// originator are rewritten, `COLOR_REP` is reduced to its device part
/// (`RGB_XYZ` → `RGB`, default `RGB`), and profiling-only keywords are
/// dropped.
pub fn to_ti1(ti3: &Cgats) -> CgatsResult<Cgats> {
    let mut section = ti3
        .section(0)
        .cloned()
        .ok_or_else(|| CgatsError::InvalidOperation("TI3 has no sections".into()))?;

    section.set_file_type("CTI1");
    section.add_keyword(
        "DESCRIPTOR",
        Some("Argyll Calibration Target chart information 1"),
    );
    section.add_keyword("ORIGINATOR", Some("Argyll targen"));

    let color_rep = section
        .value("COLOR_REP")
        .and_then(|rep| rep.split('_').next())
        .filter(|device| !device.is_empty())
        .unwrap_or("RGB")
        .to_string();
    section.add_keyword("COLOR_REP", Some(&color_rep));

    for name in MEASUREMENT_KEYWORDS {
        section.remove_keyword(name);
    }
    section.remove_block("ARGYLL_COLPROF_ARGS");
    section.remove_keyword("ARGYLL_COLPROF_ARGS");

    let mut ti1 = Cgats::from_section(section);
    if let Some(name) = ti3.filename() {
        ti1.set_filename(name.with_extension("ti1"));
    }
    Ok(ti1)
}

/// Converts raw TI3 bytes to serialized TI1 bytes.
pub fn ti3_to_ti1(ti3: &[u8]) -> CgatsResult<Vec<u8>> {
    let doc = Cgats::from_bytes(ti3)?;
    Ok(to_ti1(&doc)?.to_bytes())
}
