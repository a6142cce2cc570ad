//! Recovering the calibration a profile was made with.
//!
//! Argyll embeds the measurement `.ti3` in the `targ` tag; for calibrated
//! displays that file carries the `CAL` table as its last section. Profiles
//! from other tools may only have a `vcgt` (or, on Windows, a WCS `MS00`
//! tag from which one can be derived).

use std::path::{Path, PathBuf};

use dcal_cgats::Cgats;
use dcal_icc::{Profile, Signature, Tag};
use tracing::{debug, info, warn};

use crate::curve::profile_vcgt_to_cal;
use crate::levels::{detect_video_encoding, rescale_from_video_levels};
use crate::options::{build_cal_from_profile, dispcal_options_from_profile};
use crate::{CalError, CalResult};

/// Options for [`extract_cal_from_profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Also write the recovered CAL here.
    pub out_cal_path: Option<PathBuf>,
    /// Fail with [`CalError::NoCalibration`] instead of returning `None`.
    pub raise_on_missing: bool,
    /// Prefer the embedded CAL over the `vcgt` when both exist.
    pub prefer_cal: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            out_cal_path: None,
            raise_on_missing: true,
            prefer_cal: false,
        }
    }
}

/// Where a profile's calibration comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationSource {
    /// CAL text embedded in the characterization target.
    Target(String),
    /// The profile `vcgt` (native or derived from `MS00`).
    Vcgt,
}

impl CalibrationSource {
    /// Picks the calibration source, in order:
    ///
    /// 1. a non-empty `CAL` section in the `targ` text (or `CIED` when there
    ///    is no `targ`)
    /// 2. the `vcgt` tag
    /// 3. a `vcgt` derived from `MS00`, which is inserted into the profile
    pub fn resolve(profile: &mut Profile) -> CalResult<Option<Self>> {
        let target = match profile.tag(Signature::TARG) {
            Some(tag) => Some(tag),
            None => profile.tag(Signature::CIED),
        };
        if let Some(Tag::Text(ti3)) = target {
            let cal = extract_cal_from_ti3(ti3);
            if !cal.is_empty() {
                return Ok(Some(Self::Target(cal)));
            }
        }

        if !profile.has_tag(Signature::VCGT) {
            if let Some(wcs) = profile.wcs_profiles() {
                let derived = wcs.vcgt().map_err(CalError::extraction)?;
                if let Some(vcgt) = derived {
                    debug!("Derived vcgt from WCS MS00 tag");
                    profile.insert(Signature::VCGT, Tag::VideoCardGamma(vcgt));
                }
            }
        }
        Ok(profile.vcgt().map(|_| Self::Vcgt))
    }
}

/// Returns the `CAL` section of TI3 text.
///
/// Lines are trimmed; the section runs from a line reading exactly `CAL`
/// (padded to the 7-character identifier width) through `END_DATA`.
/// Empty if there is no such section.
pub fn extract_cal_from_ti3(ti3: &str) -> String {
    let mut lines = Vec::new();
    let mut found = false;
    for line in ti3.lines().map(str::trim) {
        if line == "CAL" {
            found = true;
            lines.push("CAL    ");
            continue;
        }
        if found {
            lines.push(line);
            if line == "END_DATA" {
                break;
            }
        }
    }
    lines.join("\n")
}

/// Extracts the calibration from a profile.
///
/// The embedded CAL is used as-is when `prefer_cal` is set or the profile
/// has no native `vcgt`. Otherwise the `vcgt` wins, un-scaled according to
/// the video encoding declared in the embedded CAL.
///
/// Returns `Ok(None)` when nothing is found and `raise_on_missing` is off.
pub fn extract_cal_from_profile(
    profile: &mut Profile,
    opts: &ExtractOptions,
) -> CalResult<Option<Cgats>> {
    // A native vcgt only; one derived from MS00 does not outrank the target.
    let has_native_vcgt = profile.vcgt().is_some();

    let cal = match CalibrationSource::resolve(profile)? {
        None if opts.raise_on_missing => return Err(CalError::NoCalibration),
        None => {
            info!("Profile has no calibration data");
            return Ok(None);
        }
        Some(CalibrationSource::Target(text)) => {
            let embedded = Cgats::from_bytes(text.as_bytes()).map_err(CalError::extraction)?;
            if opts.prefer_cal || !has_native_vcgt {
                embedded
            } else {
                let encoding = detect_video_encoding(&embedded);
                let cal = profile_vcgt_to_cal(profile).map_err(CalError::extraction)?;
                rescale_from_video_levels(profile, cal, encoding)?
            }
        }
        Some(CalibrationSource::Vcgt) => profile_vcgt_to_cal(profile).map_err(CalError::extraction)?,
    };

    if let Some(path) = &opts.out_cal_path {
        cal.write(path)?;
    }
    Ok(Some(cal))
}

/// Returns the `CAL` lines embedded in a profile, with the header keywords
/// needed to make the file updatable, and optionally writes them.
///
/// The keywords are derived from the dispcal arguments stored with the
/// measurements and inserted after `DEVICE_CLASS "DISPLAY"`. Returns
/// `Ok(None)` when the profile has no embedded CAL.
pub fn extract_fix_copy_cal(source: &Path, target: Option<&Path>) -> CalResult<Option<Vec<String>>> {
    let profile = Profile::from_path(source)?;
    let ti3 = match (profile.text(Signature::CIED), profile.text(Signature::TARG)) {
        (Some(cied), _) if !cied.is_empty() => cied,
        (_, Some(targ)) => targ,
        _ => return Ok(None),
    };

    let cal = extract_cal_from_ti3(ti3);
    if cal.is_empty() {
        return Ok(None);
    }

    let options = dispcal_options_from_profile(&profile);
    let mut lines = Vec::new();
    for line in cal.lines() {
        lines.push(line.to_string());
        if line == "DEVICE_CLASS \"DISPLAY\"" {
            if options.is_empty() {
                warn!("No dispcal arguments in {}, CAL left as-is", source.display());
            } else {
                build_cal_from_profile(&mut lines, &options);
            }
        }
    }

    if let Some(target) = target {
        std::fs::write(target, lines.join("\n"))?;
    }
    Ok(Some(lines))
}
