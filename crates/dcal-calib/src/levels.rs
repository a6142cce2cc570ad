//! Video-level (limited range) encoding of calibration curves.
//!
//! When a display is driven with video levels, dispcal stores a curve whose
//! output already spans only `black..white` of 0..255. To load the curve
//! into a full-range video card LUT it has to be stretched back to 0..1.

use dcal_cgats::{round_to, Cgats, CgatsError, CgatsResult, Section};
use dcal_icc::Profile;
use tracing::{info, warn};

use crate::colormath::convert_range;
use crate::curve::profile_vcgt_to_cal;
use crate::CalResult;

/// Video encoding declared by a CAL or TI3 document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoEncoding {
    /// No encoding keyword present (full range).
    NotPresent,
    /// `OUTPUT_ENCODING` exists but is not two numbers.
    Invalid,
    /// Black and white output levels on the 0..255 scale.
    Levels {
        /// Black level.
        black: f64,
        /// White level.
        white: f64,
    },
}

/// Reads `TV_OUTPUT_ENCODING` / `OUTPUT_ENCODING`.
///
/// `TV_OUTPUT_ENCODING "YES"` means 16..235.
pub fn detect_video_encoding(cgats: &Cgats) -> VideoEncoding {
    if cgats.query_value_first("TV_OUTPUT_ENCODING") == Some("YES") {
        return VideoEncoding::Levels {
            black: 16.0,
            white: 235.0,
        };
    }
    let Some(encoding) = cgats.query_value_first("OUTPUT_ENCODING") else {
        return VideoEncoding::NotPresent;
    };
    let parsed: Result<Vec<f64>, _> = encoding.split_whitespace().map(str::parse).collect();
    match parsed.as_deref() {
        Ok([black, white]) => VideoEncoding::Levels {
            black: *black,
            white: *white,
        },
        _ => VideoEncoding::Invalid,
    }
}

/// Rescales a CAL according to a detected encoding.
///
/// Only [`VideoEncoding::Levels`] changes anything.
pub fn rescale_from_video_levels(
    profile: &Profile,
    cal: Cgats,
    encoding: VideoEncoding,
) -> CalResult<Cgats> {
    match encoding {
        VideoEncoding::Levels { black, white } => unscale_from_video_levels(profile, cal, black, white),
        VideoEncoding::NotPresent | VideoEncoding::Invalid => Ok(cal),
    }
}

/// Stretches a video-level CAL back to full range.
///
/// Values are remapped from `black/256 .. white/256` (scaled by
/// 65536/65535, since extra precision comes from bit shifting) to 0..1 and
/// clamped. If any value lies outside the declared range the metadata is
/// wrong: nothing is rescaled and the CAL is rebuilt from the profile
/// `vcgt` as-is.
///
/// On success the encoding is recorded in section 0.
pub fn unscale_from_video_levels(
    profile: &Profile,
    mut cal: Cgats,
    black: f64,
    white: f64,
) -> CalResult<Cgats> {
    if white == 0.0 || (black == 0.0 && white == 255.0) {
        info!(
            "No need to un-scale vcgt from video levels ({}..{})",
            black, white
        );
        return Ok(cal);
    }

    let Some(idx) = cal.sections().iter().position(|s| s.row_count() > 0) else {
        warn!("No un-scaling applied, no calibration data");
        return Ok(cal);
    };
    info!("Un-scaling vcgt from video levels ({}..{})", black, white);

    let applied = match cal.section_mut(idx) {
        Some(section) => unscale_section(section, black, white)?,
        None => true,
    };
    if !applied {
        return profile_vcgt_to_cal(profile);
    }

    if let Some(section) = cal.section_mut(0) {
        if black == 16.0 && white == 235.0 {
            section.add_keyword("TV_OUTPUT_ENCODING", Some("YES"));
        } else {
            section.add_keyword("OUTPUT_ENCODING", Some(&format!("{:?} {:?}", black, white)));
        }
    }
    Ok(cal)
}

/// Remaps the RGB columns in place. Returns `false`, leaving the section
/// untouched, if a value lies outside the encoding range.
fn unscale_section(section: &mut Section, black: f64, white: f64) -> CgatsResult<bool> {
    let old_min = black / 256.0 * (65536.0 / 65535.0);
    let old_max = white / 256.0 * (65536.0 / 65535.0);
    let (lo, hi) = (round_to(black, 2), round_to(white, 2));

    let mut updates = Vec::with_capacity(section.row_count() * 3);
    for (i, row) in section.iter_rows().enumerate() {
        for field in ["RGB_R", "RGB_G", "RGB_B"] {
            let v_old = row
                .number(field)
                .ok_or_else(|| CgatsError::MissingKey(format!("{} in row {}", field, i)))?;
            let lvl = round_to(v_old * (65535.0 / 65536.0) * 256.0, 2);
            if lvl < lo || lvl > hi {
                warn!(
                    "Metadata claims video levels ({}..{}) but vcgt value {} exceeds encoding range, using values as-is",
                    lo, hi, lvl
                );
                return Ok(false);
            }
            let v_new = convert_range(v_old, old_min, old_max, 0.0, 1.0).clamp(0.0, 1.0);
            updates.push((i, field, v_new));
        }
    }
    for (i, field, v) in updates {
        section.set_value(i, field, v.into())?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dcal_icc::{Signature, Tag, VcgtTable, VideoCardGamma};

    use crate::curve::CAL_FIELDS;

    /// CAL whose outputs span exactly `black..white` video levels.
    fn video_cal(black: f64, white: f64, n: usize) -> Cgats {
        let mut s = Section::new("CAL");
        s.set_data_format(&CAL_FIELDS).unwrap();
        for i in 0..n {
            let x = i as f64 / (n - 1) as f64;
            let v = (black + (white - black) * x) / 256.0 * (65536.0 / 65535.0);
            s.push_row(vec![x.into(), v.into(), v.into(), v.into()]).unwrap();
        }
        Cgats::from_section(s)
    }

    fn profile_with_linear_vcgt() -> Profile {
        let ramp: Vec<f64> = (0..4).map(|i| i as f64 / 3.0 * 65535.0).collect();
        let mut p = Profile::new_display(None);
        p.insert(
            Signature::VCGT,
            Tag::VideoCardGamma(VideoCardGamma::Table(VcgtTable::new([
                ramp.clone(),
                ramp.clone(),
                ramp,
            ]))),
        );
        p
    }

    #[test]
    fn detect() {
        let mut s = Section::new("CAL");
        assert_eq!(
            detect_video_encoding(&Cgats::from_section(s.clone())),
            VideoEncoding::NotPresent
        );
        s.add_keyword("OUTPUT_ENCODING", Some("8.0 247.0"));
        assert_eq!(
            detect_video_encoding(&Cgats::from_section(s.clone())),
            VideoEncoding::Levels { black: 8.0, white: 247.0 }
        );
        s.add_keyword("OUTPUT_ENCODING", Some("video"));
        assert_eq!(
            detect_video_encoding(&Cgats::from_section(s.clone())),
            VideoEncoding::Invalid
        );
        s.add_keyword("TV_OUTPUT_ENCODING", Some("YES"));
        assert_eq!(
            detect_video_encoding(&Cgats::from_section(s)),
            VideoEncoding::Levels { black: 16.0, white: 235.0 }
        );
    }

    #[test]
    fn full_range_is_identity() {
        let profile = profile_with_linear_vcgt();
        let cal = video_cal(0.0, 255.0, 5);
        let out = unscale_from_video_levels(&profile, cal.clone(), 0.0, 255.0).unwrap();
        assert_eq!(out, cal);
        let out = unscale_from_video_levels(&profile, cal.clone(), 16.0, 0.0).unwrap();
        assert_eq!(out, cal);
    }

    #[test]
    fn tv_levels_unscale() {
        let profile = profile_with_linear_vcgt();
        let out = unscale_from_video_levels(&profile, video_cal(16.0, 235.0, 5), 16.0, 235.0).unwrap();
        let s = &out.sections()[0];
        assert_eq!(s.value("TV_OUTPUT_ENCODING"), Some("YES"));
        assert!(!s.has_keyword("OUTPUT_ENCODING"));
        assert_relative_eq!(s.row(0).unwrap().number("RGB_R").unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(s.row(2).unwrap().number("RGB_G").unwrap(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(s.row(4).unwrap().number("RGB_B").unwrap(), 1.0, epsilon = 1e-9);

        assert_eq!(
            detect_video_encoding(&out),
            VideoEncoding::Levels { black: 16.0, white: 235.0 }
        );
    }

    #[test]
    fn custom_levels_recorded() {
        let profile = profile_with_linear_vcgt();
        let out = unscale_from_video_levels(&profile, video_cal(8.0, 247.0, 3), 8.0, 247.0).unwrap();
        assert_eq!(out.sections()[0].value("OUTPUT_ENCODING"), Some("8.0 247.0"));
        assert_eq!(
            detect_video_encoding(&out),
            VideoEncoding::Levels { black: 8.0, white: 247.0 }
        );
    }

    #[test]
    fn out_of_range_falls_back_to_vcgt() {
        let profile = profile_with_linear_vcgt();
        // Full-range data claimed to be video levels.
        let out = unscale_from_video_levels(&profile, video_cal(0.0, 255.0, 5), 16.0, 235.0).unwrap();
        let s = &out.sections()[0];
        assert_eq!(s.value("ORIGINATOR"), Some("vcgt"));
        assert!(!s.has_keyword("TV_OUTPUT_ENCODING"));
        assert_eq!(s.row_count(), 4);
        assert_relative_eq!(s.row(3).unwrap().number("RGB_R").unwrap(), 1.0);
    }

    #[test]
    fn no_data_unchanged() {
        let profile = profile_with_linear_vcgt();
        let cal = Cgats::from_section(Section::new("CAL"));
        let out = unscale_from_video_levels(&profile, cal.clone(), 16.0, 235.0).unwrap();
        assert_eq!(out, cal);
    }

    #[test]
    fn rescale_dispatch() {
        let profile = profile_with_linear_vcgt();
        let cal = video_cal(16.0, 235.0, 3);
        let same = rescale_from_video_levels(&profile, cal.clone(), VideoEncoding::Invalid).unwrap();
        assert_eq!(same, cal);
        let scaled = rescale_from_video_levels(
            &profile,
            cal,
            VideoEncoding::Levels { black: 16.0, white: 235.0 },
        )
        .unwrap();
        assert_eq!(scaled.sections()[0].value("TV_OUTPUT_ENCODING"), Some("YES"));
    }
}
