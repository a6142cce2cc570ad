//! Conversion between CAL documents and video card gamma ramps.

use chrono::NaiveDateTime;
use dcal_cgats::{round_to, Cgats, Section, Value};
use dcal_icc::{Profile, Signature, Tag, VcgtTable, VideoCardGamma};
use tracing::debug;

use crate::{CalError, CalResult};

/// Fields of a CAL table, in order.
pub const CAL_FIELDS: [&str; 4] = ["RGB_I", "RGB_R", "RGB_G", "RGB_B"];

/// `strftime` pattern of the CGATS `CREATED` keyword.
pub const CREATED_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Scale of 16-bit curve values.
const SCALE_16: f64 = 65535.0;

/// Per-channel calibration ramp in 16-bit scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCurve {
    /// Number of channels (always 3).
    pub channels: usize,
    /// Entries per channel.
    pub entry_count: usize,
    /// Bytes per entry when stored in a profile.
    pub entry_size: usize,
    /// One vector per channel, values in `0.0..=65535.0`.
    pub data: Vec<Vec<f64>>,
}

impl CalibrationCurve {
    /// Extracts the curve from a CAL document.
    ///
    /// The first section with a `DATA_FORMAT` must have exactly the fields
    /// `RGB_I RGB_R RGB_G RGB_B`. Returns `None` otherwise, or when there
    /// are no rows.
    pub fn from_cal(cal: &Cgats) -> Option<Self> {
        let section = cal.sections().iter().find(|s| s.data_format().is_some())?;
        let format = section.data_format()?;
        if let Some(missing) = CAL_FIELDS.iter().find(|f| !format.iter().any(|have| have == *f)) {
            debug!("Missing required field: {}", missing);
            return None;
        }
        if let Some(unknown) = format.iter().find(|f| !CAL_FIELDS.contains(&f.as_str())) {
            debug!("Unknown field: {}", unknown);
            return None;
        }

        let rows = section.project(&CAL_FIELDS)?;
        if rows.is_empty() {
            debug!("No entries found in calibration {}", cal.display_name());
            return None;
        }

        let mut data = vec![Vec::with_capacity(rows.len()); 3];
        for row in &rows {
            for (ch, value) in data.iter_mut().zip(&row[1..]) {
                let Some(v) = value.as_f64() else {
                    debug!("Non-numeric calibration value {} in {}", value, cal.display_name());
                    return None;
                };
                ch.push(v * SCALE_16);
            }
        }

        Some(Self {
            channels: 3,
            entry_count: rows.len(),
            entry_size: 2,
            data,
        })
    }

    /// Values scaled to `0.0..=1.0`.
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        self.data
            .iter()
            .map(|ch| ch.iter().map(|v| v / SCALE_16).collect())
            .collect()
    }

    /// Whether every channel is non-decreasing.
    pub fn is_monotonic(&self) -> bool {
        self.data
            .iter()
            .all(|ch| ch.windows(2).all(|w| w[0] <= w[1]))
    }

    /// Converts into a `vcgt` table.
    pub fn to_vcgt(&self) -> VideoCardGamma {
        let mut channels: [Vec<f64>; 3] = Default::default();
        for (dst, src) in channels.iter_mut().zip(&self.data) {
            dst.clone_from(src);
        }
        VideoCardGamma::Table(VcgtTable {
            entry_size: self.entry_size,
            channels,
        })
    }
}

/// Builds a `vcgt` from a CAL document.
pub fn cal_to_vcgt(cal: &Cgats) -> Option<VideoCardGamma> {
    CalibrationCurve::from_cal(cal).map(|curve| curve.to_vcgt())
}

/// Builds a CAL document from a `vcgt`.
///
/// Each row holds the normalized input index `i / (N - 1)` and the
/// normalized R, G, B outputs, rounded to seven decimals. A one-entry
/// ramp gets index `0`.
pub fn vcgt_to_cal(vcgt: &VideoCardGamma, created: NaiveDateTime) -> CalResult<Cgats> {
    let values = vcgt.normalized_values()?;
    if values.is_empty() {
        return Err(CalError::InvalidCurve("vcgt has no entries".into()));
    }

    let mut section = Section::new("CAL");
    section.add_keyword("DESCRIPTOR", Some("Argyll Device Calibration State"));
    section.add_keyword("ORIGINATOR", Some("vcgt"));
    section.add_keyword("CREATED", Some(&created.format(CREATED_FORMAT).to_string()));
    section.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
    section.add_keyword("COLOR_REP", Some("RGB"));
    section.add_keyword("RGB_I", None);
    section.set_data_format(&CAL_FIELDS)?;

    let last = values.len().saturating_sub(1);
    for (i, rgb) in values.iter().enumerate() {
        let index = if last == 0 { 0.0 } else { i as f64 / last as f64 };
        let mut row = Vec::with_capacity(4);
        row.push(Value::Number(round_to(index, 7)));
        row.extend(rgb.iter().map(|&v| Value::Number(round_to(v, 7))));
        section.push_row(row)?;
    }
    Ok(Cgats::from_section(section))
}

/// Builds a CAL document from the profile's `vcgt`, dated by the profile
/// header.
pub fn profile_vcgt_to_cal(profile: &Profile) -> CalResult<Cgats> {
    let vcgt = profile.vcgt().ok_or(CalError::NoCalibration)?;
    let created = profile
        .date_time()
        .unwrap_or_else(|| chrono::Utc::now().naive_utc());
    vcgt_to_cal(vcgt, created)
}

/// Wraps a CAL in a minimal display profile holding only a `desc` (the
/// CAL's file name) and the `vcgt`, so it can be loaded like a profile.
pub fn cal_to_fake_profile(cal: &Cgats) -> Option<Profile> {
    let vcgt = cal_to_vcgt(cal)?;
    let desc = cal
        .filename()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut profile = Profile::new_display(None);
    profile.insert(Signature::DESC, Tag::Description(desc));
    profile.insert(Signature::VCGT, Tag::VideoCardGamma(vcgt));
    Some(profile)
}
