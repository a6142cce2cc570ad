//! # dcal-calib
//!
//! Display calibration data handling on top of [`dcal_cgats`] and
//! [`dcal_icc`].
//!
//! # Operations
//!
//! - [`cal_to_vcgt`] / [`vcgt_to_cal`] - convert between Argyll `.cal`
//!   files and the profile `vcgt` tag
//! - [`unscale_from_video_levels`] - stretch a limited-range (16..235 or
//!   custom) curve back to full range
//! - [`extract_cal_from_profile`] - recover the calibration a profile was
//!   made with, from the embedded `.ti3`, the `vcgt` or a WCS `MS00` tag
//! - [`extract_device_gray_primaries`] - pull the gray ramp (and optionally
//!   primaries) out of a measurement file
//! - [`CalCache`] - remember which `.cal` files dispcal can update
//!
//! # Usage
//!
//! ```rust,no_run
//! use dcal_calib::{extract_cal_from_profile, ExtractOptions};
//! use dcal_icc::Profile;
//!
//! let mut profile = Profile::from_path("display.icc")?;
//! let opts = ExtractOptions {
//!     raise_on_missing: false,
//!     ..Default::default()
//! };
//! if let Some(cal) = extract_cal_from_profile(&mut profile, &opts)? {
//!     cal.write("display.cal")?;
//! }
//! # Ok::<(), dcal_calib::CalError>(())
//! ```
//!
//! # Dependencies
//!
//! - [`chrono`] - `CREATED` timestamps
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics
//!
//! # Used By
//!
//! - `dcal-cli` - command line front end

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod curve;
mod error;
mod levels;
mod recover;
mod subset;
pub mod colormath;
pub mod options;

pub use cache::{validate_cgats, CalCache, UPDATE_KEYWORDS};
pub use curve::{
    cal_to_fake_profile, cal_to_vcgt, profile_vcgt_to_cal, vcgt_to_cal, CalibrationCurve,
    CAL_FIELDS, CREATED_FORMAT,
};
pub use error::{CalError, CalResult};
pub use levels::{
    detect_video_encoding, rescale_from_video_levels, unscale_from_video_levels, VideoEncoding,
};
pub use options::{
    add_dispcal_options_to_cal, add_options_to_ti3, build_cal_from_profile,
    dispcal_options_from_profile,
};
pub use recover::{
    extract_cal_from_profile, extract_cal_from_ti3, extract_fix_copy_cal, CalibrationSource,
    ExtractOptions,
};
pub use subset::{extract_device_gray_primaries, RgbKey, RgbXyzMap, Subset, SubsetOptions};
