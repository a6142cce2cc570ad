//! # dcal-icc
//!
//! ICC profile reading and writing, limited to what display calibration
//! needs.
//!
//! Profiles are kept as a raw 128-byte header plus an ordered tag table.
//! A handful of tag types are decoded; all others round-trip as bytes.
//!
//! # Decoded Tags
//!
//! - `text` - plain text; Argyll embeds the measurement `.ti3` in `targ`
//! - `desc` / `mluc` - profile description
//! - `vcgt` - video card gamma ramp, table or formula ([`VideoCardGamma`])
//! - `MS10` - Windows Color System models ([`WcsProfiles`]), from which a
//!   formula `vcgt` can be derived
//!
//! # Example
//!
//! ```rust,no_run
//! use dcal_icc::{Profile, Signature};
//!
//! let profile = Profile::from_path("display.icc").unwrap();
//! if let Some(vcgt) = profile.vcgt() {
//!     println!("{} entries", vcgt.entry_count());
//! }
//! if let Some(ti3) = profile.text(Signature::TARG) {
//!     println!("{} bytes of measurement data", ti3.len());
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`byteorder`] - big-endian field access
//! - [`chrono`] - header creation date
//! - [`quick_xml`] - WCS device model parsing
//! - [`thiserror`] - Error handling

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod bytes;
mod error;
mod profile;
mod tag;
pub mod vcgt;
pub mod wcs;

pub use error::{IccError, IccResult};
pub use profile::{Profile, HEADER_SIZE};
pub use tag::{Signature, Tag};
pub use vcgt::{FormulaChannel, VcgtTable, VideoCardGamma, FORMULA_TABLE_SIZE};
pub use wcs::WcsProfiles;
