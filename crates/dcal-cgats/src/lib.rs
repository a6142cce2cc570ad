//! # dcal-cgats
//!
//! CGATS.17 text files as written and read by ArgyllCMS.
//!
//! Calibration (`.cal`), target (`.ti1`) and measurement (`.ti3`) files all
//! share this format: a file identifier line, header keywords, an optional
//! `DATA_FORMAT` listing field names and a `DATA` table with one row per
//! sample. A file may contain several such tables ("sections").
//!
//! # Types
//!
//! - [`Cgats`] - whole document, an ordered list of sections
//! - [`Section`] - one table with keywords, text blocks and rows
//! - [`Value`] - a single cell: number or text
//!
//! # Usage
//!
//! ```rust
//! use dcal_cgats::{Cgats, Section, Value};
//!
//! let mut cal = Section::new("CAL");
//! cal.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
//! cal.set_data_format(&["RGB_I", "RGB_R", "RGB_G", "RGB_B"]).unwrap();
//! cal.push_row(vec![Value::Number(0.0); 4]).unwrap();
//! cal.push_row(vec![Value::Number(1.0); 4]).unwrap();
//!
//! let doc = Cgats::from_section(cal);
//! let back = Cgats::from_bytes(&doc.to_bytes()).unwrap();
//! assert_eq!(back.query_value_first("DEVICE_CLASS"), Some("DISPLAY"));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics
//!
//! # Used By
//!
//! - `dcal-icc` - text tags holding embedded calibration
//! - `dcal-calib` - calibration extraction and measurement subsets

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod document;
mod error;
mod parse;
mod section;
mod value;
mod write;
pub mod convert;

pub use document::{Cgats, RGB_XYZ_FIELDS};
pub use error::{CgatsError, CgatsResult};
pub use section::{Keyword, Row, RowView, Section, TextBlock, STANDARD_KEYWORDS};
pub use value::{format_number, round_to, Value, TEXT_FIELDS};
pub use write::FILE_IDENTIFIER_WIDTH;
pub use convert::{ti3_to_ti1, to_ti1};
