//! The CGATS document: an ordered collection of sections.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::parse::{check_counts, parse_lines};
use crate::{CgatsError, CgatsResult, Row, Section};

/// A parsed CGATS file (`.ti1`, `.ti3`, `.cal`, ...).
///
/// Sections are indexed by position: 0 is the first table in the file.
/// A `.ti3` produced by a calibrated profiling run usually carries the
/// measurements in section 0 and the calibration (`CAL`) in section 1.
///
/// # Example
///
/// ```rust
/// use dcal_cgats::Cgats;
///
/// let text = b"CAL\nBEGIN_DATA_FORMAT\nRGB_I RGB_R RGB_G RGB_B\nEND_DATA_FORMAT\n\
///              BEGIN_DATA\n0 0 0 0\n1 1 1 1\nEND_DATA\n";
/// let cal = Cgats::from_bytes(text).unwrap();
/// let section = cal.query_first(&["RGB_I", "RGB_R"]).unwrap();
/// assert_eq!(section.row_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cgats {
    sections: Vec<Section>,
    filename: Option<PathBuf>,
    mtime: Option<SystemTime>,
}

impl Cgats {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding a single section.
    pub fn from_section(section: Section) -> Self {
        Self {
            sections: vec![section],
            ..Default::default()
        }
    }

    /// Reads and parses a CGATS file.
    ///
    /// Records the file name and modification time.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CgatsResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();
        debug!("Reading CGATS {}", path.display());
        let mut doc = Self::from_bytes(&bytes)?;
        doc.filename = Some(path.to_path_buf());
        doc.mtime = mtime;
        Ok(doc)
    }

    /// Parses CGATS data from a byte buffer.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; CGATS is ASCII in
    /// practice and stray bytes only ever appear inside quoted strings.
    pub fn from_bytes(bytes: &[u8]) -> CgatsResult<Self> {
        let text = String::from_utf8_lossy(bytes);
        Self::from_lines(text.lines())
    }

    /// Parses CGATS data from individual lines.
    pub fn from_lines<'a, I>(lines: I) -> CgatsResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Ok(Self {
            sections: parse_lines(lines)?,
            ..Default::default()
        })
    }

    /// Serializes the whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Writes the document to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> CgatsResult<()> {
        fs::write(path.as_ref(), self.to_bytes())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// All sections.
    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section by index.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Mutable section by index.
    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Appends a section and returns its index.
    pub fn push_section(&mut self, section: Section) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    /// Keeps only the section at `index`.
    pub fn retain_section(&mut self, index: usize) -> CgatsResult<()> {
        if index >= self.sections.len() {
            return Err(CgatsError::InvalidOperation(format!(
                "no section {} (document has {})",
                index,
                self.sections.len()
            )));
        }
        let keep = self.sections.swap_remove(index);
        self.sections = vec![keep];
        Ok(())
    }

    /// Number of sections.
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has no sections.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Source file, if the document was read from disk.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Sets the source file name.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Modification time of the source file when it was read.
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    /// File name for messages; `<memory>` for documents not read from disk.
    pub fn display_name(&self) -> String {
        self.filename
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First section whose `DATA_FORMAT` contains all `required_fields`.
    pub fn query_first<S: AsRef<str>>(&self, required_fields: &[S]) -> Option<&Section> {
        self.sections.iter().find(|s| s.has_fields(required_fields))
    }

    /// Mutable variant of [`Cgats::query_first`].
    pub fn query_first_mut<S: AsRef<str>>(&mut self, required_fields: &[S]) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.has_fields(required_fields))
    }

    /// Value of `keyword` in the first section that defines it with a value.
    ///
    /// Named text blocks are searched as well.
    pub fn query_value_first(&self, keyword: &str) -> Option<&str> {
        self.sections
            .iter()
            .find_map(|s| s.value(keyword).or_else(|| s.block(keyword)))
    }

    /// Rows of the first section containing `field_names`, projected to them.
    pub fn query_values<S: AsRef<str>>(&self, field_names: &[S]) -> Option<Vec<Row>> {
        self.query_first(field_names)?.project(field_names)
    }

    /// First section that carries a `DATA` table.
    pub fn first_data_section(&self) -> Option<&Section> {
        self.sections.iter().find(|s| s.has_data())
    }

    /// Finds the section holding `required` fields and checks its integrity.
    ///
    /// # Errors
    ///
    /// - [`CgatsError::MissingKey`] if no section has all required fields
    /// - [`CgatsError::Invalid`] if `NUMBER_OF_SETS` or `DATA_FORMAT` is
    ///   missing, or `NUMBER_OF_SETS` disagrees with the row count
    /// - [`CgatsError::Structural`] if `ignore_unknown` is false and the
    ///   section has fields other than the required ones
    pub fn verify<S: AsRef<str>>(
        &self,
        required: &[S],
        ignore_unknown: bool,
    ) -> CgatsResult<&Section> {
        let section = self.query_first(required).ok_or_else(|| {
            let names: Vec<&str> = required.iter().map(AsRef::as_ref).collect();
            CgatsError::MissingKey(format!("missing required fields: {}", names.join(", ")))
        })?;

        if section.number_of_sets().is_none() {
            return Err(CgatsError::Invalid("missing NUMBER_OF_SETS".into()));
        }
        let format = section
            .data_format()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| CgatsError::Invalid("missing DATA_FORMAT".into()))?;
        check_counts(section)?;

        if !ignore_unknown {
            if let Some(unknown) = format
                .iter()
                .find(|f| !required.iter().any(|r| r.as_ref() == f.as_str()))
            {
                return Err(CgatsError::Structural(format!("unknown field: {}", unknown)));
            }
        }
        Ok(section)
    }

    /// Verifies the document has a table of RGB device values with XYZ readings.
    pub fn verify_ti1_rgb_xyz(&self) -> CgatsResult<&Section> {
        self.verify(&RGB_XYZ_FIELDS, true)
    }
}

/// The six fields of an RGB → XYZ device response table.
pub const RGB_XYZ_FIELDS: [&str; 6] = ["RGB_R", "RGB_G", "RGB_B", "XYZ_X", "XYZ_Y", "XYZ_Z"];
