//! CGATS text writer.
//!
//! Output follows ArgyllCMS conventions: the file identifier is padded to
//! seven characters, non-standard keywords are announced with `KEYWORD`,
//! and `NUMBER_OF_FIELDS` / `NUMBER_OF_SETS` are derived from the data.

use std::fmt;

use crate::section::COMPUTED_KEYWORDS;
use crate::{Cgats, Section};

/// Minimum width of a CGATS file identifier line.
pub const FILE_IDENTIFIER_WIDTH: usize = 7;

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<width$}", self.file_type(), width = FILE_IDENTIFIER_WIDTH)?;
        writeln!(f)?;

        for kw in self.keywords() {
            if COMPUTED_KEYWORDS.contains(&kw.name.as_str()) {
                continue;
            }
            if kw.declared {
                writeln!(f, "KEYWORD \"{}\"", kw.name)?;
            }
            if let Some(value) = &kw.value {
                writeln!(f, "{} \"{}\"", kw.name, value)?;
            }
        }

        for block in self.blocks() {
            writeln!(f, "BEGIN_{}", block.name)?;
            writeln!(f, "{}", block.content)?;
            writeln!(f, "END_{}", block.name)?;
        }

        if let Some(fields) = self.data_format() {
            writeln!(f)?;
            writeln!(f, "NUMBER_OF_FIELDS {}", fields.len())?;
            writeln!(f, "BEGIN_DATA_FORMAT")?;
            writeln!(f, "{}", fields.join(" "))?;
            writeln!(f, "END_DATA_FORMAT")?;
        }

        if self.has_data() {
            writeln!(f)?;
            writeln!(f, "NUMBER_OF_SETS {}", self.row_count())?;
            writeln!(f, "BEGIN_DATA")?;
            for row in self.rows() {
                let line: Vec<String> = row.iter().map(ToString::to_string).collect();
                writeln!(f, "{}", line.join(" "))?;
            }
            writeln!(f, "END_DATA")?;
        }

        Ok(())
    }
}

impl fmt::Display for Cgats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

impl Section {
    /// Serializes this section as a standalone CGATS file.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}
