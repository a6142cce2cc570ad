//! A single CGATS table: header keywords, data format and data rows.

use crate::{CgatsError, CgatsResult, Value};

/// Keywords defined by the CGATS standard itself.
///
/// Anything else must be announced with a `KEYWORD "NAME"` line when written.
pub const STANDARD_KEYWORDS: &[&str] = &[
    "ORIGINATOR",
    "DESCRIPTOR",
    "CREATED",
    "MANUFACTURER",
    "MANUFACTURE",
    "PROD_DATE",
    "SERIAL",
    "MATERIAL",
    "INSTRUMENTATION",
    "MEASUREMENT_SOURCE",
    "PRINT_CONDITIONS",
    "FILE_DESCRIPTOR",
    "NUMBER_OF_FIELDS",
    "NUMBER_OF_SETS",
];

/// Keywords derived from the table shape rather than stored verbatim.
pub(crate) const COMPUTED_KEYWORDS: &[&str] = &["NUMBER_OF_FIELDS", "NUMBER_OF_SETS"];

/// A header keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    /// Keyword name (case-sensitive).
    pub name: String,
    /// Value, or `None` for presence-only flags such as `RGB_I`.
    pub value: Option<String>,
    /// Whether the keyword is announced with a `KEYWORD` line.
    pub declared: bool,
}

/// A named free-text block (`BEGIN_<NAME>` .. `END_<NAME>`).
///
/// Argyll stores tool arguments this way, e.g. `ARGYLL_COLPROF_ARGS`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Block name without the `BEGIN_`/`END_` prefix.
    pub name: String,
    /// Block content.
    pub content: String,
}

/// One row of a `DATA` table, values aligned with `DATA_FORMAT`.
pub type Row = Vec<Value>;

/// Borrowed view of a row with field-name access.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    fields: &'a [String],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    /// Value of `field`, if the field exists.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        let idx = self.fields.iter().position(|f| f == field)?;
        self.values.get(idx)
    }

    /// Numeric value of `field`.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// Whether `field` is present in this row.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// All values in `DATA_FORMAT` order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// A CGATS section (one table of a possibly multi-table file).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    file_type: String,
    keywords: Vec<Keyword>,
    blocks: Vec<TextBlock>,
    data_format: Option<Vec<String>>,
    data: Option<Vec<Row>>,
}

impl Section {
    /// Creates an empty section with the given file type identifier
    /// (`CAL`, `CTI1`, `CTI3`, ...).
    pub fn new(file_type: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            ..Default::default()
        }
    }

    /// File type identifier.
    #[inline]
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// Replaces the file type identifier.
    pub fn set_file_type(&mut self, file_type: impl Into<String>) {
        self.file_type = file_type.into();
    }

    // ------------------------------------------------------------------
    // Keywords
    // ------------------------------------------------------------------

    /// Header keywords in file order.
    #[inline]
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Looks up a keyword entry.
    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.name == name)
    }

    /// Whether the keyword is present (with or without value).
    pub fn has_keyword(&self, name: &str) -> bool {
        self.keyword(name).is_some()
    }

    /// Value of a keyword, if present and not a bare flag.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.keyword(name).and_then(|k| k.value.as_deref())
    }

    /// Sets a keyword, replacing the value of an existing one in place.
    ///
    /// Non-standard keywords are marked as declared so they are written
    /// with a `KEYWORD` line.
    pub fn add_keyword(&mut self, name: &str, value: Option<&str>) {
        let declared = !STANDARD_KEYWORDS.contains(&name);
        match self.keywords.iter_mut().find(|k| k.name == name) {
            Some(existing) => {
                existing.value = value.map(str::to_string);
                existing.declared |= declared;
            }
            None => self.keywords.push(Keyword {
                name: name.to_string(),
                value: value.map(str::to_string),
                declared,
            }),
        }
    }

    /// Marks a keyword as declared without touching its value.
    pub(crate) fn declare_keyword(&mut self, name: &str) {
        match self.keywords.iter_mut().find(|k| k.name == name) {
            Some(existing) => existing.declared = true,
            None => self.keywords.push(Keyword {
                name: name.to_string(),
                value: None,
                declared: true,
            }),
        }
    }

    /// Sets a keyword value without changing its declared state.
    pub(crate) fn set_raw_keyword(&mut self, name: &str, value: Option<String>) {
        match self.keywords.iter_mut().find(|k| k.name == name) {
            Some(existing) => {
                if value.is_some() {
                    existing.value = value;
                }
            }
            None => self.keywords.push(Keyword {
                name: name.to_string(),
                value,
                declared: false,
            }),
        }
    }

    /// Removes a keyword and returns it.
    pub fn remove_keyword(&mut self, name: &str) -> Option<Keyword> {
        let idx = self.keywords.iter().position(|k| k.name == name)?;
        Some(self.keywords.remove(idx))
    }

    // ------------------------------------------------------------------
    // Text blocks
    // ------------------------------------------------------------------

    /// Adds (or replaces) a named text block.
    pub fn add_section(&mut self, name: &str, content: &str) {
        match self.blocks.iter_mut().find(|b| b.name == name) {
            Some(block) => block.content = content.to_string(),
            None => self.blocks.push(TextBlock {
                name: name.to_string(),
                content: content.to_string(),
            }),
        }
    }

    /// Text blocks in file order.
    #[inline]
    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Content of a named text block.
    pub fn block(&self, name: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.content.as_str())
    }

    /// Removes a named text block and returns it.
    pub fn remove_block(&mut self, name: &str) -> Option<TextBlock> {
        let idx = self.blocks.iter().position(|b| b.name == name)?;
        Some(self.blocks.remove(idx))
    }

    // ------------------------------------------------------------------
    // Data format & rows
    // ------------------------------------------------------------------

    /// Field names of the `DATA_FORMAT` child, if present.
    pub fn data_format(&self) -> Option<&[String]> {
        self.data_format.as_deref()
    }

    /// Sets the data format.
    ///
    /// Fails if rows exist and the field count would change.
    pub fn set_data_format<S: AsRef<str>>(&mut self, fields: &[S]) -> CgatsResult<()> {
        if let Some(rows) = &self.data {
            if !rows.is_empty() && rows[0].len() != fields.len() {
                return Err(CgatsError::InvalidOperation(format!(
                    "cannot change DATA_FORMAT from {} to {} fields with existing data",
                    rows[0].len(),
                    fields.len()
                )));
            }
        }
        self.data_format = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        Ok(())
    }

    /// Whether `DATA_FORMAT` contains every one of `fields`.
    pub fn has_fields<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        match &self.data_format {
            Some(format) => fields
                .iter()
                .all(|f| format.iter().any(|have| have == f.as_ref())),
            None => false,
        }
    }

    /// Column index of a field.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.data_format.as_ref()?.iter().position(|f| f == field)
    }

    /// Whether a `DATA` child exists (possibly empty).
    #[inline]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Raw rows.
    pub fn rows(&self) -> &[Row] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Row view with field-name access.
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        let fields = self.data_format.as_deref()?;
        let values = self.data.as_ref()?.get(index)?;
        Some(RowView { fields, values })
    }

    /// Iterates rows as views.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        let fields = self.data_format.as_deref().unwrap_or(&[]);
        self.rows().iter().map(move |values| RowView { fields, values })
    }

    /// Creates an empty `DATA` child. Requires a data format.
    pub fn ensure_data(&mut self) -> CgatsResult<()> {
        if self.data_format.is_none() {
            return Err(CgatsError::Structural(
                "DATA requires a sibling DATA_FORMAT".into(),
            ));
        }
        if self.data.is_none() {
            self.data = Some(Vec::new());
            self.sync_number_of_sets();
        }
        Ok(())
    }

    /// Appends a row. Keeps `NUMBER_OF_SETS` in sync.
    pub fn push_row(&mut self, row: Row) -> CgatsResult<()> {
        let field_count = self
            .data_format
            .as_ref()
            .map(Vec::len)
            .ok_or_else(|| CgatsError::Structural("DATA requires a sibling DATA_FORMAT".into()))?;
        if row.len() != field_count {
            return Err(CgatsError::Structural(format!(
                "row has {} values, DATA_FORMAT has {} fields",
                row.len(),
                field_count
            )));
        }
        self.data.get_or_insert_with(Vec::new).push(row);
        self.sync_number_of_sets();
        Ok(())
    }

    /// Overwrites a single cell.
    pub fn set_value(&mut self, row: usize, field: &str, value: Value) -> CgatsResult<()> {
        let idx = self
            .field_index(field)
            .ok_or_else(|| CgatsError::MissingKey(field.to_string()))?;
        let rows = self
            .data
            .as_mut()
            .ok_or_else(|| CgatsError::InvalidOperation("section has no DATA".into()))?;
        let target = rows
            .get_mut(row)
            .ok_or_else(|| CgatsError::Value(format!("row {} out of range", row)))?;
        target[idx] = value;
        Ok(())
    }

    /// Rows projected onto `fields`, or `None` if any field is missing.
    pub fn project<S: AsRef<str>>(&self, fields: &[S]) -> Option<Vec<Row>> {
        let indices: Option<Vec<usize>> =
            fields.iter().map(|f| self.field_index(f.as_ref())).collect();
        let indices = indices?;
        Some(
            self.rows()
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        )
    }

    /// Declared `NUMBER_OF_SETS`, if present and numeric.
    pub fn number_of_sets(&self) -> Option<usize> {
        self.value("NUMBER_OF_SETS")?.trim().parse().ok()
    }

    pub(crate) fn set_data_unchecked(&mut self, rows: Vec<Row>) {
        self.data = Some(rows);
    }

    pub(crate) fn data_mut(&mut self) -> &mut Vec<Row> {
        self.data.get_or_insert_with(Vec::new)
    }

    fn sync_number_of_sets(&mut self) {
        let count = self.row_count().to_string();
        self.set_raw_keyword("NUMBER_OF_SETS", Some(count));
    }

    /// XYZ of the white reading, used as reference for Lab conversion.
    ///
    /// Prefers the first `RGB = 100,100,100` row; otherwise the row with the
    /// highest `XYZ_Y`.
    pub fn white_xyz(&self) -> Option<[f64; 3]> {
        let xyz = |row: &RowView<'_>| -> Option<[f64; 3]> {
            Some([row.number("XYZ_X")?, row.number("XYZ_Y")?, row.number("XYZ_Z")?])
        };
        let white = self.iter_rows().find(|row| {
            ["RGB_R", "RGB_G", "RGB_B"]
                .iter()
                .all(|f| row.number(f) == Some(100.0))
        });
        if let Some(row) = white {
            return xyz(&row);
        }
        self.iter_rows()
            .filter_map(|row| xyz(&row))
            .fold(None, |best: Option<[f64; 3]>, v| match best {
                Some(b) if b[1] >= v[1] => Some(b),
                _ => Some(v),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_section() -> Section {
        let mut s = Section::new("CTI3");
        s.set_data_format(&["RGB_R", "RGB_G", "RGB_B", "XYZ_X", "XYZ_Y", "XYZ_Z"])
            .unwrap();
        s
    }

    #[test]
    fn keyword_roundtrip() {
        let mut s = Section::new("CAL");
        s.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
        s.add_keyword("RGB_I", None);
        s.add_keyword("DESCRIPTOR", Some("x"));
        assert_eq!(s.value("DEVICE_CLASS"), Some("DISPLAY"));
        assert!(s.has_keyword("RGB_I"));
        assert_eq!(s.value("RGB_I"), None);
        assert!(s.keyword("DEVICE_CLASS").unwrap().declared);
        assert!(!s.keyword("DESCRIPTOR").unwrap().declared);

        s.add_keyword("DEVICE_CLASS", Some("OUTPUT"));
        assert_eq!(s.keywords().len(), 3);
        assert_eq!(s.value("DEVICE_CLASS"), Some("OUTPUT"));

        assert!(s.remove_keyword("DEVICE_CLASS").is_some());
        assert!(s.remove_keyword("DEVICE_CLASS").is_none());
        assert!(!s.has_keyword("device_class"));
    }

    #[test]
    fn rows_require_format() {
        let mut s = Section::new("CAL");
        assert!(matches!(
            s.push_row(vec![Value::Number(0.0)]),
            Err(CgatsError::Structural(_))
        ));
        assert!(s.ensure_data().is_err());
    }

    #[test]
    fn push_row_checks_width_and_syncs_sets() {
        let mut s = rgb_section();
        assert!(s.push_row(vec![Value::Number(1.0)]).is_err());
        s.push_row(vec![0.0.into(), 0.0.into(), 0.0.into(), 1.0.into(), 1.0.into(), 1.0.into()])
            .unwrap();
        assert_eq!(s.number_of_sets(), Some(1));
        assert_eq!(s.row(0).unwrap().number("XYZ_Y"), Some(1.0));
    }

    #[test]
    fn projection() {
        let mut s = rgb_section();
        s.push_row(vec![1.0.into(), 2.0.into(), 3.0.into(), 4.0.into(), 5.0.into(), 6.0.into()])
            .unwrap();
        let p = s.project(&["XYZ_Y", "RGB_R"]).unwrap();
        assert_eq!(p, vec![vec![Value::Number(5.0), Value::Number(1.0)]]);
        assert!(s.project(&["LAB_L"]).is_none());
    }

    #[test]
    fn white_prefers_full_drive() {
        let mut s = rgb_section();
        for row in [
            [50.0, 50.0, 50.0, 20.0, 21.0, 22.0],
            [100.0, 100.0, 100.0, 95.0, 100.0, 108.0],
            [0.0, 100.0, 0.0, 35.0, 120.0, 12.0],
        ] {
            s.push_row(row.iter().map(|&v| Value::Number(v)).collect()).unwrap();
        }
        assert_eq!(s.white_xyz(), Some([95.0, 100.0, 108.0]));
    }

    #[test]
    fn text_blocks() {
        let mut s = Section::new("CTI3");
        s.add_section("ARGYLL_COLPROF_ARGS", "-qh");
        s.add_section("ARGYLL_COLPROF_ARGS", "-qm");
        assert_eq!(s.blocks().len(), 1);
        assert_eq!(s.block("ARGYLL_COLPROF_ARGS"), Some("-qm"));
        assert!(s.remove_block("ARGYLL_COLPROF_ARGS").is_some());
    }
}
