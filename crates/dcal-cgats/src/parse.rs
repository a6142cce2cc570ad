//! CGATS text parser.
//!
//! Handles the ArgyllCMS flavour of CGATS.17:
//!
//! ```text
//! CAL
//!
//! DESCRIPTOR "Argyll Device Calibration State"
//! KEYWORD "DEVICE_CLASS"
//! DEVICE_CLASS "DISPLAY"
//! KEYWORD "RGB_I"
//! NUMBER_OF_FIELDS 4
//! BEGIN_DATA_FORMAT
//! RGB_I RGB_R RGB_G RGB_B
//! END_DATA_FORMAT
//! NUMBER_OF_SETS 2
//! BEGIN_DATA
//! 0.0 0.0 0.0 0.0
//! 1.0 1.0 1.0 1.0
//! END_DATA
//! ```
//!
//! A file may hold several tables; every table after the first starts with
//! its own file identifier line once the previous table's data has ended.

use tracing::trace;

use crate::{CgatsError, CgatsResult, Row, Section, Value};

/// A lexical token and whether it was enclosed in double quotes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub text: String,
    pub quoted: bool,
}

/// Splits a line into whitespace separated tokens, honouring quotes.
pub(crate) fn tokenize(line: &str, line_no: usize) -> CgatsResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                text.push(c);
            }
            if !closed {
                return Err(CgatsError::parse(line_no, "unterminated quoted string"));
            }
            tokens.push(Token { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token { text, quoted: false });
        }
    }

    Ok(tokens)
}

enum State {
    Header,
    DataFormat,
    Data { pending: Vec<Token> },
    Block { name: String, lines: Vec<String> },
}

/// Parses CGATS text into sections.
pub(crate) fn parse_lines<'a, I>(lines: I) -> CgatsResult<Vec<Section>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    // Set once END_DATA closes the current table.
    let mut closed = false;
    let mut state = State::Header;

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        let in_block = matches!(state, State::Block { .. });
        if !in_block && (line.is_empty() || line.starts_with('#')) {
            continue;
        }

        match &mut state {
            State::Block { name, lines } => {
                if line == format!("END_{}", name) {
                    if let Some(section) = current.as_mut() {
                        section.add_section(name, &lines.join("\n"));
                    }
                    state = State::Header;
                } else {
                    lines.push(line.to_string());
                }
            }
            State::DataFormat => {
                if line == "END_DATA_FORMAT" {
                    state = State::Header;
                    continue;
                }
                let section = current
                    .as_mut()
                    .ok_or_else(|| CgatsError::parse(line_no, "data format outside a table"))?;
                let mut fields: Vec<String> =
                    section.data_format().map(<[String]>::to_vec).unwrap_or_default();
                fields.extend(tokenize(line, line_no)?.into_iter().map(|t| t.text));
                section.set_data_format(&fields)?;
            }
            State::Data { pending } => {
                let section = current
                    .as_mut()
                    .ok_or_else(|| CgatsError::parse(line_no, "data outside a table"))?;
                if line == "END_DATA" {
                    if !pending.is_empty() {
                        return Err(CgatsError::Structural(format!(
                            "line {}: incomplete data row ({} trailing values)",
                            line_no,
                            pending.len()
                        )));
                    }
                    state = State::Header;
                    closed = true;
                    continue;
                }
                pending.extend(tokenize(line, line_no)?);
                let fields = section.data_format().map(<[String]>::to_vec).unwrap_or_default();
                if fields.is_empty() {
                    return Err(CgatsError::Structural(format!(
                        "line {}: data row with empty DATA_FORMAT",
                        line_no
                    )));
                }
                let rows = section.data_mut();
                while pending.len() >= fields.len() {
                    let row: Row = pending
                        .drain(..fields.len())
                        .zip(fields.iter())
                        .map(|(tok, field)| Value::from_token(field, &tok.text, tok.quoted))
                        .collect();
                    rows.push(row);
                }
            }
            State::Header => {
                let tokens = tokenize(line, line_no)?;
                let first = &tokens[0].text;

                if current.is_none() || (closed && tokens.len() == 1 && !is_reserved(first)) {
                    if tokens.len() != 1 {
                        return Err(CgatsError::parse(line_no, "missing file identifier"));
                    }
                    if let Some(done) = current.take() {
                        sections.push(done);
                    }
                    current = Some(Section::new(first.trim()));
                    closed = false;
                    continue;
                }

                let section = current.as_mut().ok_or_else(|| {
                    CgatsError::parse(line_no, "keyword before file identifier")
                })?;

                match first.as_str() {
                    "BEGIN_DATA_FORMAT" => {
                        if section.data_format().is_none() {
                            section.set_data_format::<String>(&[])?;
                        }
                        state = State::DataFormat;
                    }
                    "BEGIN_DATA" => {
                        if section.data_format().is_none() {
                            return Err(CgatsError::Structural(format!(
                                "line {}: DATA without DATA_FORMAT",
                                line_no
                            )));
                        }
                        section.set_data_unchecked(Vec::new());
                        state = State::Data { pending: Vec::new() };
                    }
                    "END_DATA" | "END_DATA_FORMAT" => {
                        return Err(CgatsError::parse(line_no, format!("unexpected {}", first)));
                    }
                    "KEYWORD" => {
                        let name = tokens
                            .get(1)
                            .ok_or_else(|| CgatsError::parse(line_no, "KEYWORD without name"))?;
                        section.declare_keyword(&name.text);
                    }
                    block if block.starts_with("BEGIN_") => {
                        state = State::Block {
                            name: block["BEGIN_".len()..].to_string(),
                            lines: Vec::new(),
                        };
                    }
                    name => {
                        let value = if tokens.len() > 1 {
                            Some(
                                tokens[1..]
                                    .iter()
                                    .map(|t| t.text.as_str())
                                    .collect::<Vec<_>>()
                                    .join(" "),
                            )
                        } else {
                            None
                        };
                        section.set_raw_keyword(name, value);
                    }
                }
            }
        }
    }

    match state {
        State::Header => {}
        State::DataFormat => return Err(CgatsError::parse(0, "unterminated DATA_FORMAT")),
        State::Data { .. } => return Err(CgatsError::parse(0, "unterminated DATA")),
        State::Block { name, .. } => {
            return Err(CgatsError::parse(0, format!("unterminated {} block", name)));
        }
    }

    if let Some(done) = current.take() {
        sections.push(done);
    }
    if sections.is_empty() {
        return Err(CgatsError::parse(0, "empty CGATS data"));
    }

    for section in &sections {
        check_counts(section)?;
    }

    trace!(sections = sections.len(), "parsed CGATS");
    Ok(sections)
}

/// Verifies declared `NUMBER_OF_FIELDS` / `NUMBER_OF_SETS` against the data.
pub(crate) fn check_counts(section: &Section) -> CgatsResult<()> {
    if let (Some(declared), Some(fields)) = (section.value("NUMBER_OF_FIELDS"), section.data_format()) {
        let declared: usize = declared
            .trim()
            .parse()
            .map_err(|_| CgatsError::Value(format!("NUMBER_OF_FIELDS {:?}", declared)))?;
        if declared != fields.len() {
            return Err(CgatsError::Invalid(format!(
                "NUMBER_OF_FIELDS is {} but DATA_FORMAT has {} fields",
                declared,
                fields.len()
            )));
        }
    }
    if section.has_data() {
        if let Some(declared) = section.value("NUMBER_OF_SETS") {
            let declared: usize = declared
                .trim()
                .parse()
                .map_err(|_| CgatsError::Value(format!("NUMBER_OF_SETS {:?}", declared)))?;
            if declared != section.row_count() {
                return Err(CgatsError::Invalid(format!(
                    "NUMBER_OF_SETS is {} but DATA has {} rows",
                    declared,
                    section.row_count()
                )));
            }
        }
    }
    Ok(())
}

fn is_reserved(token: &str) -> bool {
    token == "KEYWORD" || token.starts_with("BEGIN_") || token.starts_with("END_")
}
