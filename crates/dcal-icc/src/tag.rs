//! Tag signatures and decoded tag values.

use std::fmt;

use crate::bytes::{bytes_at, pad4, push_u16, push_u32, sig_at, u32_at};
use crate::vcgt::VideoCardGamma;
use crate::wcs::WcsProfiles;
use crate::IccResult;

/// A four-character code identifying a tag or tag type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 4]);

impl Signature {
    /// Profile description.
    pub const DESC: Self = Self(*b"desc");
    /// Characterization target (Argyll stores the `.ti3` here).
    pub const TARG: Self = Self(*b"targ");
    /// Characterization data, used by some older profilers.
    pub const CIED: Self = Self(*b"CIED");
    /// Video card gamma.
    pub const VCGT: Self = Self(*b"vcgt");
    /// WCS profiles.
    pub const MS00: Self = Self(*b"MS00");
    /// Copyright.
    pub const CPRT: Self = Self(*b"cprt");
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0).trim_end())
    }
}

impl From<&[u8; 4]> for Signature {
    fn from(b: &[u8; 4]) -> Self {
        Self(*b)
    }
}

/// A decoded tag.
///
/// Types this crate does not interpret are kept as raw bytes so a profile
/// can be written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// `text` type: plain ASCII.
    Text(String),
    /// `desc` (v2) or `mluc` (v4) localized description.
    Description(String),
    /// `vcgt` type.
    VideoCardGamma(VideoCardGamma),
    /// `MS10` type.
    WcsProfiles(WcsProfiles),
    /// Anything else, type signature included.
    Unknown(Vec<u8>),
}

impl Tag {
    /// Decodes raw tag data by its type signature.
    pub fn parse(data: &[u8]) -> IccResult<Self> {
        let tag = match &sig_at(data, 0, "tag type")? {
            b"text" => Self::Text(ascii_z(data.get(8..).unwrap_or_default())),
            b"desc" => {
                let count = u32_at(data, 8, "desc length")? as usize;
                let ascii = bytes_at(data, 12, count, "desc text")?;
                Self::Description(ascii_z(ascii))
            }
            b"mluc" => Self::Description(parse_mluc(data)?),
            b"vcgt" => Self::VideoCardGamma(VideoCardGamma::parse(data)?),
            b"MS10" => Self::WcsProfiles(WcsProfiles::parse(data)?),
            _ => Self::Unknown(data.to_vec()),
        };
        Ok(tag)
    }

    /// Encodes the tag, type signature included.
    pub fn to_bytes(&self) -> IccResult<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::Text(text) => {
                out.extend_from_slice(b"text");
                push_u32(&mut out, 0);
                out.extend_from_slice(text.as_bytes());
                out.push(0);
            }
            Self::Description(text) => {
                out.extend_from_slice(b"desc");
                push_u32(&mut out, 0);
                push_u32(&mut out, text.len() as u32 + 1);
                out.extend_from_slice(text.as_bytes());
                out.push(0);
                // Unicode language code and count, ScriptCode code and count.
                push_u32(&mut out, 0);
                push_u32(&mut out, 0);
                push_u16(&mut out, 0);
                out.push(0);
                out.extend_from_slice(&[0u8; 67]);
            }
            Self::VideoCardGamma(vcgt) => return vcgt.to_bytes(),
            Self::WcsProfiles(wcs) => return Ok(wcs.to_bytes()),
            Self::Unknown(raw) => out.extend_from_slice(raw),
        }
        pad4(&mut out);
        Ok(out)
    }

    /// Text content of `text` and description tags.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Description(s) => Some(s),
            _ => None,
        }
    }
}

/// ASCII up to the first NUL; non-ASCII bytes are replaced.
fn ascii_z(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// First record of a `multiLocalizedUnicodeType`.
fn parse_mluc(data: &[u8]) -> IccResult<String> {
    let records = u32_at(data, 8, "mluc record count")?;
    if records == 0 {
        return Ok(String::new());
    }
    let len = u32_at(data, 20, "mluc record")? as usize;
    let offset = u32_at(data, 24, "mluc record")? as usize;
    let raw = bytes_at(data, offset, len, "mluc string")?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}
