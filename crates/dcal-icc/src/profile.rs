//! ICC profile container: header plus an ordered tag table.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::bytes::{pad4, push_s15f16, push_u16, push_u32, put_u32, sig_at, u16_at, u32_at};
use crate::{IccError, IccResult, Signature, Tag, VideoCardGamma, WcsProfiles};

/// Size of the fixed profile header.
pub const HEADER_SIZE: usize = 128;

const MAGIC: &[u8; 4] = b"acsp";
const DATE_OFFSET: usize = 24;

/// An ICC profile.
///
/// Only the header fields and tag types needed for display calibration are
/// interpreted; everything else is carried through as raw bytes.
///
/// # Example
///
/// ```rust
/// use dcal_icc::{Profile, Signature, Tag};
///
/// let mut profile = Profile::new_display(None);
/// profile.insert(Signature::DESC, Tag::Description("test".into()));
/// let bytes = profile.to_bytes().unwrap();
/// let back = Profile::from_bytes(&bytes).unwrap();
/// assert_eq!(back.description(), Some("test"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    header: [u8; HEADER_SIZE],
    tags: Vec<(Signature, Tag)>,
    filename: Option<PathBuf>,
}

impl Profile {
    /// Creates an empty v2.2 display-class RGB profile.
    ///
    /// `created` defaults to the current UTC time.
    pub fn new_display(created: Option<NaiveDateTime>) -> Self {
        let mut header = [0u8; HEADER_SIZE];
        header[8..12].copy_from_slice(&[0x02, 0x20, 0x00, 0x00]);
        header[12..16].copy_from_slice(b"mntr");
        header[16..20].copy_from_slice(b"RGB ");
        header[20..24].copy_from_slice(b"XYZ ");
        header[36..40].copy_from_slice(MAGIC);
        // D50 illuminant.
        let mut d50 = Vec::with_capacity(12);
        for v in [0.9642f64, 1.0, 0.8249] {
            push_s15f16(&mut d50, v);
        }
        header[68..80].copy_from_slice(&d50);

        let mut profile = Self {
            header,
            tags: Vec::new(),
            filename: None,
        };
        profile.set_date_time(created.unwrap_or_else(|| chrono::Utc::now().naive_utc()));
        profile
    }

    /// Parses a profile from raw bytes.
    ///
    /// Tags that fail to decode are logged and kept raw.
    pub fn from_bytes(data: &[u8]) -> IccResult<Self> {
        if data.len() < HEADER_SIZE + 4 {
            return Err(IccError::Truncated {
                what: "profile header",
                needed: HEADER_SIZE + 4,
                available: data.len(),
            });
        }
        if &sig_at(data, 36, "profile magic")? != MAGIC {
            return Err(IccError::InvalidProfile("missing 'acsp' signature".into()));
        }
        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&data[..HEADER_SIZE]);

        let count = u32_at(data, HEADER_SIZE, "tag count")? as usize;
        let mut tags = Vec::with_capacity(count.min(256));
        for i in 0..count {
            let entry = HEADER_SIZE + 4 + i * 12;
            let sig = Signature(sig_at(data, entry, "tag table")?);
            let offset = u32_at(data, entry + 4, "tag table")? as usize;
            let size = u32_at(data, entry + 8, "tag table")? as usize;
            let raw = data.get(offset..offset + size).ok_or_else(|| {
                IccError::invalid_tag(sig, format!("data {}+{} outside profile", offset, size))
            })?;
            let tag = match Tag::parse(raw) {
                Ok(tag) => tag,
                Err(e) => {
                    warn!("Keeping undecodable '{}' tag raw: {}", sig, e);
                    Tag::Unknown(raw.to_vec())
                }
            };
            tags.push((sig, tag));
        }
        debug!(tags = tags.len(), "parsed ICC profile");

        Ok(Self {
            header,
            tags,
            filename: None,
        })
    }

    /// Reads a profile from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IccResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let mut profile = Self::from_bytes(&data)?;
        profile.filename = Some(path.to_path_buf());
        Ok(profile)
    }

    /// Serializes the profile.
    ///
    /// Tag data is laid out in table order, each tag 4-byte aligned. The
    /// profile ID is cleared since content may have changed.
    pub fn to_bytes(&self) -> IccResult<Vec<u8>> {
        let mut encoded = Vec::with_capacity(self.tags.len());
        for (sig, tag) in &self.tags {
            encoded.push((*sig, tag.to_bytes()?));
        }

        let mut out = self.header.to_vec();
        out[84..100].fill(0);
        push_u32(&mut out, encoded.len() as u32);
        let table_start = out.len();
        out.resize(table_start + encoded.len() * 12, 0);

        for (i, (sig, bytes)) in encoded.iter().enumerate() {
            pad4(&mut out);
            let entry = table_start + i * 12;
            let offset = out.len();
            out[entry..entry + 4].copy_from_slice(&sig.0);
            put_u32(&mut out, entry + 4, offset as u32);
            put_u32(&mut out, entry + 8, bytes.len() as u32);
            out.extend_from_slice(bytes);
        }
        pad4(&mut out);
        let size = out.len() as u32;
        put_u32(&mut out, 0, size);
        Ok(out)
    }

    /// Writes the profile to disk.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> IccResult<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// File the profile was read from.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    // ------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------

    /// Profile/device class (`mntr` for displays).
    pub fn device_class(&self) -> Signature {
        Signature([self.header[12], self.header[13], self.header[14], self.header[15]])
    }

    /// Data color space.
    pub fn color_space(&self) -> Signature {
        Signature([self.header[16], self.header[17], self.header[18], self.header[19]])
    }

    /// Creation date from the header.
    ///
    /// `None` if the stored fields do not form a valid date.
    pub fn date_time(&self) -> Option<NaiveDateTime> {
        let field = |i: usize| u16_at(&self.header, DATE_OFFSET + i * 2, "date").ok();
        let date = NaiveDate::from_ymd_opt(
            i32::from(field(0)?),
            u32::from(field(1)?),
            u32::from(field(2)?),
        )?;
        date.and_hms_opt(
            u32::from(field(3)?),
            u32::from(field(4)?),
            u32::from(field(5)?),
        )
    }

    /// Sets the creation date.
    pub fn set_date_time(&mut self, dt: NaiveDateTime) {
        let mut fields = Vec::with_capacity(12);
        for v in [
            dt.year() as u16,
            dt.month() as u16,
            dt.day() as u16,
            dt.hour() as u16,
            dt.minute() as u16,
            dt.second() as u16,
        ] {
            push_u16(&mut fields, v);
        }
        self.header[DATE_OFFSET..DATE_OFFSET + 12].copy_from_slice(&fields);
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Tags in table order.
    pub fn tags(&self) -> &[(Signature, Tag)] {
        &self.tags
    }

    /// Looks up a tag.
    pub fn tag(&self, sig: Signature) -> Option<&Tag> {
        self.tags.iter().find(|(s, _)| *s == sig).map(|(_, t)| t)
    }

    /// Whether the profile has a tag.
    pub fn has_tag(&self, sig: Signature) -> bool {
        self.tag(sig).is_some()
    }

    /// Inserts or replaces a tag, keeping its table position when replacing.
    pub fn insert(&mut self, sig: Signature, tag: Tag) {
        match self.tags.iter_mut().find(|(s, _)| *s == sig) {
            Some(slot) => slot.1 = tag,
            None => self.tags.push((sig, tag)),
        }
    }

    /// Removes a tag.
    pub fn remove(&mut self, sig: Signature) -> Option<Tag> {
        let idx = self.tags.iter().position(|(s, _)| *s == sig)?;
        Some(self.tags.remove(idx).1)
    }

    /// Profile description text.
    pub fn description(&self) -> Option<&str> {
        self.tag(Signature::DESC).and_then(Tag::as_text)
    }

    /// Text of a `text`-type tag (e.g. `targ`).
    pub fn text(&self, sig: Signature) -> Option<&str> {
        match self.tag(sig)? {
            Tag::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The native `vcgt` tag.
    pub fn vcgt(&self) -> Option<&VideoCardGamma> {
        match self.tag(Signature::VCGT)? {
            Tag::VideoCardGamma(v) => Some(v),
            _ => None,
        }
    }

    /// The WCS profiles tag.
    pub fn wcs_profiles(&self) -> Option<&WcsProfiles> {
        match self.tag(Signature::MS00)? {
            Tag::WcsProfiles(w) => Some(w),
            _ => None,
        }
    }
}
