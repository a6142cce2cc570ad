//! Windows Color System profile tag (`MS00`, type `MS10`).
//!
//! The tag embeds up to three UTF-16LE XML documents: the color device
//! model, color appearance model and gamut map model. Display calibration
//! lives in the device model as parameterized curves:
//!
//! ```xml
//! <cdm:Calibration>
//!   <cal:AdapterGammaConfiguration>
//!     <cal:ParameterizedCurves>
//!       <wcs:RedTRC Gamma="1.0" Gain="1.0" Offset1="0.0"/>
//!       ...
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::bytes::{bytes_at, pad4, push_u32, u32_at};
use crate::vcgt::{FormulaChannel, VideoCardGamma};
use crate::{IccError, IccResult};

/// Decoded WCS profiles tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WcsProfiles {
    /// Color device model XML.
    pub color_device_model: Option<String>,
    /// Color appearance model XML.
    pub color_appearance_model: Option<String>,
    /// Gamut map model XML.
    pub gamut_map_model: Option<String>,
}

impl WcsProfiles {
    /// Decodes tag data (starting at the type signature).
    pub fn parse(data: &[u8]) -> IccResult<Self> {
        let mut models: [Option<String>; 3] = Default::default();
        for (i, model) in models.iter_mut().enumerate() {
            let entry = 8 + i * 8;
            if data.len() < entry + 8 {
                break;
            }
            let offset = u32_at(data, entry, "MS10 offset")? as usize;
            let size = u32_at(data, entry + 4, "MS10 size")? as usize;
            if offset == 0 || size == 0 {
                continue;
            }
            let raw = bytes_at(data, offset, size, "MS10 model")?;
            *model = Some(decode_utf16le(raw));
        }
        let [color_device_model, color_appearance_model, gamut_map_model] = models;
        Ok(Self {
            color_device_model,
            color_appearance_model,
            gamut_map_model,
        })
    }

    /// Encodes the tag, type signature included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let models = [
            &self.color_device_model,
            &self.color_appearance_model,
            &self.gamut_map_model,
        ];
        let encoded: Vec<Option<Vec<u8>>> = models
            .iter()
            .map(|m| m.as_ref().map(|s| s.encode_utf16().flat_map(u16::to_le_bytes).collect()))
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(b"MS10");
        push_u32(&mut out, 0);
        let mut offset = 8 + 3 * 8;
        for model in &encoded {
            match model {
                Some(bytes) => {
                    push_u32(&mut out, offset as u32);
                    push_u32(&mut out, bytes.len() as u32);
                    offset += bytes.len();
                }
                None => {
                    push_u32(&mut out, 0);
                    push_u32(&mut out, 0);
                }
            }
        }
        for bytes in encoded.iter().flatten() {
            out.extend_from_slice(bytes);
        }
        pad4(&mut out);
        out
    }

    /// Derives a formula `vcgt` from the device model's calibration curves.
    ///
    /// Returns `None` when the device model has no `ParameterizedCurves`.
    /// Missing attributes default to gamma 1, gain 1, offset 0.
    pub fn vcgt(&self) -> IccResult<Option<VideoCardGamma>> {
        let Some(xml) = &self.color_device_model else {
            return Ok(None);
        };

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut found = false;
        let mut channels = [FormulaChannel::default(); 3];

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    if in_curves(&stack) {
                        found |= apply_trc(&name, &e, &mut channels);
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e);
                    if in_curves(&stack) {
                        found |= apply_trc(&name, &e, &mut channels);
                    } else if name == "ParameterizedCurves" && in_gamma_config(&stack) {
                        found = true;
                    }
                }
                Ok(Event::End(_)) => {
                    if in_curves(&stack) {
                        found = true;
                    }
                    stack.pop();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(IccError::Xml(e.to_string())),
                _ => {}
            }
        }

        if !found {
            debug!("WCS device model has no parameterized calibration curves");
            return Ok(None);
        }
        Ok(Some(VideoCardGamma::Formula(channels)))
    }
}

fn decode_utf16le(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn get_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<f64> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| String::from_utf8_lossy(&a.value).trim().parse().ok())
}

fn in_gamma_config(stack: &[String]) -> bool {
    stack.len() >= 2
        && stack[stack.len() - 2] == "Calibration"
        && stack[stack.len() - 1] == "AdapterGammaConfiguration"
}

fn in_curves(stack: &[String]) -> bool {
    stack.last().is_some_and(|s| s == "ParameterizedCurves")
        && in_gamma_config(&stack[..stack.len() - 1])
}

fn apply_trc(name: &str, e: &BytesStart<'_>, channels: &mut [FormulaChannel; 3]) -> bool {
    let idx = match name {
        "RedTRC" => 0,
        "GreenTRC" => 1,
        "BlueTRC" => 2,
        _ => return false,
    };
    let ch = &mut channels[idx];
    ch.gamma = get_attr(e, b"Gamma").unwrap_or(1.0);
    ch.max = get_attr(e, b"Gain").unwrap_or(1.0);
    ch.min = get_attr(e, b"Offset1").unwrap_or(0.0);
    true
}
