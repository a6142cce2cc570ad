//! Video card gamma (`vcgt`) tag.
//!
//! Apple's private tag carrying the per-channel ramp loaded into the video
//! card LUT. Two encodings exist:
//!
//! ```text
//! 0   'vcgt'
//! 4   reserved
//! 8   gammaType     u32  (0 = table, 1 = formula)
//! 12  table:   channels u16, entryCount u16, entrySize u16, data...
//!     formula: 9 x s15Fixed16 (gamma, min, max per R, G, B)
//! ```

use crate::bytes::{bytes_at, pad4, push_s15f16, push_u16, push_u32, s15f16_at, u16_at, u32_at};
use crate::{IccError, IccResult};

/// Entry count used when a formula is sampled into a table.
pub const FORMULA_TABLE_SIZE: usize = 256;

const SIG: &str = "vcgt";

/// Sampled per-channel ramp.
///
/// Values are in the tag's own scale: `0 ..= 256^entry_size - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct VcgtTable {
    /// Bytes per stored entry (1 or 2).
    pub entry_size: usize,
    /// Exactly three channels (R, G, B) of equal length.
    pub channels: [Vec<f64>; 3],
}

impl VcgtTable {
    /// Builds a 16-bit table from three channel ramps.
    pub fn new(channels: [Vec<f64>; 3]) -> Self {
        Self {
            entry_size: 2,
            channels,
        }
    }

    /// Number of entries per channel.
    pub fn entry_count(&self) -> usize {
        self.channels[0].len()
    }

    fn check_lengths(&self) -> IccResult<()> {
        let count = self.entry_count();
        if self.channels.iter().any(|c| c.len() != count) {
            return Err(IccError::invalid_tag(SIG, "channels differ in length"));
        }
        Ok(())
    }

    /// Largest representable value for this entry size.
    pub fn max_value(&self) -> f64 {
        256f64.powi(self.entry_size as i32) - 1.0
    }
}

/// Gamma / min / max for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaChannel {
    /// Exponent.
    pub gamma: f64,
    /// Output at input 0.
    pub min: f64,
    /// Output at input 1.
    pub max: f64,
}

impl Default for FormulaChannel {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            min: 0.0,
            max: 1.0,
        }
    }
}

impl FormulaChannel {
    /// Output for normalized input `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.min + (self.max - self.min) * x.powf(self.gamma)
    }
}

/// Decoded `vcgt` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoCardGamma {
    /// Explicit sampled ramp.
    Table(VcgtTable),
    /// Parametric ramp, one [`FormulaChannel`] per R, G, B.
    Formula([FormulaChannel; 3]),
}

impl VideoCardGamma {
    /// Decodes tag data (starting at the type signature).
    pub fn parse(data: &[u8]) -> IccResult<Self> {
        match u32_at(data, 8, "vcgt gamma type")? {
            0 => Self::parse_table(data),
            1 => {
                let mut channels = [FormulaChannel::default(); 3];
                for (i, ch) in channels.iter_mut().enumerate() {
                    let base = 12 + i * 12;
                    ch.gamma = s15f16_at(data, base, "vcgt formula")?;
                    ch.min = s15f16_at(data, base + 4, "vcgt formula")?;
                    ch.max = s15f16_at(data, base + 8, "vcgt formula")?;
                }
                Ok(Self::Formula(channels))
            }
            other => Err(IccError::invalid_tag(SIG, format!("unknown gamma type {}", other))),
        }
    }

    fn parse_table(data: &[u8]) -> IccResult<Self> {
        let channel_count = usize::from(u16_at(data, 12, "vcgt table header")?);
        let entry_count = usize::from(u16_at(data, 14, "vcgt table header")?);
        let entry_size = usize::from(u16_at(data, 16, "vcgt table header")?);
        if channel_count != 1 && channel_count != 3 {
            return Err(IccError::invalid_tag(
                SIG,
                format!("{} channels, expected 1 or 3", channel_count),
            ));
        }
        if entry_size != 1 && entry_size != 2 {
            return Err(IccError::invalid_tag(
                SIG,
                format!("entry size {}, expected 1 or 2", entry_size),
            ));
        }

        let raw = bytes_at(data, 18, channel_count * entry_count * entry_size, "vcgt table data")?;
        let mut values = raw.chunks_exact(entry_size).map(|c| match c {
            [hi, lo] => f64::from(u16::from_be_bytes([*hi, *lo])),
            [b] => f64::from(*b),
            _ => 0.0,
        });

        let mut channels: [Vec<f64>; 3] = Default::default();
        for ch in channels.iter_mut().take(channel_count) {
            *ch = values.by_ref().take(entry_count).collect();
        }
        if channel_count == 1 {
            channels[1] = channels[0].clone();
            channels[2] = channels[0].clone();
        }
        Ok(Self::Table(VcgtTable {
            entry_size,
            channels,
        }))
    }

    /// The tag as a sampled table.
    ///
    /// Formulas are sampled at [`FORMULA_TABLE_SIZE`] points with 16-bit
    /// entries.
    pub fn to_table(&self) -> VcgtTable {
        match self {
            Self::Table(table) => table.clone(),
            Self::Formula(formula) => {
                let last = (FORMULA_TABLE_SIZE - 1) as f64;
                let channels = formula.map(|ch| {
                    (0..FORMULA_TABLE_SIZE)
                        .map(|i| ch.eval(i as f64 / last) * 65535.0)
                        .collect()
                });
                VcgtTable::new(channels)
            }
        }
    }

    /// Per-entry `[r, g, b]` in 0..=1, dividing by the table's peak scale.
    ///
    /// # Errors
    ///
    /// [`IccError::InvalidTag`] if the table's channels differ in length.
    pub fn normalized_values(&self) -> IccResult<Vec<[f64; 3]>> {
        let table = self.to_table();
        table.check_lengths()?;
        let max = table.max_value();
        let [r, g, b] = &table.channels;
        Ok(r.iter()
            .zip(g)
            .zip(b)
            .map(|((r, g), b)| [r / max, g / max, b / max])
            .collect())
    }

    /// Number of entries per channel once sampled.
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Table(table) => table.entry_count(),
            Self::Formula(_) => FORMULA_TABLE_SIZE,
        }
    }

    /// Encodes the tag, type signature included.
    pub fn to_bytes(&self) -> IccResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(b"vcgt");
        push_u32(&mut out, 0);
        match self {
            Self::Formula(formula) => {
                push_u32(&mut out, 1);
                for ch in formula {
                    push_s15f16(&mut out, ch.gamma);
                    push_s15f16(&mut out, ch.min);
                    push_s15f16(&mut out, ch.max);
                }
            }
            Self::Table(table) => {
                table.check_lengths()?;
                let count = u16::try_from(table.entry_count())
                    .map_err(|_| IccError::invalid_tag(SIG, "too many entries"))?;
                push_u32(&mut out, 0);
                push_u16(&mut out, 3);
                push_u16(&mut out, count);
                push_u16(&mut out, table.entry_size as u16);
                let max = table.max_value();
                for v in table.channels.iter().flatten() {
                    let v = v.round().clamp(0.0, max);
                    match table.entry_size {
                        1 => out.push(v as u8),
                        _ => push_u16(&mut out, v as u16),
                    }
                }
            }
        }
        pad4(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 / (n - 1) as f64 * 65535.0).round()).collect()
    }

    #[test]
    fn uneven_channels_rejected() {
        let vcgt = VideoCardGamma::Table(VcgtTable::new([ramp(4), ramp(4), ramp(3)]));
        assert!(matches!(vcgt.normalized_values(), Err(IccError::InvalidTag { .. })));
        assert!(vcgt.to_bytes().is_err());
    }

    #[test]
    fn table_roundtrip() {
        let vcgt = VideoCardGamma::Table(VcgtTable::new([ramp(256), ramp(256), ramp(256)]));
        let bytes = vcgt.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"vcgt");
        let back = VideoCardGamma::parse(&bytes).unwrap();
        assert_eq!(back, vcgt);
    }

    #[test]
    fn mono_table_expands() {
        let mut data = b"vcgt\0\0\0\0".to_vec();
        push_u32(&mut data, 0);
        push_u16(&mut data, 1);
        push_u16(&mut data, 2);
        push_u16(&mut data, 1);
        data.extend_from_slice(&[0, 255]);
        let VideoCardGamma::Table(t) = VideoCardGamma::parse(&data).unwrap() else {
            panic!("expected table");
        };
        assert_eq!(t.entry_size, 1);
        assert_eq!(t.channels[2], vec![0.0, 255.0]);
        let norm = VideoCardGamma::Table(t).normalized_values().unwrap();
        assert_eq!(norm[1], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn formula_samples_256() {
        let ch = FormulaChannel {
            gamma: 2.0,
            min: 0.0,
            max: 1.0,
        };
        let vcgt = VideoCardGamma::Formula([ch; 3]);
        let table = vcgt.to_table();
        assert_eq!(table.entry_count(), 256);
        assert_relative_eq!(table.channels[0][255], 65535.0);
        let mid = vcgt.normalized_values().unwrap()[128][0];
        assert_relative_eq!(mid, (128.0f64 / 255.0).powi(2), epsilon = 1e-9);
    }

    #[test]
    fn formula_roundtrip() {
        let vcgt = VideoCardGamma::Formula([
            FormulaChannel { gamma: 1.0, min: 0.0, max: 1.0 },
            FormulaChannel { gamma: 0.9, min: 0.05, max: 0.95 },
            FormulaChannel { gamma: 1.1, min: 0.0, max: 0.5 },
        ]);
        let back = VideoCardGamma::parse(&vcgt.to_bytes().unwrap()).unwrap();
        let VideoCardGamma::Formula(ch) = back else {
            panic!("expected formula");
        };
        assert_relative_eq!(ch[1].gamma, 0.9, epsilon = 1e-4);
        assert_relative_eq!(ch[1].min, 0.05, epsilon = 1e-4);
    }

    #[test]
    fn rejects_bad_entry_size() {
        let mut data = b"vcgt\0\0\0\0".to_vec();
        push_u32(&mut data, 0);
        push_u16(&mut data, 3);
        push_u16(&mut data, 2);
        push_u16(&mut data, 4);
        assert!(VideoCardGamma::parse(&data).is_err());
    }
}
