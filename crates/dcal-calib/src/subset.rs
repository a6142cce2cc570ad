//! Gray / primaries subsets of display measurements.
//!
//! Pulls the neutral axis (and optionally the primaries) out of a TI3 so it
//! can be fed to curve fitting, averaging repeated readings of the same
//! device value on the way.

use std::collections::HashMap;

use dcal_cgats::{Cgats, CgatsError, CgatsResult, Section, RGB_XYZ_FIELDS};
use tracing::info;

use crate::colormath::{xyz_to_lab, D50_XYZ};

const WHITE: [f64; 3] = [100.0, 100.0, 100.0];
const BLACK: [f64; 3] = [0.0, 0.0, 0.0];

/// Hashable device RGB triplet (0..100 scale), compared bit-exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbKey([u64; 3]);

impl RgbKey {
    /// Wraps an RGB triplet. `-0.0` is folded into `0.0`.
    pub fn new(rgb: [f64; 3]) -> Self {
        Self(rgb.map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }))
    }

    /// The RGB triplet.
    pub fn rgb(&self) -> [f64; 3] {
        self.0.map(f64::from_bits)
    }

    fn is_extreme(&self) -> bool {
        *self == Self::new(WHITE) || *self == Self::new(BLACK)
    }
}

/// Insertion-ordered map from device RGB to XYZ.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RgbXyzMap {
    entries: Vec<(RgbKey, [f64; 3])>,
    index: HashMap<RgbKey, usize>,
}

impl RgbXyzMap {
    /// XYZ for `rgb`.
    pub fn get(&self, rgb: [f64; 3]) -> Option<[f64; 3]> {
        self.get_key(&RgbKey::new(rgb))
    }

    fn get_key(&self, key: &RgbKey) -> Option<[f64; 3]> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    /// Whether `rgb` is present.
    pub fn contains(&self, rgb: [f64; 3]) -> bool {
        self.index.contains_key(&RgbKey::new(rgb))
    }

    fn insert(&mut self, key: RgbKey, xyz: [f64; 3]) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = xyz,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, xyz));
            }
        }
    }

    /// Number of distinct RGB values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(rgb, xyz)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = ([f64; 3], [f64; 3])> + '_ {
        self.entries.iter().map(|(k, xyz)| (k.rgb(), *xyz))
    }
}

/// Options for [`extract_device_gray_primaries`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetOptions {
    /// Extract the gray axis; otherwise only white, black, primaries and
    /// 50% gray.
    pub gray: bool,
    /// Also treat near-neutral readings (small |a*|, |b*|) as gray.
    pub include_neutrals: bool,
    /// Maximum |a*| and |b*| for a near-neutral reading.
    pub neutrals_ab_threshold: f64,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        Self {
            gray: true,
            include_neutrals: false,
            neutrals_ab_threshold: 0.1,
        }
    }
}

/// Result of a subset extraction.
#[derive(Debug, Clone)]
pub struct Subset {
    /// Averaged readings of the extracted device values.
    pub extracted: RgbXyzMap,
    /// Averaged readings of everything else except white and black.
    pub remaining: RgbXyzMap,
    /// New `CTI3` table holding the extracted rows verbatim.
    pub table: Section,
}

/// Extracts the gray axis or the primaries from a TI3 into a new table.
///
/// White and black keep their first reading; later readings of either are
/// ignored. Any other device value measured more than once is averaged.
///
/// # Errors
///
/// [`CgatsError::MissingKey`] if the document has no data table or the
/// table lacks one of the RGB/XYZ fields, [`CgatsError::Type`] if a
/// required value is not numeric.
pub fn extract_device_gray_primaries(ti3: &Cgats, opts: &SubsetOptions) -> CgatsResult<Subset> {
    let name = ti3.display_name();
    let source = ti3
        .first_data_section()
        .ok_or_else(|| CgatsError::MissingKey(format!("{}: no DATA", name)))?;
    for field in RGB_XYZ_FIELDS {
        if !source.has_fields(&[field]) {
            return Err(CgatsError::MissingKey(format!(
                "{}: missing field {}",
                name, field
            )));
        }
    }

    let mut table = Section::new("CTI3");
    table.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
    table.add_keyword("COLOR_REP", Some("RGB_XYZ"));
    table.set_data_format(source.data_format().unwrap_or_default())?;
    table.ensure_data()?;

    let mut subset: Vec<RgbKey> = vec![RgbKey::new(WHITE), RgbKey::new(BLACK)];
    if opts.gray {
        info!("Extracting neutrals from {}", name);
    } else {
        subset.extend(
            [
                [100.0, 0.0, 0.0],
                [0.0, 100.0, 0.0],
                [0.0, 0.0, 100.0],
                [50.0, 50.0, 50.0],
            ]
            .map(RgbKey::new),
        );
        info!("Extracting neutrals and primaries from {}", name);
    }

    let neutral = if opts.gray && opts.include_neutrals {
        let white = source.white_xyz().unwrap_or(D50_XYZ);
        Some(NeutralTest::new(white, opts.neutrals_ab_threshold))
    } else {
        None
    };

    let mut extracted = RgbXyzMap::default();
    let mut remaining = RgbXyzMap::default();
    let mut dupes: HashMap<RgbKey, f64> = HashMap::new();

    for (i, row) in source.iter_rows().enumerate() {
        let mut values = [0.0; 6];
        for (v, field) in values.iter_mut().zip(RGB_XYZ_FIELDS) {
            *v = row.number(field).ok_or_else(|| {
                CgatsError::Type(format!("{}: row {} field {} is not numeric", name, i, field))
            })?;
        }
        let rgb = [values[0], values[1], values[2]];
        let mut xyz = [values[3], values[4], values[5]];
        let key = RgbKey::new(rgb);

        for map in [&extracted, &remaining] {
            let Some(prev) = map.get_key(&key) else {
                continue;
            };
            if key.is_extreme() {
                // First reading wins.
                subset.retain(|k| *k != key);
            } else {
                for (sum, p) in xyz.iter_mut().zip(prev) {
                    *sum += p;
                }
                *dupes.entry(key).or_insert(1.0) += 1.0;
            }
        }

        let is_gray = opts.gray
            && !key.is_extreme()
            && (rgb[0] == rgb[1] && rgb[1] == rgb[2]
                || neutral.as_ref().is_some_and(|n| n.matches(xyz_of(&values))));
        if is_gray || subset.contains(&key) {
            table.push_row(row.values().to_vec())?;
            extracted.insert(key, xyz);
        } else if !key.is_extreme() {
            remaining.insert(key, xyz);
        }
    }

    for (key, count) in &dupes {
        for map in [&mut extracted, &mut remaining] {
            if let Some(sum) = map.get_key(key) {
                map.insert(*key, sum.map(|v| v / count));
            }
        }
    }

    Ok(Subset {
        extracted,
        remaining,
        table,
    })
}

fn xyz_of(values: &[f64; 6]) -> [f64; 3] {
    [values[3], values[4], values[5]]
}

/// |a*| and |b*| test against the white reading.
struct NeutralTest {
    white: [f64; 3],
    threshold: f64,
    digits: i32,
}

impl NeutralTest {
    fn new(white: [f64; 3], threshold: f64) -> Self {
        // `{:?}` keeps a fractional digit for whole numbers ("1.0", not "1").
        let text = format!("{:?}", threshold);
        let digits = text.find('.').map_or(0, |dot| (text.len() - dot - 1) as i32);
        Self {
            white,
            threshold,
            digits,
        }
    }

    fn matches(&self, xyz: [f64; 3]) -> bool {
        let lab = xyz_to_lab(xyz, self.white);
        lab[1..]
            .iter()
            .all(|v| dcal_cgats::round_to(v.abs(), self.digits) <= self.threshold)
    }
}
