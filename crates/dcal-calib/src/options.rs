//! Argyll tool arguments stored alongside calibration data.
//!
//! dispcal and colprof arguments are kept in `ARGYLL_DISPCAL_ARGS` /
//! `ARGYLL_COLPROF_ARGS` text blocks so a later run can reproduce or update
//! the calibration. Options are handled without their leading `-`, e.g.
//! `g2.2` or `qh`.

use dcal_cgats::{Cgats, CgatsError, CgatsResult};
use dcal_icc::{Profile, Signature};
use tracing::debug;

/// Block holding dispcal arguments.
pub const DISPCAL_ARGS: &str = "ARGYLL_DISPCAL_ARGS";
/// Block holding colprof arguments.
pub const COLPROF_ARGS: &str = "ARGYLL_COLPROF_ARGS";

/// Quotes every argument that is not an option (does not start with `-`).
pub fn quote_nonoption_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .map(|a| {
            let a = a.as_ref();
            if a.starts_with('-') {
                a.to_string()
            } else {
                format!("\"{}\"", a)
            }
        })
        .collect()
}

/// Stores dispcal arguments in the first section of a CAL.
pub fn add_dispcal_options_to_cal<S: AsRef<str>>(cal: &mut Cgats, options: &[S]) -> CgatsResult<()> {
    let section = cal
        .section_mut(0)
        .ok_or_else(|| CgatsError::InvalidOperation("CAL has no sections".into()))?;
    section.add_section(DISPCAL_ARGS, &quote_nonoption_args(options).join(" "));
    Ok(())
}

/// Stores colprof arguments in section 0 and dispcal arguments in the
/// calibration section (1), when present.
pub fn add_options_to_ti3<S: AsRef<str>>(
    ti3: &mut Cgats,
    dispcal: Option<&[S]>,
    colprof: Option<&[S]>,
) -> CgatsResult<()> {
    if ti3.is_empty() {
        return Err(CgatsError::InvalidOperation("TI3 has no sections".into()));
    }
    if let Some(colprof) = colprof.filter(|o| !o.is_empty()) {
        if let Some(section) = ti3.section_mut(0) {
            section.add_section(COLPROF_ARGS, &quote_nonoption_args(colprof).join(" "));
        }
    }
    if let Some(dispcal) = dispcal.filter(|o| !o.is_empty()) {
        if let Some(section) = ti3.section_mut(1) {
            section.add_section(DISPCAL_ARGS, &quote_nonoption_args(dispcal).join(" "));
        }
    }
    Ok(())
}

/// Splits an argument string on whitespace, honoring double quotes.
pub fn split_args(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

/// dispcal options recorded in the profile's embedded measurements,
/// without the leading `-`.
///
/// Empty if the profile has no target text or no dispcal arguments.
pub fn dispcal_options_from_profile(profile: &Profile) -> Vec<String> {
    let Some(text) = profile
        .text(Signature::TARG)
        .or_else(|| profile.text(Signature::CIED))
    else {
        return Vec::new();
    };
    let ti3 = match Cgats::from_bytes(text.as_bytes()) {
        Ok(ti3) => ti3,
        Err(e) => {
            debug!("Embedded measurements unreadable: {}", e);
            return Vec::new();
        }
    };
    ti3.query_value_first(DISPCAL_ARGS)
        .map(|args| {
            split_args(args)
                .into_iter()
                .filter_map(|a| a.strip_prefix('-').map(str::to_string))
                .filter(|a| !a.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Negates a numeric token, keeping its digits as written. Zero stays unsigned.
fn negate_number(text: &str) -> Option<String> {
    let value: f64 = text.parse().ok()?;
    let digits = text.trim_start_matches(['+', '-']);
    if value == 0.0 || text.starts_with('-') {
        Some(digits.to_string())
    } else {
        Some(format!("-{}", digits))
    }
}

fn push_keyword(lines: &mut Vec<String>, name: &str, value: &str) {
    lines.push(format!("KEYWORD \"{}\"", name));
    lines.push(format!("{} \"{}\"", name, value));
}

/// Appends the CAL header keywords implied by dispcal `options`.
///
/// | option | keyword |
/// |--------|---------|
/// | `y`    | `DEVICE_TYPE` (`c` → CRT, otherwise LCD) |
/// | `g`, `G` | `TARGET_GAMMA` (`240`, `709`, `l`, `s` named; numeric `G` negated) |
/// | `f`    | `DEGREE_OF_BLACK_OUTPUT_OFFSET` |
/// | `k`    | `BLACK_POINT_CORRECTION` |
/// | `B`    | `TARGET_BLACK_BRIGHTNESS` |
/// | `q`    | `QUALITY` (`l` low, `m` medium, otherwise high) |
///
/// `NATIVE_TARGET_WHITE ""` is always appended last.
pub fn build_cal_from_profile<S: AsRef<str>>(lines: &mut Vec<String>, options: &[S]) {
    for option in options {
        let option = option.as_ref();
        let mut chars = option.chars();
        let Some(flag) = chars.next() else {
            continue;
        };
        let rest = chars.as_str();
        match flag {
            'y' => {
                let device = if rest.starts_with('c') { "CRT" } else { "LCD" };
                push_keyword(lines, "DEVICE_TYPE", device);
            }
            'g' | 'G' => {
                let trc = match rest {
                    "240" => "SMPTE240M".to_string(),
                    "709" => "REC709".to_string(),
                    "l" => "L_STAR".to_string(),
                    "s" => "sRGB".to_string(),
                    other if flag == 'G' => match negate_number(other) {
                        Some(negated) => negated,
                        None => continue,
                    },
                    other => other.to_string(),
                };
                push_keyword(lines, "TARGET_GAMMA", &trc);
            }
            'f' => push_keyword(lines, "DEGREE_OF_BLACK_OUTPUT_OFFSET", rest),
            'k' => push_keyword(lines, "BLACK_POINT_CORRECTION", rest),
            'B' => push_keyword(lines, "TARGET_BLACK_BRIGHTNESS", rest),
            'q' => {
                let quality = match rest.chars().next() {
                    Some('l') => "low",
                    Some('m') => "medium",
                    _ => "high",
                };
                push_keyword(lines, "QUALITY", quality);
            }
            _ => {}
        }
    }
    push_keyword(lines, "NATIVE_TARGET_WHITE", "");
}
