//! Small color math helpers.

/// D50 white on the 0..100 scale used by measurement files.
pub const D50_XYZ: [f64; 3] = [96.42, 100.0, 82.49];

/// CIE XYZ to L*a*b* relative to `white` (same scale as `xyz`).
pub fn xyz_to_lab(xyz: [f64; 3], white: [f64; 3]) -> [f64; 3] {
    let fx = lab_f(xyz[0] / white[0]);
    let fy = lab_f(xyz[1] / white[1]);
    let fz = lab_f(xyz[2] / white[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

#[inline]
fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBED: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Linearly maps `v` from `[old_min, old_max]` to `[new_min, new_max]`.
///
/// No clamping is applied.
#[inline]
pub fn convert_range(v: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    (v - old_min) * (new_max - new_min) / (old_max - old_min) + new_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn white_is_l100() {
        let lab = xyz_to_lab(D50_XYZ, D50_XYZ);
        assert_relative_eq!(lab[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(lab[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(lab[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn scaled_white_is_neutral() {
        let white = [95.05, 100.0, 108.9];
        let gray = white.map(|v| v * 0.2);
        let lab = xyz_to_lab(gray, white);
        assert!(lab[0] > 50.0 && lab[0] < 52.0);
        assert!(lab[1].abs() < 1e-9 && lab[2].abs() < 1e-9);
    }

    #[test]
    fn range() {
        assert_relative_eq!(convert_range(0.5, 0.0, 1.0, 0.0, 255.0), 127.5);
        assert_relative_eq!(convert_range(16.0, 16.0, 235.0, 0.0, 1.0), 0.0);
        assert_relative_eq!(convert_range(235.0, 16.0, 235.0, 0.0, 1.0), 1.0);
    }
}
