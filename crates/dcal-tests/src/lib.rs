//! End-to-end tests for the dcal crates.
//!
//! Each test drives a full workflow through files on disk: CGATS text in,
//! ICC profile out (or the reverse), checking the properties that tie
//! `dcal-cgats`, `dcal-icc` and `dcal-calib` together.

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use dcal_calib::{
        cal_to_fake_profile, detect_video_encoding, extract_device_gray_primaries,
        profile_vcgt_to_cal, unscale_from_video_levels, vcgt_to_cal, CalibrationCurve,
        SubsetOptions, VideoEncoding, CAL_FIELDS,
    };
    use dcal_cgats::{ti3_to_ti1, Cgats, CgatsError, Section, Value, RGB_XYZ_FIELDS};
    use dcal_icc::{Profile, Signature, Tag, VcgtTable, VideoCardGamma};
    use tempfile::tempdir;

    /// CAL with a power-law curve, outputs mapped into `black..white` of 0..255.
    fn gamma_cal(n: usize, gamma: f64, black: f64, white: f64) -> Cgats {
        let mut s = Section::new("CAL");
        s.add_keyword("DESCRIPTOR", Some("Argyll Device Calibration State"));
        s.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
        s.add_keyword("COLOR_REP", Some("RGB"));
        s.set_data_format(&CAL_FIELDS).unwrap();
        for i in 0..n {
            let x = i as f64 / (n - 1) as f64;
            let y = (black + (white - black) * x.powf(gamma)) / 256.0 * (65536.0 / 65535.0);
            s.push_row(vec![x.into(), y.into(), y.into(), y.into()]).unwrap();
        }
        Cgats::from_section(s)
    }

    fn ti3(rows: &[[f64; 6]]) -> Cgats {
        let mut s = Section::new("CTI3");
        s.add_keyword("DEVICE_CLASS", Some("DISPLAY"));
        s.add_keyword("COLOR_REP", Some("RGB_XYZ"));
        s.set_data_format(&RGB_XYZ_FIELDS).unwrap();
        for r in rows {
            s.push_row(r.iter().map(|&v| Value::Number(v)).collect()).unwrap();
        }
        Cgats::from_section(s)
    }

    /// CAL file -> calibration-only profile on disk -> CAL again.
    #[test]
    fn test_cal_profile_cal_roundtrip() {
        let dir = tempdir().unwrap();
        let cal_path = dir.path().join("gamma22.cal");
        let icc_path = dir.path().join("gamma22.icc");

        gamma_cal(256, 1.0 / 2.2, 0.0, 255.0).write(&cal_path).unwrap();
        let cal = Cgats::from_path(&cal_path).unwrap();
        let original = CalibrationCurve::from_cal(&cal).unwrap();
        assert!(original.is_monotonic());

        cal_to_fake_profile(&cal).unwrap().write(&icc_path).unwrap();
        let profile = Profile::from_path(&icc_path).unwrap();
        assert_eq!(profile.description(), Some("gamma22.cal"));

        let back = CalibrationCurve::from_cal(&profile_vcgt_to_cal(&profile).unwrap()).unwrap();
        assert_eq!(back.entry_count, 256);
        for (a, b) in original.data.iter().flatten().zip(back.data.iter().flatten()) {
            // 16-bit storage in the profile.
            assert_relative_eq!(*a, *b, epsilon = 0.51);
        }
    }

    #[test]
    fn test_three_entry_identity_extraction() {
        let cal = Cgats::from_bytes(
            b"CAL\n\
              BEGIN_DATA_FORMAT\n\
              RGB_I RGB_R RGB_G RGB_B\n\
              END_DATA_FORMAT\n\
              BEGIN_DATA\n\
              0 0 0 0\n\
              0.5 0.5 0.5 0.5\n\
              1 1 1 1\n\
              END_DATA\n",
        )
        .unwrap();
        let curve = CalibrationCurve::from_cal(&cal).unwrap();
        for channel in &curve.data {
            assert_eq!(channel, &vec![0.0, 32767.5, 65535.0]);
        }
    }

    #[test]
    fn test_full_range_rescale_is_identity() {
        let profile = Profile::new_display(None);
        let cal = gamma_cal(16, 1.0, 0.0, 255.0);
        let out = unscale_from_video_levels(&profile, cal.clone(), 0.0, 255.0).unwrap();
        assert_eq!(out, cal);
    }

    /// Encoding keywords survive being written out and read back.
    #[test]
    fn test_video_levels_keyword_roundtrip() {
        let dir = tempdir().unwrap();
        let profile = Profile::new_display(None);
        for (black, white) in [(16.0, 235.0), (8.0, 247.0)] {
            let path = dir.path().join(format!("levels_{}_{}.cal", black, white));
            let out =
                unscale_from_video_levels(&profile, gamma_cal(9, 1.0, black, white), black, white)
                    .unwrap();
            out.write(&path).unwrap();

            let reread = Cgats::from_path(&path).unwrap();
            assert_eq!(
                detect_video_encoding(&reread),
                VideoEncoding::Levels { black, white }
            );
            let curve = CalibrationCurve::from_cal(&reread).unwrap();
            assert_relative_eq!(curve.data[0][0], 0.0, epsilon = 1e-3);
            assert_relative_eq!(curve.data[0][8], 65535.0, epsilon = 1e-3);
        }
    }

    /// A curve that does not fit its declared levels is taken from the vcgt.
    #[test]
    fn test_inconsistent_encoding_falls_back_to_vcgt() {
        let created = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let ramp: Vec<f64> = (0..5).map(|i| i as f64 * 65535.0 / 4.0).collect();
        let vcgt = VideoCardGamma::Table(VcgtTable::new([ramp.clone(), ramp.clone(), ramp]));
        let mut profile = Profile::new_display(Some(created));
        profile.insert(Signature::VCGT, Tag::VideoCardGamma(vcgt.clone()));

        let out =
            unscale_from_video_levels(&profile, gamma_cal(5, 1.0, 0.0, 255.0), 16.0, 235.0).unwrap();
        assert_eq!(out, vcgt_to_cal(&vcgt, created).unwrap());
        assert_eq!(detect_video_encoding(&out), VideoEncoding::NotPresent);
    }

    #[test]
    fn test_subset_keeps_first_white() {
        let doc = ti3(&[
            [100.0, 100.0, 100.0, 95.0, 100.0, 108.0],
            [0.0, 0.0, 0.0, 0.2, 0.2, 0.3],
            [100.0, 100.0, 100.0, 90.0, 94.0, 101.0],
            [25.0, 25.0, 25.0, 4.0, 4.2, 4.5],
        ]);
        let subset = extract_device_gray_primaries(&doc, &SubsetOptions::default()).unwrap();
        assert_eq!(subset.extracted.get([100.0, 100.0, 100.0]), Some([95.0, 100.0, 108.0]));
        assert!(!subset.remaining.contains([100.0, 100.0, 100.0]));
    }

    #[test]
    fn test_subset_averages_repeats() {
        let doc = ti3(&[
            [100.0, 100.0, 100.0, 95.0, 100.0, 108.0],
            [0.0, 0.0, 0.0, 0.2, 0.2, 0.3],
            [0.0, 50.0, 0.0, 10.0, 30.0, 5.0],
            [0.0, 50.0, 0.0, 12.0, 32.0, 7.0],
            [0.0, 50.0, 0.0, 14.0, 34.0, 9.0],
        ]);
        let opts = SubsetOptions {
            gray: false,
            ..Default::default()
        };
        let subset = extract_device_gray_primaries(&doc, &opts).unwrap();
        let green = subset.remaining.get([0.0, 50.0, 0.0]).unwrap();
        assert_relative_eq!(green[0], 12.0);
        assert_relative_eq!(green[1], 32.0);
        assert_relative_eq!(green[2], 7.0);
    }

    #[test]
    fn test_verify_field_sets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.ti3");
        let doc = ti3(&[[50.0, 50.0, 50.0, 20.0, 21.0, 23.0]]);
        doc.write(&path).unwrap();
        let doc_read = Cgats::from_path(&path).unwrap();
        assert!(doc_read.verify_ti1_rgb_xyz().is_ok());
        assert!(doc_read.verify(&RGB_XYZ_FIELDS, false).is_ok());

        // An extra field only fails strict verification.
        let section = doc.section(0).unwrap();
        let mut fields: Vec<String> = section.data_format().unwrap().to_vec();
        fields.push("SAMPLE_LOC".into());
        let mut extended = Section::new("CTI3");
        extended.set_data_format(&fields).unwrap();
        let mut row = section.rows()[0].clone();
        row.push(Value::Text("A1".into()));
        extended.push_row(row).unwrap();
        let extended = Cgats::from_bytes(&extended.to_bytes()).unwrap();
        assert!(extended.verify(&RGB_XYZ_FIELDS, true).is_ok());
        assert!(matches!(
            extended.verify(&RGB_XYZ_FIELDS, false),
            Err(CgatsError::Structural(_))
        ));
        assert!(matches!(
            extended.verify(&["RGB_R", "SPECTRAL_380"], true),
            Err(CgatsError::MissingKey(_))
        ));
    }

    #[test]
    fn test_ti3_to_ti1_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("measured.ti3");
        let mut doc = ti3(&[
            [100.0, 100.0, 100.0, 95.0, 100.0, 108.0],
            [0.0, 0.0, 0.0, 0.2, 0.2, 0.3],
        ]);
        doc.push_section(gamma_cal(3, 1.0, 0.0, 255.0).sections()[0].clone());
        doc.write(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let ti1 = Cgats::from_bytes(&ti3_to_ti1(&bytes).unwrap()).unwrap();
        assert_eq!(ti1.len(), 1);
        let s = &ti1.sections()[0];
        assert_eq!(s.file_type(), "CTI1");
        assert_eq!(s.value("COLOR_REP"), Some("RGB"));
        assert_eq!(s.value("ORIGINATOR"), Some("Argyll targen"));
        assert!(!s.has_keyword("DEVICE_CLASS"));
        assert_eq!(s.row_count(), 2);
    }
}
