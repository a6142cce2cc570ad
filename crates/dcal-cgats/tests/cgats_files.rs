//! File-level tests: reading, writing and converting CGATS documents on disk.

use dcal_cgats::{ti3_to_ti1, Cgats, CgatsError, Section, Value};
use tempfile::tempdir;

const CAL: &str = "CAL

DESCRIPTOR \"Argyll Device Calibration State\"
ORIGINATOR \"Argyll dispcal\"
CREATED \"Tue Mar 03 10:00:00 2020\"
KEYWORD \"DEVICE_CLASS\"
DEVICE_CLASS \"DISPLAY\"
KEYWORD \"COLOR_REP\"
COLOR_REP \"RGB\"
KEYWORD \"RGB_I\"

NUMBER_OF_FIELDS 4
BEGIN_DATA_FORMAT
RGB_I RGB_R RGB_G RGB_B
END_DATA_FORMAT

NUMBER_OF_SETS 3
BEGIN_DATA
0 0 0 0
0.5 0.45 0.47 0.5
1 1 0.98 1
END_DATA
";

// ============================================================================
// Reading
// ============================================================================

#[test]
fn test_read_cal_records_file_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("display.cal");
    std::fs::write(&path, CAL).unwrap();

    let cal = Cgats::from_path(&path).unwrap();
    assert_eq!(cal.filename(), Some(path.as_path()));
    assert!(cal.mtime().is_some());
    assert_eq!(cal.len(), 1);

    let section = cal.query_first(&["RGB_I", "RGB_R", "RGB_G", "RGB_B"]).unwrap();
    assert_eq!(section.file_type(), "CAL");
    assert_eq!(section.row_count(), 3);
    assert_eq!(section.row(2).unwrap().number("RGB_G"), Some(0.98));
    assert!(section.has_keyword("RGB_I"));
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Cgats::from_path(dir.path().join("nope.cal")).unwrap_err();
    assert!(matches!(err, CgatsError::Io(_)));
}

#[test]
fn test_read_garbage_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ti3");
    std::fs::write(&path, "CTI3\nBEGIN_DATA\n1 2 3\nEND_DATA\n").unwrap();
    assert!(Cgats::from_path(&path).is_err());
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_and_reread() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.cal");

    let original = Cgats::from_bytes(CAL.as_bytes()).unwrap();
    original.write(&path).unwrap();
    let back = Cgats::from_path(&path).unwrap();

    let a = &original.sections()[0];
    let b = &back.sections()[0];
    assert_eq!(a.rows(), b.rows());
    assert_eq!(a.data_format(), b.data_format());
    assert_eq!(b.value("CREATED"), Some("Tue Mar 03 10:00:00 2020"));
}

#[test]
fn test_multi_section_write() {
    let mut doc = Cgats::new();
    let mut ti3 = Section::new("CTI3");
    ti3.set_data_format(&["SAMPLE_ID", "RGB_R"]).unwrap();
    ti3.push_row(vec![Value::Number(1.0), Value::Number(100.0)]).unwrap();
    doc.push_section(ti3);
    doc.push_section(Cgats::from_bytes(CAL.as_bytes()).unwrap().sections()[0].clone());

    let back = Cgats::from_bytes(&doc.to_bytes()).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.sections()[1].file_type(), "CAL");
    assert_eq!(back.query_value_first("DEVICE_CLASS"), Some("DISPLAY"));
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_ti3_to_ti1_file() {
    let ti3 = "CTI3
KEYWORD \"DEVICE_CLASS\"
DEVICE_CLASS \"DISPLAY\"
KEYWORD \"COLOR_REP\"
COLOR_REP \"RGB_XYZ\"
BEGIN_DATA_FORMAT
SAMPLE_ID RGB_R RGB_G RGB_B XYZ_X XYZ_Y XYZ_Z
END_DATA_FORMAT
BEGIN_DATA
1 100 100 100 95.05 100 108.9
2 0 0 0 0.2 0.2 0.2
END_DATA
";
    let out = ti3_to_ti1(ti3.as_bytes()).unwrap();
    let ti1 = Cgats::from_bytes(&out).unwrap();
    let s = &ti1.sections()[0];
    assert_eq!(s.file_type(), "CTI1");
    assert_eq!(s.value("COLOR_REP"), Some("RGB"));
    assert_eq!(s.row_count(), 2);
    assert!(!s.has_keyword("DEVICE_CLASS"));
}
