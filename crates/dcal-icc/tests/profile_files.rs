//! Profile file round-trips through disk.

use approx::assert_relative_eq;
use dcal_icc::{FormulaChannel, Profile, Signature, Tag, VideoCardGamma, WcsProfiles};
use tempfile::tempdir;

const CDM: &str = "<cdm:ColorDeviceModel xmlns:cdm=\"cdm\" xmlns:cal=\"cal\" xmlns:wcs=\"wcs\">\
<cdm:Calibration><cal:AdapterGammaConfiguration><cal:ParameterizedCurves>\
<wcs:RedTRC Gamma=\"1.2\" Gain=\"1.0\" Offset1=\"0.0\"/>\
<wcs:GreenTRC Gamma=\"1.2\" Gain=\"1.0\" Offset1=\"0.0\"/>\
<wcs:BlueTRC Gamma=\"1.2\" Gain=\"0.9\" Offset1=\"0.1\"/>\
</cal:ParameterizedCurves></cal:AdapterGammaConfiguration></cdm:Calibration>\
</cdm:ColorDeviceModel>";

#[test]
fn test_write_read_profile() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("display.icc");

    let mut profile = Profile::new_display(None);
    profile.insert(Signature::DESC, Tag::Description("display".into()));
    profile.insert(
        Signature::VCGT,
        Tag::VideoCardGamma(VideoCardGamma::Formula([FormulaChannel::default(); 3])),
    );
    profile.write(&path).unwrap();

    let back = Profile::from_path(&path).unwrap();
    assert_eq!(back.filename(), Some(path.as_path()));
    assert_eq!(back.description(), Some("display"));
    let vcgt = back.vcgt().unwrap();
    assert_eq!(vcgt.entry_count(), 256);
    assert_relative_eq!(vcgt.normalized_values().unwrap()[255][0], 1.0);
}

#[test]
fn test_wcs_tag_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wcs.icc");

    let mut profile = Profile::new_display(None);
    profile.insert(
        Signature::MS00,
        Tag::WcsProfiles(WcsProfiles {
            color_device_model: Some(CDM.into()),
            ..Default::default()
        }),
    );
    profile.write(&path).unwrap();

    let back = Profile::from_path(&path).unwrap();
    let vcgt = back.wcs_profiles().unwrap().vcgt().unwrap().unwrap();
    let values = vcgt.normalized_values().unwrap();
    assert_relative_eq!(values[0][2], 0.1, epsilon = 1e-9);
    assert_relative_eq!(values[255][2], 0.9, epsilon = 1e-9);
}

#[test]
fn test_not_a_profile() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("junk.icc");
    std::fs::write(&path, vec![0u8; 512]).unwrap();
    assert!(Profile::from_path(&path).is_err());
}
