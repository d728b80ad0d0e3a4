use std::path::PathBuf;

use super::*;

fn fixture() -> Dataset {
    let serde_json::Value::Object(map) = serde_json::json!({
        "x_index_range": [0, 8],
        "y_index_range": [0, 4],
        "width": 64,
        "height": 48,
        "camera_name_format": "cam_{x}_{y}",
        "image_filename_format": "img/{y:02d}_{x:03d}.png",
        "depth_filename_format": "depth/{y}_{x}.png",
        "kinect_raw": {
            "image_filename_format": "raw/rgb_{x}_{y}.png",
            "depth_filename_format": "raw/d_{x}_{y}.png",
            "x_index_factor": 2.0,
            "y_index_offset": 100
        },
        "views": {
            "3,1": {
                "image_filename_format": "special/{x}.png",
                "kinect_raw": { "depth_filename_format": "raw/fixed.png" }
            }
        }
    }) else {
        unreachable!()
    };
    Dataset::from_parameters(map, "/ds").unwrap()
}

#[test]
fn derived_filenames_use_view_index() {
    let d = fixture();
    let v = d.view(ViewIndex::new_2d(5, 2)).unwrap();
    assert_eq!(
        v.image_filename().unwrap(),
        PathBuf::from("/ds/img/02_005.png")
    );
    assert_eq!(v.depth_filename().unwrap(), PathBuf::from("/ds/depth/2_5.png"));
    assert_eq!(v.mask_filename().unwrap(), None);
    assert_eq!(v.camera_name().unwrap(), "cam_5_2");
    assert!(v.parameters().get("views").is_none());
}

#[test]
fn local_overrides_apply_to_one_view() {
    let d = fixture();
    let v = d.view(ViewIndex::new_2d(3, 1)).unwrap();
    assert_eq!(v.image_filename().unwrap(), PathBuf::from("/ds/special/3.png"));
    assert_eq!(v.depth_filename().unwrap(), PathBuf::from("/ds/depth/1_3.png"));

    let raw = v.kinect_raw().unwrap();
    assert_eq!(raw.depth_filename().unwrap(), PathBuf::from("/ds/raw/fixed.png"));

    let other = d.view(ViewIndex::new_2d(3, 2)).unwrap();
    assert_eq!(
        other.image_filename().unwrap(),
        PathBuf::from("/ds/img/02_003.png")
    );
}

#[test]
fn clause_uses_its_own_axis_calibration() {
    let d = fixture();
    let raw = d.view(ViewIndex::new_2d(4, 3)).unwrap().kinect_raw().unwrap();
    assert_eq!(raw.clause_name(), Some("kinect_raw"));
    assert_eq!(raw.local_x().unwrap(), 8);
    assert_eq!(raw.local_y().unwrap(), Some(103));
    assert_eq!(
        raw.image_filename().unwrap(),
        PathBuf::from("/ds/raw/rgb_8_103.png")
    );
    // Camera names always use the raw grid indices.
    assert_eq!(raw.camera_name().unwrap(), "cam_4_3");
    assert!(raw.parameters().get("width").is_none());
}

#[test]
fn missing_clause_and_formats_are_parameter_errors() {
    let d = fixture();
    let v = d.view(ViewIndex::new_2d(0, 0)).unwrap();
    assert!(matches!(v.vsrs(), Err(ViewgridError::Parameters(_))));

    let serde_json::Value::Object(map) = serde_json::json!({
        "x_count": 2,
        "kinect_raw": {},
        "x_index_factor": "two"
    }) else {
        unreachable!()
    };
    let d = Dataset::from_parameters(map, ".").unwrap();
    let v = d.view(ViewIndex::new_1d(1)).unwrap();
    assert!(matches!(v.image_filename(), Err(ViewgridError::Parameters(_))));
    assert!(v.kinect_raw().unwrap().depth_filename().is_err());
    assert!(v.local_x().is_err());
    assert_eq!(v.local_y().unwrap(), None);
}

#[test]
fn fractional_factor_truncates() {
    let serde_json::Value::Object(map) = serde_json::json!({
        "x_count": 10,
        "x_index_factor": 0.5,
        "x_index_offset": -1,
        "image_filename_format": "{x}.png"
    }) else {
        unreachable!()
    };
    let d = Dataset::from_parameters(map, "root").unwrap();
    let v = d.view(ViewIndex::new_1d(7)).unwrap();
    assert_eq!(v.local_x().unwrap(), 2);
    assert_eq!(v.image_filename().unwrap(), PathBuf::from("root/2.png"));
}
