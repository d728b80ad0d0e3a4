use super::*;

fn dataset(value: Value) -> Dataset {
    let Value::Object(map) = value else {
        panic!("fixture must be an object");
    };
    Dataset::from_parameters(map, "/ds").unwrap()
}

#[test]
fn slice_resolves_y_and_removes_range() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 9],
        "y_index_range": [0, 10],
        "image_filename_format": "img_{y}_{frame}.png",
    }));
    let out = slice_parameters(&d, 3).unwrap();
    assert_eq!(out["image_filename_format"], "img_3_{frame}.png");
    assert!(!out.contains_key("y_index_range"));
    assert_eq!(out["x_index_range"], serde_json::json!([0, 9]));

    let again = Dataset::from_parameters(out, "/ds").unwrap();
    assert!(!again.is_2d());
}

#[test]
fn slice_range_and_structure_checks() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 9],
        "y_index_range": [0, 10, 2],
    }));
    assert!(matches!(
        slice_parameters(&d, 11),
        Err(ViewgridError::OutOfRange(_))
    ));
    assert!(matches!(
        slice_parameters(&d, -1),
        Err(ViewgridError::OutOfRange(_))
    ));
    assert!(matches!(
        slice_parameters(&d, 3),
        Err(ViewgridError::OutOfRange(_))
    ));
    assert!(slice_parameters(&d, 10).is_ok());

    let flat = dataset(serde_json::json!({ "x_index_range": [0, 9] }));
    assert!(matches!(
        slice_parameters(&flat, 0),
        Err(ViewgridError::StructuralMismatch(_))
    ));
}

#[test]
fn clauses_use_their_local_y_and_drop_calibration() {
    let d = dataset(serde_json::json!({
        "y_count": 5,
        "x_count": 5,
        "camera_name_format": "cam_{x}_{y}",
        "depth_filename_format": "d/{y:03d}/{x:03d}.png",
        "kinect_raw": {
            "image_filename_format": "raw/{y}/rgb_{x}.png",
            "depth_filename_format": "raw/{y}/depth_{x}.png",
            "y_index_factor": 10,
            "y_index_offset": 1
        },
        "vsrs": {
            "image_filename_format": "vsrs/{x}_{y}.yuv",
            "z_near": 0.5
        }
    }));
    let out = slice_parameters(&d, 2).unwrap();
    assert!(!out.contains_key("y_count"));
    assert_eq!(out["camera_name_format"], "cam_{x}_2");
    assert_eq!(out["depth_filename_format"], "d/002/{x:03d}.png");

    let raw = out["kinect_raw"].as_object().unwrap();
    assert_eq!(raw["image_filename_format"], "raw/21/rgb_{x}.png");
    assert_eq!(raw["depth_filename_format"], "raw/21/depth_{x}.png");
    assert!(!raw.contains_key("y_index_factor"));
    assert!(!raw.contains_key("y_index_offset"));

    let vsrs = out["vsrs"].as_object().unwrap();
    assert_eq!(vsrs["image_filename_format"], "vsrs/{x}_2.yuv");
    assert_eq!(vsrs["z_near"], 0.5);
}

#[test]
fn top_level_templates_bind_the_raw_row_and_keep_calibration() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 3],
        "y_index_range": [0, 10],
        "y_index_factor": 2,
        "y_index_offset": 1,
        "image_filename_format": "img_{y}_{frame}.png",
    }));
    let out = slice_parameters(&d, 3).unwrap();
    assert_eq!(out["image_filename_format"], "img_3_{frame}.png");
    assert_eq!(out["y_index_factor"], 2);
    assert_eq!(out["y_index_offset"], 1);
}

#[test]
fn sliced_clauses_resolve_to_the_same_files() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 3],
        "y_index_range": [0, 3],
        "y_index_factor": 2,
        "image_filename_format": "img/{x}_{y}.png",
        "kinect_raw": {
            "image_filename_format": "raw/{x}_{y}.png",
            "y_index_factor": 3,
            "y_index_offset": 5
        }
    }));
    let sliced = Dataset::from_parameters(slice_parameters(&d, 1).unwrap(), "/ds").unwrap();
    for x in d.x_indices() {
        let before = d.view(ViewIndex::new_2d(x, 1)).unwrap();
        let after = sliced.view(ViewIndex::new_1d(x)).unwrap();
        assert_eq!(
            before.kinect_raw().unwrap().image_filename().unwrap(),
            after.kinect_raw().unwrap().image_filename().unwrap()
        );
        assert_eq!(
            after.kinect_raw().unwrap().image_filename().unwrap(),
            std::path::PathBuf::from(format!("/ds/raw/{x}_8.png"))
        );
        assert_eq!(
            after.image_filename().unwrap(),
            std::path::PathBuf::from(format!("/ds/img/{x}_1.png"))
        );
    }
}

#[test]
fn overrides_on_the_row_are_rekeyed() {
    let d = dataset(serde_json::json!({
        "x_index_range": [0, 3],
        "y_index_range": [0, 3],
        "image_filename_format": "img/{x}_{y}.png",
        "views": {
            "1,2": { "image_filename_format": "fix/{y}_{x}.png" },
            "1,3": { "image_filename_format": "other.png" }
        }
    }));
    let out = slice_parameters(&d, 2).unwrap();
    let views = out["views"].as_object().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views["1"]["image_filename_format"], "fix/2_{x}.png");

    let out = slice_parameters(&d, 0).unwrap();
    assert!(!out.contains_key("views"));
}

#[test]
fn write_parameters_is_sorted_and_indented() {
    let dir = std::env::temp_dir().join(format!(
        "viewgrid_slice_write_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("nested").join("out.json");
    let Value::Object(map) = serde_json::json!({ "b": 1, "a": { "d": 2, "c": 3 } }) else {
        unreachable!()
    };
    write_parameters(&map, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "{\n    \"a\": {\n        \"c\": 3,\n        \"d\": 2\n    },\n    \"b\": 1\n}\n"
    );
    let _ = std::fs::remove_dir_all(&dir);
}
