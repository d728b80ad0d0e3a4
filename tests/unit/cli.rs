use super::*;

#[derive(Parser, Debug)]
#[command(name = "probe", version)]
struct Probe {
    input: PathBuf,
    y: i32,
    #[command(flatten)]
    tools: ToolArgs,
}

#[test]
fn missing_positional_is_exit_one() {
    let err = Probe::try_parse_from(["probe", "in.json"]).unwrap_err();
    assert_eq!(usage_exit_code(&err), 1);
    assert!(err.to_string().contains("Usage"));
}

#[test]
fn help_and_version_exit_zero() {
    let err = Probe::try_parse_from(["probe", "--help"]).unwrap_err();
    assert_eq!(usage_exit_code(&err), 0);
    let err = Probe::try_parse_from(["probe", "--version"]).unwrap_err();
    assert_eq!(usage_exit_code(&err), 0);
}

#[test]
fn tool_flags_map_to_settings() {
    let p = Probe::try_parse_from([
        "probe",
        "in.json",
        "3",
        "--tools-dir",
        "/opt/tools",
        "--scratch-dir",
        "/scratch",
        "--timeout",
        "90",
    ])
    .unwrap();
    assert_eq!(p.input, PathBuf::from("in.json"));
    assert_eq!(p.y, 3);
    let s = p.tools.settings();
    assert_eq!(s.tools_dir, PathBuf::from("/opt/tools"));
    assert_eq!(s.scratch_dir, Some(PathBuf::from("/scratch")));
    assert_eq!(s.timeout, Some(Duration::from_secs(90)));

    let zero = Probe::try_parse_from(["probe", "in.json", "0", "--timeout", "0"]).unwrap();
    assert!(zero.tools.toolbox().is_err());
}
