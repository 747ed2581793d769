use std::ffi::OsString;
use std::fs;

use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;
use pgrecipe_config::Config;

#[test]
fn malformed_config_file_fails_loading() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("pgrecipe.toml");
    fs::write(&path, "port = not_a_number\nbin = \"/opt/pg/bin\"\n")
        .expect("write malformed config");

    let args = vec![
        OsString::from("pgrecipe"),
        OsString::from("--config-path"),
        path.clone().into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    match error.as_ref() {
        OrthoError::File { path: reported, .. } => assert_eq!(reported, &path),
        OrthoError::Aggregate(aggregate) => assert!(
            aggregate
                .iter()
                .any(|err| matches!(err, OrthoError::File { path: reported, .. } if reported == &path)),
            "expected the malformed file to be reported, got {aggregate:?}"
        ),
        other => panic!("expected file error, got {other:?}"),
    }
}

#[test]
fn mistyped_port_flag_is_rejected() {
    let args = vec![
        OsString::from("pgrecipe"),
        OsString::from("--port"),
        OsString::from("not-a-port"),
    ];
    assert!(Config::load_from_iter(args).is_err());
}
