mod common;

use common::{Configuration, Foo, fixture};
use fusion_config::{LoadError, Loader, SourceError};
use serial_test::serial;

#[test]
fn test_load_remote_file() {
    let json_response = r#"{
        "ValString": "remote_value",
        "ValStruct": { "ValString": "remote_struct_value" },
        "ValSlice": ["item1", "item2"]
    }"#;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/config.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json_response)
        .create();

    let mut cfg = Configuration::default();
    Loader::new()
        .with_env(false)
        .with_remote_file(format!("{}/config.json", server.url()))
        .load(&mut cfg)
        .unwrap();

    mock.assert();
    assert_eq!(cfg.val_string, "remote_value");
    assert_eq!(cfg.val_struct.val_string, "remote_struct_value");
    assert_eq!(cfg.val_slice, vec!["item1", "item2"]);
}

#[test]
fn test_remote_failure_leaves_target_as_passed_in() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/config.json")
        .with_status(500)
        .with_body("internal error")
        .create();

    let original = Configuration {
        val_string: "untouched".to_string(),
        val_struct: Foo {
            val_string: "nested".to_string(),
        },
        val_int32: 12,
        ..Default::default()
    };
    let mut cfg = original.clone();

    let err = Loader::new()
        .with_env(false)
        .with_local_file(fixture("settings.json"))
        .with_remote_file(format!("{}/config.json", server.url()))
        .load(&mut cfg)
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Source(SourceError::Status { status, .. }) if status.as_u16() == 500
    ));
    assert_eq!(cfg, original);
}

#[test]
#[serial]
fn test_override_hierarchy() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/config.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ValString": "remote_value"}"#)
        .create();

    std::env::set_var("ValString", "from_env_var");

    let mut env_only = Configuration::default();
    let env_result = Loader::new().load(&mut env_only);

    let mut env_and_file = Configuration::default();
    let file_result = Loader::new()
        .with_local_file(fixture("settings.json"))
        .load(&mut env_and_file);

    let mut all_three = Configuration::default();
    let remote_result = Loader::new()
        .with_local_file(fixture("settings.json"))
        .with_remote_file(format!("{}/config.json", server.url()))
        .load(&mut all_three);

    std::env::remove_var("ValString");

    env_result.unwrap();
    file_result.unwrap();
    remote_result.unwrap();

    assert_eq!(env_only.val_string, "from_env_var");
    assert_eq!(env_and_file.val_string, "xyz");
    assert_eq!(all_three.val_string, "remote_value");
    // only the local file has the nested value
    assert_eq!(all_three.val_struct.val_string, "abc");
}

#[test]
fn test_registration_order_beats_source_type() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/config.json")
        .with_status(200)
        .with_body(r#"{"ValString": "remote_value"}"#)
        .create();

    let mut cfg = Configuration::default();
    Loader::new()
        .with_env(false)
        .with_remote_file(format!("{}/config.json", server.url()))
        .with_local_file(fixture("settings.json"))
        .load(&mut cfg)
        .unwrap();

    assert_eq!(cfg.val_string, "xyz");
}
