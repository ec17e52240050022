//! Integration tests for stage-layered configuration loading.
//!
//! Each test builds a configuration root in a temp directory:
//! - `defaults/` and `test/` stages with realistic content
//! - broken layouts for the failure paths

use serde_json::{Value, json};
use staged_config::config::{
    Configuration, ConfigurationAware, ConfigurationView, DumpOptions, LoadOptions,
};
use staged_config::error::ConfigError;
use staged_config::logging::{LogLevel, Logger};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A `defaults` + `test` layout split over several files.
fn hotelbook_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/hotelbook.yaml",
        r#"
defaults:
  hotelbook_params:
    area_mapping:
      KRK: Krakow
      MSK: Moscow
    url: https://hotelbook.com/xml_endpoint
    username: TESt_USERNAME
    password: PASSWORD
  logging: info
  default_list:
    - bar
"#,
    );
    write(
        temp.path(),
        "defaults/databases.yaml",
        r#"
defaults:
  databases:
    redis:
      master:
        username: R_USER
        password: R_PASS
"#,
    );
    write(
        temp.path(),
        "test/hotelbook.yaml",
        r#"
test:
  hotelbook_params:
    area_mapping:
      CHB: Челябинск
  default_list:
    - baz
"#,
    );
    write(temp.path(), "test/empty.yaml", "");
    temp
}

fn merged_for_test_stage() -> Value {
    json!({
        "hotelbook_params": {
            "area_mapping": {"KRK": "Krakow", "MSK": "Moscow", "CHB": "Челябинск"},
            "url": "https://hotelbook.com/xml_endpoint",
            "username": "TESt_USERNAME",
            "password": "PASSWORD"
        },
        "logging": "info",
        "default_list": ["bar", "baz"],
        "databases": {
            "redis": {"master": {"username": "R_USER", "password": "R_PASS"}}
        }
    })
}

fn load(root: &Path, stage: &str) -> Result<Configuration, ConfigError> {
    let mut conf = Configuration::from_options(LoadOptions {
        path: root.to_path_buf(),
        stage: stage.to_string(),
    });
    conf.load()?;
    Ok(conf)
}

/// Logger capturing every message it receives.
fn capturing_logger() -> (Logger, Arc<Mutex<Vec<(LogLevel, String)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let inner = Arc::clone(&seen);
    let logger = Logger::null().with_sink(Arc::new(move |level: LogLevel, msg: &str, _: Option<&Value>| {
        inner.lock().unwrap().push((level, msg.to_string()));
    }));
    (logger, seen)
}

#[test]
fn test_full_flow_with_path_and_stage() {
    let temp = hotelbook_root();
    let mut conf = Configuration::new(Some(temp.path()), Some("test"));
    conf.load().unwrap();

    let expected = merged_for_test_stage();
    assert_eq!(conf.all().unwrap(), &expected);
    assert_eq!(
        conf.get("hotelbook_params", Value::Null).unwrap(),
        expected["hotelbook_params"]
    );
    assert!(conf.contains("hotelbook_params"));
    assert_eq!(
        conf.get("hotelbook_params.area_mapping", Value::Null).unwrap(),
        expected["hotelbook_params"]["area_mapping"]
    );
    assert_eq!(
        conf["hotelbook_params.area_mapping"],
        expected["hotelbook_params"]["area_mapping"]
    );
}

#[test]
fn test_end_to_end_stage_overrides_scalars_and_unions_lists() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/app.yaml",
        "defaults:\n  logging: info\n  list: [bar]\n",
    );
    write(
        temp.path(),
        "test/app.yaml",
        "test:\n  list: [baz]\n  logging: debug\n",
    );

    let conf = load(temp.path(), "test").unwrap();
    assert_eq!(
        conf.all().unwrap(),
        &json!({"logging": "debug", "list": ["bar", "baz"]})
    );
}

#[test]
fn test_defaults_only_keys_survive_layering() {
    let temp = hotelbook_root();
    let conf = load(temp.path(), "test").unwrap();
    assert_eq!(conf.get("logging", "x").unwrap(), json!("info"));
    assert_eq!(
        conf.get("databases.redis.master.username", "x").unwrap(),
        json!("R_USER")
    );
}

#[test]
fn test_defaults_stage_reads_exactly_one_directory() {
    let temp = hotelbook_root();
    let (logger, seen) = capturing_logger();

    let mut conf = Configuration::from_options(LoadOptions {
        path: temp.path().to_path_buf(),
        stage: "defaults".to_string(),
    })
    .with_logger(logger);
    conf.load().unwrap();

    let listings = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, msg)| msg == "Following config files found:")
        .count();
    assert_eq!(listings, 1);
    assert_eq!(conf.get("default_list", Value::Null).unwrap(), json!(["bar"]));
    assert_eq!(conf["hotelbook_params.area_mapping.CHB"], Value::Null);
}

#[test]
fn test_load_reports_path_stage_and_completion() {
    let temp = hotelbook_root();
    let (logger, seen) = capturing_logger();

    let mut conf = Configuration::from_options(LoadOptions {
        path: temp.path().to_path_buf(),
        stage: "test".to_string(),
    })
    .with_logger(logger);
    conf.load().unwrap();

    let seen = seen.lock().unwrap();
    let infos: Vec<&str> = seen
        .iter()
        .filter(|(level, _)| *level == LogLevel::Info)
        .map(|(_, msg)| msg.as_str())
        .collect();
    assert!(infos.iter().any(|m| m.starts_with("CONFIG_PATH = ")));
    assert!(infos.contains(&"STAGE = test"));
    assert!(infos.iter().any(|m| m.ends_with("empty.yaml is empty. Skip it.")));
    assert_eq!(infos.last(), Some(&"Configuration loaded."));
}

#[test]
fn test_merge_list_with_empty_overlay() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/csp.yaml",
        "defaults:\n  content_security_policy:\n    - default-src 'self' cdn.example.com\n    - img-src 'self' img.example.com\n",
    );
    write(
        temp.path(),
        "test/csp.yaml",
        "test:\n  content_security_policy: []\n",
    );

    let conf = load(temp.path(), "test").unwrap();
    assert_eq!(
        conf.all().unwrap(),
        &json!({"content_security_policy": [
            "default-src 'self' cdn.example.com",
            "img-src 'self' img.example.com"
        ]})
    );
}

#[test]
fn test_merge_list_into_empty_defaults_list() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/csp.yaml",
        "defaults:\n  content_security_policy: []\n",
    );
    write(
        temp.path(),
        "test/csp.yaml",
        "test:\n  content_security_policy:\n    - default-src 'self' cdn.example.com\n    - img-src 'self' img.example.com\n",
    );

    let conf = load(temp.path(), "test").unwrap();
    assert_eq!(
        conf.get("content_security_policy", Value::Null).unwrap(),
        json!([
            "default-src 'self' cdn.example.com",
            "img-src 'self' img.example.com"
        ])
    );
}

#[test]
fn test_user_mistake_prevention() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "defaults/app.yaml", "defaults:\n  a: 1\n");
    write(temp.path(), "test/app.yaml", "prod:\n  a: 2\n");

    let err = load(temp.path(), "test").unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Developer error! STAGE "), "{msg}");
    assert!(msg.contains("[test]"));
    assert!(msg.contains("[prod]"));
    assert!(matches!(err, ConfigError::StageMismatch { .. }));
}

#[test]
fn test_missing_root_fails_at_load() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("not-yet");

    let mut conf = Configuration::new(Some(missing.clone()), Some("test"));
    assert_eq!(conf.path(), missing.as_path());

    let err = conf.load().unwrap_err();
    assert!(matches!(err, ConfigError::NoFilesFound { .. }));
    assert!(!conf.is_loaded());
}

#[test]
fn test_wildcard_lookup_over_loaded_tree() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/services.yaml",
        "defaults:\n  services:\n    web: { port: 80 }\n    api: { port: 8080 }\n",
    );
    write(
        temp.path(),
        "prod/services.yaml",
        "prod:\n  services:\n    api: { port: 9090 }\n    admin: { host: admin.local }\n",
    );

    let conf = load(temp.path(), "prod").unwrap();
    let ports = conf.get("services.*.port", -1).unwrap();
    let mut ports: Vec<i64> = ports
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_i64().unwrap())
        .collect();
    ports.sort();
    assert_eq!(ports, vec![-1, 80, 9090]);
    assert_eq!(conf.get("services.missing.port", "none").unwrap(), json!("none"));
}

#[test]
fn test_auto_discovery_finds_first_existing_location() {
    let temp = hotelbook_root();
    let candidates = vec![temp.path().join("missing"), temp.path().to_path_buf()];

    let mut conf = Configuration::auto_with_lookup(Some("defaults"), &candidates, |_| None).unwrap();
    assert_eq!(conf.stage(), "defaults");
    assert_eq!(conf.path(), std::fs::canonicalize(temp.path()).unwrap());

    conf.load().unwrap();
    assert!(conf.all().unwrap().as_object().is_some_and(|m| !m.is_empty()));
}

#[test]
fn test_auto_discovery_exhausted() {
    let temp = TempDir::new().unwrap();
    let candidates = vec![temp.path().join("a"), temp.path().join("b")];
    let err = Configuration::auto_with_lookup(None::<String>, &candidates, |_| None).unwrap_err();
    assert!(matches!(err, ConfigError::DirectoryNotFound { .. }));
}

#[test]
fn test_dump_yaml() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "defaults/app.yaml",
        r#"
defaults:
  hotelbook_params:
    area_mapping:
      KRK: Krakow
    username: TESt_USERNAME
  logging: info
  default_list:
    - bar
"#,
    );
    write(
        temp.path(),
        "test/app.yaml",
        "test:\n  default_list:\n    - baz\n",
    );

    let conf = load(temp.path(), "test").unwrap();
    let expected = "
hotelbook_params:
  area_mapping:
    KRK: Krakow
  username: TESt_USERNAME
logging: info
default_list:
  - bar
  - baz
";
    assert_eq!(conf.dump(DumpOptions::default()).unwrap(), expected);

    let flat = conf.dump(DumpOptions { inline: 1, indent: 2 }).unwrap();
    assert_eq!(
        flat,
        "
hotelbook_params: { area_mapping: { KRK: Krakow }, username: TESt_USERNAME }
logging: info
default_list: [bar, baz]
"
    );
}

#[test]
fn test_reload_rebuilds_whole_tree() {
    let temp = hotelbook_root();
    let mut conf = load(temp.path(), "test").unwrap();
    assert_eq!(conf["default_list"], json!(["bar", "baz"]));

    conf.set_stage("defaults").load().unwrap();
    assert_eq!(conf["default_list"], json!(["bar"]));
}

#[derive(Default)]
struct Service {
    configuration: Option<Arc<dyn ConfigurationView + Send + Sync>>,
}

impl ConfigurationAware for Service {
    fn set_configuration(&mut self, configuration: Arc<dyn ConfigurationView + Send + Sync>) {
        self.configuration = Some(configuration);
    }
}

impl Service {
    fn logging(&self) -> Value {
        self.configuration
            .as_ref()
            .and_then(|c| c.get("logging", json!("unset")).ok())
            .unwrap_or(Value::Null)
    }
}

#[test]
fn test_configuration_aware_component() {
    let temp = hotelbook_root();
    let conf = Arc::new(load(temp.path(), "test").unwrap());

    let mut service = Service::default();
    assert_eq!(service.logging(), Value::Null);

    service.set_configuration(conf);
    assert_eq!(service.logging(), json!("info"));
}
