use std::io::Write;

use morph_config::{ConfigError, LoggingConfig, MappingConfig, MorphConfig};
use morph_core::{CopyLevel, ReusePolicy};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn parses_full_config() {
    let text = r#"
[mapping]
copy_level = "equal"
reuse = "immutable"
ignore_null = true
strict = true
include = ["name", "age"]
exclude = ["password"]

[logging]
level = "debug"
json = true
"#;

    let config = MorphConfig::load_from_str(text).expect("config should parse");

    assert_eq!(
        config,
        MorphConfig {
            mapping: MappingConfig {
                copy_level: CopyLevel::Equal,
                reuse: ReusePolicy::Immutable,
                ignore_null: true,
                strict: true,
                include: vec!["name".to_owned(), "age".to_owned()],
                exclude: vec!["password".to_owned()],
            },
            logging: LoggingConfig {
                level: "debug".to_owned(),
                json: true,
            },
        }
    );
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let config = MorphConfig::load_from_str("[mapping]\nstrict = true\n").expect("config should parse");

    assert_eq!(config.mapping.copy_level, CopyLevel::Assignable);
    assert_eq!(config.mapping.reuse, ReusePolicy::Shared);
    assert!(config.mapping.strict);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn rejects_unknown_copy_level() {
    let err = MorphConfig::load_from_str("[mapping]\ncopy_level = \"loose\"\n").unwrap_err();

    match err {
        ConfigError::Toml(message) => assert!(message.contains("loose"), "{message}"),
        other => panic!("expected a toml error, got {other:?}"),
    }
}

#[test]
fn loads_from_path() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "[mapping]\nexclude = [\"secret\"]").expect("write config");

    let config = MorphConfig::load_from_path(file.path()).expect("config should load");

    assert_eq!(config.mapping.exclude, vec!["secret".to_owned()]);
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("morph.toml");

    let err = MorphConfig::load_from_path(&path).unwrap_err();

    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected an io error, got {other:?}"),
    }
}
