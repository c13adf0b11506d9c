use daybreak_config::{DaybreakConfigLoader, LlmConfig, SignalSource};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_full_config_from_file() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
publisher:
  api_key: "tf-file-key"
images:
  dir: "assets/morning"
variants:
  - id: market
    signals: market
    llm:
      provider: groq
      api_key: "gsk-file"
      temperature: 0.9
      max_tokens: 200
  - id: news
    enabled: false
    signals: news
    persona: "a very serious market analyst"
    llm:
      provider: gemini
      api_key: "gm-file"
  - id: social
    signals: social
    llm:
      provider: xai
      api_key: "xai-file"
      live_search: true
      max_search_results: 10
"#;
    let p = write_yaml(&tmp, "daybreak.yaml", file_yaml);

    let config = DaybreakConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load daybreak config");

    assert_eq!(config.publisher.api_key, "tf-file-key");
    // Endpoint was not named, so the default applies.
    assert_eq!(config.publisher.endpoint, "https://api.typefully.com/");
    assert_eq!(config.images.dir, "assets/morning");
    assert!(config.images.enabled);
    assert!(config.signals.news_auth_token.is_none());

    assert_eq!(config.variants.len(), 3);
    assert_eq!(config.variants[0].signals, SignalSource::Market);
    assert!(!config.variants[1].is_enabled());
    assert_eq!(
        config.variants[1].persona.as_deref(),
        Some("a very serious market analyst")
    );
    match &config.variants[2].llm {
        LlmConfig::Xai {
            live_search,
            max_search_results,
            ..
        } => {
            assert!(*live_search);
            assert_eq!(*max_search_results, Some(10));
        }
        other => panic!("expected xai variant, got {other:?}"),
    }

    // The disabled news variant is skipped when picking by default.
    assert_eq!(config.select_variant(None).unwrap().id, "market");
    assert_eq!(config.select_variant(Some("social")).unwrap().id, "social");
}

#[test]
#[serial]
fn env_placeholders_fill_in_secrets() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "daybreak.yaml",
        r#"
publisher:
  api_key: "${DEMO_TYPEFULLY_KEY}"
variants:
  - id: market
    signals: market
    llm:
      provider: groq
      api_key: "${DEMO_PROVIDER_KEY}"
"#,
    );

    temp_env::with_vars(
        [
            ("DEMO_TYPEFULLY_KEY", Some("tf-from-env")),
            ("DEMO_PROVIDER_KEY", Some("gsk-from-env")),
        ],
        || {
            let config = DaybreakConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.publisher.api_key, "tf-from-env");
            match &config.variants[0].llm {
                LlmConfig::Groq { api_key, .. } => assert_eq!(api_key, "gsk-from-env"),
                other => panic!("expected groq variant, got {other:?}"),
            }
        },
    );
}

#[test]
#[serial]
fn prefixed_env_overrides_beat_the_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "daybreak.yaml",
        r#"
publisher:
  api_key: "tf-file-key"
"#,
    );

    temp_env::with_var("DAYBREAK__PUBLISHER__API_KEY", Some("tf-env-key"), || {
        let config = DaybreakConfigLoader::new().with_file(&p).load().unwrap();
        assert_eq!(config.publisher.api_key, "tf-env-key");
    });
}

#[test]
#[serial]
fn missing_publisher_section_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "daybreak.yaml",
        r#"
variants:
  - id: market
    signals: market
    llm:
      provider: groq
      api_key: "gsk"
"#,
    );

    let err = DaybreakConfigLoader::new().with_file(&p).load().unwrap_err();
    assert!(err.to_string().contains("publisher"), "got: {err}");
}
