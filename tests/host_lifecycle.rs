use newplus::host::{HostError, ModuleHost};
use newplus::module::{ModuleConfig, ModuleController, PowerModule, WriteOutcome};
use newplus::monitoring::{EventCounters, FanoutSink, RecordingEventSink};
use newplus::policy::{FilePolicySource, GpoPolicyProvider, PolicyDecision};
use newplus::settings::JsonSettingsStore;
use std::path::Path;
use std::sync::Arc;

fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, value.to_string()).unwrap();
}

#[test]
fn test_editor_saves_are_diffed_against_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSettingsStore::new(dir.path(), "NewPlus", "C:\\Default");
    write_json(
        &store.module_settings_path(),
        serde_json::json!({"properties": {"template_location": {"value": "C:\\Templates"}}}),
    );

    let recorder = Arc::new(RecordingEventSink::new());
    let counters = Arc::new(EventCounters::new());
    let events = FanoutSink::new()
        .with_sink(recorder.clone())
        .with_sink(counters.clone());

    let policy = GpoPolicyProvider::newplus(Arc::new(FilePolicySource::new(
        dir.path().join("policy.json"),
    )));
    let mut module = ModuleController::builder(Arc::new(store.clone()), Arc::new(policy))
        .events(Arc::new(events))
        .build();

    assert_eq!(
        module.write_config(r#"{"template_location": "c:\\templates"}"#),
        WriteOutcome::Applied { changed: false }
    );
    assert_eq!(
        module.write_config(r#"{"template_location": "C:\\New"}"#),
        WriteOutcome::Applied { changed: true }
    );
    assert!(!module.write_config("not json").is_applied());

    // the editor persists the new value; the same save no longer differs
    write_json(
        &store.module_settings_path(),
        serde_json::json!({"properties": {"template_location": {"value": "C:\\New"}}}),
    );
    assert_eq!(
        module.write_config(r#"{"template_location": "C:\\NEW"}"#),
        WriteOutcome::Applied { changed: false }
    );

    assert_eq!(recorder.count("template_location_changed"), 1);
    assert_eq!(counters.get("template_location_changed"), 1);
}

#[test]
fn test_host_follows_policy_file() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir.path().join("settings.json"),
        serde_json::json!({"enabled": {"NewPlus": true}}),
    );
    let policy_path = dir.path().join("policy.json");
    write_json(
        &policy_path,
        serde_json::json!({"machine": {"ConfigureEnabledUtilityNewPlus": 0}}),
    );

    let mut config = ModuleConfig::with_settings_root(dir.path());
    config.policy_file = Some(policy_path.clone());

    let mut host = ModuleHost::new();
    let decision = host
        .load(Box::new(ModuleController::from_config(&config).unwrap()))
        .unwrap();

    assert_eq!(decision, PolicyDecision::ForceDisabled);
    assert!(!host.status("NewPlus").unwrap().enabled);
    assert!(matches!(
        host.enable("NewPlus"),
        Err(HostError::PolicyLocked { .. })
    ));

    // administrator lifts the policy
    std::fs::remove_file(&policy_path).unwrap();
    host.enable("NewPlus").unwrap();
    assert_eq!(host.enabled_modules(), vec!["NewPlus".to_string()]);

    host.unload("NewPlus").unwrap();
    assert_eq!(host.module_count(), 0);
}

#[test]
fn test_cache_drifts_from_store_until_host_acts() {
    let dir = tempfile::tempdir().unwrap();
    let config = ModuleConfig::with_settings_root(dir.path());
    let mut module = ModuleController::from_config(&config).unwrap();
    assert!(!module.is_enabled());

    write_json(
        &dir.path().join("settings.json"),
        serde_json::json!({"enabled": {"NewPlus": true}}),
    );
    assert!(!module.is_enabled());

    module.enable();
    assert!(module.is_enabled());
}
