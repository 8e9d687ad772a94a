// File-backed tests for config persistence and the theme context.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use teledash_config::{
    Config, Defaults, Profile, Theme, Ui, UiContext, load_config_from, save_config_to,
};

#[test]
fn missing_file_defaults_to_dark() {
    let dir = TempDir::new().unwrap();
    let ctx = UiContext::load_from(dir.path().join("config.toml"));
    assert_eq!(ctx.theme(), Theme::Dark);
}

#[test]
fn toggle_persists_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut ctx = UiContext::load_from(path.clone());
    assert_eq!(ctx.toggle_theme().unwrap(), Theme::Light);
    assert_eq!(ctx.theme(), Theme::Light);

    // A fresh context reads the persisted choice.
    assert_eq!(UiContext::load_from(path.clone()).theme(), Theme::Light);

    assert_eq!(ctx.toggle_theme().unwrap(), Theme::Dark);
    assert_eq!(UiContext::load_from(path).theme(), Theme::Dark);
}

#[test]
fn toggle_keeps_profiles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut profiles = HashMap::new();
    profiles.insert(
        "rig".to_owned(),
        Profile {
            bridge: "http://10.0.0.5:1337".into(),
            ..Profile::default()
        },
    );
    let cfg = Config {
        default_profile: Some("rig".into()),
        defaults: Defaults::default(),
        ui: Ui::default(),
        profiles,
    };
    save_config_to(&cfg, &path).unwrap();

    UiContext::load_from(path.clone()).toggle_theme().unwrap();

    let reloaded = load_config_from(&path).unwrap();
    assert_eq!(reloaded.ui.theme, Theme::Light);
    assert_eq!(reloaded.profiles, cfg.profiles);
    assert_eq!(reloaded.default_profile.as_deref(), Some("rig"));
}

#[test]
fn toggle_does_not_persist_env_overrides() {
    figment::Jail::expect_with(|jail| {
        let path = jail.directory().join("config.toml");
        jail.set_env("TELEDASH_DEFAULTS__OUTPUT", "json");
        jail.set_env("TELEDASH_DEFAULTS__TIMEOUT", "9");
        assert_eq!(load_config_from(&path).unwrap().defaults.output, "json");

        UiContext::load_from(path.clone()).toggle_theme().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("theme = \"light\""), "{written}");
        assert!(!written.contains("json"), "{written}");
        assert!(!written.contains("timeout"), "{written}");
        Ok(())
    });
}
