#![cfg(feature = "serde")]

use ai_boss::{BossConfig, ConfigError, PatternLayer};

const WARDEN: &str = r#"
name: warden
reversible_phases: false
patterns:
  - id: slam
    cooldown: 2.0
    weight: 3.0
    telegraph: 0.5
    active: 0.5
    damage: 10
  - id: barrage
    cooldown: 4.0
    telegraph: 1.0
    complexity: 1.0
    max_range: 8
phases:
  - name: opening
    threshold: 1.0
    patterns: [slam]
  - name: enraged
    threshold: 0.5
    patterns: [slam, barrage]
    clear_cooldowns: true
"#;

#[test]
fn boss_config_loads_from_yaml() {
    let config: BossConfig = serde_yaml::from_str(WARDEN).unwrap();
    assert_eq!(config.patterns.len(), 2);
    assert_eq!(config.patterns[1].weight, 1.0);
    assert_eq!(config.patterns[1].max_range, Some(8.0));
    assert!(config.phases[1].clear_cooldowns);
    assert!(!config.phases[0].clear_cooldowns);

    let layer = PatternLayer::new(&config).unwrap();
    assert_eq!(layer.enabled(), &[0]);
}

#[test]
fn invalid_yaml_config_fails_validation_not_parsing() {
    let config: BossConfig =
        serde_yaml::from_str(&WARDEN.replace("threshold: 0.5", "threshold: 1.0")).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::DuplicateThreshold { .. })
    ));
}

#[test]
fn config_survives_json() {
    let config: BossConfig = serde_yaml::from_str(WARDEN).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let back: BossConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
