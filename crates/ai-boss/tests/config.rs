mod common;

use ai_boss::{ConfigError, PatternConfig, PatternLayer, PhaseConfig};

#[test]
fn valid_config_loads_with_sorted_phases() {
    let layer = PatternLayer::new(&common::warden()).unwrap();
    assert_eq!(layer.phase_count(), 3);
    assert_eq!(layer.phase(), 0);
    assert_eq!(layer.phase_name(), "opening");
    assert_eq!(layer.machine().threshold(1), Some(0.5));
    assert_eq!(layer.enabled(), &[0, 1]);
}

#[test]
fn duplicate_thresholds_name_both_phases() {
    let mut config = common::warden();
    config.phases[2].threshold = 0.5;
    let err = config.validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateThreshold {
            phase: "desperate".into(),
            other: "enraged".into(),
            threshold: 0.5,
        }
    );
}

#[test]
fn unknown_pattern_in_phase_is_rejected() {
    let mut config = common::warden();
    config.phases[1].patterns.push("stomp".into());
    assert_eq!(
        PatternLayer::new(&config).unwrap_err(),
        ConfigError::UnknownPattern {
            phase: "opening".into(),
            pattern: "stomp".into(),
        }
    );
}

#[test]
fn duplicate_pattern_ids_are_rejected() {
    let mut config = common::warden();
    config.patterns.push(PatternConfig::new("slam", 1.0, 0.5));
    assert!(matches!(
        config.validate(),
        Err(ConfigError::DuplicatePattern { pattern }) if pattern == "slam"
    ));
}

#[test]
fn pattern_parameters_are_checked() {
    let cases = [
        PatternConfig::new("a", 1.0, 0.0),
        PatternConfig::new("a", -1.0, 0.5),
        PatternConfig::new("a", 1.0, 0.5).weight(0.0),
        PatternConfig::new("a", 1.0, 0.5).complexity(1.5),
        PatternConfig::new("a", 1.0, 0.5).max_range(0.0),
        PatternConfig::new("", 1.0, 0.5),
    ];
    for pattern in cases {
        let mut config = common::warden();
        config.patterns.push(pattern.clone());
        assert!(
            matches!(config.validate(), Err(ConfigError::InvalidPattern { .. })),
            "{pattern:?}"
        );
    }
}

#[test]
fn thresholds_must_be_fractions() {
    let mut config = common::warden();
    config.phases.push(PhaseConfig::new("overdrive", 1.5, ["slam"]));
    let err = config.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "phase `overdrive` has threshold 1.5, expected a value in (0, 1]"
    );
}

#[test]
fn empty_tables_are_rejected() {
    let mut config = common::warden();
    config.phases.clear();
    assert!(matches!(config.validate(), Err(ConfigError::NoPhases { .. })));

    let mut config = common::warden();
    config.patterns.clear();
    assert!(matches!(config.validate(), Err(ConfigError::NoPatterns { .. })));
}
