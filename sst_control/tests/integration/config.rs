//! Configuration loading and rejection at construction.

use std::io::Write;
use std::path::Path;

use sst_common::config::ConfigError;
use sst_common::robot::config::CoreConfig;
use sst_control::config::{load_config, load_config_from_str};
use sst_control::cycle::ControlCore;
use tempfile::NamedTempFile;

#[test]
fn toml_round_trip_through_loader() {
    let mut config = CoreConfig::default();
    config.arm.kp = 7.5;
    config.arm.max_velocity = 2.5;
    config.extension.settle_time_s = 0.4;
    config.balance.backward.pitch_trip_deg = 11.0;
    config.shared.service_name = "sst-bench".to_string();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml::to_string(&config).unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();

    let loaded = load_config(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_keys_take_defaults() {
    let config = load_config_from_str(
        r#"
[arm]
kp = 4.0

[balance.forward]
pitch_trip_deg = 12.0
pitch_debounce_s = 0.5
"#,
    )
    .unwrap();
    assert_eq!(config.arm.kp, 4.0);
    assert_eq!(config.arm.kd, 0.3);
    assert_eq!(config.balance.forward.pitch_trip_deg, 12.0);
    assert_eq!(config.balance.forward.approach_volts, 3.0);
    assert_eq!(config.balance.backward.pitch_trip_deg, 10.0);
    assert_eq!(config.cycle.tick_period_s, 0.02);
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/sst.toml");
    let config = load_config(&path).unwrap();
    assert!(ControlCore::new(config).is_ok());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let result = load_config_from_str("[arm\nkp = ");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

fn assert_rejected(label: &str, mutate: impl FnOnce(&mut CoreConfig)) {
    let mut config = CoreConfig::default();
    mutate(&mut config);
    let result = ControlCore::new(config);
    assert!(
        matches!(result, Err(ConfigError::ValidationError(_))),
        "{label} accepted"
    );
}

#[test]
fn out_of_range_values_rejected_by_core() {
    assert_rejected("negative velocity", |c| c.arm.max_velocity = -1.0);
    assert_rejected("zero acceleration", |c| c.arm.max_acceleration = 0.0);
    assert_rejected("zero tick", |c| c.cycle.tick_period_s = 0.0);
    assert_rejected("zero settle", |c| c.extension.settle_time_s = 0.0);
    assert_rejected("negative tolerance", |c| {
        c.superstructure.retract_skip_tolerance_deg = -1.0
    });
    assert_rejected("negative gain", |c| c.arm.kp = -6.0);
    assert_rejected("approach above supply", |c| {
        c.balance.forward.approach_volts = 13.0
    });
    assert_rejected("filter taps", |c| c.intake.current_filter_taps = 0);
}
