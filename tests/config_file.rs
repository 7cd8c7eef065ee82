use neuroracer_lib::model::AppConfig;

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
    let config = AppConfig::load(path).expect("shipped config parses");
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.fingerprint(), AppConfig::default().fingerprint());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = AppConfig::from_toml("[vehicle]\nmax_speed = 12.0\n").expect("valid");
    assert_eq!(config.vehicle.max_speed, 12.0);
    assert_eq!(config.radar, AppConfig::default().radar);
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(AppConfig::from_toml("[vehicle]\nfriction = 1.5\n").is_err());
    assert!(AppConfig::from_toml("[radar]\nangles = []\n").is_err());
}
