use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, err, none, ok, some};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Loading
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let (_temp, _guard) = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.api.timeout_secs, eq(30));
    assert_that!(config.board.hide_empty_lanes, eq(false));
    assert_that!(config.board.config_id.as_deref(), none());
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [api]
            base_url = "https://contoso.crm.dynamics.com"
            timeout_secs = 10

            [board]
            config_id = "b0a8e5c2-0000-0000-0000-000000000001"
            hide_empty_lanes = true

            [logging]
            level = "debug"
            colored = false
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.api.base_url.as_str(), eq("https://contoso.crm.dynamics.com"));
    assert_that!(config.api.timeout_secs, eq(10));
    assert_that!(
        config.board.config_id.as_deref(),
        some(eq("b0a8e5c2-0000-0000-0000-000000000001"))
    );
    assert_that!(config.board.hide_empty_lanes, eq(true));
    assert_that!(*config.logging.level, eq(LevelFilter::Debug));
    assert_that!(config.logging.colored, eq(false));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_wins() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[api]\ntimeout_secs = 10").unwrap();
    let _timeout = EnvGuard::set("PK_API_TIMEOUT_SECS", "45");
    let _hide = EnvGuard::set("PK_BOARD_HIDE_EMPTY_LANES", "1");
    let _user = EnvGuard::set("PK_API_USER_ID", "u-1");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.api.timeout_secs, eq(45));
    assert_that!(config.board.hide_empty_lanes, eq(true));
    assert_that!(config.api.user_id.as_deref(), some(eq("u-1")));
}

#[test]
#[serial]
fn given_unparseable_env_number_when_load_then_keeps_previous_value() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _timeout = EnvGuard::set("PK_API_TIMEOUT_SECS", "soon");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.api.timeout_secs, eq(30));
}

#[test]
#[serial]
fn given_invalid_toml_when_load_then_error_names_file() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[api\nbase_url = ").unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
    assert_that!(result.unwrap_err().to_string(), contains_substring("config.toml"));
}

#[test]
#[serial]
fn given_no_config_dir_env_when_config_dir_then_relative_to_cwd() {
    // Given
    let _guard = EnvGuard::remove("PK_CONFIG_DIR");

    // When
    let dir = Config::config_dir().unwrap();

    // Then
    assert!(dir.ends_with(".pk"));
}

// =========================================================================
// Validation
// =========================================================================

#[test]
#[serial]
fn given_env_base_url_without_scheme_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _url = EnvGuard::set("PK_API_BASE_URL", "contoso");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_blank_log_file_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _file = EnvGuard::set("PK_LOG_FILE", " ");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
    assert_that!(result.unwrap_err().to_string(), contains_substring("logging.file"));
}
