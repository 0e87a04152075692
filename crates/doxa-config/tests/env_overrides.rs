use doxa_config::DoxaConfig;
use figment::Jail;

#[test]
fn env_vars_override_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("DOXA_BUILDER__PARALLEL", "false");
        jail.set_env("DOXA_COMMENTS__AUTO_BRIEF", "true");

        let config = DoxaConfig::load().map_err(|e| e.to_string())?;
        assert!(!config.builder.parallel);
        assert!(config.comments.auto_brief);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".doxa")?;
        jail.create_file(".doxa/config.toml", "[builder]\nparallel_threshold = 3\n")?;
        jail.set_env("DOXA_BUILDER__PARALLEL_THRESHOLD", "12");

        let config = DoxaConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.builder.parallel_threshold, 12);
        Ok(())
    });
}

#[test]
fn invalid_env_value_surfaces_as_error() {
    Jail::expect_with(|jail| {
        jail.set_env("DOXA_BUILDER__PARALLEL_THRESHOLD", "0");

        assert!(DoxaConfig::load().is_err());
        Ok(())
    });
}
