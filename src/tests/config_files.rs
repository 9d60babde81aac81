#[cfg(test)]
mod tests {
    use std::path::Path;

    use serial_test::serial;

    use crate::app::App;
    use crate::config::notifier::{CredentialValue, RotationType, YesNo};
    use crate::config::proc_loader::{file_to_config, parse_config};
    use crate::config::settings::LogFormat;
    use crate::rotation::RetentionPolicy;
    use crate::store::{NewLogEntry, NotificationType};
    use crate::utils::config_loader;

    const DEMO_CONFIG: &str = "demos/index-notifier.yaml";

    #[tokio::test]
    #[serial]
    async fn demo_config_is_valid_with_defaults() {
        std::env::remove_var("INDEX_NOTIFIER_CREDENTIALS");
        std::env::remove_var("INDEX_NOTIFIER_DB");

        let cfg = file_to_config(Path::new(DEMO_CONFIG))
            .await
            .expect("demos/index-notifier.yaml must exist in repo root for tests");

        assert!(cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.logging.as_ref().unwrap().format, LogFormat::Compact);
        assert!(cfg.indexing.is_target_subject_type("post"));
        assert!(!cfg.indexing.is_target_subject_type("attachment"));
        assert_eq!(cfg.auth.safety_margin_seconds, Some(300));
        match &cfg.auth.credentials {
            Some(CredentialValue::FromFile { path }) => {
                assert_eq!(path, "/etc/index-notifier/service-account.json")
            }
            other => panic!("expected file credentials, got {:?}", other),
        }
        assert_eq!(cfg.storage.path, "/var/lib/index-notifier/notifications.db");
        assert_eq!(cfg.storage.delete_data_on_uninstall, YesNo::No);
        assert_eq!(cfg.rotation.policy(), RetentionPolicy::LatestPerSubject);
    }

    #[tokio::test]
    #[serial]
    async fn demo_config_takes_environment_overrides() {
        std::env::set_var("INDEX_NOTIFIER_DB", "/tmp/index-notifier-test.db");
        let cfg = config_loader::run(DEMO_CONFIG).await.unwrap();
        std::env::remove_var("INDEX_NOTIFIER_DB");

        assert_eq!(cfg.storage.path, "/tmp/index-notifier-test.db");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = config_loader::run("demos/does-not-exist.yaml").await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid config format"));
    }

    #[tokio::test]
    async fn rotation_type_selects_the_policy() {
        let cfg = parse_config("rotation:\n  rotation_type: latest_per_post\n".to_owned()).await.unwrap();
        assert_eq!(cfg.rotation.rotation_type, RotationType::LatestPerSubject);

        let cfg = parse_config("rotation:\n  rotation_type: count\n  rotation_value_count: 250\n".to_owned())
            .await
            .unwrap();
        assert_eq!(cfg.rotation.policy(), RetentionPolicy::MaxCount { count: 250 });

        let cfg = parse_config("rotation:\n  rotation_type: days\n".to_owned()).await.unwrap();
        assert_eq!(cfg.rotation.policy(), RetentionPolicy::MaxAge { days: 30 });
    }

    #[tokio::test]
    async fn credential_sources_parse_by_shape() {
        let yaml = "auth:\n  credentials:\n    from_env: INDEXING_SA_JSON\n";
        let cfg = parse_config(yaml.to_owned()).await.unwrap();
        assert!(matches!(
            cfg.auth.credentials,
            Some(CredentialValue::FromEnv { ref from_env }) if from_env == "INDEXING_SA_JSON"
        ));

        let yaml = "auth:\n  credentials:\n    value: '{\"type\":\"service_account\"}'\n";
        let cfg = parse_config(yaml.to_owned()).await.unwrap();
        assert!(matches!(cfg.auth.credentials, Some(CredentialValue::Literal { .. })));
    }

    #[tokio::test]
    async fn uninstall_honours_the_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("notifications.db");

        let mut cfg = parse_config("{}".to_owned()).await.unwrap();
        cfg.storage.path = db.display().to_string();

        let app = App::build(cfg.clone()).unwrap();
        app.store
            .append(NewLogEntry::new(1, "https://example.com/", NotificationType::UrlUpdated, "200", "ok"))
            .unwrap();
        assert!(!app.uninstall().unwrap());
        assert_eq!(app.store.count().unwrap(), 1);

        cfg.storage.delete_data_on_uninstall = YesNo::Yes;
        let app = App::build(cfg).unwrap();
        assert_eq!(app.store.count().unwrap(), 1);
        assert!(app.uninstall().unwrap());
        assert!(app.store.count().is_err());
    }
}
