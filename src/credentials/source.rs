use std::{env, fs};

use tracing::warn;

use crate::config::notifier::CredentialValue;

/// "The one configured credential": yields the raw key JSON, if any.
///
/// Resolved on every dispatch so a rotated key file or env var is picked up
/// without a restart. `None` and blank strings both mean "not configured".
pub trait CredentialSource: Send + Sync {
    fn raw_credentials(&self) -> Option<String>;
}

impl CredentialSource for CredentialValue {
    fn raw_credentials(&self) -> Option<String> {
        match self {
            CredentialValue::Literal { value } => Some(value.to_owned()),
            CredentialValue::FromEnv { from_env } => env::var(from_env)
                .inspect_err(|err| warn!("credential env var '{}' unavailable: {}", from_env, err))
                .ok(),
            CredentialValue::FromFile { path } => fs::read_to_string(path)
                .inspect_err(|err| warn!("credential file '{}' unreadable: {}", path, err))
                .ok(),
        }
    }
}

impl<T: CredentialSource> CredentialSource for Option<T> {
    fn raw_credentials(&self) -> Option<String> {
        self.as_ref().and_then(|source| source.raw_credentials())
    }
}

impl CredentialSource for String {
    fn raw_credentials(&self) -> Option<String> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn env_source_reads_variable() {
        env::set_var("INDEX_NOTIFIER_SA_TEST", "{\"type\":\"service_account\"}");
        let source = CredentialValue::FromEnv { from_env: "INDEX_NOTIFIER_SA_TEST".into() };
        assert_eq!(source.raw_credentials().as_deref(), Some("{\"type\":\"service_account\"}"));

        env::remove_var("INDEX_NOTIFIER_SA_TEST");
        assert_eq!(source.raw_credentials(), None);
    }

    #[test]
    fn file_source_reads_each_time() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first").unwrap();
        let source = CredentialValue::FromFile { path: file.path().display().to_string() };
        assert_eq!(source.raw_credentials().as_deref(), Some("first"));

        std::fs::write(file.path(), "second").unwrap();
        assert_eq!(source.raw_credentials().as_deref(), Some("second"));
    }

    #[test]
    fn absent_source_is_unconfigured() {
        let source: Option<CredentialValue> = None;
        assert_eq!(source.raw_credentials(), None);
        let missing = CredentialValue::FromFile { path: "/nonexistent/sa.json".into() };
        assert_eq!(missing.raw_credentials(), None);
    }
}
