use std::collections::HashMap;

/// Best-effort reverse lookup of the subject a URL belongs to.
/// Returns 0 when unknown; never fails and never blocks a dispatch.
pub trait SubjectResolver: Send + Sync {
    fn resolve(&self, url: &str) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubjects;

impl SubjectResolver for NoSubjects {
    fn resolve(&self, _url: &str) -> u64 {
        0
    }
}

/// Exact URL -> subject id map.
#[derive(Debug, Clone, Default)]
pub struct StaticSubjects(pub HashMap<String, u64>);

impl SubjectResolver for StaticSubjects {
    fn resolve(&self, url: &str) -> u64 {
        self.0.get(url).copied().unwrap_or(0)
    }
}

impl<F> SubjectResolver for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn resolve(&self, url: &str) -> u64 {
        self(url)
    }
}
