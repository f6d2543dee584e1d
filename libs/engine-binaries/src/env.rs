use std::collections::HashMap;

/// Where override variables are read from.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;

    /// The variable's value if it is set and non-empty.
    fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name).filter(|v| !v.is_empty())
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_do_not_count() {
        let env: HashMap<String, String> = [
            ("SET".to_string(), "/bin/qe".to_string()),
            ("EMPTY".to_string(), String::new()),
        ]
        .into();
        assert_eq!(env.non_empty("SET").as_deref(), Some("/bin/qe"));
        assert_eq!(env.var("EMPTY").as_deref(), Some(""));
        assert!(env.non_empty("EMPTY").is_none());
        assert!(env.non_empty("UNSET").is_none());
    }
}
