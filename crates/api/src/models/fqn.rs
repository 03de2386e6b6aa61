use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified name of a class-like declaration.
///
/// Always stored without the leading namespace separator, so `\Acme\Post`
/// and `Acme\Post` are the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().trim_start_matches('\\').to_string())
    }

    /// The full name, e.g. `Acme\Blog\Post`.
    pub fn full(&self) -> &str {
        &self.0
    }

    /// The last segment, e.g. `Post`.
    pub fn short(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, `None` for global names.
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('\\').map(|(ns, _)| ns)
    }

    /// Prefix this name with a namespace (no-op for an empty namespace).
    pub fn prepend(&self, namespace: &str) -> ClassName {
        let namespace = namespace.trim_matches('\\');
        if namespace.is_empty() {
            return self.clone();
        }
        ClassName(format!("{}\\{}", namespace, self.0))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class names are case insensitive in the analysed language.
    pub fn matches(&self, other: &ClassName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        ClassName::new(value)
    }
}

impl From<String> for ClassName {
    fn from(value: String) -> Self {
        ClassName::new(value)
    }
}

impl From<&ClassName> for ClassName {
    fn from(value: &ClassName) -> Self {
        value.clone()
    }
}

impl PartialEq<&str> for ClassName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.trim_start_matches('\\')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_separator_is_dropped() {
        assert_eq!(ClassName::new("\\Articles\\Blog"), ClassName::new("Articles\\Blog"));
    }

    #[test]
    fn test_short_and_namespace() {
        let name = ClassName::new("Acme\\Blog\\Post");
        assert_eq!(name.short(), "Post");
        assert_eq!(name.namespace(), Some("Acme\\Blog"));
        assert_eq!(ClassName::new("Foobar").namespace(), None);
    }

    #[test]
    fn test_prepend() {
        assert_eq!(ClassName::new("Post").prepend("Acme"), "Acme\\Post");
        assert_eq!(ClassName::new("Post").prepend(""), "Post");
    }
}
