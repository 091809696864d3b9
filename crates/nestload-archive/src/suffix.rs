//! Archive-type recognition by file name suffix.

/// Suffixes recognized when no configuration overrides them.
pub const DEFAULT_SUFFIXES: &[&str] = &[".jar", ".war"];

/// Case-insensitive set of file name suffixes that mark an entry as an archive.
///
/// Suffixes are stored lowercased with a leading dot, so `"JAR"`, `"jar"` and
/// `".jar"` all configure the same suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSuffixes {
    suffixes: Vec<String>,
}

impl ArchiveSuffixes {
    /// Build a suffix set, normalizing each suffix and dropping blanks and duplicates.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for suffix in suffixes {
            if let Some(suffix) = normalize(suffix.as_ref()) {
                if !normalized.contains(&suffix) {
                    normalized.push(suffix);
                }
            }
        }
        Self {
            suffixes: normalized,
        }
    }

    /// Check whether `name` ends with one of the recognized suffixes.
    pub fn is_archive(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }

    /// Iterate over the normalized suffixes.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

impl Default for ArchiveSuffixes {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIXES)
    }
}

fn normalize(suffix: &str) -> Option<String> {
    let trimmed = suffix.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suffixes() {
        let suffixes = ArchiveSuffixes::default();
        assert!(suffixes.is_archive("lib/inner.jar"));
        assert!(suffixes.is_archive("webapp.war"));
        assert!(!suffixes.is_archive("com/example/Main.unit"));
        assert!(!suffixes.is_archive("jar"));
    }

    #[test]
    fn test_case_insensitive() {
        let suffixes = ArchiveSuffixes::default();
        assert!(suffixes.is_archive("LIB/INNER.JAR"));
        assert!(suffixes.is_archive("Mixed.War"));
    }

    #[test]
    fn test_normalization() {
        let suffixes = ArchiveSuffixes::new(["ZIP", ".Ear", "  ", ".", "zip"]);
        let collected: Vec<&str> = suffixes.iter().collect();
        assert_eq!(collected, vec![".zip", ".ear"]);
        assert!(suffixes.is_archive("bundle.zip"));
        assert!(!suffixes.is_archive("bundle.jar"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let suffixes = ArchiveSuffixes::new(Vec::<String>::new());
        assert!(suffixes.is_empty());
        assert!(!suffixes.is_archive("a.jar"));
    }
}
