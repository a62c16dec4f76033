use std::path::{Component, Path, PathBuf};

/// Directory names excluded from detection unless configured otherwise.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".git",
    "dist",
    "build",
    ".mypy_cache",
    ".ruff_cache",
    ".pytest_cache",
    ".tox",
    "target",
];

/// A predicate over directories (relative to the detection root) whose
/// files are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Any directory with this name, at any depth.
    DirName(String),
    /// One specific directory, relative to the root.
    PathPrefix(PathBuf),
}

impl Exclusion {
    /// Parses a configured exclusion. Values containing a path separator are
    /// root-relative prefixes, anything else is a directory name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim().trim_end_matches('/');
        if trimmed.contains('/') {
            Self::PathPrefix(PathBuf::from(trimmed.trim_start_matches("./")))
        } else {
            Self::DirName(trimmed.to_string())
        }
    }

    /// Key under which excluded files are counted.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::DirName(name) => name.clone(),
            Self::PathPrefix(prefix) => prefix.to_string_lossy().into_owned(),
        }
    }

    /// Whether files directly inside `relative_dir` are excluded.
    #[must_use]
    pub fn matches(&self, relative_dir: &Path) -> bool {
        match self {
            Self::DirName(name) => relative_dir.components().any(|component| {
                matches!(component, Component::Normal(x) if x == name.as_str())
            }),
            Self::PathPrefix(prefix) => relative_dir.starts_with(prefix),
        }
    }
}

#[must_use]
pub fn default_exclusions() -> Vec<Exclusion> {
    DEFAULT_EXCLUDED_DIRS
        .iter()
        .map(|name| Exclusion::DirName((*name).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn parse_distinguishes_names_from_prefixes() {
        assert_eq!(
            Exclusion::parse("node_modules"),
            Exclusion::DirName("node_modules".to_string())
        );
        assert_eq!(
            Exclusion::parse("./vendor/generated/"),
            Exclusion::PathPrefix(PathBuf::from("vendor/generated"))
        );
    }

    #[test_log::test]
    fn dir_name_matches_at_any_depth() {
        let exclusion = Exclusion::DirName("node_modules".to_string());

        assert!(exclusion.matches(Path::new("node_modules")));
        assert!(exclusion.matches(Path::new("web/node_modules/react")));
        assert!(!exclusion.matches(Path::new("web/node_modules_backup")));
        assert!(!exclusion.matches(Path::new("")));
    }

    #[test_log::test]
    fn prefix_matches_only_below_the_prefix() {
        let exclusion = Exclusion::parse("vendor/generated");

        assert!(exclusion.matches(Path::new("vendor/generated")));
        assert!(exclusion.matches(Path::new("vendor/generated/api")));
        assert!(!exclusion.matches(Path::new("vendor")));
        assert!(!exclusion.matches(Path::new("src/vendor/generated")));
        assert_eq!(exclusion.key(), "vendor/generated");
    }
}
