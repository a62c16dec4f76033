#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! File type detection for a project tree.
//!
//! Walks the tree once, counting files per language [`Category`] and, for
//! files under an excluded directory, per [`Exclusion`] instead.
//! Exclusions are plain typed predicates evaluated in-process.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use walkdir::WalkDir;

mod exclusion;

pub use exclusion::{DEFAULT_EXCLUDED_DIRS, Exclusion, default_exclusions};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Glob(#[from] globset::Error),
}

/// A language (or file kind) the checker knows tools for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub language: &'static str,
    pub patterns: &'static [&'static str],
}

impl Category {
    /// Patterns joined the way they are recorded in run logs.
    #[must_use]
    pub fn pattern_label(&self) -> String {
        self.patterns.join(",")
    }
}

pub const CATEGORIES: &[Category] = &[
    Category {
        language: "python",
        patterns: &["*.py"],
    },
    Category {
        language: "typescript",
        patterns: &["*.ts", "*.tsx"],
    },
    Category {
        language: "javascript",
        patterns: &["*.js", "*.jsx", "*.mjs", "*.cjs"],
    },
    Category {
        language: "yaml",
        patterns: &["*.yml", "*.yaml"],
    },
    Category {
        language: "shell",
        patterns: &["*.sh", "*.bash"],
    },
    Category {
        language: "toml",
        patterns: &["*.toml"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguage {
    pub category: Category,
    /// Paths relative to the detection root, in walk order.
    pub files: Vec<PathBuf>,
}

impl DetectedLanguage {
    #[must_use]
    pub fn count(&self) -> u64 {
        self.files.len() as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// One entry per category, in [`CATEGORIES`] order, including empty ones.
    pub languages: Vec<DetectedLanguage>,
    /// Excluded-file count per exclusion key. Only exclusions that matched
    /// at least one file are present.
    pub exclusions: BTreeMap<String, u64>,
}

impl Detection {
    #[must_use]
    pub fn language(&self, language: &str) -> Option<&DetectedLanguage> {
        self.languages
            .iter()
            .find(|x| x.category.language == language)
    }

    #[must_use]
    pub fn count(&self, language: &str) -> u64 {
        self.language(language).map_or(0, DetectedLanguage::count)
    }

    /// Languages with at least one file.
    pub fn present(&self) -> impl Iterator<Item = &DetectedLanguage> {
        self.languages.iter().filter(|x| !x.files.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

struct Matcher {
    set: GlobSet,
    /// Category index for every glob in `set`.
    owners: Vec<usize>,
}

impl Matcher {
    fn new(categories: &[Category]) -> Result<Self, DetectError> {
        let mut builder = GlobSetBuilder::new();
        let mut owners = vec![];

        for (index, category) in categories.iter().enumerate() {
            for pattern in category.patterns {
                builder.add(Glob::new(pattern)?);
                owners.push(index);
            }
        }

        Ok(Self {
            set: builder.build()?,
            owners,
        })
    }

    fn category_of(&self, file_name: &Path) -> Option<usize> {
        self.set
            .matches(file_name)
            .first()
            .map(|glob| self.owners[*glob])
    }
}

/// Detects the built-in [`CATEGORIES`] under `root`.
///
/// # Errors
///
/// * If `root` is not a directory
/// * If a category pattern is not a valid glob
pub fn detect(root: &Path, exclusions: &[Exclusion]) -> Result<Detection, DetectError> {
    detect_categories(root, CATEGORIES, exclusions)
}

/// Detects `categories` under `root`.
///
/// A file below an excluded directory is counted for the first matching
/// exclusion and never classified. Unreadable entries are skipped.
///
/// # Errors
///
/// * If `root` is not a directory
/// * If a category pattern is not a valid glob
pub fn detect_categories(
    root: &Path,
    categories: &[Category],
    exclusions: &[Exclusion],
) -> Result<Detection, DetectError> {
    if !root.is_dir() {
        return Err(DetectError::NotADirectory(root.to_path_buf()));
    }

    let matcher = Matcher::new(categories)?;
    let mut languages = categories
        .iter()
        .map(|category| DetectedLanguage {
            category: *category,
            files: vec![],
        })
        .collect::<Vec<_>>();
    let mut excluded = BTreeMap::<String, u64>::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable path: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        if let Some(exclusion) = exclusions.iter().find(|x| x.matches(parent)) {
            *excluded.entry(exclusion.key()).or_default() += 1;
            continue;
        }

        let Some(file_name) = relative.file_name() else {
            continue;
        };
        if let Some(index) = matcher.category_of(Path::new(file_name)) {
            languages[index].files.push(relative.to_path_buf());
        }
    }

    for language in &languages {
        log::debug!(
            "detect: {} files={}",
            language.category.language,
            language.files.len()
        );
    }

    Ok(Detection {
        languages,
        exclusions: excluded,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test_log::test]
    fn counts_files_per_language() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "app/main.py",
            "app/models.py",
            "tests/test_app.py",
            "web/index.ts",
            "web/view.tsx",
            "web/legacy.js",
            ".github/workflows/ci.yml",
            "README.md",
        ] {
            touch(dir.path(), file);
        }

        let detection = detect(dir.path(), &default_exclusions()).unwrap();

        assert_eq!(detection.count("python"), 3);
        assert_eq!(detection.count("typescript"), 2);
        assert_eq!(detection.count("javascript"), 1);
        assert_eq!(detection.count("yaml"), 1);
        assert_eq!(detection.count("shell"), 0);
        assert!(detection.exclusions.is_empty());
        assert_eq!(
            detection.language("python").unwrap().files,
            vec![
                PathBuf::from("app/main.py"),
                PathBuf::from("app/models.py"),
                PathBuf::from("tests/test_app.py"),
            ]
        );
    }

    #[test_log::test]
    fn excluded_directories_are_counted_not_classified() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "src/index.js",
            "node_modules/left-pad/index.js",
            "node_modules/left-pad/package.json",
            "packages/ui/node_modules/react/index.js",
            ".venv/lib/site.py",
        ] {
            touch(dir.path(), file);
        }

        let detection = detect(dir.path(), &default_exclusions()).unwrap();

        assert_eq!(detection.count("javascript"), 1);
        assert_eq!(detection.count("python"), 0);
        assert_eq!(
            detection.exclusions,
            BTreeMap::from([("node_modules".to_string(), 3), (".venv".to_string(), 1)])
        );
    }

    #[test_log::test]
    fn empty_tree_detects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let detection = detect(dir.path(), &[]).unwrap();

        assert!(detection.is_empty());
        assert_eq!(detection.languages.len(), CATEGORIES.len());
    }

    #[test_log::test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "").unwrap();

        assert!(matches!(
            detect(&file, &[]),
            Err(DetectError::NotADirectory(_))
        ));
    }

    #[test_log::test]
    fn pattern_label_joins_patterns() {
        assert_eq!(CATEGORIES[1].pattern_label(), "*.ts,*.tsx");
    }
}
