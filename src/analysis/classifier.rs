//! Line-level classification of unified diff patches.
//!
//! Only added lines are scanned, each one independently. A line can count
//! towards several markers at once.

use std::fmt;

use crate::github::{AnalysisError, FileDiff};

use super::aggregate::MarkerCounts;

/// Default test-annotation marker text.
pub const DEFAULT_TEST_MARKER: &str = "[Test]";
/// Default assistant-attribution marker text.
pub const DEFAULT_ASSISTANT_MARKER: &str = "Added by copilot";
/// Default extension filter.
pub const DEFAULT_FILE_EXTENSIONS: &str = ".cs";

/// Categories of marker counted in added lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Test annotation.
    Test,
    /// Assistant attribution.
    Assistant,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => f.write_str("test"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// A marker text and the category it counts towards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPattern {
    kind: MarkerKind,
    needle: String,
    case_insensitive: bool,
}

impl MarkerPattern {
    /// Creates a pattern matching `text` anywhere in an added line.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when `text` is blank, since
    /// an empty marker would match every line.
    pub fn new(kind: MarkerKind, text: &str, case_insensitive: bool) -> Result<Self, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::Configuration {
                message: format!("the {kind} marker must not be blank"),
            });
        }

        let needle = if case_insensitive {
            text.to_lowercase()
        } else {
            text.to_owned()
        };
        Ok(Self {
            kind,
            needle,
            case_insensitive,
        })
    }

    /// The category this pattern counts towards.
    #[must_use]
    pub const fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Whether `line` contains the marker.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        if self.case_insensitive {
            line.to_lowercase().contains(&self.needle)
        } else {
            line.contains(&self.needle)
        }
    }
}

/// Case-insensitive file extension allow-list. An empty list accepts all
/// files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Parses a comma-separated list such as `".cs, .fs"`. A missing leading
    /// dot is added.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let extensions = list
            .split(',')
            .map(str::trim)
            .filter(|extension| !extension.is_empty())
            .map(|extension| {
                let lowered = extension.to_lowercase();
                if lowered.starts_with('.') {
                    lowered
                } else {
                    format!(".{lowered}")
                }
            })
            .collect();
        Self { extensions }
    }

    /// Whether `file_name` should be scanned.
    #[must_use]
    pub fn accepts(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let lowered = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|extension| lowered.ends_with(extension.as_str()))
    }
}

/// Counts marker occurrences in the added lines of a file's patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffClassifier {
    filter: ExtensionFilter,
    patterns: Vec<MarkerPattern>,
}

impl DiffClassifier {
    /// Creates a classifier from an extension filter and marker patterns.
    #[must_use]
    pub const fn new(filter: ExtensionFilter, patterns: Vec<MarkerPattern>) -> Self {
        Self { filter, patterns }
    }

    /// Builds the test/assistant classifier from marker texts.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when either marker is blank.
    pub fn with_markers(
        filter: ExtensionFilter,
        test_marker: &str,
        assistant_marker: &str,
        case_insensitive: bool,
    ) -> Result<Self, AnalysisError> {
        let patterns = vec![
            MarkerPattern::new(MarkerKind::Test, test_marker, case_insensitive)?,
            MarkerPattern::new(MarkerKind::Assistant, assistant_marker, case_insensitive)?,
        ];
        Ok(Self::new(filter, patterns))
    }

    /// Classifies one changed file.
    ///
    /// Files rejected by the extension filter and files without a patch
    /// contribute zero.
    #[must_use]
    pub fn classify(&self, file_name: &str, patch: Option<&str>) -> MarkerCounts {
        let mut counts = MarkerCounts::default();
        if !self.filter.accepts(file_name) {
            return counts;
        }
        let Some(text) = patch else {
            return counts;
        };

        let mut in_hunk = false;
        for line in text.lines() {
            if line.starts_with("@@") {
                in_hunk = true;
                continue;
            }
            if line.starts_with("diff ") {
                in_hunk = false;
                continue;
            }
            if !is_added_line(line, in_hunk) {
                continue;
            }
            for pattern in &self.patterns {
                if pattern.matches(line) {
                    counts.record(pattern.kind());
                }
            }
        }
        counts
    }

    /// Classifies a [`FileDiff`].
    #[must_use]
    pub fn classify_file(&self, file: &FileDiff) -> MarkerCounts {
        self.classify(&file.file_name, file.patch.as_deref())
    }
}

impl Default for DiffClassifier {
    fn default() -> Self {
        Self::new(
            ExtensionFilter::parse(DEFAULT_FILE_EXTENSIONS),
            vec![
                MarkerPattern {
                    kind: MarkerKind::Test,
                    needle: DEFAULT_TEST_MARKER.to_owned(),
                    case_insensitive: false,
                },
                MarkerPattern {
                    kind: MarkerKind::Assistant,
                    needle: DEFAULT_ASSISTANT_MARKER.to_owned(),
                    case_insensitive: false,
                },
            ],
        )
    }
}

/// Outside a hunk, `+++ ` introduces the new-file header rather than content.
fn is_added_line(line: &str, in_hunk: bool) -> bool {
    line.starts_with('+') && (in_hunk || !line.starts_with("+++ "))
}
