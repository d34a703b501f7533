//! Span module - Source location tracking.
//!
//! Locations are 0-based internally (both line and column). The renderer is
//! the only place that humanizes them to the 1-based form users see.

use std::fmt;
use std::path::{Path, PathBuf};

/// A line/column coordinate inside a source file.
///
/// # Examples
///
/// ```
/// use wombatc_util::span::Location;
///
/// let loc = Location::new(2, 7);
/// assert_eq!(loc.line, 2);
/// assert_eq!(loc.col, 7);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// Line number (0-based).
    pub line: usize,
    /// Column number (0-based).
    pub col: usize,
}

impl Location {
    /// A dummy location pointing at the start of the file.
    ///
    /// Think of it as the singularity every malformed construct collapses to.
    pub const SINGULARITY: Location = Location { line: 0, col: 0 };

    #[inline]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humanized, 1-based.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// A cited region of source code: a file, a location, and the source lines
/// that contain it. Regions are what diagnostic labels point at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Path of the file the region lives in.
    pub file: PathBuf,
    /// Anchor of the region (0-based).
    pub location: Location,
    /// The raw source lines covering the region, first line containing
    /// the anchor.
    pub source: Vec<String>,
}

impl Region {
    pub fn new(file: impl Into<PathBuf>, location: Location, source: Vec<String>) -> Self {
        Self {
            file: file.into(),
            location,
            source,
        }
    }
}

/// A source file held fully in memory as lines.
///
/// The lexer builds one of these while reading the input; later stages use it
/// to turn bare [`Location`]s into renderable [`Region`]s.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    /// Path the file was read from.
    pub path: PathBuf,
    /// The file content, split into lines without terminators.
    pub lines: Vec<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    /// Reads a file from disk, splitting it into lines.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: content.lines().map(str::to_owned).collect(),
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the text of a single line, or `""` when out of range.
    pub fn line(&self, line: usize) -> &str {
        self.lines.get(line).map(String::as_str).unwrap_or("")
    }

    /// Builds a one-line [`Region`] anchored at `location`.
    pub fn region_at(&self, location: Location) -> Region {
        Region::new(
            self.path.clone(),
            location,
            vec![self.line(location.line).to_owned()],
        )
    }
}
