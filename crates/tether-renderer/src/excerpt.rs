//! Code excerpt engine.
//!
//! Resolves a code reference (`@[label](path)` or `path#label`) to the
//! labeled segment of a source file, applies the embedded directive
//! language, normalizes indentation, and tags the result with a
//! language guessed from the file extension.
//!
//! Label markers are `#<label>` lines in the source file; directives
//! are `###insert: <code>###`, `###skip: <N>`, `###skip` and
//! `###replace: <code>###`. A reference that yields no segment is a
//! soft failure rendered inline; the rest of the page still builds.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use tether_files::FileRepository;

/// Render-scoped memoizing cache of source-file lines.
///
/// A given path is loaded through the repository at most once per
/// render; unreadable files are remembered as `None`. The cache is
/// owned by one render's snippet plugin and never shared.
pub struct SourceFiles<'a> {
    repo: &'a dyn FileRepository,
    cache: HashMap<String, Option<Vec<String>>>,
}

impl<'a> SourceFiles<'a> {
    /// Create an empty cache over the given repository.
    #[must_use]
    pub fn new(repo: &'a dyn FileRepository) -> Self {
        Self {
            repo,
            cache: HashMap::new(),
        }
    }

    /// Lines of the file at `path`, loading and memoizing on first use.
    pub fn lines(&mut self, path: &str) -> Option<&[String]> {
        if !self.cache.contains_key(path) {
            let loaded = self
                .repo
                .load_file(path)
                .map(|text| text.lines().map(ToOwned::to_owned).collect());
            self.cache.insert(path.to_owned(), loaded);
        }
        self.cache.get(path).and_then(Option::as_deref)
    }

    /// Look up a bare file name anywhere in the repository.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<String> {
        self.repo.find_file_with_name(name)
    }
}

/// Outcome of resolving a code reference.
#[derive(Debug, PartialEq, Eq)]
pub enum Snippet {
    /// Extracted code, ready for a `<pre><code>` block.
    Code {
        /// Joined segment lines, no trailing newline.
        text: String,
        /// Language guessed from the file extension.
        language: Option<String>,
    },
    /// The reference produced no segment; rendered as inline text.
    Missing {
        /// The label that was looked for.
        label: String,
        /// The source path as written at the call site.
        source: String,
    },
}

/// Resolve a code reference to a snippet.
///
/// `source` may carry a `#label` suffix; otherwise `link_label` (the
/// reference's visible text) names the segment. An empty label selects
/// the whole file. Relative paths resolve against `page_dir`; a
/// leading `/` makes the path repository-rooted.
pub fn extract(
    files: &mut SourceFiles<'_>,
    source: &str,
    link_label: &str,
    page_dir: Option<&str>,
) -> Snippet {
    let (path, label) = match source.split_once('#') {
        Some((path, label)) => (path, label),
        None => (source, link_label),
    };

    let missing = || Snippet::Missing {
        label: label.to_owned(),
        source: source.to_owned(),
    };

    let Some(resolved) = locate_file(files, path, page_dir) else {
        return missing();
    };
    let lines = files.lines(&resolved).unwrap_or(&[]);

    let Some(segment) = locate_segment(lines, label) else {
        return missing();
    };

    Snippet::Code {
        text: apply_directives(&segment),
        language: language_of(&resolved),
    }
}

/// Resolve the file path and make sure it loads, falling back to a
/// repository-wide name search for bare file names.
fn locate_file(files: &mut SourceFiles<'_>, path: &str, page_dir: Option<&str>) -> Option<String> {
    let resolved = if let Some(rooted) = path.strip_prefix('/') {
        rooted.to_owned()
    } else {
        match page_dir {
            Some(dir) if !dir.is_empty() => format!("{dir}/{path}"),
            _ => path.to_owned(),
        }
    };

    if files.lines(&resolved).is_some() {
        return Some(resolved);
    }
    if !path.contains('/') {
        let found = files.locate(path)?;
        if files.lines(&found).is_some() {
            return Some(found);
        }
    }
    None
}

/// Extract the labeled segment, or the whole file for an empty label.
///
/// A line carries the label iff it matches
/// `<optional-leading-whitespace>#<label><whitespace-or-end-of-line>`;
/// the label is escaped, so source-file content cannot inject pattern
/// syntax. Returns `None` when the segment comes out empty.
fn locate_segment(lines: &[String], label: &str) -> Option<Vec<String>> {
    if label.is_empty() {
        if lines.is_empty() {
            return None;
        }
        return Some(lines.to_vec());
    }

    let pattern = format!(r"^\s*#{}(\s|$)", regex::escape(label));
    let marker = Regex::new(&pattern).expect("escaped label is a valid pattern");

    let segment: Vec<String> = lines
        .iter()
        .skip_while(|line| !marker.is_match(line))
        .skip(1)
        .take_while(|line| !marker.is_match(line))
        .cloned()
        .collect();

    if segment.is_empty() { None } else { Some(segment) }
}

/// Strip the common indent and run the directive state machine.
fn apply_directives(segment: &[String]) -> String {
    let indent = segment
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_spaces(line))
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(segment.len());
    let mut pending_skip = 0usize;

    for line in segment {
        if pending_skip > 0 {
            pending_skip -= 1;
            continue;
        }
        let trimmed = line.trim_start();
        if let Some(code) = directive_payload(trimmed, "###insert:") {
            out.push(code.to_owned());
        } else if let Some(count) = trimmed.strip_prefix("###skip:") {
            pending_skip = count.trim().parse().unwrap_or(0);
        } else if trimmed.trim_end() == "###skip" {
            // drops only the marker line itself
        } else if let Some(code) = directive_payload(trimmed, "###replace:") {
            out.push(code.to_owned());
            pending_skip = 1;
        } else {
            out.push(strip_indent(line, indent).to_owned());
        }
    }

    out.join("\n")
}

/// Payload of an `###insert:`/`###replace:` directive: the text after
/// the marker, without one leading space or the closing `###`.
fn directive_payload<'l>(line: &'l str, marker: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(marker)?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    Some(rest.strip_suffix("###").unwrap_or(rest))
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn strip_indent(line: &str, indent: usize) -> &str {
    &line[leading_spaces(line).min(indent)..]
}

/// Guess a code-block language from the file extension.
fn language_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}
