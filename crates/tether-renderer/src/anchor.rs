//! Heading anchor assignment.
//!
//! One [`HeadingAnchors`] table lives inside each serializer instance
//! and is discarded with it, so anchors are unique within a render and
//! reset cleanly between renders.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything outside the URL-unreserved set is percent-encoded.
const ANCHOR_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Render-scoped table assigning unique anchor ids to headings.
///
/// The table maps each slug to the number of prior occurrences. The
/// first heading with a slug gets the bare slug; the second gets the
/// slug with `1` appended, the third `2`, and so on. Downstream links
/// depend on this exact numbering.
#[derive(Debug, Default)]
pub struct HeadingAnchors {
    counts: HashMap<String, usize>,
}

impl HeadingAnchors {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the anchor id for the next heading with this title.
    pub fn assign(&mut self, title: &str) -> String {
        let slug = slugify(title);
        match self.counts.get_mut(&slug) {
            None => {
                self.counts.insert(slug.clone(), 1);
                slug
            }
            Some(count) => {
                let id = format!("{slug}{count}");
                *count += 1;
                id
            }
        }
    }
}

/// Turn heading text into an anchor slug: spaces become hyphens, the
/// rest is percent-encoded. Case is preserved.
fn slugify(title: &str) -> String {
    let hyphenated = title.trim().replace(' ', "-");
    utf8_percent_encode(&hyphenated, ANCHOR_SET).to_string()
}
