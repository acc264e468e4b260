//! Render configuration and per-render context.

use std::collections::HashMap;

use crate::toc::Toc;

/// Process-scoped rendering configuration, shared read-only across
/// renders.
///
/// Variable and link-parameter values are expected to be HTML-escaped
/// already (the config loader escapes them once); the renderer injects
/// them into escaped output without touching them again.
#[derive(Clone, Debug, Default)]
pub struct RenderConfig {
    /// Base path prepended to wiki image references.
    pub resources_path: String,
    /// `%name%` substitution values, pre-escaped.
    pub variables: HashMap<String, String>,
    /// `{param}` substitution values for link URLs, pre-escaped.
    pub link_parameters: HashMap<String, String>,
    /// Label for the generated link to the next page, when any.
    pub next_text: Option<String>,
}

/// Per-render context, immutable after construction.
///
/// Created at the start of a render call and discarded with it; never
/// shared across renders.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Directory of the current page, for resolving relative code and
    /// image paths.
    pub page_dir: Option<&'a str>,
    /// TOC tree rendered by the `::toc` marker, when supplied.
    pub toc: Option<&'a Toc>,
    /// Whether headings get anchor ids. Disabled when the content is
    /// embedded inside another page, to avoid anchor collisions.
    pub header_ids: bool,
    /// Single-page output: wiki links become intra-document anchors.
    pub single_page: bool,
}

impl<'a> RenderContext<'a> {
    /// Context for a standalone multi-page render.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_dir: None,
            toc: None,
            header_ids: true,
            single_page: false,
        }
    }

    /// Set the current page's directory.
    #[must_use]
    pub fn with_page_dir(mut self, dir: &'a str) -> Self {
        self.page_dir = Some(dir);
        self
    }

    /// Supply a TOC tree for `::toc` markers.
    #[must_use]
    pub fn with_toc(mut self, toc: &'a Toc) -> Self {
        self.toc = Some(toc);
        self
    }

    /// Enable or disable heading anchor ids.
    #[must_use]
    pub fn with_header_ids(mut self, enabled: bool) -> Self {
        self.header_ids = enabled;
        self
    }

    /// Switch to single-page link resolution.
    #[must_use]
    pub fn with_single_page(mut self, enabled: bool) -> Self {
        self.single_page = enabled;
        self
    }
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}
