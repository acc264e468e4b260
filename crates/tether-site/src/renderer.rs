//! Site rendering.
//!
//! [`SiteRenderer`] drives the markdown pipeline across a whole site:
//! single pages with sidebar and next-page link, the full page set in
//! TOC order, or one combined single-page document. Each page render
//! constructs a fresh pipeline; the only shared state is the immutable
//! config and the repository, so pages render in parallel safely.

use std::fmt::Write;
use std::sync::Arc;

use rayon::prelude::*;
use tether_files::FileRepository;
use tether_renderer::{PageRenderer, RenderConfig, RenderContext, escape_html};

use crate::index::PageIndex;

/// One rendered page, ready to write out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// Rendered HTML fragment.
    pub html: String,
    /// Sidebar navigation HTML, absent when the page has none.
    pub sidebar_html: Option<String>,
    /// Output path, e.g. `guides/setup.html`.
    pub path: String,
}

/// Error returned for caller contract violations.
///
/// Content problems never show up here; they render as visible
/// inline placeholders instead.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The requested page does not exist.
    #[error("page not found: {0}")]
    PageNotFound(String),
    /// A whole-site operation was called without a page index.
    #[error("no page index loaded; a TOC listing is required to render the whole site")]
    NoPageIndex,
}

/// Renders pages of a documentation site.
pub struct SiteRenderer {
    repo: Arc<dyn FileRepository>,
    config: RenderConfig,
    index: Option<PageIndex>,
}

impl SiteRenderer {
    /// Create a renderer without a page index.
    #[must_use]
    pub fn new(repo: Arc<dyn FileRepository>, config: RenderConfig) -> Self {
        Self {
            repo,
            config,
            index: None,
        }
    }

    /// Attach a page index for navigation and whole-site rendering.
    #[must_use]
    pub fn with_index(mut self, index: PageIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Render one page by name.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::PageNotFound`] when no markdown source
    /// exists for the name.
    pub fn render_page(&self, name: &str) -> Result<RenderedPage, SiteError> {
        let source_path = format!("{name}.md");
        let markdown = self
            .repo
            .load_file(&source_path)
            .ok_or_else(|| SiteError::PageNotFound(name.to_owned()))?;

        tracing::debug!(page = name, "rendering page");

        let page = self.index.as_ref().and_then(|index| index.get(name));
        let nav = page.as_ref().map(|page| page.nav.clone());
        let next = page.and_then(|page| page.next);

        let page_dir = name.rsplit_once('/').map(|(dir, _)| dir);
        let mut ctx = RenderContext::new();
        if let Some(dir) = page_dir {
            ctx = ctx.with_page_dir(dir);
        }
        if let Some(nav) = &nav {
            ctx = ctx.with_toc(nav);
        }

        let mut html = PageRenderer::new(self.repo.as_ref(), &self.config).render(&markdown, &ctx);

        if let (Some(next_name), Some(label)) = (next, &self.config.next_text) {
            write!(
                html,
                "<p class=\"next-page\"><a href=\"{}.html\">{}</a></p>",
                escape_html(&next_name),
                escape_html(label)
            )
            .unwrap();
        }

        Ok(RenderedPage {
            html,
            sidebar_html: nav.map(|nav| nav.to_html(false)),
            path: format!("{name}.html"),
        })
    }

    /// Render every page in TOC order.
    ///
    /// Pages render in parallel; output order follows the TOC.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NoPageIndex`] when no index is loaded;
    /// this is a caller contract violation, not a content failure.
    /// Individual pages missing their source fail the same way a
    /// direct [`render_page`](Self::render_page) call would.
    pub fn render_all(&self) -> Result<Vec<RenderedPage>, SiteError> {
        let index = self.index.as_ref().ok_or(SiteError::NoPageIndex)?;
        let names: Vec<String> = index
            .toc()
            .pages()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect();

        tracing::debug!(pages = names.len(), "rendering site");

        names
            .par_iter()
            .map(|name| self.render_page(name))
            .collect()
    }

    /// Render all pages concatenated into one document.
    ///
    /// Each page is wrapped in a `<div id="{name}">` and rendered with
    /// heading anchors disabled, so wiki links resolve to the page
    /// wrappers without anchor collisions. A page missing its source
    /// shows up as a visible inline placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NoPageIndex`] when no index is loaded.
    pub fn render_single_page(&self) -> Result<RenderedPage, SiteError> {
        let index = self.index.as_ref().ok_or(SiteError::NoPageIndex)?;
        let renderer = PageRenderer::new(self.repo.as_ref(), &self.config);

        let mut html = String::new();
        for name in index.toc().pages() {
            write!(html, "<div id=\"{}\">", escape_html(name)).unwrap();
            match self.repo.load_file(&format!("{name}.md")) {
                Some(markdown) => {
                    let page_dir = name.rsplit_once('/').map(|(dir, _)| dir);
                    let mut ctx = RenderContext::new()
                        .with_single_page(true)
                        .with_header_ids(false)
                        .with_toc(index.toc());
                    if let Some(dir) = page_dir {
                        ctx = ctx.with_page_dir(dir);
                    }
                    html.push_str(&renderer.render(&markdown, &ctx));
                }
                None => {
                    tracing::warn!(page = name, "page listed in TOC has no source");
                    write!(html, "<p>Missing page: {}</p>", escape_html(name)).unwrap();
                }
            }
            html.push_str("</div>");
        }

        Ok(RenderedPage {
            html,
            sidebar_html: Some(index.toc().to_html(true)),
            path: "index.html".to_owned(),
        })
    }
}
