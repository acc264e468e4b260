//! Page index and site rendering for tether.
//!
//! Builds on `tether-renderer` to render whole documentation sites:
//! the [`PageIndex`] resolves page names, navigation subtrees and
//! next-page order from a TOC listing, and the [`SiteRenderer`]
//! produces [`RenderedPage`] values for single pages, the full site,
//! or one combined single-page document.

mod index;
mod renderer;

pub use index::{Page, PageIndex, TOC_FILENAME};
pub use renderer::{RenderedPage, SiteError, SiteRenderer};
