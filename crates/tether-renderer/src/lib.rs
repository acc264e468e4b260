//! Extensible markdown-to-HTML pipeline with live code excerpts.
//!
//! This crate turns annotated markdown into HTML fragments for a
//! documentation site: wiki-style links (`[[text]]`), variable
//! references (`%name%`), code references (`@[label](path)`) pulling
//! excerpts from real source files, and a `::toc` table-of-contents
//! marker.
//!
//! # Architecture
//!
//! Rendering is a single pass over pulldown-cmark's event stream:
//!
//! 1. [`ExtensionScanner`] recognizes the custom syntaxes and emits a
//!    [`Node`] stream: base events forwarded unchanged, custom
//!    constructs as typed [`ExtensionNode`]s.
//! 2. [`HtmlSerializer`] renders base events natively and offers each
//!    extension node to an ordered chain of [`NodePlugin`]s; the
//!    first plugin claiming a node renders it, unclaimed nodes render
//!    nothing.
//!
//! Every render gets a fresh parser, scanner, serializer and plugin
//! set; the heading-anchor table and source-file cache live and die
//! with one render. Content failures (missing labels, unknown
//! variables) surface as visible inline text so a defect shows in the
//! built site instead of breaking the build.
//!
//! # Example
//!
//! ```
//! use tether_files::MockFiles;
//! use tether_renderer::{PageRenderer, RenderConfig, RenderContext};
//!
//! let repo = MockFiles::new().with_file("demo.rs", "#hello\nprintln!(\"hi\");\n#hello\n");
//! let config = RenderConfig::default();
//! let renderer = PageRenderer::new(&repo, &config);
//!
//! let html = renderer.render("@[hello](demo.rs)", &RenderContext::new());
//! assert!(html.contains("println!"));
//! ```

mod anchor;
mod context;
mod excerpt;
mod node;
mod plugin;
mod render;
mod resolve;
mod scan;
mod serializer;
mod toc;

pub use anchor::HeadingAnchors;
pub use context::{RenderConfig, RenderContext};
pub use excerpt::{Snippet, SourceFiles, extract};
pub use node::{ExtensionNode, Node};
pub use plugin::{CodeSnippetPlugin, NodePlugin, TocPlugin, VariablePlugin, WikiLinkPlugin};
pub use render::PageRenderer;
pub use resolve::{
    WikiTarget, escape_html, resolve_wiki_link, substitute_link_params, substitute_variables,
};
pub use scan::ExtensionScanner;
pub use serializer::HtmlSerializer;
pub use toc::{Toc, TocTree};
