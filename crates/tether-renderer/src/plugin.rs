//! Extension-node plugins.
//!
//! The serializer offers every [`ExtensionNode`] to its plugins in
//! registration order; the first one whose `visit` returns `true` has
//! rendered the node. A node no plugin claims produces no output,
//! deliberately, so a `::toc` marker on a render without a TOC is
//! simply dropped.
//!
//! Plugins are constructed fresh for every render and own any
//! render-scoped state (the snippet plugin owns the source-file
//! cache).

use std::collections::HashMap;
use std::fmt::Write;

use tether_files::FileRepository;

use crate::excerpt::{Snippet, SourceFiles, extract};
use crate::node::ExtensionNode;
use crate::resolve::{WikiTarget, escape_html, resolve_wiki_link, substitute_variables};
use crate::toc::Toc;

/// Handler for one or more extension-node kinds.
///
/// `visit` returns `true` when the plugin claimed the node and wrote
/// its output; `false` passes the node to the next plugin.
pub trait NodePlugin {
    /// Offer a node to this plugin.
    fn visit(&mut self, node: &ExtensionNode, out: &mut String) -> bool;
}

/// Renders `CodeReference` nodes as code blocks via the excerpt
/// engine. Owns the per-render source-file cache.
pub struct CodeSnippetPlugin<'a> {
    files: SourceFiles<'a>,
    page_dir: Option<String>,
    variables: &'a HashMap<String, String>,
}

impl<'a> CodeSnippetPlugin<'a> {
    /// Create a plugin reading through `repo`, resolving relative
    /// paths against `page_dir`.
    #[must_use]
    pub fn new(
        repo: &'a dyn FileRepository,
        page_dir: Option<&str>,
        variables: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            files: SourceFiles::new(repo),
            page_dir: page_dir.map(ToOwned::to_owned),
            variables,
        }
    }
}

impl NodePlugin for CodeSnippetPlugin<'_> {
    fn visit(&mut self, node: &ExtensionNode, out: &mut String) -> bool {
        let ExtensionNode::CodeReference { source, label } = node else {
            return false;
        };
        match extract(&mut self.files, source, label, self.page_dir.as_deref()) {
            Snippet::Code { text, language } => {
                let code = substitute_variables(&escape_html(&text), self.variables);
                match language {
                    Some(lang) => write!(
                        out,
                        "<pre><code class=\"language-{}\">{code}</code></pre>",
                        escape_html(&lang)
                    )
                    .unwrap(),
                    None => write!(out, "<pre><code>{code}</code></pre>").unwrap(),
                }
            }
            Snippet::Missing { label, source } => {
                // visible inline, the page keeps rendering
                out.push_str(&escape_html(&format!(
                    "Unable to find label {label} in source file {source}"
                )));
            }
        }
        true
    }
}

/// Renders `Variable` nodes from the configured map.
pub struct VariablePlugin<'a> {
    variables: &'a HashMap<String, String>,
}

impl<'a> VariablePlugin<'a> {
    /// Create a plugin over pre-escaped variable values.
    #[must_use]
    pub fn new(variables: &'a HashMap<String, String>) -> Self {
        Self { variables }
    }
}

impl NodePlugin for VariablePlugin<'_> {
    fn visit(&mut self, node: &ExtensionNode, out: &mut String) -> bool {
        let ExtensionNode::Variable { name } = node else {
            return false;
        };
        match self.variables.get(name) {
            Some(value) => out.push_str(value),
            None => write!(out, "Unknown variable: {name}").unwrap(),
        }
        true
    }
}

/// Renders `WikiLink` nodes as anchors, page links or images.
pub struct WikiLinkPlugin<'a> {
    resources_path: &'a str,
    page_dir: Option<&'a str>,
    single_page: bool,
}

impl<'a> WikiLinkPlugin<'a> {
    /// Create a plugin for the current render's link mode.
    #[must_use]
    pub fn new(resources_path: &'a str, page_dir: Option<&'a str>, single_page: bool) -> Self {
        Self {
            resources_path,
            page_dir,
            single_page,
        }
    }
}

impl NodePlugin for WikiLinkPlugin<'_> {
    fn visit(&mut self, node: &ExtensionNode, out: &mut String) -> bool {
        let ExtensionNode::WikiLink { text } = node else {
            return false;
        };
        match resolve_wiki_link(text, self.resources_path, self.page_dir, self.single_page) {
            WikiTarget::Link { href, text } => write!(
                out,
                "<a href=\"{}\">{}</a>",
                escape_html(&href),
                escape_html(&text)
            )
            .unwrap(),
            WikiTarget::Image { src } => {
                write!(out, "<img src=\"{}\" alt=\"\">", escape_html(&src)).unwrap();
            }
        }
        true
    }
}

/// Renders the `::toc` marker from the supplied TOC tree.
///
/// Claims nothing when the render has no TOC, so the marker falls
/// through the chain and disappears.
pub struct TocPlugin<'a> {
    toc: Option<&'a Toc>,
    single_page: bool,
}

impl<'a> TocPlugin<'a> {
    /// Create a plugin over the render's optional TOC.
    #[must_use]
    pub fn new(toc: Option<&'a Toc>, single_page: bool) -> Self {
        Self { toc, single_page }
    }
}

impl NodePlugin for TocPlugin<'_> {
    fn visit(&mut self, node: &ExtensionNode, out: &mut String) -> bool {
        if !matches!(node, ExtensionNode::TocMarker) {
            return false;
        }
        let Some(toc) = self.toc else {
            return false;
        };
        out.push_str(&toc.to_html(self.single_page));
        true
    }
}
