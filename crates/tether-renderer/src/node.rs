//! Document node model.
//!
//! The pipeline represents a parsed page as a stream of [`Node`]s:
//! base markdown events are forwarded unchanged, while the four
//! custom syntaxes become typed [`ExtensionNode`]s. The node set is a
//! closed tagged union: the serializer matches base events
//! exhaustively and offers extension nodes to its plugin chain.

use pulldown_cmark::Event;

/// One element of the rendered document stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<'a> {
    /// A base markdown event, forwarded from the parser unchanged.
    Base(Event<'a>),
    /// A custom construct recognized by the extension scanner.
    Extension(ExtensionNode),
}

/// Custom constructs owned by the rendering core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionNode {
    /// `@[label](path)`: a live excerpt from a source file.
    CodeReference {
        /// Source path as written, possibly with a `#label` suffix.
        source: String,
        /// Visible link text, used as the label when the path has none.
        label: String,
    },
    /// `%name%`: a configured variable reference.
    Variable {
        /// Variable name between the percent signs.
        name: String,
    },
    /// `[[text]]`: a wiki-style link or image reference.
    WikiLink {
        /// Inner text, still carrying any `label|target` split.
        text: String,
    },
    /// `::toc`: placeholder for the rendered table of contents.
    TocMarker,
}
