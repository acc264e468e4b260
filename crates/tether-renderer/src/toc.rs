//! Table-of-contents tree.
//!
//! The TOC is supplied by the page index and is read-only to the
//! renderer: a `::toc` marker renders it as nested lists, and the
//! site layer uses its depth-first page order for "render all pages"
//! and next-page links.

use std::fmt::Write;

use crate::resolve::escape_html;

/// An ordered tree of labeled entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toc {
    /// Entries in document order: `(label, subtree)`.
    pub entries: Vec<(String, TocTree)>,
}

/// One entry of a [`Toc`]: either a page leaf or a nested section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocTree {
    /// A page, identified by its name (path without extension).
    Page(String),
    /// A section grouping further entries.
    Nested(Toc),
}

impl Toc {
    /// Create an empty TOC.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page leaf entry.
    #[must_use]
    pub fn with_page(mut self, label: impl Into<String>, name: impl Into<String>) -> Self {
        self.entries.push((label.into(), TocTree::Page(name.into())));
        self
    }

    /// Append a nested section entry.
    #[must_use]
    pub fn with_section(mut self, label: impl Into<String>, children: Toc) -> Self {
        self.entries.push((label.into(), TocTree::Nested(children)));
        self
    }

    /// Page names in depth-first document order.
    pub fn pages(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_pages(&mut names);
        names
    }

    fn collect_pages<'a>(&'a self, names: &mut Vec<&'a str>) {
        for (_, tree) in &self.entries {
            match tree {
                TocTree::Page(name) => names.push(name),
                TocTree::Nested(toc) => toc.collect_pages(names),
            }
        }
    }

    /// Find the subtree containing the given page, searching top-level
    /// sections first. Returns the whole TOC for top-level pages.
    #[must_use]
    pub fn section_of(&self, page: &str) -> Option<&Toc> {
        for (_, tree) in &self.entries {
            match tree {
                TocTree::Page(name) if name == page => return Some(self),
                TocTree::Nested(toc) => {
                    if let Some(found) = toc.section_of(page) {
                        return Some(found);
                    }
                }
                TocTree::Page(_) => {}
            }
        }
        None
    }

    /// Render the tree as nested `<ul>` lists.
    ///
    /// Page links point at `<name>.html` in multi-page output and at
    /// the `#<name>` anchor in single-page output.
    #[must_use]
    pub fn to_html(&self, single_page: bool) -> String {
        let mut out = String::new();
        self.write_html(single_page, &mut out);
        out
    }

    fn write_html(&self, single_page: bool, out: &mut String) {
        out.push_str("<ul class=\"toc\">");
        for (label, tree) in &self.entries {
            match tree {
                TocTree::Page(name) => {
                    let href = if single_page {
                        format!("#{name}")
                    } else {
                        format!("{name}.html")
                    };
                    write!(
                        out,
                        "<li><a href=\"{}\">{}</a></li>",
                        escape_html(&href),
                        escape_html(label)
                    )
                    .unwrap();
                }
                TocTree::Nested(toc) => {
                    write!(out, "<li><span class=\"toc-section\">{}</span>", escape_html(label))
                        .unwrap();
                    toc.write_html(single_page, out);
                    out.push_str("</li>");
                }
            }
        }
        out.push_str("</ul>");
    }
}
