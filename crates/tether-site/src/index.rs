//! Page index built from a TOC listing.
//!
//! The index owns the site's [`Toc`] tree and answers page lookups:
//! each [`Page`] carries its source and output paths, the navigation
//! subtree for its sidebar, and the name of its successor in
//! depth-first TOC order.
//!
//! The TOC listing is a plain-text outline (`toc.txt` at the
//! repository root), two spaces of indentation per level:
//!
//! ```text
//! Introduction|intro
//! Guides
//!   Setup|guides/setup
//!   Usage|guides/usage
//! ```
//!
//! A line followed by deeper-indented lines is a section label;
//! otherwise it is a page as `Label|name` (or just `name`, which is
//! its own label). Blank lines and `#` comments are ignored.

use tether_files::FileRepository;
use tether_renderer::Toc;

/// Name of the TOC listing at the repository root.
pub const TOC_FILENAME: &str = "toc.txt";

/// One page resolved through the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Page name (path without extension), e.g. `guides/setup`.
    pub name: String,
    /// Markdown source path, e.g. `guides/setup.md`.
    pub source_path: String,
    /// Output path, e.g. `guides/setup.html`.
    pub output_path: String,
    /// Navigation subtree for this page's sidebar.
    pub nav: Toc,
    /// Name of the next page in TOC order, if any.
    pub next: Option<String>,
}

/// Site-wide page index over a TOC tree.
#[derive(Clone, Debug)]
pub struct PageIndex {
    toc: Toc,
}

impl PageIndex {
    /// Build an index from an already-constructed TOC tree.
    #[must_use]
    pub fn from_toc(toc: Toc) -> Self {
        Self { toc }
    }

    /// Load the index from the repository's TOC listing.
    ///
    /// Returns `None` when no listing exists; the site then renders
    /// pages individually, without navigation.
    #[must_use]
    pub fn load(repo: &dyn FileRepository) -> Option<Self> {
        let text = repo.load_file(TOC_FILENAME)?;
        Some(Self::from_toc(parse_toc(&text)))
    }

    /// The root TOC tree.
    #[must_use]
    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Look up a page by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Page> {
        let pages = self.toc.pages();
        let position = pages.iter().position(|page| *page == name)?;
        Some(Page {
            name: name.to_owned(),
            source_path: format!("{name}.md"),
            output_path: format!("{name}.html"),
            nav: self.toc.section_of(name).cloned().unwrap_or_default(),
            next: pages.get(position + 1).map(|next| (*next).to_owned()),
        })
    }
}

/// Parse the indented TOC outline.
fn parse_toc(text: &str) -> Toc {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            (indent, line.trim())
        })
        .collect();

    let mut pos = 0;
    build_level(&lines, &mut pos, 0)
}

fn build_level(lines: &[(usize, &str)], pos: &mut usize, level_indent: usize) -> Toc {
    let mut toc = Toc::new();
    while let Some(&(indent, content)) = lines.get(*pos) {
        if indent < level_indent {
            break;
        }
        *pos += 1;
        let has_children = lines.get(*pos).is_some_and(|&(next, _)| next > indent);
        if has_children {
            let children_indent = lines[*pos].0;
            let children = build_level(lines, pos, children_indent);
            toc = toc.with_section(content, children);
        } else {
            let (label, name) = match content.split_once('|') {
                Some((label, name)) => (label.trim(), name.trim()),
                None => (content, content),
            };
            toc = toc.with_page(label, name);
        }
    }
    toc
}
