//! Extension recognizers.
//!
//! [`ExtensionScanner`] adapts the base parser's event stream into a
//! [`Node`] stream: wiki links (`[[text]]`), variable references
//! (`%name%`), code references (`@[label](path)`) and the `::toc`
//! marker become typed extension nodes; everything else passes through
//! unchanged. The recognizers match disjoint syntaxes and malformed
//! occurrences fall back to literal text; recognition never fails a
//! parse.
//!
//! Text inside code blocks is not scanned; variable substitution in
//! verbatim content happens during serialization instead, so
//! pre-escaped values land in already-escaped output.

use std::collections::VecDeque;

use pulldown_cmark::{Event, LinkType, Tag, TagEnd};

use crate::node::{ExtensionNode, Node};
use crate::resolve::VARIABLE_RE;

/// Line form of the TOC marker: a paragraph of exactly this text.
const TOC_MARKER: &str = "::toc";

/// Iterator adapter recognizing the custom syntaxes.
///
/// Feed it merged events (wrap the parser in
/// [`pulldown_cmark::TextMergeStream`]) so inline syntax split across
/// text events is seen whole.
pub struct ExtensionScanner<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    events: I,
    pending: VecDeque<Node<'a>>,
    lookahead: Option<Event<'a>>,
    in_code_block: bool,
    in_image: bool,
}

impl<'a, I> ExtensionScanner<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    /// Wrap an event stream.
    pub fn new(events: I) -> Self {
        Self {
            events,
            pending: VecDeque::new(),
            lookahead: None,
            in_code_block: false,
            in_image: false,
        }
    }

    fn next_event(&mut self) -> Option<Event<'a>> {
        self.lookahead.take().or_else(|| self.events.next())
    }

    /// Recognize a paragraph holding only the TOC marker. Consumes the
    /// whole paragraph on a match; otherwise stashes what it read.
    fn try_toc_marker(&mut self) -> Option<Node<'a>> {
        match self.next_event() {
            Some(Event::Text(text)) if text.as_ref() == TOC_MARKER => match self.next_event() {
                Some(Event::End(TagEnd::Paragraph)) => {
                    Some(Node::Extension(ExtensionNode::TocMarker))
                }
                other => {
                    self.pending.push_back(Node::Base(Event::Text(text)));
                    self.lookahead = other;
                    None
                }
            },
            other => {
                self.lookahead = other;
                None
            }
        }
    }

    /// Scan a prose text run, handling the trailing-`@` code-reference
    /// form before the purely textual recognizers.
    fn scan_text(&mut self, text: &str) {
        if let Some(prefix) = text.strip_suffix('@') {
            match self.next_event() {
                Some(Event::Start(Tag::Link {
                    link_type: LinkType::Inline,
                    dest_url,
                    ..
                })) => {
                    let label = self.collect_link_text();
                    self.scan_inline(prefix);
                    self.pending
                        .push_back(Node::Extension(ExtensionNode::CodeReference {
                            source: dest_url.into_string(),
                            label,
                        }));
                    return;
                }
                other => self.lookahead = other,
            }
        }
        self.scan_inline(text);
    }

    /// Consume a link's inner events, concatenating its visible text.
    fn collect_link_text(&mut self) -> String {
        let mut label = String::new();
        while let Some(event) = self.next_event() {
            match event {
                Event::End(TagEnd::Link) => break,
                Event::Text(text) | Event::Code(text) => label.push_str(&text),
                _ => {}
            }
        }
        label
    }

    /// Split a text run into literal pieces, wiki links and variables.
    fn scan_inline(&mut self, text: &str) {
        let mut rest = text;
        while let Some(found) = earliest_match(rest) {
            if found.start > 0 {
                self.push_text(&rest[..found.start]);
            }
            self.pending.push_back(Node::Extension(found.node));
            rest = &rest[found.end..];
        }
        if !rest.is_empty() {
            self.push_text(rest);
        }
    }

    fn push_text(&mut self, text: &str) {
        self.pending
            .push_back(Node::Base(Event::Text(text.to_owned().into())));
    }
}

impl<'a, I> Iterator for ExtensionScanner<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        loop {
            if let Some(node) = self.pending.pop_front() {
                return Some(node);
            }
            let event = self.next_event()?;
            match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    self.in_code_block = true;
                    return Some(Node::Base(event));
                }
                Event::End(TagEnd::CodeBlock) => {
                    self.in_code_block = false;
                    return Some(Node::Base(event));
                }
                Event::Start(Tag::Image { .. }) => {
                    self.in_image = true;
                    return Some(Node::Base(event));
                }
                Event::End(TagEnd::Image) => {
                    self.in_image = false;
                    return Some(Node::Base(event));
                }
                Event::Start(Tag::Paragraph) if !self.in_code_block => {
                    if let Some(marker) = self.try_toc_marker() {
                        return Some(marker);
                    }
                    return Some(Node::Base(Event::Start(Tag::Paragraph)));
                }
                Event::Text(text) if !self.in_code_block && !self.in_image => {
                    self.scan_text(&text);
                }
                other => return Some(Node::Base(other)),
            }
        }
    }
}

struct InlineMatch {
    start: usize,
    end: usize,
    node: ExtensionNode,
}

/// Leftmost wiki-link or variable match in a text run.
fn earliest_match(text: &str) -> Option<InlineMatch> {
    let wiki = find_wiki_link(text);
    let var = find_variable(text);
    match (wiki, var) {
        (Some(w), Some(v)) => Some(if w.start <= v.start { w } else { v }),
        (found, None) | (None, found) => found,
    }
}

fn find_wiki_link(text: &str) -> Option<InlineMatch> {
    let mut from = 0;
    while let Some(offset) = text[from..].find("[[") {
        let open = from + offset;
        let inner_start = open + 2;
        let close = text[inner_start..].find("]]")? + inner_start;
        let inner = &text[inner_start..close];
        if !inner.is_empty() && !inner.contains('\n') && !inner.contains("[[") {
            return Some(InlineMatch {
                start: open,
                end: close + 2,
                node: ExtensionNode::WikiLink {
                    text: inner.to_owned(),
                },
            });
        }
        from = inner_start;
    }
    None
}

fn find_variable(text: &str) -> Option<InlineMatch> {
    let caps = VARIABLE_RE.captures(text)?;
    let whole = caps.get(0)?;
    Some(InlineMatch {
        start: whole.start(),
        end: whole.end(),
        node: ExtensionNode::Variable {
            name: caps[1].to_owned(),
        },
    })
}
