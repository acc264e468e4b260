//! Per-render HTML serializer.
//!
//! Walks the [`Node`] stream produced by the extension scanner,
//! rendering base markdown events directly and offering extension
//! nodes to the plugin chain (first claim wins, unclaimed nodes render
//! nothing).
//!
//! A serializer instance holds the heading-anchor table and capture
//! buffers for the render in progress. It is not reusable: construct
//! one per render or anchors leak across pages.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::anchor::HeadingAnchors;
use crate::context::{RenderConfig, RenderContext};
use crate::node::Node;
use crate::plugin::NodePlugin;
use crate::resolve::{escape_html, substitute_link_params, substitute_variables};

/// Stateful HTML serializer for one render.
pub struct HtmlSerializer<'a> {
    out: String,
    plugins: Vec<Box<dyn NodePlugin + 'a>>,
    anchors: HeadingAnchors,
    header_ids: bool,
    config: &'a RenderConfig,
    code: CodeCapture,
    image: ImageCapture,
    heading: HeadingCapture,
    pending_image: Option<(String, String)>,
    in_autolink: bool,
}

impl<'a> HtmlSerializer<'a> {
    /// Create a serializer for one render.
    #[must_use]
    pub fn new(config: &'a RenderConfig, ctx: &RenderContext<'_>) -> Self {
        Self {
            out: String::with_capacity(4096),
            plugins: Vec::new(),
            anchors: HeadingAnchors::new(),
            header_ids: ctx.header_ids,
            config,
            code: CodeCapture::default(),
            image: ImageCapture::default(),
            heading: HeadingCapture::default(),
            pending_image: None,
            in_autolink: false,
        }
    }

    /// Append a plugin to the dispatch chain. Order is significant:
    /// the first plugin claiming a node renders it.
    #[must_use]
    pub fn with_plugin<P: NodePlugin + 'a>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Serialize the node stream and return the HTML.
    pub fn run<I>(mut self, nodes: I) -> String
    where
        I: IntoIterator<Item = Node<'a>>,
    {
        for node in nodes {
            match node {
                Node::Base(event) => self.event(event),
                Node::Extension(ext) => {
                    let mut plugins = std::mem::take(&mut self.plugins);
                    let sink = if self.heading.active() {
                        &mut self.heading.html
                    } else {
                        &mut self.out
                    };
                    let _ = plugins.iter_mut().any(|p| p.visit(&ext, sink));
                    self.plugins = plugins;
                }
            }
        }
        self.out
    }

    fn event(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.out.push_str("<hr>"),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.out.push_str("<p>"),
            Tag::Heading { level, .. } => self.heading.start(level_to_num(level)),
            Tag::BlockQuote(_) => self.out.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => info
                        .split_whitespace()
                        .next()
                        .map(ToOwned::to_owned),
                    _ => None,
                };
                self.code.start(language);
            }
            Tag::List(start) => match start {
                Some(1) => self.out.push_str("<ol>"),
                Some(n) => write!(self.out, "<ol start=\"{n}\">").unwrap(),
                None => self.out.push_str("<ul>"),
            },
            Tag::Item => self.out.push_str("<li>"),
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                if matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    self.in_autolink = true;
                }
                // params substitute into the escaped URL: configured
                // values are pre-escaped
                let href =
                    substitute_link_params(&escape_html(&dest_url), &self.config.link_parameters);
                let tag = if title.is_empty() {
                    format!("<a href=\"{href}\">")
                } else {
                    format!("<a href=\"{href}\" title=\"{}\">", escape_html(&title))
                };
                self.push_inline(&tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.pending_image = Some((dest_url.into_string(), title.into_string()));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, text, html)) = self.heading.complete() {
                    if self.header_ids {
                        let id = self.anchors.assign(&text);
                        write!(self.out, "<h{level} id=\"{id}\">{}</h{level}>", html.trim())
                            .unwrap();
                    } else {
                        write!(self.out, "<h{level}>{}</h{level}>", html.trim()).unwrap();
                    }
                }
            }
            TagEnd::BlockQuote(_) => self.out.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (language, content) = self.code.end();
                let code = substitute_variables(&escape_html(&content), &self.config.variables);
                match language {
                    Some(lang) => write!(
                        self.out,
                        "<pre><code class=\"language-{}\">{code}</code></pre>",
                        escape_html(&lang)
                    )
                    .unwrap(),
                    None => write!(self.out, "<pre><code>{code}</code></pre>").unwrap(),
                }
            }
            TagEnd::List(ordered) => self
                .out
                .push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.out.push_str("</li>"),
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => {
                self.push_inline("</a>");
                self.in_autolink = false;
            }
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    if title.is_empty() {
                        write!(
                            self.out,
                            "<img src=\"{}\" alt=\"{}\">",
                            escape_html(&src),
                            escape_html(&alt)
                        )
                        .unwrap();
                    } else {
                        write!(
                            self.out,
                            "<img src=\"{}\" title=\"{}\" alt=\"{}\">",
                            escape_html(&src),
                            escape_html(&title),
                            escape_html(&alt)
                        )
                        .unwrap();
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.active {
            self.code.buffer.push_str(text);
            return;
        }
        if self.image.active {
            self.image.alt.push_str(text);
            return;
        }
        let rendered = if self.in_autolink {
            substitute_link_params(&escape_html(text), &self.config.link_parameters)
        } else {
            escape_html(text)
        };
        if self.heading.active() {
            self.heading.text.push_str(text);
            self.heading.html.push_str(&rendered);
        } else {
            self.out.push_str(&rendered);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.active {
            self.image.alt.push_str(code);
            return;
        }
        let rendered = format!(
            "<code>{}</code>",
            substitute_variables(&escape_html(code), &self.config.variables)
        );
        if self.heading.active() {
            self.heading.text.push_str(code);
            self.heading.html.push_str(&rendered);
        } else {
            self.out.push_str(&rendered);
        }
    }

    fn soft_break(&mut self) {
        if self.code.active {
            self.code.buffer.push('\n');
        } else {
            self.push_inline("\n");
        }
    }

    fn push_inline(&mut self, content: &str) {
        if self.heading.active() {
            self.heading.html.push_str(content);
        } else {
            self.out.push_str(content);
        }
    }
}

/// Capture state for the code block being collected.
#[derive(Default)]
struct CodeCapture {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeCapture {
    fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }
}

/// Capture state for image alt text.
#[derive(Default)]
struct ImageCapture {
    active: bool,
    alt: String,
}

impl ImageCapture {
    fn start(&mut self) {
        self.active = true;
        self.alt.clear();
    }

    fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt)
    }
}

/// Capture state for the heading being collected: plain text for the
/// anchor, HTML for the rendered content.
#[derive(Default)]
struct HeadingCapture {
    level: Option<u8>,
    text: String,
    html: String,
}

impl HeadingCapture {
    fn start(&mut self, level: u8) {
        self.level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    fn active(&self) -> bool {
        self.level.is_some()
    }

    fn complete(&mut self) -> Option<(u8, String, String)> {
        let level = self.level.take()?;
        Some((
            level,
            std::mem::take(&mut self.text),
            std::mem::take(&mut self.html),
        ))
    }
}

fn level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Options, Parser, TextMergeStream};

    use super::*;
    use crate::scan::ExtensionScanner;

    fn render(markdown: &str) -> String {
        let config = RenderConfig::default();
        render_with(markdown, &config)
    }

    fn render_with(markdown: &str, config: &RenderConfig) -> String {
        let ctx = RenderContext::new();
        let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
        let scanner = ExtensionScanner::new(TextMergeStream::new(parser));
        HtmlSerializer::new(config, &ctx).run(scanner)
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_anchor() {
        assert_eq!(
            render("## Getting Started"),
            "<h2 id=\"Getting-Started\">Getting Started</h2>"
        );
    }

    #[test]
    fn test_duplicate_heading_anchors() {
        let html = render("## Example\n\n## Example\n\n## Example");
        assert!(html.contains("id=\"Example\""));
        assert!(html.contains("id=\"Example1\""));
        assert!(html.contains("id=\"Example2\""));
    }

    #[test]
    fn test_heading_without_ids() {
        let config = RenderConfig::default();
        let ctx = RenderContext::new().with_header_ids(false);
        let parser = Parser::new_ext("## Plain", Options::ENABLE_STRIKETHROUGH);
        let scanner = ExtensionScanner::new(TextMergeStream::new(parser));
        let html = HtmlSerializer::new(&config, &ctx).run(scanner);
        assert_eq!(html, "<h2>Plain</h2>");
    }

    #[test]
    fn test_heading_with_inline_code() {
        let html = render("## Install `cargo`");
        assert!(html.contains("<code>cargo</code>"));
        assert!(html.contains("id=\"Install-cargo\""));
    }

    #[test]
    fn test_emphasis_strong_strikethrough() {
        let html = render("*a* **b** ~~c~~");
        assert!(html.contains("<em>a</em>"));
        assert!(html.contains("<strong>b</strong>"));
        assert!(html.contains("<s>c</s>"));
    }

    #[test]
    fn test_lists() {
        let html = render("- one\n- two");
        assert!(html.contains("<ul><li>one</li><li>two</li></ul>"));
        let html = render("3. three\n4. four");
        assert!(html.contains("<ol start=\"3\">"));
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("> quoted"),
            "<blockquote><p>quoted</p></blockquote>"
        );
    }

    #[test]
    fn test_code_block_with_language() {
        let html = render("```rust\nfn main() {}\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_escaped() {
        let html = render("```\na < b && c > d\n```");
        assert!(html.contains("a &lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn test_variables_in_code_block() {
        let mut config = RenderConfig::default();
        config
            .variables
            .insert("port".to_owned(), "7979".to_owned());
        let html = render_with("```\nlisten %port%\n```", &config);
        assert!(html.contains("listen 7979"));
    }

    #[test]
    fn test_variables_in_inline_code() {
        let mut config = RenderConfig::default();
        config.variables.insert("v".to_owned(), "2".to_owned());
        let html = render_with("run `tool --v %v%`", &config);
        assert!(html.contains("<code>tool --v 2</code>"));
    }

    #[test]
    fn test_unknown_variable_in_code_block() {
        let html = render("```\n%nope%\n```");
        assert!(html.contains("Unknown variable: nope"));
    }

    #[test]
    fn test_link_with_params() {
        let mut config = RenderConfig::default();
        config
            .link_parameters
            .insert("base".to_owned(), "https://example.com".to_owned());
        let html = render_with("[docs]({base}/docs)", &config);
        assert!(html.contains("<a href=\"https://example.com/docs\">docs</a>"));
    }

    #[test]
    fn test_link_with_unresolved_param() {
        let html = render("[docs]({base}/docs)");
        assert!(html.contains("<a href=\"{base}/docs\">docs</a>"));
    }

    #[test]
    fn test_autolink_params_in_display_text() {
        let mut config = RenderConfig::default();
        config
            .link_parameters
            .insert("host".to_owned(), "example.com".to_owned());
        let html = render_with("<https://{host}/a>", &config);
        assert!(html.contains("href=\"https://example.com/a\""));
        assert!(html.contains(">https://example.com/a</a>"));
    }

    #[test]
    fn test_link_with_title() {
        let html = render("[x](y \"why\")");
        assert!(html.contains("<a href=\"y\" title=\"why\">x</a>"));
    }

    #[test]
    fn test_image() {
        let html = render("![Alt text](image.png)");
        assert!(html.contains("<img src=\"image.png\" alt=\"Alt text\">"));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = render("before <span class=\"x\">kept</span> after");
        assert!(html.contains("<span class=\"x\">kept</span>"));
    }

    #[test]
    fn test_rule_and_breaks() {
        assert!(render("---").contains("<hr>"));
        assert!(render("a  \nb").contains("<br>"));
    }

    #[test]
    fn test_unclaimed_extension_node_skipped() {
        // no plugins registered: the TOC marker renders nothing
        let html = render("before\n\n::toc\n\nafter");
        assert_eq!(html, "<p>before</p><p>after</p>");
    }

    #[test]
    fn test_determinism() {
        let markdown = "# T\n\n## Example\n\n## Example\n\ntext %v% [[a|b]]";
        assert_eq!(render(markdown), render(markdown));
    }
}
