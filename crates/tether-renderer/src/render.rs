//! Render orchestration.
//!
//! [`PageRenderer`] is the `markdown text → HTML text` entry point.
//! Every call assembles a fresh parser, extension scanner, serializer
//! and plugin set wired with the render's context, so no state leaks
//! between pages. Callers may render different pages concurrently;
//! the renderer itself shares only the immutable config and the
//! repository.

use pulldown_cmark::{Options, Parser, TextMergeStream};
use tether_files::FileRepository;

use crate::context::{RenderConfig, RenderContext};
use crate::plugin::{CodeSnippetPlugin, TocPlugin, VariablePlugin, WikiLinkPlugin};
use crate::scan::ExtensionScanner;
use crate::serializer::HtmlSerializer;

/// Markdown-to-HTML renderer over a file repository.
pub struct PageRenderer<'a> {
    repo: &'a dyn FileRepository,
    config: &'a RenderConfig,
}

impl<'a> PageRenderer<'a> {
    /// Create a renderer over the repository and shared config.
    #[must_use]
    pub fn new(repo: &'a dyn FileRepository, config: &'a RenderConfig) -> Self {
        Self { repo, config }
    }

    /// Parser options for the base grammar.
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_STRIKETHROUGH
    }

    /// Render one markdown document to an HTML fragment.
    ///
    /// Pure: same input, config and context produce byte-identical
    /// output. Content failures (missing labels, unknown variables)
    /// render as visible inline text, never an error.
    #[must_use]
    pub fn render(&self, markdown: &str, ctx: &RenderContext<'_>) -> String {
        let parser = Parser::new_ext(markdown, Self::parser_options());
        let scanner = ExtensionScanner::new(TextMergeStream::new(parser));

        HtmlSerializer::new(self.config, ctx)
            .with_plugin(CodeSnippetPlugin::new(
                self.repo,
                ctx.page_dir,
                &self.config.variables,
            ))
            .with_plugin(VariablePlugin::new(&self.config.variables))
            .with_plugin(WikiLinkPlugin::new(
                &self.config.resources_path,
                ctx.page_dir,
                ctx.single_page,
            ))
            .with_plugin(TocPlugin::new(ctx.toc, ctx.single_page))
            .run(scanner)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tether_files::MockFiles;

    use super::*;
    use crate::toc::Toc;

    fn config() -> RenderConfig {
        let mut config = RenderConfig {
            resources_path: "/static".to_owned(),
            ..RenderConfig::default()
        };
        config
            .variables
            .insert("version".to_owned(), "1.4.2".to_owned());
        config
            .link_parameters
            .insert("repo".to_owned(), "https://example.com/r".to_owned());
        config
    }

    #[test]
    fn test_full_page_pipeline() {
        let repo = MockFiles::new().with_file(
            "src/demo.rs",
            "junk\n#setup\nlet answer = 42;\n#setup\nmore\n",
        );
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let markdown = "\
# Demo %version%

See @[setup](/src/demo.rs) and [[Next|next-page]].

[source]({repo}/demo)
";
        let html = renderer.render(markdown, &RenderContext::new());

        // the variable is not a plain-text leaf: the anchor comes from
        // the literal heading text, the rendered value from the plugin
        assert!(html.contains("<h1 id=\"Demo\">Demo 1.4.2</h1>"));
        assert!(html.contains("<pre><code class=\"language-rs\">let answer = 42;</code></pre>"));
        assert!(html.contains("<a href=\"next-page\">Next</a>"));
        assert!(html.contains("<a href=\"https://example.com/r/demo\">source</a>"));
    }

    #[test]
    fn test_soft_failure_keeps_page_rendering() {
        let repo = MockFiles::new().with_file("src/demo.rs", "no labels here\n");
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let html = renderer.render(
            "before\n\n@[ghost](/src/demo.rs)\n\nafter",
            &RenderContext::new(),
        );

        assert!(html.contains("Unable to find label ghost in source file /src/demo.rs"));
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_link_mode_sensitivity() {
        let repo = MockFiles::new();
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);

        let multi = renderer.render("[[A|B]]", &RenderContext::new());
        assert!(multi.contains("<a href=\"B\">A</a>"));

        let single = renderer.render("[[A|B]]", &RenderContext::new().with_single_page(true));
        assert!(single.contains("<a href=\"#B\">A</a>"));
    }

    #[test]
    fn test_page_dir_resolves_relative_code_path() {
        let repo = MockFiles::new().with_file("guides/ex.py", "#f\nprint(1)\n#f\n");
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let html = renderer.render(
            "@[f](ex.py)",
            &RenderContext::new().with_page_dir("guides"),
        );
        assert!(html.contains("language-py"));
        assert!(html.contains("print(1)"));
    }

    #[test]
    fn test_toc_marker_renders_supplied_tree() {
        let repo = MockFiles::new();
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let toc = Toc::new().with_page("Intro", "intro");

        let with_toc = renderer.render("::toc", &RenderContext::new().with_toc(&toc));
        assert!(with_toc.contains("<a href=\"intro.html\">Intro</a>"));

        let without = renderer.render("::toc", &RenderContext::new());
        assert_eq!(without, "");
    }

    #[test]
    fn test_unknown_variable_is_visible() {
        let repo = MockFiles::new();
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let html = renderer.render("value: %missing%", &RenderContext::new());
        assert!(html.contains("Unknown variable: missing"));
    }

    #[test]
    fn test_wiki_image_uses_resources_path() {
        let repo = MockFiles::new();
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let html = renderer.render(
            "[[diagram.png]]",
            &RenderContext::new().with_page_dir("guides"),
        );
        assert!(html.contains("<img src=\"/static/guides/diagram.png\" alt=\"\">"));
    }

    #[test]
    fn test_repeated_renders_identical() {
        let repo = MockFiles::new().with_file("a.rs", "#l\nx\n#l\n");
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let markdown = "# A\n\n@[l](a.rs)\n\n%version% [[w]]";
        let ctx = RenderContext::new();
        assert_eq!(renderer.render(markdown, &ctx), renderer.render(markdown, &ctx));
    }

    #[test]
    fn test_anchor_table_not_reused_between_renders() {
        let repo = MockFiles::new();
        let config = config();
        let renderer = PageRenderer::new(&repo, &config);
        let first = renderer.render("## Example", &RenderContext::new());
        let second = renderer.render("## Example", &RenderContext::new());
        // a fresh serializer per render: both get the bare anchor
        assert_eq!(first, second);
        assert!(first.contains("id=\"Example\""));
    }
}
