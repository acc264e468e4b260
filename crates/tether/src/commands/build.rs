//! `tether build` - render the whole site.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tether_site::RenderedPage;

use crate::error::CliError;
use crate::output::Output;

use super::{create_site, load_config};

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to the configuration file (discovered upward from the
    /// current directory when omitted).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Concatenate every page into one single-page document.
    #[arg(long)]
    pub single_page: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Render the site into the configured output directory.
    pub(crate) fn execute(&self, output: &Output) -> Result<(), CliError> {
        let config = load_config(self.config.as_deref())?;
        let site = create_site(&config);
        let out_dir = config.output_dir();

        let pages = if self.single_page {
            vec![site.render_single_page()?]
        } else {
            site.render_all()?
        };

        for page in &pages {
            write_page(&out_dir, page)?;
            output.info(&format!("  {}", page.path));
        }
        output.success(&format!(
            "Rendered {} page(s) to {}",
            pages.len(),
            out_dir.display()
        ));
        Ok(())
    }
}

fn write_page(out_dir: &Path, page: &RenderedPage) -> Result<(), CliError> {
    let path = out_dir.join(&page.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, wrap_document(page)).map_err(|source| CliError::Write { path, source })
}

/// Wrap a rendered fragment in a minimal HTML document shell.
fn wrap_document(page: &RenderedPage) -> String {
    let sidebar = page
        .sidebar_html
        .as_deref()
        .map(|nav| format!("<nav class=\"sidebar\">{nav}</nav>"))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n\
         <body>\n{sidebar}<main>{}</main>\n</body>\n</html>\n",
        page.html
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page(sidebar: Option<&str>) -> RenderedPage {
        RenderedPage {
            html: "<p>content</p>".to_owned(),
            sidebar_html: sidebar.map(ToOwned::to_owned),
            path: "guides/setup.html".to_owned(),
        }
    }

    #[test]
    fn test_wrap_document_with_sidebar() {
        let doc = wrap_document(&sample_page(Some("<ul class=\"toc\"></ul>")));
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<nav class=\"sidebar\"><ul class=\"toc\"></ul></nav>"));
        assert!(doc.contains("<main><p>content</p></main>"));
    }

    #[test]
    fn test_wrap_document_without_sidebar() {
        let doc = wrap_document(&sample_page(None));
        assert!(!doc.contains("<nav"));
    }

    #[test]
    fn test_write_page_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path(), &sample_page(None)).unwrap();
        assert!(dir.path().join("guides/setup.html").is_file());
    }

    #[test]
    fn test_build_renders_site_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("tether.toml"),
            "[site]\nsource_dir = \"docs\"\noutput_dir = \"out\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("docs/toc.txt"), "Intro|intro\n").unwrap();
        fs::write(dir.path().join("docs/intro.md"), "# Intro\n\nHello.").unwrap();

        let args = BuildArgs {
            config: Some(dir.path().join("tether.toml")),
            single_page: false,
            verbose: false,
        };
        args.execute(&Output::new()).unwrap();

        let rendered = fs::read_to_string(dir.path().join("out/intro.html")).unwrap();
        assert!(rendered.contains("<h1 id=\"Intro\">Intro</h1>"));
        assert!(rendered.contains("<p>Hello.</p>"));
    }

    #[test]
    fn test_build_single_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("tether.toml"),
            "[site]\nsource_dir = \"docs\"\noutput_dir = \"out\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("docs/toc.txt"), "A|a\nB|b\n").unwrap();
        fs::write(dir.path().join("docs/a.md"), "# A").unwrap();
        fs::write(dir.path().join("docs/b.md"), "# B").unwrap();

        let args = BuildArgs {
            config: Some(dir.path().join("tether.toml")),
            single_page: true,
            verbose: false,
        };
        args.execute(&Output::new()).unwrap();

        let rendered = fs::read_to_string(dir.path().join("out/index.html")).unwrap();
        assert!(rendered.contains("<div id=\"a\">"));
        assert!(rendered.contains("<div id=\"b\">"));
    }
}
