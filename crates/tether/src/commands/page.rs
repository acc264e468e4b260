//! `tether page` - render one page to stdout.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

use super::{create_site, load_config};

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page name (path without extension), e.g. `guides/setup`.
    pub name: String,

    /// Path to the configuration file (discovered upward from the
    /// current directory when omitted).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl PageArgs {
    /// Render the page and print its HTML fragment.
    pub(crate) fn execute(&self, output: &Output) -> Result<(), CliError> {
        let config = load_config(self.config.as_deref())?;
        let site = create_site(&config);
        let page = site.render_page(&self.name)?;
        output.content(&page.html);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_page_command_renders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("tether.toml"),
            "[site]\nsource_dir = \"docs\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("docs/solo.md"), "# Solo").unwrap();

        let args = PageArgs {
            name: "solo".to_owned(),
            config: Some(dir.path().join("tether.toml")),
        };
        assert!(args.execute(&Output::new()).is_ok());
    }

    #[test]
    fn test_page_command_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("tether.toml"),
            "[site]\nsource_dir = \"docs\"\n",
        )
        .unwrap();

        let args = PageArgs {
            name: "ghost".to_owned(),
            config: Some(dir.path().join("tether.toml")),
        };
        assert!(args.execute(&Output::new()).is_err());
    }
}
