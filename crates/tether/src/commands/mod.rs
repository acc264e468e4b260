//! CLI command implementations.

mod build;
mod page;

pub(crate) use build::BuildArgs;
pub(crate) use page::PageArgs;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_config::Config;
use tether_files::{FileRepository, FsFiles};
use tether_renderer::RenderConfig;
use tether_site::{PageIndex, SiteRenderer};

use crate::error::CliError;

/// Load configuration: an explicit path or discovery from the current
/// directory upward.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::find(&std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))?,
    };
    Ok(config)
}

/// Build the site renderer from loaded configuration.
pub(crate) fn create_site(config: &Config) -> SiteRenderer {
    let repo: Arc<dyn FileRepository> = Arc::new(FsFiles::new(config.source_dir()));

    let render_config = RenderConfig {
        resources_path: config.site.resources_path.clone(),
        variables: config.variables.clone(),
        link_parameters: config.link_parameters.clone(),
        next_text: config.site.next_text.clone(),
    };

    let mut site = SiteRenderer::new(Arc::clone(&repo), render_config);
    if let Some(index) = PageIndex::load(repo.as_ref()) {
        site = site.with_index(index);
    }
    site
}
