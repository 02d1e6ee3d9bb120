use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{self, Fetch};
use crate::builder::build_select_options;
use crate::config::{self, Config};
use crate::data::{HttpRemoteData, MockRemoteData, RemoteData};
use crate::document::Document;
use crate::logging;
use crate::model::UserId;
use crate::selection::SelectionController;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
    pub offline: bool,
}

pub fn run(options: RunOptions) -> Result<()> {
    let cfg = prepare(&options)?;
    let remote = build_remote(&cfg, options.offline)?;

    let mut document = Document::new();
    let mut controller = SelectionController::new(remote, cfg.view.fallback_user_id);
    let status_message = match bootstrap(&mut document, &mut controller) {
        Some(0) => "No employees found.".to_string(),
        Some(count) => format!("{count} employees. Pick one and press Enter."),
        None => "Could not load employees. Check your connection or the api.base_url setting."
            .to_string(),
    };

    let mut model = ui::Model::new(ui::Options {
        status_message,
        document,
        controller,
    });
    model.run()
}

/// Runs one selection without a terminal UI and returns the main region as HTML.
pub fn dump(options: RunOptions, selected: Option<UserId>) -> Result<String> {
    let cfg = prepare(&options)?;
    let remote = build_remote(&cfg, options.offline)?;

    let mut document = Document::new();
    let mut controller = SelectionController::new(remote, cfg.view.fallback_user_id);
    bootstrap(&mut document, &mut controller);
    controller.on_selection_change(&mut document, selected);
    Ok(document.to_html())
}

fn prepare(options: &RunOptions) -> Result<Config> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    if let Err(err) = logging::init(&cfg.log) {
        eprintln!("warning: logging disabled: {err:?}");
    }
    Ok(cfg)
}

fn build_remote(cfg: &Config, offline: bool) -> Result<Arc<dyn RemoteData>> {
    if offline {
        info!("using built-in offline dataset");
        return Ok(Arc::new(MockRemoteData::with_fixture()));
    }
    let client = api::Client::new(api::ClientConfig {
        base_url: cfg.api.base_url.clone(),
        user_agent: cfg.api.user_agent.clone(),
        timeout: Some(cfg.api.timeout),
        http_client: None,
    })
    .context("build api client")?;
    info!(base_url = client.base_url(), "api client ready");
    Ok(Arc::new(HttpRemoteData::new(Arc::new(client))))
}

/// One-time startup: fill the selector with every user and show the
/// placeholder. Returns the number of options, or `None` if the user list
/// could not be loaded.
pub fn bootstrap(document: &mut Document, controller: &mut SelectionController) -> Option<usize> {
    let users = match controller.remote().fetch_all_users() {
        Fetch::Ready(users) => Some(users),
        Fetch::Skipped => None,
        Fetch::Failed(err) => {
            warn!(error = %err, "user list unavailable");
            None
        }
    };
    let count = build_select_options(users.as_deref()).map(|options| {
        let count = options.len();
        document.set_options(options);
        count
    });
    controller.show_placeholder(document);
    count
}
