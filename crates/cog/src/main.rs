use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use cog::app::App;
use cog::config::AppConfig;
use cog::providers;
use cog::runtime::CompletionHost;
use cog::tui::ChatController;
use cog_tui::logging::init_file_logging;
use cog_tui::{ProcessTerminal, TuiConfig, TuiRuntime};
use conversation_store::SqliteConversationStore;
use tracing::{error, info};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            eprintln!("cog: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|error| anyhow!(error))?;
    if let Err(error) = init_file_logging(&config.log_path) {
        eprintln!(
            "cog: logging disabled ({}): {error}",
            config.log_path.display()
        );
    }

    let provider = providers::provider_from_config(&config).map_err(|error| anyhow!(error))?;
    let profile = provider.profile();
    info!(provider = %profile.provider_id, model = %profile.model_id, "starting cog");

    let store = SqliteConversationStore::open(&config.database_path).with_context(|| {
        format!(
            "failed to open conversation store at {}",
            config.database_path.display()
        )
    })?;
    let app = App::load(Box::new(store), config.system_instructions.clone())
        .context("failed to load conversations")?;

    let tui_config = TuiConfig::from_env();
    let terminal = ProcessTerminal::new(&tui_config);
    let mut tui = TuiRuntime::new(terminal, &tui_config);
    let host = CompletionHost::new(Arc::clone(&provider), tui.handle());
    let mut controller = ChatController::new(app, host);

    tui.start().context("failed to start terminal")?;
    while !controller.should_exit() && !tui.stop_requested() {
        tui.run_blocking_once(&mut controller);
    }
    tui.stop().context("failed to restore terminal")?;

    info!("cog exited");
    Ok(())
}
