//! Stop command - terminate the active cache

use crate::audit::AuditLog;
use crate::cli::args::StopArgs;
use crate::cli::commands::common::workspace_root;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{ZaniError, ZaniResult};
use crate::lifecycle::Lifecycle;
use crate::provider::GeminiCache;
use crate::registry::RegistryStore;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the stop command
pub async fn execute(args: StopArgs, config: &Config) -> ZaniResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let root = workspace_root(args.path)?;

    let mut store = RegistryStore::for_workspace(&root);
    let mut engine = Engine::new(&mut store, &config.explicit_cache);

    let record = match engine.active_record().await {
        Ok(Some(record)) => record,
        Ok(None) => {
            ui::step_info(&ctx, "No active cache");
            return Ok(());
        }
        Err(e @ ZaniError::RegistryCorrupt { .. }) => {
            // The cache id is unrecoverable; drop the record so a new cache can be made
            ui::step_warn_hint(&ctx, &e.to_string(), "registry cleared");
            engine.release().await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let prompt = format!("Terminate cache {}?", record.cache_id);
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_info(&ctx, "Cache left running");
        return Ok(());
    }

    let provider = GeminiCache::from_env(&config.model)?;
    let audit = AuditLog::new(config);
    let lifecycle = Lifecycle::new(&provider, &audit, &root);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Terminating {}...", record.cache_id));
    match lifecycle.terminate(&mut engine, &record.cache_id).await {
        Ok(true) => spinner.stop("Cache terminated"),
        Ok(false) => spinner.stop("Cache had already expired; registry cleared"),
        Err(e) => {
            spinner.stop_error("Termination failed; registry kept");
            return Err(e);
        }
    }

    Ok(())
}
