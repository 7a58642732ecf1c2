//! Init command - assess a workspace and create its first cache

use crate::audit::AuditLog;
use crate::cli::args::InitArgs;
use crate::cli::commands::common::{eligible_files, format_tokens, format_usd, workspace_root};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{ZaniError, ZaniResult};
use crate::lifecycle::Lifecycle;
use crate::policy::{cache_storage_cost, cache_write_cost};
use crate::provider::GeminiCache;
use crate::registry::RegistryStore;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::workspace::estimate_tokens;

/// Execute the init command
pub async fn execute(args: InitArgs, config: &Config) -> ZaniResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let root = workspace_root(args.path)?;
    let thresholds = &config.explicit_cache;

    ui::intro(&ctx, "zani init");

    let mut store = RegistryStore::for_workspace(&root);
    let mut engine = Engine::new(&mut store, thresholds);

    match engine.active_record().await {
        Ok(Some(record)) => {
            ui::step_info(&ctx, &format!("Cache already active: {}", record.cache_id));
            ui::remark(&ctx, "Run: zani status");
            return Ok(());
        }
        Ok(None) => {}
        Err(e @ ZaniError::RegistryCorrupt { .. }) => {
            ui::step_warn_hint(&ctx, &e.to_string(), "a new cache will replace it");
        }
        Err(e) => return Err(e),
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Scanning workspace...");
    let files = eligible_files(&root, config).await?;
    let tokens = estimate_tokens(&root, &files);
    spinner.stop(&format!("{} eligible files", files.len()));

    ui::key_value(&ctx, "Workspace", &root.display().to_string());
    ui::key_value(&ctx, "Estimated tokens", &format_tokens(tokens));
    ui::key_value(&ctx, "Write cost", &format_usd(cache_write_cost(tokens)));
    ui::key_value(
        &ctx,
        &format!("Storage ({}h)", thresholds.ttl_hours),
        &format_usd(cache_storage_cost(tokens, thresholds.ttl_hours)),
    );

    if tokens < thresholds.min_tokens {
        ui::outro_warn(
            &ctx,
            &format!(
                "Project is below the {} token minimum; no cache needed",
                thresholds.min_tokens
            ),
        );
        return Ok(());
    }

    if !ui::confirm(&ctx, "Create context cache?", false).await? {
        ui::outro_warn(&ctx, "Skipped cache creation");
        return Ok(());
    }

    let provider = GeminiCache::from_env(&config.model)?;
    let audit = AuditLog::new(config);
    let lifecycle = Lifecycle::new(&provider, &audit, &root);

    spinner.start("Creating context cache...");
    let record = match lifecycle.create(&mut engine, &files).await {
        Ok(record) => record,
        Err(e) => {
            spinner.stop_error("Cache creation failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Created {}", record.cache_id));

    ui::outro_success(&ctx, "Workspace cached");
    Ok(())
}
