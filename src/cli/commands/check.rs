//! Check command - the per-turn evaluate, then create or rebuild flow

use crate::audit::AuditLog;
use crate::cli::args::CheckArgs;
use crate::cli::commands::common::{eligible_files, format_tokens, workspace_root};
use crate::config::Config;
use crate::engine::{ActiveEvaluation, Engine, Evaluation};
use crate::error::ZaniResult;
use crate::lifecycle::Lifecycle;
use crate::policy::Verdict;
use crate::provider::GeminiCache;
use crate::registry::RegistryStore;
use crate::ui::{self, ScanProgress, TaskSpinner, UiContext};
use std::path::Path;

/// Changed paths listed before the summary is truncated
const MAX_LISTED_PATHS: usize = 10;

/// Execute the check command
pub async fn execute(args: CheckArgs, config: &Config) -> ZaniResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let root = workspace_root(args.path)?;
    let thresholds = &config.explicit_cache;

    ui::intro(&ctx, "zani check");

    let files = eligible_files(&root, config).await?;
    let mut store = RegistryStore::for_workspace(&root);
    let progress = ScanProgress::new(&ctx, files.len());
    let mut engine = Engine::new(&mut store, thresholds).with_progress(progress.hook());
    let evaluation = engine.evaluate(&root, &files).await;
    progress.finish();
    engine.detach_progress();

    match evaluation {
        Evaluation::NoCache {
            project_tokens,
            should_offer_creation,
        } => {
            if !should_offer_creation {
                ui::outro_success(
                    &ctx,
                    &format!(
                        "No cache needed ({} tokens, minimum {})",
                        format_tokens(project_tokens),
                        thresholds.min_tokens
                    ),
                );
                return Ok(());
            }

            let prompt = format!(
                "No active cache. Create one for ~{} tokens?",
                format_tokens(project_tokens)
            );
            if !ui::confirm(&ctx, &prompt, false).await? {
                ui::outro_warn(&ctx, "Continuing without a cache");
                return Ok(());
            }

            let provider = GeminiCache::from_env(&config.model)?;
            let audit = AuditLog::new(config);
            let lifecycle = Lifecycle::new(&provider, &audit, &root);

            let mut spinner = TaskSpinner::new(&ctx);
            spinner.start("Creating context cache...");
            match lifecycle.create(&mut engine, &files).await {
                Ok(record) => spinner.stop(&format!("Created {}", record.cache_id)),
                Err(e) => {
                    spinner.stop_error("Cache creation failed");
                    return Err(e);
                }
            }
            ui::outro_success(&ctx, "Workspace cached");
        }
        Evaluation::Active(active) => {
            report_drift(&ctx, &active);
            ui::verdict(&ctx, &active.decision);

            if !active.decision.verdict.wants_rebuild() {
                ui::outro_success(&ctx, &format!("Using {}", active.cache_id));
                return Ok(());
            }

            if !ui::confirm(&ctx, "Rebuild context cache now?", false).await? {
                if active.decision.verdict == Verdict::Force {
                    ui::outro_warn(&ctx, "Cache is stale; answers may reflect old files");
                } else {
                    ui::outro_warn(&ctx, &format!("Keeping {}", active.cache_id));
                }
                return Ok(());
            }

            rebuild(&ctx, config, &root, &mut engine, &active).await?;
        }
    }

    Ok(())
}

async fn rebuild(
    ctx: &UiContext,
    config: &Config,
    root: &Path,
    engine: &mut Engine<'_>,
    active: &ActiveEvaluation,
) -> ZaniResult<()> {
    let provider = GeminiCache::from_env(&config.model)?;
    let audit = AuditLog::new(config);
    let lifecycle = Lifecycle::new(&provider, &audit, root);
    let reason = active.decision.reason.as_deref().unwrap_or("manual rebuild");

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Rebuilding context cache...");
    match lifecycle
        .rebuild(engine, &active.cache_id, &active.fresh, reason)
        .await
    {
        Ok(record) => spinner.stop(&format!("Rebuilt as {}", record.cache_id)),
        Err(e) => {
            spinner.stop_error("Rebuild failed; previous cache kept");
            return Err(e);
        }
    }

    ui::outro_success(ctx, "Cache matches the workspace");
    Ok(())
}

fn report_drift(ctx: &UiContext, active: &ActiveEvaluation) {
    if active.diff.is_empty() {
        return;
    }

    ui::section(ctx, "Changes since cache was built");
    let labelled = active
        .diff
        .added
        .iter()
        .map(|p| ("added", p))
        .chain(active.diff.modified.iter().map(|p| ("modified", p)))
        .chain(active.diff.deleted.iter().map(|p| ("deleted", p)));

    for (kind, path) in labelled.clone().take(MAX_LISTED_PATHS) {
        ui::key_value(ctx, kind, path);
    }
    let total = labelled.count();
    if total > MAX_LISTED_PATHS {
        ui::remark(ctx, &format!("... and {} more", total - MAX_LISTED_PATHS));
    }
    ui::key_value(
        ctx,
        "Magnitude",
        &format!(
            "{:.2}% of project, ~{} tokens",
            active.magnitude.percent,
            format_tokens(active.magnitude.changed_tokens)
        ),
    );
}
