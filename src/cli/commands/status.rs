//! Status command - read-only view of the active cache

use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::commands::common::{eligible_files, format_tokens, format_usd, workspace_root};
use crate::config::schema::CacheConfig;
use crate::config::Config;
use crate::engine::{ActiveEvaluation, Engine, Evaluation};
use crate::error::ZaniResult;
use crate::policy::{cache_hit_savings, cache_storage_cost};
use crate::registry::RegistryStore;
use crate::ui::{self, ScanProgress, UiContext};
use crate::workspace::bytes_to_tokens;
use chrono::Utc;
use serde_json::json;

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> ZaniResult<()> {
    let ctx = UiContext::detect();
    let root = workspace_root(args.path)?;
    let thresholds = &config.explicit_cache;

    let files = eligible_files(&root, config).await?;
    let mut store = RegistryStore::for_workspace(&root);

    let evaluation = if args.format == OutputFormat::Table {
        let progress = ScanProgress::new(&ctx, files.len());
        let engine = Engine::new(&mut store, thresholds).with_progress(progress.hook());
        let evaluation = engine.evaluate(&root, &files).await;
        progress.finish();
        evaluation
    } else {
        Engine::new(&mut store, thresholds)
            .evaluate(&root, &files)
            .await
    };

    match args.format {
        OutputFormat::Json => {
            let report = json_report(&evaluation, thresholds)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_table(&ctx, &evaluation, thresholds),
    }

    Ok(())
}

fn json_report(evaluation: &Evaluation, thresholds: &CacheConfig) -> ZaniResult<serde_json::Value> {
    let report = match evaluation {
        Evaluation::NoCache {
            project_tokens,
            should_offer_creation,
        } => json!({
            "active": false,
            "project_tokens": project_tokens,
            "should_offer_creation": should_offer_creation,
        }),
        Evaluation::Active(active) => {
            let mut value = serde_json::to_value(active)?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("active".to_string(), json!(true));
                obj.insert(
                    "storage_cost_usd".to_string(),
                    json!(storage_cost(active, thresholds)),
                );
                obj.insert(
                    "savings_per_request_usd".to_string(),
                    json!(savings_per_request(active)),
                );
            }
            value
        }
    };
    Ok(report)
}

fn storage_cost(active: &ActiveEvaluation, thresholds: &CacheConfig) -> f64 {
    let tokens = bytes_to_tokens(active.fresh.total_bytes());
    cache_storage_cost(tokens, thresholds.ttl_hours)
}

fn savings_per_request(active: &ActiveEvaluation) -> f64 {
    cache_hit_savings(bytes_to_tokens(active.fresh.total_bytes()))
}

fn print_table(ctx: &UiContext, evaluation: &Evaluation, thresholds: &CacheConfig) {
    ui::section(ctx, "Context cache");

    let active = match evaluation {
        Evaluation::NoCache {
            project_tokens,
            should_offer_creation,
        } => {
            ui::key_value_status(ctx, "Cache", "none", false);
            ui::key_value(ctx, "Project tokens", &format_tokens(*project_tokens));
            if *should_offer_creation {
                ui::remark(ctx, "Run: zani init");
            } else {
                ui::remark(
                    ctx,
                    &format!("Below the {} token minimum for caching", thresholds.min_tokens),
                );
            }
            return;
        }
        Evaluation::Active(active) => active,
    };

    ui::key_value(ctx, "Cache", &active.cache_id);
    match active.ttl_expiry {
        Some(expiry) => {
            let remaining = expiry - Utc::now();
            let label = if active.expired {
                format!("{} (expired)", expiry.to_rfc3339())
            } else {
                format!("{} ({}m left)", expiry.to_rfc3339(), remaining.num_minutes())
            };
            ui::key_value_status(ctx, "Expires", &label, !active.expired);
        }
        None => ui::key_value(ctx, "Expires", "never"),
    }

    ui::section(ctx, "Drift");
    ui::key_value(
        ctx,
        "Files",
        &format!(
            "{} added, {} modified, {} deleted",
            active.diff.added.len(),
            active.diff.modified.len(),
            active.diff.deleted.len()
        ),
    );
    ui::key_value(
        ctx,
        "Changed",
        &format!(
            "{} bytes, {:.2}%, ~{} tokens",
            active.magnitude.changed_bytes,
            active.magnitude.percent,
            format_tokens(active.magnitude.changed_tokens)
        ),
    );
    if active.skipped > 0 {
        ui::key_value(ctx, "Unreadable", &active.skipped.to_string());
    }
    ui::key_value(
        ctx,
        &format!("Storage ({}h)", thresholds.ttl_hours),
        &format_usd(storage_cost(active, thresholds)),
    );
    ui::key_value(
        ctx,
        "Saved per request",
        &format_usd(savings_per_request(active)),
    );

    ui::verdict(ctx, &active.decision);
    if active.decision.verdict.wants_rebuild() {
        ui::remark(ctx, "Run: zani check");
    }
}
