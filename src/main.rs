use std::sync::Arc;

use mailrules::config::EngineConfig;
use mailrules::engine::processor::BatchProcessor;
use mailrules::engine::reconcile::LabelDelta;
use mailrules::engine::traits::{Mailbox, MessageSource};
use mailrules::error::{ApplyError, LabelError};
use mailrules::rules::model::RuleSet;
use mailrules::source::JsonFileSource;

/// Mailbox that logs every mutation instead of calling a remote API.
///
/// Label names resolve to themselves, so the printed deltas read naturally.
struct DryRunMailbox;

#[async_trait::async_trait]
impl Mailbox for DryRunMailbox {
    async fn get_or_create_label(&self, name: &str) -> Result<String, LabelError> {
        Ok(name.to_string())
    }

    async fn apply(&self, message_id: &str, delta: &LabelDelta) -> Result<(), ApplyError> {
        tracing::info!(id = %message_id, delta = %delta, "Dry run: would apply");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = EngineConfig::from_env();
    eprintln!("mailrules v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Rules: {}", config.rules_path.display());
    eprintln!("   Messages: {}", config.messages_path.display());
    eprintln!("   Dry run: {}\n", config.dry_run);

    if !config.dry_run {
        anyhow::bail!(
            "no remote mailbox transport is wired into this binary; \
             unset MAILRULES_DRY_RUN or set it to 1"
        );
    }

    // Malformed rule documents fail here, before any message is touched.
    let rules = RuleSet::load(&config.rules_path)?;
    let source = JsonFileSource::new(&config.messages_path);
    let messages = source.fetch_all().await?;

    let mailbox: Arc<dyn Mailbox> = Arc::new(DryRunMailbox);
    let processor = BatchProcessor::new(rules, mailbox);
    let outcome = processor.run_pass(messages).await;

    let report = &outcome.report;
    eprintln!(
        "\nScanned {} messages: {} rule matches, {} updates applied, {} already settled",
        report.scanned, report.matched, report.applied, report.skipped_empty
    );
    for item in &report.unresolved {
        eprintln!(
            "   unresolved label '{}' (rule '{}', message {}): {}",
            item.error.name, item.rule, item.message_id, item.error.reason
        );
    }
    for failure in &report.apply_failures {
        eprintln!(
            "   apply failed for message {} (rule '{}', delta {}): {}",
            failure.message_id, failure.rule, failure.delta, failure.error
        );
    }

    Ok(())
}
