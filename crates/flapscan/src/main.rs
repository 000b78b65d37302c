mod bootstrap;

use std::sync::Arc;

use anyhow::{Context, Result};
use flapscan_core::rules::ClassificationRules;
use flapscan_core::settings::Settings;
use flapscan_data::reader::CaptureDirSource;
use flapscan_runtime::orchestrator::{ScanOrchestrator, ScanRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("flapscan v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Report: {}, Captures: {}",
        settings.report,
        settings.captures.display()
    );

    // Configuration problems stop the run before any node is read.
    let request = ScanRequest::from_settings(&settings)?;
    let rules = ClassificationRules::resolve(settings.rules.as_deref())
        .context("loading classification rules")?;
    let source = CaptureDirSource::new(&settings.captures)?;

    let nodes = source.discover_nodes();
    if nodes.is_empty() {
        tracing::warn!(
            "No node directories under {}; the report will be empty",
            settings.captures.display()
        );
    }

    let orchestrator = ScanOrchestrator::new(Arc::new(source), rules)
        .with_concurrency(settings.concurrency as usize);
    let report = orchestrator.run(&request, nodes).await?;

    let failed = report.failed_nodes();
    if failed > 0 {
        tracing::warn!("{} of {} nodes failed", failed, report.nodes().len());
    }

    let json = if settings.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
