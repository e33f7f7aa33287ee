//! Render command implementation.

use anyhow::Context;
use colored::Colorize;
use partials_core::{Document, LoadOutcome, PageLocation, PageRuntime, PartialsConfig};
use std::path::Path;

/// Execute the render command.
///
/// Loads every registered fragment into `page`, settles both tiers and writes
/// the assembled HTML to `output`, or to stdout.
pub async fn execute(
    config: &PartialsConfig,
    page: &Path,
    location: Option<String>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let html = tokio::fs::read_to_string(page)
        .await
        .with_context(|| format!("Failed to read page {}", page.display()))?;

    let location = location.unwrap_or_else(|| {
        let name = page.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        format!("/{}", name)
    });

    let runtime =
        PageRuntime::from_config(config, Document::parse(&html), PageLocation::new(location))?;
    let Some(handle) = runtime.bootstrap().await else {
        anyhow::bail!("Runtime already bootstrapped");
    };
    let report = handle.settle().await;
    let rendered = runtime.html().await;

    match output {
        Some(path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            for outcome in report.outcomes() {
                let status = match outcome.outcome {
                    LoadOutcome::Fetched | LoadOutcome::Cached => "loaded".green(),
                    LoadOutcome::Skipped => "skipped".dimmed(),
                    LoadOutcome::Failed(_) => "failed".red(),
                };
                println!("  {} {}", status, outcome.path);
            }
            println!(
                "{}",
                format!("✓ Rendered {} components into {}", report.rendered(), path.display())
                    .green()
                    .bold()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
