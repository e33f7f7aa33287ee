//! Add-mobile-css command implementation.

use colored::Colorize;
use partials_core::{InjectionStatus, PartialsConfig, StylesheetInjector};

/// Execute the add-mobile-css command.
pub async fn execute(config: &PartialsConfig) -> anyhow::Result<()> {
    println!("{}", "Adding mobile navigation CSS fixes to all pages...".bold().cyan());

    let injector = StylesheetInjector::new(&config.stylesheet);
    let reports = injector.inject_site(&config.site.root).await?;

    for report in &reports {
        match report.status {
            InjectionStatus::AlreadyPresent => {
                println!("  {} {} already has mobile CSS", "✓".green(), report.file);
            }
            InjectionStatus::Inserted { .. } => {
                println!("  {} Added mobile CSS to {}", "✓".green(), report.file);
            }
            InjectionStatus::AnchorMissing => println!(
                "  {} Could not find CSS insertion point in {}",
                "⚠".yellow(),
                report.file
            ),
        }
    }

    println!();
    if reports.is_empty() {
        println!("{}", "No pages found".yellow());
    } else {
        println!("{}", "✓ Mobile navigation CSS fixes applied to all pages!".green().bold());
    }

    Ok(())
}
