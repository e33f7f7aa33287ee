//! Migrate command implementation.

use colored::Colorize;
use partials_core::{MigrationError, PartialsConfig, migrate_site};

/// Execute the migrate command.
///
/// Per-page failures are reported and skipped; only an unusable template
/// fails the command.
pub async fn execute(config: &PartialsConfig) -> anyhow::Result<()> {
    println!("{}", "Starting page update process...".bold().cyan());
    println!("This will update all pages to use the component system.");
    println!();

    let summary = migrate_site(&config.site.root, &config.site.template).await?;

    for page in &summary.pages {
        match &page.result {
            Ok(backup) => println!(
                "  {} Updated {} (backup saved as {})",
                "✓".green(),
                page.page,
                backup.display().to_string().dimmed()
            ),
            Err(MigrationError::NotFound(_)) => {
                println!("  {} File {} not found", "✗".red(), page.page);
            }
            Err(e) => println!("  {} {}", "⚠".yellow(), e),
        }
    }

    println!();
    println!(
        "{}",
        format!(
            "✓ Page update process completed ({} updated, {} skipped)",
            summary.updated(),
            summary.skipped()
        )
        .green()
        .bold()
    );
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Review each updated page");
    println!("  2. Test the website functionality");
    println!("  3. Remove .backup files when satisfied");
    println!("  4. Update page titles if needed");

    Ok(())
}
