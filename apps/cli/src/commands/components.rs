//! Components command implementation.

use colored::Colorize;
use partials_core::PartialsConfig;

/// Execute the components command.
pub fn execute(config: &PartialsConfig, json: bool) -> anyhow::Result<()> {
    let registry = config.loader.registry();

    if json {
        println!("{}", serde_json::to_string_pretty(registry.components())?);
        return Ok(());
    }

    println!("{}", "Registered components".bold().cyan());
    println!();
    for component in registry.components() {
        println!(
            "  {:<28} {:<36} {} ({})",
            component.element_id.green(),
            component.path,
            component.priority,
            component.tier().as_str().dimmed()
        );
    }
    println!();
    println!("{} components", registry.len());

    Ok(())
}
