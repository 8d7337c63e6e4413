//! Local configuration file.

use streamlay_common::{config_file_path, AppConfig};

use super::Context;

pub fn show(ctx: &Context) -> anyhow::Result<()> {
    let path = config_file_path();
    let origin = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config file: {}{origin}", path.display());
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}

/// Write `config` as loaded from disk, without command-line overrides.
pub fn init(config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    config
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
