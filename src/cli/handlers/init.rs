use std::fs;
use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};

/// Where `init` writes: `--config` if given, else `./questlog.toml`.
fn target_path(config: Option<&str>) -> Result<PathBuf, std::io::Error> {
    match config {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(std::env::current_dir()?.join(CONFIG_FILE)),
    }
}

pub fn cmd_init(args: InitArgs, config: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let path = target_path(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config_io::write_default_config(&path, &args.timezone, args.force)?;

    // Create the data directory now rather than on first write
    let loaded = config_io::read_config(&path)?;
    fs::create_dir_all(&loaded.data_dir)?;

    println!("Initialized questlog: {}", path.display());
    println!("  data: {}", loaded.data_dir.display());
    println!("  timezone: {}", loaded.default_timezone);
    Ok(())
}
