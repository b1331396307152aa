//! Init command handler

use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Wrote config.toml with default settings.");
        println!("API keys are read from the environment (or a .env file).");
    } else {
        println!("config.toml already exists; nothing to do.");
    }
    Ok(())
}
