//! Knowledge base inspection commands.

use anyhow::{Context, Result};
use muni_core::config::Config;
use muni_core::kb::{ProcedureStore, format_details};

pub fn list(config: &Config) -> Result<()> {
    let kb_dir = config.kb_dir();
    let store = ProcedureStore::load_dir(&kb_dir)
        .with_context(|| format!("load procedures from {}", kb_dir.display()))?;

    if store.is_empty() {
        println!("No procedures found in {}", kb_dir.display());
        return Ok(());
    }
    for title in store.titles() {
        println!("{title}");
    }
    Ok(())
}

pub fn show(config: &Config, key: &str) -> Result<()> {
    let kb_dir = config.kb_dir();
    let store = ProcedureStore::load_dir(&kb_dir)
        .with_context(|| format!("load procedures from {}", kb_dir.display()))?;

    let proc = store
        .get(key)
        .with_context(|| format!("no procedure matches '{key}'"))?;
    println!("{}", format_details(proc));
    Ok(())
}
