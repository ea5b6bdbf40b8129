use std::io::Write;
use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::query::Query;
use crate::store::registry::Registry;
use crate::store::sqlite::Database;

pub fn run(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)?;
    let registry = db.registry(crate::config::DEFAULT_BATCH_SIZE)?;
    list(&registry, &mut std::io::stdout().lock())
}

/// One line per registered collection: name, search flag, document count.
pub fn list(registry: &Registry<'_>, out: &mut impl Write) -> Result<()> {
    if registry.is_empty() {
        writeln!(out, "{}", "No collections.".dimmed())?;
        return Ok(());
    }
    for (collection, searchable) in registry.iter() {
        let count = collection.count_documents(&Query::all())?;
        let flag = if searchable {
            "searchable".green()
        } else {
            "plain".dimmed()
        };
        writeln!(
            out,
            "{:<24} {:<10} {}",
            collection.name().cyan().bold(),
            flag,
            format!("{count} documents").dimmed()
        )?;
    }
    Ok(())
}
