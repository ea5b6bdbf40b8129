use std::io::Write;
use std::path::Path;

use crate::build_info;
use crate::config::Filters;
use crate::error::Result;
use crate::output::{self, Log};
use crate::query::Query;
use crate::store::Collection;
use crate::store::registry::Registry;
use crate::store::sqlite::Database;

/// State of a single reindex run: the filters it was started with and the
/// number of documents handed to `save()` so far.
pub struct Reindexer<'f, W: Write> {
    filters: &'f Filters,
    reindexed: u64,
    log: Log<W>,
}

impl<'f, W: Write> Reindexer<'f, W> {
    pub fn new(filters: &'f Filters, log: Log<W>) -> Self {
        Self {
            filters,
            reindexed: 0,
            log,
        }
    }

    /// Touch every matching document of every searchable collection, one
    /// collection and one document at a time. The first error aborts the run.
    pub fn run(mut self, registry: &Registry<'_>) -> Result<u64> {
        if !self.filters.collections.is_empty() {
            self.log.line(output::filter_line(
                "Only reindexing collections",
                &self.filters.collections,
            ))?;
        }
        if !self.filters.ids.is_empty() {
            self.log
                .line(output::filter_line("Only reindexing IDs", &self.filters.ids))?;
        }

        // TODO: optional delay between saves to throttle load on the indexer
        let filters = self.filters;
        for collection in registry
            .searchable()
            .filter(|c| filters.includes_collection(c.name()))
        {
            self.reindex_collection(collection)?;
        }

        self.log.line(output::summary_line(self.reindexed))?;
        Ok(self.reindexed)
    }

    fn reindex_collection(&mut self, collection: &dyn Collection) -> Result<()> {
        let query = Query::from_filters(self.filters);
        let total = collection.count_documents(&query)?;

        let mut n = 0;
        for doc in collection.find(&query)? {
            let doc = doc?;
            n += 1;
            self.log
                .line(output::progress_line(collection.name(), &doc.id, n, total))?;
            self.reindexed += 1;
            collection.save(&doc)?;
        }
        Ok(())
    }
}

pub fn run(db_path: &Path, filters: &Filters, batch_size: usize) -> Result<()> {
    let db = Database::open(db_path)?;
    let registry = db.registry(batch_size)?;

    let mut log = Log::new(std::io::stderr().lock());
    log.line(format!(
        "reindex {} on {}",
        build_info::version_label(),
        db_path.display()
    ))?;
    Reindexer::new(filters, log).run(&registry)?;
    Ok(())
}
