use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::db::schema::{
    COMPACTED_TAGS_TABLE, ENTRIES_TABLE, FILTER_TRUNCATE_TABLES, SOCIAL_DATA_TABLE,
    USER_TAGS_TABLE,
};
use crate::db::{
    copy_database, delete_orphans, ensure_distinct, open_database, truncate_tables, vacuum,
    EntryTable, Filter,
};
use crate::error::{AppError, Result};

/// Tables whose rows hang off an entry through `entry_id`.
const ENTRY_CHILD_TABLES: &[&str] = &[COMPACTED_TAGS_TABLE, USER_TAGS_TABLE, SOCIAL_DATA_TABLE];

/// Which entries to drop from the filtered copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    NotBookmarked,
    NoVotes,
    /// Not bookmarked and without votes.
    Redundant,
}

impl EntryFilter {
    fn to_filter(self) -> Filter {
        match self {
            EntryFilter::NotBookmarked => Filter::all().equals("bookmarked", false),
            EntryFilter::NoVotes => Filter::all().equals("page_rating_votes", 0),
            EntryFilter::Redundant => Filter::all()
                .equals("bookmarked", false)
                .equals("page_rating_votes", 0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bookmarked: bool,
    pub votes: bool,
    pub redundant: bool,
}

impl FilterOptions {
    pub fn entry_filters(&self) -> Vec<EntryFilter> {
        let mut filters = Vec::new();
        if self.bookmarked {
            filters.push(EntryFilter::NotBookmarked);
        }
        if self.votes {
            filters.push(EntryFilter::NoVotes);
        }
        if self.redundant {
            filters.push(EntryFilter::Redundant);
        }
        filters
    }
}

/// Rows removed by one [`DbFilter::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removal {
    pub entries: usize,
    pub related: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub entries_removed: usize,
    pub related_removed: usize,
    pub entries_left: u64,
}

/// Works on a fresh copy of the input archive; the input is never opened for writing.
pub struct DbFilter {
    conn: Connection,
}

impl DbFilter {
    pub fn new(input: &Path, output: &Path) -> Result<Self> {
        if !input.is_file() {
            return Err(AppError::FileNotFound(input.to_path_buf()));
        }
        ensure_distinct(input, output)?;

        copy_database(input, output)?;
        let conn = open_database(output)?;
        tracing::info!("Filtering copy {}", output.display());
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Empties history, session and per-user tables.
    pub fn truncate(&self) -> Result<()> {
        truncate_tables(&self.conn, FILTER_TRUNCATE_TABLES)
    }

    /// Deletes matching entries and the tags and social data left without an entry.
    pub fn apply(&self, filter: EntryFilter) -> Result<Removal> {
        let entries = EntryTable::open(&self.conn)?;
        let removed = entries.table().delete_where(&filter.to_filter())?;
        tracing::info!("{:?}: removed {} entries", filter, removed);

        let related = if removed > 0 {
            self.remove_orphans()?
        } else {
            0
        };
        Ok(Removal {
            entries: removed,
            related,
        })
    }

    pub fn remove_orphans(&self) -> Result<usize> {
        let mut removed = 0;
        for child in ENTRY_CHILD_TABLES {
            let count = delete_orphans(&self.conn, child, ENTRIES_TABLE)?;
            if count > 0 {
                tracing::debug!("Removed {} orphaned rows from {}", count, child);
            }
            removed += count;
        }
        Ok(removed)
    }

    pub fn vacuum(&self) -> Result<()> {
        vacuum(&self.conn)
    }
}

pub fn run(options: &FilterOptions) -> Result<FilterReport> {
    let filter = DbFilter::new(&options.input, &options.output)?;
    filter.truncate()?;

    let mut report = FilterReport::default();
    for entry_filter in options.entry_filters() {
        let removal = filter.apply(entry_filter)?;
        report.entries_removed += removal.entries;
        report.related_removed += removal.related;
    }

    filter.vacuum()?;
    report.entries_left = EntryTable::open(filter.connection())?.count()?;
    Ok(report)
}
