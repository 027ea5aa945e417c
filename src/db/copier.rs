use rusqlite::Connection;
use serde_json::Value;

use crate::error::Result;

use super::repository::{EntryTable, SocialDataTable, TagTable};
use super::table::Record;

/// Copies entries, with their tags and social data, between two archives.
///
/// Nothing is rolled back: when a tag or social-data copy fails the new entry
/// stays in the destination and the error is returned.
pub struct EntryCopier<'a> {
    src: &'a Connection,
    dst: &'a Connection,
}

impl<'a> EntryCopier<'a> {
    pub fn new(src: &'a Connection, dst: &'a Connection) -> Self {
        Self { src, dst }
    }

    /// Inserts `entry` (a source row) as a new destination entry and returns its id.
    pub fn copy_entry(&self, entry: &Record) -> Result<Option<i64>> {
        let Some(src_id) = entry.get("id").and_then(Value::as_i64) else {
            tracing::warn!("Entry without id cannot be copied");
            return Ok(None);
        };

        let entries = EntryTable::open(self.dst)?;
        let mut data = entry.clone();
        data.remove("id");
        let dropped = entries.table().retain_known(&mut data);
        if !dropped.is_empty() {
            tracing::debug!("Dropping columns unknown to destination: {}", dropped.join(", "));
        }

        let new_id = entries.insert_json(data)?;
        if let Some(new_id) = new_id {
            self.copy_related(src_id, new_id)?;
        }
        Ok(new_id)
    }

    /// Copies tags and social data of source entry `src_id` onto destination entry `new_id`.
    pub fn copy_related(&self, src_id: i64, new_id: i64) -> Result<()> {
        self.copy_tags(src_id, new_id)?;
        self.copy_social_data(src_id, new_id)?;
        Ok(())
    }

    fn copy_tags(&self, src_id: i64, new_id: i64) -> Result<()> {
        let tags = TagTable::compacted(self.src)?.tags(src_id)?;
        if tags.is_empty() {
            return Ok(());
        }

        let destination = TagTable::compacted(self.dst)?;
        for tag in &tags {
            destination.insert(new_id, tag)?;
        }
        Ok(())
    }

    fn copy_social_data(&self, src_id: i64, new_id: i64) -> Result<()> {
        let Some(mut social) = SocialDataTable::open(self.src)?.get_json(src_id)? else {
            return Ok(());
        };

        social.remove("id");
        social.insert("entry_id".to_string(), Value::from(new_id));

        let destination = SocialDataTable::open(self.dst)?;
        destination.table().retain_known(&mut social);
        destination.insert_json(&social)?;
        Ok(())
    }
}
