use std::io::Write;
use std::path::PathBuf;

use clap::ValueEnum;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::db::schema::EXPORT_TRUNCATE_TABLES;
use crate::db::{
    copy_database, ensure_distinct, open_database, truncate_tables, EntryCopier, EntryTable,
    Record, TagTable,
};
use crate::error::{AppError, Result};
use crate::feed::{feeds_for_link, FeedFetcher};
use crate::models::{from_record, Entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum OutputFormat {
    #[default]
    Lines,
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Default)]
pub struct FeedExportOptions {
    pub input: PathBuf,
    pub output_db: Option<PathBuf>,
    pub format: OutputFormat,
    /// Recreate the output database even when it already exists.
    pub clean: bool,
    /// Fetch every feed and take its title, description, status and thumbnail.
    pub update_rss: bool,
    /// Fetch entry pages and collect the feeds they advertise.
    pub read_internet_links: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub entries: usize,
    pub feeds: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Turns the good entries of an archive into one row per feed they expose.
pub struct FeedExporter {
    options: FeedExportOptions,
    fetcher: Option<FeedFetcher>,
}

impl FeedExporter {
    pub fn new(mut options: FeedExportOptions) -> Result<Self> {
        if !options.input.is_file() {
            return Err(AppError::FileNotFound(options.input.clone()));
        }

        if options.output_db.is_some() {
            options.format = OutputFormat::Sqlite;
        } else if options.format == OutputFormat::Sqlite {
            return Err(AppError::InvalidArgument(
                "SQLITE output needs an output database".to_string(),
            ));
        }

        if let Some(output) = &options.output_db {
            ensure_distinct(&options.input, output)?;
            if options.clean || !output.exists() {
                tracing::info!("Creating output database {}", output.display());
                copy_database(&options.input, output)?;
                let conn = open_database(output)?;
                truncate_tables(&conn, EXPORT_TRUNCATE_TABLES)?;
            }
        }

        Ok(Self {
            options,
            fetcher: None,
        })
    }

    /// HTTP client used for `update_rss` and `read_internet_links`.
    pub fn with_fetcher(mut self, fetcher: FeedFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.options.format
    }

    pub async fn convert<W: Write>(&self, out: &mut W) -> Result<FeedReport> {
        let src = open_database(&self.options.input)?;
        let dst = match &self.options.output_db {
            Some(path) => Some(open_database(path)?),
            None => None,
        };

        let entries = EntryTable::open(&src)?;
        let tags = TagTable::compacted(&src)?;
        let mut report = FeedReport::default();

        for record in entries.good_entries()? {
            let entry: Entry = from_record(&record)?;
            report.entries += 1;

            for feed in self.feeds_for(&entry).await {
                report.feeds += 1;
                let data = self.prepare_data(&entry, &feed).await;
                self.print_data(out, &entry, &data, &tags)?;

                if let Some(dst) = &dst {
                    if insert_feed(&src, dst, &entry, data)? {
                        report.inserted += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    async fn feeds_for(&self, entry: &Entry) -> Vec<String> {
        let mut feeds = feeds_for_link(&entry.link);

        if self.options.read_internet_links {
            if let Some(fetcher) = &self.fetcher {
                match fetcher.discover_feeds(&entry.link).await {
                    Ok(found) => {
                        for feed in found {
                            if !feeds.contains(&feed) {
                                feeds.push(feed);
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Could not read {}: {}", entry.link, e),
                }
            }
        }

        feeds
    }

    async fn prepare_data(&self, entry: &Entry, feed: &str) -> Record {
        let mut data = feed_row(entry, feed);

        if self.options.update_rss {
            if let Some(fetcher) = &self.fetcher {
                match fetcher.fetch_metadata(feed).await {
                    Ok(meta) => {
                        data.insert("title".into(), json!(meta.title));
                        data.insert("description".into(), json!(meta.description));
                        data.insert("status_code".into(), json!(meta.status_code));
                        data.insert("thumbnail".into(), json!(meta.thumbnail));
                    }
                    Err(e) => tracing::warn!("Could not fetch feed {}: {}", feed, e),
                }
            }
        }

        data
    }

    fn print_data<W: Write>(
        &self,
        out: &mut W,
        entry: &Entry,
        data: &Record,
        tags: &TagTable,
    ) -> Result<()> {
        let link = data.get("link").and_then(Value::as_str).unwrap_or_default();
        let title = data.get("title").and_then(Value::as_str).unwrap_or_default();
        let votes = data.get("page_rating_votes").cloned().unwrap_or(Value::from(0));

        match self.options.format {
            OutputFormat::Lines | OutputFormat::Sqlite => {
                writeln!(out, "[{}] {} - {}", votes, link, title)?;
                let tags = tags.tags_string(entry.id)?;
                if !tags.is_empty() {
                    writeln!(out, "{}", tags)?;
                }
            }
            OutputFormat::Json => {
                let row = json!({
                    "title": title,
                    "link": link,
                    "page_rating_votes": votes,
                    "tags": tags.tags(entry.id)?,
                });
                writeln!(out, "{}", row)?;
            }
        }
        Ok(())
    }
}

/// Row describing `feed`, carrying over what the entry knows about its source.
pub fn feed_row(entry: &Entry, feed: &str) -> Record {
    let row = json!({
        "link": feed,
        "title": entry.title,
        "page_rating_votes": entry.page_rating_votes,
        "manual_status_code": entry.manual_status_code,
        "thumbnail": entry.thumbnail,
        "language": entry.language,
        "status_code": entry.status_code,
        "source_url": "",
        "permanent": false,
        "bookmarked": false,
        "contents_type": 0,
        "page_rating_contents": 0,
        "page_rating_visits": 0,
        "page_rating": 0,
    });
    match row {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn insert_feed(src: &Connection, dst: &Connection, entry: &Entry, mut data: Record) -> Result<bool> {
    let entries = EntryTable::open(dst)?;
    let Some(link) = data.get("link").and_then(Value::as_str).map(String::from) else {
        return Ok(false);
    };
    if entries.is_link(&link)? {
        tracing::debug!("Feed {} already exported", link);
        return Ok(false);
    }

    entries.table().retain_known(&mut data);
    let Some(new_id) = entries.insert_json(data)? else {
        return Ok(false);
    };
    EntryCopier::new(src, dst).copy_related(entry.id, new_id)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_row_copies_entry_fields() {
        let entry = Entry {
            id: 3,
            link: "https://www.youtube.com/channel/X".into(),
            title: Some("Channel".into()),
            page_rating_votes: 7,
            status_code: 200,
            language: Some("en".into()),
            ..Default::default()
        };
        let row = feed_row(&entry, "https://feed");
        assert_eq!(row["link"], json!("https://feed"));
        assert_eq!(row["title"], json!("Channel"));
        assert_eq!(row["page_rating_votes"], json!(7));
        assert_eq!(row["status_code"], json!(200));
        assert_eq!(row["bookmarked"], json!(false));
        assert_eq!(row["thumbnail"], Value::Null);
    }

    #[test]
    fn output_format_names() {
        assert_eq!(
            OutputFormat::from_str("SQLITE", false).unwrap(),
            OutputFormat::Sqlite
        );
        assert_eq!(OutputFormat::from_str("lines", true).unwrap(), OutputFormat::Lines);
    }
}
