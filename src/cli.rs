use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use link_archive_tools::tools::{DisplayOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "linkarchive", version)]
#[command(about = "Filter, merge, convert and search link archive databases", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy a database without history tables, optionally dropping entries
    Filter {
        /// Database to read
        #[arg(long, default_value = "places.db")]
        db: PathBuf,

        /// Database to create
        #[arg(long, default_value = "new.db")]
        output_db: PathBuf,

        /// Keep only bookmarked entries
        #[arg(long)]
        bookmarked: bool,

        /// Keep only entries with votes
        #[arg(long)]
        votes: bool,

        /// Drop entries that are neither bookmarked nor voted
        #[arg(long)]
        redundant: bool,
    },

    /// Merge databases into one, skipping links already present
    Merge {
        /// Input database; pass at least twice
        #[arg(long = "db", required = true)]
        inputs: Vec<PathBuf>,

        /// Database to create
        #[arg(long, default_value = "merged.db")]
        output_db: PathBuf,
    },

    /// List or store the RSS feeds of good entries
    Feeds {
        /// Database to read
        #[arg(long, default_value = "catalog.db")]
        db: PathBuf,

        /// Database to write feed entries into (implies SQLITE output)
        #[arg(long)]
        output_db: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
        output_format: OutputFormat,

        /// Recreate the output database instead of adding to it
        #[arg(long)]
        clean: bool,

        /// Read every feed to refresh its title and properties
        #[arg(long)]
        update_rss: bool,

        /// Read entry pages to find advertised feeds
        #[arg(long)]
        read_internet_links: bool,
    },

    /// Export entries as JSON files
    Db2json {
        /// Database to read
        #[arg(long, default_value = "places.db")]
        db: PathBuf,

        #[arg(long, default_value = "json")]
        output_dir: PathBuf,

        /// Entries per file (defaults to the configured value)
        #[arg(long)]
        rows_max: Option<usize>,

        /// File name prefix
        #[arg(short, long, default_value = "entries")]
        format: String,
    },

    /// Import JSON files into a database
    Json2db {
        /// JSON file to read
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// Directory scanned recursively for JSON files
        #[arg(long, conflicts_with = "input_file")]
        input_dir: Option<PathBuf>,

        #[arg(long, default_value = "converted.sqlite")]
        output_db: PathBuf,

        /// Keep ids from the files
        #[arg(long)]
        preserve_id: bool,

        /// Minimum entry votes (defaults to the configured value)
        #[arg(long)]
        vote_min: Option<i64>,
    },

    /// Print table summaries or search entries
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Database to read
    #[arg(long)]
    pub db: PathBuf,

    /// `column=pattern`, `column==value` or plain text; `*` is a wildcard
    #[arg(long)]
    pub search: Option<String>,

    /// Sort column (default page_rating_votes, or id when the table has none)
    #[arg(long)]
    pub order_by: Option<String>,

    /// Order ascending
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Order descending (default)
    #[arg(long)]
    pub desc: bool,

    #[arg(long, default_value = "linkdatamodel")]
    pub table: String,

    #[arg(long)]
    pub title: bool,

    #[arg(long)]
    pub description: bool,

    #[arg(long)]
    pub status: bool,

    #[arg(long)]
    pub tags: bool,

    #[arg(long)]
    pub social: bool,

    #[arg(long)]
    pub date_published: bool,

    #[arg(long)]
    pub source: bool,

    /// Print row counts of all tables instead of searching
    #[arg(long)]
    pub summary: bool,

    /// With --summary, also print column names
    #[arg(long)]
    pub columns: bool,

    #[arg(short, long)]
    pub ignore_case: bool,
}

impl AnalyzeArgs {
    pub fn display(&self) -> DisplayOptions {
        DisplayOptions {
            title: self.title,
            description: self.description,
            status: self.status,
            tags: self.tags,
            social: self.social,
            date_published: self.date_published,
            source: self.source,
        }
    }
}
