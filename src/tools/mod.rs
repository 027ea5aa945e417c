pub mod analyze;
pub mod db2json;
pub mod feeds;
pub mod filter;
pub mod json2db;
pub mod merge;
pub mod search;

pub use analyze::{DbAnalyzer, DisplayOptions, SearchOptions};
pub use db2json::{JsonExportReport, JsonExporter};
pub use feeds::{FeedExportOptions, FeedExporter, FeedReport, OutputFormat};
pub use filter::{DbFilter, EntryFilter, FilterOptions, FilterReport};
pub use json2db::{collect_json_files, ImportOptions, ImportReport, JsonDocument, JsonImporter};
pub use merge::{DbMerge, MergeReport};
pub use search::SearchExpression;
