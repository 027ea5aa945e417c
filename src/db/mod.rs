mod connection;
pub mod copier;
pub mod repository;
pub mod schema;
pub mod table;

pub use connection::{
    copy_database, create_database, delete_orphans, ensure_distinct, init_schema, open_database,
    same_file, summarize, table_names, truncate_tables, vacuum, TableSummary,
};
pub use copier::EntryCopier;
pub use repository::{EntryTable, SocialDataTable, SourceTable, TagTable};
pub use table::{
    Column, Combinator, Direction, Filter, GenericTable, Op, OrderBy, Predicate, Query, Record,
};
