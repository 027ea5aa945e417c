pub const ENTRIES_TABLE: &str = "linkdatamodel";
pub const COMPACTED_TAGS_TABLE: &str = "entrycompactedtags";
pub const USER_TAGS_TABLE: &str = "usertags";
pub const SOCIAL_DATA_TABLE: &str = "socialdata";
pub const SOURCES_TABLE: &str = "sourcedatamodel";

/// Tables emptied when an archive is filtered down for viewing.
pub const FILTER_TRUNCATE_TABLES: &[&str] = &[
    "userentrytransitionhistory",
    "userentryvisithistory",
    "usersearchhistory",
    "uservotes",
    "usercompactedtags",
    "usercomments",
    "userbookmarks",
    "user",
    "userconfig",
    "sourcedatamodel",
    "sourcecategories",
    "sourcesubcategories",
    "readlater",
    "modelfiles",
    "gateway",
    "entryrules",
    "domains",
    "dataexport",
    "configurationentry",
    "compactedtags",
    "blockentrylist",
];

/// Tables emptied when a fresh feed export database is prepared.
pub const EXPORT_TRUNCATE_TABLES: &[&str] = &[
    "credentials",
    "sourcecategories",
    "sourcesubcategories",
    "sourcedatamodel",
    "userconfig",
    "configurationentry",
    "linkdatamodel",
    "domains",
    "usertags",
    "compactedtags",
    "usercompactedtags",
    "entrycompactedtags",
    "uservotes",
    "browser",
    "entryrules",
    "dataexport",
    "gateway",
    "modelfiles",
    "readlater",
    "searchview",
    "socialdata",
    "blockentrylist",
    "usercomments",
    "userbookmarks",
    "usersearchhistory",
    "userentrytransitionhistory",
    "userentryvisithistory",
    "user",
];

pub const SCHEMA: &str = r#"
-- entries
CREATE TABLE IF NOT EXISTS linkdatamodel (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link TEXT NOT NULL,
    title TEXT,
    description TEXT,
    author TEXT,
    album TEXT,
    thumbnail TEXT,
    language TEXT,
    source_url TEXT NOT NULL,
    source_id INTEGER REFERENCES sourcedatamodel(id),
    permanent INTEGER NOT NULL,
    bookmarked INTEGER NOT NULL,
    status_code INTEGER NOT NULL,
    manual_status_code INTEGER,
    contents_type INTEGER NOT NULL,
    page_rating_contents INTEGER NOT NULL,
    page_rating_visits INTEGER NOT NULL,
    page_rating_votes INTEGER NOT NULL,
    page_rating INTEGER NOT NULL,
    date_created TEXT,
    date_published TEXT,
    date_update_last TEXT,
    date_dead_since TEXT,
    date_last_modified TEXT,
    age INTEGER
);

CREATE INDEX IF NOT EXISTS idx_linkdatamodel_link ON linkdatamodel(link);
CREATE INDEX IF NOT EXISTS idx_linkdatamodel_votes ON linkdatamodel(page_rating_votes DESC);

-- tags
CREATE TABLE IF NOT EXISTS entrycompactedtags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES linkdatamodel(id),
    tag TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entrycompactedtags_entry_id ON entrycompactedtags(entry_id);

CREATE TABLE IF NOT EXISTS usertags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES linkdatamodel(id),
    tag TEXT NOT NULL,
    user_id INTEGER,
    date TEXT
);

CREATE INDEX IF NOT EXISTS idx_usertags_entry_id ON usertags(entry_id);

CREATE TABLE IF NOT EXISTS compactedtags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS usercompactedtags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    user_id INTEGER
);

-- social data
CREATE TABLE IF NOT EXISTS socialdata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL UNIQUE REFERENCES linkdatamodel(id),
    thumbs_up INTEGER,
    thumbs_down INTEGER,
    view_count INTEGER,
    rating REAL,
    upvote_ratio REAL,
    upvote_diff INTEGER,
    upvote_view_ratio REAL,
    stars INTEGER,
    followers_count INTEGER,
    date_updated TEXT
);

-- sources
CREATE TABLE IF NOT EXISTS sourcedatamodel (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    enabled INTEGER NOT NULL DEFAULT 1,
    source_type TEXT NOT NULL DEFAULT '',
    category_name TEXT NOT NULL DEFAULT '',
    subcategory_name TEXT NOT NULL DEFAULT '',
    export_to_cms INTEGER NOT NULL DEFAULT 0,
    remove_after_days INTEGER NOT NULL DEFAULT 0,
    language TEXT NOT NULL DEFAULT '',
    age INTEGER NOT NULL DEFAULT 0,
    fetch_period INTEGER NOT NULL DEFAULT 900,
    auto_tag TEXT NOT NULL DEFAULT '',
    entries_backgroundcolor_alpha REAL NOT NULL DEFAULT 1.0,
    entries_backgroundcolor TEXT NOT NULL DEFAULT '',
    entries_alpha REAL NOT NULL DEFAULT 1.0,
    proxy_location TEXT NOT NULL DEFAULT '',
    auto_update_favicon INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sourcedatamodel_url ON sourcedatamodel(url);

CREATE TABLE IF NOT EXISTS sourcecategories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sourcesubcategories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER REFERENCES sourcecategories(id),
    name TEXT NOT NULL
);

-- users and their history
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS userconfig (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER,
    settings TEXT
);

CREATE TABLE IF NOT EXISTS uservotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER,
    user_id INTEGER,
    vote INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS usercomments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER,
    user_id INTEGER,
    comment TEXT
);

CREATE TABLE IF NOT EXISTS userbookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER,
    user_id INTEGER
);

CREATE TABLE IF NOT EXISTS usersearchhistory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    search_query TEXT,
    user_id INTEGER,
    date TEXT
);

CREATE TABLE IF NOT EXISTS userentrytransitionhistory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_from_id INTEGER,
    entry_to_id INTEGER,
    user_id INTEGER,
    counter INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS userentryvisithistory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER,
    user_id INTEGER,
    visits INTEGER NOT NULL DEFAULT 0,
    date_last_visit TEXT
);

CREATE TABLE IF NOT EXISTS readlater (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER,
    user_id INTEGER
);

-- configuration and bookkeeping
CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    secret TEXT
);

CREATE TABLE IF NOT EXISTS configurationentry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    instance_title TEXT
);

CREATE TABLE IF NOT EXISTS browser (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    crawler TEXT,
    settings TEXT
);

CREATE TABLE IF NOT EXISTS entryrules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rule_name TEXT,
    rule_url TEXT
);

CREATE TABLE IF NOT EXISTS dataexport (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    export_type TEXT,
    local_path TEXT
);

CREATE TABLE IF NOT EXISTS gateway (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link TEXT,
    title TEXT
);

CREATE TABLE IF NOT EXISTS modelfiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name TEXT,
    contents BLOB
);

CREATE TABLE IF NOT EXISTS domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT
);

CREATE TABLE IF NOT EXISTS searchview (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    filter_statement TEXT
);

CREATE TABLE IF NOT EXISTS blockentrylist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT
);
"#;
