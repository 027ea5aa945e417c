mod common;

use std::fs;

use common::{create_archive, record};
use link_archive_tools::db::{open_database, EntryTable, SocialDataTable, TagTable};
use link_archive_tools::tools::JsonExporter;
use serde_json::{json, Value};

fn read_rows(path: &std::path::Path) -> Vec<Value> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn chunks_by_rows_max() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..5).map(|i| format!("https://site{}.com", i)).collect();
    let links: Vec<(&str, i64)> = names.iter().map(|n| (n.as_str(), 1)).collect();
    let input = create_archive(dir.path(), "in.db", &links);
    let output = dir.path().join("json");

    let report = JsonExporter::new(input, output.clone(), "entries".into(), 2)
        .unwrap()
        .convert()
        .unwrap();

    assert_eq!(report.rows, 5);
    assert_eq!(
        report.files,
        vec![
            output.join("entries_0.json"),
            output.join("entries_1.json"),
            output.join("entries_2.json"),
        ]
    );
    assert_eq!(read_rows(&report.files[0]).len(), 2);
    assert_eq!(read_rows(&report.files[2]).len(), 1);
    assert_eq!(read_rows(&report.files[2])[0]["link"], json!("https://site4.com"));
}

#[test]
fn exact_multiple_leaves_no_empty_file_and_stale_chunks_go() {
    let dir = tempfile::tempdir().unwrap();
    let input = create_archive(dir.path(), "in.db", &[("https://a.com", 1), ("https://b.com", 2)]);
    let output = dir.path().join("json");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("entries_7.json"), "[]").unwrap();
    fs::write(output.join("notes.txt"), "keep").unwrap();

    let report = JsonExporter::new(input, output.clone(), "entries".into(), 2)
        .unwrap()
        .convert()
        .unwrap();

    assert_eq!(report.files, vec![output.join("entries_0.json")]);
    assert!(!output.join("entries_1.json").exists());
    assert!(!output.join("entries_7.json").exists());
    assert!(output.join("notes.txt").exists());
}

#[test]
fn rows_carry_social_counters_tags_and_rfc3339_dates() {
    let dir = tempfile::tempdir().unwrap();
    let input = create_archive(dir.path(), "in.db", &[]);
    {
        let conn = open_database(&input).unwrap();
        let id = EntryTable::open(&conn)
            .unwrap()
            .insert_json(record(json!({
                "link": "https://a.com",
                "bookmarked": true,
                "date_published": "2024-03-01 10:20:30"
            })))
            .unwrap()
            .unwrap();
        SocialDataTable::open(&conn)
            .unwrap()
            .insert_json(&record(json!({"entry_id": id, "stars": 12})))
            .unwrap();
        TagTable::user(&conn).unwrap().insert(id, "rust").unwrap();
    }

    let output = dir.path().join("json");
    let report = JsonExporter::new(input, output, "links".into(), 100)
        .unwrap()
        .convert()
        .unwrap();

    let rows = read_rows(&report.files[0]);
    let row = &rows[0];
    assert_eq!(row["link"], json!("https://a.com"));
    assert_eq!(row["bookmarked"], json!(true));
    assert_eq!(row["date_published"], json!("2024-03-01T10:20:30+00:00"));
    assert_eq!(row["stars"], json!(12));
    assert_eq!(row["view_count"], Value::Null);
    assert_eq!(row["tags"], json!(["rust"]));
}
