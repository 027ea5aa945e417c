mod common;

use common::{create_archive, entry_count, entry_links, record};
use link_archive_tools::db::{open_database, EntryTable, SocialDataTable, TagTable};
use link_archive_tools::tools::DbMerge;
use link_archive_tools::AppError;
use serde_json::json;

#[test]
fn disjoint_archives_sum_their_entries() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_archive(dir.path(), "a.db", &[("https://a1.com", 1), ("https://a2.com", 4)]);
    let b = create_archive(
        dir.path(),
        "b.db",
        &[("https://b1.com", 2), ("https://b2.com", 3), ("https://b3.com", 9)],
    );
    let output = dir.path().join("merged.db");

    let report = DbMerge::new(vec![a, b], output.clone()).unwrap().convert().unwrap();

    assert_eq!(entry_count(&output), 5);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.copied, 2 + 3 - entry_count(&report.base) as usize);
}

#[test]
fn identical_archives_keep_one_side() {
    let dir = tempfile::tempdir().unwrap();
    let links = [("https://same1.com", 1), ("https://same2.com", 2)];
    let a = create_archive(dir.path(), "a.db", &links);
    let b = create_archive(dir.path(), "b.db", &links);
    let output = dir.path().join("merged.db");

    let report = DbMerge::new(vec![a, b], output.clone()).unwrap().convert().unwrap();

    assert_eq!(entry_count(&output), 2);
    assert_eq!(report.copied, 0);
    assert_eq!(report.skipped, 2);
}

#[test]
fn only_good_entries_are_merged_with_their_tags() {
    let dir = tempfile::tempdir().unwrap();
    // Larger archive becomes the base.
    let names: Vec<String> = (0..200).map(|i| format!("https://big{}.com", i)).collect();
    let big_links: Vec<(&str, i64)> = names.iter().map(|n| (n.as_str(), 1)).collect();
    let big = create_archive(dir.path(), "big.db", &big_links);
    let small = create_archive(
        dir.path(),
        "small.db",
        &[("https://good.com", 3), ("https://meh.com", 0)],
    );
    {
        let conn = open_database(&small).unwrap();
        let id = EntryTable::open(&conn)
            .unwrap()
            .table()
            .get_where(&Default::default())
            .unwrap()
            .into_iter()
            .find(|r| r["link"] == json!("https://good.com"))
            .and_then(|r| r["id"].as_i64())
            .unwrap();
        TagTable::compacted(&conn).unwrap().insert(id, "keeper").unwrap();
        SocialDataTable::open(&conn)
            .unwrap()
            .insert_json(&record(json!({"entry_id": id, "view_count": 100})))
            .unwrap();
    }
    let output = dir.path().join("merged.db");

    let report = DbMerge::new(vec![small, big.clone()], output.clone())
        .unwrap()
        .convert()
        .unwrap();
    assert_eq!(report.base, big);
    assert_eq!(report.copied, 1);

    let links = entry_links(&output);
    assert!(links.contains(&"https://good.com".to_string()));
    assert!(!links.contains(&"https://meh.com".to_string()));

    let conn = open_database(&output).unwrap();
    let entries = EntryTable::open(&conn).unwrap();
    let new_id = (1..=entries.count().unwrap() as i64)
        .find(|id| {
            entries
                .get(*id)
                .unwrap()
                .is_some_and(|e| e.link == "https://good.com")
        })
        .unwrap();
    assert_eq!(TagTable::compacted(&conn).unwrap().tags(new_id).unwrap(), vec!["keeper"]);
    assert_eq!(
        SocialDataTable::open(&conn).unwrap().get(new_id).unwrap().unwrap().view_count,
        Some(100)
    );
}

#[test]
fn single_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_archive(dir.path(), "a.db", &[]);
    let err = DbMerge::new(vec![a], dir.path().join("out.db")).err().unwrap();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn output_aliasing_an_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = create_archive(dir.path(), "a.db", &[("https://a.com", 1)]);
    let b = create_archive(dir.path(), "b.db", &[("https://b.com", 1)]);
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let err = DbMerge::new(vec![a.clone(), b], dir.path().join("sub").join("..").join("a.db"))
        .err()
        .unwrap();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(entry_links(&a), vec!["https://a.com"]);
}
