use crate::error::Error;
use crate::occupancy::ingest::{IngestStats, Ingestor, LenientDay};
use crate::occupancy::tests::utils::{page, room, rooms, row, table};
use crate::page::{JsonPageSource, Page, Row};
use crate::room::{CellExtractor, RoomRule};
use crate::time::Day;
use crate::time::Day::{Friday, Monday, Thursday, Tuesday, Wednesday};
use std::collections::BTreeSet;

fn week_page() -> Page {
    page(vec![
        row("Mo", &["", "", "23BCS_F\nS-606", "", "", "", "", ""]),
        row("Tu", &["23BCS_F\n104", "23BCS_F\n104", "", "", "", "", "", ""]),
        row("We", &["", "", "", "", "", "", "", ""]),
        row("Th", &["None", "", "", "", "", "", "", "23BCS_F\nRG-1"]),
        row("Fr", &["", "", "", "", "", "", "", ""]),
    ])
}

#[test]
fn test_week_scenario() {
    let ingestion = Ingestor::new().ingest(&[week_page()]);
    let index = ingestion.index;

    assert!(index.occupied_rooms(Monday, 3).unwrap().contains("S-606"));
    assert_eq!(
        index.all_rooms(),
        &BTreeSet::from([room("104"), room("RG-1"), room("S-606")])
    );
    assert_eq!(index.vacant_rooms(Monday, 3).unwrap(), rooms(&["104", "RG-1"]));
    assert!(index.occupied_rooms(Tuesday, 2).unwrap().contains("104"));
    assert!(index.occupied_rooms(Thursday, 8).unwrap().contains("RG-1"));
    assert!(index.occupied_rooms(Wednesday, 1).unwrap().is_empty());
    assert_eq!(index.sections(Monday, 3, "S-606"), rooms(&["23BCS_F"]));

    assert_eq!(
        ingestion.stats,
        IngestStats {
            pages: 1,
            pages_without_table: 0,
            rows_used: 5,
            rows_skipped: 0,
            occupied_cells: 4,
        }
    );
}

#[test]
fn test_two_rooms_scenario() {
    let index = Ingestor::new()
        .ingest(&[page(vec![
            row("Mo", &["", "", "23BCS_F\nS-606"]),
            row("Tu", &["104"]),
        ])])
        .index;

    assert_eq!(index.vacant_rooms(Monday, 3).unwrap(), rooms(&["104"]));
}

#[test]
fn test_header_row_is_never_data() {
    // a header that happens to start with a day label is still skipped
    let mut grid = table(vec![row("Tu", &["S-606"])]);
    grid[0] = row("Mo", &["RG-1"]);
    let index = Ingestor::new().ingest(&[Page::new(vec![grid])]).index;

    assert!(index.occupied_rooms(Monday, 1).unwrap().is_empty());
    assert!(!index.contains_room("RG-1"));
    assert!(index.contains_room("S-606"));
}

#[test]
fn test_non_day_rows_are_skipped() {
    let ingestion = Ingestor::new().ingest(&[page(vec![
        row("Total", &["S-606", "104"]),
        row("", &["S-606"]),
        row("Day", &["RG-1"]),
        vec![],
        vec![Some("Mo".to_string())],
        row("Fr", &["L-307"]),
    ])]);

    assert_eq!(ingestion.index.all_rooms(), &BTreeSet::from([room("L-307")]));
    assert_eq!(ingestion.stats.rows_used, 1);
    assert_eq!(ingestion.stats.rows_skipped, 5);
}

#[test]
fn test_short_and_long_rows() {
    let index = Ingestor::new()
        .ingest(&[page(vec![
            row("We", &["104", "105"]),
            row(
                "Th",
                &["", "", "", "", "", "", "", "RG-1", "SS-101", "SS-102"],
            ),
        ])])
        .index;

    assert!(index.occupied_rooms(Wednesday, 2).unwrap().contains("105"));
    assert!(index.occupied_rooms(Thursday, 8).unwrap().contains("RG-1"));
    // columns past slot 8 are ignored
    assert!(!index.contains_room("SS-101"));
    assert!(!index.contains_room("SS-102"));
}

#[test]
fn test_pages_without_table_are_skipped() {
    let ingestion = Ingestor::new().ingest(&[
        Page::new(vec![]),
        week_page(),
        Page::new(vec![vec![]]),
    ]);

    assert_eq!(ingestion.stats.pages, 3);
    assert_eq!(ingestion.stats.pages_without_table, 1);
    assert_eq!(ingestion.index.all_rooms().len(), 3);
}

#[test]
fn test_only_first_table_is_read() {
    let first = table(vec![row("Mo", &["104"])]);
    let second = table(vec![row("Mo", &["S-606"])]);
    let index = Ingestor::new().ingest(&[Page::new(vec![first, second])]).index;

    assert_eq!(index.all_rooms(), &BTreeSet::from([room("104")]));
}

#[test]
fn test_year_cells_are_vacant() {
    let index = Ingestor::new()
        .ingest(&[page(vec![row("Mo", &["2024", "Jan 2024", "23104"])])])
        .index;

    assert!(index.is_empty());
}

#[test]
fn test_pages_accumulate_across_sections() {
    let section_a = page(vec![row("Mo", &["23BCS_F\nS-606"])]);
    let section_b = page(vec![row("Mo", &["23BCS_K\nS-606", "23BCS_K\n104"])]);
    let index = Ingestor::new().ingest(&[section_a, section_b]).index;

    assert_eq!(index.sections(Monday, 1, "S-606"), rooms(&["23BCS_F", "23BCS_K"]));
    assert_eq!(index.vacant_rooms(Monday, 1).unwrap(), rooms(&["104"]));
    assert_eq!(index.vacant_rooms(Monday, 2).unwrap(), rooms(&["S-606"]));
}

#[test]
fn test_lenient_row_key() {
    let pages = [page(vec![
        row("Monday", &["104"]),
        row(" fri ", &["S-606"]),
        row("mo", &["RG-1"]),
    ])];

    let strict = Ingestor::new().ingest(&pages).index;
    assert!(strict.is_empty());

    let lenient = Ingestor::new().with_row_key(LenientDay).ingest(&pages).index;
    assert!(lenient.occupied_rooms(Monday, 1).unwrap().contains("104"));
    assert!(lenient.occupied_rooms(Monday, 1).unwrap().contains("RG-1"));
    assert!(lenient.occupied_rooms(Friday, 1).unwrap().contains("S-606"));
}

#[test]
fn test_closure_row_key() {
    // some exports prefix the day label
    let index = Ingestor::new()
        .with_row_key(|row: &Row| {
            row.first()
                .and_then(|c| c.as_deref())
                .and_then(|c| c.strip_prefix("Day "))
                .and_then(|c| c.parse::<Day>().ok())
        })
        .ingest(&[page(vec![row("Day Tu", &["104"])])])
        .index;

    assert!(index.occupied_rooms(Tuesday, 1).unwrap().contains("104"));
}

#[test]
fn test_custom_extractor() {
    let extractor = CellExtractor::standard()
        .with_priority_rule(RoomRule::new("lab", r"\b(LAB-[A-Z])\b", |_| true).unwrap());
    let index = Ingestor::new()
        .with_extractor(extractor)
        .ingest(&[page(vec![row("Mo", &["LAB-C 104"])])])
        .index;

    assert_eq!(index.all_rooms(), &BTreeSet::from([room("LAB-C")]));
}

#[test]
fn test_rebuild_from_in_memory_source() {
    let ingestion = Ingestor::new().rebuild(&vec![week_page()]).unwrap();
    assert_eq!(ingestion.index.all_rooms().len(), 3);
}

#[test]
fn test_rebuild_failure_leaves_previous_index() {
    let ingestor = Ingestor::new();
    let mut current = ingestor.ingest(&[week_page()]).index;
    let before = current.clone();

    match ingestor.rebuild(&JsonPageSource::new("/no/such/timetable.json")) {
        Ok(ingestion) => current = ingestion.index,
        Err(err) => assert!(matches!(err, Error::SourceUnavailable { .. })),
    }
    assert_eq!(current, before);
}
