use crate::occupancy::index::OccupancyIndex;
use crate::page::{Page, Row, Table};
use crate::room::RoomCode;
use crate::time::{Day, SlotNumber};
use proptest::prelude::{Strategy, prop};
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::sync::Arc;

pub fn room(s: &str) -> RoomCode {
    Arc::from(s)
}

pub fn rooms(codes: &[&str]) -> Vec<RoomCode> {
    codes.iter().map(|c| room(c)).collect()
}

/// Empty strings become `None` cells.
pub fn row(day: &str, cells: &[&str]) -> Row {
    std::iter::once(day)
        .chain(cells.iter().copied())
        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
        .collect()
}

pub fn header() -> Row {
    row(
        "",
        &["09:30", "10:20", "11:20", "12:10", "13:05", "13:55", "14:45", "15:35"],
    )
}

pub fn table(rows: Vec<Row>) -> Table {
    std::iter::once(header()).chain(rows).collect()
}

pub fn page(rows: Vec<Row>) -> Page {
    Page::new(vec![table(rows)])
}

pub fn index_with(entries: &[(Day, SlotNumber, &str)], extra_rooms: &[&str]) -> OccupancyIndex {
    let mut index = OccupancyIndex::new();
    for (day, slot, code) in entries {
        index.record(*day, *slot, room(code), None).unwrap();
    }
    for code in extra_rooms {
        index.add_room(room(code));
    }
    index
}

pub fn arb_day() -> impl Strategy<Value = Day> {
    prop_oneof![
        Just(Day::Monday),
        Just(Day::Tuesday),
        Just(Day::Wednesday),
        Just(Day::Thursday),
        Just(Day::Friday),
    ]
}

pub fn arb_cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("None".to_string())),
        Just(Some("23BCS_F\nS-606".to_string())),
        Just(Some("23BCS_K\nRG-1".to_string())),
        Just(Some("23AML_A\n104".to_string())),
        Just(Some("SS-101".to_string())),
        Just(Some("L-307".to_string())),
        Just(Some("2024".to_string())),
        Just(Some("Lunch".to_string())),
    ]
}

pub fn arb_day_label() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => arb_day().prop_map(|d| Some(d.code().to_string())),
        1 => Just(Some("Total".to_string())),
        1 => Just(None),
    ]
}

pub fn arb_row() -> impl Strategy<Value = Row> {
    (arb_day_label(), prop::collection::vec(arb_cell(), 0..10)).prop_map(|(label, cells)| {
        std::iter::once(label).chain(cells).collect()
    })
}

pub fn arb_page() -> impl Strategy<Value = Page> {
    prop_oneof![
        6 => prop::collection::vec(arb_row(), 0..6).prop_map(page),
        1 => Just(Page::new(vec![])),
    ]
}
