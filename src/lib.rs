//! Room vacancy lookup over timetables extracted from a section-wise or
//! room-wise timetable document.
//!
//! Pages come in through a [`page::PageSource`], are folded into an
//! [`occupancy::index::OccupancyIndex`] by an [`occupancy::ingest::Ingestor`],
//! and queried directly or through [`occupancy::report`].

pub mod error;
pub mod occupancy;
pub mod page;
pub mod room;
pub mod time;
