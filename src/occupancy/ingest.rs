use crate::error::Result;
use crate::occupancy::index::OccupancyIndex;
use crate::page::{Page, PageSource, Row, Table, cell_text};
use crate::room::CellExtractor;
use crate::time::{Day, slot_numbers};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Decides which day a table row belongs to, if any.
pub trait RowKey {
    fn day(&self, row: &Row) -> Option<Day>;
}

impl<F> RowKey for F
where
    F: Fn(&Row) -> Option<Day>,
{
    fn day(&self, row: &Row) -> Option<Day> {
        self(row)
    }
}

/// First cell must be exactly `Mo`, `Tu`, `We`, `Th` or `Fr` after trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictDay;

impl RowKey for StrictDay {
    fn day(&self, row: &Row) -> Option<Day> {
        Day::from_code(cell_text(row.first()).trim())
    }
}

/// First cell may be any casing of the code, the short name or the full name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientDay;

impl RowKey for LenientDay {
    fn day(&self, row: &Row) -> Option<Day> {
        Day::from_label(cell_text(row.first()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub pages: usize,
    pub pages_without_table: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub occupied_cells: usize,
}

impl IngestStats {
    fn absorb(&mut self, other: IngestStats) {
        self.pages += other.pages;
        self.pages_without_table += other.pages_without_table;
        self.rows_used += other.rows_used;
        self.rows_skipped += other.rows_skipped;
        self.occupied_cells += other.occupied_cells;
    }
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s), {} without a table, {} day row(s) used, {} row(s) skipped, {} occupied cell(s)",
            self.pages, self.pages_without_table, self.rows_used, self.rows_skipped, self.occupied_cells
        )
    }
}

pub struct Ingestion {
    pub index: OccupancyIndex,
    pub stats: IngestStats,
}

pub struct Ingestor {
    extractor: CellExtractor,
    row_key: Box<dyn RowKey>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Ingestor::new()
    }
}

impl Ingestor {
    pub fn new() -> Ingestor {
        Ingestor {
            extractor: CellExtractor::standard(),
            row_key: Box::new(StrictDay),
        }
    }

    pub fn with_row_key(mut self, row_key: impl RowKey + 'static) -> Ingestor {
        self.row_key = Box::new(row_key);
        self
    }

    pub fn with_extractor(mut self, extractor: CellExtractor) -> Ingestor {
        self.extractor = extractor;
        self
    }

    /// Reads the data rows of one timetable into a fresh partial index.
    pub fn ingest_table(&self, table: &Table) -> Ingestion {
        let mut index = OccupancyIndex::new();
        let mut stats = IngestStats::default();

        for (row_idx, row) in table.iter().enumerate().skip(1) {
            if row.len() < 2 {
                stats.rows_skipped += 1;
                continue;
            }
            let Some(day) = self.row_key.day(row) else {
                debug!(row = row_idx, label = cell_text(row.first()), "skipping row without a day label");
                stats.rows_skipped += 1;
                continue;
            };
            stats.rows_used += 1;

            for slot in slot_numbers() {
                let Some(cell) = row.get(slot as usize) else {
                    continue;
                };
                let reading = self.extractor.read(cell_text(Some(cell)));
                if let Some(room) = reading.room {
                    // slot_numbers() only yields valid slots
                    if index.record(day, slot, room, reading.section).is_ok() {
                        stats.occupied_cells += 1;
                    }
                }
            }
        }
        Ingestion { index, stats }
    }

    pub fn ingest_page(&self, page: &Page) -> Ingestion {
        let Some(table) = page.timetable() else {
            warn!(page = ?page.number, "no table on page, skipping");
            return Ingestion {
                index: OccupancyIndex::new(),
                stats: IngestStats {
                    pages: 1,
                    pages_without_table: 1,
                    ..IngestStats::default()
                },
            };
        };
        let mut ingestion = self.ingest_table(table);
        ingestion.stats.pages = 1;
        debug!(page = ?page.number, rooms = ingestion.index.all_rooms().len(), "page ingested");
        ingestion
    }

    /// Folds every page into one index. Pages are independent, so their order does not matter.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn ingest(&self, pages: &[Page]) -> Ingestion {
        let mut index = OccupancyIndex::new();
        let mut stats = IngestStats::default();
        for page in pages {
            let partial = self.ingest_page(page);
            index.merge(partial.index);
            stats.absorb(partial.stats);
        }
        info!(rooms = index.all_rooms().len(), %stats, "ingestion complete");
        Ingestion { index, stats }
    }

    /// Builds a complete new index from `source`. Nothing is returned on failure,
    /// so a caller holding an older index keeps it untouched.
    pub fn rebuild(&self, source: &dyn PageSource) -> Result<Ingestion> {
        info!(source = %source.describe(), "reading timetable pages");
        let pages = source.pages()?;
        Ok(self.ingest(&pages))
    }
}
