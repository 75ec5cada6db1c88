use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A table cell as the extractor hands it over; `None` for cells it left empty.
pub type Cell = Option<String>;
pub type Row = Vec<Cell>;
/// Row 0 is the header, data rows follow.
pub type Table = Vec<Row>;

pub fn cell_text(cell: Option<&Cell>) -> &str {
    cell.and_then(|c| c.as_deref()).unwrap_or("")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub number: Option<usize>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Page {
    pub fn new(tables: Vec<Table>) -> Page {
        Page {
            number: None,
            tables,
        }
    }

    /// Only the first table on a page is a timetable.
    pub fn timetable(&self) -> Option<&Table> {
        self.tables.first()
    }
}

/// Anything that yields the extracted pages of a timetable document.
pub trait PageSource {
    fn describe(&self) -> String;

    fn pages(&self) -> Result<Vec<Page>>;
}

impl PageSource for Vec<Page> {
    fn describe(&self) -> String {
        format!("{} in-memory page(s)", self.len())
    }

    fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.clone())
    }
}

/// A JSON dump of extracted tables, either `{"pages": [...]}` or a bare page array.
#[derive(Debug, Clone)]
pub struct JsonPageSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageDump {
    Wrapped { pages: Vec<Page> },
    Bare(Vec<Page>),
}

impl JsonPageSource {
    pub fn new(path: impl AsRef<Path>) -> JsonPageSource {
        JsonPageSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PageSource for JsonPageSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn pages(&self) -> Result<Vec<Page>> {
        let file = File::open(&self.path).map_err(|source| Error::SourceUnavailable {
            path: self.path.clone(),
            source,
        })?;
        let dump: PageDump =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                Error::MalformedSource {
                    path: self.path.clone(),
                    source,
                }
            })?;

        let mut pages = match dump {
            PageDump::Wrapped { pages } => pages,
            PageDump::Bare(pages) => pages,
        };
        for (idx, page) in pages.iter_mut().enumerate() {
            page.number.get_or_insert(idx + 1);
        }
        Ok(pages)
    }
}
