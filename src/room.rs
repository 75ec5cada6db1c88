use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

pub type RoomCode = Arc<str>;
pub type SectionLabel = Arc<str>;

/// What the table extractor writes into cells it found empty.
pub const PLACEHOLDER: &str = "None";

/// Years (`2024`, `1999`) and staff/student IDs (`E12345`) that a room
/// pattern can pick up by accident. A legitimately numbered room that looks
/// like one of these is dropped as well.
static YEAR_OR_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(18|19|20)\d{2,3}|[Ee]\d{4,5}").expect("valid year/id pattern"));

static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}[A-Z]+_[A-Z])").expect("valid section pattern"));

static STANDARD_RULES: Lazy<Vec<RoomRule>> = Lazy::new(|| {
    [
        // SS-101, RG-1, OT-801
        ("block-code", r"\b([A-Z]{2,3}-\d+)\b"),
        // S-606, L-307
        ("wing-code", r"\b([A-Z]-\d{3,4})\b"),
        // 104, but not the 104 in 23104
        ("bare-number", r"(?:^|\D)(\d{3})(?:\D|$)"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        RoomRule::new(name, pattern, not_year_or_id).expect("valid room pattern")
    })
    .collect()
});

pub fn not_year_or_id(candidate: &str) -> bool {
    !YEAR_OR_ID.is_match(candidate)
}

/// A room-code convention: the first capture group of `pattern` is the code,
/// kept only if `validate` accepts it.
#[derive(Clone, Debug)]
pub struct RoomRule {
    pub name: &'static str,
    pattern: Regex,
    validate: fn(&str) -> bool,
}

impl RoomRule {
    pub fn new(
        name: &'static str,
        pattern: &str,
        validate: fn(&str) -> bool,
    ) -> Result<RoomRule, regex::Error> {
        Ok(RoomRule {
            name,
            pattern: Regex::new(pattern)?,
            validate,
        })
    }

    /// Only the leftmost match is considered; a rejected match does not retry further along the text.
    fn apply<'t>(&self, text: &'t str) -> Option<&'t str> {
        let candidate = self.pattern.captures(text)?.get(1)?.as_str();
        (self.validate)(candidate).then_some(candidate)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellReading {
    pub room: Option<RoomCode>,
    pub section: Option<SectionLabel>,
}

/// Ordered room-code rules, first match wins.
///
/// This is a heuristic: a three digit number that belongs to a subject code
/// will be read as a room, and a room numbered like a year is never found.
#[derive(Clone, Debug)]
pub struct CellExtractor {
    rules: Vec<RoomRule>,
}

impl Default for CellExtractor {
    fn default() -> Self {
        CellExtractor::standard()
    }
}

impl CellExtractor {
    pub fn standard() -> CellExtractor {
        CellExtractor {
            rules: STANDARD_RULES.clone(),
        }
    }

    pub fn empty() -> CellExtractor {
        CellExtractor { rules: vec![] }
    }

    /// Adds `rule` with the lowest priority.
    pub fn with_rule(mut self, rule: RoomRule) -> CellExtractor {
        self.rules.push(rule);
        self
    }

    /// Adds `rule` ahead of every existing one.
    pub fn with_priority_rule(mut self, rule: RoomRule) -> CellExtractor {
        self.rules.insert(0, rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn room(&self, cell: &str) -> Option<RoomCode> {
        if is_blank(cell) {
            return None;
        }
        self.rules
            .iter()
            .find_map(|rule| rule.apply(cell))
            .map(RoomCode::from)
    }

    pub fn read(&self, cell: &str) -> CellReading {
        match self.room(cell) {
            Some(room) => CellReading {
                room: Some(room),
                section: section(cell),
            },
            None => CellReading::default(),
        }
    }
}

pub fn is_blank(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER
}

/// Class/section token such as `23BCS_F`.
pub fn section(cell: &str) -> Option<SectionLabel> {
    SECTION
        .captures(cell)
        .and_then(|c| c.get(1))
        .map(|m| SectionLabel::from(m.as_str()))
}
