use crate::error::{Error, Result};
use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

/// Wall-clock time of day, in minutes since midnight.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, PartialOrd, Hash)]
pub struct ClockTime(pub u16);

impl ClockTime {
    pub const fn hm(hours: u16, minutes: u16) -> ClockTime {
        ClockTime(hours * 60 + minutes)
    }

    pub fn hours(&self) -> u16 {
        self.0 / 60
    }

    pub fn minutes(&self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl FromStr for ClockTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M").map(ClockTime::from)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        ClockTime::hm(t.hour() as u16, t.minute() as u16)
    }
}

impl Sub<ClockTime> for ClockTime {
    type Output = u16;

    fn sub(self, rhs: ClockTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Teaching days. Weekends are not part of the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Mo")]
    Monday,
    #[serde(rename = "Tu")]
    Tuesday,
    #[serde(rename = "We")]
    Wednesday,
    #[serde(rename = "Th")]
    Thursday,
    #[serde(rename = "Fr")]
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// The two-letter label used in timetable rows.
    pub fn code(&self) -> &'static str {
        match self {
            Day::Monday => "Mo",
            Day::Tuesday => "Tu",
            Day::Wednesday => "We",
            Day::Thursday => "Th",
            Day::Friday => "Fr",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }

    /// Exact match on the two-letter code only.
    pub fn from_code(code: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Case-insensitive match on the code, the three-letter abbreviation or the full name.
    pub fn from_label(label: &str) -> Option<Day> {
        let label = label.trim().to_ascii_lowercase();
        if label.len() < 2 {
            return None;
        }
        Day::ALL.into_iter().find(|d| {
            let name = d.name().to_ascii_lowercase();
            label == name || label == name[..2] || label == name[..3]
        })
    }

    pub fn from_weekday(weekday: Weekday) -> Option<Day> {
        match weekday {
            Weekday::Mon => Some(Day::Monday),
            Weekday::Tue => Some(Day::Tuesday),
            Weekday::Wed => Some(Day::Wednesday),
            Weekday::Thu => Some(Day::Thursday),
            Weekday::Fri => Some(Day::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Day::from_label(s).ok_or_else(|| Error::InvalidDay(s.to_string()))
    }
}

pub type SlotNumber = u8;

/// One class period. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub number: SlotNumber,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    pub fn contains(&self, time: ClockTime) -> bool {
        self.start <= time && time < self.end
    }

    pub fn duration(&self) -> u16 {
        self.end - self.start
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.number, self.start, self.end)
    }
}

const fn slot(number: SlotNumber, start: ClockTime, end: ClockTime) -> TimeSlot {
    TimeSlot { number, start, end }
}

pub const SLOT_COUNT: usize = 8;

// 11:10-11:20 and 13:00-13:05 are breaks.
pub const TIME_SLOTS: [TimeSlot; SLOT_COUNT] = [
    slot(1, ClockTime::hm(9, 30), ClockTime::hm(10, 20)),
    slot(2, ClockTime::hm(10, 20), ClockTime::hm(11, 10)),
    slot(3, ClockTime::hm(11, 20), ClockTime::hm(12, 10)),
    slot(4, ClockTime::hm(12, 10), ClockTime::hm(13, 0)),
    slot(5, ClockTime::hm(13, 5), ClockTime::hm(13, 55)),
    slot(6, ClockTime::hm(13, 55), ClockTime::hm(14, 45)),
    slot(7, ClockTime::hm(14, 45), ClockTime::hm(15, 35)),
    slot(8, ClockTime::hm(15, 35), ClockTime::hm(16, 25)),
];

pub fn slot_numbers() -> impl Iterator<Item = SlotNumber> {
    TIME_SLOTS.iter().map(|s| s.number)
}

pub fn time_slot(number: SlotNumber) -> Result<&'static TimeSlot> {
    TIME_SLOTS
        .iter()
        .find(|s| s.number == number)
        .ok_or(Error::InvalidSlot(number))
}

/// Parses a user-typed slot number, keeping the original text on failure.
pub fn parse_slot(label: &str) -> Result<SlotNumber> {
    let label = label.trim();
    label
        .parse::<SlotNumber>()
        .ok()
        .and_then(|number| time_slot(number).ok())
        .map(|slot| slot.number)
        .ok_or_else(|| Error::InvalidSlotLabel(label.to_string()))
}

/// The slot running at `time`, or `None` before the first slot, after the last one or in a break.
pub fn slot_at(time: ClockTime) -> Option<&'static TimeSlot> {
    TIME_SLOTS.iter().find(|s| s.contains(time))
}
