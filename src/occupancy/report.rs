use crate::error::{Error, Result};
use crate::occupancy::index::{Occupancy, OccupancyIndex};
use crate::room::RoomCode;
use crate::time::{ClockTime, Day, SlotNumber, TIME_SLOTS, TimeSlot, slot_at, time_slot};
use chrono::{Datelike, Local, NaiveDateTime};
use colored::Colorize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Where a point in time falls on the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Weekend,
    OutsideHours { day: Day, time: ClockTime },
    InSlot { day: Day, slot: &'static TimeSlot },
}

impl Moment {
    /// `day` is `None` on Saturday and Sunday.
    pub fn resolve(day: Option<Day>, time: ClockTime) -> Moment {
        match day {
            None => Moment::Weekend,
            Some(day) => match slot_at(time) {
                Some(slot) => Moment::InSlot { day, slot },
                None => Moment::OutsideHours { day, time },
            },
        }
    }

    pub fn at(at: NaiveDateTime) -> Moment {
        Moment::resolve(Day::from_weekday(at.weekday()), ClockTime::from(at.time()))
    }

    pub fn now() -> Moment {
        Moment::at(Local::now().naive_local())
    }
}

impl OccupancyIndex {
    /// Outside teaching hours every known room counts as vacant.
    pub fn vacant_rooms_at(&self, moment: &Moment) -> Vec<RoomCode> {
        match moment {
            Moment::InSlot { day, slot } => self
                .vacant_rooms(*day, slot.number)
                .unwrap_or_else(|_| self.all_rooms().iter().cloned().collect()),
            Moment::Weekend | Moment::OutsideHours { .. } => {
                self.all_rooms().iter().cloned().collect()
            }
        }
    }

    pub fn vacant_rooms_now(&self) -> Vec<RoomCode> {
        self.vacant_rooms_at(&Moment::now())
    }
}

pub struct VacancyReport {
    pub day: Day,
    pub slot: &'static TimeSlot,
    pub total: usize,
    pub occupied: Vec<RoomCode>,
    pub vacant: Vec<RoomCode>,
}

impl VacancyReport {
    pub fn build(index: &OccupancyIndex, day: Day, slot: SlotNumber) -> Result<VacancyReport> {
        let slot = time_slot(slot)?;
        let occupied = index.occupied_rooms(day, slot.number)?;
        Ok(VacancyReport {
            day,
            slot,
            total: index.all_rooms().len(),
            occupied: occupied.iter().cloned().collect(),
            vacant: index.vacant_rooms(day, slot.number)?,
        })
    }
}

impl fmt::Display for VacancyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "VACANT ROOMS REPORT".bold())?;
        writeln!(f, "Day: {} ({})", self.day.name(), self.day.code())?;
        writeln!(f, "Time slot: {}", self.slot)?;
        writeln!(
            f,
            "Total rooms: {}   {}   {}",
            self.total,
            format!("Occupied: {}", self.occupied.len()).red(),
            format!("Vacant: {}", self.vacant.len()).green()
        )?;
        if self.vacant.is_empty() {
            writeln!(f, "\nNo vacant rooms in this slot.")?;
        } else {
            writeln!(f, "\nVacant rooms:\n{}", room_grid(&self.vacant))?;
        }
        if !self.occupied.is_empty() {
            writeln!(f, "\nOccupied rooms:\n{}", room_grid(&self.occupied))?;
        }
        Ok(())
    }
}

pub enum NowReport {
    AllVacant { reason: &'static str, rooms: Vec<RoomCode> },
    Slot(VacancyReport),
}

impl NowReport {
    pub fn build(index: &OccupancyIndex, moment: &Moment) -> Result<NowReport> {
        let reason = match moment {
            Moment::InSlot { day, slot } => {
                return VacancyReport::build(index, *day, slot.number).map(NowReport::Slot);
            }
            Moment::Weekend => "It's the weekend, every room is vacant.",
            Moment::OutsideHours { .. } => "Outside class hours, every room is vacant.",
        };
        Ok(NowReport::AllVacant {
            reason,
            rooms: index.vacant_rooms_at(moment),
        })
    }
}

impl fmt::Display for NowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NowReport::Slot(report) => write!(f, "{}", report),
            NowReport::AllVacant { reason, rooms } => {
                writeln!(f, "{}", reason.yellow())?;
                writeln!(f, "Total rooms: {}", rooms.len())?;
                if !rooms.is_empty() {
                    writeln!(f, "\nVacant rooms:\n{}", room_grid(rooms))?;
                }
                Ok(())
            }
        }
    }
}

/// Rooms laid out five to a row.
pub fn room_grid(rooms: &[RoomCode]) -> String {
    let mut builder = Builder::default();
    for chunk in rooms.chunks(5) {
        builder.push_record(chunk.iter().map(|r| r.to_string()));
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

/// Day-by-slot grid for one room, or `None` if the room was never seen.
pub fn room_schedule(index: &OccupancyIndex, room: &str) -> Option<String> {
    let schedule = index.room_occupancy(room);
    if schedule.is_empty() {
        return None;
    }

    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once("Day".to_string())
            .chain(TIME_SLOTS.iter().map(|s| format!("{}\n{}-{}", s.number, s.start, s.end))),
    );
    for (day, slots) in &schedule {
        let cells = slots.iter().map(|(slot, status)| match status {
            Occupancy::Vacant => status.to_string().green().to_string(),
            Occupancy::Occupied => {
                let sections = index.sections(*day, *slot, room);
                let label = if sections.is_empty() {
                    status.to_string()
                } else {
                    format!("{}\n{}", status, sections.join("\n"))
                };
                label.red().to_string()
            }
        });
        builder.push_record(std::iter::once(day.code().to_string()).chain(cells));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    Some(table.to_string())
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    number: SlotNumber,
    #[tabled(rename = "Start")]
    start: ClockTime,
    #[tabled(rename = "End")]
    end: ClockTime,
}

pub fn slot_table() -> String {
    let rows = TIME_SLOTS.iter().map(|s| SlotRow {
        number: s.number,
        start: s.start,
        end: s.end,
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn write_export(index: &OccupancyIndex, path: &Path) -> Result<()> {
    let export_error = |source| Error::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(export_error)?);
    serde_json::to_writer_pretty(&mut writer, &index.export())
        .map_err(|e| export_error(e.into()))?;
    writer.flush().map_err(export_error)
}
