use crate::error::{Error, Result};
use crate::room::{RoomCode, SectionLabel};
use crate::time::{ClockTime, Day, SlotNumber, TIME_SLOTS, slot_numbers, time_slot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Occupancy {
    Occupied,
    Vacant,
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupancy::Occupied => write!(f, "OCCUPIED"),
            Occupancy::Vacant => write!(f, "VACANT"),
        }
    }
}

pub type RoomSchedule = BTreeMap<Day, BTreeMap<SlotNumber, Occupancy>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTimes {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Serializable snapshot of an index. Every list is sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub all_rooms: Vec<RoomCode>,
    pub time_slots: BTreeMap<SlotNumber, SlotTimes>,
    pub occupied: BTreeMap<Day, BTreeMap<SlotNumber, Vec<RoomCode>>>,
}

/// Day -> slot -> rooms with a class, plus every room ever seen.
///
/// Only grows while pages are ingested. A fresh ingestion builds a new index
/// instead of clearing this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyIndex {
    occupied: BTreeMap<Day, BTreeMap<SlotNumber, BTreeSet<RoomCode>>>,
    all_rooms: BTreeSet<RoomCode>,
    sections: BTreeMap<(Day, SlotNumber, RoomCode), BTreeSet<SectionLabel>>,
}

impl Default for OccupancyIndex {
    fn default() -> Self {
        OccupancyIndex::new()
    }
}

impl OccupancyIndex {
    pub fn new() -> OccupancyIndex {
        let occupied = Day::ALL
            .into_iter()
            .map(|day| (day, slot_numbers().map(|s| (s, BTreeSet::new())).collect()))
            .collect();
        OccupancyIndex {
            occupied,
            all_rooms: BTreeSet::new(),
            sections: BTreeMap::new(),
        }
    }

    pub fn all_rooms(&self) -> &BTreeSet<RoomCode> {
        &self.all_rooms
    }

    pub fn contains_room(&self, room: &str) -> bool {
        self.all_rooms.contains(room)
    }

    pub fn is_empty(&self) -> bool {
        self.all_rooms.is_empty()
    }

    /// Adds a room to the universe without marking it occupied anywhere.
    pub fn add_room(&mut self, room: RoomCode) {
        self.all_rooms.insert(room);
    }

    pub fn record(
        &mut self,
        day: Day,
        slot: SlotNumber,
        room: RoomCode,
        section: Option<SectionLabel>,
    ) -> Result<()> {
        let rooms = self.slot_mut(day, slot)?;
        rooms.insert(room.clone());
        if let Some(section) = section {
            self.sections
                .entry((day, slot, room.clone()))
                .or_default()
                .insert(section);
        }
        self.all_rooms.insert(room);
        Ok(())
    }

    fn slot_mut(&mut self, day: Day, slot: SlotNumber) -> Result<&mut BTreeSet<RoomCode>> {
        self.occupied
            .get_mut(&day)
            .and_then(|slots| slots.get_mut(&slot))
            .ok_or(Error::InvalidSlot(slot))
    }

    pub fn occupied_rooms(&self, day: Day, slot: SlotNumber) -> Result<&BTreeSet<RoomCode>> {
        self.occupied
            .get(&day)
            .and_then(|slots| slots.get(&slot))
            .ok_or(Error::InvalidSlot(slot))
    }

    pub fn vacant_rooms(&self, day: Day, slot: SlotNumber) -> Result<Vec<RoomCode>> {
        let occupied = self.occupied_rooms(day, slot)?;
        Ok(self.all_rooms.difference(occupied).cloned().collect())
    }

    /// Section labels seen for a room at a day/slot, empty when none were recorded.
    pub fn sections(&self, day: Day, slot: SlotNumber, room: &str) -> Vec<SectionLabel> {
        self.sections
            .get(&(day, slot, RoomCode::from(room)))
            .map(|labels| labels.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Full week for one room. An unknown room gives an empty map, not an all-vacant one.
    pub fn room_occupancy(&self, room: &str) -> RoomSchedule {
        if !self.contains_room(room) {
            return RoomSchedule::new();
        }
        self.occupied
            .iter()
            .map(|(day, slots)| {
                let week = slots
                    .iter()
                    .map(|(slot, rooms)| {
                        let status = if rooms.contains(room) {
                            Occupancy::Occupied
                        } else {
                            Occupancy::Vacant
                        };
                        (*slot, status)
                    })
                    .collect();
                (*day, week)
            })
            .collect()
    }

    /// Set union with `other`.
    pub fn merge(&mut self, other: OccupancyIndex) {
        for (day, slots) in other.occupied {
            let target = self.occupied.entry(day).or_default();
            for (slot, rooms) in slots {
                target.entry(slot).or_default().extend(rooms);
            }
        }
        self.all_rooms.extend(other.all_rooms);
        for (key, labels) in other.sections {
            self.sections.entry(key).or_default().extend(labels);
        }
        self.assert_invariants();
    }

    pub fn export(&self) -> Export {
        let time_slots = TIME_SLOTS
            .iter()
            .map(|s| {
                (
                    s.number,
                    SlotTimes {
                        start: s.start,
                        end: s.end,
                    },
                )
            })
            .collect();
        let occupied = self
            .occupied
            .iter()
            .map(|(day, slots)| {
                let slots = slots
                    .iter()
                    .map(|(slot, rooms)| (*slot, rooms.iter().cloned().collect()))
                    .collect();
                (*day, slots)
            })
            .collect();
        Export {
            all_rooms: self.all_rooms.iter().cloned().collect(),
            time_slots,
            occupied,
        }
    }

    /// Rebuilds an index from a snapshot. Section labels are not part of a snapshot.
    pub fn from_export(export: Export) -> Result<OccupancyIndex> {
        let mut index = OccupancyIndex::new();
        for room in export.all_rooms {
            index.add_room(room);
        }
        for (day, slots) in export.occupied {
            for (slot, rooms) in slots {
                time_slot(slot)?;
                for room in rooms {
                    index.record(day, slot, room, None)?;
                }
            }
        }
        index.assert_invariants();
        Ok(index)
    }

    #[cfg(debug_assertions)]
    pub(crate) fn assert_invariants(&self) {
        debug_assert!(
            self.occupied
                .values()
                .flat_map(|slots| slots.values())
                .all(|rooms| rooms.is_subset(&self.all_rooms)),
            "Occupied rooms <-> room universe subset invariant violated"
        );
        debug_assert!(
            self.sections.keys().all(|(day, slot, room)| {
                self.occupied_rooms(*day, *slot)
                    .is_ok_and(|rooms| rooms.contains(room))
            }),
            "Section label <-> occupied room invariant violated"
        );
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn assert_invariants(&self) {}
}
