// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::{HashMap, HashSet};

use crate::address::AddressKey;

/// The largest 7 bit MIDI data value.
pub const MAX_DATA_VALUE: u8 = 127;

/// Converts a 7 bit MIDI data value into the range 0.0 to 1.0.
pub fn normalize(raw: u8) -> f64 {
    f64::from(raw.min(MAX_DATA_VALUE)) / f64::from(MAX_DATA_VALUE)
}

/// Tracks which notes are held.
///
/// Every held note counts towards its concrete key and each of its wildcard keys, so a wildcard
/// stays on for as long as any note matching it is held.
#[derive(Debug, Default)]
pub struct PlayingNotes {
    held: HashSet<AddressKey>,
    counts: HashMap<AddressKey, usize>,
}

impl PlayingNotes {
    pub fn new() -> PlayingNotes {
        PlayingNotes::default()
    }

    /// Marks the note as held. Returns false if it was already held.
    pub fn press(&mut self, note: u8, channel: u8, input: &str) -> bool {
        if !self.held.insert(AddressKey::concrete(note, channel, input)) {
            return false;
        }

        for key in AddressKey::with_wildcards(note, channel, input) {
            *self.counts.entry(key).or_insert(0) += 1;
        }
        true
    }

    /// Marks the note as released. Returns false if it was not held.
    pub fn release(&mut self, note: u8, channel: u8, input: &str) -> bool {
        if !self.held.remove(&AddressKey::concrete(note, channel, input)) {
            return false;
        }

        for key in AddressKey::with_wildcards(note, channel, input) {
            if let Some(count) = self.counts.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&key);
                }
            }
        }
        true
    }

    /// Returns true if at least one held note matches the key.
    pub fn is_playing(&self, key: &AddressKey) -> bool {
        self.counts.contains_key(key)
    }

    /// Returns how many held notes match the key.
    pub fn count(&self, key: &AddressKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// The concrete keys of all held notes.
    pub fn held(&self) -> impl Iterator<Item = &AddressKey> {
        self.held.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// The last value written for each key. There is no history.
#[derive(Debug, Default)]
pub struct ValueTable {
    values: HashMap<AddressKey, f64>,
}

impl ValueTable {
    pub fn new() -> ValueTable {
        ValueTable::default()
    }

    /// Writes the value under the concrete key and every wildcard key of the event.
    pub fn write(&mut self, index: u8, channel: u8, input: &str, value: f64) {
        for key in AddressKey::with_wildcards(index, channel, input) {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &AddressKey) -> Option<f64> {
        self.values.get(key).copied()
    }
}
