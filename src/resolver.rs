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
use crate::{
    address::{AddressError, AddressKey, Field, WILDCARD},
    config,
    state::MAX_DATA_VALUE,
};

/// The highest 0-based MIDI channel.
const MAX_CHANNEL: u8 = 15;

/// The octaves a note name may name.
const OCTAVES: std::ops::RangeInclusive<i32> = -1..=9;

/// Turns user-facing identifiers into address keys.
///
/// Values may be note numbers, controller indexes or note names like `C4` or `F#2`. Inputs may be
/// indexes into the known inputs or input names. Any field may be the wildcard `*`.
#[derive(Debug, Clone)]
pub struct Resolver {
    default_channel: String,
    default_input: String,
    inputs: Vec<String>,
}

impl Resolver {
    /// Creates a resolver with the given defaults and the names of the known inputs, in order.
    pub fn new(defaults: &config::Defaults, inputs: Vec<String>) -> Resolver {
        Resolver {
            default_channel: defaults.channel().to_string(),
            default_input: defaults.input().to_string(),
            inputs,
        }
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Builds the key for the given identifiers, falling back to the defaults for an omitted
    /// channel or input.
    pub fn resolve_key(
        &self,
        value: &str,
        channel: Option<&str>,
        input: Option<&str>,
    ) -> Result<AddressKey, AddressError> {
        Ok(AddressKey::new(
            resolve_value(value)?,
            resolve_channel(channel.unwrap_or(&self.default_channel))?,
            self.resolve_input(input.unwrap_or(&self.default_input))?,
        ))
    }

    /// Resolves an input index or name. Indexes must refer to a known input; names are accepted
    /// as is so that a key can be built before its input connects.
    pub fn resolve_input(&self, input: &str) -> Result<Field<String>, AddressError> {
        let input = input.trim();
        if input == WILDCARD {
            return Ok(Field::Any);
        }
        if input.is_empty() {
            return Err(AddressError::invalid("input", input));
        }

        match input.parse::<usize>() {
            Ok(index) => self
                .inputs
                .get(index)
                .map(|name| Field::Is(name.clone()))
                .ok_or_else(|| AddressError::invalid("input", input)),
            Err(_) => Ok(Field::Is(input.to_string())),
        }
    }
}

/// Resolves a note number, controller index or note name.
pub fn resolve_value(value: &str) -> Result<Field<u8>, AddressError> {
    let value = value.trim();
    if value == WILDCARD {
        return Ok(Field::Any);
    }

    if let Ok(number) = value.parse::<u8>() {
        return if number <= MAX_DATA_VALUE {
            Ok(Field::Is(number))
        } else {
            Err(AddressError::invalid("value", value))
        };
    }

    parse_note_name(value)
        .map(Field::Is)
        .ok_or_else(|| AddressError::invalid("value", value))
}

/// Resolves a 0-based MIDI channel.
pub fn resolve_channel(channel: &str) -> Result<Field<u8>, AddressError> {
    let channel = channel.trim();
    if channel == WILDCARD {
        return Ok(Field::Any);
    }

    match channel.parse::<u8>() {
        Ok(number) if number <= MAX_CHANNEL => Ok(Field::Is(number)),
        _ => Err(AddressError::invalid("channel", channel)),
    }
}

/// Parses names like `C4`, `f#2`, `Bb-1` into note numbers, with C4 as middle C (60).
fn parse_note_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let octave_start = rest.find(|c: char| c == '-' || c.is_ascii_digit())?;
    let (accidentals, octave) = rest.split_at(octave_start);

    let mut offset = 0;
    for accidental in accidentals.chars() {
        match accidental {
            '#' => offset += 1,
            'b' => offset -= 1,
            _ => return None,
        }
    }

    let octave: i32 = octave.parse().ok().filter(|octave| OCTAVES.contains(octave))?;
    let note = (octave + 1) * 12 + base + offset;
    u8::try_from(note)
        .ok()
        .filter(|note| *note <= MAX_DATA_VALUE)
}
