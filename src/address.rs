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
use std::fmt;

/// The symbol used for a wildcard field in the string form of a key.
pub const WILDCARD: &str = "*";

/// Errors produced while turning identifiers into address keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid {field} identifier '{identifier}'")]
    InvalidIdentifier {
        field: &'static str,
        identifier: String,
    },
}

impl AddressError {
    pub(crate) fn invalid(field: &'static str, identifier: impl Into<String>) -> Self {
        AddressError::InvalidIdentifier {
            field,
            identifier: identifier.into(),
        }
    }
}

/// A single component of an address key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field<T> {
    /// Matches any value.
    Any,
    /// Matches exactly this value.
    Is(T),
}

impl<T: PartialEq> Field<T> {
    /// Returns true if the field accepts the given concrete value.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Field::Any => true,
            Field::Is(v) => v == value,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Field::Any)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Any => f.write_str(WILDCARD),
            Field::Is(v) => v.fmt(f),
        }
    }
}

/// Identifies a note or controller on a channel of an input, any part of which may be a wildcard.
///
/// The canonical string form is `value/channel/input`, e.g. `60/0/Launchkey` or `*/0/*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressKey {
    /// The note number or controller index.
    pub value: Field<u8>,
    /// The 0-based MIDI channel.
    pub channel: Field<u8>,
    /// The input the event arrived on.
    pub input: Field<String>,
}

impl AddressKey {
    pub fn new(value: Field<u8>, channel: Field<u8>, input: Field<String>) -> AddressKey {
        AddressKey {
            value,
            channel,
            input,
        }
    }

    /// Creates a key with every field concrete.
    pub fn concrete(value: u8, channel: u8, input: &str) -> AddressKey {
        AddressKey::new(
            Field::Is(value),
            Field::Is(channel),
            Field::Is(input.to_string()),
        )
    }

    /// True if no field is a wildcard.
    pub fn is_concrete(&self) -> bool {
        !self.value.is_any() && !self.channel.is_any() && !self.input.is_any()
    }

    /// Returns true if this key, treated as a pattern, matches the given concrete key.
    pub fn matches(&self, concrete: &AddressKey) -> bool {
        let value_matches = match &concrete.value {
            Field::Is(v) => self.value.accepts(v),
            Field::Any => self.value.is_any(),
        };
        let channel_matches = match &concrete.channel {
            Field::Is(c) => self.channel.accepts(c),
            Field::Any => self.channel.is_any(),
        };
        let input_matches = match &concrete.input {
            Field::Is(i) => self.input.accepts(i),
            Field::Any => self.input.is_any(),
        };
        value_matches && channel_matches && input_matches
    }

    /// Returns the concrete key for an event followed by its seven wildcard variants.
    pub fn with_wildcards(value: u8, channel: u8, input: &str) -> impl Iterator<Item = AddressKey> {
        std::iter::once(AddressKey::concrete(value, channel, input))
            .chain(expand_wildcards(value, channel, input))
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.value, self.channel, self.input)
    }
}

/// Returns the seven wildcard keys a concrete event can match, from least to most specific. The
/// fully concrete key is not included.
pub fn expand_wildcards(value: u8, channel: u8, input: &str) -> [AddressKey; 7] {
    let v = || Field::Is(value);
    let c = || Field::Is(channel);
    let i = || Field::Is(input.to_string());
    [
        AddressKey::new(Field::Any, Field::Any, Field::Any),
        AddressKey::new(v(), Field::Any, Field::Any),
        AddressKey::new(Field::Any, c(), Field::Any),
        AddressKey::new(Field::Any, Field::Any, i()),
        AddressKey::new(v(), c(), Field::Any),
        AddressKey::new(Field::Any, c(), i()),
        AddressKey::new(v(), Field::Any, i()),
    ]
}
