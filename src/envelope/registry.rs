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
use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use super::{Adsr, Envelope};
use crate::address::AddressKey;

/// Envelopes keyed by address. Entries live until they are explicitly unregistered.
#[derive(Debug, Default)]
pub struct Registry {
    envelopes: HashMap<AddressKey, Envelope>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers an envelope for the key, replacing any existing one. Returns the replaced
    /// envelope.
    pub fn register(&mut self, key: AddressKey, adsr: Adsr) -> Option<Envelope> {
        debug!(key = %key, ?adsr, "Registering envelope.");
        self.envelopes.insert(key, Envelope::new(adsr))
    }

    /// Removes the envelope for the key. Returns true if one was registered.
    pub fn unregister(&mut self, key: &AddressKey) -> bool {
        self.envelopes.remove(key).is_some()
    }

    /// Triggers the envelope for the key if one is registered.
    pub fn trigger(&mut self, key: &AddressKey, now: Instant) -> bool {
        match self.envelopes.get_mut(key) {
            Some(envelope) => {
                envelope.trigger(now);
                true
            }
            None => false,
        }
    }

    /// Stops the envelope for the key if one is registered.
    pub fn stop(&mut self, key: &AddressKey, now: Instant) -> bool {
        match self.envelopes.get_mut(key) {
            Some(envelope) => {
                envelope.stop(now);
                true
            }
            None => false,
        }
    }

    /// Samples the envelope for the key, or returns None if nothing is registered.
    pub fn sample(&mut self, key: &AddressKey, now: Instant) -> Option<f64> {
        self.envelopes
            .get_mut(key)
            .map(|envelope| envelope.sample(now))
    }

    pub fn get(&self, key: &AddressKey) -> Option<&Envelope> {
        self.envelopes.get(key)
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }
}
