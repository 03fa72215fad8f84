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
use std::time::Instant;

use crate::{address::AddressKey, config::SignalKind, router::Router};

/// A value derived from MIDI input that can be sampled once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signal {
    /// 1.0 while a note matching the key is held, 0.0 otherwise.
    Note(AddressKey),
    /// The last control change value written for the key, 0.0 before the first one.
    Control(AddressKey),
    /// The last note on velocity written for the key, 0.0 before the first one.
    Velocity(AddressKey),
    /// The envelope registered for the key, 0.0 if none is.
    Envelope(AddressKey),
}

impl Signal {
    pub fn new(kind: SignalKind, key: AddressKey) -> Signal {
        match kind {
            SignalKind::Note => Signal::Note(key),
            SignalKind::Control => Signal::Control(key),
            SignalKind::Velocity => Signal::Velocity(key),
            SignalKind::Envelope => Signal::Envelope(key),
        }
    }

    pub fn key(&self) -> &AddressKey {
        match self {
            Signal::Note(key)
            | Signal::Control(key)
            | Signal::Velocity(key)
            | Signal::Envelope(key) => key,
        }
    }

    /// Samples the signal at `now`. Envelopes advance their phase as needed.
    pub fn sample(&self, router: &mut Router, now: Instant) -> f64 {
        match self {
            Signal::Note(key) => {
                if router.is_playing(key) {
                    1.0
                } else {
                    0.0
                }
            }
            Signal::Control(key) => router.control(key).unwrap_or(0.0),
            Signal::Velocity(key) => router.velocity(key).unwrap_or(0.0),
            Signal::Envelope(key) => router.envelopes_mut().sample(key, now).unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Note(key) => write!(f, "note({})", key),
            Signal::Control(key) => write!(f, "cc({})", key),
            Signal::Velocity(key) => write!(f, "velocity({})", key),
            Signal::Envelope(key) => write!(f, "envelope({})", key),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{address::Field, envelope::Adsr, router::Event};

    fn note_on(note: u8) -> Event {
        Event::NoteOn {
            note,
            velocity: 127,
            channel: 0,
            input: "a".into(),
        }
    }

    #[test]
    fn test_unset_signals_are_zero() {
        let mut router = Router::new();
        let key = AddressKey::concrete(60, 0, "a");
        let now = Instant::now();
        for kind in [
            SignalKind::Note,
            SignalKind::Control,
            SignalKind::Velocity,
            SignalKind::Envelope,
        ] {
            assert_eq!(0.0, Signal::new(kind, key.clone()).sample(&mut router, now));
        }
    }

    #[test]
    fn test_note_and_velocity() {
        let mut router = Router::new();
        let now = Instant::now();
        let any_note = Signal::Note(AddressKey::new(Field::Any, Field::Any, Field::Any));
        let velocity = Signal::Velocity(AddressKey::concrete(60, 0, "a"));

        router.handle(&note_on(60), now);
        assert_eq!(1.0, any_note.sample(&mut router, now));
        assert_eq!(1.0, velocity.sample(&mut router, now));
    }

    #[test]
    fn test_envelope() {
        let mut router = Router::new();
        let key = AddressKey::new(Field::Is(60), Field::Any, Field::Any);
        router.envelopes_mut().register(
            key.clone(),
            Adsr::new(
                Duration::from_millis(100),
                Duration::ZERO,
                1.0,
                Duration::from_millis(100),
            ),
        );
        let signal = Signal::Envelope(key);
        let t0 = Instant::now();

        router.handle(&note_on(60), t0);
        assert_eq!(0.0, signal.sample(&mut router, t0));
        assert!((signal.sample(&mut router, t0 + Duration::from_millis(50)) - 0.5).abs() < 1e-9);
        assert_eq!(1.0, signal.sample(&mut router, t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_key() {
        let key = AddressKey::concrete(74, 1, "a");
        assert_eq!(&key, Signal::new(SignalKind::Control, key.clone()).key());
        assert_eq!(&key, Signal::Envelope(key.clone()).key());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "cc(74/*/*)",
            Signal::Control(AddressKey::new(Field::Is(74), Field::Any, Field::Any)).to_string()
        );
    }
}
