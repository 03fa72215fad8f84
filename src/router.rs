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
use std::time::Instant;

use midly::{live::LiveEvent, MidiMessage};
use tracing::{debug, warn};

use crate::{
    address::AddressKey,
    envelope::Registry,
    state::{normalize, PlayingNotes, ValueTable},
};

/// The MIDI events that drive signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ControlChange {
        index: u8,
        value: u8,
        channel: u8,
        input: String,
    },
    NoteOn {
        note: u8,
        velocity: u8,
        channel: u8,
        input: String,
    },
    NoteOff {
        note: u8,
        channel: u8,
        input: String,
    },
}

impl Event {
    /// Parses raw bytes received on the given input. Messages other than notes and control
    /// changes parse to `None`.
    pub fn parse(input: &str, raw: &[u8]) -> Result<Option<Event>, midly::Error> {
        let (channel, message) = match LiveEvent::parse(raw)? {
            LiveEvent::Midi { channel, message } => (channel.as_int(), message),
            _ => return Ok(None),
        };
        let input = input.to_string();

        Ok(match message {
            MidiMessage::NoteOn { key, vel } => Some(Event::NoteOn {
                note: key.as_int(),
                velocity: vel.as_int(),
                channel,
                input,
            }),
            MidiMessage::NoteOff { key, .. } => Some(Event::NoteOff {
                note: key.as_int(),
                channel,
                input,
            }),
            MidiMessage::Controller { controller, value } => Some(Event::ControlChange {
                index: controller.as_int(),
                value: value.as_int(),
                channel,
                input,
            }),
            _ => None,
        })
    }
}

/// Applies MIDI events to the playing notes, the value tables and the envelopes.
#[derive(Debug, Default)]
pub struct Router {
    notes: PlayingNotes,
    controls: ValueTable,
    velocities: ValueTable,
    envelopes: Registry,
}

impl Router {
    pub fn new() -> Router {
        Router::default()
    }

    /// Applies a single event.
    pub fn handle(&mut self, event: &Event, now: Instant) {
        debug!(?event, "Routing MIDI event.");
        match event {
            Event::ControlChange {
                index,
                value,
                channel,
                input,
            } => self
                .controls
                .write(*index, *channel, input, normalize(*value)),
            // A note on with no velocity is a note off.
            Event::NoteOn {
                note,
                velocity: 0,
                channel,
                input,
            } => self.note_off(*note, *channel, input, now),
            Event::NoteOn {
                note,
                velocity,
                channel,
                input,
            } => self.note_on(*note, *velocity, *channel, input, now),
            Event::NoteOff {
                note,
                channel,
                input,
            } => self.note_off(*note, *channel, input, now),
        }
    }

    /// Parses and applies raw bytes received on the given input. Bytes that don't parse are
    /// dropped.
    pub fn handle_raw(&mut self, input: &str, raw: &[u8], now: Instant) {
        match Event::parse(input, raw) {
            Ok(Some(event)) => self.handle(&event, now),
            Ok(None) => debug!(input, ?raw, "Ignoring unsupported MIDI message."),
            Err(e) => warn!(input, ?raw, err = %e, "Error parsing MIDI message."),
        }
    }

    fn note_on(&mut self, note: u8, velocity: u8, channel: u8, input: &str, now: Instant) {
        self.notes.press(note, channel, input);
        self.velocities
            .write(note, channel, input, normalize(velocity));
        for key in AddressKey::with_wildcards(note, channel, input) {
            self.envelopes.trigger(&key, now);
        }
    }

    fn note_off(&mut self, note: u8, channel: u8, input: &str, now: Instant) {
        if !self.notes.release(note, channel, input) {
            debug!(note, channel, input, "Ignoring note off for a note that isn't held.");
            return;
        }

        // Wildcard envelopes keep going while another matching note is held.
        for key in AddressKey::with_wildcards(note, channel, input) {
            if !self.notes.is_playing(&key) {
                self.envelopes.stop(&key, now);
            }
        }
    }

    pub fn is_playing(&self, key: &AddressKey) -> bool {
        self.notes.is_playing(key)
    }

    /// The last normalized control change value written for the key.
    pub fn control(&self, key: &AddressKey) -> Option<f64> {
        self.controls.get(key)
    }

    /// The last normalized note on velocity written for the key.
    pub fn velocity(&self, key: &AddressKey) -> Option<f64> {
        self.velocities.get(key)
    }

    pub fn notes(&self) -> &PlayingNotes {
        &self.notes
    }

    pub fn envelopes(&self) -> &Registry {
        &self.envelopes
    }

    pub fn envelopes_mut(&mut self) -> &mut Registry {
        &mut self.envelopes
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use midly::num::{u4, u7};

    use super::*;
    use crate::{
        address::{expand_wildcards, Field},
        envelope::{Adsr, Phase},
    };

    fn note_on(note: u8, channel: u8) -> Event {
        Event::NoteOn {
            note,
            velocity: 100,
            channel,
            input: "a".into(),
        }
    }

    fn note_off(note: u8, channel: u8) -> Event {
        Event::NoteOff {
            note,
            channel,
            input: "a".into(),
        }
    }

    fn raw(event: LiveEvent) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3);
        event.write(&mut buf).expect("unable to write event");
        buf
    }

    #[test]
    fn test_note_scenario() {
        let mut router = Router::new();
        let now = Instant::now();

        router.handle(&note_on(60, 0), now);
        assert!(router.is_playing(&AddressKey::concrete(60, 0, "a")));
        assert!(!router.is_playing(&AddressKey::concrete(61, 0, "a")));

        router.handle(&note_off(60, 0), now);
        assert!(!router.is_playing(&AddressKey::concrete(60, 0, "a")));
        for key in expand_wildcards(60, 0, "a") {
            assert!(!router.is_playing(&key));
        }
    }

    #[test]
    fn test_control_change_normalizes() {
        let mut router = Router::new();
        let now = Instant::now();
        let event = |value| Event::ControlChange {
            index: 74,
            value,
            channel: 1,
            input: "a".into(),
        };

        router.handle(&event(127), now);
        assert_eq!(Some(1.0), router.control(&AddressKey::concrete(74, 1, "a")));
        assert_eq!(
            Some(1.0),
            router.control(&AddressKey::new(Field::Any, Field::Any, Field::Any))
        );

        router.handle(&event(0), now);
        assert_eq!(Some(0.0), router.control(&AddressKey::concrete(74, 1, "a")));
        assert_eq!(None, router.control(&AddressKey::concrete(75, 1, "a")));
    }

    #[test]
    fn test_velocity() {
        let mut router = Router::new();
        router.handle(
            &Event::NoteOn {
                note: 60,
                velocity: 127,
                channel: 0,
                input: "a".into(),
            },
            Instant::now(),
        );
        assert_eq!(
            Some(1.0),
            router.velocity(&AddressKey::new(Field::Is(60), Field::Any, Field::Any))
        );
    }

    #[test]
    fn test_zero_velocity_note_on_releases() {
        let mut router = Router::new();
        let now = Instant::now();
        router.handle(&note_on(60, 0), now);
        router.handle(
            &Event::NoteOn {
                note: 60,
                velocity: 0,
                channel: 0,
                input: "a".into(),
            },
            now,
        );
        assert!(!router.is_playing(&AddressKey::concrete(60, 0, "a")));
        assert_eq!(
            Some(100.0 / 127.0),
            router.velocity(&AddressKey::concrete(60, 0, "a"))
        );
    }

    #[test]
    fn test_envelopes_follow_notes() {
        let mut router = Router::new();
        let wildcard = AddressKey::new(Field::Any, Field::Is(0), Field::Any);
        let other = AddressKey::concrete(61, 0, "a");
        let adsr = Adsr::new(
            Duration::from_millis(10),
            Duration::ZERO,
            1.0,
            Duration::from_millis(10),
        );
        router.envelopes_mut().register(wildcard.clone(), adsr);
        router.envelopes_mut().register(other.clone(), adsr);

        let now = Instant::now();
        router.handle(&note_on(60, 0), now);
        assert_eq!(Phase::Attack, router.envelopes().get(&wildcard).unwrap().phase());
        assert_eq!(Phase::Idle, router.envelopes().get(&other).unwrap().phase());

        router.handle(&note_off(60, 0), now + Duration::from_millis(20));
        assert_eq!(Phase::Release, router.envelopes().get(&wildcard).unwrap().phase());
    }

    #[test]
    fn test_wildcard_envelope_waits_for_last_note() {
        let mut router = Router::new();
        let any = AddressKey::new(Field::Any, Field::Any, Field::Any);
        let first = AddressKey::concrete(60, 0, "a");
        router.envelopes_mut().register(any.clone(), Adsr::default());
        router.envelopes_mut().register(first.clone(), Adsr::default());
        let now = Instant::now();

        router.handle(&note_on(60, 0), now);
        router.handle(&note_on(64, 0), now);
        router.handle(&note_off(60, 0), now);
        assert!(router.is_playing(&any));
        assert_eq!(Phase::Attack, router.envelopes().get(&any).unwrap().phase());
        assert_eq!(Phase::Release, router.envelopes().get(&first).unwrap().phase());
        assert_eq!(Some(1.0), router.envelopes_mut().sample(&any, now));

        router.handle(&note_off(64, 0), now);
        assert!(!router.is_playing(&any));
        assert_eq!(Phase::Release, router.envelopes().get(&any).unwrap().phase());
    }

    #[test]
    fn test_note_off_for_unheld_note_leaves_envelopes() {
        let mut router = Router::new();
        let any = AddressKey::new(Field::Any, Field::Any, Field::Any);
        router.envelopes_mut().register(any.clone(), Adsr::default());
        let now = Instant::now();

        router.handle(&note_on(60, 0), now);
        router.handle(&note_off(99, 0), now);
        assert!(router.is_playing(&any));
        assert_eq!(Phase::Attack, router.envelopes().get(&any).unwrap().phase());
    }

    #[test]
    fn test_parse() -> Result<(), midly::Error> {
        let on = raw(LiveEvent::Midi {
            channel: u4::from(2),
            message: MidiMessage::NoteOn {
                key: u7::from(64),
                vel: u7::from(90),
            },
        });
        assert_eq!(
            Some(Event::NoteOn {
                note: 64,
                velocity: 90,
                channel: 2,
                input: "a".into()
            }),
            Event::parse("a", &on)?
        );

        let off = raw(LiveEvent::Midi {
            channel: u4::from(2),
            message: MidiMessage::NoteOff {
                key: u7::from(64),
                vel: u7::from(0),
            },
        });
        assert_eq!(
            Some(Event::NoteOff {
                note: 64,
                channel: 2,
                input: "a".into()
            }),
            Event::parse("a", &off)?
        );

        let cc = raw(LiveEvent::Midi {
            channel: u4::from(0),
            message: MidiMessage::Controller {
                controller: u7::from(1),
                value: u7::from(127),
            },
        });
        assert_eq!(
            Some(Event::ControlChange {
                index: 1,
                value: 127,
                channel: 0,
                input: "a".into()
            }),
            Event::parse("a", &cc)?
        );

        let program = raw(LiveEvent::Midi {
            channel: u4::from(0),
            message: MidiMessage::ProgramChange {
                program: u7::from(3),
            },
        });
        assert_eq!(None, Event::parse("a", &program)?);

        assert!(Event::parse("a", &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_handle_raw_drops_garbage() {
        let mut router = Router::new();
        router.handle_raw("a", &[0x42], Instant::now());
        assert!(router.notes().is_empty());

        let on = raw(LiveEvent::Midi {
            channel: u4::from(0),
            message: MidiMessage::NoteOn {
                key: u7::from(60),
                vel: u7::from(64),
            },
        });
        router.handle_raw("a", &on, Instant::now());
        assert!(router.is_playing(&AddressKey::concrete(60, 0, "a")));
    }
}
