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
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

mod error;
mod signal;

pub use error::ConfigError;
pub use signal::{Signal, SignalKind};

const DEFAULT_FRAME_RATE: u32 = 60;
const DEFAULT_CHANNEL: &str = "0";
const DEFAULT_INPUT: &str = "0";

/// The channel and input used when a signal doesn't name one.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    /// The default channel (0-based) or "*".
    #[serde(default = "default_channel")]
    channel: String,

    /// The default input index, name, or "*".
    #[serde(default = "default_input")]
    input: String,
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

impl Defaults {
    pub fn new(channel: &str, input: &str) -> Defaults {
        Defaults {
            channel: channel.to_string(),
            input: input.to_string(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults::new(DEFAULT_CHANNEL, DEFAULT_INPUT)
    }
}

/// The configuration for a signal session.
#[derive(Deserialize, Clone, Debug)]
pub struct Session {
    /// The MIDI device to listen to. Names starting with "mock" use a mock device.
    device: Option<String>,

    /// How many times per second signals are sampled.
    frame_rate: Option<u32>,

    #[serde(default)]
    defaults: Defaults,

    #[serde(default)]
    signals: Vec<Signal>,
}

impl Session {
    /// Creates a new session configuration.
    pub fn new(
        device: Option<&str>,
        frame_rate: Option<u32>,
        defaults: Defaults,
        signals: Vec<Signal>,
    ) -> Session {
        Session {
            device: device.map(str::to_string),
            frame_rate,
            defaults,
            signals,
        }
    }

    /// Parse and validate a session from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Session, ConfigError> {
        let session = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Session>()?;
        session.validate()?;
        Ok(session)
    }

    /// Checks the parts of the configuration the types can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == Some(0) {
            return Err(ConfigError::FrameRate);
        }

        let mut names = HashSet::new();
        for signal in &self.signals {
            if !names.insert(signal.name()) {
                return Err(ConfigError::DuplicateSignal(signal.name().to_string()));
            }
            if signal.kind() == SignalKind::Envelope {
                signal.adsr()?;
            }
        }
        Ok(())
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }

    /// The time between frames.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate().max(1)
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs, time::Duration};

    use config::{Config, File, FileFormat};

    use super::*;
    use crate::envelope::Curve;

    #[test]
    fn test_session_deserialize() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.yaml");
        fs::write(
            &path,
            r#"
device: mock-keys
frame_rate: 30
defaults:
  channel: 9
signals:
  - name: kick
    type: envelope
    value: C2
    attack: 5ms
    release: 200ms
    curve: sine
  - name: any
    type: note
    value: "*"
    input: "*"
  - name: cutoff
    type: control
    value: 74
"#,
        )?;

        let session = Session::deserialize(&path)?;
        assert_eq!(Some("mock-keys"), session.device());
        assert_eq!(30, session.frame_rate());
        assert_eq!("9", session.defaults().channel());
        assert_eq!("0", session.defaults().input());
        assert_eq!(3, session.signals().len());

        let kick = &session.signals()[0];
        assert_eq!(SignalKind::Envelope, kick.kind());
        assert_eq!(Curve::Sine, kick.adsr()?.curve);
        assert_eq!(Duration::from_millis(200), kick.adsr()?.release);
        assert_eq!(SignalKind::Note, session.signals()[1].kind());
        assert_eq!("*", session.signals()[1].value());
        Ok(())
    }

    #[test]
    fn test_session_defaults() {
        let session: Session = Config::builder()
            .add_source(File::from_str("device: mock", FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(60, session.frame_rate());
        assert_eq!(&Defaults::default(), session.defaults());
        assert!(session.signals().is_empty());
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_frame_period() {
        let session = Session::new(None, Some(50), Defaults::default(), vec![]);
        assert_eq!(Duration::from_millis(20), session.frame_period());
    }

    #[test]
    fn test_validate_duplicate_signal() {
        let session = Session::new(
            None,
            None,
            Defaults::default(),
            vec![
                Signal::new("a", SignalKind::Note, "60", None, None),
                Signal::new("a", SignalKind::Control, "1", None, None),
            ],
        );
        assert!(matches!(
            session.validate(),
            Err(ConfigError::DuplicateSignal(name)) if name == "a"
        ));
    }

    #[test]
    fn test_validate_envelope_and_frame_rate() {
        let bad_envelope = Signal::new("e", SignalKind::Envelope, "60", None, None)
            .with_envelope("1ms", "1ms", 2.0, "1ms", Curve::Linear);
        let session = Session::new(None, None, Defaults::default(), vec![bad_envelope]);
        assert!(matches!(
            session.validate(),
            Err(ConfigError::Sustain { .. })
        ));

        let session = Session::new(None, Some(0), Defaults::default(), vec![]);
        assert!(matches!(session.validate(), Err(ConfigError::FrameRate)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Session::deserialize(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
