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
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::envelope::{Adsr, Curve};

/// The kind of value a signal reports.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// 1 while a matching note is held, 0 otherwise.
    Note,
    /// The last control change value.
    Control,
    /// The last note on velocity.
    Velocity,
    /// An envelope triggered by matching notes.
    Envelope,
}

/// A YAML representation of a signal.
#[derive(Deserialize, Clone, Debug)]
pub struct Signal {
    /// The name the signal is reported under.
    name: String,

    #[serde(rename = "type")]
    kind: SignalKind,

    /// Note number, note name, controller index or "*".
    value: String,

    /// The channel; uses the configured default if omitted.
    channel: Option<String>,

    /// The input index or name; uses the configured default if omitted.
    input: Option<String>,

    // Envelope settings, ignored for other kinds.
    attack: Option<String>,
    decay: Option<String>,
    sustain: Option<f64>,
    release: Option<String>,
    curve: Option<Curve>,
}

impl Signal {
    /// Creates a signal configuration with no envelope settings.
    pub fn new(
        name: &str,
        kind: SignalKind,
        value: &str,
        channel: Option<&str>,
        input: Option<&str>,
    ) -> Signal {
        Signal {
            name: name.to_string(),
            kind,
            value: value.to_string(),
            channel: channel.map(str::to_string),
            input: input.map(str::to_string),
            attack: None,
            decay: None,
            sustain: None,
            release: None,
            curve: None,
        }
    }

    /// Sets the envelope settings.
    pub fn with_envelope(
        mut self,
        attack: &str,
        decay: &str,
        sustain: f64,
        release: &str,
        curve: Curve,
    ) -> Signal {
        self.attack = Some(attack.to_string());
        self.decay = Some(decay.to_string());
        self.sustain = Some(sustain);
        self.release = Some(release.to_string());
        self.curve = Some(curve);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Returns the envelope settings. Omitted durations are zero and an omitted sustain is 1.
    pub fn adsr(&self) -> Result<Adsr, ConfigError> {
        let sustain = self.sustain.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&sustain) {
            return Err(ConfigError::Sustain {
                signal: self.name.clone(),
                sustain,
            });
        }

        Ok(Adsr::new(
            self.duration("attack", &self.attack)?,
            self.duration("decay", &self.decay)?,
            sustain,
            self.duration("release", &self.release)?,
        )
        .with_curve(self.curve.unwrap_or_default()))
    }

    fn duration(
        &self,
        field: &'static str,
        value: &Option<String>,
    ) -> Result<Duration, ConfigError> {
        match value {
            Some(value) => DurationString::from_string(value.clone())
                .map(Duration::from)
                .map_err(|e| ConfigError::Duration {
                    signal: self.name.clone(),
                    field,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            None => Ok(Duration::ZERO),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Signal {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<Signal>()
            .unwrap()
    }

    #[test]
    fn test_envelope_signal() {
        let signal = parse(
            r#"
            name: kick
            type: envelope
            value: C2
            channel: "*"
            attack: 10ms
            decay: 120ms
            sustain: 0.4
            release: 1s
            curve: exponential
        "#,
        );

        assert_eq!("kick", signal.name());
        assert_eq!(SignalKind::Envelope, signal.kind());
        assert_eq!("C2", signal.value());
        assert_eq!(Some("*"), signal.channel());
        assert_eq!(None, signal.input());

        let adsr = signal.adsr().unwrap();
        assert_eq!(Duration::from_millis(10), adsr.attack);
        assert_eq!(Duration::from_millis(120), adsr.decay);
        assert_eq!(0.4, adsr.sustain);
        assert_eq!(Duration::from_secs(1), adsr.release);
        assert_eq!(Curve::Exponential, adsr.curve);
    }

    #[test]
    fn test_numeric_identifiers() {
        let signal = parse(
            r#"
            name: cutoff
            type: control
            value: 74
            channel: 2
            input: 0
        "#,
        );

        assert_eq!(SignalKind::Control, signal.kind());
        assert_eq!("74", signal.value());
        assert_eq!(Some("2"), signal.channel());
        assert_eq!(Some("0"), signal.input());
    }

    #[test]
    fn test_default_adsr_is_gate() {
        let signal = Signal::new("gate", SignalKind::Envelope, "60", None, None);
        assert_eq!(Adsr::default(), signal.adsr().unwrap());
    }

    #[test]
    fn test_invalid_sustain() {
        let signal = Signal::new("bad", SignalKind::Envelope, "60", None, None).with_envelope(
            "1ms",
            "1ms",
            1.5,
            "1ms",
            Curve::Linear,
        );
        assert!(matches!(signal.adsr(), Err(ConfigError::Sustain { .. })));
    }

    #[test]
    fn test_invalid_duration() {
        let signal = Signal::new("bad", SignalKind::Envelope, "60", None, None).with_envelope(
            "soon",
            "1ms",
            0.5,
            "1ms",
            Curve::Linear,
        );
        assert!(matches!(
            signal.adsr(),
            Err(ConfigError::Duration { field: "attack", .. })
        ));
    }
}
