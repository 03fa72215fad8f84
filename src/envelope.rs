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
use std::time::{Duration, Instant};

mod curve;
mod registry;

pub use curve::Curve;
pub use registry::Registry;

/// Attack, decay, sustain and release settings for an envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    /// Time to ramp from 0 to 1.
    pub attack: Duration,
    /// Time to ramp from 1 to the sustain level.
    pub decay: Duration,
    /// Level held while the note is held, 0.0 to 1.0.
    pub sustain: f64,
    /// Time to ramp from the level at release down to 0.
    pub release: Duration,
    /// The shape applied to every segment.
    pub curve: Curve,
}

impl Adsr {
    pub fn new(attack: Duration, decay: Duration, sustain: f64, release: Duration) -> Adsr {
        Adsr {
            attack,
            decay,
            sustain: sustain.clamp(0.0, 1.0),
            release,
            curve: Curve::Linear,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Adsr {
        self.curve = curve;
        self
    }
}

impl Default for Adsr {
    /// A gate: full level while held, silent when released.
    fn default() -> Self {
        Adsr::new(Duration::ZERO, Duration::ZERO, 1.0, Duration::ZERO)
    }
}

/// The phase an envelope is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack { start: Instant },
    Decay { start: Instant },
    Sustain,
    Release { start: Instant, from: f64 },
}

/// An ADSR envelope driven by trigger/stop calls and sampled against a clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    adsr: Adsr,
    stage: Stage,
}

impl Envelope {
    pub fn new(adsr: Adsr) -> Envelope {
        Envelope {
            adsr,
            stage: Stage::Idle,
        }
    }

    pub fn adsr(&self) -> &Adsr {
        &self.adsr
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Attack { .. } => Phase::Attack,
            Stage::Decay { .. } => Phase::Decay,
            Stage::Sustain => Phase::Sustain,
            Stage::Release { .. } => Phase::Release,
        }
    }

    /// Restarts the attack from zero, whatever the current phase.
    pub fn trigger(&mut self, now: Instant) {
        self.stage = Stage::Attack { start: now };
    }

    /// Moves into release from the level at `now`. Idle and releasing envelopes are left alone.
    pub fn stop(&mut self, now: Instant) {
        match self.stage {
            Stage::Idle | Stage::Release { .. } => {}
            Stage::Attack { .. } | Stage::Decay { .. } | Stage::Sustain => {
                let from = self.sample(now);
                self.stage = Stage::Release { start: now, from };
            }
        }
    }

    /// Returns the amplitude at `now`, advancing through any phases that have completed.
    ///
    /// Each advance starts the next phase at the exact instant the previous one ended, so sampling
    /// repeatedly at the same `now` always returns the same value.
    pub fn sample(&mut self, now: Instant) -> f64 {
        let Adsr {
            attack,
            decay,
            sustain,
            release,
            curve,
        } = self.adsr;

        loop {
            match self.stage {
                Stage::Idle => return 0.0,
                Stage::Attack { start } => {
                    let elapsed = now.saturating_duration_since(start);
                    if elapsed >= attack {
                        self.stage = Stage::Decay {
                            start: start + attack,
                        };
                        continue;
                    }
                    return ramp(0.0, 1.0, curve.apply(progress(elapsed, attack)));
                }
                Stage::Decay { start } => {
                    let elapsed = now.saturating_duration_since(start);
                    if elapsed >= decay {
                        self.stage = Stage::Sustain;
                        continue;
                    }
                    return ramp(1.0, sustain, curve.apply(progress(elapsed, decay)));
                }
                Stage::Sustain => return sustain,
                Stage::Release { start, from } => {
                    let elapsed = now.saturating_duration_since(start);
                    if elapsed >= release {
                        self.stage = Stage::Idle;
                        continue;
                    }
                    return ramp(from, 0.0, curve.apply(progress(elapsed, release)));
                }
            }
        }
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f64 {
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

fn ramp(from: f64, to: f64, progress: f64) -> f64 {
    (from + (to - from) * progress).clamp(0.0, 1.0)
}
