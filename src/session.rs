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
use std::{future::Future, sync::Arc, time::Duration, time::Instant};

use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, span, warn, Level};

use crate::{
    address::AddressError,
    config::{self, ConfigError, SignalKind},
    midi::{Device, DeviceError, InputEvent},
    resolver::Resolver,
    router::{Event, Router},
    signal::Signal,
};

/// How many raw events may queue up between frames.
const EVENT_BUFFER: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("signal '{signal}': {source}")]
    Address {
        signal: String,
        #[source]
        source: AddressError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A set of named signals fed by a router.
pub struct Session {
    resolver: Resolver,
    router: Router,
    signals: Vec<(String, Signal)>,
    frame_period: Duration,
}

impl Session {
    /// Creates a session from its configuration. `inputs` are the names of the device's inputs,
    /// used to resolve input indexes.
    pub fn new(config: &config::Session, inputs: Vec<String>) -> Result<Session, SessionError> {
        let mut session = Session {
            resolver: Resolver::new(config.defaults(), inputs),
            router: Router::new(),
            signals: Vec::with_capacity(config.signals().len()),
            frame_period: config.frame_period(),
        };
        for signal in config.signals() {
            session.add_signal(signal)?;
        }
        Ok(session)
    }

    /// Adds a signal, replacing any signal with the same name. Envelope signals register their
    /// envelope with the router.
    pub fn add_signal(&mut self, config: &config::Signal) -> Result<(), SessionError> {
        let key = self
            .resolver
            .resolve_key(config.value(), config.channel(), config.input())
            .map_err(|source| SessionError::Address {
                signal: config.name().to_string(),
                source,
            })?;

        let adsr = match config.kind() {
            SignalKind::Envelope => Some(config.adsr()?),
            _ => None,
        };
        self.remove_signal(config.name());

        if let Some(adsr) = adsr {
            if self.router.envelopes_mut().register(key.clone(), adsr).is_some() {
                warn!(
                    signal = config.name(),
                    key = %key,
                    "Envelope already registered for key, replacing it."
                );
            }
        }

        let signal = Signal::new(config.kind(), key);
        debug!(name = config.name(), %signal, "Added signal.");
        self.signals.push((config.name().to_string(), signal));
        Ok(())
    }

    /// Removes the named signal. Returns false if there was no such signal.
    pub fn remove_signal(&mut self, name: &str) -> bool {
        let Some(position) = self.signals.iter().position(|(n, _)| n == name) else {
            return false;
        };
        let (_, removed) = self.signals.remove(position);

        // Envelopes are shared by every envelope signal with the same key.
        if let Signal::Envelope(key) = &removed {
            let shared = self
                .signals
                .iter()
                .any(|(_, signal)| matches!(signal, Signal::Envelope(other) if other == key));
            if !shared {
                self.router.envelopes_mut().unregister(key);
            }
        }
        true
    }

    /// Routes a single event.
    pub fn handle(&mut self, event: &Event, now: Instant) {
        self.router.handle(event, now);
    }

    /// Parses and applies raw bytes received on the given input.
    pub fn handle_raw(&mut self, input: &str, raw: &[u8], now: Instant) {
        self.router.handle_raw(input, raw, now);
    }

    /// Samples every signal at `now`, in the order they were added.
    pub fn sample(&mut self, now: Instant) -> Vec<(String, f64)> {
        let router = &mut self.router;
        self.signals
            .iter()
            .map(|(name, signal)| (name.clone(), signal.sample(router, now)))
            .collect()
    }

    pub fn signals(&self) -> impl Iterator<Item = (&str, &Signal)> {
        self.signals
            .iter()
            .map(|(name, signal)| (name.as_str(), signal))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Starts the device and routes its events until `shutdown` completes or the device's event
    /// channel closes, handing every frame of samples to `on_frame`. The device is paused before
    /// returning.
    pub async fn run<F, S>(
        &mut self,
        device: Arc<dyn Device>,
        mut on_frame: F,
        shutdown: S,
    ) -> Result<(), SessionError>
    where
        F: FnMut(&[(String, f64)]),
        S: Future<Output = ()>,
    {
        let span = span!(Level::INFO, "session");
        let _enter = span.enter();

        let (events_tx, mut events_rx) = mpsc::channel::<InputEvent>(EVENT_BUFFER);
        device.start(events_tx)?;
        info!(
            device = device.name(),
            signals = self.signals.len(),
            frame_period = ?self.frame_period,
            "Session started."
        );

        let mut frames = time::interval(self.frame_period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = events_rx.recv() => match event {
                    Some(event) => self.handle_raw(&event.input, &event.bytes, Instant::now()),
                    None => {
                        info!("Event channel closed.");
                        break;
                    }
                },
                _ = frames.tick() => {
                    let frame = self.sample(Instant::now());
                    debug!(?frame, "Sampled frame.");
                    on_frame(&frame);
                }
            }
        }

        device.pause();
        info!(device = device.name(), "Session stopped.");
        Ok(())
    }
}
