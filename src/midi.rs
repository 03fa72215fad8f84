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
use std::{fmt, sync::Arc};

use tokio::sync::mpsc::Sender;

mod midir;
pub mod mock;

/// Raw MIDI bytes received on a named input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub input: String,
    pub bytes: Vec<u8>,
}

/// Errors raised by MIDI devices.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unable to initialize MIDI: {0}")]
    Init(String),

    #[error("unable to read MIDI port: {0}")]
    Port(String),

    #[error("unable to connect to MIDI input {input}: {reason}")]
    Connect { input: String, reason: String },

    #[error("no MIDI device found with name {0}")]
    NotFound(String),

    #[error("{0} is already started")]
    AlreadyStarted(String),
}

/// A MIDI device whose inputs feed signals.
pub trait Device: fmt::Display + std::marker::Send + std::marker::Sync {
    /// Returns the name of the device.
    fn name(&self) -> String;

    /// Returns the names of the device's inputs, in index order.
    fn inputs(&self) -> Vec<String>;

    /// Starts listening on every input and forwards events to the given sender.
    fn start(&self, sender: Sender<InputEvent>) -> Result<(), DeviceError>;

    /// Stops listening. The device may be started again afterwards.
    fn pause(&self);
}

/// Lists devices known to midir.
pub fn list_devices() -> Result<Vec<Box<dyn Device>>, DeviceError> {
    midir::list()
}

/// Gets a device with the given name.
pub fn get_device(name: &str) -> Result<Arc<dyn Device>, DeviceError> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(name)));
    };

    Ok(Arc::new(midir::get(name)?))
}
