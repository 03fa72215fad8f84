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
use std::{fmt, mem};

use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, span, Level};

use super::{DeviceError, InputEvent};

const CLIENT_NAME: &str = "midisignal input";

/// One or more midir input ports listened to together.
pub struct Device {
    name: String,
    ports: Vec<(String, MidiInputPort)>,
    connections: Mutex<Vec<MidiInputConnection<()>>>,
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn inputs(&self) -> Vec<String> {
        self.ports.iter().map(|(name, _)| name.clone()).collect()
    }

    fn start(&self, sender: Sender<InputEvent>) -> Result<(), DeviceError> {
        let span = span!(Level::INFO, "start (midir)");
        let _enter = span.enter();

        let mut connections = self.connections.lock();
        if !connections.is_empty() {
            return Err(DeviceError::AlreadyStarted(self.name.clone()));
        }

        let mut opened = Vec::with_capacity(self.ports.len());
        for (port_name, port) in self.ports.iter() {
            let input = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
            let sender = sender.clone();
            let input_name = port_name.clone();
            let connection = input
                .connect(
                    port,
                    "midisignal watcher",
                    move |_, raw_event, _| {
                        debug!(input = input_name, ?raw_event, "Received MIDI event.");
                        if let Err(e) = sender.blocking_send(InputEvent {
                            input: input_name.clone(),
                            bytes: raw_event.to_vec(),
                        }) {
                            error!(err = %e, "Error sending MIDI event to receiver.");
                        }
                    },
                    (),
                )
                .map_err(|e| DeviceError::Connect {
                    input: port_name.clone(),
                    reason: e.to_string(),
                })?;
            opened.push(connection);
        }

        info!(device = self.name, inputs = opened.len(), "Watching MIDI events.");
        *connections = opened;
        Ok(())
    }

    fn pause(&self) {
        // Explicitly drop the connections.
        let connections = mem::take(&mut *self.connections.lock());
        if !connections.is_empty() {
            info!(device = self.name, "Stopped watching MIDI events.");
        }
        mem::drop(connections);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Inputs: {})", self.name, self.ports.len())
    }
}

/// Lists midir devices, one per input port.
pub fn list() -> Result<Vec<Box<dyn super::Device>>, DeviceError> {
    Ok(list_ports()?
        .into_iter()
        .map(|(name, port)| {
            let device: Box<dyn super::Device> = Box::new(Device {
                name: name.clone(),
                ports: vec![(name, port)],
                connections: Mutex::new(Vec::new()),
            });
            device
        })
        .collect())
}

fn list_ports() -> Result<Vec<(String, MidiInputPort)>, DeviceError> {
    let input = MidiInput::new("midisignal input listing")
        .map_err(|e| DeviceError::Init(e.to_string()))?;
    let mut ports = input
        .ports()
        .into_iter()
        .map(|port| {
            input
                .port_name(&port)
                .map(|name| (name, port))
                .map_err(|e| DeviceError::Port(e.to_string()))
        })
        .collect::<Result<Vec<(String, MidiInputPort)>, DeviceError>>()?;
    ports.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(ports)
}

/// Gets a device made of every input port whose name contains the given name. "*" matches
/// every port.
pub fn get(name: &str) -> Result<Device, DeviceError> {
    let ports = list_ports()?
        .into_iter()
        .filter(|(port_name, _)| name == "*" || port_name.contains(name))
        .collect::<Vec<(String, MidiInputPort)>>();
    if ports.is_empty() {
        return Err(DeviceError::NotFound(name.to_string()));
    }

    Ok(Device {
        name: name.to_string(),
        ports,
        connections: Mutex::new(Vec::new()),
    })
}
