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

use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

use super::{DeviceError, InputEvent};

/// A mock device. Events are injected with [`Device::mock_event`].
#[derive(Clone)]
pub struct Device {
    name: String,
    sender: Arc<Mutex<Option<Sender<InputEvent>>>>,
}

impl Device {
    /// Gets the given mock device. It has a single input named after the device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            sender: Arc::new(Mutex::new(None)),
        }
    }

    /// True while the device is started.
    pub fn is_started(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Sends raw bytes as though they arrived on the device's input. Returns false if the
    /// device isn't started or the receiver is gone.
    pub async fn mock_event(&self, bytes: &[u8]) -> bool {
        let sender = self.sender.lock().clone();
        match sender {
            Some(sender) => sender
                .send(InputEvent {
                    input: self.name.clone(),
                    bytes: bytes.to_vec(),
                })
                .await
                .is_ok(),
            None => {
                warn!(device = self.name, "Mock event sent while paused.");
                false
            }
        }
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn inputs(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn start(&self, sender: Sender<InputEvent>) -> Result<(), DeviceError> {
        let mut current = self.sender.lock();
        if current.is_some() {
            return Err(DeviceError::AlreadyStarted(self.name.clone()));
        }

        info!(device = self.name, "Watching mock MIDI events.");
        *current = Some(sender);
        Ok(())
    }

    fn pause(&self) {
        self.sender.lock().take();
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod test {
    use tokio::sync::mpsc;

    use super::Device;
    use crate::midi::{Device as _, DeviceError, InputEvent};

    #[tokio::test]
    async fn test_start_and_pause() -> Result<(), DeviceError> {
        let device = Device::get("mock-keys");
        let (tx, mut rx) = mpsc::channel::<InputEvent>(10);

        assert!(!device.mock_event(&[0x90, 60, 100]).await);
        device.start(tx.clone())?;
        assert!(device.is_started());
        assert!(matches!(
            device.start(tx),
            Err(DeviceError::AlreadyStarted(_))
        ));

        assert!(device.mock_event(&[0x90, 60, 100]).await);
        assert_eq!(
            Some(InputEvent {
                input: "mock-keys".into(),
                bytes: vec![0x90, 60, 100],
            }),
            rx.recv().await
        );

        device.pause();
        assert!(!device.is_started());
        // The only sender was held by the device, so the channel is now closed.
        assert_eq!(None, rx.recv().await);
        Ok(())
    }
}
