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
use clap::{crate_version, Parser, Subcommand};
use midisignal::address::{AddressKey, Field};
use midisignal::config::{self, Defaults};
use midisignal::midi;
use midisignal::resolver::Resolver;
use midisignal::session::Session;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Turns MIDI input into sampled signals."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available MIDI input devices.
    Devices {},
    /// Prints the address key for a value and every key an event for it is written to.
    Keys {
        /// The note number, note name (e.g. C4, F#2), controller index or "*".
        value: String,
        /// The channel (0-15) or "*".
        #[arg[short, long, default_value = "0"]]
        channel: String,
        /// The input name, index or "*".
        #[arg[short, long, default_value = "*"]]
        input: String,
        /// The MIDI device used to resolve input indexes.
        #[arg[short, long]]
        device: Option<String>,
    },
    /// Monitors the signals in a session config, printing them whenever they change.
    Monitor {
        /// The path to the session config.
        config_path: String,
        /// The MIDI device to listen to. Overrides the device in the config.
        #[arg[short, long]]
        device: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Keys {
            value,
            channel,
            input,
            device,
        } => {
            let inputs = match device {
                Some(device) => midi::get_device(&device)?.inputs(),
                None => Vec::new(),
            };
            let resolver = Resolver::new(&Defaults::new(&channel, &input), inputs);
            let key = resolver.resolve_key(&value, None, None)?;

            println!("Key: {}", key);
            match (&key.value, &key.channel, &key.input) {
                (Field::Is(value), Field::Is(channel), Field::Is(input)) => {
                    println!("Written to:");
                    for key in AddressKey::with_wildcards(*value, *channel, input) {
                        println!("- {}", key);
                    }
                }
                _ => println!("Matches any event whose fields match the non-wildcard fields."),
            }
        }
        Commands::Monitor {
            config_path,
            device,
        } => {
            let config = config::Session::deserialize(&PathBuf::from(&config_path))?;
            let device_name = match device.as_deref().or(config.device()) {
                Some(name) => name.to_string(),
                None => return Err(format!("no device given for {}", config_path).into()),
            };
            let device = midi::get_device(&device_name)?;
            info!(device = %device, "Using MIDI device.");

            let mut session = Session::new(&config, device.inputs())?;
            let mut last: Vec<(String, f64)> = Vec::new();
            session
                .run(
                    device,
                    |frame| {
                        if frame != last.as_slice() {
                            let line = frame
                                .iter()
                                .map(|(name, value)| format!("{}={:.3}", name, value))
                                .collect::<Vec<String>>()
                                .join(" ");
                            println!("{}", line);
                            last = frame.to_vec();
                        }
                    },
                    async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            tracing::error!(err = %e, "Unable to listen for ctrl-c.");
                            std::future::pending::<()>().await;
                        }
                    },
                )
                .await?;
        }
    }

    Ok(())
}
