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

/// Typed error for config load/parse/validation failures so callers can distinguish
/// e.g. a missing file from a bad envelope without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid duration '{value}' for {field} of signal '{signal}': {reason}")]
    Duration {
        signal: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Sustain level {sustain} of signal '{signal}' must be between 0 and 1")]
    Sustain { signal: String, sustain: f64 },

    #[error("Signal '{0}' is defined more than once")]
    DuplicateSignal(String),

    #[error("Frame rate must be greater than zero")]
    FrameRate,
}
