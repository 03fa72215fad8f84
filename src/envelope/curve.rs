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
use serde::Deserialize;

/// The shape of each envelope segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
    Sine,
    Cosine,
}

impl Curve {
    /// Maps linear progress in [0, 1] onto the curve. Both ends are fixed: 0 maps to 0 and 1 maps
    /// to 1.
    pub fn apply(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        match self {
            Curve::Linear => progress,
            Curve::Exponential => progress * progress,
            // log(1 + 9x) / log(10) runs from 0 to 1.
            Curve::Logarithmic => (1.0 + 9.0 * progress).log10(),
            // Ease in and out.
            Curve::Sine => (1.0 - (progress * std::f64::consts::PI).cos()) / 2.0,
            Curve::Cosine => 1.0 - (1.0 - progress).powi(2),
        }
    }
}
