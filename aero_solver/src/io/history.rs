// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! The typed row shape for the append-only history file (§6, §6.A). This crate does not dictate a
//! column format or file encoding for the history file itself, that is the CLI's job, but derives
//! `Serialize` so the CLI can hand a `HistoryRow` to whatever text encoder it chooses.

use serde::Serialize;

use aero_math::type_aliases::Float;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistoryRow {
    pub step: usize,
    pub time: Float,
    pub residual: Float,
    pub gmres_iterations: usize,
    pub lift_coefficient: Float,
    pub drag_coefficient: Float,
    pub side_force_coefficient: Float,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_row_serializes_to_json() {
        let row = HistoryRow {
            step: 3,
            time: 0.1,
            residual: 1e-6,
            gmres_iterations: 12,
            lift_coefficient: 1.2,
            drag_coefficient: 0.05,
            side_force_coefficient: 0.0,
        };

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"step\":3"));
    }
}
