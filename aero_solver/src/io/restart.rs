// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! A minimal little-endian binary reader/writer for `RestartRecord` (§6, §6.A), in the style of
//! the existing project's own `write_text_to_file` helper: direct `std::io`, no serialization
//! crate. Best-effort/example-grade, not a hardened production file format; the real restart
//! writer/reader lives with the (out-of-scope) CLI.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use aero_math::type_aliases::Float;

use crate::error::Error;

/// The last three `Gamma` snapshots a restarted unsteady run needs to reconstruct its history
/// ring; no header beyond the array length implied by the solver's loop count.
#[derive(Debug, Clone, PartialEq)]
pub struct RestartRecord {
    pub gamma_n_minus_2: Vec<Float>,
    pub gamma_n_minus_1: Vec<Float>,
    pub gamma_n: Vec<Float>,
}

/// Writes `record` as three length-prefixed little-endian `f64` arrays, in order.
pub fn write_restart_file(path: &str, record: &RestartRecord) -> Result<(), Error> {
    let mut file = fs::OpenOptions::new().write(true).create(true).truncate(true).open(Path::new(path))?;

    for array in [&record.gamma_n_minus_2, &record.gamma_n_minus_1, &record.gamma_n] {
        write_array(&mut file, array)?;
    }

    Ok(())
}

/// Reads back a restart file written by [`write_restart_file`]. Bit-identical to the original
/// arrays when the file was written on a little-endian host.
pub fn read_restart_file(path: &str) -> Result<RestartRecord, Error> {
    let mut file = fs::File::open(Path::new(path))?;

    Ok(RestartRecord {
        gamma_n_minus_2: read_array(&mut file)?,
        gamma_n_minus_1: read_array(&mut file)?,
        gamma_n: read_array(&mut file)?,
    })
}

fn write_array(file: &mut fs::File, values: &[Float]) -> Result<(), Error> {
    let len = values.len() as u64;
    file.write_all(&len.to_le_bytes())?;
    for &value in values {
        let as_f64 = value as f64;
        file.write_all(&as_f64.to_le_bytes())?;
    }
    Ok(())
}

fn read_array(file: &mut fs::File) -> Result<Vec<Float>, Error> {
    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)?;
    let len = u64::from_le_bytes(len_bytes) as usize;

    let mut values = Vec::with_capacity(len);
    let mut value_bytes = [0u8; 8];
    for _ in 0..len {
        file.read_exact(&mut value_bytes)?;
        values.push(f64::from_le_bytes(value_bytes) as Float);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trips_bit_identical() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("aero_solver_restart_test_{}.bin", std::process::id()));
        let path_str = path.to_str().unwrap();

        let record = RestartRecord {
            gamma_n_minus_2: vec![1.0, 2.5, -3.25],
            gamma_n_minus_1: vec![0.0],
            gamma_n: vec![4.0, 5.0],
        };

        write_restart_file(path_str, &record).unwrap();
        let read_back = read_restart_file(path_str).unwrap();

        assert_eq!(read_back, record);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_read_missing_file_is_an_io_error() {
        let result = read_restart_file("/nonexistent/path/does/not/exist.bin");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
