use log::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use trackmodel::Topology;

use crate::error::Result;

pub fn load(filename: &Path) -> Result<Topology> {
    info!("Loading topology from {:?}", filename);
    let data = fs::read_to_string(filename)?;
    Ok(Topology::from_json(&data)?)
}

/// Pretty-printed JSON, to `filename` or to stdout when no file is given.
pub fn dump_json<T: Serialize>(filename: Option<&Path>, value: &T) -> Result<()> {
    match filename {
        Some(filename) => {
            info!("Will save export to file name {:?}", filename);
            serde_json::to_writer_pretty(&File::create(filename)?, value)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
