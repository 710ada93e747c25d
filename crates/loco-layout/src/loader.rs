//! CSV route loader.
//!
//! # Route CSV format
//!
//! One row per block, in lap order.  Rows for the same locomotive must agree
//! on `speed` and the station contacts.
//!
//! ```csv
//! loco,speed,station_front,station_back,block,entry_junction,entry_direction,exit_junction,exit_direction,warn,enter,exit
//! 1,10,1,2,1,21,straight,16,straight,1,31,21
//! 1,10,1,2,2,9,straight,2,straight,19,13,1
//! 2,12,5,6,1,21,diverted,16,diverted,5,34,24
//! 2,12,5,6,2,9,diverted,2,diverted,23,16,5
//! ```
//!
//! Trains are returned in order of first appearance.
//!
//! # Junction CSV format
//!
//! ```csv
//! junction,direction
//! 22,diverted
//! 20,straight
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use loco_core::{Direction, JunctionSetting, LocoId};

use crate::{Block, LayoutError, LayoutResult, Route, Station, TrainSpec};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RouteRecord {
    loco:            u32,
    speed:           u32,
    station_front:   u32,
    station_back:    u32,
    block:           u32,
    entry_junction:  u32,
    entry_direction: String,
    exit_junction:   u32,
    exit_direction:  String,
    warn:            u32,
    enter:           u32,
    exit:            u32,
}

#[derive(Deserialize)]
struct JunctionRecord {
    junction:  u32,
    direction: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the trains of a layout from a route CSV file.
pub fn load_trains_csv(path: &Path) -> LayoutResult<Vec<TrainSpec>> {
    let file = std::fs::File::open(path)?;
    load_trains_reader(file)
}

/// Like [`load_trains_csv`] but accepts any `Read` source.
pub fn load_trains_reader<R: Read>(reader: R) -> LayoutResult<Vec<TrainSpec>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut trains: Vec<TrainSpec> = Vec::with_capacity(2);

    for result in csv_reader.deserialize::<RouteRecord>() {
        let row = result.map_err(|e| LayoutError::Parse(e.to_string()))?;
        let block = Block::new(
            row.block,
            JunctionSetting::new(row.entry_junction, row.entry_direction.parse::<Direction>()?),
            JunctionSetting::new(row.exit_junction, row.exit_direction.parse::<Direction>()?),
            row.warn,
            row.enter,
            row.exit,
        );
        let station = Station::new(row.station_front, row.station_back);

        match trains.iter_mut().find(|t| t.loco == LocoId(row.loco)) {
            Some(train) => {
                if train.speed != row.speed || train.route.station != station {
                    return Err(LayoutError::Parse(format!(
                        "rows for {} disagree on speed or station contacts",
                        train.loco
                    )));
                }
                train.route.blocks.push(block);
            }
            None => trains.push(TrainSpec::new(row.loco, row.speed, Route::new(station, vec![block]))),
        }
    }

    Ok(trains)
}

/// Load initial junction positions from a junction CSV file.
pub fn load_junctions_csv(path: &Path) -> LayoutResult<Vec<JunctionSetting>> {
    let file = std::fs::File::open(path)?;
    load_junctions_reader(file)
}

/// Like [`load_junctions_csv`] but accepts any `Read` source.
pub fn load_junctions_reader<R: Read>(reader: R) -> LayoutResult<Vec<JunctionSetting>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<JunctionRecord>()
        .map(|result| {
            let row = result.map_err(|e| LayoutError::Parse(e.to_string()))?;
            Ok(JunctionSetting::new(row.junction, row.direction.parse::<Direction>()?))
        })
        .collect()
}
