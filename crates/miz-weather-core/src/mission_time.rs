// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Mission start date and time.

use crate::lua::LuaTable;
use crate::miz::{Miz, MizError};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Input layout accepted by [`MissionTime::from_string`].
pub const INPUT_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Error, Debug)]
pub enum MissionTimeError {
    #[error("badly formatted date/time: {0}")]
    Format(String),
    #[error(transparent)]
    Miz(#[from] MizError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissionTime {
    pub date: NaiveDate,
    /// Seconds since midnight.
    pub start_time: u32,
}

impl MissionTime {
    pub fn new(moment: NaiveDateTime) -> Self {
        Self {
            date: moment.date(),
            start_time: moment.num_seconds_from_midnight(),
        }
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parses `YYYYMMDDHHMMSS`; exactly fourteen digits forming a real date.
    pub fn from_string(input: &str) -> Result<Self, MissionTimeError> {
        if input.len() != 14 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MissionTimeError::Format(input.to_string()));
        }
        NaiveDateTime::parse_from_str(input, INPUT_FORMAT)
            .map(Self::new)
            .map_err(|_| MissionTimeError::Format(input.to_string()))
    }

    /// Writes `date` and `start_time` into a mission root table.
    pub fn write_to(&self, mission: &mut LuaTable) {
        let date = mission.table_mut("date");
        date.set("Day", i64::from(self.date.day()));
        date.set("Month", i64::from(self.date.month()));
        date.set("Year", i64::from(self.date.year()));
        mission.set("start_time", i64::from(self.start_time));
    }

    /// Applies this moment to the mission in `from` and writes the result to `to`.
    pub fn apply_to_miz(&self, from: &Path, to: &Path) -> Result<bool, MissionTimeError> {
        let mut miz = Miz::open(from)?;

        let Some(mission) = miz.mission_mut().table_mut() else {
            warn!("Mission root is not a table; time not applied — path={}", from.display());
            return Ok(false);
        };
        self.write_to(mission);
        miz.zip(Some(to))?;

        info!(
            "Mission time applied — date={} start_time={} from={} to={}",
            self.date,
            self.start_time,
            from.display(),
            to.display()
        );
        Ok(true)
    }
}
