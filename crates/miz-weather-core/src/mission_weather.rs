// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Maps a decoded METAR onto the static weather block of a DCS mission.

use crate::lua::{LuaTable, LuaValue};
use crate::metar::{CloudType, Intensity, Metar, SkyCover, WindDirection};
use crate::miz::{Miz, MizError};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

const FEET_TO_M: f64 = 0.3048;
const HPA_TO_MMHG: f64 = 0.750_062;

pub const MAX_VISIBILITY_M: i64 = 80_000;
pub const MAX_FOG_VISIBILITY_M: i64 = 6_000;
pub const MAX_CLOUD_BASE_M: f64 = 5_000.0;
pub const MIN_CLOUD_BASE_M: i64 = 300;
pub const MAX_GROUND_WIND_MPS: f64 = 50.0;
pub const MAX_UPPER_WIND_MPS: f64 = 97.0;
pub const MAX_TURBULENCE: i64 = 200;
pub const TEMPERATURE_RANGE: (i64, i64) = (-50, 50);
pub const QNH_RANGE_MMHG: (i64, i64) = (720, 790);

const DEFAULT_TEMPERATURE: i64 = 15;
const DEFAULT_QNH_MMHG: i64 = 760;

#[derive(Error, Debug)]
pub enum MissionWeatherError {
    #[error("{parameter} value {value} is outside the supported range {min}..={max}")]
    ValueOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error(transparent)]
    Miz(#[from] MizError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindLayer {
    /// Metres per second.
    pub speed: f64,
    /// Direction the wind blows towards, which is what DCS stores.
    pub dir: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fog {
    pub visibility: i64,
    pub thickness: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Precipitation {
    None = 0,
    Rain = 1,
    Thunderstorm = 2,
    Snow = 3,
    HeavySnow = 4,
}

impl Precipitation {
    /// Lowest cloud density at which DCS renders this precipitation.
    fn min_density(self) -> i64 {
        match self {
            Precipitation::None => 0,
            Precipitation::Rain | Precipitation::Snow | Precipitation::HeavySnow => 5,
            Precipitation::Thunderstorm => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clouds {
    pub base: i64,
    pub thickness: i64,
    pub density: i64,
    pub precipitation: Precipitation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionWeather {
    pub station: String,
    pub wind_ground: WindLayer,
    pub wind_2000: WindLayer,
    pub wind_8000: WindLayer,
    pub turbulence: i64,
    pub temperature: i64,
    pub qnh: i64,
    pub visibility: i64,
    pub fog: Option<Fog>,
    pub dust_density: Option<i64>,
    pub clouds: Clouds,
}

impl MissionWeather {
    pub fn from_metar(metar: &Metar) -> Result<Self, MissionWeatherError> {
        let (ground_speed, gust) = match &metar.wind {
            Some(w) => (w.speed_mps().unwrap_or(0.0), w.gust_mps()),
            None => (0.0, None),
        };
        check_range("wind speed", ground_speed, 0.0, MAX_GROUND_WIND_MPS)?;

        let from_dir = match &metar.wind {
            Some(w) => match (w.direction, w.variable_range) {
                (WindDirection::Degrees(d), _) => i64::from(d),
                (_, Some((a, b))) => i64::from(mid_bearing(a, b)),
                _ => 0,
            },
            None => 0,
        };
        let dir = (from_dir + 180) % 360;
        let layer = |factor: f64| WindLayer {
            speed: round2((ground_speed * factor).min(MAX_UPPER_WIND_MPS)),
            dir,
        };

        let turbulence = gust
            .map(|g| ((g - ground_speed).max(0.0) * 10.0).round() as i64)
            .unwrap_or(0);
        check_range(
            "turbulence",
            turbulence as f64,
            0.0,
            MAX_TURBULENCE as f64,
        )?;

        let temperature = metar
            .temperature
            .map(i64::from)
            .unwrap_or(DEFAULT_TEMPERATURE);
        check_range(
            "temperature",
            temperature as f64,
            TEMPERATURE_RANGE.0 as f64,
            TEMPERATURE_RANGE.1 as f64,
        )?;

        let qnh = metar
            .altimeter
            .map(|a| (a.hpa() * HPA_TO_MMHG).round() as i64)
            .unwrap_or(DEFAULT_QNH_MMHG);
        check_range(
            "QNH",
            qnh as f64,
            QNH_RANGE_MMHG.0 as f64,
            QNH_RANGE_MMHG.1 as f64,
        )?;

        let visibility = match metar.visibility.as_ref().and_then(|v| v.meters()) {
            Some(m) if m < 9_999.0 => (m.round() as i64).clamp(0, MAX_VISIBILITY_M),
            _ => MAX_VISIBILITY_M,
        };

        let fog = if metar.has_weather("FG") {
            Some(Fog {
                visibility: visibility.min(MAX_FOG_VISIBILITY_M),
                thickness: 300,
            })
        } else if metar.has_weather("BR") {
            Some(Fog {
                visibility: visibility.min(MAX_FOG_VISIBILITY_M),
                thickness: 100,
            })
        } else {
            None
        };

        let dust_density = ["DU", "SA", "DS", "SS"]
            .iter()
            .any(|c| metar.has_weather(c))
            .then(|| visibility.clamp(300, 3_000));

        Ok(Self {
            station: metar.station_id().to_string(),
            wind_ground: layer(1.0),
            wind_2000: layer(2.0),
            wind_8000: layer(3.0),
            turbulence,
            temperature,
            qnh,
            visibility,
            fog,
            dust_density,
            clouds: clouds_from(metar),
        })
    }

    /// Applies this weather to the mission in `from` and writes the result to `to`.
    ///
    /// Returns `Ok(false)` without writing anything when the mission carries no
    /// weather table.
    pub fn apply_to_miz(&self, from: &Path, to: &Path) -> Result<bool, MissionWeatherError> {
        let mut miz = Miz::open(from)?;

        let weather = miz
            .mission_mut()
            .table_mut()
            .and_then(|mission| mission.get_mut("weather"))
            .and_then(LuaValue::as_table_mut);
        let Some(weather) = weather else {
            warn!("Mission has no weather table; nothing applied — path={}", from.display());
            return Ok(false);
        };

        self.write_to(weather);
        miz.zip(Some(to))?;
        info!(
            "Weather applied — station={} from={} to={}",
            self.station,
            from.display(),
            to.display()
        );
        Ok(true)
    }

    /// Overwrites the static weather keys of a mission `weather` table.
    pub fn write_to(&self, weather: &mut LuaTable) {
        weather.set("atmosphere_type", 0i64);
        weather.set("type_weather", 0i64);
        weather.set("cyclones", LuaTable::new());
        weather.set("groundTurbulence", self.turbulence);
        weather.set("qnh", self.qnh);
        weather.table_mut("season").set("temperature", self.temperature);
        weather.table_mut("visibility").set("distance", self.visibility);

        let wind = weather.table_mut("wind");
        for (key, layer) in [
            ("atGround", &self.wind_ground),
            ("at2000", &self.wind_2000),
            ("at8000", &self.wind_8000),
        ] {
            let t = wind.table_mut(key);
            t.set("speed", layer.speed);
            t.set("dir", layer.dir);
        }

        weather.set("enable_fog", self.fog.is_some());
        let fog = self.fog.unwrap_or(Fog {
            visibility: 0,
            thickness: 0,
        });
        let fog_table = weather.table_mut("fog");
        fog_table.set("visibility", fog.visibility);
        fog_table.set("thickness", fog.thickness);

        weather.set("enable_dust", self.dust_density.is_some());
        weather.set("dust_density", self.dust_density.unwrap_or(0));

        let clouds = weather.table_mut("clouds");
        // presets override the legacy density model
        if clouds.remove("preset").is_some() {
            debug!("Dropped cloud preset in favour of METAR layers");
        }
        clouds.set("base", self.clouds.base);
        clouds.set("thickness", self.clouds.thickness);
        clouds.set("density", self.clouds.density);
        clouds.set("iprecptns", self.clouds.precipitation as i64);
    }
}

fn check_range(
    parameter: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), MissionWeatherError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MissionWeatherError::ValueOutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Bearing halfway through the clockwise sector `from`..`to`.
fn mid_bearing(from: u16, to: u16) -> u16 {
    let span = (i32::from(to) - i32::from(from)).rem_euclid(360);
    ((i32::from(from) + span / 2).rem_euclid(360)) as u16
}

fn clouds_from(metar: &Metar) -> Clouds {
    let layer = metar
        .sky
        .iter()
        .filter_map(|l| {
            let base = f64::from(l.height_ft()?) * FEET_TO_M;
            (base <= MAX_CLOUD_BASE_M).then_some((l, base))
        })
        .map(|(l, base)| {
            let (mut density, mut thickness) = match l.cover {
                SkyCover::Few => (2, 200),
                SkyCover::Scattered => (4, 400),
                SkyCover::Broken => (7, 800),
                SkyCover::Overcast => (9, 1_200),
                SkyCover::VerticalVisibility => (10, 300),
                _ => (0, 200),
            };
            if let Some(kind) = l.cloud_type {
                density = (density + 1).min(10);
                thickness = match kind {
                    CloudType::Cumulonimbus => 2_000,
                    CloudType::ToweringCumulus => thickness.max(1_500),
                };
            }
            (density, thickness, base)
        })
        // densest wins, the lower layer on ties
        .fold(None, |best: Option<(i64, i64, f64)>, cur| match best {
            Some(b) if b.0 >= cur.0 => Some(b),
            _ => Some(cur),
        });

    let (density, thickness, base) = layer.unwrap_or((0, 200, 0.0));
    let precipitation = precipitation_from(metar);
    let density = density.max(precipitation.min_density());

    Clouds {
        base: (base.round() as i64).max(MIN_CLOUD_BASE_M),
        thickness,
        density,
        precipitation,
    }
}

fn precipitation_from(metar: &Metar) -> Precipitation {
    if metar.has_weather("TS") {
        return Precipitation::Thunderstorm;
    }
    let snow = metar.weather.iter().find(|w| w.has("SN"));
    if let Some(group) = snow {
        return if group.intensity == Intensity::Heavy {
            Precipitation::HeavySnow
        } else {
            Precipitation::Snow
        };
    }
    if ["RA", "DZ", "SH"].iter().any(|c| metar.has_weather(c)) {
        return Precipitation::Rain;
    }
    Precipitation::None
}
