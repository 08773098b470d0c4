// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Live METAR weather for DCS World mission files.
//!
//! Reports come from the NOAA text feed ([`fetch`]), are parsed into a
//! [`Metar`] ([`metar`]), mapped onto the mission weather table
//! ([`mission_weather`]) and written back into a copy of the `.miz`
//! archive ([`miz`], [`lua`]). [`apply`] ties it together and never
//! returns an error to the caller. [`mission_time`] sets the mission start
//! date and time the same way.

pub mod apply;
pub mod fetch;
pub mod lua;
pub mod metar;
pub mod miz;
pub mod mission_time;
pub mod mission_weather;

pub use apply::{
    apply_metar_string, set_weather_from_icao, set_weather_from_icao_record,
    set_weather_from_icao_with, set_weather_from_metar_str, ApplyRecord, MissionWeatherApplier,
    Status, WeatherApplier, WeatherService, APPLY_FAILED_MESSAGE,
};
pub use fetch::{FetchConfig, FetchError, MetarSource, NoaaClient, ReportKind};
pub use metar::{Metar, MetarError};
pub use miz::{Miz, MizError};
pub use mission_time::{MissionTime, MissionTimeError};
pub use mission_weather::{MissionWeather, MissionWeatherError};
