// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Entry points that turn a METAR string or a station code into an updated
//! mission file and report the outcome as an [`ApplyRecord`].
//!
//! No error leaves these functions: every failure is logged and folded into
//! the record as `status: failed`.

use crate::fetch::{FetchConfig, FetchError, MetarSource, NoaaClient, METAR_STATIONS_URL};
use crate::metar::Metar;
use crate::mission_weather::{MissionWeather, MissionWeatherError};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const APPLY_FAILED_MESSAGE: &str = "Unable to apply METAR string to the mission.\n\
This is most likely due to a freak value, this feature is still experimental.\n\
I will fix it ASAP !";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Outcome of one apply call. Keys only show up in JSON when they are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metar: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyRecord {
    fn new(from: &Path, to: &Path) -> Self {
        Self {
            from: from.display().to_string(),
            to: to.display().to_string(),
            ..Default::default()
        }
    }

    fn fail(&mut self, error: Option<String>) {
        self.status = Some(Status::Failed);
        if error.is_some() {
            self.error = error;
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(Status::Success)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize apply record: {}", e);
            serde_json::json!({
                "from": self.from,
                "to": self.to,
                "status": "failed",
                "error": e.to_string(),
            })
            .to_string()
        })
    }
}

/// Writes a parsed METAR into a mission file.
pub trait WeatherApplier {
    /// `Ok(false)` means nothing was applied and no error is worth reporting.
    fn apply(&self, metar: &Metar, from: &Path, to: &Path) -> Result<bool, MissionWeatherError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MissionWeatherApplier;

impl WeatherApplier for MissionWeatherApplier {
    fn apply(&self, metar: &Metar, from: &Path, to: &Path) -> Result<bool, MissionWeatherError> {
        MissionWeather::from_metar(metar)?.apply_to_miz(from, to)
    }
}

pub fn station_not_found_message(station: &str) -> String {
    format!(
        "unable to obtain METAR for station {}\nGo to \"{}\" for a list of valid stations",
        station, METAR_STATIONS_URL
    )
}

/// Parses `metar_str` and hands it to `applier`.
pub fn apply_metar_string<A: WeatherApplier + ?Sized>(
    applier: &A,
    metar_str: &str,
    from: &Path,
    to: &Path,
) -> ApplyRecord {
    let mut record = ApplyRecord {
        metar: Some(metar_str.to_string()),
        ..ApplyRecord::new(from, to)
    };

    let metar = match Metar::parse(metar_str) {
        Ok(metar) => metar,
        Err(e) => {
            error!("failed to parse METAR from string: {} ({})", metar_str, e);
            record.fail(None);
            return record;
        }
    };

    record.icao = Some(metar.station_id().to_string());
    debug!("METAR: {}", metar.code());
    debug!("applying metar: {} -> {}", from.display(), to.display());

    match applier.apply(&metar, from, to) {
        Ok(true) => record.status = Some(Status::Success),
        Ok(false) => {
            warn!(
                "Weather applier reported nothing applied; status left unset — from={}",
                from.display()
            );
        }
        Err(e @ MissionWeatherError::ValueOutOfRange { .. }) => {
            warn!("METAR rejected by mission weather: {}", e);
            record.fail(Some(APPLY_FAILED_MESSAGE.to_string()));
        }
        Err(e) => {
            error!(
                "Unexpected error while applying METAR — from={} to={} error={}",
                from.display(),
                to.display(),
                e
            );
            record.fail(Some(e.to_string()));
        }
    }

    record
}

/// Both entry points over a pluggable report source and weather applier.
#[derive(Debug)]
pub struct WeatherService<S, A> {
    source: S,
    applier: A,
}

impl<S: MetarSource, A: WeatherApplier> WeatherService<S, A> {
    pub fn new(source: S, applier: A) -> Self {
        Self { source, applier }
    }

    pub fn apply_metar_str(&self, metar_str: &str, from: &Path, to: &Path) -> ApplyRecord {
        apply_metar_string(&self.applier, metar_str, from, to)
    }

    pub fn apply_station_record(&self, station: &str, from: &Path, to: &Path) -> ApplyRecord {
        debug!("getting METAR for {}", station);
        let mut record = ApplyRecord {
            icao: Some(station.to_string()),
            ..ApplyRecord::new(from, to)
        };

        match self.source.fetch_metar(station) {
            Ok(metar_str) => apply_metar_string(&self.applier, &metar_str, from, to),
            Err(FetchError::NotFound { url, .. }) => {
                warn!("No METAR available — station={} url={}", station, url);
                record.fail(Some(station_not_found_message(station)));
                record
            }
            Err(e) => {
                error!("Failed to fetch METAR — station={} error={}", station, e);
                record.fail(Some(e.to_string()));
                record
            }
        }
    }

    /// Same as [`Self::apply_station_record`], serialized to JSON.
    pub fn apply_station(&self, station: &str, from: &Path, to: &Path) -> String {
        self.apply_station_record(station, from, to).to_json()
    }
}

/// Applies a known METAR string to `from` and writes `to`.
pub fn set_weather_from_metar_str<P: AsRef<Path>, Q: AsRef<Path>>(
    metar_str: &str,
    from: P,
    to: Q,
) -> ApplyRecord {
    apply_metar_string(&MissionWeatherApplier, metar_str, from.as_ref(), to.as_ref())
}

/// Fetches the current METAR for `station` from NOAA and applies it; returns JSON.
pub fn set_weather_from_icao<P: AsRef<Path>, Q: AsRef<Path>>(station: &str, from: P, to: Q) -> String {
    set_weather_from_icao_with(&FetchConfig::default(), station, from, to)
}

pub fn set_weather_from_icao_with<P: AsRef<Path>, Q: AsRef<Path>>(
    config: &FetchConfig,
    station: &str,
    from: P,
    to: Q,
) -> String {
    set_weather_from_icao_record(config, station, from, to).to_json()
}

/// Station flow returning the record itself; a client that cannot be built
/// is reported like any other fetch failure.
pub fn set_weather_from_icao_record<P: AsRef<Path>, Q: AsRef<Path>>(
    config: &FetchConfig,
    station: &str,
    from: P,
    to: Q,
) -> ApplyRecord {
    let (from, to) = (from.as_ref(), to.as_ref());
    match NoaaClient::new(config.clone()) {
        Ok(client) => {
            WeatherService::new(client, MissionWeatherApplier).apply_station_record(station, from, to)
        }
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            let mut record = ApplyRecord {
                icao: Some(station.to_string()),
                ..ApplyRecord::new(from, to)
            };
            record.fail(Some(e.to_string()));
            record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miz::MizError;

    #[test]
    fn test_record_skips_unset_keys() {
        let record = ApplyRecord::new(Path::new("in.miz"), Path::new("out.miz"));
        assert_eq!(record.to_json(), r#"{"from":"in.miz","to":"out.miz"}"#);
    }

    #[test]
    fn test_record_status_lowercase() {
        let mut record = ApplyRecord::new(Path::new("in.miz"), Path::new("out.miz"));
        record.icao = Some("UGTB".to_string());
        record.fail(Some("boom".to_string()));

        let value: serde_json::Value = serde_json::from_str(&record.to_json()).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "boom");
        assert_eq!(value["icao"], "UGTB");
        assert!(value.get("metar").is_none());
    }

    #[test]
    fn test_fail_without_message_keeps_error_absent() {
        let mut record = ApplyRecord::default();
        record.fail(None);
        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(record.error, None);
        assert!(!record.is_success());
    }

    #[test]
    fn test_station_not_found_message_is_complete() {
        let msg = station_not_found_message("XXXX");
        assert!(msg.starts_with("unable to obtain METAR for station XXXX\n"));
        assert!(msg.contains(METAR_STATIONS_URL));
    }

    #[test]
    fn test_apply_failed_message_has_all_lines() {
        assert_eq!(APPLY_FAILED_MESSAGE.lines().count(), 3);
    }

    const UGTB: &str = "UGTB 181200Z 27010KT 9999 FEW030 18/09 Q1016 NOSIG";

    enum StubSource {
        Report(&'static str),
        Missing,
        Empty,
    }

    impl MetarSource for StubSource {
        fn fetch_metar(&self, station: &str) -> Result<String, FetchError> {
            match self {
                StubSource::Report(report) => Ok(report.to_string()),
                StubSource::Missing => Err(FetchError::NotFound {
                    kind: crate::fetch::ReportKind::Metar,
                    station: station.to_string(),
                    url: format!("http://stub/{}.TXT", station),
                }),
                StubSource::Empty => Err(FetchError::EmptyReport {
                    kind: crate::fetch::ReportKind::Metar,
                    station: station.to_string(),
                }),
            }
        }
    }

    #[derive(Clone, Copy)]
    enum StubApplier {
        Applied,
        Nothing,
        OutOfRange,
        BrokenMission,
    }

    impl WeatherApplier for StubApplier {
        fn apply(&self, _metar: &Metar, from: &Path, _to: &Path) -> Result<bool, MissionWeatherError> {
            match self {
                StubApplier::Applied => Ok(true),
                StubApplier::Nothing => Ok(false),
                StubApplier::OutOfRange => Err(MissionWeatherError::ValueOutOfRange {
                    parameter: "wind speed",
                    value: 77.0,
                    min: 0.0,
                    max: 50.0,
                }),
                StubApplier::BrokenMission => {
                    Err(MizError::NotFound(from.to_path_buf()).into())
                }
            }
        }
    }

    fn run(applier: StubApplier, metar: &str) -> ApplyRecord {
        apply_metar_string(&applier, metar, Path::new("in.miz"), Path::new("out.miz"))
    }

    #[test]
    fn test_apply_success() {
        let record = run(StubApplier::Applied, UGTB);
        assert!(record.is_success());
        assert_eq!(record.icao.as_deref(), Some("UGTB"));
        assert_eq!(record.metar.as_deref(), Some(UGTB));
        assert_eq!(record.from, "in.miz");
        assert_eq!(record.to, "out.miz");
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_unparseable_metar_fails_without_icao() {
        let record = run(StubApplier::Applied, "not a metar at all");
        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(record.icao, None);
        assert_eq!(record.error, None);
        assert_eq!(record.metar.as_deref(), Some("not a metar at all"));
    }

    #[test]
    fn test_applier_returning_false_leaves_status_unset() {
        let record = run(StubApplier::Nothing, UGTB);
        assert_eq!(record.status, None);
        assert_eq!(record.icao.as_deref(), Some("UGTB"));
        assert!(!record.to_json().contains("status"));
    }

    #[test]
    fn test_out_of_range_uses_apply_failed_message() {
        let record = run(StubApplier::OutOfRange, UGTB);
        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(record.error.as_deref(), Some(APPLY_FAILED_MESSAGE));
    }

    #[test]
    fn test_unexpected_error_is_reported_not_raised() {
        let record = run(StubApplier::BrokenMission, UGTB);
        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(record.error.as_deref(), Some("mission file not found: in.miz"));
    }

    #[test]
    fn test_station_flow_delegates_to_metar_string() {
        let service = WeatherService::new(StubSource::Report(UGTB), StubApplier::Applied);
        let value: serde_json::Value = serde_json::from_str(&service.apply_station(
            "UGTB",
            Path::new("in.miz"),
            Path::new("out.miz"),
        ))
        .unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["metar"], UGTB);
        assert_eq!(value["icao"], "UGTB");
    }

    #[test]
    fn test_station_not_found() {
        let service = WeatherService::new(StubSource::Missing, StubApplier::Applied);
        let record = service.apply_station_record("XXXX", Path::new("in.miz"), Path::new("out.miz"));

        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(record.icao.as_deref(), Some("XXXX"));
        assert_eq!(record.metar, None);
        assert_eq!(record.error, Some(station_not_found_message("XXXX")));
    }

    #[test]
    fn test_station_other_fetch_error_keeps_error_text() {
        let service = WeatherService::new(StubSource::Empty, StubApplier::Applied);
        let record = service.apply_station_record("UGTB", Path::new("in.miz"), Path::new("out.miz"));

        assert_eq!(record.status, Some(Status::Failed));
        assert_eq!(
            record.error.as_deref(),
            Some("METAR response for station UGTB carries no report line")
        );
    }

    #[test]
    fn test_service_metar_str_matches_free_function() {
        let service = WeatherService::new(StubSource::Missing, StubApplier::Applied);
        let record = service.apply_metar_str(UGTB, Path::new("in.miz"), Path::new("out.miz"));
        assert_eq!(record, run(StubApplier::Applied, UGTB));
    }
}
