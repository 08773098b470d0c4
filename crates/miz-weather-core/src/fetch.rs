// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://tgftp.nws.noaa.gov";
pub const TAF_PATH: &str = "/data/forecasts/taf/stations/{station}.TXT";
pub const METAR_PATH: &str = "/data/observations/metar/stations/{station}.TXT";

/// Where users can browse the list of stations the feed knows about.
pub const METAR_STATIONS_URL: &str = "http://tgftp.nws.noaa.gov/data/observations/metar/stations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Taf,
    Metar,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Taf => write!(f, "TAF"),
            ReportKind::Metar => write!(f, "METAR"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unable to obtain {kind} for station {station} from url: {url}")]
    NotFound {
        kind: ReportKind,
        station: String,
        url: String,
    },
    #[error("{kind} response for station {station} carries no report line")]
    EmptyReport { kind: ReportKind, station: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout unless set; a stalled server stalls the caller.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

/// Anything that can hand out a raw METAR line for a station.
pub trait MetarSource {
    fn fetch_metar(&self, station: &str) -> Result<String, FetchError>;
}

/// Blocking client for the NOAA plain-text report feed.
pub struct NoaaClient {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl NoaaClient {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::blocking::Client::builder().timeout(None);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetchConfig::default())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn taf_url(&self, station: &str) -> String {
        build_url(&self.config.base_url, TAF_PATH, station)
    }

    pub fn metar_url(&self, station: &str) -> String {
        build_url(&self.config.base_url, METAR_PATH, station)
    }

    /// Fetches the TAF for `station`: every line after the timestamp header.
    pub fn fetch_taf(&self, station: &str) -> Result<String, FetchError> {
        let url = self.taf_url(station);
        let body = self.get(ReportKind::Taf, station, &url)?;
        Ok(taf_body(&body))
    }

    /// Fetches the METAR for `station`: only the line right after the header.
    pub fn fetch_metar(&self, station: &str) -> Result<String, FetchError> {
        let url = self.metar_url(station);
        let body = self.get(ReportKind::Metar, station, &url)?;
        metar_line(&body).ok_or_else(|| FetchError::EmptyReport {
            kind: ReportKind::Metar,
            station: station.to_string(),
        })
    }

    fn get(&self, kind: ReportKind, station: &str, url: &str) -> Result<String, FetchError> {
        info!("Fetching {} — station={} url={}", kind, station, url);
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} request rejected — station={} status={}", kind, station, status);
            return Err(FetchError::NotFound {
                kind,
                station: station.to_string(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        debug!("{} response received — station={} bytes={}", kind, station, body.len());
        Ok(body)
    }
}

impl MetarSource for NoaaClient {
    fn fetch_metar(&self, station: &str) -> Result<String, FetchError> {
        NoaaClient::fetch_metar(self, station)
    }
}

fn build_url(base_url: &str, template: &str, station: &str) -> String {
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        template.replace("{station}", station)
    )
}

/// Drops the timestamp header and keeps the rest of the body.
pub fn taf_body(body: &str) -> String {
    body.split('\n').skip(1).collect::<Vec<_>>().join("\n")
}

/// Returns line 1 (zero-indexed) of the body, if there is one.
pub fn metar_line(body: &str) -> Option<String> {
    body.split('\n').nth(1).map(|line| line.to_string())
}
