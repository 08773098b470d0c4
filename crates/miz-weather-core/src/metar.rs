// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! METAR decoding.
//!
//! Reports are split on whitespace and every group is matched with a small
//! `nom` parser. Groups are accepted in any order after the station and time,
//! except that everything from the first trend or remark marker onwards is
//! kept verbatim as the report tail.

use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_while1, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, success, value, verify},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const KNOT_TO_MPS: f64 = 0.514_444;
const STATUTE_MILE_TO_M: f64 = 1_609.344;
const INHG_TO_HPA: f64 = 33.863_9;

const DESCRIPTORS: &[&str] = &["MI", "PR", "BC", "DR", "BL", "SH", "TS", "FZ"];
const PHENOMENA: &[&str] = &[
    "DZ", "RA", "SN", "SG", "IC", "PL", "GR", "GS", "UP", "BR", "FG", "FU", "VA", "DU", "SA",
    "HZ", "PY", "PO", "SQ", "FC", "SS", "DS",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetarError {
    #[error("empty METAR string")]
    Empty,
    #[error("invalid station identifier: '{0}'")]
    Station(String),
    #[error("missing or invalid observation time: '{0}'")]
    Time(String),
    #[error("unparsed group: '{0}'")]
    Unparsed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}Z", self.day, self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedUnit {
    Knots,
    MetersPerSecond,
    KilometersPerHour,
}

impl SpeedUnit {
    fn to_mps(self, value: f64) -> f64 {
        match self {
            SpeedUnit::Knots => value * KNOT_TO_MPS,
            SpeedUnit::MetersPerSecond => value,
            SpeedUnit::KilometersPerHour => value / 3.6,
        }
    }

    fn code(self) -> &'static str {
        match self {
            SpeedUnit::Knots => "KT",
            SpeedUnit::MetersPerSecond => "MPS",
            SpeedUnit::KilometersPerHour => "KMH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindDirection {
    Degrees(u16),
    Variable,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub direction: WindDirection,
    pub speed: Option<u16>,
    pub gust: Option<u16>,
    pub unit: SpeedUnit,
    /// Extreme directions of a `dddVddd` group.
    pub variable_range: Option<(u16, u16)>,
}

impl Wind {
    pub fn speed_mps(&self) -> Option<f64> {
        self.speed.map(|s| self.unit.to_mps(f64::from(s)))
    }

    pub fn gust_mps(&self) -> Option<f64> {
        self.gust.map(|g| self.unit.to_mps(f64::from(g)))
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            WindDirection::Degrees(d) => write!(f, "{:03}", d)?,
            WindDirection::Variable => write!(f, "VRB")?,
            WindDirection::Missing => write!(f, "///")?,
        }
        match self.speed {
            Some(s) => write!(f, "{:02}", s)?,
            None => write!(f, "//")?,
        }
        if let Some(g) = self.gust {
            write!(f, "G{:02}", g)?;
        }
        write!(f, "{}", self.unit.code())?;
        if let Some((from, to)) = self.variable_range {
            write!(f, " {:03}V{:03}", from, to)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Visibility {
    Cavok,
    /// `////` from an automatic station.
    NotReported,
    Meters {
        distance: u32,
        suffix: Option<String>,
    },
    /// `text` is the group as written, without the `SM` unit.
    StatuteMiles { miles: f64, text: String },
}

impl Visibility {
    pub fn meters(&self) -> Option<f64> {
        match self {
            Visibility::Cavok | Visibility::NotReported => None,
            Visibility::Meters { distance, .. } => Some(f64::from(*distance)),
            Visibility::StatuteMiles { miles, .. } => Some(miles * STATUTE_MILE_TO_M),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Cavok => write!(f, "CAVOK"),
            Visibility::NotReported => write!(f, "////"),
            Visibility::Meters { distance, suffix } => {
                write!(f, "{:04}{}", distance, suffix.as_deref().unwrap_or(""))
            }
            Visibility::StatuteMiles { text, .. } => write!(f, "{}SM", text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
    Vicinity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherGroup {
    pub intensity: Intensity,
    pub descriptor: Option<String>,
    pub phenomena: Vec<String>,
}

impl WeatherGroup {
    /// True when the descriptor or any phenomenon matches `code`.
    pub fn has(&self, code: &str) -> bool {
        self.descriptor.as_deref() == Some(code) || self.phenomena.iter().any(|p| p == code)
    }

    /// `//`: present weather not reported by an automatic station.
    pub fn is_not_reported(&self) -> bool {
        self.descriptor.is_none() && self.phenomena.is_empty()
    }
}

impl fmt::Display for WeatherGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.intensity {
            Intensity::Light => "-",
            Intensity::Moderate => "",
            Intensity::Heavy => "+",
            Intensity::Vicinity => "VC",
        };
        if self.is_not_reported() {
            return write!(f, "//");
        }
        write!(f, "{}", prefix)?;
        if let Some(d) = &self.descriptor {
            write!(f, "{}", d)?;
        }
        for p in &self.phenomena {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkyCover {
    SkyClear,
    Clear,
    NoSignificantCloud,
    NoCloudDetected,
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
    /// `///` cover from an automatic station.
    NotReported,
}

impl SkyCover {
    fn code(self) -> &'static str {
        match self {
            SkyCover::SkyClear => "SKC",
            SkyCover::Clear => "CLR",
            SkyCover::NoSignificantCloud => "NSC",
            SkyCover::NoCloudDetected => "NCD",
            SkyCover::Few => "FEW",
            SkyCover::Scattered => "SCT",
            SkyCover::Broken => "BKN",
            SkyCover::Overcast => "OVC",
            SkyCover::VerticalVisibility => "VV",
            SkyCover::NotReported => "///",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "SKC" => SkyCover::SkyClear,
            "CLR" => SkyCover::Clear,
            "NSC" => SkyCover::NoSignificantCloud,
            "NCD" => SkyCover::NoCloudDetected,
            "FEW" => SkyCover::Few,
            "SCT" => SkyCover::Scattered,
            "BKN" => SkyCover::Broken,
            "OVC" => SkyCover::Overcast,
            "VV" => SkyCover::VerticalVisibility,
            _ => return None,
        })
    }

    fn has_height(self) -> bool {
        matches!(
            self,
            SkyCover::Few
                | SkyCover::Scattered
                | SkyCover::Broken
                | SkyCover::Overcast
                | SkyCover::VerticalVisibility
                | SkyCover::NotReported
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloudType {
    Cumulonimbus,
    ToweringCumulus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkyLayer {
    pub cover: SkyCover,
    /// Hundreds of feet above ground.
    pub height: Option<u32>,
    pub cloud_type: Option<CloudType>,
}

impl SkyLayer {
    pub fn height_ft(&self) -> Option<u32> {
        self.height.map(|h| h * 100)
    }
}

impl fmt::Display for SkyLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cover.code())?;
        if self.cover.has_height() {
            match self.height {
                Some(h) => write!(f, "{:03}", h)?,
                None => write!(f, "///")?,
            }
        }
        match self.cloud_type {
            Some(CloudType::Cumulonimbus) => write!(f, "CB"),
            Some(CloudType::ToweringCumulus) => write!(f, "TCU"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Altimeter {
    Hectopascals(u16),
    /// Hundredths of an inch of mercury.
    InchesHg(u16),
}

impl Altimeter {
    pub fn hpa(&self) -> f64 {
        match self {
            Altimeter::Hectopascals(v) => f64::from(*v),
            Altimeter::InchesHg(v) => f64::from(*v) / 100.0 * INHG_TO_HPA,
        }
    }
}

impl fmt::Display for Altimeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Altimeter::Hectopascals(v) => write!(f, "Q{:04}", v),
            Altimeter::InchesHg(v) => write!(f, "A{:04}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metar {
    pub report_type: Option<String>,
    pub station: String,
    pub time: ObservationTime,
    pub modifiers: Vec<String>,
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    /// Lowest visibility and its direction, when it differs from the prevailing one.
    pub min_visibility: Option<Visibility>,
    pub runway_ranges: Vec<String>,
    pub weather: Vec<WeatherGroup>,
    pub sky: Vec<SkyLayer>,
    pub temperature: Option<i8>,
    pub dew_point: Option<i8>,
    pub altimeter: Option<Altimeter>,
    /// Trend and remark groups, verbatim.
    pub tail: Option<String>,
}

impl Metar {
    pub fn parse(input: &str) -> Result<Self, MetarError> {
        let tokens: Vec<&str> = input.trim().trim_end_matches('=').split_whitespace().collect();
        if tokens.is_empty() {
            return Err(MetarError::Empty);
        }
        let mut i = 0;

        let mut report_type = None;
        if tokens[i] == "METAR" || tokens[i] == "SPECI" {
            report_type = Some(tokens[i].to_string());
            i += 1;
        }

        let mut modifiers = Vec::new();
        if tokens.get(i) == Some(&"COR") {
            modifiers.push("COR".to_string());
            i += 1;
        }

        let station = match tokens.get(i) {
            Some(tok) if all_consuming(station_id)(*tok).is_ok() => tok.to_string(),
            Some(tok) => return Err(MetarError::Station(tok.to_string())),
            None => return Err(MetarError::Station(String::new())),
        };
        i += 1;

        let time = match tokens.get(i).map(|tok| all_consuming(observation_time)(*tok)) {
            Some(Ok((_, time))) => time,
            _ => {
                return Err(MetarError::Time(
                    tokens.get(i).map(|t| t.to_string()).unwrap_or_default(),
                ))
            }
        };
        i += 1;

        while let Some(tok) = tokens.get(i) {
            if matches!(*tok, "AUTO" | "COR" | "NIL") {
                modifiers.push(tok.to_string());
                i += 1;
            } else {
                break;
            }
        }

        let mut metar = Metar {
            report_type,
            station,
            time,
            modifiers,
            wind: None,
            visibility: None,
            min_visibility: None,
            runway_ranges: Vec::new(),
            weather: Vec::new(),
            sky: Vec::new(),
            temperature: None,
            dew_point: None,
            altimeter: None,
            tail: None,
        };

        while i < tokens.len() {
            let tok = tokens[i];

            if is_tail_marker(tok) {
                metar.tail = Some(tokens[i..].join(" "));
                break;
            }

            if metar.wind.is_none() && metar.visibility.is_none() {
                if let Ok((_, wind)) = all_consuming(wind)(tok) {
                    metar.wind = Some(wind);
                    i += 1;
                    continue;
                }
            }

            if let Some(w) = metar.wind.as_mut() {
                if w.variable_range.is_none() {
                    if let Ok((_, range)) = all_consuming(variable_sector)(tok) {
                        w.variable_range = Some(range);
                        i += 1;
                        continue;
                    }
                }
            }

            if metar.visibility.is_none() {
                // "1 1/2SM" spans two groups
                if let Some(next) = tokens.get(i + 1) {
                    if let Ok((_, vis)) = all_consuming(split_statute_miles(tok))(*next) {
                        metar.visibility = Some(vis);
                        i += 2;
                        continue;
                    }
                }
                if let Ok((_, vis)) = all_consuming(visibility)(tok) {
                    metar.visibility = Some(vis);
                    i += 1;
                    continue;
                }
            }

            if metar.visibility.is_some() && metar.min_visibility.is_none() {
                if let Ok((_, vis)) = all_consuming(directional_visibility)(tok) {
                    metar.min_visibility = Some(vis);
                    i += 1;
                    continue;
                }
            }

            if all_consuming(runway_range)(tok).is_ok() {
                metar.runway_ranges.push(tok.to_string());
                i += 1;
                continue;
            }

            if let Ok((_, group)) = all_consuming(weather_group)(tok) {
                metar.weather.push(group);
                i += 1;
                continue;
            }

            if let Ok((_, layer)) = all_consuming(sky_layer)(tok) {
                metar.sky.push(layer);
                i += 1;
                continue;
            }

            if metar.temperature.is_none() {
                if let Ok((_, (temp, dew))) = all_consuming(temperatures)(tok) {
                    metar.temperature = Some(temp);
                    metar.dew_point = dew;
                    i += 1;
                    continue;
                }
            }

            if metar.altimeter.is_none() {
                if let Ok((_, alt)) = all_consuming(altimeter)(tok) {
                    metar.altimeter = Some(alt);
                    i += 1;
                    continue;
                }
            }

            return Err(MetarError::Unparsed(tok.to_string()));
        }

        Ok(metar)
    }

    pub fn station_id(&self) -> &str {
        &self.station
    }

    /// Canonical re-encoding of the decoded groups.
    pub fn code(&self) -> String {
        let mut groups: Vec<String> = Vec::new();
        groups.extend(self.report_type.iter().cloned());
        groups.push(self.station.clone());
        groups.push(self.time.to_string());
        groups.extend(self.modifiers.iter().cloned());
        groups.extend(self.wind.iter().map(|w| w.to_string()));
        groups.extend(self.visibility.iter().map(|v| v.to_string()));
        groups.extend(self.min_visibility.iter().map(|v| v.to_string()));
        groups.extend(self.runway_ranges.iter().cloned());
        groups.extend(self.weather.iter().map(|w| w.to_string()));
        groups.extend(self.sky.iter().map(|s| s.to_string()));
        if let Some(t) = self.temperature {
            let dew = self.dew_point.map(format_temperature).unwrap_or_default();
            groups.push(format!("{}/{}", format_temperature(t), dew));
        }
        groups.extend(self.altimeter.iter().map(|a| a.to_string()));
        groups.extend(self.tail.iter().cloned());
        groups.join(" ")
    }

    pub fn is_cavok(&self) -> bool {
        matches!(self.visibility, Some(Visibility::Cavok))
    }

    pub fn has_weather(&self, code: &str) -> bool {
        self.weather.iter().any(|w| w.has(code))
    }
}

impl FromStr for Metar {
    type Err = MetarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metar::parse(s)
    }
}

impl fmt::Display for Metar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn format_temperature(t: i8) -> String {
    if t < 0 {
        format!("M{:02}", -i16::from(t))
    } else {
        format!("{:02}", t)
    }
}

fn is_tail_marker(tok: &str) -> bool {
    matches!(tok, "RMK" | "NOSIG" | "TEMPO" | "BECMG" | "WS")
        || (tok.len() > 2 && tok.starts_with("RE") && tok[2..].chars().all(|c| c.is_ascii_uppercase()))
}

fn number<'a, T: FromStr>(min: usize, max: usize) -> impl FnMut(&'a str) -> IResult<&'a str, T> {
    map_res(
        take_while_m_n(min, max, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<T>(),
    )
}

fn code_from<'a>(codes: &'static [&'static str]) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(take(2usize), move |c: &str| codes.iter().any(|code| *code == c))
}

fn station_id(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while_m_n(1, 1, |c: char| c.is_ascii_uppercase()),
        take_while_m_n(3, 3, |c: char| c.is_ascii_uppercase() || c.is_ascii_digit()),
    ))(input)
}

fn observation_time(input: &str) -> IResult<&str, ObservationTime> {
    map(
        tuple((
            verify(number::<u8>(2, 2), |d: &u8| (1..=31).contains(d)),
            verify(number::<u8>(2, 2), |h: &u8| *h <= 23),
            verify(number::<u8>(2, 2), |m: &u8| *m <= 59),
            char('Z'),
        )),
        |(day, hour, minute, _)| ObservationTime { day, hour, minute },
    )(input)
}

fn speed_unit(input: &str) -> IResult<&str, SpeedUnit> {
    alt((
        value(SpeedUnit::Knots, tag("KT")),
        value(SpeedUnit::MetersPerSecond, tag("MPS")),
        value(SpeedUnit::KilometersPerHour, tag("KMH")),
    ))(input)
}

fn wind(input: &str) -> IResult<&str, Wind> {
    let missing = map(pair(tag("/////"), speed_unit), |(_, unit)| Wind {
        direction: WindDirection::Missing,
        speed: None,
        gust: None,
        unit,
        variable_range: None,
    });
    let reported = map(
        tuple((
            alt((
                value(WindDirection::Variable, tag("VRB")),
                map(verify(number::<u16>(3, 3), |d: &u16| *d <= 360), WindDirection::Degrees),
            )),
            number::<u16>(2, 3),
            opt(preceded(char('G'), number::<u16>(2, 3))),
            speed_unit,
        )),
        |(direction, speed, gust, unit)| Wind {
            direction,
            speed: Some(speed),
            gust,
            unit,
            variable_range: None,
        },
    );
    alt((missing, reported))(input)
}

fn variable_sector(input: &str) -> IResult<&str, (u16, u16)> {
    map(
        tuple((number::<u16>(3, 3), char('V'), number::<u16>(3, 3))),
        |(from, _, to)| (from, to),
    )(input)
}

fn compass_suffix(input: &str) -> IResult<&str, &str> {
    alt((
        tag("NDV"),
        tag("NE"),
        tag("NW"),
        tag("SE"),
        tag("SW"),
        tag("N"),
        tag("E"),
        tag("S"),
        tag("W"),
    ))(input)
}

fn fraction(input: &str) -> IResult<&str, f64> {
    map(
        tuple((
            number::<u32>(1, 2),
            char('/'),
            verify(number::<u32>(1, 2), |d: &u32| *d > 0),
        )),
        |(n, _, d)| f64::from(n) / f64::from(d),
    )(input)
}

fn statute_miles(input: &str) -> IResult<&str, Visibility> {
    let (rest, text) = recognize(pair(
        opt(one_of("MP")),
        alt((recognize(fraction), take_while1(|c: char| c.is_ascii_digit()))),
    ))(input)?;
    let (rest, _) = tag("SM")(rest)?;
    let digits = text.trim_start_matches(&['M', 'P'][..]);
    let (_, miles) = alt((fraction, number::<f64>(1, 3)))(digits)?;
    Ok((
        rest,
        Visibility::StatuteMiles {
            miles,
            text: text.to_string(),
        },
    ))
}

/// Parses the fractional half of a `1 1/2SM` pair, `whole` being the group before it.
fn split_statute_miles<'a>(whole: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, Visibility> {
    move |input: &'a str| {
        let whole_miles: u32 = match all_consuming(number::<u32>(1, 2))(whole) {
            Ok((_, w)) => w,
            Err(e) => return Err(e),
        };
        let (after, part) = fraction(input)?;
        let written = &input[..input.len() - after.len()];
        let (rest, _) = tag("SM")(after)?;
        Ok((
            rest,
            Visibility::StatuteMiles {
                miles: f64::from(whole_miles) + part,
                text: format!("{} {}", whole, written),
            },
        ))
    }
}

fn visibility(input: &str) -> IResult<&str, Visibility> {
    alt((
        value(Visibility::Cavok, tag("CAVOK")),
        value(Visibility::NotReported, tag("////")),
        map(
            pair(number::<u32>(4, 4), opt(compass_suffix)),
            |(distance, suffix)| Visibility::Meters {
                distance,
                suffix: suffix.map(str::to_string),
            },
        ),
        statute_miles,
    ))(input)
}

/// `1500SW`: metres plus a compass direction, no `NDV`.
fn directional_visibility(input: &str) -> IResult<&str, Visibility> {
    map(
        pair(
            number::<u32>(4, 4),
            verify(compass_suffix, |s: &str| s != "NDV"),
        ),
        |(distance, suffix)| Visibility::Meters {
            distance,
            suffix: Some(suffix.to_string()),
        },
    )(input)
}

fn runway_range(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('R'),
        take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
        opt(one_of("LCR")),
        char('/'),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '/'),
    )))(input)
}

fn weather_group(input: &str) -> IResult<&str, WeatherGroup> {
    let not_reported = value(
        WeatherGroup {
            intensity: Intensity::Moderate,
            descriptor: None,
            phenomena: Vec::new(),
        },
        tag("//"),
    );
    let reported = verify(
        map(
            tuple((
                alt((
                    value(Intensity::Light, char('-')),
                    value(Intensity::Heavy, char('+')),
                    value(Intensity::Vicinity, tag("VC")),
                    success(Intensity::Moderate),
                )),
                opt(code_from(DESCRIPTORS)),
                many0(code_from(PHENOMENA)),
            )),
            |(intensity, descriptor, phenomena)| WeatherGroup {
                intensity,
                descriptor: descriptor.map(str::to_string),
                phenomena: phenomena.into_iter().map(str::to_string).collect(),
            },
        ),
        |g: &WeatherGroup| !g.is_not_reported(),
    );
    alt((not_reported, reported))(input)
}

fn sky_layer(input: &str) -> IResult<&str, SkyLayer> {
    let clear = map(
        alt((tag("SKC"), tag("CLR"), tag("NSC"), tag("NCD"))),
        |code: &str| SkyLayer {
            cover: SkyCover::from_code(code).unwrap_or(SkyCover::Clear),
            height: None,
            cloud_type: None,
        },
    );
    let layered = map(
        tuple((
            alt((
                tag("FEW"),
                tag("SCT"),
                tag("BKN"),
                tag("OVC"),
                tag("VV"),
                tag("///"),
            )),
            alt((map(number::<u32>(3, 3), Some), value(None, tag("///")))),
            opt(alt((
                value(CloudType::Cumulonimbus, tag("CB")),
                value(CloudType::ToweringCumulus, tag("TCU")),
            ))),
            opt(tag("///")),
        )),
        |(code, height, cloud_type, _)| SkyLayer {
            cover: SkyCover::from_code(code).unwrap_or(SkyCover::NotReported),
            height,
            cloud_type,
        },
    );
    alt((clear, layered))(input)
}

fn temperature(input: &str) -> IResult<&str, i8> {
    map(pair(opt(char('M')), number::<i8>(2, 2)), |(minus, t)| {
        if minus.is_some() {
            -t
        } else {
            t
        }
    })(input)
}

fn temperatures(input: &str) -> IResult<&str, (i8, Option<i8>)> {
    map(
        tuple((
            temperature,
            char('/'),
            alt((map(temperature, Some), value(None, tag("//")), success(None))),
        )),
        |(t, _, d)| (t, d),
    )(input)
}

fn altimeter(input: &str) -> IResult<&str, Altimeter> {
    alt((
        map(preceded(char('Q'), number::<u16>(4, 4)), Altimeter::Hectopascals),
        map(preceded(char('A'), number::<u16>(4, 4)), Altimeter::InchesHg),
    ))(input)
}
