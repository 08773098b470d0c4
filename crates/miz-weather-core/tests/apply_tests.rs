mod common;

use common::{MizFixture, MISSION_WITHOUT_WEATHER};
use miz_weather_core::lua::{LuaTable, LuaValue};
use miz_weather_core::{set_weather_from_metar_str, Miz, Status, APPLY_FAILED_MESSAGE};
use std::io::Read;

const UGTB: &str = "UGTB 181200Z 27010KT 9999 FEW030 18/09 Q1016 NOSIG";

fn weather_of(miz: &Miz) -> &LuaTable {
    miz.mission()
        .table()
        .and_then(|t| t.get("weather"))
        .and_then(LuaValue::as_table)
        .expect("mission should carry a weather table")
}

fn number(table: &LuaTable, path: &[&str]) -> f64 {
    table
        .get_path(path)
        .and_then(LuaValue::as_f64)
        .unwrap_or_else(|| panic!("no number at {:?}", path))
}

#[test]
fn test_metar_applied_end_to_end() {
    let fixture = MizFixture::new();
    let out = fixture.output("strike_live.miz");

    let record = set_weather_from_metar_str(UGTB, &fixture.source, &out);
    assert_eq!(record.status, Some(Status::Success), "record: {:?}", record);
    assert_eq!(record.icao.as_deref(), Some("UGTB"));
    assert_eq!(record.to, out.display().to_string());

    let miz = Miz::open(&out).unwrap();
    let weather = weather_of(&miz);

    assert_eq!(number(weather, &["qnh"]), 762.0);
    assert_eq!(number(weather, &["season", "temperature"]), 18.0);
    assert_eq!(number(weather, &["visibility", "distance"]), 80000.0);
    assert_eq!(number(weather, &["atmosphere_type"]), 0.0);
    assert_eq!(number(weather, &["wind", "atGround", "dir"]), 90.0);
    assert!((number(weather, &["wind", "atGround", "speed"]) - 5.14).abs() < 0.01);
    assert!((number(weather, &["wind", "at8000", "speed"]) - 15.43).abs() < 0.01);
    assert_eq!(number(weather, &["clouds", "base"]), 914.0);
    assert!(weather.get_path(&["clouds", "preset"]).is_none());
    assert!(weather
        .get("cyclones")
        .and_then(LuaValue::as_table)
        .map(LuaTable::is_empty)
        .unwrap_or(false));

    // untouched keys survive
    assert_eq!(
        miz.mission()
            .table()
            .and_then(|t| t.get("descriptionText"))
            .and_then(LuaValue::as_str),
        Some("Strike at dawn")
    );
}

#[test]
fn test_source_archive_left_untouched() {
    let fixture = MizFixture::new();
    let before = std::fs::read(&fixture.source).unwrap();

    let record = set_weather_from_metar_str(UGTB, &fixture.source, fixture.output("copy.miz"));
    assert!(record.is_success());
    assert_eq!(std::fs::read(&fixture.source).unwrap(), before);
}

#[test]
fn test_resources_carried_over() {
    let fixture = MizFixture::new();
    let out = fixture.output("copy.miz");
    assert!(set_weather_from_metar_str(UGTB, &fixture.source, &out).is_success());

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
    let mut data = Vec::new();
    archive
        .by_name("l10n/DEFAULT/briefing.jpg")
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    assert_eq!(data, vec![0xff, 0xd8, 0xff, 0xe0]);
    assert_eq!(archive.len(), 6);
}

#[test]
fn test_fog_and_precipitation_written() {
    let fixture = MizFixture::new();
    let out = fixture.output("fog.miz");
    let record = set_weather_from_metar_str(
        "UUEE 181200Z VRB02MPS 0300 -RA FG VV001 04/04 Q1009",
        &fixture.source,
        &out,
    );
    assert!(record.is_success(), "record: {:?}", record);

    let miz = Miz::open(&out).unwrap();
    let weather = weather_of(&miz);
    assert_eq!(
        weather.get("enable_fog").and_then(LuaValue::as_bool),
        Some(true)
    );
    assert_eq!(number(weather, &["fog", "visibility"]), 300.0);
    assert_eq!(number(weather, &["fog", "thickness"]), 300.0);
    assert_eq!(number(weather, &["clouds", "iprecptns"]), 1.0);
}

#[test]
fn test_invalid_metar_reports_failure() {
    let fixture = MizFixture::new();
    let out = fixture.output("never.miz");

    let record = set_weather_from_metar_str("this is not a report", &fixture.source, &out);
    assert_eq!(record.status, Some(Status::Failed));
    assert_eq!(record.icao, None);
    assert!(!out.exists());
}

#[test]
fn test_freak_value_reports_apply_failed_message() {
    let fixture = MizFixture::new();
    let out = fixture.output("never.miz");

    let record = set_weather_from_metar_str(
        "KXXX 181200Z 270150KT 9999 20/10 A2992",
        &fixture.source,
        &out,
    );
    assert_eq!(record.status, Some(Status::Failed));
    assert_eq!(record.icao.as_deref(), Some("KXXX"));
    assert_eq!(record.error.as_deref(), Some(APPLY_FAILED_MESSAGE));
    assert!(!out.exists());
}

#[test]
fn test_missing_source_is_reported_not_raised() {
    let fixture = MizFixture::new();
    let missing = fixture.output("ghost.miz");

    let record = set_weather_from_metar_str(UGTB, &missing, fixture.output("out.miz"));
    assert_eq!(record.status, Some(Status::Failed));
    assert!(record
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("ghost.miz"));
}

#[test]
fn test_mission_without_weather_leaves_status_unset() {
    let fixture = MizFixture::with_mission(MISSION_WITHOUT_WEATHER);
    let out = fixture.output("out.miz");

    let record = set_weather_from_metar_str(UGTB, &fixture.source, &out);
    assert_eq!(record.status, None);
    assert_eq!(record.error, None);
    assert!(!out.exists());
}

#[test]
fn test_automatic_station_reports_apply() {
    for raw in [
        "EDDF 181220Z 27010KT 9999 1500SW FEW030 18/09 Q1016",
        "EDDF 181220Z AUTO 27010KT //// // ////// 18/09 Q1016",
        "EDDF 181220Z AUTO 27010KT 9999 // NCD 18/09 Q1016",
        "EDDM 181220Z AUTO 24008KT 9999 -SHRA FEW025 //////CB 14/10 Q1012",
    ] {
        let fixture = MizFixture::new();
        let out = fixture.output("auto.miz");

        let record = set_weather_from_metar_str(raw, &fixture.source, &out);
        assert_eq!(record.status, Some(Status::Success), "{}: {:?}", raw, record);

        let miz = Miz::open(&out).unwrap();
        let weather = weather_of(&miz);
        assert_eq!(number(weather, &["visibility", "distance"]), 80000.0, "{}", raw);
    }
}
