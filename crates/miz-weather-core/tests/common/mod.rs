#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const MISSION: &str = r#"mission =
{
    ["date"] =
    {
        ["Day"] = 18,
        ["Year"] = 2026,
        ["Month"] = 10,
    }, -- end of ["date"]
    ["theatre"] = "Caucasus",
    ["weather"] =
    {
        ["atmosphere_type"] = 1,
        ["wind"] =
        {
            ["at8000"] =
            {
                ["speed"] = 0,
                ["dir"] = 0,
            }, -- end of ["at8000"]
            ["atGround"] =
            {
                ["speed"] = 0,
                ["dir"] = 0,
            }, -- end of ["atGround"]
            ["at2000"] =
            {
                ["speed"] = 0,
                ["dir"] = 0,
            }, -- end of ["at2000"]
        }, -- end of ["wind"]
        ["enable_fog"] = false,
        ["season"] =
        {
            ["temperature"] = 20,
        }, -- end of ["season"]
        ["type_weather"] = 2,
        ["qnh"] = 760,
        ["cyclones"] =
        {
            [1] =
            {
                ["pressure_spread"] = 2,
                ["centerZ"] = 100,
                ["centerX"] = 100,
            }, -- end of [1]
        }, -- end of ["cyclones"]
        ["groundTurbulence"] = 0,
        ["visibility"] =
        {
            ["distance"] = 80000,
        }, -- end of ["visibility"]
        ["fog"] =
        {
            ["thickness"] = 0,
            ["visibility"] = 0,
        }, -- end of ["fog"]
        ["clouds"] =
        {
            ["thickness"] = 200,
            ["density"] = 0,
            ["preset"] = "Preset2",
            ["base"] = 300,
            ["iprecptns"] = 0,
        }, -- end of ["clouds"]
        ["enable_dust"] = false,
        ["dust_density"] = 0,
    }, -- end of ["weather"]
    ["descriptionText"] = "Strike at dawn",
} -- end of mission
"#;

pub const MISSION_WITHOUT_WEATHER: &str = r#"mission =
{
    ["theatre"] = "Caucasus",
} -- end of mission
"#;

pub struct MizFixture {
    // keeps the directory alive
    _dir: TempDir,
    pub source: PathBuf,
}

impl MizFixture {
    pub fn new() -> Self {
        Self::with_mission(MISSION)
    }

    pub fn with_mission(mission: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let source = dir.path().join("strike.miz");
        write_miz(&source, mission);
        Self { _dir: dir, source }
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.source.with_file_name(name)
    }
}

pub fn write_miz(path: &Path, mission: &str) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("mission", mission),
        ("options", "options =\n{\n} -- end of options\n"),
        ("warehouses", "warehouses =\n{\n} -- end of warehouses\n"),
        ("l10n/DEFAULT/dictionary", "dictionary =\n{\n} -- end of dictionary\n"),
        ("l10n/DEFAULT/mapResource", "mapResource =\n{\n} -- end of mapResource\n"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.start_file("l10n/DEFAULT/briefing.jpg", options).unwrap();
    writer.write_all(&[0xff, 0xd8, 0xff, 0xe0]).unwrap();
    writer.finish().unwrap();
}
