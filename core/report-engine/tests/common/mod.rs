//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for report engine integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use engine::{EntityRecord, MetricSettings, StatisticEntry};
use report_engine::{
    ColumnDefinition, ColumnRegistry, LinkSourceDefinition, ReferenceData, Report, ReportSession,
    Row, StatisticTypeDefinition,
};
use serde_json::json;

pub const ORGANIZATION: &str = "org_indigo";
pub const USER: &str = "user_ana";

/// Test harness holding a registry, records and one editing session.
pub struct TestHarness {
    pub registry: ColumnRegistry,
    pub records: Vec<EntityRecord>,
    pub settings: MetricSettings,
    pub session: ReportSession,
}

impl TestHarness {
    /// Default report over the artist fixture.
    pub fn new() -> Self {
        TestHarness {
            registry: ArtistFixture::registry(),
            records: ArtistFixture::records(),
            settings: MetricSettings::default(),
            session: ReportSession::new(Report::new_default(ORGANIZATION, USER, at(1_700_000_000))),
        }
    }

    /// Harness whose session starts from the given report.
    pub fn with_report(report: Report) -> Self {
        TestHarness {
            session: ReportSession::new(report),
            ..Self::new()
        }
    }

    pub fn columns(&self) -> Vec<ColumnDefinition> {
        self.session.columns(&self.registry)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.session.rows(&self.registry, &self.records, &self.settings)
    }

    pub fn column_keys(&self) -> Vec<String> {
        self.columns().into_iter().map(|c| c.key).collect()
    }

    /// Row for a record id; panics when the record is not part of the grid.
    pub fn row(&self, id: &str) -> Row {
        self.rows()
            .into_iter()
            .find(|r| r.id == id)
            .unwrap_or_else(|| panic!("no row for record {}", id))
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Small artist roster with statistics and links.
pub struct ArtistFixture;

impl ArtistFixture {
    pub fn reference() -> ReferenceData {
        ReferenceData {
            statistic_types: vec![
                StatisticTypeDefinition {
                    id: "sp_followers".to_string(),
                    name: "Followers".to_string(),
                    source: "Spotify".to_string(),
                },
                StatisticTypeDefinition {
                    id: "yt_views".to_string(),
                    name: "Views".to_string(),
                    source: "YouTube".to_string(),
                },
            ],
            link_sources: vec![
                LinkSourceDefinition {
                    key: "spotify".to_string(),
                    display_name: "Spotify".to_string(),
                    logo: Some("spotify.svg".to_string()),
                    social: false,
                },
                LinkSourceDefinition {
                    key: "instagram".to_string(),
                    display_name: "Instagram".to_string(),
                    logo: None,
                    social: true,
                },
            ],
        }
    }

    pub fn registry() -> ColumnRegistry {
        ColumnRegistry::artist().with_reference_data(Self::reference())
    }

    pub fn records() -> Vec<EntityRecord> {
        vec![
            EntityRecord::new("nova")
                .with_field("name", json!("Nova Lane"))
                .with_field("status", json!(1))
                .with_field("genres", json!(["pop", "synthwave"]))
                .with_field("country", json!("SE"))
                .with_link("spotify", "https://open.spotify.com/artist/nova")
                .with_statistic(StatisticEntry::new("sp_followers", vec![100.0, 80.0, 60.0, 50.0, 40.0]))
                .with_statistic(StatisticEntry::new("yt_views", vec![100.0, 0.0])),
            EntityRecord::new("orbit")
                .with_field("name", json!("Orbit Club"))
                .with_field("status", json!(2))
                .with_field("country", json!("NO"))
                .with_link("instagram", "https://instagram.com/orbit")
                .with_statistic(StatisticEntry::new("sp_followers", vec![12.0])),
            EntityRecord::new("quiet").with_field("name", json!("Quiet Hours")),
        ]
    }
}
