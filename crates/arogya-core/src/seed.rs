//! Demo dataset loaded when nothing has been persisted yet.
//!
//! Event timestamps are relative to the supplied `now` so the seeded
//! district always shows recent activity.

use arogya_types::{
    CaseId, CaseRecord, Cluster, ClusterId, ClusterStatus, PhcMetric, ResourceStock, StockStatus,
    WaterLog, WaterLogId, WaterStatus,
};
use chrono::{DateTime, Duration, Utc};

fn ago(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(by).unwrap_or(now)
}

fn case(village: &str, symptoms: &[&str], diagnosis: Option<&str>, at: DateTime<Utc>) -> CaseRecord {
    CaseRecord {
        id: CaseId::new(),
        symptoms: symptoms.iter().map(|s| (*s).to_owned()).collect(),
        diagnosis: diagnosis.map(str::to_owned),
        village: village.to_owned(),
        timestamp: at,
    }
}

fn water(source_id: &str, status: WaterStatus, village: &str, at: DateTime<Utc>) -> WaterLog {
    WaterLog {
        id: WaterLogId::new(),
        source_id: source_id.to_owned(),
        status,
        village: village.to_owned(),
        timestamp: at,
    }
}

/// Seed case reports, newest first.
pub fn cases(now: DateTime<Utc>) -> Vec<CaseRecord> {
    vec![
        case(
            "Majuli",
            &["Diarrhea", "Vomiting"],
            Some("Suspected cholera"),
            ago(now, Duration::hours(3)),
        ),
        case("Majuli", &["Fever"], None, ago(now, Duration::hours(10))),
        case("Kamalabari", &["Fever", "Skin Rash"], None, ago(now, Duration::days(1))),
        case(
            "Garamur",
            &["Diarrhea", "Dehydration"],
            Some("Acute gastroenteritis"),
            ago(now, Duration::days(2)),
        ),
        case("Auniati", &["Breathing Difficulty"], None, ago(now, Duration::days(4))),
        case("Jengraimukh", &["Stomach Pain"], None, ago(now, Duration::days(5))),
    ]
}

/// Seed water-quality observations, newest first.
pub fn water_logs(now: DateTime<Utc>) -> Vec<WaterLog> {
    vec![
        water("tube-well-2", WaterStatus::Contaminated, "Garamur", ago(now, Duration::days(1))),
        water("river-intake-1", WaterStatus::Safe, "Majuli", ago(now, Duration::days(2))),
        water("pond-4", WaterStatus::Contaminated, "Kamalabari", ago(now, Duration::days(10))),
    ]
}

/// Clusters already under investigation at startup.
pub fn clusters(now: DateTime<Utc>) -> Vec<Cluster> {
    vec![Cluster {
        id: ClusterId::new(),
        village: String::from("Garamur"),
        risk_score: 48,
        cases: 4,
        status: ClusterStatus::Verified,
        date_detected: ago(now, Duration::days(3)),
    }]
}

/// Medical supply lines tracked by the district.
pub fn resources() -> Vec<ResourceStock> {
    vec![
        stock("ORS Packets", 1200, 2000, "packets", StockStatus::Low),
        stock("Chlorine Tablets", 5000, 4000, "tablets", StockStatus::Good),
        stock("Water Test Kits", 40, 150, "kits", StockStatus::Critical),
        stock("IV Fluids", 300, 500, "bags", StockStatus::Low),
    ]
}

fn stock(item: &str, current: i64, required: i64, unit: &str, status: StockStatus) -> ResourceStock {
    ResourceStock {
        item: item.to_owned(),
        current_stock: current,
        required_stock: required,
        unit: unit.to_owned(),
        status,
    }
}

/// Static Primary Health Centre metrics.
pub fn phc_metrics() -> Vec<PhcMetric> {
    vec![
        PhcMetric {
            phc: String::from("Kamalabari PHC"),
            villages_covered: vec![String::from("Majuli"), String::from("Kamalabari")],
            staff_on_duty: 6,
            beds_available: 12,
            pending_referrals: 2,
        },
        PhcMetric {
            phc: String::from("Garamur PHC"),
            villages_covered: vec![
                String::from("Garamur"),
                String::from("Jengraimukh"),
                String::from("Auniati"),
            ],
            staff_on_duty: 4,
            beds_available: 8,
            pending_referrals: 5,
        },
    ]
}
