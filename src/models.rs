use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single earning app installed on a phone. Only the numeric fields are
/// aggregated; all of them default to 0 so a bare `{}` record is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppRecord {
    pub name: String,
    pub balance: f64,
    pub earned: f64,
    pub withdrawn: f64,
    pub historical_withdrawn: f64,
    pub min_withdraw: f64,
}

impl AppRecord {
    /// Lifetime withdrawals: the current period plus prior periods.
    pub fn total_withdrawn(&self) -> f64 {
        self.withdrawn + self.historical_withdrawn
    }

    /// An app is withdrawal-ready when its balance has reached its threshold.
    /// With both fields absent this is `0 >= 0`, so a bare record counts.
    pub fn is_ready(&self) -> bool {
        self.balance >= self.min_withdraw
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Phone {
    pub id: String,
    pub apps: Vec<AppRecord>,
}

/// The persisted record store: phones plus a day-keyed (`YYYY-MM-DD`) map of
/// earning deltas recorded that day. The map feeds the chart series.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    pub phones: Vec<Phone>,
    pub daily_earnings: BTreeMap<String, f64>,
}

impl Portfolio {
    /// Immutable copy handed across the offload channel. The background
    /// worker only ever sees its own copy; nothing shared crosses over.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phones: self.phones.clone(),
            daily_earnings: self.daily_earnings.clone(),
        }
    }
}

/// Unit of transfer for background computation. `phones` is deliberately not
/// defaulted: a payload without a phone collection is not a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub daily_earnings: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub total_phones: usize,
    pub total_apps: usize,
    pub total_balance: f64,
    pub total_earned: f64,
    pub total_withdrawn: f64,
    pub ready_apps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRollup {
    pub id: String,
    pub total_earned: f64,
    pub total_balance: f64,
    pub total_withdrawn: f64,
    pub app_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
}

pub type ChartSeries = Vec<ChartPoint>;

#[derive(Debug, Deserialize)]
pub struct CreatePhoneRequest {
    pub id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertAppRequest {
    pub name: String,
    pub balance: f64,
    pub earned: f64,
    pub withdrawn: f64,
    pub historical_withdrawn: f64,
    pub min_withdraw: f64,
}

impl From<UpsertAppRequest> for AppRecord {
    fn from(req: UpsertAppRequest) -> Self {
        AppRecord {
            name: req.name,
            balance: req.balance,
            earned: req.earned,
            withdrawn: req.withdrawn,
            historical_withdrawn: req.historical_withdrawn,
            min_withdraw: req.min_withdraw,
        }
    }
}
