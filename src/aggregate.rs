use crate::models::{ChartPoint, ChartSeries, Phone, PhoneRollup, Snapshot, StatsResult};
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeMap;

/// Trailing window of the earnings chart, in days.
pub const CHART_WINDOW_DAYS: usize = 7;

/// Fold every app across every phone once. Sums are commutative, so the
/// result is independent of phone/app ordering.
pub fn compute_stats(snapshot: &Snapshot) -> StatsResult {
    let mut stats = StatsResult {
        total_phones: snapshot.phones.len(),
        ..StatsResult::default()
    };

    for phone in &snapshot.phones {
        stats.total_apps += phone.apps.len();
        for app in &phone.apps {
            stats.total_balance += app.balance;
            stats.total_earned += app.earned;
            stats.total_withdrawn += app.total_withdrawn();
            if app.is_ready() {
                stats.ready_apps += 1;
            }
        }
    }

    stats
}

/// One rollup per phone, in the order the phones were given. Downstream
/// rendering relies on positional correspondence with the input.
pub fn compute_phone_rollups(phones: &[Phone]) -> Vec<PhoneRollup> {
    phones
        .iter()
        .map(|phone| {
            let mut rollup = PhoneRollup {
                id: phone.id.clone(),
                total_earned: 0.0,
                total_balance: 0.0,
                total_withdrawn: 0.0,
                app_count: phone.apps.len(),
            };
            for app in &phone.apps {
                rollup.total_earned += app.earned;
                rollup.total_balance += app.balance;
                rollup.total_withdrawn += app.total_withdrawn();
            }
            rollup
        })
        .collect()
}

pub fn compute_chart_series(snapshot: &Snapshot, window: usize) -> ChartSeries {
    chart_series_at(Local::now().date_naive(), window, &snapshot.daily_earnings)
}

/// Exactly `window` points, one per calendar day ending on `today`, oldest
/// first. Each value is the earning delta recorded for that day, 0 when
/// nothing was recorded.
pub fn chart_series_at(
    today: NaiveDate,
    window: usize,
    daily: &BTreeMap<String, f64>,
) -> ChartSeries {
    let mut points = Vec::with_capacity(window);
    for offset in (0..window).rev() {
        let date = today - Duration::days(offset as i64);
        let key = date_key(date);
        let value = daily.get(&key).copied().unwrap_or(0.0);
        points.push(ChartPoint { date: key, value });
    }
    points
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
