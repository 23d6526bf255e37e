use crate::aggregate::date_key;
use crate::cache::content_type;
use crate::channel::{Request, Response};
use crate::errors::{AppError, Error};
use crate::models::{
    AppRecord, ChartSeries, CreatePhoneRequest, Phone, PhoneRollup, Portfolio, Snapshot,
    StatsResult, UpsertAppRequest,
};
use crate::state::AppState;
use crate::storage::persist_portfolio;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    Json,
};
use chrono::Local;

pub async fn index() -> Html<String> {
    Html(render_index(&today_string()))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResult>, AppError> {
    let snapshot = take_snapshot(&state).await;
    match state.channel.send(Request::CalculateStats(snapshot)).await? {
        Response::StatsResult(stats) => Ok(Json(stats)),
        other => Err(unexpected_kind(other)),
    }
}

pub async fn get_phones(
    State(state): State<AppState>,
) -> Result<Json<Vec<PhoneRollup>>, AppError> {
    let phones = state.portfolio.lock().await.phones.clone();
    match state.channel.send(Request::CalculatePhoneData(phones)).await? {
        Response::PhoneResult(rollups) => Ok(Json(rollups)),
        other => Err(unexpected_kind(other)),
    }
}

pub async fn get_chart(State(state): State<AppState>) -> Result<Json<ChartSeries>, AppError> {
    let snapshot = take_snapshot(&state).await;
    match state.channel.send(Request::GenerateChartData(snapshot)).await? {
        Response::ChartResult(series) => Ok(Json(series)),
        other => Err(unexpected_kind(other)),
    }
}

/// Raw protocol endpoint: body is a `{type, data}` request envelope, the
/// reply is the matching `{type, result}` envelope.
pub async fn compute(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<Response>, AppError> {
    let request = Request::from_value(payload)?;
    let response = state.channel.send(request).await?;
    Ok(Json(response))
}

pub async fn create_phone(
    State(state): State<AppState>,
    Json(payload): Json<CreatePhoneRequest>,
) -> Result<(StatusCode, Json<Phone>), AppError> {
    let id = payload.id.trim().to_string();
    if id.is_empty() {
        return Err(AppError::bad_request("phone id must not be empty"));
    }

    let mut portfolio = state.portfolio.lock().await;
    if portfolio.phones.iter().any(|phone| phone.id == id) {
        return Err(AppError::bad_request(format!("phone '{id}' already exists")));
    }

    let phone = Phone {
        id,
        apps: Vec::new(),
    };
    portfolio.phones.push(phone.clone());
    persist_portfolio(&state.config.data_path, &portfolio).await?;
    Ok((StatusCode::CREATED, Json(phone)))
}

pub async fn add_app(
    State(state): State<AppState>,
    Path(phone_id): Path<String>,
    Json(payload): Json<UpsertAppRequest>,
) -> Result<(StatusCode, Json<AppRecord>), AppError> {
    let app = AppRecord::from(payload);
    let mut portfolio = state.portfolio.lock().await;
    {
        let Portfolio {
            phones,
            daily_earnings,
        } = &mut *portfolio;
        let phone = phones
            .iter_mut()
            .find(|phone| phone.id == phone_id)
            .ok_or_else(|| AppError::not_found(format!("no phone '{phone_id}'")))?;
        record_earning_delta(daily_earnings, app.earned);
        phone.apps.push(app.clone());
    }

    persist_portfolio(&state.config.data_path, &portfolio).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

pub async fn update_app(
    State(state): State<AppState>,
    Path((phone_id, index)): Path<(String, usize)>,
    Json(payload): Json<UpsertAppRequest>,
) -> Result<Json<AppRecord>, AppError> {
    let updated = AppRecord::from(payload);
    let mut portfolio = state.portfolio.lock().await;

    let previous_earned = {
        let phone = portfolio
            .phones
            .iter_mut()
            .find(|phone| phone.id == phone_id)
            .ok_or_else(|| AppError::not_found(format!("no phone '{phone_id}'")))?;
        let slot = phone.apps.get_mut(index).ok_or_else(|| {
            AppError::not_found(format!("phone '{phone_id}' has no app {index}"))
        })?;
        let previous = slot.earned;
        *slot = updated.clone();
        previous
    };
    record_earning_delta(&mut portfolio.daily_earnings, updated.earned - previous_earned);

    persist_portfolio(&state.config.data_path, &portfolio).await?;
    Ok(Json(updated))
}

pub async fn get_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let request_path = format!("/assets/{path}");
    let served = state.assets.intercept(&request_path).await?;
    let mime = content_type(std::path::Path::new(&path));
    Ok(([(header::CONTENT_TYPE, mime)], served.body))
}

/// Copy the records out under the lock, then release it before computing.
/// The background worker only ever touches its own copy.
async fn take_snapshot(state: &AppState) -> Snapshot {
    state.portfolio.lock().await.snapshot()
}

/// Each change to an app's `earned` total lands in today's bucket; the chart
/// series reads these buckets back out.
fn record_earning_delta(daily: &mut std::collections::BTreeMap<String, f64>, delta: f64) {
    if delta == 0.0 {
        return;
    }
    let key = today_string();
    *daily.entry(key).or_insert(0.0) += delta;
}

fn unexpected_kind(response: Response) -> AppError {
    Error::Channel(format!("unexpected response kind: {response:?}")).into()
}

fn today_string() -> String {
    date_key(Local::now().date_naive())
}
