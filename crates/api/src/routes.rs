use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::FixedOffset;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use mauzo_core::domain::forecast::{ForecastFailure, ForecastOutcome};
use mauzo_core::domain::sales::{ForecastRequest, RawSalesRecord};
use mauzo_core::forecast::{resolve_horizon, ForecastEngine, ForecastError, WeekdayProfile};
use mauzo_core::ingest::ledger::{daily_totals, LedgerSale};
use mauzo_core::time::Clock;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ForecastEngine<Arc<dyn Clock>>>,
    pub shop_offset: FixedOffset,
    pub default_horizon_days: u32,
    pub max_horizon_days: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerForecastRequest {
    sales: Vec<LedgerSale>,
    #[serde(default)]
    horizon_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    sales: Vec<RawSalesRecord>,
}

type ApiResponse<T> = (StatusCode, Json<T>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/forecast", post(post_forecast))
        .route("/forecast/ledger", post(post_ledger_forecast))
        .route("/forecast/profile", post(post_weekday_profile))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn post_forecast(
    State(state): State<AppState>,
    body: Result<Json<ForecastRequest>, JsonRejection>,
) -> ApiResponse<ForecastOutcome> {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return invalid_request(rejection),
    };
    let horizon = match state.horizon(req.horizon_days) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    run_forecast(&state, &req.sales, horizon)
}

async fn post_ledger_forecast(
    State(state): State<AppState>,
    body: Result<Json<LedgerForecastRequest>, JsonRejection>,
) -> ApiResponse<ForecastOutcome> {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return invalid_request(rejection),
    };
    let horizon = match state.horizon(req.horizon_days) {
        Ok(h) => h,
        Err(resp) => return resp,
    };

    let days = match daily_totals(&req.sales, state.shop_offset) {
        Ok(days) => days,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "ledger aggregation rejected");
            let failure = ForecastFailure {
                code: "InvalidLedger".to_string(),
                message: format!("{e:#}"),
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ForecastOutcome::Err(failure)),
            );
        }
    };

    let raw: Vec<RawSalesRecord> = days.into_iter().map(RawSalesRecord::from).collect();
    run_forecast(&state, &raw, horizon)
}

async fn post_weekday_profile(
    State(state): State<AppState>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<WeekdayProfile>, ApiResponse<ForecastOutcome>> {
    let Json(req) = body.map_err(invalid_request)?;
    state.engine.weekday_profile(&req.sales).map(Json).map_err(|err| {
        let status = status_for(&err);
        report_internal(&err);
        (status, Json(ForecastOutcome::Err(err.into())))
    })
}

fn run_forecast(
    state: &AppState,
    sales: &[RawSalesRecord],
    horizon: NonZeroU32,
) -> ApiResponse<ForecastOutcome> {
    match state.engine.try_forecast(sales, horizon) {
        Ok(forecast) => {
            tracing::info!(
                records = sales.len(),
                horizon_days = horizon.get(),
                method = %forecast.method,
                "forecast generated"
            );
            (StatusCode::OK, Json(ForecastOutcome::Ok(forecast)))
        }
        Err(err) => {
            if err.is_input_error() {
                tracing::info!(code = err.code(), "forecast rejected input");
            }
            report_internal(&err);
            (status_for(&err), Json(ForecastOutcome::Err(err.into())))
        }
    }
}

fn invalid_request(rejection: JsonRejection) -> ApiResponse<ForecastOutcome> {
    let status = rejection.status();
    let message = rejection.body_text();
    tracing::info!(%status, %message, "request body rejected");
    let failure = ForecastFailure {
        code: "InvalidRequest".to_string(),
        message,
    };
    (status, Json(ForecastOutcome::Err(failure)))
}

fn status_for(err: &ForecastError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn report_internal(err: &ForecastError) {
    if err.is_contained_panic() {
        return;
    }
    if let ForecastError::Internal { detail } = err {
        let report = anyhow::anyhow!("forecast internal error: {detail}");
        sentry_anyhow::capture_anyhow(&report);
    }
}

impl AppState {
    fn horizon(&self, requested: Option<i64>) -> Result<NonZeroU32, ApiResponse<ForecastOutcome>> {
        resolve_horizon(requested, self.default_horizon_days, self.max_horizon_days).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ForecastOutcome::Err(e.into())),
            )
        })
    }
}
