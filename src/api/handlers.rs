use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::{AppState, error::ApiError};
use crate::distributor;
use crate::domain::{Distribution, Error, Holiday, Money, RegistryRecord};
use crate::report::{self, Artifact, ReportRequest};

#[derive(Debug, Deserialize)]
pub struct HolidayQuery {
    year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RucQuery {
    numero: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRequest {
    monto_total: Option<serde_json::Value>,
    #[serde(default)]
    fechas_validas: Vec<String>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_holidays(
    State(state): State<AppState>,
    Query(query): Query<HolidayQuery>,
) -> Result<Json<Vec<Holiday>>, ApiError> {
    let year = query
        .year
        .as_deref()
        .map(str::trim)
        .filter(|y| !y.is_empty() && y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(|| Error::validation("The 'year' parameter is required and must be a number"))?;

    let holidays = state.calendar.holidays_for_year(year).await?;
    Ok(Json(holidays.as_ref().clone()))
}

pub async fn consultar_ruc(
    State(state): State<AppState>,
    Query(query): Query<RucQuery>,
) -> Result<Json<RegistryRecord>, ApiError> {
    let ruc = query.numero.unwrap_or_default();
    let record = state.registry.lookup(&ruc).await?;
    Ok(Json(record))
}

pub async fn calculate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Distribution>, ApiError> {
    let request: CalculateRequest = parse_body(&body)?;
    let total = parse_total(request.monto_total)?;
    let dates = distributor::parse_dates(&request.fechas_validas)?;

    state.calendar.ensure_business_days(&dates).await?;
    let distribution = distributor::distribute(total, &dates)?;

    tracing::info!(
        total = %total,
        dates = dates.len(),
        months = distribution.per_month.len(),
        "Calculated distribution"
    );
    Ok(Json(distribution))
}

pub async fn generate_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ReportRequest = parse_body(&body)?;
    let artifact = report::render_csv(&request, state.today())?;
    tracing::info!(filename = %artifact.filename, "Generated CSV report");
    Ok(attachment(artifact))
}

pub async fn generate_json(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ReportRequest = parse_body(&body)?;
    let artifact = report::render_backup(&request, state.today())?;
    tracing::info!(filename = %artifact.filename, "Generated JSON backup");
    Ok(attachment(artifact))
}

pub async fn restore_backup(body: Bytes) -> Result<Json<ReportRequest>, ApiError> {
    let request = report::restore_backup(&body)?;
    Ok(Json(request))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body)
        .map_err(|e| Error::validation(format!("Invalid or missing request data: {}", e)))
}

/// `montoTotal` must be a JSON number greater than zero.
fn parse_total(raw: Option<serde_json::Value>) -> Result<Money, Error> {
    let invalid = || Error::validation("Invalid or missing parameters for the calculation: montoTotal");
    let value = raw.filter(serde_json::Value::is_number).ok_or_else(invalid)?;
    let total: Money = serde_json::from_value(value).map_err(|_| invalid())?;
    if !total.is_positive() {
        return Err(invalid());
    }
    Ok(total)
}

fn attachment(artifact: Artifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}
