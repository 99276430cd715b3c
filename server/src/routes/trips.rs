use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use mileage_tracker_lib::LedgerSummary;

use crate::{
    auth::AuthUser,
    dto::{ClearQuery, ClearResponse, DistanceQuery, DistanceResponse, ExportQuery, LocationsResponse, NewTripRequest, TripDto, TripsResponse},
    error::AppError,
    export::ExportFormat,
    server_state::ServerState,
};

pub async fn locations(State(state): State<Arc<ServerState>>) -> Response {
    let table = state.data_manager.distance_table();

    Json(LocationsResponse {
        origins: table.list_origins().into_iter().collect(),
        destinations: table.list_destinations().into_iter().collect(),
    })
    .into_response()
}

pub async fn distance(State(state): State<Arc<ServerState>>, Query(query): Query<DistanceQuery>) -> Result<Json<DistanceResponse>, AppError> {
    let selected = |name: Option<String>| name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty());
    let (Some(from), Some(to)) = (selected(query.from), selected(query.to)) else {
        return Err(AppError::MissingRoute);
    };

    match state.data_manager.distance_table().lookup(&from, &to) {
        Some(miles) => Ok(Json(DistanceResponse { from, to, miles })),
        None => Err(AppError::RouteNotFound {
            origin: from,
            destination: to,
        }),
    }
}

pub async fn list_trips(State(state): State<Arc<ServerState>>, user: AuthUser) -> Result<Json<TripsResponse>, AppError> {
    let ledger = state.data_manager.get_ledger(user.user_id).await?;
    Ok(Json(TripsResponse::new(ledger)))
}

pub async fn add_trip(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    payload: Result<Json<NewTripRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TripDto>), AppError> {
    let Json(request) = payload?;

    let trip = state
        .data_manager
        .add_trip(user.user_id, request.from_school.as_deref(), request.to_school.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(trip.into())))
}

pub async fn remove_trip(State(state): State<Arc<ServerState>>, user: AuthUser, Path(trip_id): Path<i64>) -> Result<StatusCode, AppError> {
    state.data_manager.remove_trip(user.user_id, trip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Wipes the whole ledger, but only when the request says `confirm=true`.
pub async fn clear_trips(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    query: Result<Query<ClearQuery>, QueryRejection>,
) -> Result<Json<ClearResponse>, AppError> {
    let Query(query) = query?;
    if !query.confirm {
        return Err(AppError::ConfirmationRequired);
    }

    let removed = state.data_manager.remove_all_trips(user.user_id).await?;
    Ok(Json(ClearResponse { removed }))
}

pub async fn summary(State(state): State<Arc<ServerState>>, user: AuthUser) -> Result<Json<LedgerSummary>, AppError> {
    Ok(Json(state.data_manager.get_summary(user.user_id).await?))
}

pub async fn export(State(state): State<Arc<ServerState>>, user: AuthUser, Query(query): Query<ExportQuery>) -> Result<Response, AppError> {
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<ExportFormat>().map_err(AppError::UnsupportedFormat)?,
        None => ExportFormat::default(),
    };

    let report = state.data_manager.export_report(user.user_id).await?;
    let body = format.render(&report)?;
    tracing::info!("User {} exported {} rows as {:?}", user.user_id, report.rows().len(), format);

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={}", format.file_name(Utc::now().date_naive()))),
        ],
        body,
    )
        .into_response())
}
