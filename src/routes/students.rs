use crate::{
    data::student::{Student, ensure_required_fields},
    error::{GatewayResult, InvalidBodySnafu, InvalidPathSnafu, StudentNotFoundSnafu},
    state::GatewayState,
    store::Fields,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use snafu::{ResultExt, ensure};

#[derive(Serialize, Debug)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Serialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    const OK: Self = Self { success: true };
}

pub async fn get_students(State(state): State<GatewayState>) -> GatewayResult<Json<Vec<Student>>> {
    let documents = state.list_all(state.collection()).await?;
    Ok(Json(documents.into_iter().map(Student::from).collect()))
}

pub async fn post_student(
    State(state): State<GatewayState>,
    body: Result<Json<Fields>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(fields) = body.context(InvalidBodySnafu)?;
    ensure_required_fields(&fields)?;

    let id = state.create(state.collection(), fields).await?;
    info!(%id, "Created student");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Merges the body into the student. Fields left out of the body keep their values.
pub async fn put_student(
    State(state): State<GatewayState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Fields>, JsonRejection>,
) -> GatewayResult<Json<SuccessResponse>> {
    let Path(id) = path.context(InvalidPathSnafu)?;
    let Json(fields) = body.context(InvalidBodySnafu)?;
    ensure!(
        state.exists(state.collection(), &id).await?,
        StudentNotFoundSnafu { id: &id }
    );

    state.update(state.collection(), &id, fields).await?;
    Ok(Json(SuccessResponse::OK))
}

pub async fn delete_student(
    State(state): State<GatewayState>,
    path: Result<Path<String>, PathRejection>,
) -> GatewayResult<Json<SuccessResponse>> {
    let Path(id) = path.context(InvalidPathSnafu)?;
    ensure!(
        state.exists(state.collection(), &id).await?,
        StudentNotFoundSnafu { id: &id }
    );

    state.delete(state.collection(), &id).await?;
    info!(%id, "Deleted student");

    Ok(Json(SuccessResponse::OK))
}
