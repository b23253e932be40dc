use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GatewayError {
    #[snafu(display("Error opening database: {source}"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection: {source}"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query: {source}"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema: {source}"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unknown store backend {:?}, expected `postgres` or `memory`", found))]
    UnknownStoreBackend { found: String },
    #[snafu(display("Missing required fields: {}", fields.join(", ")))]
    MissingFields { fields: Vec<&'static str> },
    #[snafu(display("Invalid JSON body: {source}"))]
    InvalidBody { source: JsonRejection },
    #[snafu(display("Invalid path: {source}"))]
    InvalidPath { source: PathRejection },
    #[snafu(display("Student not found"))]
    StudentNotFound { id: String },
    #[snafu(display("Document {id:?} no longer exists in collection {collection:?}"))]
    MissingDocument { collection: String, id: String },
}

impl GatewayError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } => ISE,
            Self::UnknownStoreBackend { .. } => ISE,
            Self::MissingFields { .. } | Self::InvalidBody { .. } => BI,
            Self::InvalidPath { .. } => BI,
            Self::StudentNotFound { .. } | Self::MissingDocument { .. } => NF,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            debug!(?self, %status_code, "Rejected request");
        }

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
