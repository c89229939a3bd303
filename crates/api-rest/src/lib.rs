//! # API REST
//!
//! REST API implementation for Preop.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The patient [`Session`] is shared behind a mutex. Each handler holds the lock for the whole
//! operation, so submissions are applied one at a time.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::SecondsFormat;
use preop_core::{
    formulary, Advisory, Classification, FindingField, FindingKind, PatientRecord, PlannerError,
    RawReading, RiskClassifier, Session,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

// ============================================================================
// State
// ============================================================================

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, ApiError> {
        self.session.lock().map_err(|_| {
            tracing::error!("patient session lock poisoned");
            ApiError::internal()
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrugRes {
    pub name: String,
    pub dosage: String,
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListDrugsRes {
    pub drugs: Vec<DrugRes>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClassificationRes {
    pub asa: u8,
    pub risk_tier: String,
    pub plan: String,
}

impl From<Classification> for ClassificationRes {
    fn from(c: Classification) -> Self {
        Self {
            asa: c.asa.value(),
            risk_tier: c.tier.to_string(),
            plan: c.plan.to_string(),
        }
    }
}

/// Patient form. Every value is text and is validated server-side.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitPatientReq {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub height: String,
    pub bp_systolic: String,
    pub bp_diastolic: String,
    pub hr: String,
    pub rr: String,
    pub temp: String,
    pub spo2: String,
    pub asa: String,
}

impl From<SubmitPatientReq> for RawReading {
    fn from(req: SubmitPatientReq) -> Self {
        RawReading {
            name: req.name,
            age: req.age,
            weight: req.weight,
            height: req.height,
            bp_systolic: req.bp_systolic,
            bp_diastolic: req.bp_diastolic,
            hr: req.hr,
            rr: req.rr,
            temp: req.temp,
            spo2: req.spo2,
            asa: req.asa,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VitalsRes {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bp_systolic: Option<f64>,
    pub bp_diastolic: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub spo2: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FindingRes {
    pub field: String,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub age: String,
    pub asa: u8,
    pub vitals: VitalsRes,
    pub findings: Vec<FindingRes>,
    pub recorded_at: String,
}

impl From<&PatientRecord> for PatientRes {
    fn from(record: &PatientRecord) -> Self {
        let v = &record.vitals;
        Self {
            id: record.id.simple().to_string(),
            name: record.name.clone(),
            age: record.age.clone(),
            asa: record.asa.value(),
            vitals: VitalsRes {
                weight: v.weight,
                height: v.height,
                bp_systolic: v.bp_systolic,
                bp_diastolic: v.bp_diastolic,
                heart_rate: v.heart_rate,
                respiratory_rate: v.respiratory_rate,
                temperature: v.temperature,
                spo2: v.spo2,
            },
            findings: record
                .findings
                .iter()
                .map(|f| FindingRes {
                    field: match f.field {
                        FindingField::Vital(kind) => kind.id().to_string(),
                        FindingField::BloodPressure => "blood_pressure".to_string(),
                    },
                    kind: match f.kind {
                        FindingKind::Unparsable => "unparsable".to_string(),
                        FindingKind::OutOfRange => "out_of_range".to_string(),
                    },
                    message: f.message.clone(),
                })
                .collect(),
            recorded_at: record
                .recorded_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitPatientRes {
    pub patient: PatientRes,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmitProcedureReq {
    pub procedure_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryRes {
    pub procedure_name: String,
    pub level: String,
    pub classification: ClassificationRes,
    pub message: String,
}

impl From<Advisory> for AdvisoryRes {
    fn from(advisory: Advisory) -> Self {
        let level = match advisory.level {
            preop_core::AdvisoryLevel::ElevatedRisk => "elevated_risk",
            preop_core::AdvisoryLevel::StandardProtocol => "standard_protocol",
        };
        Self {
            procedure_name: advisory.procedure.to_string(),
            level: level.to_string(),
            classification: advisory.classification.into(),
            message: advisory.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal error".into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(e: PlannerError) -> Self {
        let status = match &e {
            PlannerError::Asa(_)
            | PlannerError::Classification(_)
            | PlannerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlannerError::MissingPatient => StatusCode::CONFLICT,
            _ => {
                tracing::error!("request failed: {:?}", e);
                return Self::internal();
            }
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorRes {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_drugs,
        classify,
        list_patients,
        get_patient,
        submit_patient,
        submit_procedure,
    ),
    components(schemas(
        HealthRes,
        DrugRes,
        ListDrugsRes,
        ClassificationRes,
        SubmitPatientReq,
        SubmitPatientRes,
        VitalsRes,
        FindingRes,
        PatientRes,
        ListPatientsRes,
        SubmitProcedureReq,
        AdvisoryRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/drugs", get(list_drugs))
        .route("/classification/:asa", get(classify))
        .route("/patients", get(list_patients).post(submit_patient))
        .route("/patients/:id", get(get_patient))
        .route("/procedures", post(submit_procedure))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Preop REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/drugs",
    responses(
        (status = 200, description = "Anesthesia drug reference list", body = ListDrugsRes)
    )
)]
/// Static anesthesia drug and dosage reference list, in display order.
#[axum::debug_handler]
async fn list_drugs(State(_state): State<AppState>) -> Json<ListDrugsRes> {
    let drugs = formulary()
        .iter()
        .map(|d| DrugRes {
            name: d.name.to_string(),
            dosage: d.dosage.to_string(),
            category: d.category.to_string(),
        })
        .collect();
    Json(ListDrugsRes { drugs })
}

#[utoipa::path(
    get,
    path = "/classification/{asa}",
    params(("asa" = String, Path, description = "ASA classification (1-5)")),
    responses(
        (status = 200, description = "Risk tier and anesthetic plan", body = ClassificationRes),
        (status = 400, description = "Invalid ASA classification", body = ErrorRes)
    )
)]
/// Classify an ASA class into a risk tier and anesthetic plan
///
/// # Errors
/// Returns `400 Bad Request` if `asa` is not an integer between 1 and 5.
#[axum::debug_handler]
async fn classify(
    State(_state): State<AppState>,
    Path(asa): Path<String>,
) -> Result<Json<ClassificationRes>, ApiError> {
    let value = asa
        .trim()
        .parse::<i64>()
        .map_err(|_| PlannerError::from(preop_core::AsaError::Unparsable(asa.clone())))?;
    let classification = RiskClassifier::classify(value)?;
    Ok(Json(classification.into()))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(("q" = Option<String>, Query, description = "Case-insensitive name filter")),
    responses(
        (status = 200, description = "Recorded patients in submission order", body = ListPatientsRes)
    )
)]
/// List recorded patients, optionally filtered by name
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let session = state.session()?;
    let patients = session
        .search(params.q.as_deref().unwrap_or(""))
        .into_iter()
        .map(PatientRes::from)
        .collect();
    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient record UUID")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Fetch one patient record
///
/// # Errors
/// Returns `404 Not Found` if the identifier is malformed or unknown.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let uuid = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::not_found(format!("patient not found: {id}")))?;
    let session = state.session()?;
    let record = session
        .find(&uuid)
        .ok_or_else(|| ApiError::not_found(format!("patient not found: {id}")))?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = SubmitPatientReq,
    responses(
        (status = 201, description = "Patient recorded; findings may be non-empty", body = SubmitPatientRes),
        (status = 400, description = "Invalid ASA classification", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Submit a patient form
///
/// The record is stored even when vital signs are abnormal; the findings are returned with it.
///
/// # Errors
/// - `400 Bad Request` if the ASA classification is invalid (nothing is stored).
/// - `500 Internal Server Error` if the record could not be persisted.
#[axum::debug_handler]
async fn submit_patient(
    State(state): State<AppState>,
    Json(req): Json<SubmitPatientReq>,
) -> Result<(StatusCode, Json<SubmitPatientRes>), ApiError> {
    let mut session = state.session()?;
    let record = session.submit_patient(&req.into())?;

    let message = if record.has_findings() {
        "Patient information submitted with abnormal values."
    } else {
        "Patient information submitted successfully."
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitPatientRes {
            patient: PatientRes::from(&record),
            message: message.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/procedures",
    request_body = SubmitProcedureReq,
    responses(
        (status = 200, description = "Procedure advisory", body = AdvisoryRes),
        (status = 400, description = "Empty procedure name", body = ErrorRes),
        (status = 409, description = "No patient recorded yet", body = ErrorRes)
    )
)]
/// Assess a procedure against the most recently recorded patient
///
/// # Errors
/// - `400 Bad Request` if the procedure name is empty.
/// - `409 Conflict` if no patient has been recorded yet.
#[axum::debug_handler]
async fn submit_procedure(
    State(state): State<AppState>,
    Json(req): Json<SubmitProcedureReq>,
) -> Result<Json<AdvisoryRes>, ApiError> {
    let session = state.session()?;
    let advisory = session.submit_procedure(&req.procedure_name)?;
    Ok(Json(advisory.into()))
}
