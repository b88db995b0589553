use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use treino_core::{PlanRecord, PlanRecordInput, PlanService, ServiceError, UserProfile};

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "API está funcionando!";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// The body was not a JSON object.
    fn not_an_object() -> Self {
        Self::bad_request("Requisição JSON inválida. Esperava um dicionário.")
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match &err {
            ServiceError::MissingRequiredField(field) => {
                format!("Campos obrigatórios ausentes: {field}")
            }
            other => other.to_string(),
        };
        Self { status, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: PlanService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/gerar_treino", post(gerar_treino))
        .route("/gerar_pdf", post(gerar_pdf))
        .layer(middleware::from_fn(request_span))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: PlanService, bind: &str, port: u16) -> Result<()> {
    let model = service.model_name().to_string();
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {bind}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%model, "treino serve listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("treino serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

/// Run every request inside a span tagged with a fresh request id.
async fn request_span(req: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    async move {
        let resp = next.run(req).await;
        info!(status = resp.status().as_u16(), "request completed");
        resp
    }
    .instrument(span)
    .await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> &'static str {
    LIVENESS_MESSAGE
}

async fn gerar_treino(
    State(service): State<PlanService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PlanRecord>, AppError> {
    let profile: UserProfile = object_body(body)?;
    let record = service.generate_plan(profile).await?;
    Ok(Json(record))
}

async fn gerar_pdf(
    State(service): State<PlanService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let input: PlanRecordInput = object_body(body)?;
    let doc = service.render_plan(input).await?;

    let disposition = format!("attachment; filename=\"{}\"", doc.filename());
    Ok((
        [
            (header::CONTENT_TYPE, doc.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(doc.bytes),
    )
        .into_response())
}

/// Accept only a JSON object body and deserialize it as `T`.
///
/// Arrays are refused up front; serde would otherwise map them onto the
/// struct fields by position.
fn object_body<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|_| AppError::not_an_object())?;
    if !value.is_object() {
        return Err(AppError::not_an_object());
    }
    serde_json::from_value(value)
        .map_err(|e| AppError::bad_request(format!("Requisição JSON inválida: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use treino_core::PlanService;
    use treino_test_utils::{CannedModel, sample_model_output};

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn app_with(model: &Arc<CannedModel>) -> axum::Router {
        super::build_router(PlanService::new(model.clone()))
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 10_485_760)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    const PROFILE: &str = r#"{
        "objetivo": "hipertrofia",
        "nivel": "iniciante",
        "acessoEquipamentos": "casa, apenas halteres",
        "restricoes": null,
        "especificacao": ""
    }"#;

    // -----------------------------------------------------------------------
    // GET /
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_index_returns_liveness_text() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = app_with(&model)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"), "got {content_type}");
        assert_eq!(body_bytes(resp).await, super::LIVENESS_MESSAGE.as_bytes());
    }

    // -----------------------------------------------------------------------
    // Error mapping
    // -----------------------------------------------------------------------

    #[test]
    fn test_service_errors_map_to_status_by_fault() {
        use treino_core::{RequiredField, ServiceError};

        let missing = super::AppError::from(ServiceError::MissingRequiredField(
            RequiredField::AcessoEquipamentos,
        ));
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.message, "Campos obrigatórios ausentes: acessoEquipamentos");

        let upstream =
            super::AppError::from(ServiceError::UpstreamFailure("timeout".to_string()));
        assert_eq!(upstream.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.message.contains("timeout"));

        let render = super::AppError::from(ServiceError::RenderFailure("boom".to_string()));
        assert_eq!(render.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(render.message.contains("boom"));
    }

    // -----------------------------------------------------------------------
    // POST /gerar_treino
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_gerar_treino_returns_plan_record() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = post_json(app_with(&model), "/gerar_treino", PROFILE).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let expected: serde_json::Value = serde_json::from_str(&sample_model_output()).unwrap();
        assert_eq!(json, expected);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gerar_treino_accepts_snake_case_names() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let body = r#"{
            "objetivo": "força",
            "nivel": "avançado",
            "acesso_equipamentos": "academia completa",
            "especificacao_treino": "adaptação para jogadores de basquete"
        }"#;
        let resp = post_json(app_with(&model), "/gerar_treino", body).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let prompt = &model.requests()[0].prompt;
        assert!(prompt.contains("academia completa"));
        assert!(prompt.contains("adaptação para jogadores de basquete"));
    }

    #[tokio::test]
    async fn test_gerar_treino_accepts_both_spellings_at_once() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let body = r#"{
            "objetivo": "resistência",
            "nivel": "intermediário",
            "acessoEquipamentos": "parque",
            "acesso_equipamentos": "parque"
        }"#;
        let resp = post_json(app_with(&model), "/gerar_treino", body).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gerar_treino_missing_field_is_400_without_model_call() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let body = r#"{"objetivo": "hipertrofia", "acessoEquipamentos": "academia"}"#;
        let resp = post_json(app_with(&model), "/gerar_treino", body).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        let msg = json["error"].as_str().unwrap();
        assert!(msg.contains("nivel"), "unexpected message: {msg}");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gerar_treino_rejects_non_object_bodies() {
        for body in [r#"["a", "b", "c"]"#, "42", "null", "not json"] {
            let model = Arc::new(CannedModel::replying(sample_model_output()));
            let resp = post_json(app_with(&model), "/gerar_treino", body).await;

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let json = body_json(resp).await;
            assert!(json["error"].is_string());
            assert_eq!(model.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_gerar_treino_upstream_failure_is_500() {
        let model = Arc::new(CannedModel::failing("quota exceeded"));
        let resp = post_json(app_with(&model), "/gerar_treino", PROFILE).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        let msg = json["error"].as_str().unwrap();
        assert!(msg.contains("quota exceeded"), "unexpected message: {msg}");
    }

    #[tokio::test]
    async fn test_gerar_treino_malformed_model_output_is_500() {
        let model = Arc::new(CannedModel::replying("Aqui está o seu treino!"));
        let resp = post_json(app_with(&model), "/gerar_treino", PROFILE).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // -----------------------------------------------------------------------
    // POST /gerar_pdf
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_gerar_pdf_returns_attachment() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let body = r###"{
            "avisosImportantes": [],
            "planoMarkdown": "## Day 1\n- Squat 3x10",
            "sugestoesAdicionais": ""
        }"###;
        let resp = post_json(app_with(&model), "/gerar_pdf", body).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/pdf");
        assert_eq!(
            resp.headers()["content-disposition"],
            "attachment; filename=\"plano_de_treino.pdf\""
        );
        let bytes = body_bytes(resp).await;
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(model.call_count(), 0, "rendering never calls the model");
    }

    #[tokio::test]
    async fn test_gerar_pdf_accepts_generate_output_verbatim() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = post_json(app_with(&model), "/gerar_pdf", &sample_model_output()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_gerar_pdf_empty_object_still_renders() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = post_json(app_with(&model), "/gerar_pdf", "{}").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_gerar_pdf_rejects_array_body() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = post_json(app_with(&model), "/gerar_pdf", "[]").await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed() {
        let model = Arc::new(CannedModel::replying(sample_model_output()));
        let resp = app_with(&model)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/gerar_treino")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }
}
