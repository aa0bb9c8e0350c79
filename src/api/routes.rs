use actix_web::{web, HttpResponse};

use super::error::{ApiError, ApiResult};
use super::handlers;
use super::state::ApiState;

/// Paths are registered without trailing slashes; the server wraps the app
/// in `NormalizePath::trim` so `/upload_csv/` resolves as well.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
        )

        // Health checks
        .route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check))
        .route("/metrics", web::get().to(metrics_endpoint))

        // Invoicing
        .route("/", web::get().to(handlers::home))
        .route("/upload_csv", web::post().to(handlers::upload_csv))
        .route("/create_invoice", web::post().to(handlers::create_invoice))
        .route("/email_invoice/{invoice_id}", web::post().to(handlers::email_invoice));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

async fn readiness_check(state: web::Data<ApiState>) -> HttpResponse {
    if state.db.ping().await {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ready",
            "checks": { "database": "ok" }
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "not_ready",
            "checks": { "database": "failed" }
        }))
    }
}

async fn metrics_endpoint() -> ApiResult<HttpResponse> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::middleware::NormalizePath;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::api::AppConfig;
    use crate::notify::mailer::testing::RecordingMailer;
    use crate::storage::Database;

    const BOUNDARY: &str = "invoice-test-boundary";

    async fn test_state(dir: &Path, mailer: Arc<RecordingMailer>) -> ApiState {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.init_schema().await.expect("schema");
        let config = AppConfig {
            document_dir: dir.to_path_buf(),
            sender_address: "billing@example.com".to_string(),
            ..AppConfig::default()
        };
        ApiState::from_parts(config, db, mailer).expect("state")
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .wrap(NormalizePath::trim())
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn csv_upload(field: &str, csv: &str) -> test::TestRequest {
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"clients.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
        );
        test::TestRequest::post()
            .uri("/upload_csv/")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn home_reports_running() {
        let dir = tempfile::tempdir().unwrap();
        let app = init_app!(test_state(dir.path(), Arc::default()).await);

        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(body, json!({ "msg": "RCTI App Running!" }));
    }

    #[actix_web::test]
    async fn upload_create_and_email_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let state = test_state(dir.path(), mailer.clone()).await;
        let db = state.db.clone();
        let app = init_app!(state);

        let resp = test::call_service(
            &app,
            csv_upload("file", "name,email\nAlice,a@x.com\nBob,b@x.com\n").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "msg": "CSV imported into Clients table" }));
        assert_eq!(db.clients().count().await.unwrap(), 2);

        let req = test::TestRequest::post()
            .uri("/create_invoice/")
            .set_json(json!({ "client_id": 1, "amount": 100.0, "tax": 8.0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "msg": "Invoice created successfully",
                "id": 1,
                "client_id": 1,
                "amount": 100.0,
                "tax": 8.0,
                "total": 108.0
            })
        );

        let req = test::TestRequest::post().uri("/email_invoice/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "msg": "Invoice emailed to a@x.com" }));

        assert!(dir.path().join("invoice_1.pdf").exists());
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "billing@example.com");
    }

    #[actix_web::test]
    async fn emailing_unknown_invoice_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let app = init_app!(test_state(dir.path(), mailer.clone()).await);

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/email_invoice/42").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invoice not found", "status": 404 }));
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn delivery_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer::failing("authentication failed"));
        let app = init_app!(test_state(dir.path(), mailer).await);

        test::call_service(&app, csv_upload("file", "name,email\nAlice,a@x.com\n").to_request())
            .await;
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/create_invoice")
                .set_json(json!({ "client_id": 1, "amount": 5.0, "tax": 0.5 }))
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/email_invoice/1").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("authentication failed"));
    }

    #[actix_web::test]
    async fn csv_without_email_column_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::default()).await;
        let db = state.db.clone();
        let app = init_app!(state);

        let resp =
            test::call_service(&app, csv_upload("file", "name\nAlice\nBob\n").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(db.clients().count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn upload_without_file_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = init_app!(test_state(dir.path(), Arc::default()).await);

        let resp = test::call_service(
            &app,
            csv_upload("attachment", "name,email\nAlice,a@x.com\n").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn oversized_extra_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.init_schema().await.expect("schema");
        let config = AppConfig {
            document_dir: dir.path().to_path_buf(),
            max_upload_size_bytes: 64,
            ..AppConfig::default()
        };
        let state = ApiState::from_parts(config, db.clone(), Arc::new(RecordingMailer::default()))
            .expect("state");
        let app = init_app!(state);

        let resp =
            test::call_service(&app, csv_upload("padding", &"x".repeat(1024)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(db.clients().count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn invoice_for_unknown_client_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = init_app!(test_state(dir.path(), Arc::default()).await);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/create_invoice/")
                .set_json(json!({ "client_id": 9, "amount": 1.0, "tax": 0.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Client not found");
    }

    #[actix_web::test]
    async fn malformed_invoice_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = init_app!(test_state(dir.path(), Arc::default()).await);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/create_invoice/")
                .set_json(json!({ "client_id": "one", "amount": 1.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
    }

    #[actix_web::test]
    async fn readiness_checks_database() {
        let dir = tempfile::tempdir().unwrap();
        let app = init_app!(test_state(dir.path(), Arc::default()).await);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/ready").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
