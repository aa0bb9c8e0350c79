use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bytes::BytesMut;
use futures::StreamExt;
use serde_json::json;

use crate::models::{InvoiceCreate, InvoiceCreated};
use super::error::{ApiError, ApiResult};
use super::state::ApiState;

pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "msg": "RCTI App Running!" }))
}

/// Import clients from the multipart field `file` (CSV with `name,email`)
pub async fn upload_csv(
    mut payload: Multipart,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let max_size = state.config.max_upload_size_bytes;
    let mut received = 0usize;
    let mut upload: Option<BytesMut> = None;

    // The limit counts every field; only `file` is kept.
    while let Some(field) = payload.next().await {
        let mut field = field?;
        let is_file = field.content_disposition().get_name() == Some("file");
        let mut sink = if is_file {
            Some(upload.get_or_insert_with(BytesMut::new))
        } else {
            None
        };

        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            received += chunk.len();
            if received > max_size {
                return Err(ApiError::payload_too_large(format!(
                    "Upload too large (max {} bytes)",
                    max_size
                )));
            }
            if let Some(body) = sink.as_mut() {
                body.extend_from_slice(&chunk);
            }
        }
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("Missing multipart field 'file'"))?;
    state.importer.import(&upload).await?;

    Ok(HttpResponse::Ok().json(json!({ "msg": "CSV imported into Clients table" })))
}

pub async fn create_invoice(
    body: web::Json<InvoiceCreate>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let invoice = state.invoices.create(&body).await?;
    Ok(HttpResponse::Ok().json(InvoiceCreated::from(invoice)))
}

pub async fn email_invoice(
    path: web::Path<i64>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let invoice_id = path.into_inner();
    let recipient = state.notifier.send_invoice(invoice_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "msg": format!("Invoice emailed to {}", recipient)
    })))
}
