//! Uniform JSON envelope shared by every endpoint.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

pub const TRACE_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

tokio::task_local! {
    static TRACE_ID: String;
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub timestamp: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            trace_id: current_trace_id(),
            pagination: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total_items,
            total_pages: total_items.div_ceil(u64::from(limit)),
        }
    }
}

/// Successful reply; rendered through [`Envelope`].
#[derive(Debug)]
pub struct Success<T> {
    status: StatusCode,
    message: &'static str,
    data: Option<T>,
    pagination: Option<Pagination>,
}

impl<T: Serialize> Success<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn created(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Success<()> {
    pub fn empty(message: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data: None,
            pagination: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        let mut meta = Meta::now();
        meta.pagination = self.pagination;
        let body = Envelope {
            success: true,
            code: self.status.as_u16(),
            message: self.message.to_string(),
            data: self.data,
            error: None,
            meta,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn failure(
    status: StatusCode,
    message: String,
    code: &'static str,
    details: Option<serde_json::Value>,
) -> Response {
    let body: Envelope<()> = Envelope {
        success: false,
        code: status.as_u16(),
        message,
        data: None,
        error: Some(ErrorInfo { code, details }),
        meta: Meta::now(),
    };
    (status, Json(body)).into_response()
}

/// Trace id of the request being served, or a fresh one outside a request scope.
pub fn current_trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// Reuses an inbound `X-Trace-ID` or mints one, and echoes it on the response.
pub async fn trace_id(req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&TRACE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut res = TRACE_ID.scope(id.clone(), next.run(req)).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(TRACE_HEADER, value);
    }
    res
}
