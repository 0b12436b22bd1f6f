use crate::error::PlanError;
use crate::server::api::{self, ApiError};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn ok_json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/scenario") => match api::scenario_payload() {
            Ok(payload) => HttpResponse::ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/evaluate") => api_response(api::evaluate_payload(body)),
        ("POST", "/api/optimize") => api_response(api::optimize_payload(body)),
        ("POST", "/api/rank") => api_response(api::rank_payload(body)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn api_response(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::ok_json(payload),
        Err(ApiError::Validation(report)) => validation_error_response(report),
        Err(ApiError::Plan(err @ PlanError::SolverFailure { .. })) => {
            error_response(422, "Unprocessable Entity", &err.to_string())
        }
        Err(err) => error_response(400, "Bad Request", &err.to_string()),
    }
}

fn validation_error_response(report: crate::data::ValidationReport) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();
    let payload = api::ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        report,
    };

    HttpResponse {
        status_code: 400,
        status_text: "Bad Request",
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
