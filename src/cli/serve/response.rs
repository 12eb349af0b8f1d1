//! HTTP response handlers.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::config::SiteConfig;
use crate::utils::mime;

/// Respond with a static file from disk.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with a 301/302 Location redirect.
pub fn respond_redirect(request: Request, to: &str, status: u16) -> Result<()> {
    use percent_encoding::{CONTROLS, utf8_percent_encode};

    // Targets are stored decoded; re-encode so the Location value is ASCII.
    let location = utf8_percent_encode(to, CONTROLS).to_string();
    let response = Response::empty(StatusCode(status)).with_header(header("Location", &location));
    request.respond(response)?;
    Ok(())
}

/// Respond with a JSON body.
pub fn respond_json(request: Request, status: u16, body: String) -> Result<()> {
    send_body(request, status, mime::types::JSON, body.into_bytes())
}

/// Respond with 404 (custom `404.html` from the public dir when present).
pub fn respond_not_found(request: Request, config: &SiteConfig) -> Result<()> {
    let custom_404 = config.public_dir().join("404.html");
    if custom_404.is_file() {
        if is_head_request(&request) {
            return send_head(request, 404, mime::types::HTML);
        }
        let body = fs::read(&custom_404)?;
        return send_body(request, 404, mime::types::HTML, body);
    }

    if is_head_request(&request) {
        return send_head(request, 404, mime::types::PLAIN);
    }
    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond 200 with a minimal holding page while the index warms up.
pub fn respond_loading(request: Request) -> Result<()> {
    let body = "<!DOCTYPE html>\
        <html><head><meta http-equiv=\"refresh\" content=\"1\"><title>Loading</title></head>\
        <body><p>Warming up, retrying shortly...</p></body></html>";
    send_body(request, 200, mime::types::HTML, body.as_bytes().to_vec())
}

/// Respond 503 during shutdown.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        mime::types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

pub fn is_head_request(request: &Request) -> bool {
    *request.method() == Method::Head
}

/// Read a request header value, case-insensitively.
pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_head(request: Request, status: u16, content_type: &str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn header(field: &str, value: &str) -> Header {
    // Fields are static literals; values are ASCII by construction.
    Header::from_bytes(field.as_bytes(), value.as_bytes()).expect("valid header bytes")
}
