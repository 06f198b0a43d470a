//! HTTP response helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::CLIENT_TAG;
use super::inject::inject_before_body_end;
use crate::utils::mime::{self, types};

/// Respond with a file from the build tree, injecting the client into HTML.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = if mime::is_html(content_type) {
        inject_before_body_end(&body, CLIENT_TAG)
    } else {
        body
    };
    send_body(request, 200, content_type, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, types::PLAIN);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

pub fn respond_bad_request(request: Request, reason: &str) -> Result<()> {
    send_body(request, 400, types::PLAIN, reason.as_bytes().to_vec())
}

pub fn respond_no_content(request: Request) -> Result<()> {
    request.respond(Response::empty(StatusCode(204)))?;
    Ok(())
}

/// 302 to `location`.
pub fn respond_redirect(request: Request, location: &str) -> Result<()> {
    let response = Response::empty(StatusCode(302))
        .with_header(owned_header("Location", location)?)
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

pub fn respond_js(request: Request, body: String) -> Result<()> {
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

pub fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

pub fn owned_header(key: &'static str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value.as_bytes())
        .map_err(|()| anyhow::anyhow!("invalid {key} header value: {value}"))
}
