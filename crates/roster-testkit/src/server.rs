// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use roster_client::{ApiRequest, ApiResponse, Method, Transport};
use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, warn};

use crate::MockBackend;

const API_PREFIX: &str = "/api";

/// Serves a [`MockBackend`] over HTTP on a loopback port under `/api`.
///
/// Each request is answered on its own thread so slow responses can overlap
/// and arrive out of order. Dropping the server stops it.
pub struct MockServer {
    server: Arc<Server>,
    base_url: String,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start(backend: Arc<MockBackend>) -> Result<Self> {
        let server = Arc::new(
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?,
        );
        let base_url = format!("http://{}{API_PREFIX}", server.server_addr());
        debug!(%base_url, "mock server listening");

        let listener = Arc::clone(&server);
        let handle = thread::spawn(move || {
            for request in listener.incoming_requests() {
                let backend = Arc::clone(&backend);
                thread::spawn(move || answer(&backend, request));
            }
        });

        Ok(Self {
            server,
            base_url,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn answer(backend: &MockBackend, mut request: Request) {
    let response = match to_api_request(&mut request) {
        Ok(api_request) => match backend.execute(&api_request) {
            Ok(response) => response,
            Err(error) => ApiResponse::error(502, &error.to_string()),
        },
        Err(response) => response,
    };

    let mut reply = Response::from_string(response.body.to_string())
        .with_status_code(response.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        reply = reply.with_header(header);
    }
    if let Err(error) = request.respond(reply) {
        warn!(%error, "mock server failed to respond");
    }
}

/// Paths outside the API prefix get 404 and unsupported methods get 405.
fn to_api_request(request: &mut Request) -> Result<ApiRequest, ApiResponse> {
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or_default();
    let path = path
        .strip_prefix(API_PREFIX)
        .ok_or_else(|| ApiResponse::error(404, "Not found"))?;
    let method = Method::parse(request.method().as_str())
        .ok_or_else(|| ApiResponse::error(405, "Method not allowed"))?;

    let mut api_request = ApiRequest::new(method, path);
    api_request.bearer = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Authorization"))
        .and_then(|header| header.value.as_str().strip_prefix("Bearer "))
        .map(str::to_owned);

    let mut raw = String::new();
    if request.as_reader().read_to_string(&mut raw).is_ok() && !raw.trim().is_empty() {
        api_request.body = serde_json::from_str(&raw).ok();
    }
    Ok(api_request)
}
