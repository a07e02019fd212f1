// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod worker;

pub use worker::{CancelToken, FetchEvent, Mutation, spawn_list, spawn_mutation};

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use roster_app::{AuthUser, FetchError, LoadingTracker, LoginResponse, RecordId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One call against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
    /// Set when the path names a single record, so a 404 means the record
    /// is gone rather than the route.
    pub record_path: bool,
    /// Keeps the call out of the global loading indicator.
    pub skip_loading: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.trim_matches('/').to_owned(),
            query: Vec::new(),
            body: None,
            bearer: None,
            record_path: false,
            skip_loading: false,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: &str, body: serde_json::Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn patch(path: &str, body: serde_json::Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn for_record(mut self) -> Self {
        self.record_path = true;
        self
    }

    pub fn skip_loading(mut self) -> Self {
        self.skip_loading = true;
        self
    }

    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200, body)
    }

    /// An error response carrying `{"message": ...}`.
    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status, serde_json::json!({ "message": message }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_result(self, record_path: bool) -> Result<serde_json::Value, FetchError> {
        if self.is_success() {
            return Ok(self.body);
        }
        let detail = error_detail(self.status, &self.body);
        Err(FetchError::from_status(self.status, detail, record_path))
    }
}

fn error_detail(status: u16, body: &serde_json::Value) -> String {
    if let Some(message) = body.get("message").and_then(serde_json::Value::as_str)
        && !message.is_empty()
    {
        return message.to_owned();
    }
    if let Some(text) = body.as_str()
        && !text.is_empty()
        && text.len() < 100
        && !text.contains('{')
    {
        return text.to_owned();
    }
    format!("server returned {status}")
}

/// Moves an [`ApiRequest`] to a server and back.
///
/// A transport only fails on its own when no response arrives; status codes
/// are interpreted by [`Api`].
pub trait Transport: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} must be an http(s) URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FetchError::Network(format!("{} cannot take a path", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(request.path_segments());
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let url = self.url_for(request)?;
        let mut builder = self.http.request(request.method.to_reqwest(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(error) if (200..300).contains(&status) => {
                    return Err(FetchError::Decode(format!("decode response body: {error}")));
                }
                Err(_) => serde_json::Value::String(text),
            }
        };
        Ok(ApiResponse::new(status, body))
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> FetchError {
    FetchError::Network(format!("cannot reach {base_url} ({error})"))
}

/// Shared count of requests that drive the global busy indicator.
#[derive(Debug, Clone, Default)]
pub struct LoadingGauge {
    tracker: Arc<Mutex<LoadingTracker>>,
}

impl LoadingGauge {
    pub fn new(tracker: LoadingTracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn enter(&self) -> LoadingGuard {
        self.lock().start(Instant::now());
        LoadingGuard {
            gauge: self.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.lock().active()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn spinner_visible(&self, now: Instant) -> bool {
        self.lock().spinner_visible(now)
    }

    fn lock(&self) -> MutexGuard<'_, LoadingTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks one request as in flight until dropped.
#[derive(Debug)]
pub struct LoadingGuard {
    gauge: LoadingGauge,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.gauge.lock().finish();
    }
}

/// Entry point for talking to the API: attaches the session token, counts
/// requests for the loading indicator, and turns statuses into errors.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
    token: Arc<RwLock<Option<String>>>,
    loading: LoadingGauge,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("authenticated", &self.token().is_some())
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_loading(transport, LoadingGauge::default())
    }

    pub fn with_loading(transport: Arc<dyn Transport>, loading: LoadingGauge) -> Self {
        Self {
            transport,
            token: Arc::new(RwLock::new(None)),
            loading,
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn loading(&self) -> &LoadingGauge {
        &self.loading
    }

    pub fn send(&self, mut request: ApiRequest) -> Result<serde_json::Value, FetchError> {
        if request.bearer.is_none() {
            request.bearer = self.token();
        }
        let _busy = (!request.skip_loading).then(|| self.loading.enter());

        let result = self
            .transport
            .execute(&request)
            .and_then(|response| {
                debug!(
                    method = request.method.as_str(),
                    path = %request.path,
                    status = response.status,
                    "api response"
                );
                response.into_result(request.record_path)
            });
        if let Err(error) = &result {
            warn!(
                method = request.method.as_str(),
                path = %request.path,
                tag = %error.tag(),
                %error,
                "api request failed"
            );
        }
        result
    }

    pub fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, FetchError> {
        decode(self.send(request)?)
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        Collection {
            api: self.clone(),
            name: name.trim_matches('/').to_owned(),
            marker: PhantomData,
        }
    }

    /// Signs in and keeps the returned token for later requests.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, FetchError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response: LoginResponse = self.send_json(ApiRequest::post("auth/login", body))?;
        self.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub fn logout(&self) {
        self.set_token(None);
    }

    pub fn me(&self) -> Result<AuthUser, FetchError> {
        self.send_json(ApiRequest::get("auth/me"))
    }

    pub fn categories(&self) -> Result<Vec<String>, FetchError> {
        self.send_json(ApiRequest::get("categories").skip_loading())
    }
}

/// Typed CRUD endpoints for one REST collection. Mutations return the
/// server's copy of the record and never refresh any list.
pub struct Collection<T> {
    api: Api,
    name: String,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            name: self.name.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn list(&self, query: &[(String, String)]) -> Result<Vec<T>, FetchError> {
        let mut request = ApiRequest::get(&self.name);
        request.query = query.to_vec();
        self.api.send_json(request)
    }

    pub fn get(&self, id: RecordId) -> Result<T, FetchError> {
        self.api
            .send_json(ApiRequest::get(&self.record_path(id)).for_record())
    }

    pub fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, FetchError> {
        self.api
            .send_json(ApiRequest::post(&self.name, encode(body)?))
    }

    pub fn update<B: Serialize + ?Sized>(&self, id: RecordId, body: &B) -> Result<T, FetchError> {
        self.api
            .send_json(ApiRequest::put(&self.record_path(id), encode(body)?).for_record())
    }

    pub fn patch<B: Serialize + ?Sized>(&self, id: RecordId, body: &B) -> Result<T, FetchError> {
        self.api
            .send_json(ApiRequest::patch(&self.record_path(id), encode(body)?).for_record())
    }

    pub fn delete(&self, id: RecordId) -> Result<(), FetchError> {
        self.api
            .send(ApiRequest::delete(&self.record_path(id)).for_record())
            .map(|_| ())
    }

    fn record_path(&self, id: RecordId) -> String {
        format!("{}/{id}", self.name)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, FetchError> {
    serde_json::to_value(body).map_err(|error| FetchError::Decode(format!("encode body: {error}")))
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|error| FetchError::Decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ApiRequest, ApiResponse, HttpTransport, Method, error_detail};
    use roster_app::FetchError;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn request_paths_drop_stray_slashes() {
        let request = ApiRequest::get("/products/3/");
        assert_eq!(request.path, "products/3");
        assert_eq!(request.path_segments().collect::<Vec<_>>(), vec!["products", "3"]);
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("patch"), Some(Method::Patch));
        assert_eq!(Method::parse("HEAD"), None);
    }

    #[test]
    fn error_detail_prefers_message_field() {
        assert_eq!(
            error_detail(404, &json!({ "message": "User not found" })),
            "User not found"
        );
        assert_eq!(error_detail(500, &json!("Simulated server error")), "Simulated server error");
        assert_eq!(error_detail(502, &json!({ "detail": 1 })), "server returned 502");
        assert_eq!(error_detail(502, &json!("{broken")), "server returned 502");
    }

    #[test]
    fn into_result_maps_statuses() {
        let ok = ApiResponse::ok(json!([1, 2])).into_result(false);
        assert_eq!(ok, Ok(json!([1, 2])));

        let missing = ApiResponse::error(404, "User not found").into_result(true);
        assert_eq!(missing, Err(FetchError::NotFound("User not found".to_owned())));

        let route = ApiResponse::error(404, "no route").into_result(false);
        assert!(matches!(route, Err(FetchError::Http { status: 404, .. })));
    }

    #[test]
    fn transport_rejects_empty_or_relative_base_url() {
        assert!(HttpTransport::new("  ", Duration::from_secs(1)).is_err());
        assert!(HttpTransport::new("/api", Duration::from_secs(1)).is_err());
        assert!(HttpTransport::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn transport_trims_trailing_slash() -> anyhow::Result<()> {
        let transport = HttpTransport::new("http://127.0.0.1:9/api/", Duration::from_secs(1))?;
        assert_eq!(transport.base_url(), "http://127.0.0.1:9/api");
        Ok(())
    }
}
