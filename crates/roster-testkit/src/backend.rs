// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{FetchError, Row};
use roster_client::{ApiRequest, ApiResponse, Method, Transport};
use serde_json::{Map, Value, json};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Delay applied to every request the demo backend answers.
pub const MOCK_LATENCY: Duration = Duration::from_millis(600);

pub const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Food", "Books", "Other"];

const PRODUCT_DEFAULTS: [(&str, Fill); 10] = [
    ("name", Fill::Text),
    ("description", Fill::Text),
    ("sku", Fill::Text),
    ("price", Fill::Zero),
    ("quantity", Fill::Zero),
    ("contactEmail", Fill::Text),
    ("isActive", Fill::False),
    ("discount", Fill::Zero),
    ("promoCode", Fill::Text),
    ("category", Fill::Text),
];

const USER_DEFAULTS: [(&str, Fill); 2] = [("name", Fill::Text), ("email", Fill::Text)];

#[derive(Debug, Clone, Copy)]
enum Fill {
    Text,
    Zero,
    False,
}

impl Fill {
    fn value(self) -> Value {
        match self {
            Self::Text => Value::String(String::new()),
            Self::Zero => json!(0),
            Self::False => Value::Bool(false),
        }
    }
}

type Record = Map<String, Value>;

#[derive(Debug)]
struct Table {
    singular: &'static str,
    defaults: &'static [(&'static str, Fill)],
    next_id: u64,
    records: Vec<Record>,
}

impl Table {
    fn seeded(
        singular: &'static str,
        defaults: &'static [(&'static str, Fill)],
        seed: Value,
    ) -> Self {
        let records: Vec<Record> = match seed {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let next_id = records.iter().filter_map(record_id).max().unwrap_or(0) + 1;
        Self {
            singular,
            defaults,
            next_id,
            records,
        }
    }

    fn not_found(&self) -> ApiResponse {
        ApiResponse::error(404, &format!("{} not found", self.singular))
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record_id(record) == Some(id))
    }

    /// Only known fields are taken from the body; the rest get defaults.
    fn create(&mut self, body: Option<&Value>) -> Record {
        let mut record = Record::new();
        record.insert("id".to_owned(), json!(self.next_id));
        self.next_id += 1;
        for (field, default) in self.defaults {
            let value = body
                .and_then(|body| body.get(*field))
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or_else(|| default.value());
            record.insert((*field).to_owned(), value);
        }
        self.records.push(record.clone());
        record
    }

    fn handle(&mut self, method: Method, id: Option<&str>, body: Option<&Value>) -> ApiResponse {
        let id = match id {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => return self.not_found(),
            },
        };

        match (method, id) {
            (Method::Get, None) => ApiResponse::ok(Value::Array(
                self.records.iter().cloned().map(Value::Object).collect(),
            )),
            (Method::Get, Some(id)) => match self.position(id) {
                Some(index) => ApiResponse::ok(Value::Object(self.records[index].clone())),
                None => self.not_found(),
            },
            (Method::Post, None) => ApiResponse::ok(Value::Object(self.create(body))),
            (Method::Put | Method::Patch, Some(id)) => {
                let Some(index) = self.position(id) else {
                    return self.not_found();
                };
                let record = &mut self.records[index];
                if let Some(Value::Object(changes)) = body {
                    for (field, value) in changes {
                        if field != "id" {
                            record.insert(field.clone(), value.clone());
                        }
                    }
                }
                ApiResponse::ok(Value::Object(record.clone()))
            }
            (Method::Delete, Some(id)) => match self.position(id) {
                Some(index) => {
                    self.records.remove(index);
                    ApiResponse::ok(Value::Null)
                }
                None => self.not_found(),
            },
            (Method::Put | Method::Patch | Method::Delete, None) => self.not_found(),
            (Method::Post, Some(_)) => ApiResponse::error(405, "Method not allowed"),
        }
    }
}

fn record_id(record: &Record) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

#[derive(Debug)]
struct MockState {
    products: Table,
    users: Table,
    tokens_issued: u64,
}

/// An in-memory products/users/auth backend.
///
/// It answers through [`Transport`] directly, or over HTTP when wrapped in a
/// [`crate::MockServer`]. State is shared by every caller of one backend.
#[derive(Debug)]
pub struct MockBackend {
    latency: Duration,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            state: Mutex::new(MockState {
                products: Table::seeded("Product", &PRODUCT_DEFAULTS, seed_products()),
                users: Table::seeded("User", &USER_DEFAULTS, seed_users()),
                tokens_issued: 0,
            }),
        }
    }

    /// No latency, for tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Adds a user the way a POST would and returns its id.
    pub fn add_user(&self, name: &str, email: &str) -> u64 {
        let body = json!({ "name": name, "email": email });
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        record_id(&state.users.create(Some(&body))).unwrap_or(0)
    }

    /// Adds a product built from `row`'s known fields. The row's own id is
    /// replaced by the next free one.
    pub fn add_product(&self, row: &Row) -> u64 {
        let body = serde_json::to_value(row).unwrap_or(Value::Null);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        record_id(&state.products.create(Some(&body))).unwrap_or(0)
    }

    pub fn product_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .records
            .len()
    }

    pub fn user_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .users
            .records
            .len()
    }

    /// Routes one request without the simulated latency.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path_segments().collect();
        if segments.contains(&"error-test") {
            return ApiResponse::error(500, "Simulated server error");
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let body = request.body.as_ref();
        match segments.as_slice() {
            ["auth", "login"] if request.method == Method::Post => login(&mut state, body),
            ["auth", "me"] if request.method == Method::Get => me(request.bearer.as_deref()),
            ["products"] => state.products.handle(request.method, None, body),
            ["products", id] => state.products.handle(request.method, Some(id), body),
            ["users"] => state.users.handle(request.method, None, body),
            ["users", id] => state.users.handle(request.method, Some(id), body),
            ["categories"] if request.method == Method::Get => ApiResponse::ok(json!(CATEGORIES)),
            ["categories"] => ApiResponse::error(405, "Method not allowed"),
            _ => ApiResponse::error(404, "Not found"),
        }
    }
}

impl Transport for MockBackend {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let response = self.handle(request);
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            status = response.status,
            "mock backend answered"
        );
        Ok(response)
    }
}

fn login(state: &mut MockState, body: Option<&Value>) -> ApiResponse {
    let field = |name: &str| {
        body.and_then(|body| body.get(name))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    };
    let (Some(email), Some(_password)) = (field("email"), field("password")) else {
        return ApiResponse::error(400, "Email and password are required");
    };

    state.tokens_issued += 1;
    ApiResponse::ok(json!({
        "token": format!("mock-jwt-token-{}", state.tokens_issued),
        "user": {
            "id": 1,
            "name": "Admin User",
            "email": email,
            "roles": ["admin", "user"],
        },
    }))
}

fn me(bearer: Option<&str>) -> ApiResponse {
    if bearer.is_none_or(str::is_empty) {
        return ApiResponse::error(401, "Unauthorized");
    }
    ApiResponse::ok(json!({
        "id": 1,
        "name": "Admin User",
        "email": "admin@demo.com",
        "roles": ["admin", "user"],
    }))
}

pub fn seed_products() -> Value {
    json!([
        {
            "id": 1,
            "name": "Wireless Headphones Pro",
            "description": "Premium over-ear wireless headphones with active noise cancellation and 30-hour battery life",
            "sku": "ELC-00001",
            "price": 149.99,
            "quantity": 250,
            "contactEmail": "audio@techstore.com",
            "isActive": true,
            "discount": 20,
            "promoCode": "AUDIO20",
            "category": "Electronics",
        },
        {
            "id": 2,
            "name": "Organic Cotton T-Shirt",
            "description": "Comfortable organic cotton crew-neck t-shirt available in multiple colors and sizes",
            "sku": "CLT-00002",
            "price": 29.99,
            "quantity": 500,
            "contactEmail": "apparel@fashionhub.com",
            "isActive": true,
            "discount": 5,
            "promoCode": "STYLE5",
            "category": "Clothing",
        },
        {
            "id": 3,
            "name": "Artisan Dark Chocolate",
            "description": "Hand-crafted 72% cacao dark chocolate bar with sea salt and roasted almonds",
            "sku": "FOD-00003",
            "price": 12.5,
            "quantity": 1000,
            "contactEmail": "info@chocoshop.com",
            "isActive": true,
            "discount": 0,
            "promoCode": "",
            "category": "Food",
        },
        {
            "id": 4,
            "name": "TypeScript Design Patterns",
            "description": "Comprehensive guide to design patterns implemented in TypeScript with real-world examples",
            "sku": "BOK-00004",
            "price": 44.99,
            "quantity": 120,
            "contactEmail": "books@devpress.com",
            "isActive": false,
            "discount": 0,
            "promoCode": "",
            "category": "Books",
        },
        {
            "id": 5,
            "name": "Mechanical Keyboard RGB",
            "description": "Full-size mechanical keyboard with Cherry MX switches and customizable RGB backlighting",
            "sku": "ELC-00005",
            "price": 89.99,
            "quantity": 75,
            "contactEmail": "peripherals@techstore.com",
            "isActive": true,
            "discount": 10,
            "promoCode": "KEYS10",
            "category": "Electronics",
        },
        {
            "id": 6,
            "name": "Hiking Backpack 40L",
            "description": "Durable 40-liter hiking backpack with rain cover and ergonomic support frame system",
            "sku": "OTH-00006",
            "price": 79.99,
            "quantity": 200,
            "contactEmail": "gear@outdoors.com",
            "isActive": true,
            "discount": 15,
            "promoCode": "HIKE15",
            "category": "Other",
        },
    ])
}

pub fn seed_users() -> Value {
    json!([
        { "id": 1, "name": "John Doe", "email": "john.doe@example.com" },
        { "id": 2, "name": "Jane Smith", "email": "jane.smith@example.com" },
        { "id": 3, "name": "Bob Johnson", "email": "bob.johnson@example.com" },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(backend: &MockBackend, request: ApiRequest) -> ApiResponse {
        backend.handle(&request)
    }

    #[test]
    fn lists_seeded_collections() {
        let backend = MockBackend::instant();
        let products = send(&backend, ApiRequest::get("products"));
        assert_eq!(products.status, 200);
        assert_eq!(products.body.as_array().map(Vec::len), Some(6));
        assert_eq!(backend.user_count(), 3);
    }

    #[test]
    fn create_fills_defaults_and_ignores_unknown_fields() {
        let backend = MockBackend::instant();
        let created = send(
            &backend,
            ApiRequest::post("products", json!({ "name": "Lamp", "color": "red" })),
        );
        assert_eq!(created.body["id"], json!(7));
        assert_eq!(created.body["name"], json!("Lamp"));
        assert_eq!(created.body["price"], json!(0));
        assert_eq!(created.body["isActive"], json!(false));
        assert!(created.body.get("color").is_none());
        assert_eq!(backend.product_count(), 7);
    }

    #[test]
    fn added_product_takes_next_id() {
        let backend = MockBackend::instant();
        let row = Row::new()
            .with("id", 500_i64)
            .with("name", "Desk")
            .with("price", 120.0);
        assert_eq!(backend.add_product(&row), 7);

        let fetched = send(&backend, ApiRequest::get("products/7"));
        assert_eq!(fetched.body["name"], json!("Desk"));
        assert_eq!(fetched.body["price"], json!(120.0));
        assert_eq!(fetched.body["quantity"], json!(0));
    }

    #[test]
    fn update_merges_and_keeps_id() {
        let backend = MockBackend::instant();
        let updated = send(
            &backend,
            ApiRequest::patch("users/2", json!({ "id": 99, "name": "Janet Smith" })),
        );
        assert_eq!(updated.body["id"], json!(2));
        assert_eq!(updated.body["name"], json!("Janet Smith"));
        assert_eq!(updated.body["email"], json!("jane.smith@example.com"));
    }

    #[test]
    fn unknown_records_are_not_found() {
        let backend = MockBackend::instant();
        let missing = send(&backend, ApiRequest::get("products/42"));
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["message"], json!("Product not found"));

        let gone = send(&backend, ApiRequest::delete("users/abc"));
        assert_eq!(gone.status, 404);
        assert_eq!(gone.body["message"], json!("User not found"));
    }

    #[test]
    fn delete_removes_record() {
        let backend = MockBackend::instant();
        let deleted = send(&backend, ApiRequest::delete("users/1"));
        assert_eq!(deleted.status, 200);
        assert_eq!(deleted.body, Value::Null);
        assert_eq!(backend.user_count(), 2);
        assert_eq!(send(&backend, ApiRequest::get("users/1")).status, 404);
    }

    #[test]
    fn error_route_wins_over_collections() {
        let backend = MockBackend::instant();
        let response = send(&backend, ApiRequest::get("products/error-test"));
        assert_eq!(response.status, 500);
        assert_eq!(response.body["message"], json!("Simulated server error"));
    }

    #[test]
    fn login_requires_both_fields() {
        let backend = MockBackend::instant();
        let rejected = send(
            &backend,
            ApiRequest::post("auth/login", json!({ "email": "admin@demo.com" })),
        );
        assert_eq!(rejected.status, 400);

        let accepted = send(
            &backend,
            ApiRequest::post(
                "auth/login",
                json!({ "email": "admin@demo.com", "password": "secret" }),
            ),
        );
        assert_eq!(accepted.body["token"], json!("mock-jwt-token-1"));
        assert_eq!(accepted.body["user"]["email"], json!("admin@demo.com"));
    }

    #[test]
    fn me_requires_bearer() {
        let backend = MockBackend::instant();
        assert_eq!(send(&backend, ApiRequest::get("auth/me")).status, 401);

        let mut request = ApiRequest::get("auth/me");
        request.bearer = Some("mock-jwt-token-1".to_owned());
        assert_eq!(send(&backend, request).body["name"], json!("Admin User"));
    }

    #[test]
    fn categories_are_read_only() {
        let backend = MockBackend::instant();
        assert_eq!(
            send(&backend, ApiRequest::get("categories")).body,
            json!(CATEGORIES)
        );
        assert_eq!(
            send(&backend, ApiRequest::post("categories", json!({}))).status,
            405
        );
    }
}
