#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde_json::{Value, json};

use assetctl_client::{AssetClient, ClientConfig, MemoryLocation, MemoryStore};

/// Fake PDF payload, deliberately not valid UTF-8.
pub const REPORT_BYTES: &[u8] = b"%PDF-1.4\n\x00\xff\xfe\x01";

/// Delay of the slow collection (`responsables-entrega`).
pub const SLOW_DELAY: Duration = Duration::from_millis(300);

pub const STORED_ADMIN: &str =
    r#"{"id":8,"username":"eva","nombre_completo":"Eva Ruiz","rol":"admin","activo":true}"#;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    pub fn last(&self, path: &str) -> Seen {
        self.seen
            .lock()
            .iter()
            .rev()
            .find(|s| s.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

/// Stub of the remote inventory service on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub stub: Stub,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let stub = Stub::default();
        let app = Router::new().fallback(handle).with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            stub,
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Boot a client against `config` with an in-memory store and location.
pub fn boot(config: &ClientConfig, store: Arc<MemoryStore>, href: &str) -> AssetClient {
    AssetClient::boot(config, store, Arc::new(MemoryLocation::new(href))).unwrap()
}

pub fn equipos() -> Value {
    json!([
        { "id": 3, "nombre": "Monitor", "doc_ingreso": "uploads/acta-3.pdf" },
        { "id": 9, "nombre": "Ecógrafo", "doc_ingreso": "" },
        { "id": 1, "nombre": "Laptop", "doc_ingreso": null },
        { "id": 12, "nombre": "Impresora", "doc_ingreso": "uploads/acta-12.pdf" },
        { "id": 7, "nombre": "Router" },
        { "id": 5, "nombre": "Switch", "doc_ingreso": "  " },
    ])
}

async fn handle(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    stub.seen.lock().push(Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.clone(),
    });

    match (method.as_str(), uri.path()) {
        ("POST", "/api/auth/login") => login(&body),
        ("POST", "/api/auth/request-reset") => Json(json!({ "ok": true })).into_response(),
        ("GET", "/api/auth/validate-reset-token") => {
            if uri.query() == Some("token=abc") {
                Json(json!({ "ok": true, "username": "eva" })).into_response()
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Token inválido" }))).into_response()
            }
        }
        ("GET", "/api/empresas") => {
            Json(json!([{ "id": 1, "nombre": "Acme" }, { "id": 2, "nombre": "Globex" }])).into_response()
        }
        ("POST", "/api/empresas") => {
            let mut created: Value = serde_json::from_slice(&body).unwrap_or(json!({}));
            created["id"] = json!(3);
            (StatusCode::CREATED, Json(created)).into_response()
        }
        ("DELETE", "/api/empresas/1") => StatusCode::OK.into_response(),
        ("GET", "/api/ubicaciones") => Json(json!([])).into_response(),
        ("GET", "/api/ubicaciones/99") => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
        }
        ("GET", "/api/responsables-entrega") => {
            tokio::time::sleep(SLOW_DELAY).await;
            Json(json!([{ "id": 1, "nombre": "Ana" }])).into_response()
        }
        ("GET", "/api/equipos") => Json(equipos()).into_response(),
        ("GET", "/api/usuarios") => Json(json!([{ "id": 8, "username": "eva" }])).into_response(),
        ("GET", "/api/usuarios/1") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>").into_response()
        }
        ("GET", "/api/meta/equipos/enums") => Json(json!({
            "tipos": ["biomedico", "tecnologico"],
            "estados": ["activo", "baja"],
        }))
        .into_response(),
        ("GET", "/api/meta/usuarios/enums") => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        ("POST", "/api/upload") => Json(json!({ "ok": true, "file": "uploads/acta.pdf" })).into_response(),
        ("GET", "/api/reports/equipos") => (
            [(header::CONTENT_TYPE, "application/pdf")],
            Bytes::from_static(REPORT_BYTES),
        )
            .into_response(),
        ("GET", "/api/reports/usuarios") => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" }))).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "no route" }))).into_response(),
    }
}

/// The service answers a good login with the bare user record.
fn login(body: &[u8]) -> Response {
    let creds: Value = serde_json::from_slice(body).unwrap_or(json!({}));
    match (creds["username"].as_str(), creds["password"].as_str()) {
        (Some("eva"), Some("secret")) => Json(json!({
            "id": 8,
            "username": "eva",
            "nombre_completo": "Eva Ruiz",
            "email": "eva@example.com",
            "rol": "Admin",
        }))
        .into_response(),
        (Some("luis"), Some("secret")) => Json(json!({
            "id": 11,
            "username": "luis",
            "nombre_completo": "Luis Mora",
            "email": null,
            "rol": "user",
        }))
        .into_response(),
        (Some("ghost"), _) => Json(json!({ "ok": true })).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Credenciales inválidas" })),
        )
            .into_response(),
    }
}
