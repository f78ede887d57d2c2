/// Cloud Files storage against an in-process Swift mock.
///
/// The mock implements v1.0 auth plus object PUT/DELETE and records every
/// object request it sees.
///
/// Run with:
///   cargo test -p stowage-storage --test swift_mock
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use stowage_core::Package;
use stowage_core::config::CloudFilesConfig;
use stowage_storage::cloudfiles::{CloudFilesStorage, ConnectionRequest, PROVIDER};
use stowage_storage::provider::Storage;
use stowage_storage::swift::{SwiftConnector, SwiftError};
use tempfile::TempDir;

const TOKEN: &str = "tok-123";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    key: String,
    headers: HeaderMap,
    body: Vec<u8>,
}

#[derive(Clone)]
struct MockSwift {
    storage_url: String,
    auth_calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// Status returned by the next PUT instead of storing the object.
    next_put_status: Arc<Mutex<Option<StatusCode>>>,
}

async fn auth(State(state): State<MockSwift>, headers: HeaderMap) -> Response {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);
    let user = headers.get("x-auth-user").and_then(|v| v.to_str().ok());
    let key = headers.get("x-auth-key").and_then(|v| v.to_str().ok());
    if user != Some("me") || key != Some("secret") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (
        StatusCode::NO_CONTENT,
        [
            ("x-auth-token", TOKEN.to_string()),
            ("x-storage-url", state.storage_url.clone()),
        ],
    )
        .into_response()
}

async fn object(
    State(state): State<MockSwift>,
    method: Method,
    UrlPath((container, object)): UrlPath<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if headers.get("x-auth-token").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED;
    }
    let key = format!("{container}/{}", object.trim_start_matches('/'));
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        key: key.clone(),
        headers,
        body: body.to_vec(),
    });

    let mut objects = state.objects.lock().unwrap();
    match method {
        Method::PUT => {
            if let Some(status) = state.next_put_status.lock().unwrap().take() {
                return status;
            }
            objects.insert(key, body.to_vec());
            StatusCode::CREATED
        }
        Method::DELETE => match objects.remove(&key) {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::NOT_FOUND,
        },
        _ => StatusCode::METHOD_NOT_ALLOWED,
    }
}

/// Start the mock; returns its state and auth URL.
async fn start_mock(storage_url: Option<&str>) -> (MockSwift, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let state = MockSwift {
        storage_url: storage_url
            .map(str::to_string)
            .unwrap_or_else(|| format!("{base}/v1/AUTH_test")),
        auth_calls: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
        objects: Arc::new(Mutex::new(HashMap::new())),
        next_put_status: Arc::new(Mutex::new(None)),
    };

    let app = Router::new()
        .route("/auth/v1.0", get(auth))
        .route("/v1/AUTH_test/{container}/{*object}", any(object))
        .with_state(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("{base}/auth/v1.0"))
}

fn connector() -> SwiftConnector {
    SwiftConnector::new(reqwest::Client::builder().no_proxy().build().unwrap())
}

fn request(auth_url: &str, api_key: &str, servicenet: bool) -> ConnectionRequest {
    ConnectionRequest {
        provider: PROVIDER,
        username: "me".to_string(),
        api_key: api_key.to_string(),
        auth_url: Some(auth_url.to_string()),
        servicenet,
    }
}

fn package() -> Package {
    Package {
        trigger: "db".to_string(),
        time: "2026.10.18.03.00.00".to_string(),
        extension: "tar".to_string(),
        chunk_suffixes: vec!["aa".to_string(), "ab".to_string()],
    }
}

fn write_package(dir: &Path, package: &Package) {
    for name in package.filenames() {
        std::fs::write(dir.join(&name), format!("payload {name}")).unwrap();
    }
}

#[tokio::test]
async fn authenticate_returns_storage_url() {
    let (mock, auth_url) = start_mock(None).await;

    let conn = connector()
        .authenticate(&request(&auth_url, "secret", false))
        .await
        .unwrap();

    assert_eq!(conn.storage_url(), mock.storage_url);
    assert_eq!(mock.auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn authenticate_rejects_bad_key() {
    let (_mock, auth_url) = start_mock(None).await;

    let err = connector()
        .authenticate(&request(&auth_url, "wrong", false))
        .await
        .unwrap_err();

    assert!(matches!(err, SwiftError::Unauthorized(_)));
}

#[tokio::test]
async fn authenticate_uses_servicenet_host() {
    let (_mock, auth_url) =
        start_mock(Some("https://storage101.dfw1.clouddrive.com/v1/MossoCloudFS_abc")).await;

    let conn = connector()
        .authenticate(&request(&auth_url, "secret", true))
        .await
        .unwrap();

    assert_eq!(
        conn.storage_url(),
        "https://snet-storage101.dfw1.clouddrive.com/v1/MossoCloudFS_abc"
    );
}

#[tokio::test]
async fn transfer_then_remove_package() {
    let (mock, auth_url) = start_mock(None).await;
    let tmp = TempDir::new().unwrap();
    let pkg = package();
    write_package(tmp.path(), &pkg);

    let config = CloudFilesConfig {
        username: "me".to_string(),
        api_key: "secret".to_string(),
        auth_url: Some(auth_url),
        container: "my_backups".to_string(),
        additional_metadata: vec![
            ("X-Delete-After".to_string(), 864000i64.into()),
            ("X-Object-Meta-Source".to_string(), "host1".into()),
        ],
        ..Default::default()
    };
    let storage = CloudFilesStorage::with_connector(config, tmp.path(), connector());

    storage.transfer(&pkg).await.unwrap();

    {
        let requests = mock.requests.lock().unwrap();
        let keys: Vec<&str> = requests.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "my_backups/backups/db/2026.10.18.03.00.00/db.tar-aa",
                "my_backups/backups/db/2026.10.18.03.00.00/db.tar-ab",
            ]
        );
        for r in requests.iter() {
            assert_eq!(r.method, Method::PUT);
            assert_eq!(r.headers["x-delete-after"], "864000");
            assert_eq!(r.headers["x-object-meta-source"], "host1");
        }
        assert_eq!(requests[0].body, b"payload db.tar-aa");
        assert_eq!(requests[1].headers["content-length"], "17");
    }

    storage.remove(&pkg).await.unwrap();

    {
        let requests = mock.requests.lock().unwrap();
        let deletes: Vec<&str> = requests
            .iter()
            .filter(|r| r.method == Method::DELETE)
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(
            deletes,
            vec![
                "my_backups/backups/db/2026.10.18.03.00.00/db.tar-aa",
                "my_backups/backups/db/2026.10.18.03.00.00/db.tar-ab",
            ]
        );
    }
    assert!(mock.objects.lock().unwrap().is_empty());
    assert_eq!(mock.auth_calls.load(Ordering::SeqCst), 1);

    let err = storage.remove(&pkg).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwiftError>(),
        Some(SwiftError::NotFound(_))
    ));
}

#[tokio::test]
async fn transfer_with_bad_credentials_uploads_nothing() {
    let (mock, auth_url) = start_mock(None).await;
    let tmp = TempDir::new().unwrap();
    let pkg = package();
    write_package(tmp.path(), &pkg);

    let config = CloudFilesConfig {
        username: "me".to_string(),
        api_key: "wrong".to_string(),
        auth_url: Some(auth_url),
        container: "my_backups".to_string(),
        ..Default::default()
    };
    let storage = CloudFilesStorage::with_connector(config, tmp.path(), connector());

    assert!(storage.transfer(&pkg).await.is_err());
    assert!(mock.requests.lock().unwrap().is_empty());
}

fn storage_for(auth_url: String, dir: &Path) -> CloudFilesStorage {
    let config = CloudFilesConfig {
        username: "me".to_string(),
        api_key: "secret".to_string(),
        auth_url: Some(auth_url),
        container: "my_backups".to_string(),
        ..Default::default()
    };
    CloudFilesStorage::with_connector(config, dir, connector())
}

#[tokio::test]
async fn server_error_on_first_put_aborts_transfer() {
    let (mock, auth_url) = start_mock(None).await;
    let tmp = TempDir::new().unwrap();
    let pkg = package();
    write_package(tmp.path(), &pkg);
    *mock.next_put_status.lock().unwrap() = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let storage = storage_for(auth_url, tmp.path());

    let err = storage.transfer(&pkg).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SwiftError>(),
        Some(SwiftError::UnexpectedStatus {
            operation: "put_object",
            status: 500
        })
    ));
    let requests = mock.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].key.ends_with("db.tar-aa"));
    assert!(mock.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn put_requires_created_status() {
    let (mock, auth_url) = start_mock(None).await;
    let tmp = TempDir::new().unwrap();
    let pkg = package();
    write_package(tmp.path(), &pkg);
    *mock.next_put_status.lock().unwrap() = Some(StatusCode::ACCEPTED);
    let storage = storage_for(auth_url, tmp.path());

    let err = storage.transfer(&pkg).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SwiftError>(),
        Some(SwiftError::UnexpectedStatus { status: 202, .. })
    ));
    assert_eq!(mock.requests.lock().unwrap().len(), 1);
}
