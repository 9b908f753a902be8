//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use lite_server::config::LimitsConfig;
use lite_server::routes::{register_all, Services};
use lite_server::services::contents::{
    Checkpoint, ContentType, ContentsError, ContentsResult, FetchOptions, Model, NewUntitled,
    SaveOptions,
};
use lite_server::services::kernels::KernelSpecsModel;
use lite_server::services::{
    Contents, KernelSpecs, Kernels, Licenses, MemoryContents, Sessions, Settings, Translation,
};
use lite_server::services::{ServiceError, ServiceResult};
use lite_server::{HttpServer, Router};

/// Content store that counts mutating calls before delegating to memory.
#[derive(Debug, Default)]
pub struct CountingContents {
    pub inner: MemoryContents,
    pub renames: AtomicUsize,
    pub saves: AtomicUsize,
}

impl CountingContents {
    pub fn renames(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Contents for CountingContents {
    async fn get(&self, path: &str, options: FetchOptions) -> ContentsResult<Model> {
        self.inner.get(path, options).await
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        self.inner.delete(path).await
    }

    async fn rename(&self, path: &str, new_path: &str) -> ContentsResult<Model> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        self.inner.rename(path, new_path).await
    }

    async fn new_untitled(&self, options: NewUntitled) -> ContentsResult<Model> {
        self.inner.new_untitled(options).await
    }

    async fn save(&self, path: &str, options: SaveOptions) -> ContentsResult<Model> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(path, options).await
    }

    async fn copy(&self, path: &str, to_dir: &str) -> ContentsResult<Model> {
        self.inner.copy(path, to_dir).await
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<Checkpoint> {
        self.inner.create_checkpoint(path).await
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<Checkpoint>> {
        self.inner.list_checkpoints(path).await
    }

    async fn restore_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        self.inner.restore_checkpoint(path, checkpoint_id).await
    }

    async fn delete_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        self.inner.delete_checkpoint(path, checkpoint_id).await
    }
}

/// Memory store whose `rename` always fails.
#[derive(Debug, Default)]
pub struct RenameFailingContents {
    pub inner: MemoryContents,
}

#[async_trait]
impl Contents for RenameFailingContents {
    async fn get(&self, path: &str, options: FetchOptions) -> ContentsResult<Model> {
        self.inner.get(path, options).await
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        self.inner.delete(path).await
    }

    async fn rename(&self, path: &str, _new_path: &str) -> ContentsResult<Model> {
        Err(ContentsError::Other(format!("rename of {} refused", path)))
    }

    async fn new_untitled(&self, options: NewUntitled) -> ContentsResult<Model> {
        self.inner.new_untitled(options).await
    }

    async fn save(&self, path: &str, options: SaveOptions) -> ContentsResult<Model> {
        self.inner.save(path, options).await
    }

    async fn copy(&self, path: &str, to_dir: &str) -> ContentsResult<Model> {
        self.inner.copy(path, to_dir).await
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<Checkpoint> {
        self.inner.create_checkpoint(path).await
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<Checkpoint>> {
        self.inner.list_checkpoints(path).await
    }

    async fn restore_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        self.inner.restore_checkpoint(path, checkpoint_id).await
    }

    async fn delete_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        self.inner.delete_checkpoint(path, checkpoint_id).await
    }
}

/// Read-only store listing one directory whose entries carry only a few fields.
#[derive(Debug)]
pub struct SparseListingContents {
    pub children: Value,
}

impl SparseListingContents {
    fn unsupported<T>(&self) -> ContentsResult<T> {
        Err(ContentsError::Other("read-only".to_string()))
    }
}

#[async_trait]
impl Contents for SparseListingContents {
    async fn get(&self, path: &str, options: FetchOptions) -> ContentsResult<Model> {
        Ok(Model {
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            path: path.to_string(),
            kind: ContentType::Directory,
            created: String::new(),
            last_modified: String::new(),
            content: if options.content {
                self.children.clone()
            } else {
                Value::Null
            },
            format: None,
            mimetype: None,
            size: None,
            writable: false,
        })
    }

    async fn delete(&self, _path: &str) -> ContentsResult<()> {
        self.unsupported()
    }

    async fn rename(&self, _path: &str, _new_path: &str) -> ContentsResult<Model> {
        self.unsupported()
    }

    async fn new_untitled(&self, _options: NewUntitled) -> ContentsResult<Model> {
        self.unsupported()
    }

    async fn save(&self, _path: &str, _options: SaveOptions) -> ContentsResult<Model> {
        self.unsupported()
    }

    async fn copy(&self, _path: &str, _to_dir: &str) -> ContentsResult<Model> {
        self.unsupported()
    }

    async fn create_checkpoint(&self, _path: &str) -> ContentsResult<Checkpoint> {
        self.unsupported()
    }

    async fn list_checkpoints(&self, _path: &str) -> ContentsResult<Vec<Checkpoint>> {
        self.unsupported()
    }

    async fn restore_checkpoint(&self, _path: &str, _checkpoint_id: &str) -> ContentsResult<()> {
        self.unsupported()
    }

    async fn delete_checkpoint(&self, _path: &str, _checkpoint_id: &str) -> ContentsResult<()> {
        self.unsupported()
    }
}

/// Kernels keyed by id; restart bumps a counter.
#[derive(Debug, Default)]
pub struct MockKernels {
    pub restarts: Mutex<BTreeMap<String, u32>>,
    pub shut_down: Mutex<Vec<String>>,
}

#[async_trait]
impl Kernels for MockKernels {
    async fn restart(&self, kernel_id: &str) -> ServiceResult<Value> {
        let mut restarts = self.restarts.lock().unwrap();
        let count = restarts.entry(kernel_id.to_string()).or_insert(0);
        *count += 1;
        Ok(json!({"id": kernel_id, "name": "python", "restarts": *count}))
    }

    async fn shutdown(&self, kernel_id: &str) -> ServiceResult<()> {
        if kernel_id == "missing" {
            return Err(ServiceError::NotFound(kernel_id.to_string()));
        }
        self.shut_down.lock().unwrap().push(kernel_id.to_string());
        Ok(())
    }
}

pub struct MockKernelSpecs(pub Option<KernelSpecsModel>);

impl KernelSpecs for MockKernelSpecs {
    fn specs(&self) -> Option<KernelSpecsModel> {
        self.0.clone()
    }
}

pub fn python_specs() -> KernelSpecsModel {
    KernelSpecsModel {
        default: "python".to_string(),
        kernelspecs: BTreeMap::from([(
            "python".to_string(),
            json!({
                "display_name": "Python (Pyodide)",
                "language": "python",
                "resources": {"logo-32x32": "/kernelspecs/python.png"}
            }),
        )]),
    }
}

/// Sessions store; records the last patch payload.
#[derive(Debug, Default)]
pub struct MockSessions {
    pub sessions: Mutex<BTreeMap<String, Value>>,
    pub last_patch: Mutex<Option<Value>>,
}

#[async_trait]
impl Sessions for MockSessions {
    async fn get(&self, session_id: &str) -> ServiceResult<Value> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(session_id.to_string()))
    }

    async fn list(&self) -> ServiceResult<Value> {
        Ok(Value::Array(self.sessions.lock().unwrap().values().cloned().collect()))
    }

    async fn patch(&self, options: Value) -> ServiceResult<Value> {
        *self.last_patch.lock().unwrap() = Some(options.clone());
        Ok(options)
    }

    async fn shutdown(&self, session_id: &str) -> ServiceResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(session_id.to_string()))
    }

    async fn start_new(&self, options: Value) -> ServiceResult<Value> {
        let Some(path) = options.get("path").and_then(Value::as_str) else {
            return Err(ServiceError::Invalid("path is required".to_string()));
        };
        let mut sessions = self.sessions.lock().unwrap();
        let id = format!("session-{}", sessions.len() + 1);
        let session = json!({"id": id, "path": path});
        sessions.insert(id, session.clone());
        Ok(session)
    }
}

/// Settings keyed by plugin id.
#[derive(Debug, Default)]
pub struct MockSettings {
    pub raw: Mutex<BTreeMap<String, String>>,
}

#[async_trait]
impl Settings for MockSettings {
    async fn get(&self, plugin_id: &str) -> ServiceResult<Value> {
        let raw = self.raw.lock().unwrap().get(plugin_id).cloned();
        Ok(json!({"id": plugin_id, "raw": raw.unwrap_or_else(|| "{}".to_string())}))
    }

    async fn save(&self, plugin_id: &str, raw: &str) -> ServiceResult<()> {
        self.raw
            .lock()
            .unwrap()
            .insert(plugin_id.to_string(), raw.to_string());
        Ok(())
    }

    async fn get_all(&self) -> ServiceResult<Value> {
        let ids: Vec<_> = self.raw.lock().unwrap().keys().cloned().collect();
        Ok(json!({"settings": ids}))
    }
}

pub struct MockTranslation;

#[async_trait]
impl Translation for MockTranslation {
    async fn get(&self, locale: &str) -> ServiceResult<Value> {
        Ok(json!({"locale": locale}))
    }
}

pub struct MockLicenses;

#[async_trait]
impl Licenses for MockLicenses {
    async fn get(&self) -> ServiceResult<Value> {
        Ok(json!({"bundles": {}}))
    }
}

/// Every collaborator, with handles kept for assertions.
pub struct Fixture {
    pub contents: Arc<CountingContents>,
    pub kernels: Arc<MockKernels>,
    pub sessions: Arc<MockSessions>,
    pub settings: Arc<MockSettings>,
    pub router: Arc<Router>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_kernelspecs(Some(python_specs()))
    }

    pub fn with_kernelspecs(specs: Option<KernelSpecsModel>) -> Self {
        let contents = Arc::new(CountingContents::default());
        let kernels = Arc::new(MockKernels::default());
        let sessions = Arc::new(MockSessions::default());
        let settings = Arc::new(MockSettings::default());

        let services = Services::new()
            .with_contents(contents.clone())
            .with_kernels(kernels.clone())
            .with_kernelspecs(Arc::new(MockKernelSpecs(specs)))
            .with_sessions(sessions.clone())
            .with_settings(settings.clone())
            .with_translation(Arc::new(MockTranslation))
            .with_licenses(Arc::new(MockLicenses));

        let mut router = Router::new();
        register_all(&mut router, &services).unwrap();

        Self {
            contents,
            kernels,
            sessions,
            settings,
            router: Arc::new(router),
        }
    }

    /// The axum app around the router.
    pub fn app(&self) -> axum::Router {
        HttpServer::new(&LimitsConfig::default(), self.router.clone()).into_router()
    }
}

/// Send one request through the axum app and decode the reply.
///
/// An empty body decodes as `Value::Null`.
pub async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
