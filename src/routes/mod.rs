//! Notebook-server REST surface.
//!
//! # Data Flow
//! ```text
//! Services (optional collaborators)
//!     → register_all(router, services)
//!     → per-group `register` functions add patterns in a fixed order
//!     → handlers decode params, call the collaborator, build a Response
//! ```
//!
//! # Design Decisions
//! - A route group is registered only when its collaborator is present
//! - Within a group, specific patterns are registered before catch-alls
//! - Handlers are plain `async fn`s bound to their service by `with_service`

pub mod contents;
pub mod drive;
pub mod kernels;
pub mod licenses;
pub mod sessions;
pub mod settings;

use std::future::Future;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::drive::DriveClient;
use crate::http::{Request, Response};
use crate::routing::{Captures, PatternError, Router};
use crate::services::{Contents, KernelSpecs, Kernels, Licenses, Sessions, Settings, Translation};

/// Collaborators backing the route groups.
#[derive(Clone, Default)]
pub struct Services {
    pub contents: Option<Arc<dyn Contents>>,
    pub kernels: Option<Arc<dyn Kernels>>,
    pub kernelspecs: Option<Arc<dyn KernelSpecs>>,
    pub sessions: Option<Arc<dyn Sessions>>,
    pub settings: Option<Arc<dyn Settings>>,
    pub translation: Option<Arc<dyn Translation>>,
    pub licenses: Option<Arc<dyn Licenses>>,
    pub drive: Option<Arc<DriveClient>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(mut self, contents: Arc<dyn Contents>) -> Self {
        self.contents = Some(contents);
        self
    }

    pub fn with_kernels(mut self, kernels: Arc<dyn Kernels>) -> Self {
        self.kernels = Some(kernels);
        self
    }

    pub fn with_kernelspecs(mut self, kernelspecs: Arc<dyn KernelSpecs>) -> Self {
        self.kernelspecs = Some(kernelspecs);
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn Sessions>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_translation(mut self, translation: Arc<dyn Translation>) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn with_licenses(mut self, licenses: Arc<dyn Licenses>) -> Self {
        self.licenses = Some(licenses);
        self
    }

    pub fn with_drive(mut self, client: Arc<DriveClient>) -> Self {
        self.drive = Some(client);
        self
    }
}

/// Register every route group whose collaborator is available.
pub fn register_all(router: &mut Router, services: &Services) -> Result<(), PatternError> {
    if let Some(contents) = &services.contents {
        contents::register(router, contents)?;
    }
    if let Some(client) = &services.drive {
        drive::register(router, client)?;
    }
    if let Some(kernels) = &services.kernels {
        kernels::register_kernels(router, kernels)?;
    }
    if let Some(kernelspecs) = &services.kernelspecs {
        kernels::register_kernelspecs(router, kernelspecs)?;
    }
    if let Some(licenses) = &services.licenses {
        licenses::register(router, licenses)?;
    }
    licenses::register_nbconvert(router)?;
    if let Some(sessions) = &services.sessions {
        sessions::register(router, sessions)?;
    }
    if let Some(settings) = &services.settings {
        settings::register_settings(router, settings)?;
    }
    if let Some(translation) = &services.translation {
        settings::register_translations(router, translation)?;
    }

    tracing::info!(routes = router.routes().len(), "Routes registered");
    Ok(())
}

/// Bind a handler taking its service as first argument.
pub(crate) fn with_service<S, H, Fut>(
    service: &Arc<S>,
    handler: H,
) -> impl Fn(Request, Captures) -> Fut + Send + Sync + 'static
where
    S: ?Sized + Send + Sync + 'static,
    H: Fn(Arc<S>, Request, Captures) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Response>> + Send + 'static,
{
    let service = Arc::clone(service);
    move |request, captures| handler(Arc::clone(&service), request, captures)
}
