//! Route table tests against mock collaborators.

use axum::http::StatusCode;
use serde_json::json;

use lite_server::http::{Method, Request};
use lite_server::routes::{register_all, Services};
use lite_server::Router;

mod common;

use common::{send, Fixture};

#[tokio::test]
async fn test_nbconvert_is_always_registered() {
    let mut router = Router::new();
    register_all(&mut router, &Services::new()).unwrap();
    assert_eq!(router.routes().len(), 1);

    let res = router
        .dispatch(Request::new(Method::Get, "/api/nbconvert"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(res.body_json(), Some(&json!({})));

    // Groups without a collaborator are absent
    assert!(router
        .dispatch(Request::new(Method::Get, "/api/sessions"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_contents_lifecycle_over_http() {
    let fixture = Fixture::new();

    let (status, dir) = send(
        fixture.app(),
        "POST",
        "/api/contents",
        Some(json!({"type": "directory"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dir["path"], "Untitled Folder");

    let (status, renamed) = send(
        fixture.app(),
        "PATCH",
        "/api/contents/Untitled%20Folder",
        Some(json!({"path": "work"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["path"], "work");

    let (status, file) = send(
        fixture.app(),
        "PUT",
        "/api/contents/work/a.txt",
        Some(json!({"type": "file", "format": "text", "content": "one"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(file["name"], "a.txt");

    let (status, listing) = send(fixture.app(), "GET", "/api/contents/work?content=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["type"], "directory");
    assert_eq!(listing["content"][0]["name"], "a.txt");

    let (status, copy) = send(
        fixture.app(),
        "POST",
        "/api/contents/work",
        Some(json!({"copy_from": "work/a.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["name"], "a-Copy1.txt");

    let (status, body) = send(fixture.app(), "DELETE", "/api/contents/work/a.txt", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(fixture.app(), "GET", "/api/contents/work/a.txt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(fixture.contents.renames(), 1);
    assert_eq!(fixture.contents.saves(), 1);
}

#[tokio::test]
async fn test_checkpoint_routes() {
    let fixture = Fixture::new();
    send(
        fixture.app(),
        "PUT",
        "/api/contents/nb.ipynb",
        Some(json!({"type": "notebook", "format": "json", "content": {"cells": []}})),
    )
    .await;

    let (status, checkpoint) =
        send(fixture.app(), "POST", "/api/contents/nb.ipynb/checkpoints", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = checkpoint["id"].as_str().unwrap().to_string();

    let (status, list) =
        send(fixture.app(), "GET", "/api/contents/nb.ipynb/checkpoints", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], id.as_str());

    send(
        fixture.app(),
        "PUT",
        "/api/contents/nb.ipynb",
        Some(json!({"type": "notebook", "format": "json", "content": {"cells": [1]}})),
    )
    .await;

    let uri = format!("/api/contents/nb.ipynb/checkpoints/{}", id);
    let (status, _) = send(fixture.app(), "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, restored) = send(fixture.app(), "GET", "/api/contents/nb.ipynb?content=1", None).await;
    assert_eq!(restored["content"], json!({"cells": []}));

    let (status, _) = send(fixture.app(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(fixture.app(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kernel_routes() {
    let fixture = Fixture::new();

    let (status, model) = send(fixture.app(), "POST", "/api/kernels/k1/restart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(model["restarts"], 1);

    let (status, _) = send(fixture.app(), "DELETE", "/api/kernels/k1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(*fixture.kernels.shut_down.lock().unwrap(), vec!["k1".to_string()]);

    let (status, _) = send(fixture.app(), "DELETE", "/api/kernels/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Empty id is a parameter error
    let (status, _) = send(fixture.app(), "DELETE", "/api/kernels/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_kernelspecs_listing() {
    let fixture = Fixture::new();
    let (status, specs) = send(fixture.app(), "GET", "/api/kernelspecs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(specs["default"], "python");
    assert_eq!(specs["kernelspecs"]["python"]["name"], "python");
    assert_eq!(specs["kernelspecs"]["python"]["spec"]["language"], "python");
    assert_eq!(
        specs["kernelspecs"]["python"]["resources"]["logo-32x32"],
        "/kernelspecs/python.png"
    );

    let fixture = Fixture::with_kernelspecs(None);
    let (status, specs) = send(fixture.app(), "GET", "/api/kernelspecs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(specs.is_null());
}

#[tokio::test]
async fn test_session_routes() {
    let fixture = Fixture::new();

    let (status, session) = send(
        fixture.app(),
        "POST",
        "/api/sessions",
        Some(json!({"path": "nb.ipynb"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["id"], "session-1");

    let (status, fetched) = send(fixture.app(), "GET", "/api/sessions/session-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["path"], "nb.ipynb");

    let (_, list) = send(fixture.app(), "GET", "/api/sessions", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let patch = json!({"id": "session-1", "path": "renamed.ipynb"});
    let (status, patched) =
        send(fixture.app(), "PATCH", "/api/sessions/session-1", Some(patch.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched, patch);
    assert_eq!(*fixture.sessions.last_patch.lock().unwrap(), Some(patch));

    let (status, _) = send(fixture.app(), "DELETE", "/api/sessions/session-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(fixture.app(), "GET", "/api/sessions/session-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(fixture.app(), "POST", "/api/sessions", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_routes() {
    let fixture = Fixture::new();
    let plugin = "/api/settings/@jupyterlab/apputils-extension:themes";

    let (status, _) = send(
        fixture.app(),
        "PUT",
        plugin,
        Some(json!({"raw": "{\"theme\": \"dark\"}"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        fixture
            .settings
            .raw
            .lock()
            .unwrap()
            .get("@jupyterlab/apputils-extension:themes")
            .map(String::as_str),
        Some("{\"theme\": \"dark\"}")
    );

    let (status, setting) = send(fixture.app(), "GET", plugin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(setting["id"], "@jupyterlab/apputils-extension:themes");

    // Unscoped plugin ids match too
    let (_, setting) = send(fixture.app(), "GET", "/api/settings/pkg:plugin", None).await;
    assert_eq!(setting["id"], "pkg:plugin");

    let (status, all) = send(fixture.app(), "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["settings"][0], "@jupyterlab/apputils-extension:themes");

    // Not a plugin id
    let (status, _) = send(fixture.app(), "GET", "/api/settings/no-colon", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(fixture.app(), "PUT", plugin, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_translation_locale() {
    let fixture = Fixture::new();
    for (uri, locale) in [
        ("/api/translations", "all"),
        ("/api/translations/", "all"),
        ("/api/translations/fr_FR", "fr_FR"),
    ] {
        let (status, data) = send(fixture.app(), "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(data["locale"], locale, "{}", uri);
    }
}

#[tokio::test]
async fn test_licenses() {
    let fixture = Fixture::new();
    let (status, report) = send(fixture.app(), "GET", "/api/licenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({"bundles": {}}));
}
