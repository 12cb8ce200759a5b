use super::*;
use crate::reference::registry_host;
use std::cell::RefCell;

/// Engine double that records every call and fails calls matching a prefix.
#[derive(Default)]
struct RecordingEngine {
    calls: RefCell<Vec<String>>,
    failing: Vec<String>,
}

impl RecordingEngine {
    fn failing_on(prefixes: &[&str]) -> Self {
        Self {
            calls: RefCell::default(),
            failing: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, operation: &str, call: String) -> Result<()> {
        let fail = self.failing.iter().any(|prefix| call.starts_with(prefix));
        self.calls.borrow_mut().push(call);
        if fail {
            Err(RegcopyError::engine_exit(operation, Some(1)))
        } else {
            Ok(())
        }
    }
}

impl Engine for RecordingEngine {
    async fn login(&self, url: &str, username: &str, _password: &str) -> Result<()> {
        self.record("login", format!("login {} {}", url, username))
    }

    async fn pull(&self, image: &ImageRef) -> Result<()> {
        self.record("image pull", format!("pull {}", image))
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<()> {
        self.record("image tag", format!("tag {} {}", source, target))
    }

    async fn push(&self, image: &ImageRef) -> Result<()> {
        self.record("image push", format!("push {}", image))
    }

    async fn remove(&self, images: &[&ImageRef]) -> Result<()> {
        let names: Vec<String> = images.iter().map(|i| i.to_string()).collect();
        self.record("image rm", format!("rm {}", names.join(" ")))
    }
}

const DST: &str = "dst.example.com";

fn app_config(source_url: &str) -> AppConfig {
    AppConfig {
        source_url: source_url.to_string(),
        source_login: "reader".to_string(),
        source_password: "reader-pass".to_string(),
        source_include: "^team/".to_string(),
        destination_url: DST.to_string(),
        destination_login: "writer".to_string(),
        destination_password: "writer-pass".to_string(),
        ..AppConfig::default()
    }
}

/// The engine calls a successful copy of `repo:tag` issues.
fn copy_calls(src: &str, repo: &str, tag: &str) -> Vec<String> {
    let s = format!("{}/{}:{}", src, repo, tag);
    let d = format!("{}/{}:{}", DST, repo, tag);
    vec![
        format!("pull {}", s),
        format!("tag {} {}", s, d),
        format!("push {}", d),
        format!("rm {} {}", s, d),
    ]
}

async fn catalog_server() -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let catalog = server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories": ["alpine", "team/api", "team/web"]}"#)
        .create_async()
        .await;
    (server, catalog)
}

async fn tags_mock(
    server: &mut mockito::ServerGuard,
    repository: &str,
    tags: &[&str],
) -> mockito::Mock {
    let body = serde_json::json!({ "name": repository, "tags": tags }).to_string();
    server
        .mock("GET", format!("/v2/{}/tags/list", repository).as_str())
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_run_copies_every_matching_tag_in_order() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0", "2.0"]).await;
    let _web = tags_mock(&mut server, "team/web", &["latest"]).await;
    let unmatched = server
        .mock("GET", "/v2/alpine/tags/list")
        .expect(0)
        .create_async()
        .await;

    let copier = Copier::with_engine(&app_config(&server.url()), RecordingEngine::default())
        .unwrap();
    let summary = copier.run().await.unwrap();

    unmatched.assert_async().await;
    let src = registry_host(&server.url()).to_string();
    let mut expected = vec![
        format!("login {} reader", src),
        format!("login {} writer", DST),
    ];
    expected.extend(copy_calls(&src, "team/api", "1.0"));
    expected.extend(copy_calls(&src, "team/api", "2.0"));
    expected.extend(copy_calls(&src, "team/web", "latest"));

    assert_eq!(copier.engine().calls(), expected);
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.failed(), 0);
    assert!(summary.is_clean());
    assert_eq!(summary.copied[2].target.to_string(), "dst.example.com/team/web:latest");
}

#[tokio::test]
async fn test_default_include_matches_every_repository() {
    let (mut server, _catalog) = catalog_server().await;
    let _alpine = tags_mock(&mut server, "alpine", &["3"]).await;
    let _api = tags_mock(&mut server, "team/api", &[]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let config = AppConfig {
        source_include: AppConfig::default().source_include,
        ..app_config(&server.url())
    };
    let copier = Copier::with_engine(&config, RecordingEngine::default()).unwrap();
    let summary = copier.run().await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.copied[0].repository, "alpine");
}

#[tokio::test]
async fn test_tag_listing_failure_skips_repository_only() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = server
        .mock("GET", "/v2/team/api/tags/list")
        .with_status(500)
        .create_async()
        .await;
    let _web = tags_mock(&mut server, "team/web", &["latest"]).await;

    let copier = Copier::with_engine(&app_config(&server.url()), RecordingEngine::default())
        .unwrap();
    let summary = copier.run().await.unwrap();

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].repository, "team/api");
    assert_eq!(summary.succeeded(), 1);
    assert!(!summary.is_clean());
}

#[tokio::test]
async fn test_malformed_tags_response_skips_repository() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = server
        .mock("GET", "/v2/team/api/tags/list")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;
    let _web = tags_mock(&mut server, "team/web", &["latest"]).await;

    let copier = Copier::with_engine(&app_config(&server.url()), RecordingEngine::default())
        .unwrap();
    let summary = copier.run().await.unwrap();

    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].error.contains("team/api"));
    assert_eq!(summary.succeeded(), 1);
}

#[tokio::test]
async fn test_push_failure_skips_remove_and_continues() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0", "2.0"]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let engine = RecordingEngine::failing_on(&["push dst.example.com/team/api:1.0"]);
    let copier = Copier::with_engine(&app_config(&server.url()), engine).unwrap();
    let summary = copier.run().await.unwrap();

    let src = registry_host(&server.url()).to_string();
    let calls = copier.engine().calls();
    let first_copy = &calls[2..5];
    assert_eq!(first_copy, &copy_calls(&src, "team/api", "1.0")[..3]);
    assert_eq!(&calls[5..], &copy_calls(&src, "team/api", "2.0")[..]);

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].step, CopyStep::Push);
    assert_eq!(summary.failures[0].job.tag, "1.0");
    assert_eq!(summary.succeeded(), 1);
}

#[tokio::test]
async fn test_pull_failure_stops_sequence_for_that_tag() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["broken"]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let engine = RecordingEngine::failing_on(&["pull"]);
    let copier = Copier::with_engine(&app_config(&server.url()), engine).unwrap();
    let summary = copier.run().await.unwrap();

    let calls = copier.engine().calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[2].starts_with("pull "));
    assert_eq!(summary.failures[0].step, CopyStep::Pull);
}

#[tokio::test]
async fn test_remove_failure_is_recorded() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0"]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let engine = RecordingEngine::failing_on(&["rm"]);
    let copier = Copier::with_engine(&app_config(&server.url()), engine).unwrap();
    let summary = copier.run().await.unwrap();

    assert_eq!(copier.engine().calls().len(), 6);
    assert_eq!(summary.failures[0].step, CopyStep::Remove);
    assert_eq!(summary.succeeded(), 0);
}

#[tokio::test]
async fn test_cleanup_on_failure_removes_local_images() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0"]).await;
    let _web = tags_mock(&mut server, "team/web", &["2.0"]).await;

    let engine = RecordingEngine::failing_on(&[
        "push dst.example.com/team/api:1.0",
        "tag ",
    ]);
    let config = AppConfig {
        cleanup_on_failure: true,
        ..app_config(&server.url())
    };
    let copier = Copier::with_engine(&config, engine).unwrap();
    let summary = copier.run().await.unwrap();

    let src = registry_host(&server.url()).to_string();
    let calls = copier.engine().calls();
    // tag fails for both tags, so only the pulled source image is removed
    assert_eq!(
        &calls[2..],
        &[
            format!("pull {}/team/api:1.0", src),
            format!("tag {}/team/api:1.0 {}/team/api:1.0", src, DST),
            format!("rm {}/team/api:1.0", src),
            format!("pull {}/team/web:2.0", src),
            format!("tag {}/team/web:2.0 {}/team/web:2.0", src, DST),
            format!("rm {}/team/web:2.0", src),
        ]
    );
    assert_eq!(summary.failed(), 2);
    assert!(summary.failures.iter().all(|f| f.step == CopyStep::Tag));
}

#[tokio::test]
async fn test_cleanup_after_failed_push_removes_both_names() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0"]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let engine = RecordingEngine::failing_on(&["push"]);
    let config = AppConfig {
        cleanup_on_failure: true,
        ..app_config(&server.url())
    };
    let copier = Copier::with_engine(&config, engine).unwrap();
    let summary = copier.run().await.unwrap();

    let src = registry_host(&server.url()).to_string();
    let calls = copier.engine().calls();
    assert_eq!(calls.last().unwrap(), &copy_calls(&src, "team/api", "1.0")[3]);
    assert_eq!(summary.failures[0].step, CopyStep::Push);
}

#[tokio::test]
async fn test_login_failure_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let catalog = server
        .mock("GET", "/v2/_catalog")
        .expect(0)
        .create_async()
        .await;

    let prefix = format!("login {}", DST);
    let engine = RecordingEngine::failing_on(&[prefix.as_str()]);
    let copier = Copier::with_engine(&app_config(&server.url()), engine).unwrap();
    let result = copier.run().await;

    catalog.assert_async().await;
    assert!(matches!(result.unwrap_err(), RegcopyError::Engine { .. }));
    assert_eq!(copier.engine().calls().len(), 2);
}

#[tokio::test]
async fn test_catalog_failure_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _catalog = server
        .mock("GET", "/v2/_catalog")
        .with_status(401)
        .create_async()
        .await;

    let copier = Copier::with_engine(&app_config(&server.url()), RecordingEngine::default())
        .unwrap();
    let result = copier.run().await;

    assert!(matches!(
        result.unwrap_err(),
        RegcopyError::Authentication { .. }
    ));
    assert_eq!(copier.engine().calls().len(), 2);
}

#[test]
fn test_invalid_include_pattern_is_fatal() {
    let config = AppConfig {
        source_include: "([".to_string(),
        ..app_config("src.example.com")
    };
    let result = Copier::with_engine(&config, RecordingEngine::default());
    assert!(matches!(result, Err(RegcopyError::Validation { .. })));
}

#[tokio::test]
async fn test_anonymous_registries_skip_login() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &[]).await;
    let _web = tags_mock(&mut server, "team/web", &[]).await;

    let config = AppConfig {
        source_login: String::new(),
        destination_login: String::new(),
        ..app_config(&server.url())
    };
    let copier = Copier::with_engine(&config, RecordingEngine::default()).unwrap();
    let summary = copier.run().await.unwrap();

    assert!(copier.engine().calls().is_empty());
    assert_eq!(summary, CopySummary::default());
}

#[tokio::test]
async fn test_plan_lists_tags_without_engine_calls() {
    let (mut server, _catalog) = catalog_server().await;
    let _api = tags_mock(&mut server, "team/api", &["1.0", "2.0"]).await;
    let _web = server
        .mock("GET", "/v2/team/web/tags/list")
        .with_status(404)
        .create_async()
        .await;

    let copier = Copier::with_engine(&app_config(&server.url()), RecordingEngine::default())
        .unwrap();
    let plan = copier.plan().await.unwrap();

    assert!(copier.engine().calls().is_empty());
    assert_eq!(
        plan.repositories,
        vec![PlannedRepository {
            repository: "team/api".to_string(),
            tags: vec!["1.0".to_string(), "2.0".to_string()],
        }]
    );
    assert_eq!(plan.skipped[0].repository, "team/web");
    assert_eq!(plan.tag_count(), 2);
}

#[test]
fn test_job_references() {
    let copier = Copier::with_engine(
        &app_config("https://src.example.com/"),
        RecordingEngine::default(),
    )
    .unwrap();
    let job = copier.job("team/api", "1.0");

    assert_eq!(job.source.to_string(), "src.example.com/team/api:1.0");
    assert_eq!(job.target.to_string(), "dst.example.com/team/api:1.0");
}

#[test]
fn test_copy_step_display() {
    assert_eq!(CopyStep::Pull.to_string(), "pull");
    assert_eq!(CopyStep::Remove.to_string(), "remove");
}
