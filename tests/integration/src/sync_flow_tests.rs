//! End-to-end flow across crates
//!
//! Config loading -> git provider -> sync engine -> generated files and
//! manifest, all against local remotes.

use std::fs;

use actsync_core::{
    AddRequest, Config, DriftStatus, OutcomeStatus, SyncEngine, SyncOptions, UpdateTarget,
};
use actsync_fs::NormalizedPath;
use actsync_git::{GitProvider, RetryPolicy};
use actsync_test_utils::git::{ActionRemotes, action_yaml};
use actsync_test_utils::project::TestProject;
use pretty_assertions::assert_eq;
use serde_json::Value;

fn engine(project: &TestProject) -> SyncEngine {
    engine_with(project, SyncOptions::default())
}

fn engine_with(project: &TestProject, options: SyncOptions) -> SyncEngine {
    let root = NormalizedPath::new(project.root());
    let config = Config::load(&root).unwrap();
    let provider = GitProvider::new(&config.provider)
        .unwrap()
        .with_retry(RetryPolicy::none());
    SyncEngine::new(root, config, provider).with_options(options)
}

fn add(references: &[&str]) -> Vec<AddRequest> {
    references
        .iter()
        .map(|r| AddRequest::parse(r).unwrap())
        .collect()
}

#[test]
fn lifecycle_add_move_update_remove() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);

    let deploy = remotes.create("acme", "deploy");
    let v1 = deploy.commit_action(None, &action_yaml("Deploy", &[("environment", true)], &[]));
    deploy.tag("v1.0.0", &v1);
    deploy.tag("v1", &v1);

    let toolkit = remotes.create("acme", "toolkit");
    let tk = toolkit.commit_action(
        Some("lint/rust"),
        &action_yaml("Lint", &[("toolchain", false)], &["report"]),
    );
    toolkit.tag("v3.2.1", &tk);

    let report = engine(&project)
        .add(add(&["acme/deploy", "acme/toolkit/lint/rust"]))
        .unwrap();
    assert!(!report.has_failures());
    assert_eq!(
        report.files_written(),
        vec!["src/actions/deploy.rs", "src/actions/toolkit_lint_rust.rs"]
    );
    assert_eq!(report.outcomes[1].tag.as_deref(), Some("v3.2.1"));

    // Regeneration without upstream change writes nothing.
    let report = engine(&project).regenerate_all().unwrap();
    assert!(report.files_written().is_empty());
    assert!(!report.manifest_written);

    // Upstream moves the floating major.
    let v1_1 = deploy.commit_action(
        None,
        &action_yaml("Deploy", &[("environment", true), ("dry_run", false)], &[]),
    );
    deploy.tag("v1.1.0", &v1_1);
    deploy.tag("v1", &v1_1);

    let engine = engine(&project);
    let key = actsync_core::ActionKey::parse("acme/deploy").unwrap();
    let report = engine.update(UpdateTarget::One(key.clone())).unwrap();
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Updated);
    assert_eq!(report.outcomes[0].sha.as_deref(), Some(v1_1.as_str()));
    assert!(project.read("src/actions/deploy.rs").contains("dry_run"));

    let report = engine.remove(&key, false).unwrap();
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Removed);
    project.assert_file_not_exists("src/actions/deploy.rs");
    project.assert_file_exists("src/actions/toolkit_lint_rust.rs");

    let manifest = engine.manifest().unwrap();
    assert_eq!(manifest.len(), 1);
    assert!(engine.check().unwrap().is_clean());
}

#[test]
fn abbreviated_sha_pins_without_a_tag() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);
    let deploy = remotes.create("acme", "deploy");
    let sha = deploy.commit_action(None, &action_yaml("Deploy", &[], &[]));
    deploy.tag("v1", &sha);

    let reference = format!("acme/deploy@{}", &sha[..12]);
    let report = engine(&project).add(add(&[reference.as_str()])).unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Created);
    assert_eq!(outcome.sha.as_deref(), Some(sha.as_str()));
    assert_eq!(outcome.tag, None);

    let manifest: Value = serde_json::from_str(&project.read("actsync.lock.json")).unwrap();
    assert_eq!(manifest["entries"][0]["requestedRef"], &sha[..12]);
    assert_eq!(manifest["entries"][0]["resolvedSha"], sha.as_str());
}

#[test]
fn mixed_case_paths_are_fetched_and_pinned_as_spelled() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);

    let toolkit = remotes.create("acme", "toolkit");
    let setup = toolkit.commit_action(
        Some("Setup"),
        &action_yaml("Setup", &[("version", false)], &[]),
    );
    toolkit.tag("v1", &setup);
    let deploy = remotes.create("Acme", "Deploy");
    let v1 = deploy.commit_action(None, &action_yaml("Deploy", &[], &[]));
    deploy.tag("v1", &v1);

    let engine = engine(&project);
    let report = engine.add(add(&["acme/toolkit/Setup", "Acme/Deploy@v1"])).unwrap();
    assert!(!report.has_failures(), "{:?}", report.outcomes);

    let binding = project.read("src/actions/toolkit_setup.rs");
    assert!(binding.contains(&format!("\"acme/toolkit/Setup@{setup}\"")));
    let deploy_binding = project.read("src/actions/deploy.rs");
    assert!(deploy_binding.contains(&format!("\"Acme/Deploy@{v1}\"")));

    let manifest: Value = serde_json::from_str(&project.read("actsync.lock.json")).unwrap();
    assert_eq!(manifest["entries"][0]["key"], "acme/toolkit/setup");
    assert_eq!(manifest["entries"][0]["source"], "acme/toolkit/Setup");
    assert_eq!(manifest["entries"][1]["source"], "Acme/Deploy");

    // Tracked operations fetch with the stored spelling.
    fs::remove_file(project.root().join("src/actions/toolkit_setup.rs")).unwrap();
    let report = engine.regenerate_all().unwrap();
    assert!(!report.has_failures(), "{:?}", report.outcomes);
    assert_eq!(report.files_written(), vec!["src/actions/toolkit_setup.rs"]);
    let report = engine.update(UpdateTarget::All).unwrap();
    assert!(!report.has_failures(), "{:?}", report.outcomes);
}

#[test]
fn configured_paths_are_honoured() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);
    let config_path = project.root().join("actsync.toml");
    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str("\n[output]\ndir = \"gen/bindings\"\n\n[manifest]\npath = \"meta/actions.json\"\n");
    fs::write(&config_path, config).unwrap();

    let deploy = remotes.create("acme", "deploy");
    let sha = deploy.commit_action(None, &action_yaml("Deploy", &[], &[]));
    deploy.tag("v2", &sha);

    let report = engine(&project).add(add(&["acme/deploy"])).unwrap();

    assert!(report.manifest_written);
    project.assert_file_exists("gen/bindings/deploy.rs");
    project.assert_file_exists("meta/actions.json");
    project.assert_file_not_exists("actsync.lock.json");
}

#[test]
fn unknown_manifest_fields_survive_a_sync() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);
    fs::write(
        project.root().join("actsync.lock.json"),
        "{\n  \"version\": 1,\n  \"generator\": \"hand\",\n  \"entries\": []\n}\n",
    )
    .unwrap();

    let deploy = remotes.create("acme", "deploy");
    let sha = deploy.commit_action(None, &action_yaml("Deploy", &[], &[]));
    deploy.tag("v1", &sha);

    engine(&project).add(add(&["acme/deploy"])).unwrap();

    let manifest: Value = serde_json::from_str(&project.read("actsync.lock.json")).unwrap();
    assert_eq!(manifest["generator"], "hand");
    assert_eq!(manifest["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn dry_run_reports_without_touching_disk() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);
    let deploy = remotes.create("acme", "deploy");
    let sha = deploy.commit_action(None, &action_yaml("Deploy", &[], &[]));
    deploy.tag("v1", &sha);

    let report = engine_with(&project, SyncOptions { dry_run: true })
        .add(add(&["acme/deploy"]))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Created);
    project.assert_file_not_exists("src/actions/deploy.rs");
    project.assert_file_not_exists("actsync.lock.json");
}

#[test]
fn drift_is_reported_per_file() {
    let remotes = ActionRemotes::new();
    let project = TestProject::new(&remotes);
    for repo in ["alpha", "beta", "gamma"] {
        let remote = remotes.create("acme", repo);
        let sha = remote.commit_action(None, &action_yaml(repo, &[], &[]));
        remote.tag("v1", &sha);
    }
    let engine = engine(&project);
    engine
        .add(add(&["acme/alpha", "acme/beta", "acme/gamma"]))
        .unwrap();

    fs::write(project.root().join("src/actions/beta.rs"), "// mine\n").unwrap();
    fs::remove_file(project.root().join("src/actions/gamma.rs")).unwrap();

    let report = engine.check().unwrap();
    let statuses: Vec<DriftStatus> = report.items.iter().map(|i| i.status).collect();

    assert_eq!(
        statuses,
        vec![DriftStatus::Clean, DriftStatus::Modified, DriftStatus::Missing]
    );
}
