//! SyncEngine implementation
//!
//! Each public call is one transaction: take the manifest lock, load the
//! manifest, apply the operations in caller order, persist once, release
//! the lock. Per-reference failures end up in the report; only lock, load
//! and persist failures abort the call.

use std::collections::{BTreeMap, HashMap};

use actsync_fs::NormalizedPath;

use crate::config::Config;
use crate::error::CollisionField;
use crate::manifest::{Manifest, ManifestStore};
use crate::orchestrator::{BindingOrchestrator, Operation, Outcome};
use crate::provider::Provider;
use crate::reference::{ActionKey, ActionReference};
use crate::render::{BindingRenderer, RustRenderer};
use crate::{Error, Result};

use super::check::{DriftReport, check_manifest};
use super::report::SyncReport;

/// Options for mutating engine calls
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Resolve and render, but write nothing and do not persist.
    pub dry_run: bool,
}

/// One reference to add, with an optional binding name override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub reference: ActionReference,
    pub binding_name: Option<String>,
}

impl AddRequest {
    pub fn new(reference: ActionReference) -> Self {
        Self {
            reference,
            binding_name: None,
        }
    }

    /// Parse `owner/repo[/subpath][@ref]`.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::new(ActionReference::parse(input)?))
    }

    pub fn with_binding_name(mut self, name: impl Into<String>) -> Self {
        self.binding_name = Some(name.into());
        self
    }
}

/// Which tracked actions `update` re-resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    One(ActionKey),
    All,
}

/// Keeps generated bindings in sync with the manifest.
pub struct SyncEngine {
    root: NormalizedPath,
    config: Config,
    store: ManifestStore,
    provider: Box<dyn Provider>,
    renderer: Box<dyn BindingRenderer>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create an engine for the project at `root`, rendering Rust bindings.
    pub fn new(root: NormalizedPath, config: Config, provider: impl Provider + 'static) -> Self {
        let store = ManifestStore::new(config.manifest_path(&root));
        Self {
            root,
            config,
            store,
            provider: Box::new(provider),
            renderer: Box::new(RustRenderer),
            options: SyncOptions::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: impl BindingRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> &NormalizedPath {
        self.store.path()
    }

    /// Add or re-resolve references.
    ///
    /// Requests whose binding names collide with each other are failed
    /// before any of them is resolved, except a tracked key that already
    /// owns the name.
    pub fn add(&self, requests: Vec<AddRequest>) -> Result<SyncReport> {
        self.transaction("add", |orchestrator, manifest| {
            let rejected = batch_collisions(manifest, &requests);
            requests
                .into_iter()
                .map(|request| {
                    let key = request.reference.key();
                    match rejected.get(&key) {
                        Some(error) => Outcome::failed(&key, error),
                        None => orchestrator.apply(
                            manifest,
                            &Operation::Add {
                                reference: request.reference,
                                binding_name: request.binding_name,
                            },
                        ),
                    }
                })
                .collect()
        })
    }

    /// Stop tracking `key`, deleting its file unless `keep_file` is set.
    pub fn remove(&self, key: &ActionKey, keep_file: bool) -> Result<SyncReport> {
        self.transaction("remove", |orchestrator, manifest| {
            let operation = Operation::Remove {
                key: key.clone(),
                keep_file,
            };
            vec![orchestrator.apply(manifest, &operation)]
        })
    }

    /// Re-resolve one or all tracked actions with their stored refs.
    pub fn update(&self, target: UpdateTarget) -> Result<SyncReport> {
        self.transaction("update", |orchestrator, manifest| {
            let keys = match target {
                UpdateTarget::One(key) => vec![key],
                UpdateTarget::All => manifest.keys(),
            };
            keys.into_iter()
                .map(|key| orchestrator.apply(manifest, &Operation::Update { key }))
                .collect()
        })
    }

    /// Re-render every tracked action at its pinned sha.
    pub fn regenerate_all(&self) -> Result<SyncReport> {
        self.transaction("regenerate", |orchestrator, manifest| {
            manifest
                .keys()
                .into_iter()
                .map(|key| orchestrator.apply(manifest, &Operation::Regenerate { key }))
                .collect()
        })
    }

    /// Compare generated files with their recorded hashes. Read-only.
    pub fn check(&self) -> Result<DriftReport> {
        let manifest = self.store.load()?;
        check_manifest(&self.root, &manifest)
    }

    /// The manifest as currently on disk. Read-only.
    pub fn manifest(&self) -> Result<Manifest> {
        self.store.load()
    }

    fn orchestrator(&self) -> BindingOrchestrator<'_> {
        BindingOrchestrator::new(self.provider.as_ref(), self.renderer.as_ref(), self.root.clone())
            .with_output_dir(self.config.output.dir.clone())
            .with_dry_run(self.options.dry_run)
    }

    fn transaction<F>(&self, name: &str, run: F) -> Result<SyncReport>
    where
        F: FnOnce(&BindingOrchestrator<'_>, &mut Manifest) -> Vec<Outcome>,
    {
        let dry_run = self.options.dry_run;
        let _lock = if dry_run {
            None
        } else {
            Some(self.store.lock()?)
        };

        let mut manifest = self.store.load()?;
        let outcomes = run(&self.orchestrator(), &mut manifest);

        // A project that never tracked anything does not get an empty manifest.
        let untouched = manifest.is_empty() && !self.store.path().exists();
        let manifest_written = if dry_run || untouched {
            false
        } else {
            self.store.persist(&manifest)?
        };

        let report = SyncReport {
            dry_run,
            outcomes,
            manifest_written,
        };
        tracing::info!(operation = name, dry_run, summary = %report.summary(), "Sync finished");
        Ok(report)
    }
}

/// Fail every request whose planned binding name is shared with a request
/// for a different key. A key that already owns the name in the manifest
/// keeps it; only the newcomers fail.
fn batch_collisions(manifest: &Manifest, requests: &[AddRequest]) -> HashMap<ActionKey, Error> {
    let mut by_name: BTreeMap<String, Vec<ActionKey>> = BTreeMap::new();
    for request in requests {
        let key = request.reference.key();
        let name = BindingOrchestrator::planned_binding_name(
            manifest,
            &key,
            request.binding_name.as_deref(),
        );
        let keys = by_name.entry(name).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut rejected = HashMap::new();
    for (name, keys) in by_name.into_iter().filter(|(_, keys)| keys.len() > 1) {
        let owner = keys
            .iter()
            .find(|key| manifest.get(key).is_some_and(|e| e.binding_name == name));
        for key in keys.iter().filter(|key| Some(*key) != owner) {
            let others: Vec<&str> = match owner {
                Some(owner) => vec![owner.as_str()],
                None => keys
                    .iter()
                    .filter(|other| *other != key)
                    .map(ActionKey::as_str)
                    .collect(),
            };
            rejected.insert(
                key.clone(),
                Error::NameCollision {
                    field: CollisionField::BindingName,
                    value: name.clone(),
                    existing: others.join(", "),
                },
            );
        }
    }
    rejected
}
