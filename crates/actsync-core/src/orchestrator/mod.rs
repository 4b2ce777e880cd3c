//! Binding orchestration
//!
//! The [`BindingOrchestrator`] carries out one logical operation for one
//! action: resolve, fetch metadata, render, write the generated file and
//! update the manifest value it is handed. It owns every file-system side
//! effect on generated files. Errors never escape [`BindingOrchestrator::apply`];
//! they become a failed [`Outcome`] so that a batch keeps going.
//!
//! A write is recorded in a rollback list before the manifest is touched.
//! If the manifest update is rejected the write is undone, so a failed
//! operation leaves neither a stray file nor a half-updated entry.

mod outcome;
mod rollback;

pub use outcome::{Outcome, OutcomeError, OutcomeStatus};

use actsync_fs::{NormalizedPath, content_hash, io};

use crate::config::DEFAULT_OUTPUT_DIR;
use crate::manifest::{Manifest, ManifestEntry};
use crate::metadata::ActionMetadata;
use crate::naming::{derive_binding_name, is_valid_binding_name, output_file_path};
use crate::provider::{Provider, RefKind};
use crate::reference::{ActionKey, ActionReference};
use crate::render::{BindingRenderer, BindingSource};
use crate::version::{self, ResolvedVersion, VersionIntent, is_full_sha};
use crate::{Error, Result};

use rollback::Rollback;

/// One logical operation on one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Start tracking `reference`, or re-resolve it if already tracked.
    Add {
        reference: ActionReference,
        binding_name: Option<String>,
    },
    /// Re-resolve a tracked action with its stored requested ref.
    Update { key: ActionKey },
    /// Stop tracking an action.
    Remove { key: ActionKey, keep_file: bool },
    /// Re-render a tracked action at its pinned sha.
    Regenerate { key: ActionKey },
}

impl Operation {
    /// Key of the action this operation targets.
    pub fn key(&self) -> ActionKey {
        match self {
            Self::Add { reference, .. } => reference.key(),
            Self::Update { key } | Self::Remove { key, .. } | Self::Regenerate { key } => {
                key.clone()
            }
        }
    }
}

/// Applies operations against a provider, a renderer and a manifest.
pub struct BindingOrchestrator<'a> {
    provider: &'a dyn Provider,
    renderer: &'a dyn BindingRenderer,
    root: NormalizedPath,
    output_dir: String,
    dry_run: bool,
}

impl<'a> BindingOrchestrator<'a> {
    /// Create an orchestrator writing below `root`.
    pub fn new(
        provider: &'a dyn Provider,
        renderer: &'a dyn BindingRenderer,
        root: NormalizedPath,
    ) -> Self {
        Self {
            provider,
            renderer,
            root,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            dry_run: false,
        }
    }

    /// Directory, relative to the root, that new bindings are written to.
    pub fn with_output_dir(mut self, output_dir: impl Into<String>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// In dry-run mode files are neither written nor deleted. The manifest
    /// value is still updated so that later operations in a batch see it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply `operation` to `manifest`.
    pub fn apply(&self, manifest: &mut Manifest, operation: &Operation) -> Outcome {
        let key = operation.key();
        let result = match operation {
            Operation::Add {
                reference,
                binding_name,
            } => self.add(manifest, reference, binding_name.as_deref()),
            Operation::Update { key } => self.update(manifest, key),
            Operation::Remove { key, keep_file } => self.remove(manifest, key, *keep_file),
            Operation::Regenerate { key } => self.regenerate(manifest, key),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(key = %key, error = %e, "Operation failed");
            Outcome::failed(&key, &e)
        })
    }

    /// Binding name `key` would get: the tracked name, else the override,
    /// else the derived name.
    pub fn planned_binding_name(
        manifest: &Manifest,
        key: &ActionKey,
        binding_override: Option<&str>,
    ) -> String {
        match (manifest.get(key), binding_override) {
            (Some(entry), _) => entry.binding_name.clone(),
            (None, Some(name)) => name.to_string(),
            (None, None) => derive_binding_name(key),
        }
    }

    /// Resolve `action` at `requested_ref` (latest when `None`) to a commit.
    pub fn resolve(
        &self,
        action: &ActionReference,
        requested_ref: Option<&str>,
    ) -> Result<ResolvedVersion> {
        let key = action.key();
        let (owner, repo) = (action.owner(), action.repo());

        let tags = match requested_ref {
            None => self.provider.list_tags(owner, repo)?,
            Some(_) => Vec::new(),
        };
        let intent = version::select(tags.as_slice(), requested_ref)
            .map_err(|e| Error::resolution(key.as_str(), e.to_string()))?;
        let reference = intent.reference();
        tracing::debug!(key = %key, reference, floating = intent.is_floating(), "Selected version");

        let resolved = self
            .provider
            .resolve_ref(owner, repo, reference)?
            .ok_or_else(|| Error::resolution(format!("{key}@{reference}"), "ref not found"))?;

        let sha = resolved.sha.to_ascii_lowercase();
        if !is_full_sha(&sha) {
            return Err(Error::resolution(
                format!("{key}@{reference}"),
                format!("'{sha}' is not a full commit sha"),
            ));
        }

        let tag = match &intent {
            VersionIntent::Latest(tag) => tag.clone(),
            VersionIntent::Explicit(reference) if resolved.kind == RefKind::Tag => {
                reference.clone()
            }
            VersionIntent::Explicit(_) => String::new(),
        };
        tracing::debug!(key = %key, sha = %sha, tag = %tag, "Resolved");

        Ok(ResolvedVersion {
            sha,
            tag,
            is_floating: intent.is_floating(),
        })
    }

    fn add(
        &self,
        manifest: &mut Manifest,
        reference: &ActionReference,
        binding_override: Option<&str>,
    ) -> Result<Outcome> {
        let key = reference.key();

        if let Some(name) = binding_override {
            if !is_valid_binding_name(name) {
                return Err(Error::InvalidBindingName {
                    name: name.to_string(),
                });
            }
            if let Some(entry) = manifest.get(&key)
                && entry.binding_name != name
            {
                tracing::warn!(
                    key = %key,
                    tracked = %entry.binding_name,
                    requested = name,
                    "Ignoring binding name override for tracked action"
                );
            }
        }

        self.sync_entry(manifest, reference, reference.requested_ref(), binding_override)
    }

    fn update(&self, manifest: &mut Manifest, key: &ActionKey) -> Result<Outcome> {
        let tracked = manifest.get(key).ok_or_else(|| Error::NotTracked {
            key: key.to_string(),
        })?;
        let action = ActionReference::parse(tracked.action())?;
        let requested_ref = tracked.requested_ref.clone();

        self.sync_entry(manifest, &action, requested_ref.as_deref(), None)
    }

    /// Resolve, render and record `action`; shared by add and update.
    fn sync_entry(
        &self,
        manifest: &mut Manifest,
        action: &ActionReference,
        requested_ref: Option<&str>,
        binding_override: Option<&str>,
    ) -> Result<Outcome> {
        let key = &action.key();
        let existing = manifest.get(key).cloned();

        let resolved = self.resolve(action, requested_ref)?;
        let metadata = self.fetch_metadata(action, &resolved.sha)?;

        let binding_name = Self::planned_binding_name(manifest, key, binding_override);
        let output_path = match &existing {
            Some(entry) => entry.output_file_path.clone(),
            None => output_file_path(&self.output_dir, &binding_name, self.renderer.extension()),
        };
        manifest.check_unique(key, &binding_name, &output_path)?;

        let content = self.render(action, &resolved.sha, &binding_name, &metadata)?;
        let hash = content_hash(&content);
        let target = self.root.join(&output_path);
        let previous = io::read_optional(&target)?;
        let file_matches = previous.as_ref().map(content_hash).as_deref() == Some(hash.as_str());

        let path = action.path();
        let entry = ManifestEntry {
            key: key.clone(),
            source: (path != key.as_str()).then_some(path),
            requested_ref: requested_ref.map(str::to_string),
            resolved_sha: resolved.sha,
            resolved_tag: resolved.tag,
            output_file_path: output_path.clone(),
            binding_name,
            content_hash: hash,
            updated_at: ManifestEntry::now(),
            extra: existing
                .as_ref()
                .map(|e| e.extra.clone())
                .unwrap_or_default(),
        };

        match &existing {
            Some(tracked) if file_matches && tracked.same_pin(&entry) => {
                tracing::debug!(key = %key, "Binding unchanged");
                return Ok(Outcome::for_entry(tracked, OutcomeStatus::Unchanged, false));
            }
            None if previous.is_some() && !file_matches => {
                return Err(Error::FileConflict { path: output_path });
            }
            None if file_matches => {
                tracing::info!(key = %key, path = %output_path, "Adopting identical untracked file");
            }
            _ => {}
        }

        let status = match existing {
            Some(_) => OutcomeStatus::Updated,
            None => OutcomeStatus::Created,
        };
        let write = !file_matches;
        let outcome = Outcome::for_entry(&entry, status, write);
        self.commit(manifest, entry, &target, &content, previous, write)?;
        Ok(outcome)
    }

    fn remove(&self, manifest: &mut Manifest, key: &ActionKey, keep_file: bool) -> Result<Outcome> {
        let Some(entry) = manifest.get(key).cloned() else {
            tracing::debug!(key = %key, "Not tracked, nothing to remove");
            return Ok(Outcome::not_found(key));
        };

        let mut deleted = false;
        if !keep_file {
            let target = self.root.join(&entry.output_file_path);
            deleted = if self.dry_run {
                target.is_file()
            } else {
                io::remove_file(&target)?
            };
            if deleted {
                tracing::info!(key = %key, path = %target, "Removed binding");
            } else {
                tracing::warn!(key = %key, path = %target, "Generated file already missing");
            }
        }

        manifest.remove(key);
        Ok(Outcome::for_entry(&entry, OutcomeStatus::Removed, deleted))
    }

    fn regenerate(&self, manifest: &mut Manifest, key: &ActionKey) -> Result<Outcome> {
        let tracked = manifest.get(key).cloned().ok_or_else(|| Error::NotTracked {
            key: key.to_string(),
        })?;

        let action = ActionReference::parse(tracked.action())?;
        let metadata = self.fetch_metadata(&action, &tracked.resolved_sha)?;
        let content =
            self.render(&action, &tracked.resolved_sha, &tracked.binding_name, &metadata)?;
        let hash = content_hash(&content);
        let target = self.root.join(&tracked.output_file_path);
        let previous = io::read_optional(&target)?;
        let file_matches = previous.as_ref().map(content_hash).as_deref() == Some(hash.as_str());

        if file_matches && tracked.content_hash == hash {
            tracing::debug!(key = %key, "Regeneration produced identical content");
            return Ok(Outcome::for_entry(&tracked, OutcomeStatus::Unchanged, false));
        }

        let entry = ManifestEntry {
            content_hash: hash,
            updated_at: ManifestEntry::now(),
            ..tracked
        };
        let write = !file_matches;
        let outcome = Outcome::for_entry(&entry, OutcomeStatus::Updated, write);
        self.commit(manifest, entry, &target, &content, previous, write)?;
        Ok(outcome)
    }

    fn fetch_metadata(&self, action: &ActionReference, sha: &str) -> Result<ActionMetadata> {
        let metadata = self.provider.fetch_action_metadata(
            action.owner(),
            action.repo(),
            action.subpath(),
            sha,
        )?;
        tracing::debug!(
            action = %action,
            sha,
            inputs = metadata.inputs.len(),
            outputs = metadata.outputs.len(),
            "Fetched action metadata"
        );
        Ok(metadata)
    }

    fn render(
        &self,
        action: &ActionReference,
        sha: &str,
        binding_name: &str,
        metadata: &ActionMetadata,
    ) -> Result<String> {
        let path = action.path();
        let source = BindingSource {
            action: &path,
            sha,
            binding_name,
            metadata,
        };
        self.renderer.render(&source).map_err(|e| Error::Render {
            key: action.key().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the file if needed, then upsert; undo the write if the upsert
    /// is rejected.
    fn commit(
        &self,
        manifest: &mut Manifest,
        entry: ManifestEntry,
        target: &NormalizedPath,
        content: &str,
        previous: Option<Vec<u8>>,
        write: bool,
    ) -> Result<()> {
        let mut rollback = Rollback::default();

        if write && !self.dry_run {
            io::write_atomic(target, content.as_bytes())?;
            tracing::info!(key = %entry.key, path = %target, "Wrote binding");
            rollback.record_write(target.clone(), previous);
        }

        if let Err(e) = manifest.upsert(entry) {
            rollback.run();
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::metadata::ActionInput;
    use crate::provider::MemoryProvider;
    use crate::render::RustRenderer;
    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    const SHA_V4: &str = "4444444444444444444444444444444444444444";
    const SHA_V5: &str = "5555555555555555555555555555555555555555";

    fn metadata(description: &str) -> ActionMetadata {
        let mut metadata = ActionMetadata {
            description: description.to_string(),
            ..Default::default()
        };
        metadata.inputs.insert("token".into(), ActionInput::default());
        metadata
    }

    fn provider() -> MemoryProvider {
        let provider = MemoryProvider::new();
        provider.publish_tag("actions/checkout", "v4", SHA_V4);
        provider.publish_tag("actions/checkout", "v4.2.0", SHA_V4);
        provider.publish_metadata("actions/checkout", SHA_V4, metadata("checkout v4"));
        provider
    }

    struct Harness {
        dir: TempDir,
        provider: MemoryProvider,
        renderer: RustRenderer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                dir: tempdir().unwrap(),
                provider: provider(),
                renderer: RustRenderer,
            }
        }

        fn orchestrator(&self) -> BindingOrchestrator<'_> {
            BindingOrchestrator::new(
                &self.provider,
                &self.renderer,
                NormalizedPath::new(self.dir.path()),
            )
        }

        fn file(&self, relative: &str) -> std::path::PathBuf {
            self.dir.path().join(relative)
        }
    }

    fn add(reference: &str) -> Operation {
        Operation::Add {
            reference: ActionReference::parse(reference).unwrap(),
            binding_name: None,
        }
    }

    fn key(value: &str) -> ActionKey {
        ActionKey::parse(value).unwrap()
    }

    #[test]
    fn add_latest_creates_file_and_entry() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(&mut manifest, &add("actions/checkout"));

        assert_eq!(outcome.status, OutcomeStatus::Created);
        assert_eq!(outcome.sha.as_deref(), Some(SHA_V4));
        assert_eq!(outcome.tag.as_deref(), Some("v4"));
        assert!(outcome.file_written);

        let entry = manifest.get(&key("actions/checkout")).unwrap();
        assert_eq!(entry.requested_ref, None);
        assert_eq!(entry.output_file_path, "src/actions/checkout.rs");
        let on_disk = std::fs::read(h.file("src/actions/checkout.rs")).unwrap();
        assert_eq!(content_hash(&on_disk), entry.content_hash);
    }

    #[test]
    fn explicit_sha_has_no_tag_label() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h
            .orchestrator()
            .apply(&mut manifest, &add(&format!("actions/checkout@{SHA_V4}")));

        assert_eq!(outcome.status, OutcomeStatus::Created);
        assert_eq!(outcome.tag, None);
    }

    #[test]
    fn second_add_is_unchanged() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();

        orchestrator.apply(&mut manifest, &add("actions/checkout@v4"));
        let before = manifest.clone();
        let outcome = orchestrator.apply(&mut manifest, &add("actions/checkout@v4"));

        assert_eq!(outcome.status, OutcomeStatus::Unchanged);
        assert!(!outcome.file_written);
        assert_eq!(manifest, before);
    }

    #[test]
    fn spelled_path_reaches_the_provider_and_the_binding() {
        let h = Harness::new();
        h.provider.publish_tag("Acme/Toolkit", "v1", SHA_V4);
        h.provider
            .publish_metadata("Acme/Toolkit/Setup", SHA_V4, metadata("setup"));
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();

        let outcome = orchestrator.apply(&mut manifest, &add("Acme/Toolkit/Setup"));
        assert_eq!(outcome.status, OutcomeStatus::Created);

        let entry = manifest.get(&key("acme/toolkit/setup")).unwrap().clone();
        assert_eq!(entry.source.as_deref(), Some("Acme/Toolkit/Setup"));
        let text = std::fs::read_to_string(h.file(&entry.output_file_path)).unwrap();
        assert!(text.contains(&format!("\"Acme/Toolkit/Setup@{SHA_V4}\"")));

        // Tracked operations keep using the stored spelling.
        std::fs::remove_file(h.file(&entry.output_file_path)).unwrap();
        let tracked = key("acme/toolkit/setup");
        let regenerate = Operation::Regenerate {
            key: tracked.clone(),
        };
        let regenerated = orchestrator.apply(&mut manifest, &regenerate);
        assert_eq!(regenerated.status, OutcomeStatus::Updated);
        let updated = orchestrator.apply(&mut manifest, &Operation::Update { key: tracked });
        assert_eq!(updated.status, OutcomeStatus::Unchanged);

        let fetch = format!("Acme/Toolkit/Setup@{SHA_V4}");
        assert_eq!(h.provider.metadata_fetches(), vec![fetch.clone(), fetch.clone(), fetch]);
    }

    #[test]
    fn key_spelling_stores_no_source() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        h.orchestrator().apply(&mut manifest, &add("actions/checkout"));

        assert_eq!(manifest.get(&key("actions/checkout")).unwrap().source, None);
    }

    #[test]
    fn changing_only_the_requested_ref_updates_without_writing() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();

        orchestrator.apply(&mut manifest, &add("actions/checkout@v4"));
        let outcome = orchestrator.apply(&mut manifest, &add("actions/checkout@v4.2.0"));

        assert_eq!(outcome.status, OutcomeStatus::Updated);
        assert!(!outcome.file_written);
        let entry = manifest.get(&key("actions/checkout")).unwrap();
        assert_eq!(entry.requested_ref.as_deref(), Some("v4.2.0"));
        assert_eq!(entry.resolved_tag, "v4.2.0");
    }

    #[test]
    fn unknown_ref_is_a_resolution_failure() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(&mut manifest, &add("actions/checkout@v9"));

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::Resolution);
        assert!(manifest.is_empty());
        assert!(!h.file("src/actions/checkout.rs").exists());
    }

    #[test]
    fn provider_failure_is_a_fetch_failure() {
        let h = Harness::new();
        h.provider.fail_repository("actions/checkout", "connection reset");
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(&mut manifest, &add("actions/checkout"));

        assert_eq!(outcome.error.unwrap().kind, ErrorKind::Fetch);
    }

    #[test]
    fn untracked_file_with_other_content_is_a_conflict() {
        let h = Harness::new();
        std::fs::create_dir_all(h.file("src/actions")).unwrap();
        std::fs::write(h.file("src/actions/checkout.rs"), "// mine").unwrap();
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(&mut manifest, &add("actions/checkout"));

        assert_eq!(outcome.error.unwrap().kind, ErrorKind::FileConflict);
        assert_eq!(
            std::fs::read_to_string(h.file("src/actions/checkout.rs")).unwrap(),
            "// mine"
        );
        assert!(manifest.is_empty());
    }

    #[test]
    fn identical_untracked_file_is_adopted() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();
        orchestrator.apply(&mut manifest, &add("actions/checkout"));

        // Forget the entry but keep the file.
        let mut fresh = Manifest::new();
        let outcome = orchestrator.apply(&mut fresh, &add("actions/checkout"));

        assert_eq!(outcome.status, OutcomeStatus::Created);
        assert!(!outcome.file_written);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let operation = Operation::Add {
            reference: ActionReference::parse("actions/checkout").unwrap(),
            binding_name: Some("not-valid".to_string()),
        };

        let outcome = h.orchestrator().apply(&mut manifest, &operation);
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::InvalidBindingName);
    }

    #[test]
    fn name_owned_by_another_key_fails_before_writing() {
        let h = Harness::new();
        h.provider.publish_tag("someone/checkout", "v1", SHA_V5);
        h.provider
            .publish_metadata("someone/checkout", SHA_V5, metadata("other"));
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();

        orchestrator.apply(&mut manifest, &add("actions/checkout"));
        let written = std::fs::read(h.file("src/actions/checkout.rs")).unwrap();
        let outcome = orchestrator.apply(&mut manifest, &add("someone/checkout"));

        assert_eq!(outcome.error.unwrap().kind, ErrorKind::NameCollision);
        assert_eq!(manifest.len(), 1);
        assert_eq!(std::fs::read(h.file("src/actions/checkout.rs")).unwrap(), written);
    }

    #[test]
    fn update_of_untracked_key_is_not_tracked() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(
            &mut manifest,
            &Operation::Update {
                key: key("actions/checkout"),
            },
        );
        assert_eq!(outcome.error.unwrap().kind, ErrorKind::NotTracked);
    }

    #[test]
    fn update_follows_a_new_major() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();
        orchestrator.apply(&mut manifest, &add("actions/checkout"));

        h.provider.publish_tag("actions/checkout", "v5", SHA_V5);
        h.provider
            .publish_metadata("actions/checkout", SHA_V5, metadata("checkout v5"));
        let outcome = orchestrator.apply(
            &mut manifest,
            &Operation::Update {
                key: key("actions/checkout"),
            },
        );

        assert_eq!(outcome.status, OutcomeStatus::Updated);
        assert_eq!(outcome.sha.as_deref(), Some(SHA_V5));
        assert_eq!(outcome.tag.as_deref(), Some("v5"));
        assert!(outcome.file_written);
    }

    #[test]
    fn remove_untracked_is_not_found() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h.orchestrator().apply(
            &mut manifest,
            &Operation::Remove {
                key: key("actions/checkout"),
                keep_file: false,
            },
        );
        assert_eq!(outcome.status, OutcomeStatus::NotFound);
        assert!(!outcome.is_failure());
    }

    #[test]
    fn remove_tolerates_missing_file_and_honours_keep_file() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();
        orchestrator.apply(&mut manifest, &add("actions/checkout"));

        let mut kept = manifest.clone();
        let outcome = orchestrator.apply(
            &mut kept,
            &Operation::Remove {
                key: key("actions/checkout"),
                keep_file: true,
            },
        );
        assert_eq!(outcome.status, OutcomeStatus::Removed);
        assert!(h.file("src/actions/checkout.rs").exists());

        std::fs::remove_file(h.file("src/actions/checkout.rs")).unwrap();
        let outcome = orchestrator.apply(
            &mut manifest,
            &Operation::Remove {
                key: key("actions/checkout"),
                keep_file: false,
            },
        );
        assert_eq!(outcome.status, OutcomeStatus::Removed);
        assert!(!outcome.file_written);
        assert!(manifest.is_empty());
    }

    #[test]
    fn regenerate_restores_a_deleted_file_at_the_pinned_sha() {
        let h = Harness::new();
        let mut manifest = Manifest::new();
        let orchestrator = h.orchestrator();
        orchestrator.apply(&mut manifest, &add("actions/checkout"));

        // Upstream moves; regeneration must not follow it.
        h.provider.publish_tag("actions/checkout", "v5", SHA_V5);
        std::fs::remove_file(h.file("src/actions/checkout.rs")).unwrap();

        let regenerate = Operation::Regenerate {
            key: key("actions/checkout"),
        };
        let outcome = orchestrator.apply(&mut manifest, &regenerate);
        assert_eq!(outcome.status, OutcomeStatus::Updated);
        assert_eq!(outcome.sha.as_deref(), Some(SHA_V4));
        assert!(outcome.file_written);

        let outcome = orchestrator.apply(&mut manifest, &regenerate);
        assert_eq!(outcome.status, OutcomeStatus::Unchanged);
        assert!(!outcome.file_written);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let h = Harness::new();
        let mut manifest = Manifest::new();

        let outcome = h
            .orchestrator()
            .with_dry_run(true)
            .apply(&mut manifest, &add("actions/checkout"));

        assert_eq!(outcome.status, OutcomeStatus::Created);
        assert!(outcome.file_written);
        assert!(!h.file("src/actions/checkout.rs").exists());
    }

    #[test]
    fn rejected_upsert_rolls_back_the_write() {
        let h = Harness::new();
        let orchestrator = h.orchestrator();
        let target = NormalizedPath::new(h.dir.path()).join("src/actions/checkout.rs");
        io::write_atomic(&target, b"previous").unwrap();

        let mut manifest = Manifest::new();
        let mut owner = ManifestEntry {
            key: key("someone/checkout"),
            source: None,
            requested_ref: None,
            resolved_sha: SHA_V5.to_string(),
            resolved_tag: String::new(),
            output_file_path: "elsewhere.rs".to_string(),
            binding_name: "Checkout".to_string(),
            content_hash: content_hash("x"),
            updated_at: ManifestEntry::now(),
            extra: Default::default(),
        };
        manifest.upsert(owner.clone()).unwrap();

        owner.key = key("actions/checkout");
        owner.output_file_path = "src/actions/checkout.rs".to_string();
        let err = orchestrator
            .commit(
                &mut manifest,
                owner,
                &target,
                "new content",
                Some(b"previous".to_vec()),
                true,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NameCollision);
        assert_eq!(std::fs::read(target.to_native()).unwrap(), b"previous");
    }
}
