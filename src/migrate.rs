//! Migration orchestration: load both documents, merge, back up, write.
//!
//! A migration walks through the states of [`MigrationState`] in order and
//! never revisits one. Any error ends the walk and is reported inside the
//! returned [`MigrationResult`] together with the last state reached. Backup
//! and write come last, so a failure never leaves a partially updated target.
//!
//! The engine does not lock target files. Migrations into different targets
//! may run in parallel ([`Migrator::migrate_all`] does exactly that); callers
//! must serialize migrations into the same target.

use crate::config::{reader, writer, ConfigDocument};
use crate::merge::{
    detect_conflicts, merge_servers, Conflict, ConflictResolutions, MergeOutcome, ResolvedConflict,
};
use crate::registry::{IdeSchema, SchemaRegistry};
use crate::validation::validate_servers;
use crate::MigrationError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    Idle,
    SchemasResolved,
    SourceLoaded,
    TargetLoaded,
    ConflictsDetected,
    Merged,
    BackedUp,
    Written,
    Done,
    Failed,
}

#[derive(Debug)]
struct Progress {
    state: MigrationState,
}

impl Progress {
    const fn new() -> Self {
        Self { state: MigrationState::Idle }
    }

    fn advance(&mut self, next: MigrationState) {
        debug!("Migration state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    pub from_ide: String,
    pub to_ide: String,
    pub backup: bool,
    pub dry_run: bool,
    pub conflict_resolutions: ConflictResolutions,
}

impl MigrationRequest {
    /// A request with backups enabled and no conflict resolutions.
    pub fn new<F: Into<String>, T: Into<String>>(from_ide: F, to_ide: T) -> Self {
        Self {
            from_ide: from_ide.into(),
            to_ide: to_ide.into(),
            backup: true,
            dry_run: false,
            conflict_resolutions: ConflictResolutions::new(),
        }
    }

    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_resolution<S: Into<String>>(mut self, name: S, prefer_source: bool) -> Self {
        self.conflict_resolutions.insert(name.into(), prefer_source);
        self
    }

    #[must_use]
    pub fn with_resolutions(mut self, resolutions: ConflictResolutions) -> Self {
        self.conflict_resolutions = resolutions;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFailure {
    pub kind: String,
    pub detail: String,
    /// Last state reached before the failure
    pub stage: MigrationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub from_ide: String,
    pub to_ide: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<PathBuf>,
    pub added: Vec<String>,
    pub kept: Vec<String>,
    pub resolved: Vec<ResolvedConflict>,
    pub backup_path: Option<PathBuf>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MigrationFailure>,
}

impl MigrationResult {
    fn succeeded(request: &MigrationRequest, plan: &MigrationPlan) -> Self {
        Self {
            success: true,
            from_ide: request.from_ide.clone(),
            to_ide: request.to_ide.clone(),
            target_path: Some(plan.target.path.clone()),
            added: plan.outcome.added.clone(),
            kept: plan.outcome.kept.clone(),
            resolved: plan.outcome.resolved.clone(),
            backup_path: None,
            dry_run: request.dry_run,
            error: None,
        }
    }

    pub(crate) fn failed(
        request: &MigrationRequest,
        target_path: Option<PathBuf>,
        error: &MigrationError,
        stage: MigrationState,
    ) -> Self {
        Self {
            success: false,
            from_ide: request.from_ide.clone(),
            to_ide: request.to_ide.clone(),
            target_path,
            added: Vec::new(),
            kept: Vec::new(),
            resolved: Vec::new(),
            backup_path: None,
            dry_run: request.dry_run,
            error: Some(MigrationFailure {
                kind: error.kind().to_string(),
                detail: error.to_string(),
                stage,
            }),
        }
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.kind.as_str())
    }
}

/// Everything a migration would do, computed without touching the target file.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub source: IdeSchema,
    pub target: IdeSchema,
    pub conflicts: Vec<Conflict>,
    pub outcome: MergeOutcome,
    /// Target document with the merged server map
    pub document: ConfigDocument,
    /// Validation warnings about the source's server definitions
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Migrator {
    registry: SchemaRegistry,
}

impl Migrator {
    pub const fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Run one migration to completion; errors are reported in the result.
    pub fn migrate(&self, request: &MigrationRequest) -> MigrationResult {
        let mut progress = Progress::new();
        let mut target_path = None;

        match self.run(request, &mut progress, &mut target_path) {
            Ok(result) => {
                progress.advance(MigrationState::Done);
                info!(
                    "Migrated {} -> {}: {} added, {} kept, {} conflict(s){}",
                    request.from_ide,
                    request.to_ide,
                    result.added.len(),
                    result.kept.len(),
                    result.resolved.len(),
                    if request.dry_run { " (dry run)" } else { "" }
                );
                result
            },
            Err(error) => {
                let stage = progress.state;
                progress.advance(MigrationState::Failed);
                warn!(
                    "Migration {} -> {} failed after {:?}: {error}",
                    request.from_ide, request.to_ide, stage
                );
                MigrationResult::failed(request, target_path, &error, stage)
            },
        }
    }

    /// Run several migrations in parallel, one per distinct target file.
    ///
    /// A request whose target resolves to a file already claimed by an earlier
    /// request is not run; its result is an `InvalidRequest` failure. Results
    /// line up with `requests`.
    pub fn migrate_all(&self, requests: &[MigrationRequest]) -> Vec<MigrationResult> {
        let mut claimed = HashSet::new();
        let duplicates: Vec<Option<PathBuf>> = requests
            .iter()
            .map(|request| {
                let schema = self.registry.resolve(&request.to_ide).ok()?;
                (!claimed.insert(schema.path.clone())).then_some(schema.path)
            })
            .collect();

        requests
            .par_iter()
            .zip(duplicates)
            .map(|(request, duplicate)| match duplicate {
                Some(target_path) => Self::reject_duplicate(request, target_path),
                None => self.migrate(request),
            })
            .collect()
    }

    fn reject_duplicate(request: &MigrationRequest, target_path: PathBuf) -> MigrationResult {
        let error = MigrationError::InvalidRequest(format!(
            "{} is already the target of an earlier migration in this batch",
            target_path.display()
        ));
        warn!("Migration {} -> {} skipped: {error}", request.from_ide, request.to_ide);
        MigrationResult::failed(request, Some(target_path), &error, MigrationState::Idle)
    }

    /// Compute the merge between two IDEs without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if either IDE is unknown, both name the same config
    /// file, or either document cannot be loaded.
    pub fn preview(
        &self,
        from_ide: &str,
        to_ide: &str,
        resolutions: &ConflictResolutions,
    ) -> Result<MigrationPlan, MigrationError> {
        let (source, target) = self.resolve_pair(from_ide, to_ide)?;
        Self::plan(source, target, resolutions, &mut Progress::new())
    }

    fn run(
        &self,
        request: &MigrationRequest,
        progress: &mut Progress,
        target_path: &mut Option<PathBuf>,
    ) -> Result<MigrationResult, MigrationError> {
        let (source, target) = self.resolve_pair(&request.from_ide, &request.to_ide)?;
        *target_path = Some(target.path.clone());
        progress.advance(MigrationState::SchemasResolved);

        let plan = Self::plan(source, target, &request.conflict_resolutions, progress)?;
        let mut result = MigrationResult::succeeded(request, &plan);

        if request.dry_run {
            info!("Dry run mode - not writing {}", plan.target.path.display());
            return Ok(result);
        }

        result.backup_path = writer::backup_file(&plan.target.path, request.backup)?;
        progress.advance(MigrationState::BackedUp);

        writer::write_document(&plan.target.path, plan.target.server_key, &plan.document)?;
        progress.advance(MigrationState::Written);

        Ok(result)
    }

    fn resolve_pair(
        &self,
        from_ide: &str,
        to_ide: &str,
    ) -> Result<(IdeSchema, IdeSchema), MigrationError> {
        let source = self.registry.resolve(from_ide)?;
        let target = self.registry.resolve(to_ide)?;

        if source.ide == target.ide {
            return Err(MigrationError::InvalidRequest(format!(
                "source and target are both '{}'",
                source.ide
            )));
        }
        if source.path == target.path {
            return Err(MigrationError::InvalidRequest(format!(
                "'{}' and '{}' share the config file {}",
                source.ide,
                target.ide,
                target.path.display()
            )));
        }

        Ok((source, target))
    }

    fn plan(
        source: IdeSchema,
        target: IdeSchema,
        resolutions: &ConflictResolutions,
        progress: &mut Progress,
    ) -> Result<MigrationPlan, MigrationError> {
        let source_document = reader::read_config_document(&source)?;
        progress.advance(MigrationState::SourceLoaded);

        let warnings = validate_servers(source.server_key, &source_document.servers);
        for warning in &warnings {
            warn!("{}: {warning}", source.path.display());
        }

        let target_document = reader::read_config_document(&target)?;
        progress.advance(MigrationState::TargetLoaded);

        let conflicts = detect_conflicts(&source_document.servers, &target_document.servers);
        debug!("Found {} conflicting server(s)", conflicts.len());
        progress.advance(MigrationState::ConflictsDetected);

        let outcome = merge_servers(
            &source_document.servers,
            &target_document.servers,
            &conflicts,
            resolutions,
        );
        debug!(
            "Merged configuration: {} -> {} server(s)",
            target_document.servers.len(),
            outcome.servers.len()
        );
        let document = target_document.into_merged(outcome.servers.clone());
        progress.advance(MigrationState::Merged);

        Ok(MigrationPlan { source, target, conflicts, outcome, document, warnings })
    }
}
