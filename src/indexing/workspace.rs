//! Open projects and their debounced maintenance.
//!
//! A [`Workspace`] is owned by one task. Change notifications only arm timers;
//! the owner drains fired timers with [`Workspace::next_task`] and runs them with
//! [`Workspace::process`], so index mutation never overlaps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use super::project::{BuildSummary, Project};
use super::scheduler::{Debouncer, Fired};
use crate::config::Settings;
use crate::edit::{ImportRequest, TextEdit, plan_import};
use crate::error::{IndexError, IndexResult};
use crate::parsing::ImportStyle;
use crate::project_resolver::{
    ConfigProvider, FileSystem, ImportPreference, ManifestReader, ProjectConfig,
};
use crate::types::ScanOutcome;

/// Timer identity. One pending timer per file and one per project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebounceKey {
    File(PathBuf),
    Project(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceTask {
    RescanFile(PathBuf),
    RebuildProject(PathBuf),
}

/// What running a task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Rescanned(ScanOutcome),
    Rebuilt(BuildSummary),
    /// No open project covers the path any more
    Skipped,
}

pub struct Workspace {
    projects: BTreeMap<PathBuf, Project>,
    configs: Arc<dyn ConfigProvider>,
    fs: Arc<dyn FileSystem>,
    manifests: Arc<dyn ManifestReader>,
    debouncer: Debouncer<DebounceKey, WorkspaceTask>,
    fired: UnboundedReceiver<Fired<DebounceKey, WorkspaceTask>>,
    file_delay: Duration,
    project_delay: Duration,
    preference: ImportPreference,
    style: ImportStyle,
}

impl Workspace {
    pub fn new(
        settings: &Settings,
        configs: Arc<dyn ConfigProvider>,
        fs: Arc<dyn FileSystem>,
        manifests: Arc<dyn ManifestReader>,
    ) -> Self {
        let (debouncer, fired) = Debouncer::new();
        Self {
            projects: BTreeMap::new(),
            configs,
            fs,
            manifests,
            debouncer,
            fired,
            file_delay: settings.debounce.file_delay(),
            project_delay: settings.debounce.project_delay(),
            preference: settings.resolution.preference,
            style: settings.style.import_style(),
        }
    }

    /// Load the project's configuration, list its files and build its index.
    ///
    /// Re-opening an open root replaces its project. On a configuration failure
    /// nothing is added; a failed rebuild from [`process`](Self::process) also
    /// closes the project it was rebuilding.
    pub async fn open_project(&mut self, root: &Path) -> IndexResult<BuildSummary> {
        let root = root.to_path_buf();

        let configs = self.configs.clone();
        let config_root = root.clone();
        let config = tokio::task::spawn_blocking(move || configs.load(&config_root))
            .await
            .map_err(|e| IndexError::General(format!("config task failed: {e}")))??;

        let fs = self.fs.clone();
        let listed_config = config.clone();
        let files = tokio::task::spawn_blocking(move || fs.list_files(&listed_config))
            .await
            .map_err(|e| IndexError::General(format!("file listing failed: {e}")))??;

        let mut project = Project::new(config, self.fs.clone(), self.manifests.clone())?;
        let summary = build_in_steps(&mut project, &files).await;
        self.projects.insert(root, project);
        Ok(summary)
    }

    /// Drop a project and its pending timers.
    pub fn close_project(&mut self, root: &Path) -> bool {
        let Some(project) = self.projects.remove(root) else {
            return false;
        };
        self.debouncer
            .cancel(&DebounceKey::Project(root.to_path_buf()));
        let files: Vec<PathBuf> = project
            .index()
            .source_modules()
            .map(|module| module.path.clone())
            .collect();
        for file in files {
            if self.project_for_file(&file).is_none() {
                self.debouncer.cancel(&DebounceKey::File(file));
            }
        }
        info!("closed {}", root.display());
        true
    }

    pub fn project(&self, root: &Path) -> Option<&Project> {
        self.projects.get(root)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Innermost open project containing `path`.
    pub fn project_for_file(&self, path: &Path) -> Option<&Project> {
        self.projects
            .values()
            .filter(|project| project.contains(path))
            .max_by_key(|project| project.root().components().count())
    }

    fn project_root_for_file(&self, path: &Path) -> Option<PathBuf> {
        self.project_for_file(path)
            .map(|project| project.root().to_path_buf())
    }

    /// Request a rescan of `path`. Returns false when no project covers it.
    pub fn file_changed(&mut self, path: &Path) -> bool {
        if self.project_for_file(path).is_none() {
            debug!("ignoring change outside any project: {}", path.display());
            return false;
        }
        let path = path.to_path_buf();
        self.debouncer.schedule(
            DebounceKey::File(path.clone()),
            self.file_delay,
            WorkspaceTask::RescanFile(path),
        );
        true
    }

    /// Request a full rebuild of the project at `root`.
    pub fn project_dirty(&mut self, root: &Path) {
        let root = root.to_path_buf();
        debug!("project dirty: {}", root.display());
        self.debouncer.schedule(
            DebounceKey::Project(root.clone()),
            self.project_delay,
            WorkspaceTask::RebuildProject(root),
        );
    }

    pub fn pending_count(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Wait for the next timer that is still current.
    pub async fn next_task(&mut self) -> Option<WorkspaceTask> {
        loop {
            let fired = self.fired.recv().await?;
            if self.debouncer.complete(&fired) {
                return Some(fired.task);
            }
        }
    }

    pub async fn process(&mut self, task: WorkspaceTask) -> IndexResult<TaskOutcome> {
        match task {
            WorkspaceTask::RescanFile(path) => {
                let Some(root) = self.project_root_for_file(&path) else {
                    return Ok(TaskOutcome::Skipped);
                };
                let Some(project) = self.projects.get_mut(&root) else {
                    return Ok(TaskOutcome::Skipped);
                };
                let outcome = project.rescan_file(&path, false)?;
                project.index_mut().prune_unused_patterns();
                debug!("rescanned {}: {outcome:?}", path.display());
                Ok(TaskOutcome::Rescanned(outcome))
            }
            WorkspaceTask::RebuildProject(root) => {
                if !self.projects.contains_key(&root) {
                    debug!("{} is no longer open", root.display());
                    return Ok(TaskOutcome::Skipped);
                }
                match self.open_project(&root).await {
                    Ok(summary) => Ok(TaskOutcome::Rebuilt(summary)),
                    Err(e) => {
                        // The old index no longer matches the configuration
                        warn!("rebuild of {} failed, closing it: {e}", root.display());
                        self.close_project(&root);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Edit that imports `request` into `document`, the content of `file`.
    pub fn plan_import(
        &self,
        file: &Path,
        document: &str,
        request: &ImportRequest,
    ) -> IndexResult<TextEdit> {
        let project = self
            .project_for_file(file)
            .ok_or_else(|| IndexError::ProjectNotFound {
                path: file.to_path_buf(),
            })?;
        Ok(plan_import(
            project,
            file,
            document,
            request,
            self.preference,
            &self.style,
        ))
    }

    /// Configuration an open project was built with.
    pub fn project_config(&self, root: &Path) -> Option<&ProjectConfig> {
        self.projects.get(root).map(Project::config)
    }
}

/// Full build with a yield between files so other tasks on the runtime progress.
async fn build_in_steps(project: &mut Project, files: &[PathBuf]) -> BuildSummary {
    let mut summary = project.reset(files);
    for file in files {
        project.scan_into(file, &mut summary);
        tokio::task::yield_now().await;
    }
    project.finish(summary)
}
