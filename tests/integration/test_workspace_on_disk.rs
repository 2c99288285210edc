//! Workspace driven by real files: open, edit, debounced rescan, rebuild.

use importer::edit::{Editor, ImportRequest, TextBuffer};
use importer::indexing::{SourceSymbolImport, TaskOutcome, Workspace, WorkspaceTask};
use importer::project_resolver::ManifestReader;
use importer::project_resolver::path::{normalize, to_slash};
use importer::providers::{DiskFileSystem, JsonManifestReader, TsConfigProvider};
use importer::{ScanOutcome, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn key(root: &Path, relative: &str) -> String {
    normalize(&to_slash(&root.join(relative)))
}

fn sample_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write(
        &root,
        "tsconfig.json",
        r#"{ "compilerOptions": { "baseUrl": "src", "paths": { "@lib/*": ["lib/*"] } } }"#,
    );
    write(&root, "src/lib/format.ts", "export const format = 1;\n");
    write(&root, "src/lib/parse.ts", "export const parse = 1;\n");
    write(&root, "src/app/main.ts", "import { format } from '@lib/format';\n");
    (temp_dir, root)
}

fn workspace() -> Workspace {
    let mut settings = Settings::default();
    settings.debounce.file_ms = 10;
    settings.debounce.project_ms = 20;
    let fs = Arc::new(DiskFileSystem::new(settings.indexing.clone()));
    let manifests: Arc<dyn ManifestReader> = Arc::new(JsonManifestReader::new(fs.clone()));
    Workspace::new(&settings, Arc::new(TsConfigProvider::new()), fs, manifests)
}

async fn next_task(workspace: &mut Workspace) -> WorkspaceTask {
    tokio::time::timeout(Duration::from_secs(5), workspace.next_task())
        .await
        .expect("timer did not fire")
        .expect("channel closed")
}

#[tokio::test]
async fn test_added_import_is_picked_up_by_rescan() {
    let (_guard, root) = sample_project();
    let mut workspace = workspace();
    let summary = workspace.open_project(&root).await.unwrap();
    assert_eq!(summary.scanned, 3);

    let main = root.join("src/app/main.ts");
    let document = fs::read_to_string(&main).unwrap();
    let request = ImportRequest::SymbolPattern(SourceSymbolImport::new(
        key(&root, "src/lib/parse"),
        "parse",
        None,
    ));
    let edit = workspace.plan_import(&main, &document, &request).unwrap();
    let mut buffer = TextBuffer::new(document);
    buffer.apply(&edit).unwrap();
    assert_eq!(
        buffer.text,
        "import { format } from '@lib/format';\nimport { parse } from '@lib/parse';\n"
    );
    fs::write(&main, &buffer.text).unwrap();

    assert!(workspace.file_changed(&main));
    let task = next_task(&mut workspace).await;
    assert_eq!(task, WorkspaceTask::RescanFile(main.clone()));
    let outcome = workspace.process(task).await.unwrap();
    assert_eq!(
        outcome,
        TaskOutcome::Rescanned(ScanOutcome::Scanned { statements: 2 })
    );

    let index = workspace.project(&root).unwrap().index();
    assert_eq!(index.incoming_count(&key(&root, "src/lib/parse")), 1);
    assert_eq!(index.incoming_count(&key(&root, "src/lib/format")), 1);
}

#[tokio::test]
async fn test_symbol_from_imported_module_is_merged() {
    let (_guard, root) = sample_project();
    let mut workspace = workspace();
    workspace.open_project(&root).await.unwrap();

    let main = root.join("src/app/main.ts");
    let document = fs::read_to_string(&main).unwrap();
    let request = ImportRequest::SymbolPattern(SourceSymbolImport::new(
        key(&root, "src/lib/format"),
        "formatDate",
        None,
    ));
    let edit = workspace.plan_import(&main, &document, &request).unwrap();
    assert!(edit.is_replacement());

    let mut buffer = TextBuffer::new(document);
    buffer.apply(&edit).unwrap();
    assert_eq!(
        buffer.text,
        "import { format, formatDate } from '@lib/format';\n"
    );
}

#[tokio::test]
async fn test_structural_change_rebuilds_project() {
    let (_guard, root) = sample_project();
    let mut workspace = workspace();
    workspace.open_project(&root).await.unwrap();

    write(&root, "src/app/extra.ts", "import { parse } from 'lib/parse';\n");
    workspace.project_dirty(&root);
    workspace.project_dirty(&root);
    assert_eq!(workspace.pending_count(), 1);

    let task = next_task(&mut workspace).await;
    assert_eq!(task, WorkspaceTask::RebuildProject(root.clone()));
    let TaskOutcome::Rebuilt(summary) = workspace.process(task).await.unwrap() else {
        panic!("expected a rebuild");
    };
    // tsconfig.json is listed as an importable file but not scanned
    assert_eq!(summary.files, 5);
    assert_eq!(summary.scanned, 4);

    let index = workspace.project(&root).unwrap().index();
    assert_eq!(index.incoming_count(&key(&root, "src/lib/parse")), 1);
    let unused = index.unused_source_modules();
    assert!(unused.iter().any(|module| module.path.ends_with("extra.ts")));
}

#[tokio::test]
async fn test_deleted_file_is_dropped_on_rescan() {
    let (_guard, root) = sample_project();
    let mut workspace = workspace();
    workspace.open_project(&root).await.unwrap();

    let main = root.join("src/app/main.ts");
    fs::remove_file(&main).unwrap();
    assert!(workspace.file_changed(&main));
    let task = next_task(&mut workspace).await;
    let outcome = workspace.process(task).await.unwrap();
    assert_eq!(outcome, TaskOutcome::Rescanned(ScanOutcome::Removed));

    let index = workspace.project(&root).unwrap().index();
    assert_eq!(index.incoming_count(&key(&root, "src/lib/format")), 0);
    assert!(index.source_module(&key(&root, "src/app/main")).is_none());
}
