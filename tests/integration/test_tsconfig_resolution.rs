//! Compiler configuration on disk driving resolution and specifier choice.

use importer::project_resolver::path::{normalize, to_slash};
use importer::project_resolver::{ConfigProvider, FileSystem};
use importer::providers::{DiskFileSystem, JsonManifestReader, TsConfigProvider};
use importer::{ImportPreference, Project, Resolution};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn key(root: &Path, relative: &str) -> String {
    normalize(&to_slash(&root.join(relative)))
}

/// Monorepo-style layout: shared options in a base file, aliases and includes in the child.
fn sample_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write(
        &root,
        "config/tsconfig.base.json",
        r#"{
            // shared by every package
            "compilerOptions": {
                "baseUrl": "../src",
                "strict": true,
            },
        }"#,
    );
    write(
        &root,
        "tsconfig.json",
        r#"{
            "extends": "./config/tsconfig.base.json",
            "compilerOptions": {
                "paths": { "@lib/*": ["lib/*"] },
            },
            "include": ["src"],
            "exclude": ["src/**/*.test.ts"],
        }"#,
    );
    write(&root, ".gitignore", "src/generated/\n");
    write(&root, "src/lib/format.ts", "export const format = () => '';\n");
    write(&root, "src/lib/index.ts", "export * from './format';\n");
    write(
        &root,
        "src/app/main.ts",
        "import { format } from '@lib/format';\nimport React from 'react';\nimport { api } from 'services/api';\n",
    );
    write(&root, "src/services/api.ts", "export const api = {};\n");
    write(&root, "src/app/main.test.ts", "import { format } from '../lib/format';\n");
    write(&root, "src/generated/schema.ts", "");
    write(&root, "scripts/build.ts", "import '../src/lib';\n");
    (temp_dir, root)
}

fn open(root: &Path) -> Project {
    let fs: Arc<dyn FileSystem> = Arc::new(DiskFileSystem::default());
    let config = TsConfigProvider::new().load(root).unwrap();
    let files = fs.list_files(&config).unwrap();
    let manifests = Arc::new(JsonManifestReader::new(fs.clone()));
    let mut project = Project::new(config, fs, manifests).unwrap();
    project.build(&files);
    project
}

#[test]
fn test_inherited_base_url_and_child_paths() {
    let (_guard, root) = sample_project();
    let config = TsConfigProvider::new().load(&root).unwrap();

    assert_eq!(config.base_url, Some(PathBuf::from(key(&root, "src"))));
    assert_eq!(config.paths.len(), 1);
    assert_eq!(config.paths[0].targets, vec![key(&root, "src/lib/*")]);
    assert_eq!(config.include, vec!["src"]);
}

#[test]
fn test_listing_honours_include_exclude_and_gitignore() {
    let (_guard, root) = sample_project();
    let config = TsConfigProvider::new().load(&root).unwrap();
    let files = DiskFileSystem::default().list_files(&config).unwrap();

    let mut relative: Vec<String> = files
        .iter()
        .map(|file| to_slash(file.strip_prefix(&root).unwrap()))
        .collect();
    relative.sort();
    assert_eq!(
        relative,
        vec![
            "src/app/main.ts",
            "src/lib/format.ts",
            "src/lib/index.ts",
            "src/services/api.ts",
        ]
    );
}

#[test]
fn test_project_resolves_aliases_and_base_directory() {
    let (_guard, root) = sample_project();
    let project = open(&root);
    let main = root.join("src/app/main.ts");

    assert_eq!(
        project.resolve(&main, "@lib/format"),
        Resolution::Source(key(&root, "src/lib/format"))
    );
    assert_eq!(
        project.resolve(&main, "services/api"),
        Resolution::Source(key(&root, "src/services/api"))
    );
    assert_eq!(
        project.resolve(&main, "../lib/index.ts"),
        Resolution::Source(key(&root, "src/lib"))
    );
    assert_eq!(
        project.resolve(&main, "react"),
        Resolution::External("react".into())
    );

    let index = project.index();
    assert_eq!(index.incoming_count(&key(&root, "src/lib/format")), 1);
    assert_eq!(index.incoming_count(&key(&root, "src/services/api")), 1);
    assert_eq!(index.incoming_count("react"), 1);
    // Excluded files are neither registered nor scanned
    assert!(!index.is_scanned(&root.join("src/app/main.test.ts")));
    assert_eq!(index.stats().source_modules, 4);
}

#[test]
fn test_best_specifier_policies_on_disk() {
    let (_guard, root) = sample_project();
    let project = open(&root);
    let main = root.join("src/app/main.ts");
    let target = key(&root, "src/lib/format");

    assert_eq!(
        project.best_specifier(&main, &target, ImportPreference::Relative),
        "../lib/format"
    );
    assert_eq!(
        project.best_specifier(&main, &target, ImportPreference::NonRelative),
        "@lib/format"
    );
    assert_eq!(
        project.best_specifier(&main, &target, ImportPreference::Shortest),
        "@lib/format"
    );
    assert_eq!(
        project.best_specifier(&main, &key(&root, "src/lib"), ImportPreference::Shortest),
        "lib"
    );
}

#[test]
fn test_broken_extends_reports_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write(&root, "tsconfig.json", r#"{ "extends": "./missing.json" }"#);

    let err = TsConfigProvider::new().load(&root).unwrap_err();
    assert_eq!(err.status_code(), "CONFIG_LOAD_ERROR");
}
