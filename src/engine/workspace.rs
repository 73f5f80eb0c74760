// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-job filesystem workspace.
//!
//! ```text
//! <working_dir>/<correlation_id>/
//! ├── input/                      shared by every workflow of the job
//! └── output/
//!     ├── <sanitized workflow 1>/
//!     └── <sanitized workflow 2>/
//! ```
//!
//! Directories are created on demand and creation is idempotent: preparing
//! the same job twice (for instance after a redelivery) reuses what is
//! already on disk. Nothing here ever deletes a workspace.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::consts::{INPUT_DIR_NAME, OUTPUT_DIR_NAME};
use crate::errors::WorkspaceError;
use crate::observability::messages::workspace::{DirectoryCreated, WorkspaceReady};
use crate::observability::messages::StructuredLog;

/// Map a workflow name to a filesystem-safe directory token.
///
/// Every character that is not a word character (alphanumeric or `_`), `-`,
/// `.` or a space is replaced with `-`. The mapping is total and
/// deterministic.
///
/// ```
/// use workflow_dispatcher::engine::workspace::sanitize_workflow_name;
///
/// assert_eq!(sanitize_workflow_name("seg/ai:v1"), "seg-ai-v1");
/// assert_eq!(sanitize_workflow_name("class-app 2.0"), "class-app 2.0");
/// ```
pub fn sanitize_workflow_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// A single, non-traversing path component.
pub fn is_directory_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Whether `workflow` maps to an output directory of its own.
///
/// Sanitizing never yields a separator, so only names that end up empty,
/// `.` or `..` are refused.
pub fn has_output_dir(workflow: &str) -> bool {
    is_directory_name(&sanitize_workflow_name(workflow))
}

/// Create `path` (and its parents) unless a directory is already there.
///
/// Returns `true` when the directory was created by this call. Anything other
/// than a directory at `path` is an error.
pub async fn ensure_dir(path: &Path, purpose: &str) -> Result<bool, WorkspaceError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(WorkspaceError {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(WorkspaceError {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    DirectoryCreated { purpose, path }.log();
    // create_dir_all tolerates a concurrent creator winning the race
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| WorkspaceError {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(true)
}

/// The directory tree of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobWorkspace {
    root: PathBuf,
    input_dir: PathBuf,
    output_root: PathBuf,
}

impl JobWorkspace {
    /// Compute the layout for a job without touching the filesystem.
    pub fn layout(working_dir: &Path, correlation_id: &str) -> Self {
        let root = working_dir.join(correlation_id);
        Self {
            input_dir: root.join(INPUT_DIR_NAME),
            output_root: root.join(OUTPUT_DIR_NAME),
            root,
        }
    }

    /// Create the input directory and one output directory per workflow.
    ///
    /// Safe to call repeatedly for the same job; existing directories are
    /// left untouched. Workflows without a usable output directory are
    /// skipped here and fail on their own when executed.
    pub async fn ensure(
        working_dir: &Path,
        correlation_id: &str,
        workflows: &[String],
    ) -> Result<Self, WorkspaceError> {
        let workspace = Self::layout(working_dir, correlation_id);

        ensure_dir(&workspace.input_dir, "input").await?;
        for workflow in workflows.iter().filter(|w| has_output_dir(w)) {
            ensure_dir(&workspace.output_dir_for(workflow), "output").await?;
        }

        WorkspaceReady {
            correlation_id,
            root: &workspace.root,
            workflow_count: workflows.len(),
        }
        .log();

        Ok(workspace)
    }

    /// Shared input directory.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Private output directory of `workflow`.
    pub fn output_dir_for(&self, workflow: &str) -> PathBuf {
        self.output_root.join(sanitize_workflow_name(workflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_workflow_name("seg/ai:v1"), "seg-ai-v1");
        assert_eq!(sanitize_workflow_name("a\\b*c?d"), "a-b-c-d");
        assert_eq!(sanitize_workflow_name("keep_me-1.0 final"), "keep_me-1.0 final");
        assert_eq!(sanitize_workflow_name(""), "");
    }

    #[test]
    fn test_sanitize_output_only_contains_allowed_characters() {
        let inputs = ["seg/ai:v1", "ünïcode/名前", "tab\there", "$(rm -rf)", "a|b>c<d"];
        for input in inputs {
            let token = sanitize_workflow_name(input);
            assert_eq!(token.chars().count(), input.chars().count());
            assert!(token
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')));
            assert_eq!(token, sanitize_workflow_name(input));
        }
    }

    #[test]
    fn test_layout_paths() {
        let ws = JobWorkspace::layout(Path::new("/jobs"), "abc123");

        assert_eq!(ws.root.as_path(), Path::new("/jobs/abc123"));
        assert_eq!(ws.input_dir(), Path::new("/jobs/abc123/input"));
        assert_eq!(
            ws.output_dir_for("seg/ai:v1"),
            PathBuf::from("/jobs/abc123/output/seg-ai-v1")
        );
    }

    #[tokio::test]
    async fn test_ensure_creates_input_and_outputs() {
        let dir = TempDir::new().unwrap();
        let ws = JobWorkspace::ensure(dir.path(), "abc123", &names(&["seg-app", "class/app"]))
            .await
            .unwrap();

        assert!(ws.input_dir().is_dir());
        assert!(dir.path().join("abc123/output/seg-app").is_dir());
        assert!(dir.path().join("abc123/output/class-app").is_dir());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let workflows = names(&["seg-app"]);

        let first = JobWorkspace::ensure(dir.path(), "abc123", &workflows)
            .await
            .unwrap();
        std::fs::write(first.input_dir().join("ct.dcm"), b"kept").unwrap();

        let second = JobWorkspace::ensure(dir.path(), "abc123", &workflows)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            std::fs::read(second.input_dir().join("ct.dcm")).unwrap(),
            b"kept"
        );
    }

    #[tokio::test]
    async fn test_distinct_jobs_do_not_share_directories() {
        let dir = TempDir::new().unwrap();
        let workflows = names(&["seg-app"]);

        let a = JobWorkspace::ensure(dir.path(), "job-a", &workflows).await.unwrap();
        let b = JobWorkspace::ensure(dir.path(), "job-b", &workflows).await.unwrap();

        assert_ne!(a.root.as_path(), b.root.as_path());
        assert!(!a.input_dir().starts_with(b.root.as_path()));
        assert!(!b.output_dir_for("seg-app").starts_with(a.root.as_path()));
    }

    #[tokio::test]
    async fn test_ensure_dir_reports_creation() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        assert!(ensure_dir(&nested, "working").await.unwrap());
        assert!(!ensure_dir(&nested, "working").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("abc123"), b"not a directory").unwrap();

        let result = JobWorkspace::ensure(dir.path(), "abc123", &names(&["seg-app"])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ensure_fails_when_output_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let output_root = dir.path().join("abc123/output");
        std::fs::create_dir_all(&output_root).unwrap();
        std::fs::write(output_root.join("seg-app"), b"stale").unwrap();

        let err = JobWorkspace::ensure(dir.path(), "abc123", &names(&["seg-app"]))
            .await
            .unwrap_err();
        assert_eq!(err.path, output_root.join("seg-app"));
        assert_eq!(err.source.kind(), io::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_ensure_dir_rejects_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("working");
        std::fs::write(&file, b"").unwrap();

        assert!(ensure_dir(&file, "working").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_skips_workflows_without_output_dir() {
        let dir = TempDir::new().unwrap();
        JobWorkspace::ensure(dir.path(), "abc123", &names(&["seg-app", "..", ""]))
            .await
            .unwrap();

        let mut created: Vec<_> = std::fs::read_dir(dir.path().join("abc123/output"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        created.sort();
        assert_eq!(created, vec!["seg-app"]);
    }

    #[test]
    fn test_has_output_dir() {
        assert!(has_output_dir("seg/ai:v1"));
        assert!(has_output_dir("../escape"));
        assert!(!has_output_dir(".."));
        assert!(!has_output_dir("."));
        assert!(!has_output_dir(""));
    }
}
