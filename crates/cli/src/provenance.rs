//! Provenance sidecars: every file the CLI writes gets a
//! `<stem>.provenance.json` next to it naming the build, the command and the
//! files that went in and came out.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

const TOOL: &str = "voronoi-cli";

/// What produced an artifact.
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
    pub inputs: Vec<PathBuf>,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_input<P: AsRef<Path>>(mut self, input: P) -> Self {
        self.inputs.push(input.as_ref().to_path_buf());
        self
    }
}

/// A file named in a sidecar; `bytes` is `None` if it could not be stat'ed.
#[derive(Debug, Serialize)]
struct FileRecord {
    path: String,
    bytes: Option<u64>,
}

impl FileRecord {
    fn of(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            bytes: fs::metadata(path).ok().map(|m| m.len()),
        }
    }
}

#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    tool: &'static str,
    version: &'static str,
    code_rev: String,
    written_at: String,
    command: &'a str,
    params: &'a Value,
    inputs: Vec<FileRecord>,
    outputs: Vec<FileRecord>,
}

/// Describe `artifact` (already written) in its sidecar and return the
/// sidecar's path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let caller = Location::caller();
    let sidecar = Sidecar {
        tool: TOOL,
        version: voronoi::VERSION,
        code_rev: current_git_rev(),
        written_at: format!("{}:{}", caller.file(), caller.line()),
        command: payload.command,
        params: &payload.params,
        inputs: payload.inputs.iter().map(|p| FileRecord::of(p)).collect(),
        outputs: vec![FileRecord::of(artifact)],
    };

    let path = sidecar_path(artifact);
    fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(
        artifact = %artifact.display(),
        sidecar = %path.display(),
        command = payload.command,
        "provenance recorded"
    );
    Ok(path)
}

/// `dir/diagram.json` -> `dir/diagram.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Commit the binary reports: `GIT_COMMIT` at build time, then at run time,
/// then `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    let non_empty = |s: String| (!s.is_empty()).then_some(s);
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .and_then(non_empty)
        .or_else(|| std::env::var("GIT_COMMIT").ok().and_then(non_empty))
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            if !out.status.success() {
                return None;
            }
            String::from_utf8(out.stdout)
                .ok()
                .map(|s| s.trim().to_string())
                .and_then(non_empty)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DiagramJson;
    use nalgebra::Vector2;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_artifact() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/output/diagram.json")),
            Path::new("/tmp/output/diagram.provenance.json")
        );
        assert_eq!(
            sidecar_path(Path::new("runs/sites")),
            Path::new("runs/sites.provenance.json")
        );
    }

    #[test]
    fn sidecar_describes_a_written_diagram() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("diagram.json");
        let sites = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(2.0, 4.0),
        ];
        let d = voronoi::compute(&sites).unwrap();
        let body = serde_json::to_vec(&DiagramJson::from(&d)).unwrap();
        fs::write(&artifact, &body).unwrap();

        let missing = dir.path().join("sites.csv");
        let payload = Payload::new("run", json!({ "sites": sites.len() })).with_input(&missing);
        let path = write_sidecar(&artifact, payload).unwrap();
        assert_eq!(path, dir.path().join("diagram.provenance.json"));

        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["tool"], TOOL);
        assert_eq!(doc["version"], voronoi::VERSION);
        assert_eq!(doc["command"], "run");
        assert_eq!(doc["params"]["sites"], 3);
        assert_eq!(doc["outputs"][0]["path"], artifact.to_string_lossy().as_ref());
        assert_eq!(doc["outputs"][0]["bytes"], body.len() as u64);
        assert_eq!(doc["inputs"][0]["path"], missing.to_string_lossy().as_ref());
        assert!(doc["inputs"][0]["bytes"].is_null());
        assert!(doc["written_at"].as_str().unwrap().contains("provenance.rs"));
        assert!(!doc["code_rev"].as_str().unwrap().is_empty());
    }
}
