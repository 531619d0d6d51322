use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};

use census_core::DatasetSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RegistryError, RegistryResult};

/// Metadata captured when a generation run starts.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub locale: String,
    pub out_dir: PathBuf,
}

/// Where one format's output went.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub format: String,
    /// Path of the file or directory, or the redacted database url.
    pub location: String,
}

/// `run.json`, written once every output has been produced.
#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub run_id: String,
    pub started_at: String,
    pub seed: u64,
    pub locale: String,
    pub summary: DatasetSummary,
    pub outputs: Vec<OutputRecord>,
}

#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Create `<out>/<timestamp>__run_<id>/` and an empty log file inside it.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.out_dir.join(format!("{timestamp}__run_{}", ctx.run_id));
    create_dir_all(&root)?;

    let logs_path = root.join("logs.ndjson");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        manifest_path: root.join("run.json"),
        logs_path,
        root,
    })
}

pub fn write_manifest(
    ctx: &RunContext,
    paths: &RunPaths,
    summary: DatasetSummary,
    outputs: Vec<OutputRecord>,
) -> RegistryResult<()> {
    let manifest = RunManifest {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        seed: ctx.seed,
        locale: ctx.locale.clone(),
        summary,
        outputs,
    };
    write_json(&paths.manifest_path, &manifest)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_directory_is_named_by_time_and_id() {
        let out_dir = std::env::temp_dir().join(format!("census_cli_run_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: DateTime::parse_from_rfc3339("2024-05-01T10:20:30Z")
                .expect("timestamp")
                .with_timezone(&Utc),
            seed: 7,
            locale: "en_US".to_string(),
            out_dir: out_dir.clone(),
        };

        let paths = start_run(&ctx).expect("start run");
        assert_eq!(paths.root, out_dir.join("2024-05-01T10-20-30Z__run_abc"));
        assert!(paths.logs_path.exists());

        let summary = DatasetSummary {
            people: 6,
            workplaces: 4,
            addresses: 3,
            people_without_address: 3,
            vacant_addresses: 0,
        };
        write_manifest(&ctx, &paths, summary, Vec::new()).expect("manifest");
        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&paths.manifest_path).expect("read run.json"),
        )
        .expect("parse run.json");
        assert_eq!(manifest["seed"], 7);
        assert_eq!(manifest["summary"]["people_without_address"], 3);
    }
}
