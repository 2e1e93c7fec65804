use std::fs;
use std::path::{Path, PathBuf};

use super::artifact::{Artifact, ArtifactPayload};
use crate::logic::error::{ModelError, ModelResult};
use crate::logic::features::FeatureSchema;

pub const ARTIFACT_EXTENSION: &str = "json";

/// Get default models directory
pub fn default_models_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finance-ai")
        .join("models")
}

pub fn artifact_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION))
}

/// Write `<dir>/<name>.json` via a temp file + rename
pub fn save_artifact<T: ArtifactPayload>(
    dir: &Path,
    name: &str,
    schema: &FeatureSchema,
    payload: &T,
) -> ModelResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let artifact = Artifact::new(T::KIND, schema, payload)?;
    let json = serde_json::to_vec_pretty(&artifact)?;

    let path = artifact_path(dir, name);
    let tmp = path.with_extension(format!("{}.tmp", ARTIFACT_EXTENSION));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;

    log::debug!("Saved artifact {} ({}) to {}", name, T::KIND, path.display());
    Ok(path)
}

/// Load `<dir>/<name>.json` with kind, layout and checksum validation
pub fn load_artifact<T: ArtifactPayload>(dir: &Path, name: &str, schema: &FeatureSchema) -> ModelResult<T> {
    let path = artifact_path(dir, name);
    if !path.exists() {
        return Err(ModelError::MissingArtifact { path });
    }

    let data = fs::read(&path)?;
    let artifact: Artifact<T> = serde_json::from_slice(&data)?;
    artifact.verify(name, T::KIND, schema)?;

    log::debug!(
        "Loaded artifact {} ({}, saved {})",
        name, artifact.kind, artifact.saved_at.to_rfc3339()
    );
    Ok(artifact.payload)
}

pub fn artifact_exists(dir: &Path, name: &str) -> bool {
    artifact_path(dir, name).is_file()
}

/// Artifact names present in `dir` (sorted). Missing directory = empty.
pub fn list_artifacts(dir: &Path) -> ModelResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION))
        .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .collect();

    names.sort();
    Ok(names)
}
