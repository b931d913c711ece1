//! Loading of forms, responses and school registries.
//!
//! Responses can come from a single JSON file or from a directory tree of
//! JSON files; directory contents are read concurrently.

use crate::models::{FormDefinition, ResponseRecord, School};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors raised while loading input data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Options for discovering response files.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Extension of response files inside a directory (without dot).
    pub extension: String,
    /// Maximum directory depth to descend.
    pub max_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            max_depth: 4,
        }
    }
}

/// A response file holds either a list of records or a single record.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseFile {
    Many(Vec<ResponseRecord>),
    One(Box<ResponseRecord>),
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoaderError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| LoaderError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a form definition.
pub async fn load_form(path: &Path) -> Result<FormDefinition, LoaderError> {
    let form: FormDefinition = read_json(path).await?;
    debug!("Loaded form {} with {} fields", form.form_id, form.fields.len());
    Ok(form)
}

/// Load a school registry.
pub async fn load_schools(path: &Path) -> Result<Vec<School>, LoaderError> {
    let schools: Vec<School> = read_json(path).await?;
    debug!("Loaded {} schools from {}", schools.len(), path.display());
    Ok(schools)
}

/// Load responses from a file or a directory.
pub async fn load_responses(
    path: &Path,
    options: &LoadOptions,
) -> Result<Vec<ResponseRecord>, LoaderError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let files = if metadata.is_dir() {
        discover_response_files(path, options)?
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        warn!(
            "No .{} response files found under {}",
            options.extension,
            path.display()
        );
    }

    let batches = try_join_all(files.iter().map(|file| read_json::<ResponseFile>(file))).await?;

    let responses: Vec<ResponseRecord> = batches
        .into_iter()
        .flat_map(|batch| match batch {
            ResponseFile::Many(records) => records,
            ResponseFile::One(record) => vec![*record],
        })
        .collect();

    info!(
        "Loaded {} responses from {} file(s)",
        responses.len(),
        files.len()
    );
    Ok(responses)
}

/// Response files under `root`, sorted by path.
fn discover_response_files(root: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>, LoaderError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).max_depth(options.max_depth) {
        let entry = entry.map_err(|source| LoaderError::Walk {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(options.extension.as_str()))
            .unwrap_or(false);

        if matches {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Discovered {} response files under {}", files.len(), root.display());
    Ok(files)
}

/// Load a form and its responses concurrently.
///
/// Responses submitted for a different form are dropped.
pub async fn load_form_with_responses(
    form_path: &Path,
    responses_path: &Path,
    options: &LoadOptions,
) -> Result<(FormDefinition, Vec<ResponseRecord>), LoaderError> {
    let (form, mut responses) = tokio::try_join!(
        load_form(form_path),
        load_responses(responses_path, options)
    )?;

    let before = responses.len();
    responses.retain(|r| r.form_id.is_empty() || r.form_id == form.form_id);
    if responses.len() < before {
        debug!(
            "Dropped {} responses submitted for other forms",
            before - responses.len()
        );
    }

    Ok((form, responses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    #[test]
    fn test_load_fixture_form() {
        let form = tokio_test::block_on(load_form(&fixture("form.json"))).unwrap();
        assert_eq!(form.form_id, "FORM-INFRA-2025");
        assert!(!form.fields.is_empty());
    }

    #[test]
    fn test_load_fixture_schools() {
        let schools = tokio_test::block_on(load_schools(&fixture("schools.json"))).unwrap();
        assert!(schools.iter().all(|s| s.udise_code.len() == 11));
    }

    #[test]
    fn test_load_responses_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"formId":"F1","districtName":"Satara","responses":{"f1":"3"}}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested").join("a.json"),
            r#"[{"formId":"F1","districtName":"Pune","responses":{"f1":"1"}},
                {"formId":"F1","districtName":"Pune","responses":{"f1":"2"}}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let responses =
            tokio_test::block_on(load_responses(dir.path(), &LoadOptions::default())).unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].district_name, "Satara");
        assert_eq!(responses[1].district_name, "Pune");
    }

    #[test]
    fn test_empty_directory_yields_no_responses() {
        let dir = TempDir::new().unwrap();
        let responses =
            tokio_test::block_on(load_responses(dir.path(), &LoadOptions::default())).unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn test_null_location_does_not_fail_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        fs::write(
            &path,
            r#"[{"districtName":null,"responses":{"f1":"3"}},
                {"districtName":"Pune","status":"archived","responses":{"f1":"4"}}]"#,
        )
        .unwrap();

        let responses =
            tokio_test::block_on(load_responses(&path, &LoadOptions::default())).unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].district_name, "");
        assert_eq!(responses[1].status.as_deref(), Some("archived"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = tokio_test::block_on(load_responses(&path, &LoadOptions::default())).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_path() {
        let err = tokio_test::block_on(load_responses(
            Path::new("/definitely/not/here.json"),
            &LoadOptions::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn test_responses_for_other_forms_are_dropped() {
        let dir = TempDir::new().unwrap();
        let responses = dir.path().join("responses.json");
        fs::write(
            &responses,
            r#"[{"formId":"FORM-INFRA-2025","responses":{}},
                {"formId":"OTHER","responses":{}},
                {"responses":{}}]"#,
        )
        .unwrap();

        let (form, responses) = tokio_test::block_on(load_form_with_responses(
            &fixture("form.json"),
            &responses,
            &LoadOptions::default(),
        ))
        .unwrap();
        assert_eq!(form.form_id, "FORM-INFRA-2025");
        assert_eq!(responses.len(), 2);
    }
}
