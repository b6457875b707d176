//! Material report export.
//!
//! # Responsibility
//! - Read one snapshot of a project's materials through the repository.
//! - Write it as a CSV artifact and report a tagged outcome.
//!
//! # Invariants
//! - Export only reads; it never writes to the database.
//! - Failures are reported in the outcome, never panicked.

use crate::model::material::Material;
use crate::repo::ProjectRepository;
use log::{error, info};
use std::path::{Path, PathBuf};

const CSV_HEADER: [&str; 6] = [
    "name",
    "quantity",
    "unit",
    "price",
    "purchased",
    "description",
];

/// Result of an export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Success {
        artifact: PathBuf,
        material_count: usize,
    },
    Error {
        message: String,
        cause: Option<String>,
    },
}

impl ExportOutcome {
    fn error(message: impl Into<String>, cause: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            cause,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Writes `<out_dir>/materials-<project_id>.csv` for the given project.
pub async fn export_materials_csv(
    repo: &ProjectRepository,
    project_id: &str,
    out_dir: &Path,
) -> ExportOutcome {
    let project = match repo.project_by_id(project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            return ExportOutcome::error(format!("project `{project_id}` not found"), None);
        }
        Err(err) => {
            return ExportOutcome::error("failed to load project", Some(err.to_string()));
        }
    };

    let materials = match repo.materials_by_project(&project.id).await {
        Ok(materials) => materials,
        Err(err) => {
            return ExportOutcome::error("failed to load materials", Some(err.to_string()));
        }
    };

    let artifact = out_dir.join(format!("materials-{}.csv", project.id));
    let body = match render_csv(&materials) {
        Ok(body) => body,
        Err(err) => {
            return ExportOutcome::error("failed to encode materials", Some(err.to_string()));
        }
    };
    if let Err(err) = tokio::fs::write(&artifact, body).await {
        error!(
            "event=export module=export status=error project_id={} error={}",
            project.id, err
        );
        return ExportOutcome::error(
            format!("failed to write `{}`", artifact.display()),
            Some(err.to_string()),
        );
    }

    info!(
        "event=export module=export status=ok project_id={} materials={}",
        project.id,
        materials.len()
    );
    ExportOutcome::Success {
        artifact,
        material_count: materials.len(),
    }
}

/// Encodes `materials` as CSV with a header row.
pub fn render_csv(materials: &[Material]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for material in materials {
        let purchased = material.is_purchased.to_string();
        writer.write_record([
            material.name.as_str(),
            material.quantity.as_str(),
            material.unit.as_str(),
            material.price.as_str(),
            purchased.as_str(),
            material.description.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
