//! File-driven bulk import and export.
//!
//! One import run is one outer transaction. Strict mode aborts on the
//! first bad record and nothing commits. Force mode gives every record
//! its own savepoint, so a failure rolls back that record alone while
//! the rest of the run carries on. Related-technique links always apply
//! in a second pass at the end of the run, once every technique named
//! by the file exists.

use std::path::Path;

use serde_json::{json, Value};
use sqlx::Acquire;
use tea_core::error::FieldErrors;
use tea_core::import::{validate_record, ImportOptions, ImportRecord, ImportStats};
use tea_db::models::technique::TechniqueDetail;
use tea_db::repositories::TechniqueRepo;
use tea_db::DbPool;
use tea_service::{TechniqueService, UpsertOutcome};

use crate::error::ImportError;

/// Drives import and export runs against one database pool.
pub struct Importer {
    pool: DbPool,
}

impl Importer {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Import a parsed record array. Dry runs validate and count without
    /// opening a write transaction.
    pub async fn import(
        &self,
        records: &[Value],
        options: ImportOptions,
    ) -> Result<ImportStats, ImportError> {
        if options.dry_run {
            return Ok(dry_run(records));
        }

        let mut tx = self.pool.begin().await?;
        let stats = run(&mut tx, records, options).await?;
        tx.commit().await?;
        Ok(stats)
    }

    /// Delete every technique, then import. Goals, tags, and resource
    /// types survive the wipe.
    pub async fn reset_and_import(
        &self,
        records: &[Value],
        options: ImportOptions,
    ) -> Result<ImportStats, ImportError> {
        if options.dry_run {
            return Ok(dry_run(records));
        }

        let mut tx = self.pool.begin().await?;
        let wiped = TechniqueRepo::delete_all(&mut tx).await?;
        tracing::info!(wiped, "existing techniques deleted");
        let stats = run(&mut tx, records, options).await?;
        tx.commit().await?;
        Ok(stats)
    }

    /// Dump every technique in the import file format, ordered by slug,
    /// so the output can be fed straight back into `import`.
    pub async fn export(&self) -> Result<Vec<Value>, ImportError> {
        let slugs = TechniqueRepo::all_slugs(&self.pool).await?;
        let mut records = Vec::with_capacity(slugs.len());
        for slug in &slugs {
            if let Some(detail) = TechniqueRepo::get_detail(&self.pool, slug).await? {
                records.push(detail_to_record(&detail));
            }
        }
        Ok(records)
    }
}

async fn run(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    records: &[Value],
    options: ImportOptions,
) -> Result<ImportStats, ImportError> {
    let mut stats = ImportStats::default();
    let mut related: Vec<(String, Vec<String>)> = Vec::new();

    for (index, raw) in records.iter().enumerate() {
        stats.processed += 1;

        let record = match decode(index, raw) {
            Ok(record) => record,
            Err(err) => {
                if options.force {
                    tracing::warn!(index, error = %err, "record failed validation, skipping");
                    stats.skipped += 1;
                    continue;
                }
                return Err(err);
            }
        };

        let outcome = if options.force {
            let mut sp = tx.begin().await?;
            match TechniqueService::upsert_in_tx(&mut sp, &record).await {
                Ok(outcome) => {
                    sp.commit().await?;
                    outcome
                }
                Err(err) => {
                    sp.rollback().await?;
                    tracing::error!(
                        index,
                        name = %record.name,
                        error = %err,
                        "record failed, continuing"
                    );
                    stats.failed += 1;
                    continue;
                }
            }
        } else {
            TechniqueService::upsert_in_tx(tx, &record)
                .await
                .map_err(|source| ImportError::Record {
                    index,
                    name: record.name.clone(),
                    source,
                })?
        };

        match &outcome {
            UpsertOutcome::Created(slug) => {
                stats.created += 1;
                tracing::info!(index, slug = %slug, "technique created");
            }
            UpsertOutcome::Updated(slug) => {
                stats.updated += 1;
                tracing::info!(index, slug = %slug, "technique updated");
            }
        }

        if !record.related_techniques.is_empty() {
            related.push((outcome.slug().to_string(), record.related_techniques));
        }
    }

    // Second pass: every technique named by the file now exists, so
    // forward references resolve and anything still missing is a genuine
    // ghost to skip.
    for (slug, targets) in &related {
        if options.force {
            let mut sp = tx.begin().await?;
            match TechniqueService::apply_related_lenient(&mut sp, slug, targets).await {
                Ok(_) => sp.commit().await?,
                Err(err) => {
                    sp.rollback().await?;
                    tracing::error!(slug = %slug, error = %err, "related links failed, continuing");
                }
            }
        } else {
            TechniqueService::apply_related_lenient(tx, slug, targets)
                .await
                .map_err(|source| ImportError::Related {
                    slug: slug.clone(),
                    source,
                })?;
        }
    }

    Ok(stats)
}

/// Shape-check one raw record, then deserialize it.
fn decode(index: usize, raw: &Value) -> Result<ImportRecord, ImportError> {
    let name = record_name(raw);

    let errors = validate_record(raw);
    if !errors.is_empty() {
        return Err(ImportError::Validation {
            index,
            name,
            errors,
        });
    }

    serde_json::from_value(raw.clone()).map_err(|err| ImportError::Validation {
        index,
        name,
        errors: FieldErrors::single("record", err.to_string()),
    })
}

fn dry_run(records: &[Value]) -> ImportStats {
    let mut stats = ImportStats::default();
    for (index, raw) in records.iter().enumerate() {
        stats.processed += 1;
        let errors = validate_record(raw);
        if errors.is_empty() {
            continue;
        }
        tracing::warn!(
            index,
            name = %record_name(raw),
            errors = %errors,
            "record would be skipped"
        );
        stats.skipped += 1;
    }
    stats
}

fn record_name(raw: &Value) -> String {
    raw.get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}

/// One technique detail rendered in the import file format.
fn detail_to_record(detail: &TechniqueDetail) -> Value {
    let technique = &detail.technique;

    let goals: Vec<&str> = detail
        .assurance_goals
        .iter()
        .map(|goal| goal.name.as_str())
        .collect();
    let tags: Vec<&str> = detail.tags.iter().map(|tag| tag.name.as_str()).collect();

    let resources: Vec<Value> = detail
        .resources
        .iter()
        .map(|resource| {
            json!({
                "type": resource.resource_type_name,
                "title": resource.title,
                "url": resource.url,
                "description": resource.description,
                "authors": if resource.authors.is_empty() {
                    Value::Null
                } else {
                    Value::String(resource.authors.clone())
                },
                "publication_date": resource.publication_date.map(|date| date.to_string()),
                "source_type": resource.source_type,
            })
        })
        .collect();

    let use_cases: Vec<Value> = detail
        .example_use_cases
        .iter()
        .map(|use_case| {
            json!({
                "description": use_case.description,
                "goal": use_case.assurance_goal_name,
            })
        })
        .collect();

    let limitations: Vec<&str> = detail
        .limitations
        .iter()
        .map(|limitation| limitation.description.as_str())
        .collect();

    json!({
        "name": technique.name,
        "slug": technique.slug,
        "acronym": technique.acronym,
        "description": technique.description,
        "complexity_rating": technique.complexity_rating,
        "computational_cost_rating": technique.computational_cost_rating,
        "assurance_goals": goals,
        "tags": tags,
        "related_techniques": detail.related_techniques,
        "resources": resources,
        "example_use_cases": use_cases,
        "limitations": limitations,
    })
}

/// Read and parse an import file into its raw record array.
pub fn read_records(path: &Path) -> Result<Vec<Value>, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: Value = serde_json::from_str(&text).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match parsed {
        Value::Array(records) => Ok(records),
        _ => Err(ImportError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

/// Write records as pretty-printed JSON.
pub fn write_records(path: &Path, records: &[Value]) -> Result<(), ImportError> {
    let text = serde_json::to_string_pretty(records).map_err(|source| ImportError::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other(source),
    })?;
    std::fs::write(path, text).map_err(|source| ImportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn temp_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn read_records_accepts_an_array() {
        let file = temp_file(r#"[{"name": "A", "description": "a"}]"#);
        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "A");
    }

    #[test]
    fn read_records_rejects_a_non_array() {
        let file = temp_file(r#"{"name": "A"}"#);
        let err = read_records(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn read_records_reports_broken_json() {
        let file = temp_file("[{");
        let err = read_records(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn read_records_reports_missing_files() {
        let err = read_records(Path::new("/no/such/file.json")).unwrap_err();
        assert!(matches!(err, ImportError::Read { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn dry_run_counts_invalid_records_as_skipped() {
        let records = vec![
            json!({"name": "A", "description": "a"}),
            json!({"description": "no name here"}),
            json!({"name": "B", "description": "b"}),
        ];
        let stats = dry_run(&records);
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn unnamed_records_get_a_placeholder_label() {
        assert_eq!(record_name(&json!({"description": "x"})), "<unnamed>");
        assert_eq!(record_name(&json!({"name": "SHAP"})), "SHAP");
    }
}
