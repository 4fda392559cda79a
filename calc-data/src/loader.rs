use std::io::Read;

use calc_core::{Addon, CatalogRepository, ProjectType, RepositoryError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading addon catalog data.
#[derive(Debug, Error)]
pub enum CatalogLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid project type '{0}' on line {1}")]
    InvalidProjectType(String, usize),

    #[error("Project type '{0}' not found in database (have you run the seeds?)")]
    ProjectTypeNotFound(ProjectType),

    #[error("Addon '{label}' is listed twice for project type '{project_type}'")]
    DuplicateLabel {
        project_type: ProjectType,
        label: String,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for CatalogLoaderError {
    fn from(err: csv::Error) -> Self {
        CatalogLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the addons CSV file.
///
/// - `project_type`: project type code (`website`, `ecommerce`, `ai_tools`,
///   `erp_systems`; `institutional_site` is accepted for `ecommerce`)
/// - `label`: addon name, unique within its project type
/// - `description`: short description shown next to the addon
/// - `price`: whole złoty
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AddonRecord {
    pub project_type: ProjectType,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
}

impl AddonRecord {
    fn to_addon(&self) -> Addon {
        Addon::new(self.label.trim(), self.description.trim(), self.price)
    }
}

#[derive(Debug, Deserialize)]
struct RawAddonRecord {
    project_type: String,
    label: String,
    #[serde(default)]
    description: String,
    price: u64,
}

/// Loader for addon catalog data from CSV files.
///
/// Records are written through the [`CatalogRepository`] trait, so the
/// loader works with any registered backend.
pub struct AddonLoader;

impl AddonLoader {
    /// Parse addon records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<AddonRecord>, CatalogLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let raw: RawAddonRecord = result?;
            // Line 1 is the header.
            let line = index + 2;
            let project_type = ProjectType::parse(&raw.project_type)
                .ok_or_else(|| CatalogLoaderError::InvalidProjectType(raw.project_type.clone(), line))?;

            let duplicate = records.iter().any(|known: &AddonRecord| {
                known.project_type == project_type && known.label == raw.label
            });
            if duplicate {
                return Err(CatalogLoaderError::DuplicateLabel {
                    project_type,
                    label: raw.label,
                });
            }

            records.push(AddonRecord {
                project_type,
                label: raw.label,
                description: raw.description,
                price: raw.price,
            });
        }

        Ok(records)
    }

    /// Load addon records into the repository.
    ///
    /// For each project type present in `records`, the existing addons are
    /// deleted and the file's addons inserted in file order, so loading the
    /// same file twice gives the same catalog. Project types absent from the
    /// file are left untouched.
    pub async fn load<R: CatalogRepository + ?Sized>(
        repo: &R,
        records: &[AddonRecord],
    ) -> Result<usize, CatalogLoaderError> {
        let mut groups: Vec<(ProjectType, Vec<&AddonRecord>)> = Vec::new();
        for record in records {
            match groups.iter_mut().find(|(pt, _)| *pt == record.project_type) {
                Some((_, group)) => group.push(record),
                None => groups.push((record.project_type, vec![record])),
            }
        }

        let mut inserted = 0;
        for (project_type, group) in groups {
            repo.get_project_type(project_type)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => CatalogLoaderError::ProjectTypeNotFound(project_type),
                    other => CatalogLoaderError::Repository(other),
                })?;

            repo.delete_addons(project_type).await?;

            for record in &group {
                repo.insert_addon(project_type, &record.to_addon()).await?;
                inserted += 1;
            }
            debug!(%project_type, addons = group.len(), "replaced addons");
        }

        info!(inserted, "addon catalog loaded");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TEST_CSV: &str = "project_type,label,description,price
website,SEO,Podstawowa optymalizacja,500
website,Blog,Moduł bloga,1500
institutional_site,BIP,Biuletyn Informacji Publicznej,3500
ai_tools,Chatbot,Asystent AI,6000
";

    #[test]
    fn test_parse_single_record() {
        let csv = "project_type,label,description,price\nwebsite,SEO,Optymalizacja,500";

        let records = AddonLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![AddonRecord {
                project_type: ProjectType::Website,
                label: "SEO".to_string(),
                description: "Optymalizacja".to_string(),
                price: 500,
            }]
        );
    }

    #[test]
    fn test_parse_accepts_institutional_alias() {
        let records = AddonLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 4);
        assert_eq!(records[2].project_type, ProjectType::Ecommerce);
    }

    #[test]
    fn test_parse_trims_fields() {
        let csv = "project_type,label,description,price\n website , SEO , Opis , 500 ";

        let records = AddonLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].label, "SEO");
        assert_eq!(records[0].price, 500);
    }

    #[test]
    fn test_parse_unknown_project_type() {
        let csv = "project_type,label,description,price\nwebsite,SEO,,500\nmobile_app,Push,,100";

        let err = AddonLoader::parse(csv.as_bytes()).expect_err("Should reject unknown type");

        let CatalogLoaderError::InvalidProjectType(code, line) = err else {
            panic!("Expected InvalidProjectType error, got: {:?}", err);
        };
        assert_eq!(code, "mobile_app");
        assert_eq!(line, 3);
    }

    #[test]
    fn test_parse_duplicate_label() {
        let csv = "project_type,label,description,price\nwebsite,SEO,,500\nwebsite,SEO,,700";

        let err = AddonLoader::parse(csv.as_bytes()).expect_err("Should reject duplicate label");

        assert!(matches!(
            err,
            CatalogLoaderError::DuplicateLabel { project_type: ProjectType::Website, .. }
        ));
    }

    #[test]
    fn test_same_label_for_different_types_is_fine() {
        let csv = "project_type,label,description,price\nwebsite,API,,500\nai_tools,API,,700";

        let records = AddonLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "project_type,label\nwebsite,SEO";

        let err = AddonLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let CatalogLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_negative_price() {
        let csv = "project_type,label,description,price\nwebsite,SEO,,-500";

        let err = AddonLoader::parse(csv.as_bytes()).expect_err("Should fail for negative price");

        assert!(matches!(err, CatalogLoaderError::CsvParse(_)));
    }
}
