//! OKR template catalog models and DTOs.

use okr_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `okr_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OkrTemplate {
    pub id: DbId,
    pub name: String,
    pub role_name: String,
    pub role_id: Option<DbId>,
    pub description: String,
    pub is_active: bool,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `okr_template_objectives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateObjective {
    pub id: DbId,
    pub template_id: DbId,
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `okr_template_key_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateKeyResult {
    pub id: DbId,
    pub template_objective_id: DbId,
    pub name: String,
    pub target: String,
    pub measure: String,
    pub measurement_source: String,
    pub weight: f64,
    pub sort_order: i32,
    pub rating_1_description: String,
    pub rating_2_description: String,
    pub rating_3_description: String,
    pub rating_4_description: String,
    pub rating_5_description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TemplateKeyResult {
    pub fn rating_bands(&self) -> [&str; 5] {
        [
            &self.rating_1_description,
            &self.rating_2_description,
            &self.rating_3_description,
            &self.rating_4_description,
            &self.rating_5_description,
        ]
    }
}

/// A template objective with its key results in sort order.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateObjectiveTree {
    #[serde(flatten)]
    pub objective: TemplateObjective,
    pub key_results: Vec<TemplateKeyResult>,
}

/// A template with its full objective / key-result tree.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateTree {
    #[serde(flatten)]
    pub template: OkrTemplate,
    pub objectives: Vec<TemplateObjectiveTree>,
}

impl TemplateTree {
    pub fn key_result_count(&self) -> usize {
        self.objectives.iter().map(|o| o.key_results.len()).sum()
    }
}

/// DTO for one key result inside a template objective.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTemplateKeyResult {
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub measure: String,
    #[serde(default)]
    pub measurement_source: String,
    #[serde(default)]
    pub weight: f64,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub rating_1_description: String,
    #[serde(default)]
    pub rating_2_description: String,
    #[serde(default)]
    pub rating_3_description: String,
    #[serde(default)]
    pub rating_4_description: String,
    #[serde(default)]
    pub rating_5_description: String,
}

/// DTO for one objective of a template, with its key results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTemplateObjective {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: f64,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub key_results: Vec<CreateTemplateKeyResult>,
}

/// DTO for creating a template together with its structure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub role_name: Option<String>,
    pub role_id: Option<DbId>,
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Vec<CreateTemplateObjective>,
}

/// DTO for updating template metadata. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub role_name: Option<String>,
    pub role_id: Option<DbId>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
