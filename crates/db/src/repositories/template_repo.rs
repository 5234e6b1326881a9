//! Repository for the OKR template catalog (`okr_templates`,
//! `okr_template_objectives`, `okr_template_key_results`).

use okr_core::template::rating_bands_or_default;
use okr_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::template::{
    CreateTemplate, CreateTemplateObjective, OkrTemplate, TemplateKeyResult, TemplateObjective,
    TemplateObjectiveTree, TemplateTree, UpdateTemplate,
};

const COLUMNS: &str =
    "id, name, role_name, role_id, description, is_active, version, created_at, updated_at";

const OBJECTIVE_COLUMNS: &str =
    "id, template_id, name, description, weight, sort_order, created_at, updated_at";

const KEY_RESULT_COLUMNS: &str = "id, template_objective_id, name, target, measure, \
     measurement_source, weight, sort_order, rating_1_description, rating_2_description, \
     rating_3_description, rating_4_description, rating_5_description, created_at, updated_at";

/// Provides CRUD operations for OKR templates and their structure.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a template and its objective / key-result tree in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<OkrTemplate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO okr_templates (name, role_name, role_id, description) \
             VALUES ($1, COALESCE($2, ''), $3, COALESCE($4, '')) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(input.name.trim())
            .bind(&input.role_name)
            .bind(input.role_id)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_structure(&mut tx, template.id, &input.objectives).await?;

        tx.commit().await?;
        Ok(template)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OkrTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM okr_templates WHERE id = $1");
        sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The most recently updated active template for a job role.
    pub async fn find_active_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Option<OkrTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM okr_templates \
             WHERE role_id = $1 AND is_active = true \
             ORDER BY updated_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(role_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<OkrTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM okr_templates \
             WHERE ($1 OR is_active = true) \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Load a template with its objectives and key results, each level in
    /// ascending sort order.
    ///
    /// All three reads share one REPEATABLE READ snapshot, so a concurrent
    /// [`replace_structure`](Self::replace_structure) is seen either fully or
    /// not at all.
    pub async fn load_tree(pool: &PgPool, id: DbId) -> Result<Option<TemplateTree>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM okr_templates WHERE id = $1");
        let Some(template) = sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {OBJECTIVE_COLUMNS} FROM okr_template_objectives \
             WHERE template_id = $1 \
             ORDER BY sort_order ASC, id ASC"
        );
        let objectives = sqlx::query_as::<_, TemplateObjective>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {KEY_RESULT_COLUMNS} FROM okr_template_key_results \
             WHERE template_objective_id IN \
                (SELECT id FROM okr_template_objectives WHERE template_id = $1) \
             ORDER BY sort_order ASC, id ASC"
        );
        let key_results = sqlx::query_as::<_, TemplateKeyResult>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let objectives = objectives
            .into_iter()
            .map(|objective| TemplateObjectiveTree {
                key_results: key_results
                    .iter()
                    .filter(|kr| kr.template_objective_id == objective.id)
                    .cloned()
                    .collect(),
                objective,
            })
            .collect();

        Ok(Some(TemplateTree {
            template,
            objectives,
        }))
    }

    /// Update template metadata. Only non-`None` fields are applied. Increments version.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<OkrTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE okr_templates SET \
                name = COALESCE($2, name), \
                role_name = COALESCE($3, role_name), \
                role_id = COALESCE($4, role_id), \
                description = COALESCE($5, description), \
                is_active = COALESCE($6, is_active), \
                version = version + 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.role_name)
            .bind(input.role_id)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a template (set is_active = false).
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE okr_templates SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a template's objectives and key results and recreate them from
    /// `objectives`, keeping the template id. Returns `None` when the
    /// template does not exist.
    pub async fn replace_structure(
        pool: &PgPool,
        id: DbId,
        objectives: &[CreateTemplateObjective],
    ) -> Result<Option<OkrTemplate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE okr_templates SET version = version + 1 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, OkrTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Key results go with their objectives via ON DELETE CASCADE.
        sqlx::query("DELETE FROM okr_template_objectives WHERE template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_structure(&mut tx, id, objectives).await?;

        tx.commit().await?;
        tracing::info!(
            template_id = id,
            objectives = objectives.len(),
            "Template structure replaced"
        );
        Ok(Some(template))
    }

    /// Insert objectives and key results under a template. Missing sort
    /// orders follow input position; empty rating bands take the defaults.
    async fn insert_structure(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        objectives: &[CreateTemplateObjective],
    ) -> Result<(), sqlx::Error> {
        for (obj_index, objective) in objectives.iter().enumerate() {
            let objective_id: DbId = sqlx::query_scalar(
                "INSERT INTO okr_template_objectives \
                    (template_id, name, description, weight, sort_order) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id",
            )
            .bind(template_id)
            .bind(objective.name.trim())
            .bind(&objective.description)
            .bind(objective.weight)
            .bind(objective.sort_order.unwrap_or(obj_index as i32))
            .fetch_one(&mut **tx)
            .await?;

            for (kr_index, kr) in objective.key_results.iter().enumerate() {
                let bands = rating_bands_or_default([
                    &kr.rating_1_description,
                    &kr.rating_2_description,
                    &kr.rating_3_description,
                    &kr.rating_4_description,
                    &kr.rating_5_description,
                ]);
                sqlx::query(
                    "INSERT INTO okr_template_key_results \
                        (template_objective_id, name, target, measure, measurement_source, \
                         weight, sort_order, rating_1_description, rating_2_description, \
                         rating_3_description, rating_4_description, rating_5_description) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
                )
                .bind(objective_id)
                .bind(kr.name.trim())
                .bind(&kr.target)
                .bind(&kr.measure)
                .bind(&kr.measurement_source)
                .bind(kr.weight)
                .bind(kr.sort_order.unwrap_or(kr_index as i32))
                .bind(&bands[0])
                .bind(&bands[1])
                .bind(&bands[2])
                .bind(&bands[3])
                .bind(&bands[4])
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}
