use okr_core::template::DEFAULT_RATING_BANDS;
use okr_db::models::template::{
    CreateTemplate, CreateTemplateKeyResult, CreateTemplateObjective, UpdateTemplate,
};
use okr_db::repositories::{RoleRepo, TemplateRepo};
use sqlx::PgPool;

fn objective(name: &str, sort_order: Option<i32>, krs: &[&str]) -> CreateTemplateObjective {
    CreateTemplateObjective {
        name: name.to_string(),
        weight: 50.0,
        sort_order,
        key_results: krs
            .iter()
            .map(|kr| CreateTemplateKeyResult {
                name: kr.to_string(),
                weight: 50.0,
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_fills_default_bands_and_sort_order(pool: PgPool) {
    let mut custom = objective("Delivery", Some(0), &["Ship on time"]);
    custom.key_results[0].rating_3_description = "Meets the bar".to_string();

    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "  Platform  ".to_string(),
            role_name: None,
            role_id: None,
            description: None,
            objectives: vec![objective("Quality", Some(1), &["Bugs", "Reviews"]), custom],
        },
    )
    .await
    .unwrap();
    assert_eq!(template.name, "Platform");
    assert!(template.is_active);

    let tree = TemplateRepo::load_tree(&pool, template.id).await.unwrap().unwrap();
    assert_eq!(tree.objectives[0].objective.name, "Delivery");
    assert_eq!(tree.objectives[1].objective.name, "Quality");

    let quality = &tree.objectives[1].key_results;
    assert_eq!(quality[0].name, "Bugs");
    assert_eq!(quality[1].sort_order, 1);
    assert_eq!(quality[0].rating_bands(), DEFAULT_RATING_BANDS);

    let ship = &tree.objectives[0].key_results[0];
    assert_eq!(ship.rating_3_description, "Meets the bar");
    assert_eq!(ship.rating_1_description, DEFAULT_RATING_BANDS[0]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_structure_keeps_id_and_bumps_version(pool: PgPool) {
    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Platform".to_string(),
            role_name: None,
            role_id: None,
            description: None,
            objectives: vec![objective("Old", None, &["a", "b"])],
        },
    )
    .await
    .unwrap();

    let replaced = TemplateRepo::replace_structure(
        &pool,
        template.id,
        &[objective("New", None, &["c"]), objective("Newer", None, &[])],
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(replaced.id, template.id);
    assert_eq!(replaced.version, template.version + 1);

    let tree = TemplateRepo::load_tree(&pool, template.id).await.unwrap().unwrap();
    let names: Vec<_> = tree.objectives.iter().map(|o| o.objective.name.as_str()).collect();
    assert_eq!(names, ["New", "Newer"]);
    assert_eq!(tree.objectives[0].key_results.len(), 1);

    let missing = TemplateRepo::replace_structure(&pool, 9_999_999, &[]).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_template_for_role_ignores_inactive(pool: PgPool) {
    let role = RoleRepo::find_by_name(&pool, "Manager", None)
        .await
        .unwrap()
        .unwrap();
    let seeded = TemplateRepo::find_active_for_role(&pool, role.id)
        .await
        .unwrap()
        .unwrap();

    let newer = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Manager 2026".to_string(),
            role_name: Some(role.name.clone()),
            role_id: Some(role.id),
            description: None,
            objectives: vec![],
        },
    )
    .await
    .unwrap();
    let found = TemplateRepo::find_active_for_role(&pool, role.id).await.unwrap().unwrap();
    assert_eq!(found.id, newer.id, "most recently updated wins");

    assert!(TemplateRepo::deactivate(&pool, newer.id).await.unwrap());
    let found = TemplateRepo::find_active_for_role(&pool, role.id).await.unwrap().unwrap();
    assert_eq!(found.id, seeded.id);

    let visible = TemplateRepo::list(&pool, false).await.unwrap();
    assert!(visible.iter().all(|t| t.id != newer.id));
    let all = TemplateRepo::list(&pool, true).await.unwrap();
    assert!(all.iter().any(|t| t.id == newer.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_renames_and_reactivates(pool: PgPool) {
    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Platform".to_string(),
            role_name: None,
            role_id: None,
            description: Some("first".to_string()),
            objectives: vec![],
        },
    )
    .await
    .unwrap();
    TemplateRepo::deactivate(&pool, template.id).await.unwrap();

    let updated = TemplateRepo::update(
        &pool,
        template.id,
        &UpdateTemplate {
            name: Some("Platform v2".to_string()),
            role_name: None,
            role_id: None,
            description: None,
            is_active: Some(true),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Platform v2");
    assert_eq!(updated.description, "first");
    assert!(updated.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn load_tree_never_sees_half_replaced_structure(pool: PgPool) {
    let shapes = [
        vec![objective("Alpha", None, &["a1", "a2"])],
        vec![objective("Beta", None, &["b1"]), objective("Gamma", None, &["g1"])],
    ];
    let template_id = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "Churn".to_string(),
            role_name: None,
            role_id: None,
            description: None,
            objectives: shapes[0].clone(),
        },
    )
    .await
    .unwrap()
    .id;

    let writer = {
        let pool = pool.clone();
        tokio::spawn(async move {
            for round in 0..20 {
                TemplateRepo::replace_structure(&pool, template_id, &shapes[round % 2])
                    .await
                    .unwrap();
            }
        })
    };

    for _ in 0..40 {
        let tree = TemplateRepo::load_tree(&pool, template_id).await.unwrap().unwrap();
        assert!(!tree.objectives.is_empty());
        for node in &tree.objectives {
            assert!(
                !node.key_results.is_empty(),
                "objective {} loaded without its key results",
                node.objective.name
            );
        }
        assert_eq!(tree.key_result_count(), 2);
    }
    writer.await.unwrap();
}
