use sitestock_core::store::entity_store::EntityStore;
use sitestock_core::store::rows::{MaterialRow, ProjectRow};
use sitestock_core::{Database, DatabaseConfig, StoreError};

fn store() -> EntityStore {
    EntityStore::new(Database::open(DatabaseConfig::in_memory()).unwrap())
}

fn project_row(id: &str, created_at: i64) -> ProjectRow {
    ProjectRow {
        id: id.to_string(),
        name: format!("project {id}"),
        description: String::new(),
        image_uri: None,
        created_at,
    }
}

fn material_row(id: &str, project_id: &str, created_at: i64) -> MaterialRow {
    MaterialRow {
        id: id.to_string(),
        project_id: project_id.to_string(),
        name: format!("material {id}"),
        quantity: "1".to_string(),
        price: "2".to_string(),
        description: String::new(),
        is_purchased: false,
        created_at,
        unit: "pcs".to_string(),
    }
}

#[tokio::test]
async fn upsert_and_fetch_rows() {
    let store = store();
    let project = ProjectRow {
        image_uri: Some("content://img/1".to_string()),
        ..project_row("p1", 10)
    };
    store.upsert_project(project.clone()).await.unwrap();
    assert_eq!(store.project_by_id("p1").await.unwrap(), Some(project));

    let material = MaterialRow {
        is_purchased: true,
        ..material_row("m1", "p1", 11)
    };
    store.upsert_material(material.clone()).await.unwrap();
    assert_eq!(store.material_by_id("m1").await.unwrap(), Some(material));
    assert_eq!(store.project_by_id("nope").await.unwrap(), None);
}

#[tokio::test]
async fn update_reports_affected_rows() {
    let store = store();
    store.upsert_project(project_row("p1", 1)).await.unwrap();

    let renamed = ProjectRow {
        name: "renamed".to_string(),
        ..project_row("p1", 1)
    };
    assert_eq!(store.update_project(renamed).await.unwrap(), 1);
    assert_eq!(store.update_project(project_row("p9", 1)).await.unwrap(), 0);
    assert_eq!(
        store.project_by_id("p1").await.unwrap().unwrap().name,
        "renamed"
    );
}

#[tokio::test]
async fn deleting_project_cascades_to_its_materials_only() {
    let store = store();
    store.upsert_project(project_row("p1", 1)).await.unwrap();
    store.upsert_project(project_row("p2", 2)).await.unwrap();
    store.upsert_material(material_row("m1", "p1", 1)).await.unwrap();
    store.upsert_material(material_row("m2", "p1", 2)).await.unwrap();
    store.upsert_material(material_row("m3", "p2", 3)).await.unwrap();

    assert!(store.delete_project(project_row("p1", 1)).await.unwrap());
    assert!(store.materials_by_project("p1").await.unwrap().is_empty());
    assert_eq!(store.materials_by_project("p2").await.unwrap().len(), 1);
    assert!(!store.delete_project(project_row("p1", 1)).await.unwrap());
}

#[tokio::test]
async fn material_with_unknown_owner_is_rejected() {
    let store = store();
    let err = store
        .upsert_material(material_row("m1", "ghost", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    assert_eq!(store.material_by_id("m1").await.unwrap(), None);
}

#[tokio::test]
async fn moving_material_between_projects_via_upsert() {
    let store = store();
    store.upsert_project(project_row("p1", 1)).await.unwrap();
    store.upsert_project(project_row("p2", 2)).await.unwrap();
    store.upsert_material(material_row("m1", "p1", 1)).await.unwrap();

    store.upsert_material(material_row("m1", "p2", 1)).await.unwrap();
    assert!(store.materials_by_project("p1").await.unwrap().is_empty());
    assert_eq!(
        store.materials_by_project("p2").await.unwrap()[0].project_id,
        "p2"
    );
}

#[tokio::test]
async fn projects_are_listed_oldest_first() {
    let store = store();
    store.upsert_project(project_row("b", 20)).await.unwrap();
    store.upsert_project(project_row("a", 10)).await.unwrap();

    let mut live = store.observe_projects();
    let ids: Vec<String> = live
        .next()
        .await
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|row| row.id)
        .collect();
    assert_eq!(ids, ["a", "b"]);
}
