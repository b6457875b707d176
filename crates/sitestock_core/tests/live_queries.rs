use futures::StreamExt;
use sitestock_core::{Database, DatabaseConfig, Material, Project, ProjectRepository};
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn repository() -> ProjectRepository {
    ProjectRepository::new(Database::open(DatabaseConfig::in_memory()).unwrap())
}

fn material_at(name: &str, created_at: i64) -> Material {
    let mut material = Material::new(name, "1", "pcs", "1");
    material.created_at = created_at;
    material
}

fn names(materials: &[Material]) -> Vec<&str> {
    materials.iter().map(|m| m.name.as_str()).collect()
}

#[tokio::test]
async fn first_emission_is_current_snapshot() {
    let repo = repository();
    repo.insert_project(&Project::new("Garage", "").with_id("p1"))
        .await
        .unwrap();
    repo.insert_material(&material_at("Sand", 1_000), "p1")
        .await
        .unwrap();

    let mut live = repo.observe_materials_by_project("p1");
    let first = timeout(WAIT, live.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(names(&first), ["Sand"]);
}

#[tokio::test]
async fn insert_after_subscription_produces_new_ordered_snapshot() {
    let repo = repository();
    repo.insert_project(&Project::new("Garage", "").with_id("p1"))
        .await
        .unwrap();
    repo.insert_material(&material_at("Sand", 1_000), "p1")
        .await
        .unwrap();

    let mut live = repo.observe_materials_by_project("p1");
    live.next().await.unwrap().unwrap();

    repo.insert_material(&material_at("Cement", 2_000), "p1")
        .await
        .unwrap();
    let next = timeout(WAIT, live.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(names(&next), ["Sand", "Cement"]);
}

#[tokio::test]
async fn project_delete_empties_material_feed() {
    let repo = repository();
    let project = Project::new("Garage", "").with_id("p1");
    repo.insert_project(&project).await.unwrap();
    repo.insert_material(&material_at("Sand", 1), "p1")
        .await
        .unwrap();
    repo.insert_material(&material_at("Cement", 2), "p1")
        .await
        .unwrap();

    let mut live = repo.observe_materials_by_project("p1");
    assert_eq!(live.next().await.unwrap().unwrap().len(), 2);

    assert!(repo.delete_project(&project).await.unwrap());
    let after = timeout(WAIT, live.next()).await.unwrap().unwrap().unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn every_subscriber_observes_the_write() {
    let repo = repository();
    let mut first = repo.observe_projects();
    let mut second = repo.observe_projects();
    assert!(first.next().await.unwrap().unwrap().is_empty());
    assert!(second.next().await.unwrap().unwrap().is_empty());

    repo.insert_project(&Project::new("Kitchen", "")).await.unwrap();

    for live in [&mut first, &mut second] {
        let projects = timeout(WAIT, live.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Kitchen");
    }
}

#[tokio::test]
async fn burst_of_writes_converges_to_final_state() {
    let repo = repository();
    repo.insert_project(&Project::new("Garage", "").with_id("p1"))
        .await
        .unwrap();
    let mut live = repo.observe_materials_by_project("p1");
    live.next().await.unwrap().unwrap();

    for i in 0..20 {
        repo.insert_material(&material_at(&format!("m{i}"), i), "p1")
            .await
            .unwrap();
    }

    // Snapshots may coalesce; the feed must reach the full list.
    loop {
        let snapshot = timeout(WAIT, live.next()).await.unwrap().unwrap().unwrap();
        if snapshot.len() == 20 {
            assert_eq!(snapshot[0].name, "m0");
            assert_eq!(snapshot[19].name, "m19");
            break;
        }
    }
}

#[tokio::test]
async fn stream_adapter_yields_snapshots() {
    let repo = repository();
    let mut stream = Box::pin(repo.observe_projects().into_stream());
    assert!(stream.next().await.unwrap().unwrap().is_empty());

    repo.insert_project(&Project::new("Shed", "").with_id("p1"))
        .await
        .unwrap();
    let projects = timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(projects[0].id, "p1");
}

#[tokio::test]
async fn cancelled_wait_leaves_store_usable() {
    let repo = repository();
    let mut live = repo.observe_projects();
    live.next().await.unwrap().unwrap();

    assert!(timeout(Duration::from_millis(20), live.next()).await.is_err());
    drop(live);

    repo.insert_project(&Project::new("Porch", "").with_id("p1"))
        .await
        .unwrap();
    let mut fresh = repo.observe_projects();
    let projects = fresh.next().await.unwrap().unwrap();
    assert_eq!(projects.len(), 1);
}
