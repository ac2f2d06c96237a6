//! Catalog flow against the SQLite backend
//!
//! Mirrors the core of the in-memory flow test to show the two backends
//! are interchangeable behind the `CourseStore` trait.

#![cfg(feature = "sqlite")]

use curricula::prelude::*;
use std::sync::Arc;

async fn sqlite_catalog() -> CourseCatalog<SqliteCourseStore> {
    let store = SqliteCourseStore::in_memory().await.unwrap();
    CourseCatalog::new(Arc::new(store))
}

#[tokio::test]
async fn test_scenario_on_sqlite() {
    let catalog = sqlite_catalog().await;
    let requisites = catalog.requisites();

    let math101 = catalog
        .create(CourseDraft::new("MATH101", "Calculus I"))
        .await
        .unwrap();
    let math201 = catalog
        .create(CourseDraft::new("MATH201", "Calculus II"))
        .await
        .unwrap();
    let math301 = catalog
        .create(CourseDraft::new("MATH301", "Real Analysis"))
        .await
        .unwrap();

    requisites
        .add_prerequisite(math201.id(), math101.id())
        .await
        .unwrap();
    requisites
        .add_prerequisite(math301.id(), math201.id())
        .await
        .unwrap();

    let err = requisites
        .add_prerequisite(math101.id(), math301.id())
        .await;
    assert!(matches!(err, Err(ServiceError::CircularDependency { .. })));

    let roots = requisites.courses_without_prerequisites().await.unwrap();
    let codes: Vec<&str> = roots.iter().map(|c| c.code()).collect();
    assert_eq!(codes, ["MATH101"]);

    assert!(matches!(
        catalog.delete(math101.id()).await,
        Err(ServiceError::Conflict { .. })
    ));

    requisites
        .remove_prerequisite(math201.id(), math101.id())
        .await
        .unwrap();
    catalog.delete(math101.id()).await.unwrap();

    let remaining = catalog.list().await.unwrap();
    let codes: Vec<&str> = remaining.iter().map(|c| c.code()).collect();
    assert_eq!(codes, ["MATH201", "MATH301"]);
}

#[tokio::test]
async fn test_update_survives_reload() {
    let catalog = sqlite_catalog().await;

    let course = catalog
        .create(CourseDraft::new("CS101", "Intro to Computing"))
        .await
        .unwrap();

    let mut draft = CourseDraft::new("CS101", "Foundations of Computing");
    draft.credits = 6;
    draft.modality = Modality::Online;
    draft.active = false;
    catalog.update(course.id(), draft).await.unwrap();

    let reloaded = catalog.get(course.id()).await.unwrap();
    assert_eq!(reloaded.name(), "Foundations of Computing");
    assert_eq!(reloaded.credits(), 6);
    assert_eq!(reloaded.modality(), Modality::Online);
    assert!(!reloaded.is_active());
}
