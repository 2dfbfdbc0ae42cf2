//! User service tests over the in-memory Unit of Work.

use common::{AppError, RepositoryConfig};
use domain::{Filters, Patch, Window};
use repository::InMemoryStore;
use serde_json::json;
use uuid::Uuid;

use user_service_lib::entities::User;
use user_service_lib::service::{NewUser, UserManager, UserService, DEFAULT_ROLE};

fn new_user(email: &str, role: Option<&str>) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: "Test User".to_string(),
        role: role.map(str::to_string),
        bio: None,
    }
}

fn service() -> (InMemoryStore<User>, UserManager<InMemoryStore<User>>) {
    let store = InMemoryStore::new();
    let manager = UserManager::new(store.clone(), RepositoryConfig::default());
    (store, manager)
}

#[tokio::test]
async fn test_create_and_get_user() {
    let (store, service) = service();

    let created = service.create_user(new_user("ada@example.com", None)).await.unwrap();
    assert_eq!(created.role, DEFAULT_ROLE);
    assert_eq!(store.len(), 1);

    let fetched = service.get_user(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_user_with_taken_email() {
    let (store, service) = service();
    service.create_user(new_user("ada@example.com", None)).await.unwrap();

    let err = service
        .create_user(new_user("ada@example.com", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AppError::Conflict("User with email ada@example.com already exists".into())
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_get_missing_user() {
    let (_store, service) = service();
    let id = Uuid::new_v4();

    let err = service.get_user(id).await.unwrap_err();
    assert_eq!(err.detail(), format!("User not found with ID {}", id));
}

#[tokio::test]
async fn test_update_user_fields() {
    let (store, service) = service();
    let user = service.create_user(new_user("ada@example.com", None)).await.unwrap();

    let patch = Patch::new().set("name", "Ada Lovelace").set("bio", "Analyst");
    let updated = service.update_user(user.id, patch, true).await.unwrap();
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.bio.as_deref(), Some("Analyst"));
    assert!(updated.updated_at >= user.updated_at);
    assert_eq!(store.rows()[0].name, "Ada Lovelace");
}

#[tokio::test]
async fn test_update_ignores_protected_fields() {
    let (_store, service) = service();
    let user = service.create_user(new_user("ada@example.com", None)).await.unwrap();
    let other = Uuid::new_v4();

    let patch = Patch::new().set("id", other).set("role", "admin");
    let updated = service.update_user(user.id, patch, true).await.unwrap();
    assert_eq!(updated.id, user.id);
    assert_eq!(updated.role, "admin");
    assert_eq!(updated.created_at, user.created_at);
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let (_store, service) = service();
    let ada = service.create_user(new_user("ada@example.com", None)).await.unwrap();
    let grace = service.create_user(new_user("grace@example.com", None)).await.unwrap();

    let patch = Patch::new().set("email", "ada@example.com");
    let err = service.update_user(grace.id, patch, false).await.unwrap_err();
    assert_eq!(
        err.detail(),
        format!(
            "User with email=ada@example.com and different ID {} found",
            ada.id
        )
    );

    // Keeping one's own email is not a conflict
    let patch = Patch::new().set("email", "grace@example.com");
    assert!(service.update_user(grace.id, patch, false).await.is_ok());
}

#[tokio::test]
async fn test_update_strict_mode_rejects_unknown_fields() {
    let (store, service) = service();
    let user = service.create_user(new_user("ada@example.com", None)).await.unwrap();

    let patch = Patch::new().set("password", "secret");
    let err = service.update_user(user.id, patch.clone(), true).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.detail(), "User does not have field 'password'");

    assert!(service.update_user(user.id, patch, false).await.is_ok());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_update_rejects_mistyped_json_values() {
    let (_store, service) = service();
    let user = service.create_user(new_user("ada@example.com", None)).await.unwrap();

    let patch = domain::IntoPatch::into_patch(json!({"bio": null, "name": 42})).unwrap();
    let err = service.update_user(user.id, patch, false).await.unwrap_err();
    assert_eq!(
        err.detail(),
        "Invalid type for field 'User.name': expected text, got int"
    );
}

#[tokio::test]
async fn test_find_list_and_purge_users() {
    let (store, service) = service();
    service.create_user(new_user("a@example.com", Some("guest"))).await.unwrap();
    service.create_user(new_user("b@example.com", Some("guest"))).await.unwrap();
    service.create_user(new_user("c@example.com", Some("admin"))).await.unwrap();

    let guests = service
        .find_users(Filters::new().eq("role", "guest"))
        .await
        .unwrap();
    assert_eq!(guests.len(), 2);

    let nobody = service
        .find_users(Filters::new().eq("role", "owner"))
        .await
        .unwrap();
    assert!(nobody.is_empty());

    let page = service.list_users(Window::new(0, 2)).await.unwrap();
    assert_eq!(page.len(), 2);

    let purged = service
        .purge_users(Filters::new().eq("role", "guest"))
        .await
        .unwrap();
    assert_eq!(purged, 2);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_delete_user() {
    let (store, service) = service();
    let user = service.create_user(new_user("ada@example.com", None)).await.unwrap();

    assert!(service.delete_user(user.id).await.unwrap());
    assert!(store.is_empty());

    let err = service.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
