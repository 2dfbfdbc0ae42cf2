//! User command - user management through [`UserService`].

use common::{AppError, AppResult};
use domain::{Entity, Filters, IntoPatch, Window};
use serde_json::Value;

use crate::cli::args::{UserAction, UserArgs, UserFilterArgs};
use crate::entities::User;
use crate::service::{NewUser, UserService};

impl UserFilterArgs {
    pub fn to_filters(&self) -> Filters {
        [
            ("email", &self.email),
            ("name", &self.name),
            ("role", &self.role),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }
}

/// Execute the user command
pub async fn execute(args: UserArgs, service: &dyn UserService) -> AppResult<()> {
    match args.action {
        UserAction::Create {
            email,
            name,
            role,
            bio,
        } => {
            let user = service
                .create_user(NewUser {
                    email,
                    name,
                    role,
                    bio,
                })
                .await?;
            print_user(&user)
        }
        UserAction::Get { id } => print_user(&service.get_user(id).await?),
        UserAction::List { offset, limit } => {
            print_users(&service.list_users(Window::new(offset, limit)).await?)
        }
        UserAction::Find(filters) => print_users(&service.find_users(filters.to_filters()).await?),
        UserAction::Update { id, data, strict } => {
            let payload: Value = serde_json::from_str(&data)
                .map_err(|e| AppError::invalid_argument(format!("--data is not JSON: {}", e)))?;
            let user = service.update_user(id, payload.into_patch()?, strict).await?;
            print_user(&user)
        }
        UserAction::Delete { id } => {
            service.delete_user(id).await?;
            println!("Deleted user {}", id);
            Ok(())
        }
        UserAction::Purge(filters) => {
            let filters = filters.to_filters();
            if filters.is_empty() {
                return Err(AppError::invalid_argument(
                    "purge needs at least one of --email, --name, --role",
                ));
            }
            let deleted = service.purge_users(filters).await?;
            println!("Deleted {} user(s)", deleted);
            Ok(())
        }
    }
}

fn render(user: &User) -> AppResult<String> {
    serde_json::to_string_pretty(&user.to_dict()).map_err(|e| AppError::internal(e.to_string()))
}

fn print_user(user: &User) -> AppResult<()> {
    println!("{}", render(user)?);
    Ok(())
}

fn print_users(users: &[User]) -> AppResult<()> {
    for user in users {
        print_user(user)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    use crate::service::MockUserService;

    fn sample_user(id: Uuid) -> User {
        User {
            id,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: "admin".to_string(),
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn run(action: UserAction) -> UserArgs {
        UserArgs { action }
    }

    #[tokio::test]
    async fn test_create_forwards_new_user() {
        let mut service = MockUserService::new();
        service
            .expect_create_user()
            .with(eq(NewUser {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                role: None,
                bio: None,
            }))
            .times(1)
            .returning(|_| Ok(sample_user(Uuid::new_v4())));

        let action = UserAction::Create {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: None,
            bio: None,
        };
        assert!(execute(run(action), &service).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_propagates_not_found() {
        let id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .with(eq(id))
            .returning(|id| Err(AppError::not_found(format!("User not found with ID {}", id))));

        let err = execute(run(UserAction::Get { id }), &service).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_uses_window() {
        let mut service = MockUserService::new();
        service
            .expect_list_users()
            .with(eq(Window::new(5, 10)))
            .returning(|_| Ok(Vec::new()));

        let action = UserAction::List {
            offset: 5,
            limit: 10,
        };
        assert!(execute(run(action), &service).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_builds_filters_from_given_flags() {
        let mut service = MockUserService::new();
        service
            .expect_find_users()
            .with(eq(Filters::new().eq("role", "admin")))
            .returning(|_| Ok(vec![sample_user(Uuid::new_v4())]));

        let action = UserAction::Find(UserFilterArgs {
            role: Some("admin".to_string()),
            ..Default::default()
        });
        assert!(execute(run(action), &service).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_decodes_json_payload() {
        let id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_update_user()
            .withf(move |user_id, patch, strict| {
                let name = patch.get("name").and_then(|v| v.as_str());
                *user_id == id && name == Some("Grace") && *strict
            })
            .returning(|id, _, _| Ok(sample_user(id)));

        let action = UserAction::Update {
            id,
            data: r#"{"name": "Grace"}"#.to_string(),
            strict: true,
        };
        assert!(execute(run(action), &service).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_payloads() {
        let service = MockUserService::new();
        let id = Uuid::new_v4();

        let action = UserAction::Update {
            id,
            data: "{not json".to_string(),
            strict: false,
        };
        let err = execute(run(action), &service).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let action = UserAction::Update {
            id,
            data: r#"["name"]"#.to_string(),
            strict: false,
        };
        let err = execute(run(action), &service).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_purge_requires_a_filter() {
        let service = MockUserService::new();
        let err = execute(run(UserAction::Purge(UserFilterArgs::default())), &service)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_purge_forwards_filters() {
        let mut service = MockUserService::new();
        service
            .expect_purge_users()
            .with(eq(Filters::new().eq("role", "guest")))
            .times(1)
            .returning(|_| Ok(3));

        let action = UserAction::Purge(UserFilterArgs {
            role: Some("guest".to_string()),
            ..Default::default()
        });
        assert!(execute(run(action), &service).await.is_ok());
    }
}
