use rolegate_application::{
    BASELINE_ROLES, RoleRepository, SavePermissionInput, SaveRoleInput, SecurityAdminRepository,
};
use rolegate_core::AppError;
use rolegate_domain::{PermissionName, RoleName, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresSecurityAdminRepository;
use crate::PostgresRoleRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres security admin tests: {error}");
    }

    Some(pool)
}

fn suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn permission(name: &str) -> PermissionName {
    PermissionName::new(name).unwrap_or_else(|_| panic!("valid permission name {name}"))
}

fn role(name: &str) -> RoleName {
    RoleName::new(name).unwrap_or_else(|_| panic!("valid role name {name}"))
}

async fn save_permission(repository: &PostgresSecurityAdminRepository, name: &str) {
    let saved = repository
        .save_permission(SavePermissionInput {
            name: permission(name),
            description: String::new(),
            is_system: false,
        })
        .await;
    assert!(saved.is_ok());
}

#[tokio::test]
async fn save_role_replaces_grants_and_keeps_inclusion_order() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool);
    let id = suffix();
    let (read, write) = (format!("doc{id}.read"), format!("doc{id}.write"));
    save_permission(&repository, &read).await;
    save_permission(&repository, &write).await;
    let name = format!("editor{id}");

    let first = repository
        .save_role(SaveRoleInput {
            name: role(&name),
            description: "Edits documents".to_owned(),
            permission_names: vec![permission(&read), permission(&write)],
            included_role_names: vec![role("zeta"), role("alpha")],
            is_system: false,
        })
        .await
        .unwrap_or_else(|error| panic!("save should succeed: {error}"));
    assert_eq!(first.permissions.len(), 2);
    assert_eq!(
        first.included_role_names,
        vec!["zeta".to_owned(), "alpha".to_owned()]
    );

    let second = repository
        .save_role(SaveRoleInput {
            name: role(&name),
            description: "Reads documents".to_owned(),
            permission_names: vec![permission(&read)],
            included_role_names: Vec::new(),
            is_system: false,
        })
        .await
        .unwrap_or_else(|error| panic!("update should succeed: {error}"));

    assert_eq!(second.role_id, first.role_id);
    assert_eq!(second.description, "Reads documents");
    assert_eq!(
        second
            .permissions
            .iter()
            .map(|permission| permission.name.clone())
            .collect::<Vec<_>>(),
        vec![read]
    );
    assert!(second.included_role_names.is_empty());
}

#[tokio::test]
async fn save_role_rejects_unknown_permissions() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool);
    let id = suffix();

    let result = repository
        .save_role(SaveRoleInput {
            name: role(&format!("ghost{id}")),
            description: String::new(),
            permission_names: vec![permission(&format!("missing{id}.read"))],
            included_role_names: Vec::new(),
            is_system: false,
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn assignments_are_visible_to_role_lookup() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool.clone());
    let roles = PostgresRoleRepository::new(pool.clone());
    let id = suffix();
    let name = format!("viewer{id}");
    let saved = repository
        .save_role(SaveRoleInput {
            name: role(&name),
            description: String::new(),
            permission_names: Vec::new(),
            included_role_names: Vec::new(),
            is_system: false,
        })
        .await;
    assert!(saved.is_ok());

    let user_id = UserId::new();
    let insert = sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(user_id.as_uuid())
        .bind(format!("{id}@assign.test"))
        .execute(&pool)
        .await;
    assert!(insert.is_ok());

    assert!(repository.assign_role_to_user(user_id, &name).await.is_ok());
    assert!(repository.assign_role_to_user(user_id, &name).await.is_ok());
    let assigned = roles.list_roles_for_user(user_id).await.unwrap_or_default();
    assert_eq!(
        assigned.iter().map(|role| role.name.clone()).collect::<Vec<_>>(),
        vec![name.clone()]
    );

    assert!(matches!(
        repository
            .assign_role_to_user(user_id, &format!("missing{id}"))
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        repository.assign_role_to_user(UserId::new(), &name).await,
        Err(AppError::NotFound(_))
    ));

    assert_eq!(
        repository.remove_role_from_user(user_id, &name).await.ok(),
        Some(true)
    );
    assert_eq!(
        repository.remove_role_from_user(user_id, &name).await.ok(),
        Some(false)
    );
}

#[tokio::test]
async fn prune_removes_only_system_entries_outside_the_keep_list() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresSecurityAdminRepository::new(pool);
    let id = suffix();
    let retired = format!("retired{id}");
    let custom = format!("custom{id}");
    for (name, is_system) in [(&retired, true), (&custom, false)] {
        let saved = repository
            .save_role(SaveRoleInput {
                name: role(name),
                description: String::new(),
                permission_names: Vec::new(),
                included_role_names: Vec::new(),
                is_system,
            })
            .await;
        assert!(saved.is_ok());
    }

    let mut existing_system: Vec<String> = repository
        .list_roles()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|role| role.is_system && role.name != retired)
        .map(|role| role.name)
        .collect();
    existing_system.extend(BASELINE_ROLES.iter().map(|role| role.name.to_owned()));
    let existing_permissions: Vec<String> = repository
        .list_permissions()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|permission| permission.name)
        .collect();

    let summary = repository
        .prune_system_entries(&existing_system, &existing_permissions)
        .await
        .unwrap_or_else(|error| panic!("prune should succeed: {error}"));

    assert_eq!(summary.removed_roles, 1);
    assert_eq!(summary.removed_permissions, 0);
    let names: Vec<String> = repository
        .list_roles()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|role| role.name)
        .collect();
    assert!(!names.contains(&retired));
    assert!(names.contains(&custom));
    assert_eq!(repository.delete_role(&custom).await.ok(), Some(true));
    assert_eq!(repository.delete_role(&custom).await.ok(), Some(false));
}
