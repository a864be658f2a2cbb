use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, IdentityRole, UserIdentity};
use rolegate_domain::{AuditAction, InclusionDepth, UserId};

use crate::security_admin_ports::{
    PruneSummary, SavePermissionInput, SaveRoleInput, SaveRoleRequest, SecurityAdminRepository,
};
use crate::{
    AuditEvent, AuditRepository, AuthorizationService, PermissionDefinition, RoleDefinition,
    RoleGraphResolver, RoleRepository,
};

use super::SecurityAdminService;

#[derive(Default)]
struct FakeSecurityStore {
    roles: Mutex<HashMap<String, RoleDefinition>>,
    permissions: Mutex<HashMap<String, PermissionDefinition>>,
    assignments: Mutex<HashSet<(UserId, String)>>,
}

impl FakeSecurityStore {
    async fn seed_role(&self, name: &str, is_system: bool) {
        self.roles.lock().await.insert(
            name.to_owned(),
            RoleDefinition {
                role_id: format!("role-{name}"),
                name: name.to_owned(),
                description: String::new(),
                is_system,
                permissions: Vec::new(),
                included_role_names: Vec::new(),
            },
        );
    }

    async fn seed_permission(&self, name: &str) {
        self.permissions.lock().await.insert(
            name.to_owned(),
            PermissionDefinition {
                permission_id: format!("perm-{name}"),
                name: name.to_owned(),
                description: String::new(),
                is_system: true,
            },
        );
    }
}

#[async_trait]
impl RoleRepository for FakeSecurityStore {
    async fn find_roles_by_names(&self, names: &[String]) -> AppResult<Vec<RoleDefinition>> {
        let roles = self.roles.lock().await;
        Ok(names
            .iter()
            .filter_map(|name| roles.get(name).cloned())
            .collect())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        let assignments = self.assignments.lock().await;
        let roles = self.roles.lock().await;
        let mut assigned: Vec<RoleDefinition> = assignments
            .iter()
            .filter(|(assigned_user, _)| *assigned_user == user_id)
            .filter_map(|(_, role_name)| roles.get(role_name).cloned())
            .collect();
        assigned.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(assigned)
    }
}

#[async_trait]
impl SecurityAdminRepository for FakeSecurityStore {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let mut roles: Vec<RoleDefinition> = self.roles.lock().await.values().cloned().collect();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn save_role(&self, input: SaveRoleInput) -> AppResult<RoleDefinition> {
        let permissions = self.permissions.lock().await;
        let granted = input
            .permission_names
            .iter()
            .map(|name| {
                permissions.get(name.as_str()).cloned().ok_or_else(|| {
                    AppError::Validation(format!("unknown permission '{name}'"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let role = RoleDefinition {
            role_id: format!("role-{}", input.name),
            name: input.name.to_string(),
            description: input.description,
            is_system: input.is_system,
            permissions: granted,
            included_role_names: input
                .included_role_names
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        self.roles
            .lock()
            .await
            .insert(role.name.clone(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_name: &str) -> AppResult<bool> {
        Ok(self.roles.lock().await.remove(role_name).is_some())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self.permissions.lock().await.values().cloned().collect())
    }

    async fn save_permission(&self, input: SavePermissionInput) -> AppResult<PermissionDefinition> {
        let permission = PermissionDefinition {
            permission_id: format!("perm-{}", input.name),
            name: input.name.to_string(),
            description: input.description,
            is_system: input.is_system,
        };
        self.permissions
            .lock()
            .await
            .insert(permission.name.clone(), permission.clone());
        Ok(permission)
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        if !self.roles.lock().await.contains_key(role_name) {
            return Err(AppError::NotFound(format!("role '{role_name}' not found")));
        }
        self.assignments
            .lock()
            .await
            .insert((user_id, role_name.to_owned()));
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        Ok(self
            .assignments
            .lock()
            .await
            .remove(&(user_id, role_name.to_owned())))
    }

    async fn prune_system_entries(
        &self,
        keep_role_names: &[String],
        keep_permission_names: &[String],
    ) -> AppResult<PruneSummary> {
        let mut roles = self.roles.lock().await;
        let before_roles = roles.len();
        roles.retain(|name, role| !role.is_system || keep_role_names.contains(name));

        let mut permissions = self.permissions.lock().await;
        let before_permissions = permissions.len();
        permissions.retain(|name, permission| {
            !permission.is_system || keep_permission_names.contains(name)
        });

        Ok(PruneSummary {
            removed_roles: (before_roles - roles.len()) as u64,
            removed_permissions: (before_permissions - permissions.len()) as u64,
        })
    }
}

#[derive(Default)]
struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

fn build_service() -> (
    SecurityAdminService,
    Arc<FakeSecurityStore>,
    Arc<FakeAuditRepository>,
) {
    let store = Arc::new(FakeSecurityStore::default());
    let audit = Arc::new(FakeAuditRepository::default());
    let authorization = AuthorizationService::new(
        RoleGraphResolver::new(store.clone(), InclusionDepth::SingleLevel),
        store.clone(),
    );
    let service = SecurityAdminService::new(authorization, store.clone(), store.clone(), audit.clone());
    (service, store, audit)
}

fn identity(roles: &[&str], permissions: &[&str]) -> UserIdentity {
    UserIdentity::new(
        UserId::new().to_string(),
        "admin@example.com",
        roles
            .iter()
            .map(|name| IdentityRole {
                id: format!("role-{name}"),
                name: (*name).to_owned(),
            })
            .collect(),
        permissions
            .iter()
            .map(|name| (*name).to_owned())
            .collect::<BTreeSet<_>>(),
    )
}

fn role_admin() -> UserIdentity {
    identity(&["default", "role.admin"], &["profile.read.own"])
}

fn save_request(name: &str, permissions: &[&str], includes: &[&str]) -> SaveRoleRequest {
    SaveRoleRequest {
        name: name.to_owned(),
        description: "Support staff".to_owned(),
        permission_names: permissions.iter().map(|value| (*value).to_owned()).collect(),
        included_role_names: includes.iter().map(|value| (*value).to_owned()).collect(),
    }
}

#[tokio::test]
async fn caller_without_role_admin_or_manage_permission_is_forbidden() {
    let (service, _, _) = build_service();
    let actor = identity(&["default"], &["profile.read.own"]);

    let result = service.list_roles(&actor).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn manage_permission_alone_grants_access() {
    let (service, _, _) = build_service();
    let actor = identity(&["custom.operator"], &["role.manage.all"]);

    assert!(service.list_roles(&actor).await.is_ok());
    assert!(service.list_permissions(&actor).await.is_ok());
}

#[tokio::test]
async fn save_role_persists_custom_role_and_audits() {
    let (service, store, audit) = build_service();
    store.seed_role("default", true).await;
    store.seed_permission("ticket.read.all").await;

    let role = service
        .save_role(
            &role_admin(),
            save_request("support", &["ticket.read.all"], &["default"]),
        )
        .await
        .unwrap_or_else(|_| panic!("role should save"));

    assert_eq!(role.name, "support");
    assert!(!role.is_system);
    assert_eq!(role.included_role_names, vec!["default".to_owned()]);
    assert_eq!(role.permissions.len(), 1);

    let events = audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::SecurityRoleSaved);
    assert_eq!(events[0].resource_id, "support");
}

#[tokio::test]
async fn save_role_rejects_baseline_self_inclusion_and_missing_includes() {
    let (service, store, audit) = build_service();
    store.seed_role("default", true).await;
    let actor = role_admin();

    let baseline = service
        .save_role(&actor, save_request("admin", &[], &[]))
        .await;
    let self_include = service
        .save_role(&actor, save_request("support", &[], &["support"]))
        .await;
    let missing = service
        .save_role(&actor, save_request("support", &[], &["ghost.role"]))
        .await;
    let bad_permission = service
        .save_role(&actor, save_request("support", &["NotDotted"], &[]))
        .await;

    assert!(matches!(baseline, Err(AppError::Validation(_))));
    assert!(matches!(self_include, Err(AppError::Validation(_))));
    assert!(matches!(missing, Err(AppError::Validation(_))));
    assert!(matches!(bad_permission, Err(AppError::Validation(_))));
    assert!(audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn delete_role_rejects_baseline_and_unknown_roles() {
    let (service, store, audit) = build_service();
    store.seed_role("support", false).await;
    let actor = role_admin();

    let baseline = service.delete_role(&actor, "default").await;
    let unknown = service.delete_role(&actor, "ghost.role").await;
    let deleted = service.delete_role(&actor, "support").await;

    assert!(matches!(baseline, Err(AppError::Validation(_))));
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
    assert!(deleted.is_ok());
    assert!(!store.roles.lock().await.contains_key("support"));
    assert_eq!(
        audit.events.lock().await[0].action,
        AuditAction::SecurityRoleDeleted
    );
}

#[tokio::test]
async fn assign_and_unassign_roles_are_audited() {
    let (service, store, audit) = build_service();
    store.seed_role("default", true).await;
    store.seed_role("user.admin", true).await;
    let actor = role_admin();
    let user_id = UserId::new();

    assert!(service.assign_role(&actor, user_id, "default").await.is_ok());
    assert!(service.assign_role(&actor, user_id, "user.admin").await.is_ok());

    let roles = service
        .list_user_roles(&actor, user_id)
        .await
        .unwrap_or_else(|_| panic!("roles should list"));
    let names: Vec<&str> = roles.iter().map(|role| role.name.as_str()).collect();
    assert_eq!(names, vec!["default", "user.admin"]);

    assert!(service.unassign_role(&actor, user_id, "user.admin").await.is_ok());

    let actions: Vec<AuditAction> = audit
        .events
        .lock()
        .await
        .iter()
        .map(|event| event.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::SecurityRoleAssigned,
            AuditAction::SecurityRoleAssigned,
            AuditAction::SecurityRoleUnassigned,
        ]
    );
}

#[tokio::test]
async fn default_role_cannot_be_unassigned() {
    let (service, store, _) = build_service();
    store.seed_role("default", true).await;
    let actor = role_admin();
    let user_id = UserId::new();
    assert!(service.assign_role(&actor, user_id, "default").await.is_ok());

    let result = service.unassign_role(&actor, user_id, "default").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn unassigning_a_role_the_user_lacks_is_not_found() {
    let (service, store, _) = build_service();
    store.seed_role("support", false).await;

    let result = service
        .unassign_role(&role_admin(), UserId::new(), "support")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
