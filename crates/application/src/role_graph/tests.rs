use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rolegate_core::AppResult;
use rolegate_domain::{InclusionDepth, UserId};

use super::{PermissionDefinition, RoleDefinition, RoleGraphResolver, RoleRepository};

#[derive(Default)]
struct FakeRoleRepository {
    roles: HashMap<String, RoleDefinition>,
    lookups: AtomicUsize,
}

impl FakeRoleRepository {
    fn with_roles(roles: Vec<RoleDefinition>) -> Self {
        Self {
            roles: roles
                .into_iter()
                .map(|role| (role.name.clone(), role))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    fn role(&self, name: &str) -> RoleDefinition {
        self.roles
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unknown test role {name}"))
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_roles_by_names(&self, names: &[String]) -> AppResult<Vec<RoleDefinition>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(names
            .iter()
            .filter_map(|name| self.roles.get(name).cloned())
            .collect())
    }

    async fn list_roles_for_user(&self, _user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        Ok(Vec::new())
    }
}

fn permission(name: &str) -> PermissionDefinition {
    PermissionDefinition {
        permission_id: format!("perm-{name}"),
        name: name.to_owned(),
        description: String::new(),
        is_system: true,
    }
}

fn role(name: &str, permissions: &[&str], includes: &[&str]) -> RoleDefinition {
    RoleDefinition {
        role_id: format!("role-{name}"),
        name: name.to_owned(),
        description: String::new(),
        is_system: false,
        permissions: permissions.iter().map(|value| permission(value)).collect(),
        included_role_names: includes.iter().map(|value| (*value).to_owned()).collect(),
    }
}

fn chain_repository() -> Arc<FakeRoleRepository> {
    Arc::new(FakeRoleRepository::with_roles(vec![
        role("a", &["a.read.all"], &["b"]),
        role("b", &["b.read.all"], &["c"]),
        role("c", &["c.read.all"], &[]),
    ]))
}

fn names(resolved: &super::EffectiveRoles) -> Vec<&str> {
    resolved.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn role_without_inclusions_resolves_to_itself() {
    let repository = Arc::new(FakeRoleRepository::with_roles(vec![role(
        "default",
        &["profile.read.own"],
        &[],
    )]));
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::SingleLevel);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("default")])
        .await;

    let resolved = resolved.unwrap_or_else(|_| panic!("resolution should succeed"));
    assert_eq!(names(&resolved), vec!["default"]);
    assert_eq!(repository.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_level_policy_stops_after_direct_inclusions() {
    let repository = chain_repository();
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::SingleLevel);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("a")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    assert_eq!(names(&resolved), vec!["a", "b"]);
}

#[tokio::test]
async fn transitive_policy_follows_the_whole_chain() {
    let repository = chain_repository();
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::Transitive);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("a")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    assert_eq!(names(&resolved), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn transitive_policy_terminates_on_cycles() {
    let repository = Arc::new(FakeRoleRepository::with_roles(vec![
        role("a", &["a.read.all"], &["b"]),
        role("b", &["b.read.all"], &["a"]),
    ]));
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::Transitive);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("a")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    assert_eq!(names(&resolved), vec!["a", "b"]);
    assert_eq!(repository.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transitive_policy_looks_up_shared_bases_once() {
    let repository = Arc::new(FakeRoleRepository::with_roles(vec![
        role("admin", &[], &["user.admin", "role.admin"]),
        role("user.admin", &["user.manage.all"], &["default"]),
        role("role.admin", &["role.manage.all"], &["default"]),
        role("default", &["profile.read.own"], &[]),
    ]));
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::Transitive);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("admin")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    assert_eq!(
        names(&resolved),
        vec!["admin", "default", "role.admin", "user.admin"]
    );
    assert_eq!(repository.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn broken_references_are_skipped() {
    let repository = Arc::new(FakeRoleRepository::with_roles(vec![role(
        "support",
        &["ticket.read.all"],
        &["missing.role"],
    )]));
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::Transitive);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("support")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    assert_eq!(names(&resolved), vec!["support"]);
}

#[tokio::test]
async fn included_role_already_assigned_directly_is_kept_once() {
    let repository = chain_repository();
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::SingleLevel);

    let resolved = resolver
        .resolve_effective_roles(&[repository.role("a"), repository.role("b")])
        .await
        .unwrap_or_else(|_| panic!("resolution should succeed"));

    // `b` is direct, so its own inclusion `c` is a first-level expansion.
    assert_eq!(names(&resolved), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn effective_permission_names_is_idempotent() {
    let repository = chain_repository();
    let resolver = RoleGraphResolver::new(repository.clone(), InclusionDepth::SingleLevel);
    let direct = vec![repository.role("a")];

    let first = resolver.effective_permission_names(&direct).await;
    let second = resolver.effective_permission_names(&direct).await;

    let first = first.unwrap_or_else(|_| panic!("first resolution should succeed"));
    let second = second.unwrap_or_else(|_| panic!("second resolution should succeed"));
    assert_eq!(first, second);
    assert_eq!(
        first,
        BTreeSet::from(["a.read.all".to_owned(), "b.read.all".to_owned()])
    );
}
