use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use warden_core::{AppError, AppResult};
use warden_domain::{GroupId, RoleId};

use super::{CascadeMutationService, CascadeMutationStore, MutationStep, MutationTransaction};

#[derive(Default)]
struct Journal {
    roles: HashSet<RoleId>,
    groups: HashSet<GroupId>,
    steps: Vec<MutationStep>,
    committed: bool,
    rolled_back: bool,
}

struct FakeCascadeStore {
    journal: Arc<Mutex<Journal>>,
    fail_at: Option<MutationStep>,
}

impl FakeCascadeStore {
    fn new(fail_at: Option<MutationStep>) -> Self {
        Self {
            journal: Arc::new(Mutex::new(Journal::default())),
            fail_at,
        }
    }

    async fn seed_role(&self, role_id: RoleId) {
        self.journal.lock().await.roles.insert(role_id);
    }

    async fn seed_group(&self, group_id: GroupId) {
        self.journal.lock().await.groups.insert(group_id);
    }
}

#[async_trait]
impl CascadeMutationStore for FakeCascadeStore {
    async fn begin_mutation(&self) -> AppResult<Box<dyn MutationTransaction>> {
        if self.fail_at == Some(MutationStep::Begin) {
            return Err(AppError::Internal("pool exhausted".to_owned()));
        }

        Ok(Box::new(FakeTransaction {
            journal: self.journal.clone(),
            fail_at: self.fail_at,
        }))
    }
}

struct FakeTransaction {
    journal: Arc<Mutex<Journal>>,
    fail_at: Option<MutationStep>,
}

impl FakeTransaction {
    async fn step(&self, step: MutationStep, rows: u64) -> AppResult<u64> {
        if self.fail_at == Some(step) {
            return Err(AppError::Internal(format!("injected failure at {step}")));
        }

        self.journal.lock().await.steps.push(step);
        Ok(rows)
    }
}

#[async_trait]
impl MutationTransaction for FakeTransaction {
    async fn role_exists(&mut self, role_id: RoleId) -> AppResult<bool> {
        if self.fail_at == Some(MutationStep::LockRole) {
            return Err(AppError::Internal("lock timeout".to_owned()));
        }
        Ok(self.journal.lock().await.roles.contains(&role_id))
    }

    async fn clear_role_permissions(&mut self, _role_id: RoleId) -> AppResult<u64> {
        self.step(MutationStep::ClearRolePermissions, 2).await
    }

    async fn clear_role_group_links(&mut self, _role_id: RoleId) -> AppResult<u64> {
        self.step(MutationStep::ClearRoleGroupLinks, 1).await
    }

    async fn delete_role(&mut self, _role_id: RoleId) -> AppResult<u64> {
        self.step(MutationStep::DeleteRole, 1).await
    }

    async fn group_exists(&mut self, group_id: GroupId) -> AppResult<bool> {
        if self.fail_at == Some(MutationStep::LockGroup) {
            return Err(AppError::Internal("lock timeout".to_owned()));
        }
        Ok(self.journal.lock().await.groups.contains(&group_id))
    }

    async fn clear_group_roles(&mut self, _group_id: GroupId) -> AppResult<u64> {
        self.step(MutationStep::ClearGroupRoles, 1).await
    }

    async fn clear_group_memberships(&mut self, _group_id: GroupId) -> AppResult<u64> {
        self.step(MutationStep::ClearGroupMemberships, 3).await
    }

    async fn delete_group(&mut self, _group_id: GroupId) -> AppResult<u64> {
        self.step(MutationStep::DeleteGroup, 1).await
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.step(MutationStep::Commit, 0).await?;
        self.journal.lock().await.committed = true;
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.journal.lock().await.rolled_back = true;
        Ok(())
    }
}

#[tokio::test]
async fn delete_role_runs_every_step_and_commits() {
    let store = Arc::new(FakeCascadeStore::new(None));
    let role_id = RoleId::new();
    store.seed_role(role_id).await;
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_role(role_id).await;

    assert!(result.is_ok());
    let journal = store.journal.lock().await;
    assert_eq!(
        journal.steps,
        vec![
            MutationStep::ClearRolePermissions,
            MutationStep::ClearRoleGroupLinks,
            MutationStep::DeleteRole,
            MutationStep::Commit,
        ]
    );
    assert!(journal.committed);
    assert!(!journal.rolled_back);
}

#[tokio::test]
async fn delete_role_reports_missing_role_and_rolls_back() {
    let store = Arc::new(FakeCascadeStore::new(None));
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_role(RoleId::new()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    let journal = store.journal.lock().await;
    assert!(journal.steps.is_empty());
    assert!(journal.rolled_back);
}

#[tokio::test]
async fn delete_role_rolls_back_when_a_statement_fails_midway() {
    let store = Arc::new(FakeCascadeStore::new(Some(MutationStep::ClearRoleGroupLinks)));
    let role_id = RoleId::new();
    store.seed_role(role_id).await;
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_role(role_id).await;

    match result {
        Err(AppError::Internal(message)) => {
            assert!(message.contains("clear_role_group_links"));
        }
        other => panic!("expected internal error, got {other:?}"),
    }
    let journal = store.journal.lock().await;
    assert_eq!(journal.steps, vec![MutationStep::ClearRolePermissions]);
    assert!(!journal.committed);
    assert!(journal.rolled_back);
}

#[tokio::test]
async fn delete_group_rolls_back_when_commit_fails() {
    let store = Arc::new(FakeCascadeStore::new(Some(MutationStep::Commit)));
    let group_id = GroupId::new();
    store.seed_group(group_id).await;
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_group(group_id).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    let journal = store.journal.lock().await;
    assert!(!journal.committed);
    assert!(journal.rolled_back);
}

#[tokio::test]
async fn delete_group_surfaces_begin_failures_as_internal() {
    let store = Arc::new(FakeCascadeStore::new(Some(MutationStep::Begin)));
    let service = CascadeMutationService::new(store);

    let result = service.delete_group(GroupId::new()).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn delete_group_clears_links_before_the_row() {
    let store = Arc::new(FakeCascadeStore::new(None));
    let group_id = GroupId::new();
    store.seed_group(group_id).await;
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_group(group_id).await;

    assert!(result.is_ok());
    let journal = store.journal.lock().await;
    assert_eq!(
        journal.steps,
        vec![
            MutationStep::ClearGroupRoles,
            MutationStep::ClearGroupMemberships,
            MutationStep::DeleteGroup,
            MutationStep::Commit,
        ]
    );
}

#[tokio::test]
async fn delete_role_names_lock_step_when_existence_check_fails() {
    let store = Arc::new(FakeCascadeStore::new(Some(MutationStep::LockRole)));
    let role_id = RoleId::new();
    store.seed_role(role_id).await;
    let service = CascadeMutationService::new(store.clone());

    let result = service.delete_role(role_id).await;

    match result {
        Err(AppError::Internal(message)) => {
            assert!(message.contains("at step 'lock_role'"));
        }
        other => panic!("expected internal error, got {other:?}"),
    }
    let journal = store.journal.lock().await;
    assert!(journal.steps.is_empty());
    assert!(journal.rolled_back);
}
