use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_auth::{Role, can_change_task_elements};
use orgward_core::{DomainError, OrganizationId, TaskId, UserId};
use orgward_tasks::{Task, TaskStatus};

use super::{require_actor, require_member};
use crate::audited::{AuditScope, UseCase};
use crate::error::ServiceError;
use crate::repository::Store;

impl AuditScope for Task {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        Some(self.organization_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub description: String,
    pub assigned_to: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Edit applied to an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Title(String),
    Description(String),
    Status(TaskStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTask {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub task_id: TaskId,
    pub change: TaskChange,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTask {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

impl_org_scoped_subject!(CreateTask, UpdateTask, DeleteTask);

/// Load a task and check that the actor may change it.
///
/// An assignee without a membership (e.g. fired since assignment) counts as
/// `Role::Member`.
async fn authorize_task_change<S: Store>(
    store: &mut S,
    organization_id: OrganizationId,
    actor_id: UserId,
    task_id: TaskId,
) -> Result<Task, ServiceError> {
    let actor = require_actor(store, organization_id, actor_id).await?;
    let task = store
        .find_task(task_id, organization_id)
        .await?
        .ok_or(DomainError::TaskNotFound)?;

    let assignee_role = store
        .find_member(organization_id, task.assigned_to)
        .await?
        .map_or(Role::Member, |m| m.role);

    can_change_task_elements(actor.role, actor.user_id, task.created_by, assignee_role)?;
    Ok(task)
}

/// Any member may create a task for any member of the same organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTaskUseCase;

#[async_trait]
impl UseCase for CreateTaskUseCase {
    type Input = CreateTask;
    type Output = Task;

    async fn execute<S: Store>(&self, store: &mut S, input: CreateTask) -> Result<Task, ServiceError> {
        require_actor(store, input.organization_id, input.actor_id).await?;
        require_member(store, input.organization_id, input.assigned_to).await?;

        let task = Task::new(
            input.organization_id,
            &input.title,
            &input.description,
            input.assigned_to,
            input.actor_id,
            input.occurred_at,
        )?;
        store.save_task(&task).await?;
        Ok(task)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateTaskUseCase;

#[async_trait]
impl UseCase for UpdateTaskUseCase {
    type Input = UpdateTask;
    type Output = Task;

    async fn execute<S: Store>(&self, store: &mut S, input: UpdateTask) -> Result<Task, ServiceError> {
        let mut task =
            authorize_task_change(store, input.organization_id, input.actor_id, input.task_id)
                .await?;

        match &input.change {
            TaskChange::Title(title) => task.set_title(title)?,
            TaskChange::Description(description) => task.set_description(description)?,
            TaskChange::Status(status) => task.set_status(*status),
        }

        store.save_task(&task).await?;
        Ok(task)
    }
}

/// Delete a task. Returns the deleted task.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteTaskUseCase;

#[async_trait]
impl UseCase for DeleteTaskUseCase {
    type Input = DeleteTask;
    type Output = Task;

    async fn execute<S: Store>(&self, store: &mut S, input: DeleteTask) -> Result<Task, ServiceError> {
        let task =
            authorize_task_change(store, input.organization_id, input.actor_id, input.task_id)
                .await?;
        store.delete_task(task.id).await?;
        Ok(task)
    }
}
