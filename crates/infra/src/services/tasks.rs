use chrono::Utc;

use orgward_audit::AuditAction;
use orgward_core::{OrganizationId, TaskId, UserId};
use orgward_tasks::{Task, TaskStatus};

use super::execute_audited;
use crate::error::ServiceError;
use crate::uow::UnitOfWork;
use crate::use_cases::tasks::{
    CreateTask, CreateTaskUseCase, DeleteTask, DeleteTaskUseCase, TaskChange, UpdateTask,
    UpdateTaskUseCase,
};

#[derive(Debug, Clone)]
pub struct TaskService<U> {
    uow: U,
}

impl<U: UnitOfWork> TaskService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub async fn create_task(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        title: &str,
        description: &str,
        assigned_to: UserId,
    ) -> Result<Task, ServiceError> {
        let input = CreateTask {
            actor_id,
            organization_id,
            title: title.to_string(),
            description: description.to_string(),
            assigned_to,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, CreateTaskUseCase, AuditAction::TaskCreated, input).await
    }

    pub async fn change_task_title(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        task_id: TaskId,
        title: &str,
    ) -> Result<Task, ServiceError> {
        self.update(
            actor_id,
            organization_id,
            task_id,
            TaskChange::Title(title.to_string()),
            AuditAction::TaskTitleChanged,
        )
        .await
    }

    pub async fn change_task_description(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        task_id: TaskId,
        description: &str,
    ) -> Result<Task, ServiceError> {
        self.update(
            actor_id,
            organization_id,
            task_id,
            TaskChange::Description(description.to_string()),
            AuditAction::TaskDescriptionChanged,
        )
        .await
    }

    pub async fn change_task_status(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, ServiceError> {
        self.update(
            actor_id,
            organization_id,
            task_id,
            TaskChange::Status(status),
            AuditAction::TaskStatusChanged,
        )
        .await
    }

    /// Delete a task. Returns the deleted task.
    pub async fn delete_task(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        task_id: TaskId,
    ) -> Result<Task, ServiceError> {
        let input = DeleteTask {
            actor_id,
            organization_id,
            task_id,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, DeleteTaskUseCase, AuditAction::TaskDeleted, input).await
    }

    async fn update(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        task_id: TaskId,
        change: TaskChange,
        action: AuditAction,
    ) -> Result<Task, ServiceError> {
        let input = UpdateTask {
            actor_id,
            organization_id,
            task_id,
            change,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, UpdateTaskUseCase, action, input).await
    }
}
