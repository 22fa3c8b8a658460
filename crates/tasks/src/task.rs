use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgward_core::{DomainError, DomainResult, Entity, OrganizationId, TaskId, UserId};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Task progress marker.
///
/// Statuses carry no transition rules; any authorized actor may set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl core::str::FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            other => Err(DomainError::validation(format!("unknown task status '{other}'"))),
        }
    }
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work inside an organization, assigned to one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: UserId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        organization_id: OrganizationId,
        title: &str,
        description: &str,
        assigned_to: UserId,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: TaskId::new(),
            organization_id,
            title: normalize_title(title)?,
            description: validate_description(description)?,
            status: TaskStatus::Todo,
            assigned_to,
            created_by,
            created_at,
        })
    }

    pub fn set_title(&mut self, title: &str) -> DomainResult<()> {
        self.title = normalize_title(title)?;
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> DomainResult<()> {
        self.description = validate_description(description)?;
        Ok(())
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

fn normalize_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("task title cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "task title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: &str) -> DomainResult<String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "task description exceeds {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let user = UserId::new();
        Task::new(OrganizationId::new(), " Ship it ", "", user, user, Utc::now()).unwrap()
    }

    #[test]
    fn new_task_starts_in_todo() {
        let task = sample_task();
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn title_bounds() {
        let mut task = sample_task();
        assert!(task.set_title("  ").is_err());
        assert!(task.set_title(&"t".repeat(MAX_TITLE_LEN + 1)).is_err());
        assert!(task.set_title(&"t".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn description_may_be_empty_but_bounded() {
        let mut task = sample_task();
        assert!(task.set_description("").is_ok());
        assert!(task.set_description(&"d".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn any_status_may_follow_any_other() {
        let mut task = sample_task();
        task.set_status(TaskStatus::Completed);
        task.set_status(TaskStatus::Todo);
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("DONE".parse::<TaskStatus>().is_err());
    }
}
