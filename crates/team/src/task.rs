use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storeops_core::error::require_non_empty;
use storeops_core::{DomainResult, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// A unit of store work assigned to a team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub category: String,
}

impl Task {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date < today
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("title", &self.title)?;
        require_non_empty("assignee", &self.assignee)
    }

    fn listing_order(a: &Self, b: &Self) -> core::cmp::Ordering {
        a.due_date.cmp(&b.due_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus) -> Task {
        Task {
            title: "Restock iPhone wall".to_string(),
            description: String::new(),
            assignee: "Rui".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            priority: TaskPriority::High,
            status,
            category: "Inventory".to_string(),
        }
    }

    #[test]
    fn overdue_only_while_open() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(task(TaskStatus::ToDo).is_overdue(today));
        assert!(!task(TaskStatus::Completed).is_overdue(today));
    }

    #[test]
    fn status_labels_match_board_columns() {
        let json = serde_json::to_value(task(TaskStatus::InProgress)).unwrap();
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["dueDate"], "2026-10-18");
    }
}
