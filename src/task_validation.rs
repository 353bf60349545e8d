use crate::task::{Task, TaskId};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("duplicate task id {0}")]
    DuplicateTaskId(TaskId),
    #[error("task #{index} has a blank task id")]
    BlankTaskId { index: usize },
}

pub fn validate_task(index: usize, task: &Task) -> Result<(), TaskValidationError> {
    if task.id.is_blank() {
        return Err(TaskValidationError::BlankTaskId { index });
    }
    Ok(())
}

/// Ids must be present and unique before a dependency graph can be built.
pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        validate_task(index, task)?;
        if !seen_ids.insert(&task.id) {
            return Err(TaskValidationError::DuplicateTaskId(task.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates_across_id_representations() {
        let tasks = vec![Task::new(1, "a", 1), Task::new("1", "b", 1)];
        assert_eq!(
            validate_task_collection(&tasks),
            Err(TaskValidationError::DuplicateTaskId(TaskId::from("1")))
        );
    }

    #[test]
    fn rejects_blank_ids() {
        let tasks = vec![Task::new(1, "a", 1), Task::new("  ", "b", 1)];
        assert_eq!(
            validate_task_collection(&tasks),
            Err(TaskValidationError::BlankTaskId { index: 1 })
        );
    }

    #[test]
    fn accepts_unique_ids() {
        let tasks = vec![Task::new(1, "a", 1), Task::new(2, "b", 1)];
        assert!(validate_task_collection(&tasks).is_ok());
    }
}
