use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use thiserror::Error;
use crate::models::{Assignment, AssignmentStatus, Task};

/// Why a user may not take a new task right now.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("You already have an assignment in progress. Submit it before taking a new task.")]
    OutstandingWork,

    #[error("Please wait before taking a new task. You can take one again at {until}.")]
    CoolingDown { until: DateTime<Utc> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("This assignment has already been submitted.")]
    AlreadySubmitted,
}

/// Decides whether a user may take a new task.
///
/// Two gates, checked in order:
/// 1. any pending assignment blocks outright (one piece of work at a time);
/// 2. any assignment created inside the cooldown window blocks until the
///    window has elapsed for the most recent one.
///
/// A completed assignment older than the window never blocks.
pub fn check_eligibility(
    assignments: &[Assignment],
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<(), EligibilityError> {
    if assignments
        .iter()
        .any(|a| a.status == AssignmentStatus::Pending)
    {
        return Err(EligibilityError::OutstandingWork);
    }

    let latest_block = assignments
        .iter()
        .filter(|a| now - a.created_at < cooldown)
        .map(|a| a.created_at + cooldown)
        .max();

    match latest_block {
        Some(until) => Err(EligibilityError::CoolingDown { until }),
        None => Ok(()),
    }
}

/// Deadline recorded on a fresh assignment. Recorded only; nothing sweeps
/// expired assignments.
pub fn submission_deadline(now: DateTime<Utc>, offset: Duration) -> DateTime<Utc> {
    now + offset
}

/// The single lifecycle transition: pending -> completed, attaching the
/// submitted file. Completed assignments reject further submissions, so the
/// balance credit that rides along with this transition applies exactly once.
pub fn complete(
    assignment: &mut Assignment,
    file_path: String,
    now: DateTime<Utc>,
) -> Result<(), SubmissionError> {
    if assignment.status == AssignmentStatus::Completed {
        return Err(SubmissionError::AlreadySubmitted);
    }

    assignment.status = AssignmentStatus::Completed;
    assignment.file_path = Some(file_path);
    assignment.completed_at = Some(now);
    Ok(())
}

/// Tasks the user has never held, in any status. A task completed long ago
/// stays hidden from that user forever.
pub fn available_tasks(tasks: Vec<Task>, assignments: &[Assignment]) -> Vec<Task> {
    let taken: HashSet<&str> = assignments.iter().map(|a| a.task_id.as_str()).collect();
    tasks
        .into_iter()
        .filter(|t| !taken.contains(t.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(status: AssignmentStatus, created_at: DateTime<Utc>, task_id: &str) -> Assignment {
        Assignment {
            id: uuid::Uuid::new_v4().to_string(),
            user_email: "writer@example.com".to_string(),
            task_id: task_id.to_string(),
            status,
            deadline: created_at + Duration::hours(6),
            file_path: None,
            created_at,
            completed_at: None,
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: "300 words".to_string(),
            price: 10.0,
            file_path: "brief.pdf".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_assignments_is_eligible() {
        let now = Utc::now();
        assert_eq!(check_eligibility(&[], now, Duration::hours(72)), Ok(()));
    }

    #[test]
    fn test_pending_assignment_blocks() {
        let now = Utc::now();
        let existing = vec![assignment(
            AssignmentStatus::Pending,
            now - Duration::hours(100),
            "t1",
        )];
        // Pending blocks even when it is older than the cooldown window
        assert_eq!(
            check_eligibility(&existing, now, Duration::hours(72)),
            Err(EligibilityError::OutstandingWork)
        );
    }

    #[test]
    fn test_recent_completion_blocks_until_window_elapses() {
        let now = Utc::now();
        let created = now - Duration::hours(10);
        let existing = vec![assignment(AssignmentStatus::Completed, created, "t1")];

        let result = check_eligibility(&existing, now, Duration::hours(72));
        assert_eq!(
            result,
            Err(EligibilityError::CoolingDown {
                until: created + Duration::hours(72)
            })
        );
    }

    #[test]
    fn test_old_completion_does_not_block() {
        let now = Utc::now();
        let existing = vec![assignment(
            AssignmentStatus::Completed,
            now - Duration::hours(73),
            "t1",
        )];
        assert_eq!(check_eligibility(&existing, now, Duration::hours(72)), Ok(()));
    }

    #[test]
    fn test_most_recent_assignment_sets_the_wait() {
        let now = Utc::now();
        let older = now - Duration::hours(60);
        let newer = now - Duration::hours(20);
        let existing = vec![
            assignment(AssignmentStatus::Completed, older, "t1"),
            assignment(AssignmentStatus::Completed, newer, "t2"),
        ];

        assert_eq!(
            check_eligibility(&existing, now, Duration::hours(72)),
            Err(EligibilityError::CoolingDown {
                until: newer + Duration::hours(72)
            })
        );
    }

    #[test]
    fn test_submission_deadline_offset() {
        let now = Utc::now();
        assert_eq!(submission_deadline(now, Duration::hours(6)), now + Duration::hours(6));
    }

    #[test]
    fn test_complete_transitions_once() {
        let now = Utc::now();
        let mut a = assignment(AssignmentStatus::Pending, now - Duration::hours(1), "t1");

        assert_eq!(complete(&mut a, "essay.docx".to_string(), now), Ok(()));
        assert_eq!(a.status, AssignmentStatus::Completed);
        assert_eq!(a.file_path.as_deref(), Some("essay.docx"));
        assert_eq!(a.completed_at, Some(now));

        // Second submission is rejected and leaves the record untouched
        assert_eq!(
            complete(&mut a, "other.docx".to_string(), now),
            Err(SubmissionError::AlreadySubmitted)
        );
        assert_eq!(a.file_path.as_deref(), Some("essay.docx"));
    }

    #[test]
    fn test_available_tasks_excludes_any_status() {
        let now = Utc::now();
        let tasks = vec![task("t1"), task("t2"), task("t3")];
        let assignments = vec![
            assignment(AssignmentStatus::Completed, now - Duration::days(30), "t1"),
            assignment(AssignmentStatus::Pending, now, "t2"),
        ];

        let available = available_tasks(tasks, &assignments);
        let ids: Vec<&str> = available.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3"]);
    }

    #[test]
    fn test_available_tasks_with_no_history() {
        let tasks = vec![task("t1"), task("t2")];
        let available = available_tasks(tasks, &[]);
        assert_eq!(available.len(), 2);
    }
}
