//! Task polling utilities
//!
//! Lets frame-driven front ends check a background tokio task without
//! blocking.

use futures::FutureExt;
use tokio::task::{JoinError, JoinHandle};

/// Result of polling a task
pub enum PollResult<T> {
    /// No task to poll (task was None)
    NoTask,
    /// Task is still running
    Pending,
    /// Task completed with result (may be Ok or join error)
    Complete(Result<T, JoinError>),
}

/// Poll an optional task handle and return its result if finished.
///
/// A finished handle is taken out of `task`, so a second poll returns
/// `PollResult::NoTask`.
///
/// # Example
/// ```ignore
/// match poll_task(&mut self.task) {
///     PollResult::Complete(Ok(Ok(images))) => { /* fetched */ }
///     PollResult::Complete(Ok(Err(e))) => { /* NetworkError */ }
///     PollResult::Complete(Err(e)) => { /* task panicked or was aborted */ }
///     PollResult::Pending | PollResult::NoTask => {}
/// }
/// ```
pub fn poll_task<T>(task: &mut Option<JoinHandle<T>>) -> PollResult<T> {
    let Some(handle) = task.as_mut() else {
        return PollResult::NoTask;
    };

    if !handle.is_finished() {
        return PollResult::Pending;
    }

    match handle.now_or_never() {
        Some(result) => {
            *task = None;
            PollResult::Complete(result)
        }
        None => {
            // Shouldn't happen since we checked is_finished(); the handle is
            // kept so the next poll can pick the result up
            tracing::warn!("Task not ready despite is_finished()");
            PollResult::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poll_no_task() {
        let mut task: Option<JoinHandle<u32>> = None;
        assert!(matches!(poll_task(&mut task), PollResult::NoTask));
    }

    #[tokio::test]
    async fn test_poll_finished_task_takes_handle() {
        let mut task = Some(tokio::spawn(async { 7u32 }));
        while task.as_ref().is_some_and(|h| !h.is_finished()) {
            tokio::task::yield_now().await;
        }

        match poll_task(&mut task) {
            PollResult::Complete(Ok(value)) => assert_eq!(value, 7),
            _ => panic!("expected completed task"),
        }
        assert!(task.is_none());
        assert!(matches!(poll_task(&mut task), PollResult::NoTask));
    }

    #[tokio::test]
    async fn test_poll_pending_task() {
        let mut task = Some(tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        }));
        assert!(matches!(poll_task(&mut task), PollResult::Pending));
        assert!(task.is_some());
        if let Some(handle) = task {
            handle.abort();
        }
    }
}
