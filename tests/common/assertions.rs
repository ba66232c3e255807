//! Custom assertions for pipeline integration tests

use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use vidquiz::Event;

/// Collect events until the run's terminal event (or `timeout`)
pub async fn collect_run_events(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> Vec<Event> {
    let mut collected = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let terminal = matches!(event, Event::RunCompleted { .. } | Event::RunFailed { .. });
            collected.push(event);
            if terminal {
                break;
            }
        }
    })
    .await;
    collected
}

/// Assert that a workspace directory holds no run directories
pub fn assert_workspace_empty(workspace: &Path) {
    let leftovers: Vec<_> = match std::fs::read_dir(workspace) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => return,
    };
    assert!(
        leftovers.is_empty(),
        "workspace should be empty after a run, found: {:?}",
        leftovers
    );
}
