//! Pipeline runs through the public API with in-process stages

mod common;

use common::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vidquiz::{Error, Event, FetchError, Stage};

const TRANSCRIPT: &str = "Ownership moves values; borrowing lends them out.";

#[tokio::test]
async fn test_generate_quiz_end_to_end() {
    let generator = NumberedGenerator::new(10);
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::ok(),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new(TRANSCRIPT),
        generator.clone(),
    );
    let mut events = orchestrator.subscribe();

    let questions = orchestrator
        .generate_quiz("https://example.com/watch?v=1", Some(4), CancellationToken::new())
        .await
        .expect("run should succeed");

    assert_eq!(questions.len(), 4);
    for question in questions.iter() {
        assert_eq!(question.options().len(), 4);
        assert!(question.correct_answer_index() <= 3);
    }
    assert_eq!(
        generator.seen_transcript.lock().unwrap().as_deref(),
        Some(TRANSCRIPT)
    );

    let events = collect_run_events(&mut events, Duration::from_secs(5)).await;
    let stages: Vec<Stage> = events
        .iter()
        .filter_map(|e| match e {
            Event::StageChanged { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            Stage::Fetching,
            Stage::Converting,
            Stage::Transcribing,
            Stage::Generating,
            Stage::CleaningUp,
            Stage::Completed,
        ]
    );
    assert!(matches!(
        events.last(),
        Some(Event::RunCompleted { question_count: 4, .. })
    ));
    assert_workspace_empty(&orchestrator.config().workspace.temp_dir);
}

#[tokio::test]
async fn test_default_question_count() {
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::ok(),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new(TRANSCRIPT),
        NumberedGenerator::new(50),
    );

    let questions = orchestrator
        .generate_quiz("https://example.com/v", None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        questions.len(),
        orchestrator.config().generation.default_question_count
    );
}

#[tokio::test]
async fn test_fetch_failure_skips_later_stages() {
    let transcriber = FixedTranscriber::new(TRANSCRIPT);
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::failing("ERROR: Video unavailable"),
        Arc::new(CopyTranscoder),
        transcriber.clone(),
        NumberedGenerator::new(5),
    );
    let mut events = orchestrator.subscribe();

    let result = orchestrator
        .generate_quiz("https://example.com/gone", Some(5), CancellationToken::new())
        .await;

    match result {
        Err(Error::Fetch(FetchError::InvocationFailed { exit_info })) => {
            assert!(exit_info.contains("Video unavailable"));
        }
        other => panic!("expected fetch invocation failure, got {:?}", other),
    }
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);

    let events = collect_run_events(&mut events, Duration::from_secs(5)).await;
    match events.last() {
        Some(Event::RunFailed { stage, code, .. }) => {
            assert_eq!(*stage, Some(Stage::Fetching));
            assert_eq!(code, "fetch_invocation_failed");
        }
        other => panic!("expected RunFailed, got {:?}", other),
    }
    assert_workspace_empty(&orchestrator.config().workspace.temp_dir);
}

#[tokio::test]
async fn test_blank_transcript_fails_before_generation() {
    let generator = NumberedGenerator::new(5);
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::ok(),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new("  \n "),
        generator.clone(),
    );

    let result = orchestrator
        .generate_quiz("https://example.com/silent", Some(5), CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(Error::Transcription(vidquiz::TranscriptionError::EmptyResult))
    ));
    assert!(generator.seen_transcript.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_request_creates_no_run() {
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::ok(),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new(TRANSCRIPT),
        NumberedGenerator::new(5),
    );
    let mut events = orchestrator.subscribe();

    let result = orchestrator
        .generate_quiz("not a url", Some(5), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
    assert!(events.try_recv().is_err(), "no events for a rejected request");
    assert!(!orchestrator.config().workspace.temp_dir.exists());
}

#[tokio::test]
async fn test_cancellation_cleans_up() {
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::slow(Duration::from_secs(30)),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new(TRANSCRIPT),
        NumberedGenerator::new(5),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.generate_quiz("https://example.com/v", Some(5), cancel),
    )
    .await
    .expect("cancellation should end the run promptly");

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_workspace_empty(&orchestrator.config().workspace.temp_dir);
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let (orchestrator, _temp_dir) = orchestrator_with(
        StaticFetcher::ok(),
        Arc::new(CopyTranscoder),
        FixedTranscriber::new(TRANSCRIPT),
        NumberedGenerator::new(8),
    );
    let orchestrator = Arc::new(orchestrator);

    let runs: Vec<_> = (1..=4)
        .map(|count| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .generate_quiz("https://example.com/v", Some(count), CancellationToken::new())
                    .await
            })
        })
        .collect();

    for (i, run) in runs.into_iter().enumerate() {
        let questions = run.await.unwrap().unwrap();
        assert_eq!(questions.len(), i + 1);
    }
    assert_workspace_empty(&orchestrator.config().workspace.temp_dir);
}
