use std::sync::Arc;
use std::time::Duration;

use georag::application::ports::GenerationOptions;
use georag::application::services::{StreamEvent, spawn_generation};
use georag::domain::ChatTurn;

use crate::helpers::{
    EndlessLlmClient, ScriptedLlmClient, TEST_FAILURE_MESSAGE, UnavailableLlmClient,
};

fn options() -> GenerationOptions {
    GenerationOptions::new("test-model", 0.0)
}

async fn collect(mut events: tokio::sync::mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn given_successful_generation_when_consuming_then_receives_fragments_in_order() {
    let llm = Arc::new(ScriptedLlmClient::new(&["Hel", "lo", "", " world"]));

    let events = spawn_generation(
        llm,
        vec![ChatTurn::user("hi")],
        options(),
        TEST_FAILURE_MESSAGE.to_string(),
        1,
    );

    assert_eq!(
        collect(events).await,
        vec![
            StreamEvent::Fragment("Hel".to_string()),
            StreamEvent::Fragment("lo".to_string()),
            StreamEvent::Fragment(" world".to_string()),
        ]
    );
}

#[tokio::test]
async fn given_failure_mid_stream_when_consuming_then_ends_with_failure_event() {
    let llm = Arc::new(ScriptedLlmClient::failing_after(&["one", "two", "three"], 2));

    let events = spawn_generation(
        llm,
        vec![ChatTurn::user("hi")],
        options(),
        TEST_FAILURE_MESSAGE.to_string(),
        1,
    );

    assert_eq!(
        collect(events).await,
        vec![
            StreamEvent::Fragment("one".to_string()),
            StreamEvent::Fragment("two".to_string()),
            StreamEvent::Failed(TEST_FAILURE_MESSAGE.to_string()),
        ]
    );
}

#[tokio::test]
async fn given_failure_before_stream_when_consuming_then_only_failure_event() {
    let events = spawn_generation(
        Arc::new(UnavailableLlmClient),
        vec![ChatTurn::user("hi")],
        options(),
        TEST_FAILURE_MESSAGE.to_string(),
        1,
    );

    let collected = collect(events).await;

    assert_eq!(collected.len(), 1);
    assert!(collected[0].is_failure());
    assert_eq!(collected[0].text(), TEST_FAILURE_MESSAGE);
}

#[tokio::test]
async fn given_consumer_drops_receiver_when_streaming_then_producer_stops_pulling() {
    let llm = Arc::new(EndlessLlmClient::new());

    let mut events = spawn_generation(
        Arc::clone(&llm),
        vec![ChatTurn::user("hi")],
        options(),
        TEST_FAILURE_MESSAGE.to_string(),
        1,
    );

    for _ in 0..3 {
        assert!(matches!(events.recv().await, Some(StreamEvent::Fragment(_))));
    }
    drop(events);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let pulls_after_drop = llm.pulls();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(llm.pulls(), pulls_after_drop, "producer kept pulling");
    // Three delivered, at most one buffered and one waiting on the full channel.
    assert!(pulls_after_drop <= 6, "pulled {pulls_after_drop} fragments");
}

#[tokio::test]
async fn given_zero_capacity_when_spawning_then_falls_back_to_single_slot() {
    let llm = Arc::new(ScriptedLlmClient::new(&["a", "b"]));

    let events = spawn_generation(
        llm,
        vec![ChatTurn::user("hi")],
        options(),
        TEST_FAILURE_MESSAGE.to_string(),
        0,
    );

    assert_eq!(collect(events).await.len(), 2);
}
