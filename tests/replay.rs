mod common;

use tokio_util::sync::CancellationToken;

use binbook::db::load;
use binbook::db::models::{Checkpoint, Pair, CHECKPOINT_ID};
use binbook::utils::{address_key, CENTER_BIN_ID};
use binbook::{LogEvent, Replayer};

use common::*;

fn to_ndjson(events: &[LogEvent]) -> String {
    let mut lines: Vec<String> = events.iter().map(|e| serde_json::to_string(e).unwrap()).collect();
    // Blank lines are ignored
    lines.insert(1, String::new());
    lines.join("\n")
}

fn scenario(h: &mut Harness) -> Vec<LogEvent> {
    vec![
        h.event(pair_created()),
        h.event(deposit(&[(CENTER_BIN_ID, 1_000 * ONE, 1_000 * ONE)])),
        h.event(swap(
            CENTER_BIN_ID,
            (10 * ONE, 0),
            (0, 9_970_000_000_000_000_000),
            (30_000_000_000_000_000, 0),
        )),
    ]
}

#[tokio::test]
async fn test_replay_resumes_from_checkpoint() {
    let mut h = Harness::new();
    let events = scenario(&mut h);
    let input = to_ndjson(&events);
    let (store, engine) = h.into_parts();

    let mut replayer = Replayer::new(engine, true);
    let stats = replayer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.already_applied, 0);

    let checkpoint = load::<Checkpoint, _>(store.as_ref(), CHECKPOINT_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.block_number, events[2].meta.block_number);
    assert_eq!(checkpoint.log_index, events[2].meta.log_index);

    // Restart over the same store: nothing is applied twice
    let mut replayer = Replayer::new(engine_for(&store, default_oracle()), true);
    let stats = replayer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.applied, 0);
    assert_eq!(stats.already_applied, 3);

    let pair = load::<Pair, _>(store.as_ref(), &address_key(&PAIR))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pair.reserve_x, dec("1010"));
    assert_eq!(pair.tx_count, 2);
}

#[tokio::test]
async fn test_replay_halts_on_decode_error() {
    let mut h = Harness::new();
    let mut events = scenario(&mut h);
    events.insert(
        2,
        h.event(swap(CENTER_BIN_ID, (ONE, ONE), (0, 0), (0, 0))),
    );
    let input = to_ndjson(&events);
    let (store, engine) = h.into_parts();

    let mut replayer = Replayer::new(engine, true);
    let err = replayer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("swap direction undetermined"));

    // Checkpoint stays at the last applied event
    let checkpoint = load::<Checkpoint, _>(store.as_ref(), CHECKPOINT_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.block_number, events[1].meta.block_number);
}

#[tokio::test]
async fn test_replay_continues_past_failures_when_configured() {
    let mut h = Harness::new();
    let events = scenario(&mut h);
    let mut input = to_ndjson(&events);
    input.push_str("\n{not json}\n");
    let (_store, engine) = h.into_parts();

    let mut replayer = Replayer::new(engine, false);
    let stats = replayer
        .run(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_replay_stops_when_cancelled() {
    let mut h = Harness::new();
    let events = scenario(&mut h);
    let input = to_ndjson(&events);
    let (_store, engine) = h.into_parts();

    let token = CancellationToken::new();
    token.cancel();

    let mut replayer = Replayer::new(engine, true);
    let stats = replayer.run(input.as_bytes(), token).await.unwrap();
    assert_eq!(stats.applied, 0);
}
