use polity_core::{
    ActionEffect, EngineConfig, GameState, Player, PlayerAction, ProposalStatus, UpdatedAtPolicy,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use polity_runtime::{
    AuditLog, Event, GameRepository, InMemoryAuditLog, InMemoryGameRepo, RepositoryError,
    Runtime, RuntimeConfig, RuntimeError, StepRecord, StoredGame, Topic, replay,
};
use tempfile::TempDir;

/// Audit log that rejects appends while `offline` is set.
struct SwitchableAuditLog {
    inner: InMemoryAuditLog,
    offline: Arc<AtomicBool>,
}

impl AuditLog for SwitchableAuditLog {
    fn append(&self, record: &StepRecord) -> polity_runtime::repository::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io(std::io::Error::other("audit volume offline")));
        }
        self.inner.append(record)
    }

    fn read(&self, game_id: &str) -> polity_runtime::repository::Result<Vec<StepRecord>> {
        self.inner.read(game_id)
    }
}

fn council(id: &str) -> GameState {
    GameState::new(id).with_players([
        Player::new("p1", "Alice"),
        Player::new("p2", "Bob"),
        Player::new("p3", "Carol"),
    ])
}

/// End-to-end session: propose, vote, resolve, and verify the audit trail.
#[tokio::test]
async fn proposal_lifecycle_is_committed_and_audited() {
    let runtime = Runtime::builder().build().unwrap();
    let mut step_rx = runtime.subscribe(Topic::Step);
    let mut resolution_rx = runtime.subscribe(Topic::Resolution);

    let game = runtime.create_game(council("lifecycle")).await.unwrap();

    // ================================================================
    // Step 1: open a proposal
    // ================================================================
    let report = game
        .advance(vec![PlayerAction::propose("Tax cut", "Lower the rate", "p1")])
        .await
        .unwrap();
    assert_eq!(report.step, 1);
    let proposal_id = match &report.effects[0] {
        ActionEffect::ProposalCreated { proposal_id, .. } => proposal_id.clone(),
        other => panic!("unexpected effect {other:?}"),
    };
    assert!(report.resolutions.is_empty());

    let Event::StepApplied(event) = step_rx.recv().await.unwrap() else {
        panic!("expected a step event");
    };
    assert_eq!(event.step, 1);
    assert_eq!(event.digest, report.digest);

    // ================================================================
    // Step 2: vote; the proposal resolves at the end of this step
    // ================================================================
    let report = game
        .advance(vec![
            PlayerAction::vote(proposal_id.clone(), "p1", "for"),
            PlayerAction::vote(proposal_id.clone(), "p2", "for"),
            PlayerAction::vote(proposal_id.clone(), "p3", "against"),
        ])
        .await
        .unwrap();
    assert_eq!(report.step, 2);
    assert_eq!(report.state.proposals[0].status, ProposalStatus::Enacted);

    let Event::ProposalResolved(event) = resolution_rx.recv().await.unwrap() else {
        panic!("expected a resolution event");
    };
    assert_eq!(event.step, 2);
    assert_eq!(event.resolution.proposal_id, proposal_id);
    assert_eq!(event.resolution.tally.votes_for, 2);

    // ================================================================
    // Persistence and audit
    // ================================================================
    let stored = runtime.repository().load("lifecycle").unwrap().unwrap();
    assert_eq!(stored.step, 2);
    assert_eq!(stored.digest, report.digest);
    assert_eq!(game.snapshot().await.unwrap(), stored);

    let records = runtime.audit_log().read("lifecycle").unwrap();
    assert_eq!(records.len(), 2);
    let summary = replay(runtime.engine(), &council("lifecycle"), &records).unwrap();
    assert_eq!(summary.digest, stored.digest);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn games_resume_from_the_data_directory() {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig::default()
        .with_data_dir(dir.path())
        .with_engine(EngineConfig::default().with_updated_at(UpdatedAtPolicy::SeedDerived));

    let first_state = {
        let runtime = Runtime::builder().config(config.clone()).build().unwrap();
        let game = runtime.create_game(council("durable")).await.unwrap();
        let report = game
            .advance(vec![PlayerAction::propose("Parks", "", "p2")])
            .await
            .unwrap();
        runtime.shutdown().await.unwrap();
        report.state
    };

    let runtime = Runtime::builder().config(config).build().unwrap();
    assert_eq!(runtime.list_games().unwrap(), ["durable"]);

    let game = runtime.game("durable").await.unwrap();
    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.step, 1);
    assert_eq!(snapshot.state, first_state);

    let report = game.advance(Vec::new()).await.unwrap();
    assert_eq!(report.step, 2);
    assert_eq!(report.state.proposals[0].status, ProposalStatus::Rejected);

    let records = runtime.audit_log().read("durable").unwrap();
    let summary = replay(runtime.engine(), &council("durable"), &records).unwrap();
    assert_eq!(summary.state, report.state);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn identical_histories_in_separate_runtimes_agree() {
    let engine = EngineConfig::default().with_updated_at(UpdatedAtPolicy::SeedDerived);
    let config = RuntimeConfig::default().with_engine(engine);

    let mut digests = Vec::new();
    for _ in 0..2 {
        let runtime = Runtime::builder().config(config.clone()).build().unwrap();
        let game = runtime.create_game(council("twin")).await.unwrap();
        game.advance(vec![PlayerAction::propose("Roads", "", "p3")])
            .await
            .unwrap();
        let report = game.advance(Vec::new()).await.unwrap();
        digests.push((report.digest, report.state));
        runtime.shutdown().await.unwrap();
    }

    assert_eq!(digests[0], digests[1]);
}

#[tokio::test]
async fn opening_an_unknown_game_fails() {
    let runtime = Runtime::builder().build().unwrap();

    let err = runtime.game("nowhere").await.err().unwrap();
    assert!(matches!(err, RuntimeError::GameNotFound { .. }));
}

#[tokio::test]
async fn creating_a_duplicate_game_fails() {
    let runtime = Runtime::builder().build().unwrap();
    runtime.create_game(council("dup")).await.unwrap();

    let err = runtime.create_game(council("dup")).await.err().unwrap();
    assert!(matches!(
        err,
        RuntimeError::Repository(RepositoryError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn concurrent_writer_loses_the_race() {
    let runtime = Runtime::builder()
        .repository(InMemoryGameRepo::new())
        .build()
        .unwrap();
    let game = runtime.create_game(council("contested")).await.unwrap();

    // Another writer commits step 1 behind the worker's back.
    let stolen = StoredGame::at_step(1, council("contested")).unwrap();
    runtime.repository().swap(0, &stolen).unwrap();

    let err = game.advance(Vec::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Repository(RepositoryError::StaleWrite { expected: 0, actual: 1, .. })
    ));

    // Nothing was audited, and the worker picked up the winning snapshot.
    assert!(runtime.audit_log().read("contested").unwrap().is_empty());
    assert_eq!(game.snapshot().await.unwrap().step, 1);

    let report = runtime.game("contested").await.unwrap().advance(Vec::new()).await.unwrap();
    assert_eq!(report.step, 2);
    assert_eq!(runtime.repository().load("contested").unwrap().unwrap().step, 2);
}

#[tokio::test]
async fn audit_failures_do_not_undo_committed_steps() {
    let offline = Arc::new(AtomicBool::new(true));
    let runtime = Runtime::builder()
        .audit_log(SwitchableAuditLog {
            inner: InMemoryAuditLog::new(),
            offline: offline.clone(),
        })
        .build()
        .unwrap();
    let game = runtime.create_game(council("outage")).await.unwrap();

    // The step commits even though its audit record cannot be written yet.
    let report = game
        .advance(vec![PlayerAction::propose("Tax cut", "", "p1")])
        .await
        .unwrap();
    assert_eq!(report.step, 1);
    assert_eq!(report.audit_backlog, 1);
    assert_eq!(game.snapshot().await.unwrap().state.proposals.len(), 1);
    assert!(runtime.audit_log().read("outage").unwrap().is_empty());

    // Once the log is back, the backlog drains ahead of the new record.
    offline.store(false, Ordering::SeqCst);
    let report = game.advance(Vec::new()).await.unwrap();
    assert_eq!(report.audit_backlog, 0);

    let records = runtime.audit_log().read("outage").unwrap();
    let steps: Vec<u64> = records.iter().map(|record| record.step).collect();
    assert_eq!(steps, [1, 2]);

    let summary = replay(runtime.engine(), &council("outage"), &records).unwrap();
    assert_eq!(summary.digest, report.digest);
}

#[tokio::test]
async fn handles_share_one_worker() {
    let runtime = Runtime::builder().build().unwrap();
    let created = runtime.create_game(council("shared")).await.unwrap();
    let opened = runtime.game("shared").await.unwrap();

    created.advance(Vec::new()).await.unwrap();
    opened.advance(Vec::new()).await.unwrap();

    assert_eq!(created.snapshot().await.unwrap().step, 2);
    assert_eq!(opened.game_id(), "shared");
}
