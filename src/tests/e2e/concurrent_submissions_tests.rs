use crate::modules::scores::core::score_table::{ItemScore, ScoreTable};
use crate::modules::scores::core::vote::{Choice, VoteBatch};
use crate::modules::scores::use_cases::submit_votes::backoff::RetryPolicy;
use crate::modules::scores::use_cases::submit_votes::coordinator::RetryCoordinator;
use crate::shared::infrastructure::versioned_store::VersionedStore;
use crate::shared::infrastructure::versioned_store::in_memory::InMemoryVersionedStore;
use crate::shared::infrastructure::versioned_store::json_file::JsonFileVersionedStore;
use crate::tests::fixtures::batches::VoteBatchBuilder;
use crate::tests::fixtures::racing_store::RacingStore;
use crate::tests::fixtures::sleepers::RecordingSleeper;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::join;

fn expected_totals(batches: &[VoteBatch]) -> ScoreTable {
    let mut totals: BTreeMap<String, ItemScore> = BTreeMap::new();
    for vote in batches.iter().flat_map(|b| b.votes()) {
        let score = totals.entry(vote.item.clone()).or_default();
        match vote.choice {
            Choice::Left => score.left += 1,
            Choice::Right => score.right += 1,
        }
    }
    totals.into_iter().collect()
}

fn batch_for(task: usize) -> VoteBatch {
    let items = ["cat", "dog", "owl"];
    let mut builder = VoteBatchBuilder::new();
    for (i, item) in items.iter().enumerate() {
        builder = if (task + i) % 2 == 0 {
            builder.left(*item)
        } else {
            builder.right(*item)
        };
    }
    builder.left(format!("task-{task}")).build()
}

async fn submit_all<TStore>(store: Arc<TStore>, batches: &[VoteBatch]) -> Arc<RecordingSleeper>
where
    TStore: VersionedStore<ScoreTable> + 'static,
{
    let sleeper = Arc::new(RecordingSleeper::new());
    let coordinator = Arc::new(RetryCoordinator::new(
        store,
        sleeper.clone(),
        RetryPolicy::new(batches.len() as u32 + 1, Duration::from_millis(1)),
    ));
    let handles: Vec<_> = batches
        .iter()
        .cloned()
        .map(|batch| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.handle(&batch, None).await })
        })
        .collect();
    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("submission failed");
    }
    sleeper
}

#[tokio::test]
async fn counts_both_batches_when_a_rival_creates_the_item_first() {
    let rival = VoteBatchBuilder::new().left("cat").left("cat").build();
    let ours = VoteBatchBuilder::new().right("cat").build();
    let store = Arc::new(RacingStore::new(rival.clone()));
    let sleeper = Arc::new(RecordingSleeper::new());
    let coordinator = RetryCoordinator::new(store.clone(), sleeper.clone(), RetryPolicy::default());

    let table = coordinator.handle(&ours, None).await.expect("handle failed");

    assert_eq!(table.get("cat"), Some(&ItemScore::new(2, 1)));
    assert_eq!(table, expected_totals(&[rival, ours]));
    assert_eq!(store.read().await.unwrap().document, table);
    // rival create, our conflicting create, our retried update
    assert_eq!(store.inner().write_calls(), 3);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(25)]);
}

#[tokio::test]
async fn counts_both_batches_when_two_handlers_race_on_an_empty_store() {
    let store = Arc::new(InMemoryVersionedStore::<ScoreTable>::new());
    store.set_delay_write_ms(10);
    let sleeper = Arc::new(RecordingSleeper::new());
    let first = RetryCoordinator::new(store.clone(), sleeper.clone(), RetryPolicy::default());
    let second = RetryCoordinator::new(store.clone(), sleeper.clone(), RetryPolicy::default());
    let a = VoteBatchBuilder::new().left("new-item").build();
    let b = VoteBatchBuilder::new().right("new-item").right("other").build();

    let (result_a, result_b) = join!(first.handle(&a, None), second.handle(&b, None));

    assert!(result_a.is_ok() && result_b.is_ok());
    assert_eq!(
        store.read().await.unwrap().document,
        expected_totals(&[a, b])
    );
    assert!(
        !sleeper.delays().is_empty(),
        "one of the writers should have lost the race and retried"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counts_every_vote_under_concurrent_in_memory_submissions() {
    let store = Arc::new(InMemoryVersionedStore::<ScoreTable>::new());
    store.set_delay_write_ms(1);
    let batches: Vec<_> = (0..16).map(batch_for).collect();

    submit_all(store.clone(), &batches).await;

    let snapshot = store.read().await.unwrap();
    assert_eq!(snapshot.document, expected_totals(&batches));
    assert!(store.write_calls() >= batches.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counts_every_vote_under_concurrent_file_submissions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scores.json");
    let batches: Vec<_> = (0..8).map(batch_for).collect();

    submit_all(Arc::new(JsonFileVersionedStore::<ScoreTable>::new(&path)), &batches).await;

    let reopened = JsonFileVersionedStore::<ScoreTable>::new(&path);
    assert_eq!(
        reopened.read().await.unwrap().document,
        expected_totals(&batches)
    );
}
