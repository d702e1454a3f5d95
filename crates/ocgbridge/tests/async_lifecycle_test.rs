//! Suspending convention end to end: handlers await while the engine waits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ocgbridge::wire::{Message, Response};
use ocgbridge::{
    AsyncAnyDuelOptions, AsyncCardReader, AsyncDuelCore, AsyncDuelOptionsV1, AsyncDuelOptionsV2,
    AsyncHostHandlers, AsyncLegacyScriptReader, AsyncLogHandler, AsyncScriptReader, BridgeError,
    CardData, DuelConfigV1, DuelConfigV2, DuelCreationStatus, DuelHandle, HandlerError,
    HandlerResult, LegacyScript, Location, LogType, NewCardInfo, Position, ProcessStatus,
    OPERATION_FAILED, OPERATION_SUCCEEDED,
};
use ocgbridge_core::testing::{MockEngine, Step};
use parking_lot::Mutex;

struct SlowDatabase {
    served: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl AsyncCardReader for SlowDatabase {
    async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
        tokio::time::sleep(Duration::from_millis(3)).await;
        self.served.lock().push(code);
        Ok(Some(CardData {
            code,
            setcodes: vec![0x8, 0x9],
            ..CardData::default()
        }))
    }
}

struct ScriptStore;

#[async_trait]
impl AsyncScriptReader for ScriptStore {
    async fn read_script(&self, _duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        tokio::task::yield_now().await;
        Ok((name == "c4.lua").then(|| "-- empty".to_owned()))
    }
}

#[async_trait]
impl AsyncLegacyScriptReader for ScriptStore {
    async fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>> {
        tokio::task::yield_now().await;
        // Declared length is stale; the byte length wins.
        Ok((name == "c4.lua").then(|| LegacyScript { content: "-- empty".to_owned(), length: 64 }))
    }
}

struct BrokenLog;

#[async_trait]
impl AsyncLogHandler for BrokenLog {
    async fn log(&self, _kind: LogType, _message: &str) -> HandlerResult<()> {
        Err(HandlerError::failed("log pipe closed"))
    }
}

fn options(served: &Arc<Mutex<Vec<u32>>>) -> AsyncAnyDuelOptions {
    AsyncAnyDuelOptions::V2(AsyncDuelOptionsV2 {
        config: DuelConfigV2 { seed: 0xdead_beef, ..DuelConfigV2::default() },
        handlers: AsyncHostHandlers::new(SlowDatabase { served: Arc::clone(served) }, ScriptStore)
            .with_log_handler(BrokenLog),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_suspending_duel_serves_every_hook() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let core = AsyncDuelCore::current(MockEngine::new(vec![
        Step::RequestCard(300),
        Step::RequestScript("c4.lua".into()),
        Step::RequestScript("c5.lua".into()),
        Step::Log(LogType::Error, "lua panic".into()),
        Step::Message(vec![1, 0, 0, 0, 2]),
        Step::Status(ProcessStatus::Continue),
    ]));
    let duel = core.create_duel(options(&served)).await.unwrap();

    duel.new_card(NewCardInfo {
        team: 0,
        duelist: 0,
        code: 100,
        controller: 0,
        location: Location::DECK,
        sequence: 0,
        position: Position::FACEDOWN_DEFENSE,
    })
    .await
    .unwrap();
    duel.start().await.unwrap();

    assert_eq!(duel.process().await.unwrap(), ProcessStatus::Continue as i32);
    assert_eq!(duel.message().await.unwrap(), vec![1, 0, 0, 0, 2]);
    assert_eq!(duel.process().await.unwrap(), ProcessStatus::End as i32);

    assert_eq!(*served.lock(), vec![100, 300]);
    let journal = core.engine().journal();
    assert_eq!(journal.created[0].seed, [0xdead_beef, 0, 0, 0]);
    assert_eq!(journal.script_statuses, vec![OPERATION_SUCCEEDED, OPERATION_FAILED]);
    assert_eq!(journal.ingested[0].len, 8);
    assert_eq!(journal.cards_done, 2);
    assert_eq!(core.ledger().stats().outstanding, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_other_tasks_progress_during_engine_call() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let core = AsyncDuelCore::current(MockEngine::new(
        (1..=5).map(Step::RequestCard).collect(),
    ));
    let duel = core.create_duel(options(&served)).await.unwrap();

    let ticker = tokio::spawn(async {
        let mut ticks = 0;
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
            ticks += 1;
        }
        ticks
    });

    duel.process().await.unwrap();
    assert_eq!(ticker.await.unwrap(), 3);
    assert_eq!(served.lock().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_direct_load_and_queries() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let core = AsyncDuelCore::current(MockEngine::new(Vec::new()).with_field_query(vec![9; 4]));
    let duel = core.create_duel(options(&served)).await.unwrap();

    let status = duel
        .load_script(b"-- utility".to_vec(), "utility.lua".to_owned())
        .await
        .unwrap();
    assert_eq!(status, OPERATION_SUCCEEDED);
    assert_eq!(duel.query_field().await.unwrap(), vec![9; 4]);
    assert_eq!(duel.query_count(1, Location::HAND).await.unwrap(), 0);
    assert_eq!(duel.with_message(<[u8]>::len).await.unwrap(), 0);

    let stats = core.ledger().stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));

    let handle = duel.handle();
    duel.destroy();
    assert_eq!(core.engine().journal().destroyed, vec![handle]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_creation_failure() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let core = AsyncDuelCore::current(
        MockEngine::new(Vec::new()).fail_creation(DuelCreationStatus::NotCreated),
    );

    let result = core.create_duel(options(&served)).await;

    assert!(matches!(result, Err(BridgeError::CreationFailed(DuelCreationStatus::NotCreated))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_generation_one_options_with_awaiting_handlers() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let core = AsyncDuelCore::current(MockEngine::new(vec![
        Step::RequestScript("c4.lua".into()),
        Step::RequestScript("c5.lua".into()),
        Step::RequestCard(77),
    ]));
    let options = AsyncAnyDuelOptions::V1(AsyncDuelOptionsV1 {
        config: DuelConfigV1 { seed: 42, ..DuelConfigV1::default() },
        card_reader: Arc::new(SlowDatabase { served: Arc::clone(&served) }),
        script_reader: Arc::new(ScriptStore),
        log_handler: None,
    });

    let duel = core.create_duel(options).await.unwrap();
    assert_eq!(duel.process().await.unwrap(), ProcessStatus::End as i32);

    let journal = core.engine().journal();
    assert_eq!(journal.created[0].seed, [42, 0, 0, 0]);
    assert_eq!(journal.ingested[0].len, 8);
    assert_eq!(journal.script_statuses, vec![OPERATION_SUCCEEDED, OPERATION_FAILED]);
    assert_eq!(*served.lock(), vec![77]);
    assert_eq!(core.ledger().stats().outstanding, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_prompt_decoded_and_answered() {
    let served = Arc::new(Mutex::new(Vec::new()));
    let mut chain_prompt = vec![16, 0, 0, 0, 16, 1, 0, 0];
    chain_prompt.extend_from_slice(&[0; 8]); // hint timings
    chain_prompt.push(0); // no links
    chain_prompt[0] = u8::try_from(chain_prompt.len() - 4).unwrap();
    let core = AsyncDuelCore::current(MockEngine::new(vec![
        Step::Message(chain_prompt),
        Step::Status(ProcessStatus::Awaiting),
    ]));
    let duel = core.create_duel(options(&served)).await.unwrap();

    assert_eq!(duel.process().await.unwrap(), ProcessStatus::Awaiting as i32);
    let passable = duel
        .with_decoded_messages(|messages| {
            matches!(
                messages,
                [Message::SelectChain { player: 1, forced: false, selects, .. }] if selects.is_empty()
            )
        })
        .await
        .unwrap();
    assert!(passable);

    duel.respond(Response::SelectChain { index: None }).await.unwrap();
    assert_eq!(core.engine().journal().responses, vec![(-1i32).to_le_bytes().to_vec()]);
}
