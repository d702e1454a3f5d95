//! Integration tests for the callback relay and script loader bridge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ocgbridge_core::{
    AsyncCardReader, AsyncHostHandlers, AsyncLogHandler, AsyncScriptReader, BlockingRelay,
    BufferLedger, CallbackRelay, CardData, DuelHandle, EngineHooks, HandlerError, HandlerResult,
    HostHandlers, LogType, ScriptSink, SuspendingRelay, OPERATION_FAILED, OPERATION_SUCCEEDED,
};
use parking_lot::Mutex;

#[derive(Default)]
struct Sink {
    calls: Vec<(Vec<u8>, String)>,
}

impl ScriptSink for Sink {
    fn duel(&self) -> DuelHandle {
        DuelHandle(0x2a)
    }

    fn ingest(&mut self, source: &[u8], name: &str) -> i32 {
        self.calls.push((source.to_vec(), name.to_owned()));
        OPERATION_SUCCEEDED
    }
}

fn card_with_set_codes(code: u32) -> HandlerResult<Option<CardData>> {
    Ok(Some(CardData {
        code,
        setcodes: vec![0x1, 0x2, 0x3],
        ..CardData::default()
    }))
}

fn empty_script(_duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
    Ok((name == "c4.lua").then(|| "-- empty".to_owned()))
}

fn blocking_hooks(handlers: HostHandlers, ledger: &BufferLedger) -> EngineHooks {
    EngineHooks::new(Arc::new(BlockingRelay::new(handlers, ledger.clone())))
}

#[test]
fn test_script_content_is_ingested_and_released() {
    let ledger = BufferLedger::new();
    let hooks = blocking_hooks(HostHandlers::new(card_with_set_codes, empty_script), &ledger);
    let mut sink = Sink::default();

    let status = hooks.read_script(&mut sink, "c4.lua");

    assert_eq!(status, OPERATION_SUCCEEDED);
    assert_eq!(sink.calls, vec![(b"-- empty".to_vec(), "c4.lua".to_owned())]);
    assert_eq!(sink.calls[0].0.len(), 8);
    let stats = ledger.stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));
}

#[test]
fn test_missing_script_skips_ingestion() {
    let ledger = BufferLedger::new();
    let hooks = blocking_hooks(HostHandlers::new(card_with_set_codes, empty_script), &ledger);
    let mut sink = Sink::default();

    let status = hooks.read_script(&mut sink, "c5.lua");

    assert_eq!(status, OPERATION_FAILED);
    assert!(sink.calls.is_empty());
    assert_eq!(ledger.stats().acquired, 0);
}

#[test]
fn test_multibyte_script_length_is_in_bytes() {
    let ledger = BufferLedger::new();
    let hooks = blocking_hooks(
        HostHandlers::new(
            card_with_set_codes,
            |_duel: DuelHandle, _name: &str| -> HandlerResult<Option<String>> {
                Ok(Some("-- ブルーアイズ".to_owned()))
            },
        ),
        &ledger,
    );
    let mut sink = Sink::default();

    hooks.read_script(&mut sink, "c89631139.lua");

    assert_eq!(sink.calls[0].0.len(), "-- ブルーアイズ".len());
    assert_ne!(sink.calls[0].0.len(), "-- ブルーアイズ".chars().count());
}

#[test]
fn test_card_set_codes_freed_once_on_done() {
    let ledger = BufferLedger::new();
    let hooks = blocking_hooks(HostHandlers::new(card_with_set_codes, empty_script), &ledger);

    let response = hooks.read_card(12345);
    assert_eq!(response.record.code, 12345);
    assert_eq!(response.set_codes_with_terminator(), Some(&[1, 2, 3, 0][..]));
    assert_eq!(ledger.stats().outstanding, 1);

    hooks.card_read_done(response);
    let stats = ledger.stats();
    assert_eq!((stats.acquired, stats.released, stats.outstanding), (1, 1, 0));
}

#[test]
fn test_unknown_card_is_empty_sentinel() {
    let ledger = BufferLedger::new();
    let hooks = blocking_hooks(
        HostHandlers::new(
            |_code: u32| -> HandlerResult<Option<CardData>> { Ok(None) },
            empty_script,
        ),
        &ledger,
    );

    let response = hooks.read_card(999);
    assert!(response.is_empty());
    assert_eq!(response.record.code, 0);
    hooks.card_read_done(response);
    assert_eq!(ledger.stats().acquired, 0);
}

#[test]
fn test_raising_log_handler_is_swallowed() {
    let ledger = BufferLedger::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let hooks = blocking_hooks(
        HostHandlers::new(card_with_set_codes, empty_script).with_log_handler(
            move |_kind: LogType, _text: &str| -> HandlerResult<()> {
                seen.fetch_add(1, Ordering::SeqCst);
                Err(HandlerError::failed("log sink closed"))
            },
        ),
        &ledger,
    );

    hooks.log("lua error", LogType::Error as i32);
    hooks.log("unknown kind", 99);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ----------------------------------------------------------------------------
// Suspending convention
// ----------------------------------------------------------------------------

struct RemoteDatabase {
    requests: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl AsyncCardReader for RemoteDatabase {
    async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.requests.lock().push(code);
        card_with_set_codes(code)
    }
}

struct RemoteScripts;

#[async_trait]
impl AsyncScriptReader for RemoteScripts {
    async fn read_script(&self, duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        tokio::task::yield_now().await;
        empty_script(duel, name)
    }
}

struct PanickingLog;

#[async_trait]
impl AsyncLogHandler for PanickingLog {
    async fn log(&self, _kind: LogType, _message: &str) -> HandlerResult<()> {
        panic!("log handler crashed")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_suspending_relay_pairs_requests_in_order() {
    let ledger = BufferLedger::new();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let database = RemoteDatabase { requests: Arc::clone(&requests) };
    let handlers = AsyncHostHandlers::new(database, RemoteScripts)
        .with_log_handler(PanickingLog);
    let hooks = EngineHooks::new(Arc::new(SuspendingRelay::new(
        handlers,
        tokio::runtime::Handle::current(),
        ledger.clone(),
    )));

    let result = tokio::task::spawn_blocking(move || {
        let mut codes = Vec::new();
        for code in [10, 20, 30] {
            let response = hooks.read_card(code);
            codes.push(response.record.code);
            hooks.card_read_done(response);
        }

        hooks.log("swallowed", LogType::FromScript as i32);

        let mut sink = Sink::default();
        let found = hooks.read_script(&mut sink, "c4.lua");
        let missing = hooks.read_script(&mut sink, "c9.lua");
        (codes, found, missing, sink.calls.len())
    })
    .await
    .unwrap();

    assert_eq!(result, (vec![10, 20, 30], OPERATION_SUCCEEDED, OPERATION_FAILED, 1));
    assert_eq!(*requests.lock(), vec![10, 20, 30]);
    assert_eq!(ledger.stats().outstanding, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_host_runtime_keeps_running_while_engine_waits() {
    struct GatedReader {
        gate: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl AsyncCardReader for GatedReader {
        async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
            self.gate.notified().await;
            card_with_set_codes(code)
        }
    }

    let gate = Arc::new(tokio::sync::Notify::new());
    let relay = SuspendingRelay::new(
        AsyncHostHandlers::new(GatedReader { gate: Arc::clone(&gate) }, RemoteScripts),
        tokio::runtime::Handle::current(),
        BufferLedger::new(),
    );

    let engine_call = tokio::task::spawn_blocking(move || relay.card_data(77));

    // Another task on the host runtime makes progress and opens the gate.
    let opener = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.notify_one();
    });

    opener.await.unwrap();
    let card = engine_call.await.unwrap();
    assert_eq!(card.map(|c| c.code), Some(77));
}
