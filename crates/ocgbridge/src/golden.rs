//! # Golden Path Scenarios
//!
//! The adapter's contract, walked end to end against the in-memory engine
//! under whichever calling convention the config selects:
//!
//! A. generation-1 options widen to the canonical seed
//! B. a found script is ingested with its byte length and freed
//! C. a missing script reports the failure sentinel
//! D. card set codes are freed once, after the done signal
//! E. a failing log handler does not change the process status

use std::sync::Arc;

use async_trait::async_trait;
use ocgbridge_core::testing::{Journal, MockEngine, Step};
use ocgbridge_core::{
    AnyDuelConfig, AnyDuelOptions, AsyncAnyDuelOptions, AsyncCardReader, AsyncDuelOptionsV1,
    AsyncDuelOptionsV2, AsyncDuelOptionsV3, AsyncHostHandlers, AsyncLegacyScriptReader,
    AsyncLogHandler, AsyncScriptReader, BridgeConfig, BridgeResult, CardData, Convention,
    DuelConfigV1, DuelHandle, DuelOptionsV1, DuelOptionsV2, DuelOptionsV3, HandlerError,
    HandlerResult, HostHandlers, LedgerStats, LegacyScript, LogType, ProcessStatus,
    OPERATION_FAILED, OPERATION_SUCCEEDED,
};
use tokio::runtime::{Builder, Runtime};

use crate::{AsyncDuelCore, DuelCore};

/// Outcome of one scenario.
pub type Check = Result<(), String>;

fn ensure(condition: bool, what: impl Into<String>) -> Check {
    if condition {
        Ok(())
    } else {
        Err(what.into())
    }
}

const SCRIPT: &str = "-- empty";

fn card(code: u32) -> Option<CardData> {
    (code == 12345).then(|| CardData {
        code,
        setcodes: vec![0x1, 0x2, 0x3],
        ..CardData::default()
    })
}

fn script(name: &str) -> Option<String> {
    (name == "c4.lua").then(|| SCRIPT.to_owned())
}

fn legacy_script(name: &str) -> Option<LegacyScript> {
    script(name).map(|content| {
        let length = u32::try_from(content.len()).unwrap_or(u32::MAX);
        LegacyScript { content, length }
    })
}

struct Library;

#[async_trait]
impl AsyncCardReader for Library {
    async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
        tokio::task::yield_now().await;
        Ok(card(code))
    }
}

#[async_trait]
impl AsyncScriptReader for Library {
    async fn read_script(&self, _duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        tokio::task::yield_now().await;
        Ok(script(name))
    }
}

#[async_trait]
impl AsyncLegacyScriptReader for Library {
    async fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>> {
        tokio::task::yield_now().await;
        Ok(legacy_script(name))
    }
}

struct ClosedLog;

#[async_trait]
impl AsyncLogHandler for ClosedLog {
    async fn log(&self, _kind: LogType, _message: &str) -> HandlerResult<()> {
        Err(HandlerError::failed("log sink closed"))
    }
}

fn closed_log(_kind: LogType, _text: &str) -> HandlerResult<()> {
    Err(HandlerError::failed("log sink closed"))
}

/// Blocking options of the config's generation.
fn blocking_options(config: AnyDuelConfig, failing_log: bool) -> AnyDuelOptions {
    let mut handlers = HostHandlers::new(
        |code: u32| -> HandlerResult<Option<CardData>> { Ok(card(code)) },
        |_duel: DuelHandle, name: &str| -> HandlerResult<Option<String>> { Ok(script(name)) },
    );
    if failing_log {
        handlers = handlers.with_log_handler(closed_log);
    }
    match config {
        AnyDuelConfig::V1(config) => AnyDuelOptions::V1(DuelOptionsV1 {
            config,
            card_reader: handlers.card_reader,
            script_reader: Box::new(|name: &str| -> HandlerResult<Option<LegacyScript>> {
                Ok(legacy_script(name))
            }),
            log_handler: handlers.log_handler,
        }),
        AnyDuelConfig::V2(config) => AnyDuelOptions::V2(DuelOptionsV2 { config, handlers }),
        AnyDuelConfig::V3(config) => AnyDuelOptions::V3(DuelOptionsV3 { config, handlers }),
    }
}

/// Suspending options of the config's generation.
fn suspending_options(config: AnyDuelConfig, failing_log: bool) -> AsyncAnyDuelOptions {
    let log_handler: Option<Arc<dyn AsyncLogHandler>> =
        failing_log.then(|| Arc::new(ClosedLog) as Arc<dyn AsyncLogHandler>);
    let mut handlers = AsyncHostHandlers::new(Library, Library);
    handlers.log_handler = log_handler.clone();
    match config {
        AnyDuelConfig::V1(config) => AsyncAnyDuelOptions::V1(AsyncDuelOptionsV1 {
            config,
            card_reader: Arc::new(Library),
            script_reader: Arc::new(Library),
            log_handler,
        }),
        AnyDuelConfig::V2(config) => AsyncAnyDuelOptions::V2(AsyncDuelOptionsV2 { config, handlers }),
        AnyDuelConfig::V3(config) => AsyncAnyDuelOptions::V3(AsyncDuelOptionsV3 { config, handlers }),
    }
}

/// What one `process` call left behind.
struct Outcome {
    journal: Journal,
    stats: LedgerStats,
    status: i32,
}

/// Runs scenarios under one calling convention.
pub struct GoldenPath {
    config: AnyDuelConfig,
    runtime: Option<Runtime>,
}

impl GoldenPath {
    /// Runner for `config`; a suspending convention gets its own runtime.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`](ocgbridge_core::BridgeError::InvalidConfig)
    /// for a bad duel section or a runtime that cannot start.
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        let runtime = match config.relay.convention {
            Convention::Blocking => None,
            Convention::Suspending => Some(
                Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                    .map_err(|err| ocgbridge_core::BridgeError::InvalidConfig(err.to_string()))?,
            ),
        };
        Ok(Self {
            config: config.duel.to_any_config()?,
            runtime,
        })
    }

    /// Convention in use.
    #[must_use]
    pub fn convention(&self) -> Convention {
        if self.runtime.is_some() {
            Convention::Suspending
        } else {
            Convention::Blocking
        }
    }

    fn drive(&self, config: AnyDuelConfig, steps: Vec<Step>, failing_log: bool) -> Result<Outcome, String> {
        let engine = MockEngine::new(steps);
        match &self.runtime {
            None => {
                let core = DuelCore::new(engine);
                let mut duel = core
                    .create_duel(blocking_options(config, failing_log))
                    .map_err(|err| err.to_string())?;
                let status = duel.process();
                Ok(Outcome {
                    journal: core.engine().journal(),
                    stats: core.ledger().stats(),
                    status,
                })
            }
            Some(runtime) => runtime.block_on(async {
                let core = AsyncDuelCore::new(engine, runtime.handle().clone());
                let duel = core
                    .create_duel(suspending_options(config, failing_log))
                    .await
                    .map_err(|err| err.to_string())?;
                let status = duel.process().await.map_err(|err| err.to_string())?;
                Ok::<_, String>(Outcome {
                    journal: core.engine().journal(),
                    stats: core.ledger().stats(),
                    status,
                })
            }),
        }
    }

    fn seed_widening(&self) -> Check {
        let config = AnyDuelConfig::V1(DuelConfigV1 { seed: 42, ..DuelConfigV1::default() });
        let outcome = self.drive(config, Vec::new(), false)?;
        let seed = outcome.journal.created.first().map(|config| config.seed);
        ensure(seed == Some([42, 0, 0, 0]), format!("canonical seed {seed:?}"))
    }

    fn script_ingested(&self) -> Check {
        let outcome = self.drive(self.config, vec![Step::RequestScript("c4.lua".into())], false)?;
        let ingested = outcome.journal.ingested.first().ok_or("nothing ingested")?;
        ensure(
            ingested.len == SCRIPT.len() && ingested.name == "c4.lua",
            format!("ingested {ingested:?}"),
        )?;
        ensure(outcome.journal.script_statuses == [OPERATION_SUCCEEDED], "script status")?;
        ensure(outcome.stats.outstanding == 0, "script buffer leaked")
    }

    fn missing_script(&self) -> Check {
        let outcome = self.drive(self.config, vec![Step::RequestScript("c5.lua".into())], false)?;
        ensure(outcome.journal.ingested.is_empty(), "missing script was ingested")?;
        ensure(outcome.journal.script_statuses == [OPERATION_FAILED], "sentinel not reported")?;
        ensure(outcome.stats.acquired == 0, "buffer acquired for missing script")
    }

    fn set_codes_freed(&self) -> Check {
        let outcome = self.drive(self.config, vec![Step::RequestCard(12345)], false)?;
        let read = outcome.journal.card_reads.first().ok_or("no card read")?;
        ensure(
            read.set_codes.as_deref() == Some(&[1, 2, 3, 0][..]),
            format!("set codes {:?}", read.set_codes),
        )?;
        ensure(outcome.journal.cards_done == 1, "done signal missing")?;
        ensure(
            outcome.stats.acquired == 1 && outcome.stats.released == 1,
            format!(
                "set codes acquired {} released {}",
                outcome.stats.acquired, outcome.stats.released
            ),
        )
    }

    fn log_fault_swallowed(&self) -> Check {
        let steps = vec![
            Step::Log(LogType::FromScript, "hello".into()),
            Step::Status(ProcessStatus::Continue),
        ];
        let outcome = self.drive(self.config, steps, true)?;
        ensure(
            outcome.status == ProcessStatus::Continue as i32,
            format!("process returned {}", outcome.status),
        )
    }

    /// Runs every scenario in order.
    #[must_use]
    pub fn run(&self) -> Vec<(&'static str, Check)> {
        tracing::debug!("golden path under the {:?} convention", self.convention());
        vec![
            ("A  generation-1 seed widening", self.seed_widening()),
            ("B  script ingested and freed", self.script_ingested()),
            ("C  missing script sentinel", self.missing_script()),
            ("D  set codes freed after done", self.set_codes_freed()),
            ("E  log fault swallowed", self.log_fault_swallowed()),
        ]
    }
}
