//! Host handler capabilities, one trait per engine hook.
//!
//! `Ok(None)` is a legitimate "not found". `Err` and panics are faults that
//! the relay swallows.

use std::sync::Arc;

use async_trait::async_trait;

use crate::card::CardData;
use crate::engine::DuelHandle;
use crate::error::HandlerResult;
use crate::types::LogType;

/// Looks up card data by passcode.
pub trait CardReader: Send + Sync {
    /// Returns the card, or `None` if the database has no such code.
    ///
    /// # Errors
    ///
    /// Any lookup fault; the engine sees it as "no such card".
    fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>>;
}

impl<F> CardReader for F
where
    F: Fn(u32) -> HandlerResult<Option<CardData>> + Send + Sync,
{
    fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
        self(code)
    }
}

/// Looks up script source by file name.
pub trait ScriptReader: Send + Sync {
    /// Returns the script text, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Any lookup fault; the engine sees it as "script not found".
    fn read_script(&self, duel: DuelHandle, name: &str) -> HandlerResult<Option<String>>;
}

impl<F> ScriptReader for F
where
    F: Fn(DuelHandle, &str) -> HandlerResult<Option<String>> + Send + Sync,
{
    fn read_script(&self, duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        self(duel, name)
    }
}

/// Receives engine log output.
pub trait LogHandler: Send + Sync {
    /// Handles one log line.
    ///
    /// # Errors
    ///
    /// Any fault; the line is dropped.
    fn log(&self, kind: LogType, message: &str) -> HandlerResult<()>;
}

impl<F> LogHandler for F
where
    F: Fn(LogType, &str) -> HandlerResult<()> + Send + Sync,
{
    fn log(&self, kind: LogType, message: &str) -> HandlerResult<()> {
        self(kind, message)
    }
}

/// Suspending card lookup.
#[async_trait]
pub trait AsyncCardReader: Send + Sync {
    /// See [`CardReader::read_card`].
    async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>>;
}

/// Suspending script lookup.
#[async_trait]
pub trait AsyncScriptReader: Send + Sync {
    /// See [`ScriptReader::read_script`].
    async fn read_script(&self, duel: DuelHandle, name: &str) -> HandlerResult<Option<String>>;
}

/// Suspending log sink.
#[async_trait]
pub trait AsyncLogHandler: Send + Sync {
    /// See [`LogHandler::log`].
    async fn log(&self, kind: LogType, message: &str) -> HandlerResult<()>;
}

/// Handlers for the blocking convention.
pub struct HostHandlers {
    /// Card-data hook.
    pub card_reader: Box<dyn CardReader>,
    /// Script hook.
    pub script_reader: Box<dyn ScriptReader>,
    /// Log hook. Lines are routed to `tracing` when absent.
    pub log_handler: Option<Box<dyn LogHandler>>,
}

impl HostHandlers {
    /// Handlers without a log sink.
    #[must_use]
    pub fn new(card_reader: impl CardReader + 'static, script_reader: impl ScriptReader + 'static) -> Self {
        Self {
            card_reader: Box::new(card_reader),
            script_reader: Box::new(script_reader),
            log_handler: None,
        }
    }

    /// Installs a log sink.
    #[must_use]
    pub fn with_log_handler(mut self, log_handler: impl LogHandler + 'static) -> Self {
        self.log_handler = Some(Box::new(log_handler));
        self
    }
}

/// Handlers for the suspending convention.
#[derive(Clone)]
pub struct AsyncHostHandlers {
    /// Card-data hook.
    pub card_reader: Arc<dyn AsyncCardReader>,
    /// Script hook.
    pub script_reader: Arc<dyn AsyncScriptReader>,
    /// Log hook.
    pub log_handler: Option<Arc<dyn AsyncLogHandler>>,
}

impl AsyncHostHandlers {
    /// Handlers without a log sink.
    #[must_use]
    pub fn new(
        card_reader: impl AsyncCardReader + 'static,
        script_reader: impl AsyncScriptReader + 'static,
    ) -> Self {
        Self {
            card_reader: Arc::new(card_reader),
            script_reader: Arc::new(script_reader),
            log_handler: None,
        }
    }

    /// Installs a log sink.
    #[must_use]
    pub fn with_log_handler(mut self, log_handler: impl AsyncLogHandler + 'static) -> Self {
        self.log_handler = Some(Arc::new(log_handler));
        self
    }
}
