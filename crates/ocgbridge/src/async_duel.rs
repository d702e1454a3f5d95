//! # Suspending Duel Surface
//!
//! Every engine call runs on the runtime's blocking pool. While the engine
//! waits on a hook, the host future behind it runs on the same runtime, so
//! handlers may await network or disk work without stalling other tasks.
//!
//! ```text
//! host task ──await──▶ spawn_blocking(engine call) ──hook──▶ block_on(handler)
//!     ▲                                                          │
//!     └──────────────────────── result ◀─────────────────────────┘
//! ```
//!
//! One duel serializes through a mutex held for a single engine call.
//! Engine buffers are copied out before the call returns.

use std::sync::Arc;

use ocgbridge_core::relay::script;
use ocgbridge_core::wire::{self, CardQuery, FieldState, Message, Response};
use ocgbridge_core::{
    AsyncAnyDuelOptions, BridgeError, BridgeResult, BufferLedger, DuelHandle, Engine, EngineDuel,
    NewCardInfo, QueryInfo,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::duel::DuelSink;

/// Entry point for creating suspending duels on one engine.
pub struct AsyncDuelCore<E: Engine> {
    engine: Arc<E>,
    runtime: Handle,
    ledger: BufferLedger,
}

impl<E: Engine> AsyncDuelCore<E>
where
    E::Duel: 'static,
{
    /// Core over `engine`; handlers are driven on `runtime`.
    #[must_use]
    pub fn new(engine: E, runtime: Handle) -> Self {
        Self {
            engine: Arc::new(engine),
            runtime,
            ledger: BufferLedger::new(),
        }
    }

    /// Core on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Outside a Tokio runtime.
    #[must_use]
    pub fn current(engine: E) -> Self {
        Self::new(engine, Handle::current())
    }

    /// Engine API version.
    #[must_use]
    pub fn version(&self) -> (i32, i32) {
        self.engine.version()
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Ledger counting every transient buffer handed across.
    #[must_use]
    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    /// Normalizes `options` and creates a duel.
    ///
    /// # Errors
    ///
    /// [`BridgeError::CreationFailed`] with the engine's status, or
    /// [`BridgeError::EngineTask`] if the creating task died.
    pub async fn create_duel(
        &self,
        options: AsyncAnyDuelOptions,
    ) -> BridgeResult<AsyncDuel<E::Duel>> {
        let generation = options.generation();
        let options = options.into_engine_options(self.runtime.clone(), &self.ledger);
        let engine = Arc::clone(&self.engine);

        let inner = self
            .runtime
            .spawn_blocking(move || engine.create_duel(options))
            .await
            .map_err(|err| BridgeError::EngineTask(format!("create_duel: {err}")))?
            .map_err(|status| {
                tracing::warn!("engine refused {:?} options: {:?}", generation, status);
                BridgeError::CreationFailed(status)
            })?;

        let handle = inner.handle();
        tracing::debug!("created {:?} from {:?} options (suspending)", handle, generation);
        Ok(AsyncDuel {
            inner: Arc::new(Mutex::new(inner)),
            handle,
            runtime: self.runtime.clone(),
            ledger: self.ledger.clone(),
        })
    }
}

/// One live suspending duel.
pub struct AsyncDuel<D: EngineDuel> {
    inner: Arc<Mutex<D>>,
    handle: DuelHandle,
    runtime: Handle,
    ledger: BufferLedger,
}

impl<D: EngineDuel + 'static> AsyncDuel<D> {
    async fn call<R, F>(&self, op: &'static str, f: F) -> BridgeResult<R>
    where
        F: FnOnce(&mut D) -> R + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.runtime
            .spawn_blocking(move || f(&mut *inner.lock()))
            .await
            .map_err(|err| BridgeError::EngineTask(format!("{op}: {err}")))
    }

    /// Handle naming this duel.
    #[must_use]
    pub fn handle(&self) -> DuelHandle {
        self.handle
    }

    /// Places a card. May suspend on the card-data hook.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn new_card(&self, info: NewCardInfo) -> BridgeResult<()> {
        self.call("new_card", move |duel| duel.new_card(&info)).await
    }

    /// Starts the duel.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn start(&self) -> BridgeResult<()> {
        self.call("start", |duel| duel.start()).await
    }

    /// Advances the duel; returns the engine's raw `ProcessStatus`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn process(&self) -> BridgeResult<i32> {
        let status = self.call("process", |duel| duel.process()).await?;
        tracing::trace!("{:?} processed: {}", self.handle, status);
        Ok(status)
    }

    /// Copy of the messages produced since the last call.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn message(&self) -> BridgeResult<Vec<u8>> {
        self.with_message(<[u8]>::to_vec).await
    }

    /// Runs `f` over the message buffer without copying it.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn with_message<R, F>(&self, f: F) -> BridgeResult<R>
    where
        F: FnOnce(&[u8]) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call("get_message", move |duel| f(duel.message())).await
    }

    /// Runs `f` over the decoded messages without copying the buffer.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] or [`BridgeError::EngineTask`].
    pub async fn with_decoded_messages<R, F>(&self, f: F) -> BridgeResult<R>
    where
        F: FnOnce(&[Message<'_>]) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.call("get_message", move |duel| {
            wire::decode_messages(duel.message()).map(|messages| f(&messages))
        })
        .await?
    }

    /// Submits the player's response.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn set_response(&self, response: Vec<u8>) -> BridgeResult<()> {
        self.call("set_response", move |duel| duel.set_response(&response)).await
    }

    /// Encodes and submits a typed response.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn respond(&self, response: Response) -> BridgeResult<()> {
        self.set_response(response.encode()).await
    }

    /// Loads a script directly; returns the engine's status.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn load_script(&self, source: Vec<u8>, name: String) -> BridgeResult<i32> {
        let buffer = self.ledger.adopt(source);
        self.call("load_script", move |duel| {
            script::ingest(buffer, &mut DuelSink(duel), &name).status()
        })
        .await
    }

    /// Number of cards in `location` of `team`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn query_count(&self, team: u8, location: u32) -> BridgeResult<u32> {
        self.call("query_count", move |duel| duel.query_count(team, location)).await
    }

    /// Copy of a single-card query buffer.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn query(&self, info: QueryInfo) -> BridgeResult<Vec<u8>> {
        self.call("query", move |duel| duel.query(&info).to_vec()).await
    }

    /// Copy of a location query buffer.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn query_location(&self, info: QueryInfo) -> BridgeResult<Vec<u8>> {
        self.call("query_location", move |duel| duel.query_location(&info).to_vec())
            .await
    }

    /// Copy of the field query buffer.
    ///
    /// # Errors
    ///
    /// [`BridgeError::EngineTask`] if the engine call died.
    pub async fn query_field(&self) -> BridgeResult<Vec<u8>> {
        self.call("query_field", |duel| duel.query_field().to_vec()).await
    }

    /// Decoded single-card query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] or [`BridgeError::EngineTask`].
    pub async fn card(&self, info: QueryInfo) -> BridgeResult<Option<CardQuery>> {
        self.call("query", move |duel| wire::decode_card(duel.query(&info)))
            .await?
    }

    /// Decoded location query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] or [`BridgeError::EngineTask`].
    pub async fn location(&self, info: QueryInfo) -> BridgeResult<Vec<Option<CardQuery>>> {
        self.call("query_location", move |duel| {
            wire::decode_location(duel.query_location(&info))
        })
        .await?
    }

    /// Decoded field query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] or [`BridgeError::EngineTask`].
    pub async fn field(&self) -> BridgeResult<FieldState> {
        self.call("query_field", |duel| wire::decode_field(duel.query_field()))
            .await?
    }

    /// Destroys the duel.
    pub fn destroy(self) {
        tracing::debug!("destroying {:?}", self.handle);
    }
}
