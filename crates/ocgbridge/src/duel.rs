//! # Blocking Duel Surface
//!
//! Host handlers run inline on the thread that called into the engine.

use ocgbridge_core::relay::script;
use ocgbridge_core::wire::{self, CardQuery, FieldState, Message, MessageFrame, Response};
use ocgbridge_core::{
    AnyDuelOptions, BridgeError, BridgeResult, BufferLedger, DuelHandle, Engine, EngineDuel,
    NewCardInfo, QueryInfo, ScriptSink,
};

/// Entry point for creating duels on one engine.
#[derive(Debug)]
pub struct DuelCore<E: Engine> {
    engine: E,
    ledger: BufferLedger,
}

impl<E: Engine> DuelCore<E> {
    /// Core over `engine` with a fresh ledger.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_ledger(engine, BufferLedger::new())
    }

    /// Core sharing an existing ledger.
    #[must_use]
    pub fn with_ledger(engine: E, ledger: BufferLedger) -> Self {
        Self { engine, ledger }
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
    /// [`BridgeError::CreationFailed`] with the engine's status.
    pub fn create_duel(&self, options: AnyDuelOptions) -> BridgeResult<Duel<E::Duel>> {
        let generation = options.generation();
        let options = options.into_engine_options(&self.ledger);
        let inner = self.engine.create_duel(options).map_err(|status| {
            tracing::warn!("engine refused {:?} options: {:?}", generation, status);
            BridgeError::CreationFailed(status)
        })?;

        tracing::debug!("created {:?} from {:?} options", inner.handle(), generation);
        Ok(Duel {
            inner,
            ledger: self.ledger.clone(),
        })
    }
}

/// One live duel. Dropping it destroys the engine duel.
pub struct Duel<D: EngineDuel> {
    inner: D,
    ledger: BufferLedger,
}

impl<D: EngineDuel> Duel<D> {
    /// Handle naming this duel.
    #[must_use]
    pub fn handle(&self) -> DuelHandle {
        self.inner.handle()
    }

    /// Places a card.
    pub fn new_card(&mut self, info: &NewCardInfo) {
        self.inner.new_card(info);
    }

    /// Starts the duel.
    pub fn start(&mut self) {
        self.inner.start();
    }

    /// Advances the duel; returns the engine's raw `ProcessStatus`.
    pub fn process(&mut self) -> i32 {
        let status = self.inner.process();
        tracing::trace!("{:?} processed: {}", self.inner.handle(), status);
        status
    }

    /// Messages produced since the last call. Valid until the next call.
    pub fn message(&mut self) -> &[u8] {
        self.inner.message()
    }

    /// Message buffer split into frames.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the engine buffer is malformed.
    pub fn messages(&mut self) -> BridgeResult<Vec<MessageFrame<'_>>> {
        wire::split_messages(self.inner.message())
    }

    /// Message buffer decoded by type.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the engine buffer is malformed.
    pub fn decoded_messages(&mut self) -> BridgeResult<Vec<Message<'_>>> {
        wire::decode_messages(self.inner.message())
    }

    /// Submits the player's response.
    pub fn set_response(&mut self, response: &[u8]) {
        self.inner.set_response(response);
    }

    /// Encodes and submits a typed response.
    pub fn respond(&mut self, response: &Response) {
        self.inner.set_response(&response.encode());
    }

    /// Loads a script directly. The source is copied into a ledger buffer
    /// and released once the engine has ingested it.
    pub fn load_script(&mut self, source: &[u8], name: &str) -> i32 {
        let buffer = self.ledger.adopt(source.to_vec());
        script::ingest(buffer, &mut DuelSink(&mut self.inner), name).status()
    }

    /// Number of cards in `location` of `team`.
    pub fn query_count(&mut self, team: u8, location: u32) -> u32 {
        self.inner.query_count(team, location)
    }

    /// Raw single-card query buffer.
    pub fn query(&mut self, info: &QueryInfo) -> &[u8] {
        self.inner.query(info)
    }

    /// Raw location query buffer.
    pub fn query_location(&mut self, info: &QueryInfo) -> &[u8] {
        self.inner.query_location(info)
    }

    /// Raw field query buffer.
    pub fn query_field(&mut self) -> &[u8] {
        self.inner.query_field()
    }

    /// Decoded single-card query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the engine buffer is malformed.
    pub fn card(&mut self, info: &QueryInfo) -> BridgeResult<Option<CardQuery>> {
        wire::decode_card(self.inner.query(info))
    }

    /// Decoded location query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the engine buffer is malformed.
    pub fn location(&mut self, info: &QueryInfo) -> BridgeResult<Vec<Option<CardQuery>>> {
        wire::decode_location(self.inner.query_location(info))
    }

    /// Decoded field query.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the engine buffer is malformed.
    pub fn field(&mut self) -> BridgeResult<FieldState> {
        wire::decode_field(self.inner.query_field())
    }

    /// Destroys the duel.
    pub fn destroy(self) {
        tracing::debug!("destroying {:?}", self.inner.handle());
    }
}

/// [`ScriptSink`] over a duel's own load entry point.
pub(crate) struct DuelSink<'a, D: EngineDuel>(pub(crate) &'a mut D);

impl<D: EngineDuel> ScriptSink for DuelSink<'_, D> {
    fn duel(&self) -> DuelHandle {
        self.0.handle()
    }

    fn ingest(&mut self, source: &[u8], name: &str) -> i32 {
        self.0.load_script(source, name)
    }
}

#[cfg(test)]
mod tests {
    use ocgbridge_core::testing::{MockEngine, Step};
    use ocgbridge_core::{
        CardData, DuelConfigV2, DuelCreationStatus, DuelOptionsV2, HandlerResult, HostHandlers,
        Location, Position, ProcessStatus, OPERATION_FAILED, OPERATION_SUCCEEDED,
    };

    use super::*;

    fn cards(code: u32) -> HandlerResult<Option<CardData>> {
        Ok(Some(CardData { code, ..CardData::default() }))
    }

    fn scripts(_duel: DuelHandle, _name: &str) -> HandlerResult<Option<String>> {
        Ok(None)
    }

    fn options() -> AnyDuelOptions {
        AnyDuelOptions::V2(DuelOptionsV2 {
            config: DuelConfigV2::default(),
            handlers: HostHandlers::new(cards, scripts),
        })
    }

    #[test]
    fn test_creation_failure_is_reported() {
        let core = DuelCore::new(MockEngine::new(Vec::new()).fail_creation(DuelCreationStatus::NullScriptReader));

        let result = core.create_duel(options());

        assert!(matches!(
            result,
            Err(BridgeError::CreationFailed(DuelCreationStatus::NullScriptReader))
        ));
        assert!(core.engine().journal().created.is_empty());
    }

    #[test]
    fn test_passthrough_calls_reach_engine() {
        let core = DuelCore::new(MockEngine::new(vec![
            Step::Message(vec![2, 0, 0, 0, 40, 7]),
            Step::Status(ProcessStatus::Awaiting),
        ]));
        let mut duel = core.create_duel(options()).unwrap();

        duel.new_card(&NewCardInfo {
            team: 0,
            duelist: 0,
            code: 55_144_522,
            controller: 0,
            location: Location::DECK,
            sequence: 0,
            position: Position::FACEDOWN_DEFENSE,
        });
        duel.start();
        assert_eq!(duel.query_count(0, Location::DECK), 1);
        assert_eq!(duel.process(), ProcessStatus::Awaiting as i32);

        let frames = duel.messages().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].kind, frames[0].body), (40, &[7][..]));
        assert!(duel.message().is_empty());

        duel.set_response(&[1, 0, 0, 0]);
        let journal = core.engine().journal();
        assert_eq!(journal.started, 1);
        assert_eq!(journal.responses, vec![vec![1, 0, 0, 0]]);
        assert_eq!(journal.cards_done, 1);
    }

    #[test]
    fn test_prompt_decoded_and_answered() {
        let mut prompt = vec![10, 0, 0, 0, 13, 1];
        prompt.extend_from_slice(&99u64.to_le_bytes());
        let core = DuelCore::new(MockEngine::new(vec![
            Step::Message(prompt),
            Step::Status(ProcessStatus::Awaiting),
        ]));
        let mut duel = core.create_duel(options()).unwrap();

        assert_eq!(duel.process(), ProcessStatus::Awaiting as i32);
        assert_eq!(
            duel.decoded_messages().unwrap(),
            vec![Message::SelectYesNo { player: 1, description: 99 }]
        );
        duel.respond(&Response::SelectYesNo { yes: true });

        assert_eq!(core.engine().journal().responses, vec![vec![1, 0, 0, 0]]);
    }

    #[test]
    fn test_direct_script_load_releases_buffer() {
        let core = DuelCore::new(MockEngine::new(Vec::new()).reject_script("bad.lua"));
        let mut duel = core.create_duel(options()).unwrap();

        assert_eq!(duel.load_script(b"Debug.Message('x')", "init.lua"), OPERATION_SUCCEEDED);
        assert_eq!(duel.load_script(b"error", "bad.lua"), OPERATION_FAILED);

        let stats = core.ledger().stats();
        assert_eq!((stats.acquired, stats.released), (2, 2));
        let ingested = core.engine().journal().ingested;
        assert_eq!(ingested[0].len, 18);
        assert_eq!(ingested[1].status, OPERATION_FAILED);
    }

    #[test]
    fn test_destroy_reaches_engine() {
        let core = DuelCore::new(MockEngine::new(Vec::new()));
        let duel = core.create_duel(options()).unwrap();
        let handle = duel.handle();

        duel.destroy();

        assert_eq!(core.engine().journal().destroyed, vec![handle]);
    }
}
