//! Host-supplied option records (config plus handlers) per generation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;

use crate::engine::DuelHandle;
use crate::error::HandlerResult;
use crate::memory::BufferLedger;
use crate::relay::{
    AsyncCardReader, AsyncHostHandlers, AsyncLogHandler, AsyncScriptReader, BlockingRelay,
    CardReader, EngineHooks, HostHandlers, LogHandler, ScriptReader, SuspendingRelay,
};

use super::generations::{AnyDuelConfig, DuelConfig, DuelConfigV1, DuelConfigV2, OptionsGeneration};

/// First-generation script result: text plus the length the host computed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyScript {
    /// Source text.
    pub content: String,
    /// Length as reported by the host.
    pub length: u32,
}

/// First-generation script hook: by name only, returns a [`LegacyScript`].
pub trait LegacyScriptReader: Send + Sync {
    /// Looks up `name`.
    ///
    /// # Errors
    ///
    /// Any lookup fault.
    fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>>;
}

impl<F> LegacyScriptReader for F
where
    F: Fn(&str) -> HandlerResult<Option<LegacyScript>> + Send + Sync,
{
    fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>> {
        self(name)
    }
}

/// Suspending first-generation script hook.
#[async_trait]
pub trait AsyncLegacyScriptReader: Send + Sync {
    /// See [`LegacyScriptReader::read_script`].
    async fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>>;
}

/// The byte length of `content` is what the engine receives; a differing
/// `length` field is logged and ignored.
fn legacy_content(name: &str, script: LegacyScript) -> String {
    if script.length as usize != script.content.len() {
        tracing::debug!(
            "legacy script {} reports length {}, using byte length {}",
            name,
            script.length,
            script.content.len()
        );
    }
    script.content
}

/// Presents a [`LegacyScriptReader`] as the canonical [`ScriptReader`].
struct LegacyScriptAdapter(Box<dyn LegacyScriptReader>);

impl ScriptReader for LegacyScriptAdapter {
    fn read_script(&self, _duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        Ok(self.0.read_script(name)?.map(|script| legacy_content(name, script)))
    }
}

/// Presents an [`AsyncLegacyScriptReader`] as the canonical
/// [`AsyncScriptReader`].
struct AsyncLegacyScriptAdapter(Arc<dyn AsyncLegacyScriptReader>);

#[async_trait]
impl AsyncScriptReader for AsyncLegacyScriptAdapter {
    async fn read_script(&self, _duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        Ok(self.0.read_script(name).await?.map(|script| legacy_content(name, script)))
    }
}

/// First-generation options.
pub struct DuelOptionsV1 {
    /// Configuration.
    pub config: DuelConfigV1,
    /// Card hook.
    pub card_reader: Box<dyn CardReader>,
    /// Legacy script hook.
    pub script_reader: Box<dyn LegacyScriptReader>,
    /// Log hook.
    pub log_handler: Option<Box<dyn LogHandler>>,
}

/// Second-generation options.
pub struct DuelOptionsV2 {
    /// Configuration.
    pub config: DuelConfigV2,
    /// Hooks.
    pub handlers: HostHandlers,
}

/// Current-generation options.
pub struct DuelOptionsV3 {
    /// Configuration.
    pub config: DuelConfig,
    /// Hooks.
    pub handlers: HostHandlers,
}

/// Options of any generation, for the blocking convention.
pub enum AnyDuelOptions {
    /// First generation.
    V1(DuelOptionsV1),
    /// Second generation.
    V2(DuelOptionsV2),
    /// Current generation.
    V3(DuelOptionsV3),
}

impl AnyDuelOptions {
    /// Generation of the record.
    #[must_use]
    pub const fn generation(&self) -> OptionsGeneration {
        match self {
            Self::V1(_) => OptionsGeneration::V1,
            Self::V2(_) => OptionsGeneration::V2,
            Self::V3(_) => OptionsGeneration::V3,
        }
    }

    /// Canonical config and handlers.
    #[must_use]
    pub fn normalize(self) -> (DuelConfig, HostHandlers) {
        match self {
            Self::V1(v1) => (
                AnyDuelConfig::V1(v1.config).normalize(),
                HostHandlers {
                    card_reader: v1.card_reader,
                    script_reader: Box::new(LegacyScriptAdapter(v1.script_reader)),
                    log_handler: v1.log_handler,
                },
            ),
            Self::V2(v2) => (AnyDuelConfig::V2(v2.config).normalize(), v2.handlers),
            Self::V3(v3) => (AnyDuelConfig::V3(v3.config).normalize(), v3.handlers),
        }
    }

    /// Canonical engine options with the blocking relay injected.
    #[must_use]
    pub fn into_engine_options(self, ledger: &BufferLedger) -> DuelOptions {
        let generation = self.generation();
        let (config, handlers) = self.normalize();
        tracing::debug!("normalized {:?} options (blocking relay)", generation);
        DuelOptions {
            config,
            hooks: EngineHooks::new(Arc::new(BlockingRelay::new(handlers, ledger.clone()))),
        }
    }
}

/// First-generation options, suspending convention.
pub struct AsyncDuelOptionsV1 {
    /// Configuration.
    pub config: DuelConfigV1,
    /// Card hook.
    pub card_reader: Arc<dyn AsyncCardReader>,
    /// Legacy script hook.
    pub script_reader: Arc<dyn AsyncLegacyScriptReader>,
    /// Log hook.
    pub log_handler: Option<Arc<dyn AsyncLogHandler>>,
}

/// Second-generation options, suspending convention.
pub struct AsyncDuelOptionsV2 {
    /// Configuration.
    pub config: DuelConfigV2,
    /// Hooks.
    pub handlers: AsyncHostHandlers,
}

/// Current-generation options, suspending convention.
pub struct AsyncDuelOptionsV3 {
    /// Configuration.
    pub config: DuelConfig,
    /// Hooks.
    pub handlers: AsyncHostHandlers,
}

/// Options of any generation, for the suspending convention.
pub enum AsyncAnyDuelOptions {
    /// First generation.
    V1(AsyncDuelOptionsV1),
    /// Second generation.
    V2(AsyncDuelOptionsV2),
    /// Current generation.
    V3(AsyncDuelOptionsV3),
}

impl AsyncAnyDuelOptions {
    /// Generation of the record.
    #[must_use]
    pub const fn generation(&self) -> OptionsGeneration {
        match self {
            Self::V1(_) => OptionsGeneration::V1,
            Self::V2(_) => OptionsGeneration::V2,
            Self::V3(_) => OptionsGeneration::V3,
        }
    }

    /// Canonical config and handlers.
    #[must_use]
    pub fn normalize(self) -> (DuelConfig, AsyncHostHandlers) {
        match self {
            Self::V1(v1) => (
                AnyDuelConfig::V1(v1.config).normalize(),
                AsyncHostHandlers {
                    card_reader: v1.card_reader,
                    script_reader: Arc::new(AsyncLegacyScriptAdapter(v1.script_reader)),
                    log_handler: v1.log_handler,
                },
            ),
            Self::V2(v2) => (AnyDuelConfig::V2(v2.config).normalize(), v2.handlers),
            Self::V3(v3) => (AnyDuelConfig::V3(v3.config).normalize(), v3.handlers),
        }
    }

    /// Canonical engine options with the suspending relay injected.
    #[must_use]
    pub fn into_engine_options(self, runtime: Handle, ledger: &BufferLedger) -> DuelOptions {
        let generation = self.generation();
        let (config, handlers) = self.normalize();
        tracing::debug!("normalized {:?} options (suspending relay)", generation);
        DuelOptions {
            config,
            hooks: EngineHooks::new(Arc::new(SuspendingRelay::new(
                handlers,
                runtime,
                ledger.clone(),
            ))),
        }
    }
}

/// Canonical, engine-facing duel options.
#[derive(Clone, Debug)]
pub struct DuelOptions {
    /// Canonical configuration.
    pub config: DuelConfig,
    /// Injected relay entry points.
    pub hooks: EngineHooks,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardData;
    use crate::relay::CallbackRelay;

    fn no_cards(_: u32) -> HandlerResult<Option<CardData>> {
        Ok(None)
    }

    fn legacy(name: &str) -> HandlerResult<Option<LegacyScript>> {
        Ok(Some(LegacyScript {
            content: format!("-- {name}"),
            length: 3,
        }))
    }

    struct NoCards;

    #[async_trait]
    impl AsyncCardReader for NoCards {
        async fn read_card(&self, code: u32) -> HandlerResult<Option<CardData>> {
            no_cards(code)
        }
    }

    struct LegacyStore;

    #[async_trait]
    impl AsyncLegacyScriptReader for LegacyStore {
        async fn read_script(&self, name: &str) -> HandlerResult<Option<LegacyScript>> {
            tokio::task::yield_now().await;
            legacy(name)
        }
    }

    #[tokio::test]
    async fn test_async_v1_script_reader_is_adapted() {
        let options = AsyncAnyDuelOptions::V1(AsyncDuelOptionsV1 {
            config: DuelConfigV1 { seed: 7, ..DuelConfigV1::default() },
            card_reader: Arc::new(NoCards),
            script_reader: Arc::new(LegacyStore),
            log_handler: None,
        });
        assert_eq!(options.generation(), OptionsGeneration::V1);

        let (config, handlers) = options.normalize();
        assert_eq!(config.seed, [7, 0, 0, 0]);
        let script = handlers.script_reader.read_script(DuelHandle(1), "c4.lua").await.unwrap();
        assert_eq!(script.as_deref(), Some("-- c4.lua"));
    }

    #[test]
    fn test_v1_script_reader_is_adapted() {
        let options = AnyDuelOptions::V1(DuelOptionsV1 {
            config: DuelConfigV1 { seed: 42, ..DuelConfigV1::default() },
            card_reader: Box::new(no_cards),
            script_reader: Box::new(legacy),
            log_handler: None,
        });
        let (config, handlers) = options.normalize();
        assert_eq!(config.seed, [42, 0, 0, 0]);

        let relay = BlockingRelay::new(handlers, BufferLedger::new());
        let source = relay.script_source(DuelHandle(1), "c4.lua").unwrap();
        assert_eq!(source.as_slice(), b"-- c4.lua");
    }
}
