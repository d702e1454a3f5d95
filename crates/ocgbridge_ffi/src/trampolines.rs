//! # Hook Trampolines
//!
//! `extern "C"` entry points the engine calls through `OCG_DuelOptions`.
//! Every trampoline recovers its [`HookPayload`] from the payload pointer
//! and forwards to [`EngineHooks`].
//!
//! ## Safety Note
//!
//! This module dereferences engine-supplied pointers. The payload pointer
//! is always the address of a live `HookPayload` owned by the duel, and
//! the engine only calls hooks while that duel exists.

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::panic::{self, AssertUnwindSafe};

use ocgbridge_core::{CardDataResponse, DuelConfig, DuelHandle, EngineHooks, ScriptSink, OPERATION_FAILED};
use parking_lot::Mutex;

use crate::abi::{OcgCardData, OcgDuel, OcgDuelOptions, OcgLoadScript};

/// Set-code array handed out for "no such card"; the engine still walks
/// it up to the terminator.
static EMPTY_SET_CODES: [u16; 1] = [0];

/// Per-duel context behind every payload pointer.
pub struct HookPayload {
    hooks: EngineHooks,
    load_script: OcgLoadScript,
    /// Responses the engine has not signalled done yet, keyed by the
    /// address of their set-code array.
    pending: Mutex<HashMap<usize, CardDataResponse>>,
}

impl HookPayload {
    /// Boxes a payload so its address is stable for the duel's lifetime.
    #[must_use]
    pub fn new(hooks: EngineHooks, load_script: OcgLoadScript) -> Box<Self> {
        Box::new(Self {
            hooks,
            load_script,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Pointer to pass as every hook payload.
    #[must_use]
    pub fn as_raw(&self) -> *mut c_void {
        std::ptr::from_ref(self).cast_mut().cast()
    }

    /// Number of card responses waiting for the done signal.
    #[must_use]
    pub fn pending_cards(&self) -> usize {
        self.pending.lock().len()
    }

    /// Engine options for `config` with all four hooks installed.
    #[must_use]
    pub fn duel_options(&self, config: &DuelConfig) -> OcgDuelOptions {
        let payload = self.as_raw();
        OcgDuelOptions {
            card_reader: Some(data_reader),
            payload1: payload,
            script_reader: Some(script_reader),
            payload2: payload,
            log_handler: Some(log_handler),
            payload3: payload,
            card_reader_done: Some(data_reader_done),
            payload4: payload,
            ..OcgDuelOptions::from_config(config)
        }
    }

    fn hold(&self, response: CardDataResponse) -> *mut u16 {
        let Some(ptr) = response
            .set_codes_with_terminator()
            .map(|codes| codes.as_ptr().cast_mut())
        else {
            return EMPTY_SET_CODES.as_ptr().cast_mut();
        };
        // The boxed array does not move when the response does.
        self.pending.lock().insert(ptr as usize, response);
        ptr
    }

    fn release(&self, setcodes: *mut u16) {
        let response = self.pending.lock().remove(&(setcodes as usize));
        match response {
            Some(response) => self.hooks.card_read_done(response),
            None => tracing::trace!("done signal for untracked set codes {:p}", setcodes),
        }
    }
}

/// Script sink over the engine's `OCG_LoadScript`.
pub struct RawScriptSink {
    duel: OcgDuel,
    load_script: OcgLoadScript,
    requested: Option<CString>,
}

impl RawScriptSink {
    /// Sink for `duel`.
    #[must_use]
    pub fn new(duel: OcgDuel, load_script: OcgLoadScript) -> Self {
        Self { duel, load_script, requested: None }
    }

    /// Sink answering the engine's request for `name`. The engine gets its
    /// own name bytes back, whatever text the host saw.
    #[must_use]
    pub fn for_request(duel: OcgDuel, load_script: OcgLoadScript, name: &CStr) -> Self {
        Self { duel, load_script, requested: Some(name.to_owned()) }
    }
}

impl ScriptSink for RawScriptSink {
    fn duel(&self) -> DuelHandle {
        DuelHandle(self.duel as usize as u64)
    }

    fn ingest(&mut self, source: &[u8], name: &str) -> i32 {
        let Ok(length) = u32::try_from(source.len()) else {
            return OPERATION_FAILED;
        };
        let converted;
        let name: &CStr = match &self.requested {
            Some(requested) => requested,
            None => match CString::new(name) {
                Ok(name) => {
                    converted = name;
                    &converted
                }
                Err(_) => return OPERATION_FAILED,
            },
        };
        // SAFETY: `source` and `name` outlive the call; the engine copies the
        // script before returning.
        unsafe { (self.load_script)(self.duel, source.as_ptr().cast(), length, name.as_ptr()) }
    }
}

/// Runs a trampoline body; a panic must not unwind into C.
fn guard<T>(hook: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|_| {
        tracing::error!("panic in {} trampoline", hook);
        fallback
    })
}

/// # Safety
///
/// `payload` must point to a live [`HookPayload`].
unsafe fn payload_ref<'a>(payload: *mut c_void) -> &'a HookPayload {
    // SAFETY: upheld by the caller.
    unsafe { &*payload.cast::<HookPayload>() }
}

fn lossy(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    // SAFETY: the engine passes NUL-terminated strings valid for the call.
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

/// `OCG_DataReader` trampoline.
///
/// # Safety
///
/// `payload` must point to a live [`HookPayload`]; `data` must be valid for
/// writes.
pub unsafe extern "C" fn data_reader(payload_ptr: *mut c_void, code: u32, data: *mut OcgCardData) {
    guard("data reader", (), || {
        // SAFETY: upheld by the caller.
        let payload = unsafe { payload_ref(payload_ptr) };
        let response = payload.hooks.read_card(code);
        let record = response.record;
        let setcodes = payload.hold(response);
        // SAFETY: `data` is the engine's out-parameter.
        unsafe { data.write(OcgCardData::from_record(&record, setcodes)) };
    });
}

/// `OCG_DataReaderDone` trampoline.
///
/// # Safety
///
/// `payload` must point to a live [`HookPayload`]; `data` must be the
/// record filled by [`data_reader`].
pub unsafe extern "C" fn data_reader_done(payload_ptr: *mut c_void, data: *mut OcgCardData) {
    guard("data reader done", (), || {
        if data.is_null() {
            return;
        }
        // SAFETY: upheld by the caller.
        let payload = unsafe { payload_ref(payload_ptr) };
        // SAFETY: `data` is valid for reads per the caller.
        let setcodes = unsafe { (*data).setcodes };
        payload.release(setcodes);
    });
}

/// `OCG_ScriptReader` trampoline.
///
/// # Safety
///
/// `payload` must point to a live [`HookPayload`]; `name` must be a
/// NUL-terminated string.
pub unsafe extern "C" fn script_reader(payload_ptr: *mut c_void, duel: OcgDuel, name: *const c_char) -> c_int {
    guard("script reader", OPERATION_FAILED, || {
        // SAFETY: upheld by the caller.
        let payload = unsafe { payload_ref(payload_ptr) };
        let mut sink = if name.is_null() {
            RawScriptSink::new(duel, payload.load_script)
        } else {
            // SAFETY: the engine passes a NUL-terminated name valid for the call.
            RawScriptSink::for_request(duel, payload.load_script, unsafe { CStr::from_ptr(name) })
        };
        payload.hooks.read_script(&mut sink, &lossy(name))
    })
}

/// `OCG_LogHandler` trampoline.
///
/// # Safety
///
/// `payload` must point to a live [`HookPayload`]; `text` must be a
/// NUL-terminated string.
pub unsafe extern "C" fn log_handler(payload_ptr: *mut c_void, text: *const c_char, kind: c_int) {
    guard("log handler", (), || {
        // SAFETY: upheld by the caller.
        let payload = unsafe { payload_ref(payload_ptr) };
        payload.hooks.log(&lossy(text), kind);
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use ocgbridge_core::{
        BlockingRelay, BufferLedger, CardData, HandlerResult, HostHandlers, LogType,
        OPERATION_SUCCEEDED,
    };

    use super::*;

    thread_local! {
        static LOADED: RefCell<Vec<(usize, Vec<u8>, u32)>> = const { RefCell::new(Vec::new()) };
    }

    unsafe extern "C" fn fake_load_script(
        duel: OcgDuel,
        _buffer: *const c_char,
        length: u32,
        name: *const c_char,
    ) -> c_int {
        let name = unsafe { CStr::from_ptr(name) }.to_bytes().to_vec();
        LOADED.with(|loaded| loaded.borrow_mut().push((duel as usize, name, length)));
        OPERATION_SUCCEEDED
    }

    fn cards(code: u32) -> HandlerResult<Option<CardData>> {
        Ok((code == 12345).then(|| CardData {
            code,
            setcodes: vec![7, 8, 9],
            ..CardData::default()
        }))
    }

    fn scripts(_duel: DuelHandle, name: &str) -> HandlerResult<Option<String>> {
        Ok((name == "c4.lua").then(|| "-- empty".to_owned()))
    }

    fn payload_with(ledger: &BufferLedger) -> Box<HookPayload> {
        let handlers = HostHandlers::new(cards, scripts).with_log_handler(
            |_kind: LogType, _text: &str| -> HandlerResult<()> { panic!("log sink gone") },
        );
        let hooks = EngineHooks::new(Arc::new(BlockingRelay::new(handlers, ledger.clone())));
        HookPayload::new(hooks, fake_load_script)
    }

    fn blank_card() -> OcgCardData {
        OcgCardData::from_record(&ocgbridge_core::CardRecord::default(), std::ptr::null_mut())
    }

    #[test]
    fn test_card_set_codes_live_until_done() {
        let ledger = BufferLedger::new();
        let payload = payload_with(&ledger);
        let mut data = blank_card();

        unsafe { data_reader(payload.as_raw(), 12345, &mut data) };
        assert_eq!(data.code, 12345);
        assert_eq!(payload.pending_cards(), 1);
        let codes = unsafe { std::slice::from_raw_parts(data.setcodes, 4) };
        assert_eq!(codes, &[7, 8, 9, 0]);

        unsafe { data_reader_done(payload.as_raw(), &mut data) };
        assert_eq!(payload.pending_cards(), 0);
        assert_eq!(ledger.stats().outstanding, 0);
        assert_eq!(ledger.stats().released, 1);

        // A repeated done signal finds nothing to free.
        unsafe { data_reader_done(payload.as_raw(), &mut data) };
        assert_eq!(ledger.stats().released, 1);
    }

    #[test]
    fn test_unknown_card_points_at_terminator() {
        let ledger = BufferLedger::new();
        let payload = payload_with(&ledger);
        let mut data = blank_card();

        unsafe { data_reader(payload.as_raw(), 1, &mut data) };
        assert_eq!(data.code, 0);
        assert!(!data.setcodes.is_null());
        assert_eq!(unsafe { *data.setcodes }, 0);
        assert_eq!(payload.pending_cards(), 0);

        unsafe { data_reader_done(payload.as_raw(), &mut data) };
        assert_eq!(ledger.stats().acquired, 0);
    }

    #[test]
    fn test_script_reader_loads_through_engine() {
        let ledger = BufferLedger::new();
        let payload = payload_with(&ledger);
        let duel = 0x5000 as OcgDuel;
        let found = CString::new("c4.lua").unwrap();
        let missing = CString::new("c5.lua").unwrap();

        let status = unsafe { script_reader(payload.as_raw(), duel, found.as_ptr()) };
        assert_eq!(status, OPERATION_SUCCEEDED);
        let status = unsafe { script_reader(payload.as_raw(), duel, missing.as_ptr()) };
        assert_eq!(status, OPERATION_FAILED);

        LOADED.with(|loaded| {
            assert_eq!(*loaded.borrow(), vec![(0x5000, b"c4.lua".to_vec(), 8)]);
        });
        assert_eq!(ledger.stats().outstanding, 0);
    }

    #[test]
    fn test_non_utf8_script_name_reaches_engine_unchanged() {
        let ledger = BufferLedger::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let names = Arc::clone(&seen);
        let handlers = HostHandlers::new(
            cards,
            move |_duel: DuelHandle, name: &str| -> HandlerResult<Option<String>> {
                names.lock().push(name.to_owned());
                Ok(Some("-- any".to_owned()))
            },
        );
        let hooks = EngineHooks::new(Arc::new(BlockingRelay::new(handlers, ledger.clone())));
        let payload = HookPayload::new(hooks, fake_load_script);
        let raw = CString::new(b"c\xe94.lua".to_vec()).unwrap();

        let status = unsafe { script_reader(payload.as_raw(), 0x6000 as OcgDuel, raw.as_ptr()) };

        assert_eq!(status, OPERATION_SUCCEEDED);
        assert_eq!(*seen.lock(), vec!["c\u{fffd}4.lua".to_owned()]);
        LOADED.with(|loaded| {
            assert_eq!(*loaded.borrow(), vec![(0x6000, b"c\xe94.lua".to_vec(), 6)]);
        });
        assert_eq!(ledger.stats().outstanding, 0);
    }

    #[test]
    fn test_log_handler_panic_does_not_escape() {
        let payload = payload_with(&BufferLedger::new());
        let text = CString::new("script error").unwrap();

        unsafe { log_handler(payload.as_raw(), text.as_ptr(), 0) };
        unsafe { log_handler(payload.as_raw(), std::ptr::null(), 42) };
    }

    #[test]
    fn test_duel_options_install_every_hook() {
        let payload = payload_with(&BufferLedger::new());
        let options = payload.duel_options(&DuelConfig::default());

        assert!(options.card_reader.is_some());
        assert!(options.script_reader.is_some());
        assert!(options.log_handler.is_some());
        assert!(options.card_reader_done.is_some());
        assert_eq!(options.payload1, payload.as_raw());
        assert_eq!(options.payload4, payload.as_raw());
    }
}
