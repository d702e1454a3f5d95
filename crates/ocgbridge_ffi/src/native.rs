//! # Native Engine Binding
//!
//! [`Engine`] over the `OCG_*` functions of libocgcore.
//!
//! ## Safety Note
//!
//! Every engine buffer is borrowed for the lifetime of a `&mut` receiver,
//! so it is gone before the next engine call can invalidate it.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_int, c_void, CString};

use ocgbridge_core::{
    DuelCreationStatus, DuelHandle, DuelOptions, Engine, EngineDuel, NewCardInfo, QueryInfo,
    OPERATION_FAILED,
};

use crate::abi::{OcgDuel, OcgDuelOptions, OcgNewCardInfo, OcgQueryInfo};
use crate::trampolines::HookPayload;

#[link(name = "ocgcore")]
extern "C" {
    fn OCG_GetVersion(major: *mut c_int, minor: *mut c_int);
    fn OCG_CreateDuel(duel: *mut OcgDuel, options: OcgDuelOptions) -> c_int;
    fn OCG_DestroyDuel(duel: OcgDuel);
    fn OCG_DuelNewCard(duel: OcgDuel, info: OcgNewCardInfo);
    fn OCG_StartDuel(duel: OcgDuel);
    fn OCG_DuelProcess(duel: OcgDuel) -> c_int;
    fn OCG_DuelGetMessage(duel: OcgDuel, length: *mut u32) -> *mut c_void;
    fn OCG_DuelSetResponse(duel: OcgDuel, buffer: *const c_void, length: u32);
    fn OCG_LoadScript(duel: OcgDuel, buffer: *const c_char, length: u32, name: *const c_char) -> c_int;
    fn OCG_DuelQueryCount(duel: OcgDuel, team: u8, loc: u32) -> u32;
    fn OCG_DuelQuery(duel: OcgDuel, length: *mut u32, info: OcgQueryInfo) -> *mut c_void;
    fn OCG_DuelQueryLocation(duel: OcgDuel, length: *mut u32, info: OcgQueryInfo) -> *mut c_void;
    fn OCG_DuelQueryField(duel: OcgDuel, length: *mut u32) -> *mut c_void;
}

/// # Safety
///
/// `ptr` must be null or valid for `len` bytes until the borrow ends.
unsafe fn engine_buffer<'a>(ptr: *mut c_void, len: u32) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: upheld by the caller.
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize) }
}

/// The linked libocgcore.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeEngine;

impl Engine for NativeEngine {
    type Duel = NativeDuel;

    fn version(&self) -> (i32, i32) {
        let (mut major, mut minor) = (0, 0);
        // SAFETY: both out-pointers are valid.
        unsafe { OCG_GetVersion(&mut major, &mut minor) };
        (major, minor)
    }

    fn create_duel(&self, options: DuelOptions) -> Result<NativeDuel, DuelCreationStatus> {
        let payload = HookPayload::new(options.hooks, OCG_LoadScript);
        let raw_options = payload.duel_options(&options.config);

        let mut duel: OcgDuel = std::ptr::null_mut();
        // SAFETY: `payload` outlives the duel (it is moved into NativeDuel).
        let status = DuelCreationStatus::from_raw(unsafe { OCG_CreateDuel(&mut duel, raw_options) });
        if status != DuelCreationStatus::Success {
            return Err(status);
        }
        if duel.is_null() {
            return Err(DuelCreationStatus::NotCreated);
        }

        tracing::debug!("created native duel {:p}", duel);
        Ok(NativeDuel { duel, payload })
    }
}

/// A live native duel. Destroyed on drop.
pub struct NativeDuel {
    duel: OcgDuel,
    payload: Box<HookPayload>,
}

// SAFETY: a duel is only ever driven from one thread at a time (`&mut`
// receivers), and the engine keeps no thread-local state per duel.
unsafe impl Send for NativeDuel {}

impl NativeDuel {
    /// Card responses still waiting for the engine's done signal.
    #[must_use]
    pub fn pending_cards(&self) -> usize {
        self.payload.pending_cards()
    }
}

impl EngineDuel for NativeDuel {
    fn handle(&self) -> DuelHandle {
        DuelHandle(self.duel as usize as u64)
    }

    fn new_card(&mut self, info: &NewCardInfo) {
        // SAFETY: `self.duel` is live.
        unsafe { OCG_DuelNewCard(self.duel, info.into()) };
    }

    fn start(&mut self) {
        // SAFETY: `self.duel` is live.
        unsafe { OCG_StartDuel(self.duel) };
    }

    fn process(&mut self) -> i32 {
        // SAFETY: `self.duel` is live.
        unsafe { OCG_DuelProcess(self.duel) }
    }

    fn message(&mut self) -> &[u8] {
        let mut len = 0;
        // SAFETY: the buffer is valid until the next engine call.
        unsafe { engine_buffer(OCG_DuelGetMessage(self.duel, &mut len), len) }
    }

    fn set_response(&mut self, response: &[u8]) {
        let Ok(len) = u32::try_from(response.len()) else {
            tracing::warn!("response of {} bytes dropped", response.len());
            return;
        };
        // SAFETY: the engine copies the response before returning.
        unsafe { OCG_DuelSetResponse(self.duel, response.as_ptr().cast(), len) };
    }

    fn load_script(&mut self, source: &[u8], name: &str) -> i32 {
        let (Ok(len), Ok(name)) = (u32::try_from(source.len()), CString::new(name)) else {
            return OPERATION_FAILED;
        };
        // SAFETY: both buffers outlive the call.
        unsafe { OCG_LoadScript(self.duel, source.as_ptr().cast(), len, name.as_ptr()) }
    }

    fn query_count(&mut self, team: u8, location: u32) -> u32 {
        // SAFETY: `self.duel` is live.
        unsafe { OCG_DuelQueryCount(self.duel, team, location) }
    }

    fn query(&mut self, info: &QueryInfo) -> &[u8] {
        let mut len = 0;
        // SAFETY: the buffer is valid until the next engine call.
        unsafe { engine_buffer(OCG_DuelQuery(self.duel, &mut len, info.into()), len) }
    }

    fn query_location(&mut self, info: &QueryInfo) -> &[u8] {
        let mut len = 0;
        // SAFETY: the buffer is valid until the next engine call.
        unsafe { engine_buffer(OCG_DuelQueryLocation(self.duel, &mut len, info.into()), len) }
    }

    fn query_field(&mut self) -> &[u8] {
        let mut len = 0;
        // SAFETY: the buffer is valid until the next engine call.
        unsafe { engine_buffer(OCG_DuelQueryField(self.duel, &mut len), len) }
    }
}

impl Drop for NativeDuel {
    fn drop(&mut self) {
        // SAFETY: destroyed exactly once; the payload drops after this.
        unsafe { OCG_DestroyDuel(self.duel) };
        tracing::debug!("destroyed native duel {:p}", self.duel);
    }
}
