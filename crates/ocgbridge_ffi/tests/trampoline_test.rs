//! Hooks driven through the C entry points, as the engine would.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr, CString};

use ocgbridge_core::{
    AnyDuelOptions, BufferLedger, CardData, DuelConfigV1, DuelOptionsV1, HandlerResult,
    LegacyScript, PlayerConfig, OPERATION_FAILED, OPERATION_SUCCEEDED,
};
use ocgbridge_ffi::trampolines::{data_reader, data_reader_done, script_reader};
use ocgbridge_ffi::{HookPayload, OcgCardData, OcgDuel};

thread_local! {
    static SCRIPTS: RefCell<Vec<(String, u32)>> = const { RefCell::new(Vec::new()) };
}

unsafe extern "C" fn record_load(_duel: OcgDuel, _buffer: *const c_char, length: u32, name: *const c_char) -> c_int {
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
    SCRIPTS.with(|scripts| scripts.borrow_mut().push((name, length)));
    OPERATION_SUCCEEDED
}

fn legacy_payload(ledger: &BufferLedger) -> (Box<HookPayload>, ocgbridge_core::DuelConfig) {
    let options = AnyDuelOptions::V1(DuelOptionsV1 {
        config: DuelConfigV1 {
            seed: 7,
            flags: 0,
            team1: PlayerConfig::STANDARD,
            team2: PlayerConfig::STANDARD,
        },
        card_reader: Box::new(|code: u32| -> HandlerResult<Option<CardData>> {
            Ok(Some(CardData { code, level: 4, setcodes: vec![0x3d], ..CardData::default() }))
        }),
        script_reader: Box::new(|name: &str| -> HandlerResult<Option<LegacyScript>> {
            // Declared length counts characters; the engine must get bytes.
            let content = format!("-- {name} \u{00e9}");
            let length = u32::try_from(content.chars().count()).unwrap();
            Ok(Some(LegacyScript { content, length }))
        }),
        log_handler: None,
    });
    let options = options.into_engine_options(ledger);
    (HookPayload::new(options.hooks, record_load), options.config)
}

#[test]
fn test_legacy_options_round_trip_through_c() {
    let ledger = BufferLedger::new();
    let (payload, config) = legacy_payload(&ledger);

    let raw = payload.duel_options(&config);
    assert_eq!(raw.seed, [7, 0, 0, 0]);
    assert_eq!(raw.payload2, payload.as_raw());

    let mut data = OcgCardData::from_record(&ocgbridge_core::CardRecord::default(), std::ptr::null_mut());
    unsafe { data_reader(raw.payload1, 89_631_139, &mut data) };
    assert_eq!(data.code, 89_631_139);
    assert_eq!(data.level, 4);
    assert_eq!(unsafe { std::slice::from_raw_parts(data.setcodes, 2) }, &[0x3d, 0]);
    unsafe { data_reader_done(raw.payload4, &mut data) };

    let name = CString::new("c1.lua").unwrap();
    let status = unsafe { script_reader(raw.payload2, 0x10 as OcgDuel, name.as_ptr()) };
    assert_eq!(status, OPERATION_SUCCEEDED);
    assert_ne!(status, OPERATION_FAILED);

    SCRIPTS.with(|scripts| {
        let expected = "-- c1.lua \u{00e9}".len();
        assert_eq!(*scripts.borrow(), vec![("c1.lua".to_owned(), u32::try_from(expected).unwrap())]);
    });

    let stats = ledger.stats();
    assert_eq!(stats.acquired, 2);
    assert_eq!(stats.outstanding, 0);
}
