//! Integration tests for the options adapter.

use ocgbridge_core::{
    AnyDuelConfig, AnyDuelOptions, BridgeError, BufferLedger, CardData, DuelConfig, DuelConfigV1,
    DuelConfigV2, DuelHandle, DuelMode, DuelOptionsV1, DuelOptionsV2, DuelOptionsV3,
    HandlerResult, HostHandlers, LegacyScript, OptionsGeneration, PlayerConfig, ScriptSink,
    OPERATION_SUCCEEDED,
};

fn no_cards(_code: u32) -> HandlerResult<Option<CardData>> {
    Ok(None)
}

fn no_scripts(_duel: DuelHandle, _name: &str) -> HandlerResult<Option<String>> {
    Ok(None)
}

fn team(lp: u32) -> PlayerConfig {
    PlayerConfig { starting_lp: lp, ..PlayerConfig::STANDARD }
}

#[test]
fn test_generation_one_seed_widens_to_four_words() {
    let options = AnyDuelOptions::V1(DuelOptionsV1 {
        config: DuelConfigV1 { seed: 42, flags: 0, team1: team(8000), team2: team(8000) },
        card_reader: Box::new(no_cards),
        script_reader: Box::new(|_name: &str| -> HandlerResult<Option<LegacyScript>> { Ok(None) }),
        log_handler: None,
    });

    let engine_options = options.into_engine_options(&BufferLedger::new());

    assert_eq!(engine_options.config.seed, [42, 0, 0, 0]);
    assert_eq!(engine_options.config.enable_unsafe_libraries, 0);
}

#[test]
fn test_every_generation_normalizes_to_identical_bytes() {
    let flags = DuelMode::MODE_MR5;
    let configs = [
        AnyDuelConfig::V1(DuelConfigV1 {
            seed: 0x1234_5678,
            flags: u32::try_from(flags).unwrap(),
            team1: team(8000),
            team2: team(4000),
        }),
        AnyDuelConfig::V2(DuelConfigV2 {
            seed: 0x1234_5678,
            flags,
            team1: team(8000),
            team2: team(4000),
        }),
        AnyDuelConfig::V3(DuelConfig::new([0x1234_5678, 0, 0, 0], flags, team(8000), team(4000))),
    ];

    let canonical: Vec<DuelConfig> = configs.iter().map(AnyDuelConfig::normalize).collect();
    for config in &canonical[1..] {
        assert_eq!(config.as_bytes(), canonical[0].as_bytes());
    }
}

#[test]
fn test_raw_records_decode_per_generation() {
    let v1 = DuelConfigV1 { seed: 9, flags: 1, team1: team(1), team2: team(2) };
    let decoded = AnyDuelConfig::decode(1, bytemuck::bytes_of(&v1)).unwrap();
    assert_eq!(decoded.generation(), OptionsGeneration::V1);
    assert_eq!(decoded.normalize().seed, [9, 0, 0, 0]);

    let v3 = DuelConfig::new([1, 2, 3, 4], 0, team(1), team(2)).with_unsafe_libraries(true);
    let decoded = AnyDuelConfig::decode(3, v3.as_bytes()).unwrap();
    assert_eq!(decoded.normalize(), v3);
}

#[test]
fn test_unknown_generation_is_rejected() {
    assert_eq!(AnyDuelConfig::decode(0, &[]), Err(BridgeError::UnknownGeneration(0)));
    assert!(matches!(
        AnyDuelConfig::decode(1, &[0; 31]),
        Err(BridgeError::MalformedOptions { generation: 1, expected: 32, actual: 31 })
    ));
}

#[test]
fn test_later_generations_keep_handlers() {
    struct Sink(Vec<usize>);

    impl ScriptSink for Sink {
        fn duel(&self) -> DuelHandle {
            DuelHandle(5)
        }

        fn ingest(&mut self, source: &[u8], _name: &str) -> i32 {
            self.0.push(source.len());
            OPERATION_SUCCEEDED
        }
    }

    let scripts = |_duel: DuelHandle, name: &str| -> HandlerResult<Option<String>> {
        Ok(Some(name.to_owned()))
    };
    let v2 = AnyDuelOptions::V2(DuelOptionsV2 {
        config: DuelConfigV2::default(),
        handlers: HostHandlers::new(no_cards, scripts),
    });
    let v3 = AnyDuelOptions::V3(DuelOptionsV3 {
        config: DuelConfig::default(),
        handlers: HostHandlers::new(no_cards, no_scripts),
    });

    let ledger = BufferLedger::new();
    let mut sink = Sink(Vec::new());

    let hooks = v2.into_engine_options(&ledger).hooks;
    assert_eq!(hooks.read_script(&mut sink, "c100.lua"), OPERATION_SUCCEEDED);

    let hooks = v3.into_engine_options(&ledger).hooks;
    assert_eq!(hooks.read_script(&mut sink, "c100.lua"), 0);

    assert_eq!(sink.0, vec![8]);
    assert_eq!(ledger.stats().outstanding, 0);
}
