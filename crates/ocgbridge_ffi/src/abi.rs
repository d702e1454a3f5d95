//! # ocgcore v10 ABI
//!
//! These structs must match `ocgapi_types.h` exactly.

use std::ffi::{c_char, c_int, c_void};

use ocgbridge_core::{CardRecord, DuelConfig, NewCardInfo, PlayerConfig, QueryInfo};

/// Opaque duel pointer.
pub type OcgDuel = *mut c_void;

/// `OCG_Player`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OcgPlayer {
    /// Starting life points.
    pub starting_lp: u32,
    /// Opening hand size.
    pub starting_draw_count: u32,
    /// Cards per draw phase.
    pub draw_count_per_turn: u32,
}

impl From<PlayerConfig> for OcgPlayer {
    fn from(player: PlayerConfig) -> Self {
        Self {
            starting_lp: player.starting_lp,
            starting_draw_count: player.starting_draw_count,
            draw_count_per_turn: player.draw_count_per_turn,
        }
    }
}

/// `OCG_CardData`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct OcgCardData {
    /// Passcode.
    pub code: u32,
    /// Alias.
    pub alias: u32,
    /// Zero-terminated set codes, owned by the adapter.
    pub setcodes: *mut u16,
    /// Type bits.
    pub type_: u32,
    /// Level.
    pub level: u32,
    /// Attribute bits.
    pub attribute: u32,
    /// Race bits.
    pub race: u64,
    /// ATK.
    pub attack: i32,
    /// DEF.
    pub defense: i32,
    /// Left scale.
    pub lscale: u32,
    /// Right scale.
    pub rscale: u32,
    /// Link arrows.
    pub link_marker: u32,
}

impl OcgCardData {
    /// Fills every field from `record` and points at `setcodes`.
    #[must_use]
    pub fn from_record(record: &CardRecord, setcodes: *mut u16) -> Self {
        Self {
            code: record.code,
            alias: record.alias,
            setcodes,
            type_: record.card_type,
            level: record.level,
            attribute: record.attribute,
            race: record.race,
            attack: record.attack,
            defense: record.defense,
            lscale: record.lscale,
            rscale: record.rscale,
            link_marker: record.link_marker,
        }
    }
}

/// `OCG_DataReader`
pub type OcgDataReader = Option<unsafe extern "C" fn(payload: *mut c_void, code: u32, data: *mut OcgCardData)>;

/// `OCG_ScriptReader`
pub type OcgScriptReader =
    Option<unsafe extern "C" fn(payload: *mut c_void, duel: OcgDuel, name: *const c_char) -> c_int>;

/// `OCG_LogHandler`
pub type OcgLogHandler = Option<unsafe extern "C" fn(payload: *mut c_void, string: *const c_char, type_: c_int)>;

/// `OCG_DataReaderDone`
pub type OcgDataReaderDone = Option<unsafe extern "C" fn(payload: *mut c_void, data: *mut OcgCardData)>;

/// `OCG_LoadScript`, as handed to the script trampoline.
pub type OcgLoadScript =
    unsafe extern "C" fn(duel: OcgDuel, buffer: *const c_char, length: u32, name: *const c_char) -> c_int;

/// `OCG_DuelOptions`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct OcgDuelOptions {
    /// Seed words.
    pub seed: [u64; 4],
    /// Duel mode flags.
    pub flags: u64,
    /// First team.
    pub team1: OcgPlayer,
    /// Second team.
    pub team2: OcgPlayer,
    /// Card hook.
    pub card_reader: OcgDataReader,
    /// Card hook payload.
    pub payload1: *mut c_void,
    /// Script hook.
    pub script_reader: OcgScriptReader,
    /// Script hook payload.
    pub payload2: *mut c_void,
    /// Log hook.
    pub log_handler: OcgLogHandler,
    /// Log hook payload.
    pub payload3: *mut c_void,
    /// Card-done hook.
    pub card_reader_done: OcgDataReaderDone,
    /// Card-done hook payload.
    pub payload4: *mut c_void,
    /// Unsafe Lua libraries.
    pub enable_unsafe_libraries: u8,
}

impl OcgDuelOptions {
    /// Options carrying `config` with every hook unset.
    #[must_use]
    pub fn from_config(config: &DuelConfig) -> Self {
        Self {
            seed: config.seed,
            flags: config.flags,
            team1: config.team1.into(),
            team2: config.team2.into(),
            card_reader: None,
            payload1: std::ptr::null_mut(),
            script_reader: None,
            payload2: std::ptr::null_mut(),
            log_handler: None,
            payload3: std::ptr::null_mut(),
            card_reader_done: None,
            payload4: std::ptr::null_mut(),
            enable_unsafe_libraries: config.enable_unsafe_libraries,
        }
    }
}

/// `OCG_NewCardInfo`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OcgNewCardInfo {
    /// Team.
    pub team: u8,
    /// Duelist within the team.
    pub duelist: u8,
    /// Passcode.
    pub code: u32,
    /// Controller.
    pub con: u8,
    /// Location.
    pub loc: u32,
    /// Sequence.
    pub seq: u32,
    /// Position.
    pub pos: u32,
}

impl From<&NewCardInfo> for OcgNewCardInfo {
    fn from(info: &NewCardInfo) -> Self {
        Self {
            team: info.team,
            duelist: info.duelist,
            code: info.code,
            con: info.controller,
            loc: info.location,
            seq: info.sequence,
            pos: info.position,
        }
    }
}

/// `OCG_QueryInfo`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OcgQueryInfo {
    /// Query flags.
    pub flags: u32,
    /// Controller.
    pub con: u8,
    /// Location.
    pub loc: u32,
    /// Sequence.
    pub seq: u32,
    /// Overlay sequence.
    pub overlay_seq: u32,
}

impl From<&QueryInfo> for OcgQueryInfo {
    fn from(info: &QueryInfo) -> Self {
        Self {
            flags: info.flags,
            con: info.controller,
            loc: info.location,
            seq: info.sequence,
            overlay_seq: info.overlay_sequence,
        }
    }
}
