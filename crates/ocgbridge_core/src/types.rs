//! # Engine Constants and Passthrough Records
//!
//! Status codes, flag sets and the small records the host hands to the
//! engine unchanged.

/// Reserved status for "operation failed" (script load / script lookup).
pub const OPERATION_FAILED: i32 = 0;

/// Status reported by a successful script load.
pub const OPERATION_SUCCEEDED: i32 = 1;

/// Result of each `process` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ProcessStatus {
    /// The duel is over.
    End = 0,
    /// The engine waits for a response.
    Awaiting = 1,
    /// Call `process` again.
    Continue = 2,
}

impl ProcessStatus {
    /// Interprets a raw engine status. Unknown codes yield `None`.
    #[inline]
    #[must_use]
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::End),
            1 => Some(Self::Awaiting),
            2 => Some(Self::Continue),
            _ => None,
        }
    }
}

/// Outcome of duel creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DuelCreationStatus {
    /// Duel created.
    Success = 0,
    /// Created, but without an output channel.
    NoOutput = 1,
    /// Not created.
    NotCreated = 2,
    /// No card reader was supplied.
    NullDataReader = 3,
    /// No script reader was supplied.
    NullScriptReader = 4,
}

impl DuelCreationStatus {
    /// Interprets a raw creation status; unknown codes count as `NotCreated`.
    #[must_use]
    pub const fn from_raw(value: i32) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::NoOutput,
            3 => Self::NullDataReader,
            4 => Self::NullScriptReader,
            _ => Self::NotCreated,
        }
    }
}

/// Severity/type of an engine log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LogType {
    /// Engine error.
    Error = 0,
    /// `Debug.Message` from a card script.
    FromScript = 1,
    /// Engine debug output.
    ForDebug = 2,
    /// Anything else.
    Undefined = 3,
}

impl LogType {
    /// Converts a raw log code.
    #[inline]
    #[must_use]
    pub const fn from_raw(value: i32) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::FromScript,
            2 => Self::ForDebug,
            _ => Self::Undefined,
        }
    }
}

/// Card location bits.
pub struct Location;

impl Location {
    /// Main deck.
    pub const DECK: u32 = 0x01;
    /// Hand.
    pub const HAND: u32 = 0x02;
    /// Monster zones.
    pub const MZONE: u32 = 0x04;
    /// Spell/trap zones.
    pub const SZONE: u32 = 0x08;
    /// Graveyard.
    pub const GRAVE: u32 = 0x10;
    /// Banished.
    pub const REMOVED: u32 = 0x20;
    /// Extra deck.
    pub const EXTRA: u32 = 0x40;
    /// Xyz material.
    pub const OVERLAY: u32 = 0x80;
    /// Field zone.
    pub const FZONE: u32 = 0x100;
    /// Pendulum zones.
    pub const PZONE: u32 = 0x200;
    /// Monster and spell/trap zones.
    pub const ONFIELD: u32 = Self::MZONE | Self::SZONE;
    /// Every location.
    pub const ALL: u32 = 0x3ff;
}

/// Card position bits.
pub struct Position;

impl Position {
    /// Face-up attack.
    pub const FACEUP_ATTACK: u32 = 0x1;
    /// Face-down attack.
    pub const FACEDOWN_ATTACK: u32 = 0x2;
    /// Face-up defense.
    pub const FACEUP_DEFENSE: u32 = 0x4;
    /// Face-down defense.
    pub const FACEDOWN_DEFENSE: u32 = 0x8;
    /// Any face-up position.
    pub const FACEUP: u32 = Self::FACEUP_ATTACK | Self::FACEUP_DEFENSE;
    /// Any face-down position.
    pub const FACEDOWN: u32 = Self::FACEDOWN_ATTACK | Self::FACEDOWN_DEFENSE;
    /// Any attack position.
    pub const ATTACK: u32 = Self::FACEUP_ATTACK | Self::FACEDOWN_ATTACK;
    /// Any defense position.
    pub const DEFENSE: u32 = Self::FACEUP_DEFENSE | Self::FACEDOWN_DEFENSE;
}

/// Query flag bits selecting which card fields a query returns.
pub struct QueryFlags;

#[allow(missing_docs)]
impl QueryFlags {
    pub const CODE: u32 = 0x1;
    pub const POSITION: u32 = 0x2;
    pub const ALIAS: u32 = 0x4;
    pub const TYPE: u32 = 0x8;
    pub const LEVEL: u32 = 0x10;
    pub const RANK: u32 = 0x20;
    pub const ATTRIBUTE: u32 = 0x40;
    pub const RACE: u32 = 0x80;
    pub const ATTACK: u32 = 0x100;
    pub const DEFENSE: u32 = 0x200;
    pub const BASE_ATTACK: u32 = 0x400;
    pub const BASE_DEFENSE: u32 = 0x800;
    pub const REASON: u32 = 0x1000;
    pub const REASON_CARD: u32 = 0x2000;
    pub const EQUIP_CARD: u32 = 0x4000;
    pub const TARGET_CARD: u32 = 0x8000;
    pub const OVERLAY_CARD: u32 = 0x10000;
    pub const COUNTERS: u32 = 0x20000;
    pub const OWNER: u32 = 0x40000;
    pub const STATUS: u32 = 0x80000;
    pub const IS_PUBLIC: u32 = 0x100000;
    pub const LSCALE: u32 = 0x200000;
    pub const RSCALE: u32 = 0x400000;
    pub const LINK: u32 = 0x800000;
    pub const IS_HIDDEN: u32 = 0x1000000;
    pub const COVER: u32 = 0x2000000;
    /// Terminates a query record.
    pub const END: u32 = 0x8000_0000;
}

/// Duel behavior flags.
pub struct DuelMode;

#[allow(missing_docs)]
impl DuelMode {
    pub const TEST_MODE: u64 = 0x01;
    pub const ATTACK_FIRST_TURN: u64 = 0x02;
    pub const USE_TRAPS_IN_NEW_CHAIN: u64 = 0x04;
    pub const SIX_STEP_BATTLE_STEP: u64 = 0x08;
    pub const PSEUDO_SHUFFLE: u64 = 0x10;
    pub const TRIGGER_WHEN_PRIVATE_KNOWLEDGE: u64 = 0x20;
    pub const SIMPLE_AI: u64 = 0x40;
    pub const RELAY: u64 = 0x80;
    pub const OBSOLETE_IGNITION: u64 = 0x100;
    pub const FIRST_TURN_DRAW: u64 = 0x200;
    pub const ONE_FACEUP_FIELD: u64 = 0x400;
    pub const PZONE: u64 = 0x800;
    pub const SEPARATE_PZONE: u64 = 0x1000;
    pub const EMZONE: u64 = 0x2000;
    pub const FSX_MMZONE: u64 = 0x4000;
    pub const TRAP_MONSTERS_NOT_USE_ZONE: u64 = 0x8000;
    pub const RETURN_TO_EXTRA_DECK_TRIGGERS: u64 = 0x10000;
    pub const TRIGGER_ONLY_IN_LOCATION: u64 = 0x20000;
    pub const SPSUMMON_ONCE_OLD_NEGATE: u64 = 0x40000;
    pub const CANNOT_SUMMON_OATH_OLD: u64 = 0x80000;
    pub const NO_STANDBY_PHASE: u64 = 0x100000;
    pub const NO_MAIN_PHASE_2: u64 = 0x200000;
    pub const THREE_COLUMNS_FIELD: u64 = 0x400000;
    pub const DRAW_UNTIL_5: u64 = 0x800000;
    pub const NO_HAND_LIMIT: u64 = 0x1000000;
    pub const UNLIMITED_SUMMONS: u64 = 0x2000000;
    pub const INVERTED_QUICK_PRIORITY: u64 = 0x4000000;
    pub const EQUIP_NOT_SENT_IF_MISSING_TARGET: u64 = 0x8000000;
    pub const ZERO_ATK_DESTROYED: u64 = 0x10000000;
    pub const STORE_ATTACK_REPLAYS: u64 = 0x20000000;
    pub const SINGLE_CHAIN_IN_DAMAGE_SUBSTEP: u64 = 0x40000000;
    pub const CAN_REPOS_IF_NON_SUMPLAYER: u64 = 0x80000000;
    pub const TCG_SEGOC_NONPUBLIC: u64 = 0x100000000;
    pub const TCG_SEGOC_FIRSTTRIGGER: u64 = 0x200000000;

    /// Master Rule 5.
    pub const MODE_MR5: u64 = Self::PZONE
        | Self::EMZONE
        | Self::FSX_MMZONE
        | Self::TRAP_MONSTERS_NOT_USE_ZONE
        | Self::TRIGGER_ONLY_IN_LOCATION;
}

/// Placement of a new card (`OCG_NewCardInfo`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NewCardInfo {
    /// Team, 0 or 1.
    pub team: u8,
    /// Index of the original owner within the team.
    pub duelist: u8,
    /// Card passcode.
    pub code: u32,
    /// Controller.
    pub controller: u8,
    /// Location bits.
    pub location: u32,
    /// Sequence within the location.
    pub sequence: u32,
    /// Position bits.
    pub position: u32,
}

/// Query selector (`OCG_QueryInfo`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryInfo {
    /// [`QueryFlags`] to return.
    pub flags: u32,
    /// Controller.
    pub controller: u8,
    /// Location bits.
    pub location: u32,
    /// Sequence within the location.
    pub sequence: u32,
    /// Sequence within the overlay, for materials.
    pub overlay_sequence: u32,
}

impl QueryInfo {
    /// Selector for a whole location; sequence fields are zero.
    #[must_use]
    pub const fn location(flags: u32, controller: u8, location: u32) -> Self {
        Self {
            flags,
            controller,
            location,
            sequence: 0,
            overlay_sequence: 0,
        }
    }
}
