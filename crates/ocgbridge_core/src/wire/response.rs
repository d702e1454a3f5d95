//! Response buffer encoding.
//!
//! Each [`Response`] answers the prompt of the same name in
//! [`Message`](super::Message). The engine reads the encoded bytes on the
//! next `process` call after `set_response`.

use super::writer::WireWriter;

/// Battle phase menu actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BattleAction {
    /// Activate `chains[index]`.
    Chain = 0,
    /// Attack with `attacks[index]`.
    Attack = 1,
    /// Go to main phase 2.
    ToMain2 = 2,
    /// Go to the end phase.
    ToEnd = 3,
}

/// Main phase menu actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IdleAction {
    /// Normal summon `summons[index]`.
    Summon = 0,
    /// Special summon `special_summons[index]`.
    SpecialSummon = 1,
    /// Change the position of `pos_changes[index]`.
    PosChange = 2,
    /// Set `monster_sets[index]`.
    MonsterSet = 3,
    /// Set `spell_sets[index]`.
    SpellSet = 4,
    /// Activate `activates[index]`.
    Activate = 5,
    /// Go to the battle phase.
    ToBattle = 6,
    /// Go to the end phase.
    ToEnd = 7,
    /// Shuffle the hand.
    Shuffle = 8,
}

/// A zone picked for a place or disfield prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceChoice {
    /// Zone owner.
    pub player: u8,
    /// Location bits.
    pub location: u8,
    /// Zone index.
    pub sequence: u8,
}

/// A host's answer to a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Battle phase menu pick.
    SelectBattleCmd {
        /// What to do.
        action: BattleAction,
        /// Entry of the matching list, when the action takes one.
        index: u16,
    },
    /// Main phase menu pick.
    SelectIdleCmd {
        /// What to do.
        action: IdleAction,
        /// Entry of the matching list, when the action takes one.
        index: u16,
    },
    /// Use the effect or not.
    SelectEffectYn {
        /// Use it.
        yes: bool,
    },
    /// Yes or no.
    SelectYesNo {
        /// Yes.
        yes: bool,
    },
    /// Option picked.
    SelectOption {
        /// Index into the options.
        index: u32,
    },
    /// Cards picked, or `None` to cancel.
    SelectCard {
        /// Indices into the candidates.
        indices: Option<Vec<u32>>,
    },
    /// One card toggled, or `None` to finish or cancel.
    SelectUnselectCard {
        /// Index over `select_cards` then `unselect_cards`.
        index: Option<u32>,
    },
    /// Chain link picked, or `None` to pass.
    SelectChain {
        /// Index into the links on offer.
        index: Option<u32>,
    },
    /// Zones to disable.
    SelectDisfield {
        /// Picked zones.
        places: Vec<PlaceChoice>,
    },
    /// Zones to use.
    SelectPlace {
        /// Picked zones.
        places: Vec<PlaceChoice>,
    },
    /// Battle position.
    SelectPosition {
        /// Position bits.
        position: u32,
    },
    /// Tributes picked, or `None` to cancel.
    SelectTribute {
        /// Indices into the candidates.
        indices: Option<Vec<u32>>,
    },
    /// Counters to remove from each card, in candidate order.
    SelectCounter {
        /// One count per card.
        counters: Vec<u16>,
    },
    /// Cards making up the sum.
    SelectSum {
        /// Indices into the optional candidates.
        indices: Vec<u32>,
    },
    /// New order, or `None` for the engine's default.
    SortCard {
        /// Position of each card in the new order.
        order: Option<Vec<u8>>,
    },
    /// Races announced.
    AnnounceRace {
        /// Race bits.
        races: u64,
    },
    /// Attributes announced.
    AnnounceAttrib {
        /// Attribute bits.
        attributes: u32,
    },
    /// Card announced.
    AnnounceCard {
        /// Passcode.
        code: u32,
    },
    /// Number announced.
    AnnounceNumber {
        /// Index into the offered numbers.
        index: u32,
    },
    /// Rock (1), paper (2) or scissors (3).
    RockPaperScissors {
        /// The hand.
        hand: u8,
    },
}

fn write_indices(writer: &mut WireWriter, indices: Option<&[u32]>) {
    match indices {
        Some(indices) => {
            writer.i32(0).u32(u32::try_from(indices.len()).unwrap_or(u32::MAX));
            for &index in indices {
                writer.u32(index);
            }
        }
        None => {
            writer.i32(-1);
        }
    }
}

fn write_places(writer: &mut WireWriter, places: &[PlaceChoice]) {
    for place in places {
        writer.u8(place.player).u8(place.location).u8(place.sequence);
    }
}

impl Response {
    /// Appends the encoded response to `writer`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        match self {
            Self::SelectBattleCmd { action, index } => {
                writer.u32((*action as u32) | (u32::from(*index) << 16));
            }
            Self::SelectIdleCmd { action, index } => {
                writer.u32((*action as u32) | (u32::from(*index) << 16));
            }
            Self::SelectEffectYn { yes } | Self::SelectYesNo { yes } => {
                writer.i32(i32::from(*yes));
            }
            Self::SelectOption { index } | Self::AnnounceNumber { index } => {
                writer.u32(*index);
            }
            Self::SelectCard { indices } | Self::SelectTribute { indices } => {
                write_indices(writer, indices.as_deref());
            }
            Self::SelectUnselectCard { index } => match index {
                Some(index) => {
                    writer.i32(1).u32(*index);
                }
                None => {
                    writer.i32(-1);
                }
            },
            Self::SelectChain { index } => match index {
                Some(index) => {
                    writer.u32(*index);
                }
                None => {
                    writer.i32(-1);
                }
            },
            Self::SelectDisfield { places } | Self::SelectPlace { places } => {
                write_places(writer, places);
            }
            Self::SelectPosition { position } => {
                writer.u32(*position);
            }
            Self::SelectCounter { counters } => {
                for &count in counters {
                    writer.u16(count);
                }
            }
            Self::SelectSum { indices } => write_indices(writer, Some(indices.as_slice())),
            Self::SortCard { order } => match order {
                Some(order) => {
                    for &slot in order {
                        writer.u8(slot);
                    }
                }
                None => {
                    writer.i8(-1);
                }
            },
            Self::AnnounceRace { races } => {
                writer.u64(*races);
            }
            Self::AnnounceAttrib { attributes } => {
                writer.u32(*attributes);
            }
            Self::AnnounceCard { code } => {
                writer.u32(*code);
            }
            Self::RockPaperScissors { hand } => {
                writer.i32(i32::from(*hand));
            }
        }
    }

    /// The response as the engine expects it.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.write_to(&mut writer);
        writer.into_inner()
    }
}
