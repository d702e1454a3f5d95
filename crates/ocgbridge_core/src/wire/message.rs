//! Message buffer framing.
//!
//! The buffer returned by `get_message` is a run of frames:
//!
//! ```text
//! ┌──────────┬──────┬───────────────────┐
//! │ len: u32 │ type │ body (len-1 bytes) │ ...
//! └──────────┴──────┴───────────────────┘
//! ```
//!
//! Frames borrow from the buffer. [`MessageFrame::decode`] turns the
//! prompts a host must answer (and the common notices around them) into a
//! [`Message`]; any other type stays raw as [`Message::Other`].

use crate::error::{BridgeError, BridgeResult};

use super::reader::WireReader;

/// Message type bytes.
pub struct MessageType;

#[allow(missing_docs)]
impl MessageType {
    pub const RETRY: u8 = 1;
    pub const HINT: u8 = 2;
    pub const WAITING: u8 = 3;
    pub const START: u8 = 4;
    pub const WIN: u8 = 5;
    pub const SELECT_BATTLECMD: u8 = 10;
    pub const SELECT_IDLECMD: u8 = 11;
    pub const SELECT_EFFECTYN: u8 = 12;
    pub const SELECT_YESNO: u8 = 13;
    pub const SELECT_OPTION: u8 = 14;
    pub const SELECT_CARD: u8 = 15;
    pub const SELECT_CHAIN: u8 = 16;
    pub const SELECT_PLACE: u8 = 18;
    pub const SELECT_POSITION: u8 = 19;
    pub const SELECT_TRIBUTE: u8 = 20;
    pub const SORT_CHAIN: u8 = 21;
    pub const SELECT_COUNTER: u8 = 22;
    pub const SELECT_SUM: u8 = 23;
    pub const SELECT_DISFIELD: u8 = 24;
    pub const SORT_CARD: u8 = 25;
    pub const SELECT_UNSELECT_CARD: u8 = 26;
    pub const CONFIRM_DECKTOP: u8 = 30;
    pub const CONFIRM_CARDS: u8 = 31;
    pub const SHUFFLE_DECK: u8 = 32;
    pub const SHUFFLE_HAND: u8 = 33;
    pub const REFRESH_DECK: u8 = 34;
    pub const NEW_TURN: u8 = 40;
    pub const NEW_PHASE: u8 = 41;
    pub const CHAIN_END: u8 = 74;
}

/// One engine message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageFrame<'a> {
    /// Message type byte.
    pub kind: u8,
    /// Payload after the type byte.
    pub body: &'a [u8],
}

impl<'a> MessageFrame<'a> {
    /// Reader over the payload.
    #[must_use]
    pub fn reader(&self) -> WireReader<'a> {
        WireReader::new(self.body)
    }

    /// Decodes the payload by type.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if the payload is shorter than its type
    /// requires.
    pub fn decode(&self) -> BridgeResult<Message<'a>> {
        decode_body(self.kind, &mut self.reader())
    }
}

/// Iterator over the frames of a message buffer.
///
/// Yields an error once for a truncated frame, then stops.
#[derive(Clone, Debug)]
pub struct MessageFrames<'a> {
    reader: WireReader<'a>,
    failed: bool,
}

impl<'a> MessageFrames<'a> {
    /// Frames of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            reader: WireReader::new(buffer),
            failed: false,
        }
    }

    fn next_frame(&mut self) -> BridgeResult<MessageFrame<'a>> {
        let len = self.reader.u32()? as usize;
        if len == 0 {
            return Err(BridgeError::Truncated { needed: 1, available: 0 });
        }
        let mut frame = self.reader.sub(len)?;
        let kind = frame.u8()?;
        Ok(MessageFrame { kind, body: frame.rest() })
    }
}

impl<'a> Iterator for MessageFrames<'a> {
    type Item = BridgeResult<MessageFrame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let frame = self.next_frame();
        self.failed = frame.is_err();
        Some(frame)
    }
}

/// Splits a whole message buffer.
///
/// # Errors
///
/// [`BridgeError::Truncated`] if any frame is cut short.
pub fn split_messages(buffer: &[u8]) -> BridgeResult<Vec<MessageFrame<'_>>> {
    MessageFrames::new(buffer).collect()
}

/// Splits and decodes a whole message buffer.
///
/// # Errors
///
/// [`BridgeError::Truncated`] if any frame or payload is cut short.
pub fn decode_messages(buffer: &[u8]) -> BridgeResult<Vec<Message<'_>>> {
    MessageFrames::new(buffer)
        .map(|frame| frame.and_then(|frame| frame.decode()))
        .collect()
}

/// A card named by a prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardRef {
    /// Passcode.
    pub code: u32,
    /// Controller.
    pub controller: u8,
    /// Location bits.
    pub location: u32,
    /// Sequence.
    pub sequence: u32,
}

impl CardRef {
    fn read(reader: &mut WireReader<'_>) -> BridgeResult<Self> {
        Ok(Self {
            code: reader.u32()?,
            controller: reader.u8()?,
            location: u32::from(reader.u8()?),
            sequence: reader.u32()?,
        })
    }

    /// Zone-card form, with a one-byte sequence.
    fn read_short(reader: &mut WireReader<'_>) -> BridgeResult<Self> {
        Ok(Self {
            code: reader.u32()?,
            controller: reader.u8()?,
            location: u32::from(reader.u8()?),
            sequence: u32::from(reader.u8()?),
        })
    }

    /// Sorting form, with a four-byte location.
    fn read_wide(reader: &mut WireReader<'_>) -> BridgeResult<Self> {
        Ok(Self {
            code: reader.u32()?,
            controller: reader.u8()?,
            location: reader.u32()?,
            sequence: reader.u32()?,
        })
    }
}

/// A selectable card with its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardChoice {
    /// The card.
    pub card: CardRef,
    /// Position bits.
    pub position: u32,
}

impl CardChoice {
    fn read(reader: &mut WireReader<'_>) -> BridgeResult<Self> {
        Ok(Self {
            card: CardRef::read(reader)?,
            position: reader.u32()?,
        })
    }
}

/// An effect that may be activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectChoice {
    /// Card owning the effect.
    pub card: CardRef,
    /// Effect description.
    pub description: u64,
    /// Client display mode.
    pub client_mode: u32,
}

/// A monster that may attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackChoice {
    /// The attacker.
    pub card: CardRef,
    /// It may attack directly.
    pub can_direct: bool,
}

/// A chain link on offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainChoice {
    /// Card owning the effect.
    pub card: CardChoice,
    /// Effect description.
    pub description: u64,
    /// Client display mode.
    pub client_mode: u8,
}

/// A tribute candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TributeChoice {
    /// The card.
    pub card: CardRef,
    /// Tributes this card counts for.
    pub release_param: u8,
}

/// A card counters may be removed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterChoice {
    /// The card.
    pub card: CardRef,
    /// Counters on it.
    pub count: u16,
}

/// A card with the value it adds to a sum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SumChoice {
    /// The card.
    pub card: CardRef,
    /// Packed sum value.
    pub amount: u32,
}

/// A decoded engine message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message<'a> {
    /// The last response was rejected.
    Retry,
    /// Text hint for a player.
    Hint {
        /// Hint type.
        hint_type: u8,
        /// Player shown the hint.
        player: u8,
        /// Hint payload.
        hint: u64,
    },
    /// The engine waits for the other player.
    Waiting,
    /// The duel started.
    Start,
    /// The duel is decided.
    Win {
        /// Winner.
        player: u8,
        /// Win reason.
        reason: u8,
    },
    /// Battle phase menu.
    SelectBattleCmd {
        /// Player to answer.
        player: u8,
        /// Activatable effects.
        chains: Vec<EffectChoice>,
        /// Possible attackers.
        attacks: Vec<AttackChoice>,
        /// Main phase 2 is reachable.
        to_m2: bool,
        /// End phase is reachable.
        to_ep: bool,
    },
    /// Main phase menu.
    SelectIdleCmd {
        /// Player to answer.
        player: u8,
        /// Normal summons.
        summons: Vec<CardRef>,
        /// Special summons.
        special_summons: Vec<CardRef>,
        /// Position changes.
        pos_changes: Vec<CardRef>,
        /// Monster sets.
        monster_sets: Vec<CardRef>,
        /// Spell/trap sets.
        spell_sets: Vec<CardRef>,
        /// Activatable effects.
        activates: Vec<EffectChoice>,
        /// Battle phase is reachable.
        to_bp: bool,
        /// End phase is reachable.
        to_ep: bool,
        /// The hand may be shuffled.
        shuffle: bool,
    },
    /// Whether to use an effect.
    SelectEffectYn {
        /// Player to answer.
        player: u8,
        /// Card owning the effect.
        card: CardChoice,
        /// Effect description.
        description: u64,
    },
    /// Yes or no.
    SelectYesNo {
        /// Player to answer.
        player: u8,
        /// Question description.
        description: u64,
    },
    /// One of several options.
    SelectOption {
        /// Player to answer.
        player: u8,
        /// Option descriptions.
        options: Vec<u64>,
    },
    /// Pick cards.
    SelectCard {
        /// Player to answer.
        player: u8,
        /// The prompt may be cancelled.
        can_cancel: bool,
        /// Fewest cards.
        min: u32,
        /// Most cards.
        max: u32,
        /// Candidates.
        selects: Vec<CardChoice>,
    },
    /// Chain or pass.
    SelectChain {
        /// Player to answer.
        player: u8,
        /// Spell speed count.
        spe_count: u8,
        /// A link must be chosen.
        forced: bool,
        /// Hint timing for the player.
        hint_timing: u32,
        /// Hint timing for the opponent.
        hint_timing_other: u32,
        /// Links on offer.
        selects: Vec<ChainChoice>,
    },
    /// Pick free zones.
    SelectPlace {
        /// Player to answer.
        player: u8,
        /// Zones to pick.
        count: u8,
        /// Blocked zone bits.
        field_mask: u32,
    },
    /// Pick zones to disable.
    SelectDisfield {
        /// Player to answer.
        player: u8,
        /// Zones to pick.
        count: u8,
        /// Blocked zone bits.
        field_mask: u32,
    },
    /// Pick a battle position.
    SelectPosition {
        /// Player to answer.
        player: u32,
        /// The card.
        code: u32,
        /// Allowed position bits.
        positions: u8,
    },
    /// Pick tributes.
    SelectTribute {
        /// Player to answer.
        player: u8,
        /// The prompt may be cancelled.
        can_cancel: bool,
        /// Fewest tributes.
        min: u32,
        /// Most tributes.
        max: u32,
        /// Candidates.
        selects: Vec<TributeChoice>,
    },
    /// Order simultaneous chain links.
    SortChain {
        /// Player to answer.
        player: u8,
        /// Links to order.
        cards: Vec<CardRef>,
    },
    /// Distribute counter removal.
    SelectCounter {
        /// Player to answer.
        player: u8,
        /// Counter type.
        counter_type: u16,
        /// Counters to remove.
        count: u16,
        /// Cards holding counters.
        cards: Vec<CounterChoice>,
    },
    /// Pick cards adding up to an amount.
    SelectSum {
        /// Player to answer.
        player: u8,
        /// Sum is an upper bound rather than exact.
        select_max: u8,
        /// Target amount.
        amount: u32,
        /// Fewest cards.
        min: u32,
        /// Most cards.
        max: u32,
        /// Optional candidates.
        selects: Vec<SumChoice>,
        /// Cards that are always part of the sum.
        selects_must: Vec<SumChoice>,
    },
    /// Order cards.
    SortCard {
        /// Player to answer.
        player: u8,
        /// Cards to order.
        cards: Vec<CardRef>,
    },
    /// Toggle one card in or out of a selection.
    SelectUnselectCard {
        /// Player to answer.
        player: u8,
        /// The selection may be finished now.
        can_finish: bool,
        /// The prompt may be cancelled.
        can_cancel: bool,
        /// Fewest cards.
        min: u32,
        /// Most cards.
        max: u32,
        /// Cards that may be selected.
        select_cards: Vec<CardChoice>,
        /// Cards that may be unselected.
        unselect_cards: Vec<CardChoice>,
    },
    /// Top cards of a deck revealed.
    ConfirmDeckTop {
        /// Deck owner.
        player: u8,
        /// Revealed cards.
        cards: Vec<CardRef>,
    },
    /// Cards revealed.
    ConfirmCards {
        /// Player shown the cards.
        player: u8,
        /// Revealed cards.
        cards: Vec<CardRef>,
    },
    /// A deck was shuffled.
    ShuffleDeck {
        /// Deck owner.
        player: u8,
    },
    /// A hand was shuffled.
    ShuffleHand {
        /// Hand owner.
        player: u8,
        /// Passcodes in their new order.
        cards: Vec<u32>,
    },
    /// Deck view must be refreshed.
    RefreshDeck,
    /// A turn began.
    NewTurn {
        /// Turn player.
        player: u8,
    },
    /// A phase began.
    NewPhase {
        /// Phase bits.
        phase: u16,
    },
    /// The chain resolved fully.
    ChainEnd,
    /// A type without a typed decoder.
    Other {
        /// Message type byte.
        kind: u8,
        /// Raw payload.
        body: &'a [u8],
    },
}

/// Reads `count` entries, stopping at the first truncated one.
fn list<'a, T>(
    reader: &mut WireReader<'a>,
    count: usize,
    mut entry: impl FnMut(&mut WireReader<'a>) -> BridgeResult<T>,
) -> BridgeResult<Vec<T>> {
    let mut out = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        out.push(entry(reader)?);
    }
    Ok(out)
}

fn count_u32(reader: &mut WireReader<'_>) -> BridgeResult<usize> {
    Ok(reader.u32()? as usize)
}

fn count_u8(reader: &mut WireReader<'_>) -> BridgeResult<usize> {
    Ok(usize::from(reader.u8()?))
}

fn flag(reader: &mut WireReader<'_>) -> BridgeResult<bool> {
    Ok(reader.u8()? != 0)
}

fn card_refs(reader: &mut WireReader<'_>) -> BridgeResult<Vec<CardRef>> {
    let count = count_u32(reader)?;
    list(reader, count, CardRef::read)
}

fn card_choices(reader: &mut WireReader<'_>) -> BridgeResult<Vec<CardChoice>> {
    let count = count_u32(reader)?;
    list(reader, count, CardChoice::read)
}

fn sum_choices(reader: &mut WireReader<'_>) -> BridgeResult<Vec<SumChoice>> {
    let count = count_u32(reader)?;
    list(reader, count, |r| {
        Ok(SumChoice {
            card: CardRef::read(r)?,
            amount: r.u32()?,
        })
    })
}

#[allow(clippy::too_many_lines)]
fn decode_body<'a>(kind: u8, reader: &mut WireReader<'a>) -> BridgeResult<Message<'a>> {
    let message = match kind {
        MessageType::RETRY => Message::Retry,
        MessageType::HINT => {
            let hint_type = reader.u8()?;
            let player = reader.u8()?;
            // Older engines send a four-byte hint.
            let hint = if reader.remaining() > 4 {
                reader.u64()?
            } else {
                u64::from(reader.u32()?)
            };
            Message::Hint { hint_type, player, hint }
        }
        MessageType::WAITING => Message::Waiting,
        MessageType::START => Message::Start,
        MessageType::WIN => Message::Win {
            player: reader.u8()?,
            reason: reader.u8()?,
        },
        MessageType::SELECT_BATTLECMD => {
            let player = reader.u8()?;
            let count = count_u32(reader)?;
            let chains = list(reader, count, |r| {
                Ok(EffectChoice {
                    card: CardRef::read(r)?,
                    description: r.u64()?,
                    client_mode: u32::from(r.u8()?),
                })
            })?;
            let count = count_u32(reader)?;
            let attacks = list(reader, count, |r| {
                Ok(AttackChoice {
                    card: CardRef::read_short(r)?,
                    can_direct: flag(r)?,
                })
            })?;
            Message::SelectBattleCmd {
                player,
                chains,
                attacks,
                to_m2: flag(reader)?,
                to_ep: flag(reader)?,
            }
        }
        MessageType::SELECT_IDLECMD => {
            let player = reader.u8()?;
            let summons = card_refs(reader)?;
            let special_summons = card_refs(reader)?;
            let count = count_u32(reader)?;
            let pos_changes = list(reader, count, CardRef::read_short)?;
            let monster_sets = card_refs(reader)?;
            let spell_sets = card_refs(reader)?;
            let count = count_u32(reader)?;
            let activates = list(reader, count, |r| {
                Ok(EffectChoice {
                    card: CardRef::read(r)?,
                    description: r.u64()?,
                    client_mode: r.u32()?,
                })
            })?;
            Message::SelectIdleCmd {
                player,
                summons,
                special_summons,
                pos_changes,
                monster_sets,
                spell_sets,
                activates,
                to_bp: flag(reader)?,
                to_ep: flag(reader)?,
                shuffle: flag(reader)?,
            }
        }
        MessageType::SELECT_EFFECTYN => Message::SelectEffectYn {
            player: reader.u8()?,
            card: CardChoice::read(reader)?,
            description: reader.u64()?,
        },
        MessageType::SELECT_YESNO => Message::SelectYesNo {
            player: reader.u8()?,
            description: reader.u64()?,
        },
        MessageType::SELECT_OPTION => {
            let player = reader.u8()?;
            let count = count_u8(reader)?;
            let options = list(reader, count, WireReader::u64)?;
            Message::SelectOption { player, options }
        }
        MessageType::SELECT_CARD => {
            let player = reader.u8()?;
            let can_cancel = flag(reader)?;
            let min = reader.u32()?;
            let max = reader.u32()?;
            let count = count_u8(reader)?;
            let selects = list(reader, count, CardChoice::read)?;
            Message::SelectCard { player, can_cancel, min, max, selects }
        }
        MessageType::SELECT_CHAIN => {
            let player = reader.u8()?;
            let spe_count = reader.u8()?;
            let forced = flag(reader)?;
            let hint_timing = reader.u32()?;
            let hint_timing_other = reader.u32()?;
            let count = count_u8(reader)?;
            let selects = list(reader, count, |r| {
                Ok(ChainChoice {
                    card: CardChoice::read(r)?,
                    description: r.u64()?,
                    client_mode: r.u8()?,
                })
            })?;
            Message::SelectChain {
                player,
                spe_count,
                forced,
                hint_timing,
                hint_timing_other,
                selects,
            }
        }
        MessageType::SELECT_PLACE => Message::SelectPlace {
            player: reader.u8()?,
            count: reader.u8()?,
            field_mask: reader.u32()?,
        },
        MessageType::SELECT_DISFIELD => Message::SelectDisfield {
            player: reader.u8()?,
            count: reader.u8()?,
            field_mask: reader.u32()?,
        },
        MessageType::SELECT_POSITION => Message::SelectPosition {
            player: reader.u32()?,
            code: reader.u32()?,
            positions: reader.u8()?,
        },
        MessageType::SELECT_TRIBUTE => {
            let player = reader.u8()?;
            let can_cancel = flag(reader)?;
            let min = reader.u32()?;
            let max = reader.u32()?;
            let count = count_u32(reader)?;
            let selects = list(reader, count, |r| {
                Ok(TributeChoice {
                    card: CardRef::read(r)?,
                    release_param: r.u8()?,
                })
            })?;
            Message::SelectTribute { player, can_cancel, min, max, selects }
        }
        MessageType::SORT_CHAIN | MessageType::SORT_CARD => {
            let player = reader.u8()?;
            let count = count_u32(reader)?;
            let cards = list(reader, count, CardRef::read_wide)?;
            if kind == MessageType::SORT_CHAIN {
                Message::SortChain { player, cards }
            } else {
                Message::SortCard { player, cards }
            }
        }
        MessageType::SELECT_COUNTER => {
            let player = reader.u8()?;
            let counter_type = reader.u16()?;
            let count = reader.u16()?;
            let entries = count_u32(reader)?;
            let cards = list(reader, entries, |r| {
                Ok(CounterChoice {
                    card: CardRef::read_short(r)?,
                    count: r.u16()?,
                })
            })?;
            Message::SelectCounter { player, counter_type, count, cards }
        }
        MessageType::SELECT_SUM => Message::SelectSum {
            player: reader.u8()?,
            select_max: reader.u8()?,
            amount: reader.u32()?,
            min: reader.u32()?,
            max: reader.u32()?,
            selects: sum_choices(reader)?,
            selects_must: sum_choices(reader)?,
        },
        MessageType::SELECT_UNSELECT_CARD => Message::SelectUnselectCard {
            player: reader.u8()?,
            can_finish: flag(reader)?,
            can_cancel: flag(reader)?,
            min: reader.u32()?,
            max: reader.u32()?,
            select_cards: card_choices(reader)?,
            unselect_cards: card_choices(reader)?,
        },
        MessageType::CONFIRM_DECKTOP => Message::ConfirmDeckTop {
            player: reader.u8()?,
            cards: card_refs(reader)?,
        },
        MessageType::CONFIRM_CARDS => Message::ConfirmCards {
            player: reader.u8()?,
            cards: card_refs(reader)?,
        },
        MessageType::SHUFFLE_DECK => Message::ShuffleDeck { player: reader.u8()? },
        MessageType::SHUFFLE_HAND => {
            let player = reader.u8()?;
            let count = count_u32(reader)?;
            let cards = list(reader, count, WireReader::u32)?;
            Message::ShuffleHand { player, cards }
        }
        MessageType::REFRESH_DECK => Message::RefreshDeck,
        MessageType::NEW_TURN => Message::NewTurn { player: reader.u8()? },
        MessageType::NEW_PHASE => Message::NewPhase { phase: reader.u16()? },
        MessageType::CHAIN_END => Message::ChainEnd,
        _ => Message::Other {
            kind,
            body: reader.rest(),
        },
    };
    Ok(message)
}
