//! Query buffer decoding.
//!
//! A card query is a run of records `u16 size | u32 flag | payload`, where
//! `size` counts the flag and the payload, ended by [`QueryFlags::END`].
//! A lone `size == 0` stands for an empty slot in a location query.

use crate::error::{BridgeError, BridgeResult};
use crate::types::QueryFlags;

use super::reader::WireReader;

/// Where a referenced card sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardLocation {
    /// Controller.
    pub controller: u8,
    /// Location bits (low byte).
    pub location: u8,
    /// Sequence.
    pub sequence: u32,
    /// Position bits.
    pub position: u32,
}

impl CardLocation {
    fn read(reader: &mut WireReader<'_>) -> BridgeResult<Option<Self>> {
        let loc = Self {
            controller: reader.u8()?,
            location: reader.u8()?,
            sequence: reader.u32()?,
            position: reader.u32()?,
        };
        Ok((loc != Self::default()).then_some(loc))
    }
}

/// A counter on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counter {
    /// Counter type.
    pub kind: u16,
    /// How many.
    pub count: u16,
}

/// Link rating and arrows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkInfo {
    /// Link rating.
    pub rating: u32,
    /// Arrow bits.
    pub marker: u32,
}

/// Decoded single-card query. Fields the query did not ask for are `None`
/// (or empty).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardQuery {
    /// Passcode.
    pub code: Option<u32>,
    /// Position bits.
    pub position: Option<u32>,
    /// Alias passcode.
    pub alias: Option<u32>,
    /// Type bits.
    pub card_type: Option<u32>,
    /// Level.
    pub level: Option<u32>,
    /// Rank.
    pub rank: Option<u32>,
    /// Attribute bits.
    pub attribute: Option<u32>,
    /// Race bits.
    pub race: Option<u64>,
    /// Current attack.
    pub attack: Option<i32>,
    /// Current defense.
    pub defense: Option<i32>,
    /// Printed attack.
    pub base_attack: Option<i32>,
    /// Printed defense.
    pub base_defense: Option<i32>,
    /// Reason bits of the last move.
    pub reason: Option<u32>,
    /// Card that caused the last move.
    pub reason_card: Option<CardLocation>,
    /// Card this one is equipped to.
    pub equip_card: Option<CardLocation>,
    /// Cards this one targets.
    pub target_cards: Vec<CardLocation>,
    /// Passcodes of attached materials.
    pub overlay_cards: Vec<u32>,
    /// Counters on the card.
    pub counters: Vec<Counter>,
    /// Owner.
    pub owner: Option<u8>,
    /// Status bits.
    pub status: Option<u32>,
    /// Revealed to the opponent.
    pub is_public: Option<bool>,
    /// Left pendulum scale.
    pub lscale: Option<u32>,
    /// Right pendulum scale.
    pub rscale: Option<u32>,
    /// Link rating and arrows.
    pub link: Option<LinkInfo>,
    /// Hidden from the opponent.
    pub is_hidden: Option<bool>,
    /// Cover art passcode.
    pub cover: Option<u32>,
}

impl CardQuery {
    fn apply(&mut self, flag: u32, payload: &mut WireReader<'_>) -> BridgeResult<()> {
        match flag {
            QueryFlags::CODE => self.code = Some(payload.u32()?),
            QueryFlags::POSITION => self.position = Some(payload.u32()?),
            QueryFlags::ALIAS => self.alias = Some(payload.u32()?),
            QueryFlags::TYPE => self.card_type = Some(payload.u32()?),
            QueryFlags::LEVEL => self.level = Some(payload.u32()?),
            QueryFlags::RANK => self.rank = Some(payload.u32()?),
            QueryFlags::ATTRIBUTE => self.attribute = Some(payload.u32()?),
            QueryFlags::RACE => self.race = Some(payload.u64()?),
            QueryFlags::ATTACK => self.attack = Some(payload.i32()?),
            QueryFlags::DEFENSE => self.defense = Some(payload.i32()?),
            QueryFlags::BASE_ATTACK => self.base_attack = Some(payload.i32()?),
            QueryFlags::BASE_DEFENSE => self.base_defense = Some(payload.i32()?),
            QueryFlags::REASON => self.reason = Some(payload.u32()?),
            QueryFlags::REASON_CARD => self.reason_card = CardLocation::read(payload)?,
            QueryFlags::EQUIP_CARD => self.equip_card = CardLocation::read(payload)?,
            QueryFlags::TARGET_CARD => {
                let count = payload.u32()?;
                for _ in 0..count {
                    if let Some(target) = CardLocation::read(payload)? {
                        self.target_cards.push(target);
                    }
                }
            }
            QueryFlags::OVERLAY_CARD => {
                let count = payload.u32()?;
                for _ in 0..count {
                    self.overlay_cards.push(payload.u32()?);
                }
            }
            QueryFlags::COUNTERS => {
                let count = payload.u32()?;
                for _ in 0..count {
                    let kind = payload.u16()?;
                    let count = payload.u16()?;
                    self.counters.push(Counter { kind, count });
                }
            }
            QueryFlags::OWNER => self.owner = Some(payload.u8()?),
            QueryFlags::STATUS => self.status = Some(payload.u32()?),
            QueryFlags::IS_PUBLIC => self.is_public = Some(payload.u8()? != 0),
            QueryFlags::LSCALE => self.lscale = Some(payload.u32()?),
            QueryFlags::RSCALE => self.rscale = Some(payload.u32()?),
            QueryFlags::LINK => {
                self.link = Some(LinkInfo {
                    rating: payload.u32()?,
                    marker: payload.u32()?,
                });
            }
            QueryFlags::IS_HIDDEN => self.is_hidden = Some(payload.u8()? != 0),
            QueryFlags::COVER => self.cover = Some(payload.u32()?),
            other => tracing::trace!("skipping unknown query flag {:#x}", other),
        }
        Ok(())
    }
}

/// Decodes one card record. `Ok(None)` is an empty slot.
///
/// # Errors
///
/// [`BridgeError::Truncated`] if a record is cut short.
pub fn read_card_query(reader: &mut WireReader<'_>) -> BridgeResult<Option<CardQuery>> {
    if reader.is_empty() {
        return Ok(None);
    }
    let mut card = CardQuery::default();
    let mut first = true;

    while !reader.is_empty() {
        let size = usize::from(reader.u16()?);
        if size == 0 && first {
            return Ok(None);
        }
        if size < 4 {
            return Err(BridgeError::Truncated { needed: 4, available: size });
        }
        first = false;

        let mut record = reader.sub(size)?;
        let flag = record.u32()?;
        if flag == QueryFlags::END {
            break;
        }
        card.apply(flag, &mut record)?;
    }
    Ok(Some(card))
}

/// Decodes the buffer of a single-card query.
///
/// # Errors
///
/// [`BridgeError::Truncated`] on a malformed buffer.
pub fn decode_card(buffer: &[u8]) -> BridgeResult<Option<CardQuery>> {
    read_card_query(&mut WireReader::new(buffer))
}

/// Decodes a location query: one entry per slot, `None` for empty slots.
///
/// # Errors
///
/// [`BridgeError::Truncated`] on a malformed buffer.
pub fn decode_location(buffer: &[u8]) -> BridgeResult<Vec<Option<CardQuery>>> {
    let mut reader = WireReader::new(buffer);
    if reader.is_empty() {
        return Ok(Vec::new());
    }
    let declared = reader.u32()? as usize;
    let mut body = reader.sub(declared.min(reader.remaining()))?;

    let mut cards = Vec::new();
    while !body.is_empty() {
        cards.push(read_card_query(&mut body)?);
    }
    Ok(cards)
}

/// A monster or spell zone that holds a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneCard {
    /// Position bits.
    pub position: u8,
    /// Number of materials attached.
    pub materials: u32,
}

/// One player's side of the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPlayer {
    /// Life points.
    pub lp: u32,
    /// Main and extra monster zones.
    pub monsters: [Option<ZoneCard>; 7],
    /// Spell/trap, field and pendulum zones.
    pub spells: [Option<ZoneCard>; 8],
    /// Cards in the deck.
    pub deck_size: u32,
    /// Cards in hand.
    pub hand_size: u32,
    /// Cards in the graveyard.
    pub grave_size: u32,
    /// Banished cards.
    pub banish_size: u32,
    /// Cards in the extra deck.
    pub extra_size: u32,
    /// Face-up cards in the extra deck.
    pub extra_faceup_count: u32,
}

impl FieldPlayer {
    fn read(reader: &mut WireReader<'_>) -> BridgeResult<Self> {
        let mut player = Self {
            lp: reader.u32()?,
            ..Self::default()
        };
        for zone in player.monsters.iter_mut().chain(player.spells.iter_mut()) {
            *zone = read_zone(reader)?;
        }
        player.deck_size = reader.u32()?;
        player.hand_size = reader.u32()?;
        player.grave_size = reader.u32()?;
        player.banish_size = reader.u32()?;
        player.extra_size = reader.u32()?;
        player.extra_faceup_count = reader.u32()?;
        Ok(player)
    }
}

fn read_zone(reader: &mut WireReader<'_>) -> BridgeResult<Option<ZoneCard>> {
    if reader.u8()? == 0 {
        return Ok(None);
    }
    Ok(Some(ZoneCard {
        position: reader.u8()?,
        materials: reader.u32()?,
    }))
}

/// A link of the current chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    /// Passcode.
    pub code: u32,
    /// Controller.
    pub controller: u8,
    /// Location bits.
    pub location: u8,
    /// Sequence.
    pub sequence: u32,
    /// Position bits.
    pub position: u32,
    /// Controller when the effect triggered.
    pub triggering_controller: u8,
    /// Location when the effect triggered.
    pub triggering_location: u8,
    /// Sequence when the effect triggered.
    pub triggering_sequence: u32,
    /// Effect description.
    pub description: u64,
}

/// Decoded whole-field query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Duel mode flags.
    pub flags: u32,
    /// Both players.
    pub players: [FieldPlayer; 2],
    /// Chain links, oldest first.
    pub chain: Vec<ChainEntry>,
}

/// Decodes a whole-field query.
///
/// # Errors
///
/// [`BridgeError::Truncated`] on a malformed buffer.
pub fn decode_field(buffer: &[u8]) -> BridgeResult<FieldState> {
    let mut reader = WireReader::new(buffer);
    let flags = reader.u32()?;
    let players = [FieldPlayer::read(&mut reader)?, FieldPlayer::read(&mut reader)?];

    let links = reader.u32()?;
    let mut chain = Vec::with_capacity(links.min(64) as usize);
    for _ in 0..links {
        chain.push(ChainEntry {
            code: reader.u32()?,
            controller: reader.u8()?,
            location: reader.u8()?,
            sequence: reader.u32()?,
            position: reader.u32()?,
            triggering_controller: reader.u8()?,
            triggering_location: reader.u8()?,
            triggering_sequence: reader.u32()?,
            description: reader.u64()?,
        });
    }

    Ok(FieldState { flags, players, chain })
}
