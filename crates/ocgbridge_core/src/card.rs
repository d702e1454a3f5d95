//! # Card Data
//!
//! Host-facing card records and the engine-facing response that carries a
//! zero-terminated set-code array across the boundary.

use crate::memory::{BufferLedger, OwnedBuffer};

/// Card data as the host's card database reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardData {
    /// Passcode.
    pub code: u32,
    /// Alias passcode (0 if none).
    pub alias: u32,
    /// Archetype set codes, without terminator.
    pub setcodes: Vec<u16>,
    /// Card type bits.
    pub card_type: u32,
    /// Level, rank or link rating.
    pub level: u32,
    /// Attribute bits.
    pub attribute: u32,
    /// Race bits.
    pub race: u64,
    /// Printed ATK.
    pub attack: i32,
    /// Printed DEF.
    pub defense: i32,
    /// Left pendulum scale.
    pub lscale: u32,
    /// Right pendulum scale.
    pub rscale: u32,
    /// Link arrows.
    pub link_marker: u32,
}

/// The scalar part of a card record, in engine field order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardRecord {
    /// Passcode.
    pub code: u32,
    /// Alias passcode.
    pub alias: u32,
    /// Card type bits.
    pub card_type: u32,
    /// Level, rank or link rating.
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

impl CardRecord {
    fn from_data(data: &CardData) -> Self {
        Self {
            code: data.code,
            alias: data.alias,
            card_type: data.card_type,
            level: data.level,
            attribute: data.attribute,
            race: data.race,
            attack: data.attack,
            defense: data.defense,
            lscale: data.lscale,
            rscale: data.rscale,
            link_marker: data.link_marker,
        }
    }
}

/// Answer to one card-data request.
///
/// The set-code array is owned by the response until the engine signals it
/// is done with it; dropping the response releases the array.
#[derive(Debug)]
pub struct CardDataResponse {
    /// Scalar fields.
    pub record: CardRecord,
    /// Set codes followed by a single `0` terminator.
    set_codes: Option<OwnedBuffer<u16>>,
}

impl CardDataResponse {
    /// The "no such card" answer: all fields zero, no set-code array.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            record: CardRecord::default(),
            set_codes: None,
        }
    }

    /// Builds a response, allocating the terminated set-code array from
    /// `ledger`. The array is allocated even when the card has no set codes.
    #[must_use]
    pub fn from_card(data: &CardData, ledger: &BufferLedger) -> Self {
        let mut codes = ledger.acquire::<u16>(data.setcodes.len() + 1);
        codes.as_mut_slice()[..data.setcodes.len()].copy_from_slice(&data.setcodes);
        Self {
            record: CardRecord::from_data(data),
            set_codes: Some(codes),
        }
    }

    /// Returns true for the empty sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_codes.is_none()
    }

    /// Set codes without the terminator.
    #[must_use]
    pub fn set_codes(&self) -> &[u16] {
        match &self.set_codes {
            Some(codes) => {
                let all = codes.as_slice();
                &all[..all.len().saturating_sub(1)]
            }
            None => &[],
        }
    }

    /// Set codes including the trailing `0`, as the engine reads them.
    #[must_use]
    pub fn set_codes_with_terminator(&self) -> Option<&[u16]> {
        self.set_codes.as_ref().map(OwnedBuffer::as_slice)
    }

    /// Frees the set-code array, if any.
    pub fn release(self) {
        if let Some(codes) = self.set_codes {
            codes.release();
        }
    }
}
