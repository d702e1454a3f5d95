//! # Wire Codecs
//!
//! Borrowing decoders for the engine's message and query buffers, and the
//! encoder for the response buffer a host hands back. Nothing here keeps
//! an engine buffer past the call.

pub mod message;
pub mod query;
pub mod reader;
pub mod response;
pub mod writer;

pub use message::{
    decode_messages, split_messages, AttackChoice, CardChoice, CardRef, ChainChoice,
    CounterChoice, EffectChoice, Message, MessageFrame, MessageFrames, MessageType, SumChoice,
    TributeChoice,
};
pub use query::{
    decode_card, decode_field, decode_location, CardLocation, CardQuery, ChainEntry, Counter,
    FieldPlayer, FieldState, LinkInfo, ZoneCard,
};
pub use reader::WireReader;
pub use response::{BattleAction, IdleAction, PlaceChoice, Response};
pub use writer::WireWriter;
