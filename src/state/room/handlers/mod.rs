//! Room actor command handlers.
//!
//! Each submodule handles a category of [`RoomCommand`](super::RoomCommand)
//! processed by [`RoomActor`](super::RoomActor).

pub mod members;
pub mod messages;
