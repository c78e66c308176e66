//! Request, response and WebSocket payload types.

pub mod health;
pub mod room;
pub mod validation;
pub mod ws;
