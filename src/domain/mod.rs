//! Domain types and the ports the application layer depends on.

pub mod account;
pub mod clock;
pub mod command;
pub mod event;
pub mod ports;
pub mod testament;
