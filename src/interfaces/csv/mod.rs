//! CSV adapters for replaying command logs and reporting events.

pub mod command_reader;
pub mod event_writer;
