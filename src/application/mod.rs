//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `TestamentEngine` which acts as the primary entry point
//! for registering principals, recording beneficiaries and triggering payouts.
//! State-changing operations are serialized behind a single async lock.

pub mod engine;
