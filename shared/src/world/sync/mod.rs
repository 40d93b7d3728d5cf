//! # Sync – Overview
//!
//! Keeps authoritative component state and its observer copies converging
//! over a lossy, reordering transport, under a per-tick byte budget.
//!
//! ## Tick order
//! 1. **Receive**: `SyncWorld::receive` decodes an `UpdateEnvelope`, feeds
//!    it to the `ChunkReassembler` and queues complete updates.
//! 2. **Apply**: at the start of `SyncWorld::tick` every queued update is
//!    handed to its component's `apply_inbound`, which consults the
//!    `AuthorityGate` through the `SyncContext`.
//! 3. **Expire**: partial reassemblies idle past the timeout are dropped.
//! 4. **Produce**: dirty components encode their state and the result is
//!    handed to a `DeliverySink`, round-robin until the byte budget is spent.
//!
//! Because apply runs before produce, an accepted write is reflected in the
//! very next broadcast.
//!
//! ## Reading map
//! | Module | Role |
//! |--------|------|
//! | [`sync_world.rs`]   | entity arena, inbound queue, tick loop |
//! | [`sync_context.rs`] | per-tick context passed to components |
//! | [`delivery.rs`]     | outbound transport seam |
//! | [`config.rs`]       | tuning knobs |

pub mod config;
pub mod delivery;
pub mod sync_context;
pub mod sync_world;

#[cfg(test)]
mod tests;
