// ============================================================================
// Persistence Gateway
// ============================================================================
//
// Generic, swappable persistence for the workflow. The gateway exposes typed
// reads plus one atomic write primitive: a batch of row operations that all
// commit or all fail. Status updates inside a batch carry compare-and-swap
// guards, so once-only transitions hold under concurrent callers.
//
// ============================================================================

mod gateway;
mod memory;

pub use gateway::{Gateway, OrderGuard, StoreError, WriteBatch, WriteOp};
pub use memory::InMemoryStore;
