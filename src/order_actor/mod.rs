//! In-memory order store: `OrderRecord` managed by a `ResourceActor`.

pub mod entity;
