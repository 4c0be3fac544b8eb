//! Reference fixtures for exercising the core without an external store
//! (§6 "Ambient — in-process reference implementations"). These are test
//! scaffolding, not a persistence layer: no indexing, migrations, or
//! schema concerns, matching persistence being out of scope for this core.

pub mod in_memory;
