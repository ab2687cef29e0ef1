//! Types shared between the composer core and the embedding host.
//!
//! Everything in this crate crosses the host bridge as JSON, so every type
//! derives `Serialize`/`Deserialize` and keeps a stable wire shape.

pub mod custom_prompts;
pub mod file_references;
pub mod user_input;
