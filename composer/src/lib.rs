//! Orchestration layer of the CodeMoss composer.
//!
//! [`codemoss_editor`] owns the editable surface itself; this crate owns
//! everything that coordinates on top of it: which completion dropdown is
//! open, whether Enter submits or inserts a newline, how `/prompts:` commands
//! expand, what the embedding host is allowed to push in through the bridge,
//! and the ask-user-question dialog state.
//!
//! Everything time-dependent (debounce windows, the IME grace period, the
//! question countdown) takes `Instant` from the caller and is polled by the
//! host's tick, so the whole layer is deterministic under test.

pub mod completion;
pub mod composer;
pub mod composition;
pub mod controlled;
pub mod debounce;
pub mod history;
pub mod host_bridge;
pub mod keyboard;
pub mod path_registry;
pub mod prompt_args;
pub mod question;

pub use completion::CompletionCoordinator;
pub use composer::Composer;
pub use composer::ComposerConfig;
pub use composer::InputResult;
pub use composition::CompositionState;
pub use debounce::Debouncer;
pub use host_bridge::HostBridge;
pub use host_bridge::HostCommand;
pub use keyboard::Key;
pub use keyboard::KeyEvent;
pub use keyboard::SubmitMode;
pub use question::QuestionDialogState;
