//! Single-writer async runtime, event stream, and season view.

/// Event stream types emitted by the runtime.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
/// Generation-guarded season overview loader.
pub mod view;
