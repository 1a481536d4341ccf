//! Input handling: event types, key actions, and the input processor that
//! applies raw window events to the frame context.

/// Platform-agnostic input events.
pub mod event;
/// Bindable key actions.
pub mod keyboard;
/// Applies events and key presses to the frame context.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use keyboard::KeyAction;
pub use processor::InputProcessor;
