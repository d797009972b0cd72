//! Pointer interaction: hit testing plus the drag / resize / rotate state machine.

mod core;
pub mod hit;

pub use self::core::{
    ControllerAction, ControllerSettings, InteractionController, InteractionState, PointerButton,
    PointerEvent,
};
pub use hit::{PointerTarget, ResizeHandle, hit_test};
