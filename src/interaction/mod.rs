//! Drag/resize interaction controller.
//!
//! A small per-widget state machine (`Idle → Dragging → Idle`,
//! `Idle → Resizing → Idle`) fed by pointer events. Positions are snapped on every move and kept in a
//! transient map outside the committed model until the pointer is released.

mod controller;
mod pointer;

pub use controller::{
    CommittedPosition, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH, EventFlow, GestureKind, GestureStart,
    InteractionConfig, InteractionController, InteractionState, PositionCommit,
};
pub use pointer::{PointerEvent, PointerPhase, TouchPoint, classify_mouse, is_cancel_key};
