//! Inventory domain module: units of measure and items (goods and services).
//!
//! Pure domain types and validation (no IO, no HTTP, no storage).

pub mod item;
pub mod unit;

pub use item::{Item, ItemKind, ItemUpdate, NewItem, UnknownItemKind};
pub use unit::{NewUnit, Unit};
