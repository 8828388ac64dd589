mod bot;
pub mod commands;
mod components;
mod expiry_notifier;
mod interactions;
mod render;
mod summary;

pub use bot::{Data, create_framework};
