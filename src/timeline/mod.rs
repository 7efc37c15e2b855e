pub mod builder;
pub mod events;
