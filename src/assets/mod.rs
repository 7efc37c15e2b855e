pub mod color;
pub mod sprites;
pub mod store;
