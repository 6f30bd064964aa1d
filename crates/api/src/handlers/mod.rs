pub mod events;
pub mod project;
