pub mod direction;
pub mod entity;
