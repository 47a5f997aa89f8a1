pub mod opportunity;
pub mod resource;
