pub mod gradient;
pub mod mapping;
