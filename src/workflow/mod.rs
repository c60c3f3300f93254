pub mod catalogue;
pub mod gate;
