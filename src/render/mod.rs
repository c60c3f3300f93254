pub mod html;
pub mod result;
