pub mod status;
pub mod toast;
