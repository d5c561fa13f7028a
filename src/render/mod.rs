pub mod ascii;
pub mod layout;
pub mod palette;
