pub mod admission;
pub mod session;
pub mod shutdown;
