pub mod device;
pub mod project;
pub mod projection;
