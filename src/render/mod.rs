pub mod background;
pub mod cpu;
pub mod frame;
pub mod surface;
pub mod text;
