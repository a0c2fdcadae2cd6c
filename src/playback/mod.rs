pub mod clock;
pub mod scheduler;
