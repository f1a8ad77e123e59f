pub mod features;
pub mod ranking;
pub mod sentiment;

pub use features::*;
pub use ranking::*;
pub use sentiment::*;
