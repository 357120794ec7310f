mod charts;
mod events;
mod people;
mod stats;

pub use charts::*;
pub use events::*;
pub use people::*;
pub use stats::*;
