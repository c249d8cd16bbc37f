//! Bulk replace-sync
//!
//! Projects source records through a row layout and uploads the rows to a
//! sink in fixed-size batches, counting what succeeded and what failed.

mod batch;
mod cell;
mod layout;
pub mod presets;
mod record;
mod report;
mod runner;
mod sink;

pub use batch::*;
pub use cell::*;
pub use layout::*;
pub use record::*;
pub use report::*;
pub use runner::*;
pub use sink::*;
