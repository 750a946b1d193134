//! Frame timing for dynamic PET acquisitions
//!
//! A [`FrameTimeTable`] holds one [`FrameTime`] per acquired frame, sorted by
//! frame index, together with the [`TimeUnit`] its values are expressed in.
//! Midframe times derived from the table are the abscissae for every
//! downstream integration.
//!
//! # Example
//!
//! ```rust
//! use petga::timing::{FrameTime, FrameTimeTable, TimeUnit};
//!
//! let table = FrameTimeTable::new(
//!     vec![
//!         FrameTime::new(2, 60.0, 60.0, 120.0),
//!         FrameTime::new(1, 0.0, 60.0, 60.0),
//!     ],
//!     TimeUnit::Seconds,
//! )
//! .unwrap();
//!
//! assert_eq!(table.frames()[0].frame, 1);
//! assert_eq!(table.midframes().to_vec(), vec![30.0, 90.0]);
//!
//! let minutes = table.to_unit(TimeUnit::Minutes);
//! assert_eq!(minutes.frames()[1].stop, 2.0);
//! ```

mod error;
pub mod parser;
mod table;

pub use error::TimingError;
pub use parser::{read_frametimes, write_frametimes};
pub use table::{FrameTime, FrameTimeTable, TimeUnit, TimingWarning, STOP_TOLERANCE};
