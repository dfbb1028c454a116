//! Table subsystem: finding grids, synthesizing cells, validating and
//! rendering tables.

pub mod ascii;
pub mod detector;
pub mod finder;
pub mod synth;

pub use ascii::{wrap_text, AsciiTableRenderer, AsciiTableStyle};
pub use detector::{TableDetector, TableSettings};
pub use finder::{RawTable, SharedTableFinder, TableFinder, TableFinderProvider, TableFinderRegistry};
pub use synth::CellSynthesizer;
