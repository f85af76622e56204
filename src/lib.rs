//! # Spaten
//!
//! A streaming reader and writer for the Spaten container format: sequences of
//! geospatial features (a well-known-binary geometry plus typed properties)
//! stored in independently framed blocks.
//!
//! ## Wire Format
//!
//! ```text
//! header: [ "SPAT" | version: u32 = 0 ]
//! block:  [ body_len: u32 | flags: u16 | compression: u8 | serialization: u8 | body ]*
//! ```
//!
//! All integers are little-endian. A body is a protobuf message holding a
//! list of `(geometry, tags)` pairs; each tag is a key, a type code (STRING,
//! INT or DOUBLE) and the value's raw bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use spaten::*;
//! use std::io::Cursor;
//!
//! fn main() -> Result<()> {
//!     // Write two features into an in-memory stream
//!     let mut writer = SpatenWriter::new(Vec::new(), SpatenFramer)?;
//!     writer.append(
//!         Feature::from_geometry(Wkb::point(13.4, 52.5))
//!             .with_property("name", "Berlin")
//!             .with_property("population", 3_645_000u64),
//!     )?;
//!     writer.append(Feature::from_geometry(Wkb::point(2.35, 48.86)).with_property("name", "Paris"))?;
//!     let data = writer.close()?;
//!
//!     // Read them back lazily, one block at a time
//!     let reader = SpatenReader::new(Cursor::new(data), SpatenDeframer)?;
//!     for feature in reader {
//!         let feature = feature?;
//!         println!("{:?}", feature.property("name"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! * **`header`**: validates and writes the 8-byte preamble
//! * **`framing`**: `Framer`/`Deframer` strategies for the block header and body
//! * **`codec`**: maps block bodies to `Feature`s via `prost` and the tag type system
//! * **`SpatenReader`** / **`SpatenWriter`**: lazy block-at-a-time reading and
//!   threshold-buffered appending

pub mod codec;
pub mod error;
pub mod feature;
pub mod framing;
pub mod geometry;
pub mod header;
pub mod options;
pub mod proto;
pub mod reader;
pub mod value;
pub mod writer;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// Re-export the main public API for user convenience.
pub use codec::{decode_body, decode_tags, encode_body, encode_tags};
pub use error::{Error, FormatError, Result, UnsupportedFeature};
pub use feature::{Feature, Properties};
pub use framing::{
    BlockHeader, BoundedDeframer, BoundedFramer, Deframer, DeframerExt, Framer, FramerExt,
    SpatenDeframer, SpatenFramer,
};
pub use geometry::{Geometry, Wkb};
pub use header::{read_header, write_header, MAGIC, VERSION};
pub use options::StreamOptions;
pub use proto::tag::ValueType;
pub use reader::SpatenReader;
pub use value::Value;
pub use writer::SpatenWriter;

#[cfg(feature = "serde")]
pub use feature::properties_from_json;

/// Opens a Spaten file for reading.
pub fn read<P: AsRef<Path>>(path: P) -> Result<SpatenReader<BufReader<File>>> {
    SpatenReader::open(path)
}

/// Opens or creates a Spaten file for appending.
pub fn write<P: AsRef<Path>>(path: P) -> Result<SpatenWriter<BufWriter<File>>> {
    SpatenWriter::create(path)
}
