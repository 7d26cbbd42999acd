//! `argus_vlf`: a lossy, perceptual codec for transmitting colour-mapped weather charts as short
//! ASCII text messages over very-low-bandwidth channels, and reconstructing a recognisable chart
//! image at the receiver.
//!
//! The pipeline, encode direction: a source image is classified against a template's colour
//! [`scale`] into a small-integer [`field`], padded and smoothed by [`condition`], transformed by
//! [`dft`], quantised by [`quantize`], linearised in [`zigzag`] order, and packed into an ASCII
//! [`message`] using the mixed-radix [`alphabet`]. [`codec`] wires these leaves together; decode
//! runs the same pipeline in reverse, finishing in [`reconstruct`].
//!
//! A separate, unrelated [`text_codec`] exists for arbitrary prose payloads.

pub mod alphabet;
pub mod codec;
pub mod condition;
pub mod config;
pub mod dft;
pub mod error;
pub mod field;
pub mod font;
pub mod message;
pub mod quantize;
pub mod raster;
pub mod reconstruct;
pub mod scale;
pub mod template;
pub mod text_codec;
pub mod zigzag;

pub use codec::{compress, create_template, decompress, list_templates};
pub use config::TemplateDirs;
pub use error::{Error, Result};
