#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools
)]
mod exif_record;
mod location;
mod photo;
mod song_request;

pub use exif_record::*;
pub use location::*;
pub use photo::*;
pub use song_request::*;
