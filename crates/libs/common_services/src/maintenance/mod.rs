mod locations;
mod thumbnails;

pub use locations::*;
pub use thumbnails::*;
