#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_inception,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

pub mod api;
pub mod exif;
pub mod geocode;
pub mod maintenance;
pub mod notify;
pub mod rate_limit;
pub mod storage;
pub mod utils;
