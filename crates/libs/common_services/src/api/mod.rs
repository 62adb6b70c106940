pub mod photos;
pub mod requests;
