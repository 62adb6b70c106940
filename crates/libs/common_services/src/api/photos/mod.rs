pub mod error;
mod ingest;
pub mod interfaces;
pub mod saga;
pub mod service;
pub mod step_policy;
#[cfg(test)]
pub(crate) mod test_support;
