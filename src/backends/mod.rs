//! Remote text-generation backends.

pub mod google;
