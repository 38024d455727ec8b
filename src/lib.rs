//! Resolves an anime episode into a ranked list of playable streams.
//!
//! The pipeline in [`scraping`] walks the site's token exchanges, server
//! listings and embed manifests; [`config`] turns the user's YAML file into
//! the explicit settings the pipeline runs with.

pub mod config;
pub mod error;
pub mod models;
pub mod scraping;

pub use error::{ResolveError, Result};
pub use scraping::{Resolver, ResolverSettings};
