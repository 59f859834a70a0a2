//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, organisation, path and date resolution tests
//! - `teams`: Team configuration file loading tests
//! - `validation`: Policy value validation tests

mod helpers;
