//! CLI operation handlers.
//!
//! - [`analyze`]: resolve inputs, run every team, print the reports
//! - [`prompt`]: interactive token and date prompts
//!
//! Output formatting utilities are in [`output`].

pub mod analyze;
pub mod output;
pub mod prompt;

#[cfg(test)]
pub mod test_utils;
