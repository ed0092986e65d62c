//! The criteria-matching engine.
//!
//! A `where` clause arrives as a plain [Record](crate::common::Record) whose
//! keys are either reserved operators (`or`, `and`, `not`, `like`,
//! case-insensitive) or attribute names meaning strict equality. The clause
//! is first parsed into a typed [Criteria] tree, then evaluated against each
//! row by recursive descent - evaluation never sniffs raw keys, so an
//! attribute literally named "or" is unambiguous once parsed.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dirtystore::criteria::{Criteria, MatchOptions};
//! use dirtystore::record;
//!
//! let clause = record! {
//!     "or" => vec![
//!         record! { "name" => "Ann" }.into(),
//!         record! { "like" => record! { "name" => "nn" } }.into(),
//!     ],
//! };
//! let criteria = Criteria::parse(Some(&clause))?;
//! let hit = criteria.matches(&record! { "name" => "Ann" }, &MatchOptions::default());
//! ```

mod matcher;
mod tree;

pub use matcher::*;
pub use tree::*;
