//! # Pattern Module
//!
//! Turns route declarations into anchored, case-insensitive regex matchers
//! plus the parameter names bound to each capture group.
//!
//! ## Declaration Syntax
//!
//! | Token            | Meaning                                                      |
//! |------------------|--------------------------------------------------------------|
//! | `/users`         | literal text, matched case-insensitively                     |
//! | `:id`            | named parameter, one or more non-`/` characters              |
//! | `:id(\d+)`       | named parameter with an inline pattern                       |
//! | `:id(?:\d+)`     | inline pattern without a capture: constrains, binds no name  |
//! | `:id?`           | optional parameter; its preceding `/` is optional with it    |
//! | `.:ext`          | parameter introduced by a `.` format marker                  |
//! | `/(` ... `)?`    | non-capturing group starting with a separator                |
//! | `*`              | one or more of any character, captured without a name        |
//!
//! Every declaration implicitly accepts an optional trailing `/`.
//!
//! The name of a parameter binds to the first capture group of its inline
//! pattern. A pattern with no capture group still constrains the match, but
//! the name is dropped and never appears in the request's params.
//!
//! ## Example
//!
//! ```
//! use routemux::pattern::Matcher;
//!
//! let m = Matcher::compile("/files/:name?").unwrap();
//! assert_eq!(m.pattern(), "^/files(?:/([^/]+?))?/?$");
//! assert!(m.is_match("/files"));
//! assert!(m.is_match("/files/report"));
//! ```
//!
//! A caller may also register a regex it compiled itself; that regex is used
//! unchanged and carries no parameter names.

mod core;
pub mod template;

pub use self::core::{Matcher, RouteSource};
pub use template::{Segment, Template};
