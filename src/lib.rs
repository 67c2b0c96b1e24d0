//! # routemux
//!
//! **routemux** is an express-style path router: route declarations such as
//! `/users/:id` or `/files/:name?` are compiled once into anchored,
//! case-insensitive regular expressions and kept in an ordered registry.
//! Each request is dispatched to the first rule whose pattern and method
//! filter accept it, with named path segments bound to the request as
//! percent-decoded parameters.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - Declaration tokenizer and compiler producing a [`Matcher`]
//! - **[`router`]** - Ordered rule registry, method filters and dispatch
//! - **[`request`]** - The [`RoutableRequest`] contract plus ready-made request/response types
//! - **[`config`]** - [`RouterConfig`] from code, environment or YAML
//! - **[`logging`]** - `tracing` subscriber setup for binaries
//! - **[`error`]** - [`PatternError`] and [`DecodeError`]
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Service as RouteService
//!     participant Router
//!     participant Handler
//!
//!     Caller->>Service: call(req, res, next)
//!     Service->>Router: dispatch
//!     Router->>Router: path of req.url, first rule accepting method + path
//!     alt no match or no handler
//!         Router->>Caller: next()
//!     else matched
//!         Router->>Router: decode captures into Params
//!         Router->>Handler: handler(router, req, res, next)
//!         Handler-->>Caller: Result
//!     end
//! ```
//!
//! ## Declaration Syntax
//!
//! | Declaration | Matches | Params |
//! |-------------|---------|--------|
//! | `/users/:id` | `/users/42` | `id = "42"` |
//! | `/files/:name?` | `/files`, `/files/a` | `name` absent or `"a"` |
//! | `/items/:id(\d+)` | `/items/7` | `id = "7"` |
//! | `/doc.:fmt` | `/doc.json` | `fmt = "json"` |
//! | `/search/*` | `/search/a/b` | unnamed `"a/b"` |
//!
//! A trailing slash is always optional and matching ignores case.
//!
//! ## Quick Start
//!
//! ```rust
//! use routemux::{router, Request, Response, Router, RouterConfig};
//! use serde_json::json;
//!
//! let service = router(RouterConfig::default(), |r: &mut Router| {
//!     r.get("/users/:id", |_router, req, res, _next| {
//!         res.json(200, json!({ "id": req.param("id") }));
//!         Ok(())
//!     });
//! });
//!
//! let mut req = Request::get("/users/42?tab=posts");
//! let mut res = Response::new();
//! let mut not_found = false;
//! service
//!     .call(&mut req, &mut res, &mut || {
//!         not_found = true;
//!         Ok(())
//!     })
//!     .unwrap();
//! assert!(!not_found);
//! assert_eq!(res.body, json!({ "id": "42" }));
//! assert_eq!(req.normalized_url.as_deref(), Some("/users/:id"));
//! ```
//!
//! ## Errors
//!
//! Registration never fails: a declaration that does not compile becomes a
//! rule that never matches and a warning is logged. Use
//! [`Matcher::compile`] to surface the [`PatternError`] instead. During
//! dispatch, a captured value that is not valid percent-encoding produces a
//! [`DecodeError`], and handler errors are returned as-is.

pub mod config;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod request;
pub mod router;

pub use config::RouterConfig;
pub use error::{DecodeError, PatternError};
pub use pattern::{Matcher, RouteSource};
pub use request::{RoutableRequest, Request, Response};
pub use router::{router, Handler, MethodFilter, Next, Params, RouteService, Router, Rule};
