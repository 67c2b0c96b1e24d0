//! # Router Module
//!
//! The router keeps an ordered list of rules and dispatches each request to
//! the first one that accepts it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route declarations into matchers at registration time
//! - Filtering rules by request method
//! - Extracting and percent-decoding path parameters on a match
//! - Invoking the matched handler, or the fallback continuation when nothing matches
//!
//! ## Architecture
//!
//! 1. **Registration**: `add` (or one of the per-method registrars) compiles the
//!    declaration once and appends a [`Rule`]. Registration order is priority order.
//!
//! 2. **Dispatch**: for each request the path is extracted from the URL (query
//!    ignored), rules are scanned in order, and the first rule whose matcher and
//!    method filter both accept the request wins. Its regex is run once more to
//!    pull out captures, which are bound to the request as [`Params`] before
//!    the handler is called.
//!
//! ## Example
//!
//! ```rust
//! use routemux::{router, Request, Response, Router, RouterConfig};
//!
//! let service = router(RouterConfig::default(), |r: &mut Router| {
//!     r.get("/files/:name?", |_router, req, res, _next| {
//!         res.text(200, req.param("name").unwrap_or("index"));
//!         Ok(())
//!     });
//! });
//!
//! let mut req = Request::get("/files");
//! let mut res = Response::new();
//! service.call(&mut req, &mut res, &mut || Ok(())).unwrap();
//! assert_eq!(res.body, "index");
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan over the registry, one `is_match` per rule until
//! the first hit, then a single capture pass on the winning rule.

mod core;
mod method;
mod params;

pub use self::core::{router, Handler, Next, RouteService, Router, Rule};
pub use method::MethodFilter;
pub use params::{decode_component, ParamVec, Params, MAX_INLINE_PARAMS};
