use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span};

use super::method::MethodFilter;
use super::params::Params;
use crate::config::RouterConfig;
use crate::pattern::{Matcher, RouteSource};
use crate::request::{path_of, RoutableRequest, Request, Response};

/// Fallback continuation: signals "not handled here" to the outer pipeline.
pub type Next<'a> = &'a mut dyn FnMut() -> anyhow::Result<()>;

/// A route handler. The router that matched is passed explicitly so a
/// handler can inspect or re-dispatch against it.
pub type Handler<Req, Res> = Arc<
    dyn Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()> + Send + Sync,
>;

/// One registered route: matcher, method filter and optional handler.
pub struct Rule<Req, Res> {
    matcher: Matcher,
    method: MethodFilter,
    handler: Option<Handler<Req, Res>>,
}

impl<Req, Res> Rule<Req, Res> {
    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[must_use]
    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    #[must_use]
    pub fn handler(&self) -> Option<&Handler<Req, Res>> {
        self.handler.as_ref()
    }

    /// Declaration for display; the regex source for precompiled matchers.
    #[must_use]
    pub fn declaration(&self) -> &str {
        self.matcher
            .declaration()
            .unwrap_or_else(|| self.matcher.pattern())
    }

    #[inline]
    fn accepts(&self, method: &str, path: &str) -> bool {
        self.matcher.is_match(path) && self.method.accepts(method)
    }
}

impl<Req, Res> fmt::Debug for Rule<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("matcher", &self.matcher)
            .field("method", &self.method)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Ordered route registry with first-match dispatch.
///
/// Registration order is match priority. Rules are appended during setup
/// and never removed or reordered; matching only reads the registry, so a
/// built router can be shared across threads.
///
/// # Example
///
/// ```
/// use routemux::{Request, Response, Router};
/// use serde_json::json;
///
/// let mut router: Router = Router::new();
/// router.get("/users/:id", |_router, req, res, _next| {
///     res.json(200, json!({ "id": req.param("id") }));
///     Ok(())
/// });
///
/// let mut req = Request::get("/users/42");
/// let mut res = Response::new();
/// router.dispatch(&mut req, &mut res, &mut || Ok(())).unwrap();
/// assert_eq!(res.body, json!({ "id": "42" }));
/// ```
pub struct Router<Req = Request, Res = Response> {
    rules: Vec<Rule<Req, Res>>,
    config: RouterConfig,
}

impl<Req, Res> Default for Router<Req, Res> {
    fn default() -> Self {
        Self::with_config(RouterConfig::default())
    }
}

impl<Req, Res> fmt::Debug for Router<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("rules", &self.rules)
            .field("config", &self.config)
            .finish()
    }
}

impl<Req, Res> Router<Req, Res> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Router {
            rules: Vec::new(),
            config,
        }
    }

    /// Register a rule. The declaration is compiled once here; a declaration
    /// that does not compile is kept as a rule that never matches.
    pub fn add<F>(
        &mut self,
        route: impl Into<RouteSource>,
        handler: F,
        method: impl Into<MethodFilter>,
    ) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        let handler: Handler<Req, Res> = Arc::new(handler);
        self.push(route.into(), Some(handler), method.into())
    }

    /// Register a rule without a handler. When such a rule is the first
    /// match for a request, dispatch falls through to the continuation.
    pub fn add_matcher(
        &mut self,
        route: impl Into<RouteSource>,
        method: impl Into<MethodFilter>,
    ) -> &mut Self {
        self.push(route.into(), None, method.into())
    }

    fn push(
        &mut self,
        route: RouteSource,
        handler: Option<Handler<Req, Res>>,
        method: MethodFilter,
    ) -> &mut Self {
        let matcher = Matcher::from_source(route);
        debug!(
            rule_index = self.rules.len(),
            method = %method,
            declaration = matcher.declaration().unwrap_or_default(),
            pattern = %matcher.pattern(),
            has_handler = handler.is_some(),
            "Route registered"
        );
        self.rules.push(Rule {
            matcher,
            method,
            handler,
        });
        self
    }

    pub fn get<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "get")
    }

    pub fn put<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "put")
    }

    pub fn post<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "post")
    }

    pub fn patch<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "patch")
    }

    pub fn delete<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "delete")
    }

    pub fn head<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "head")
    }

    /// Register for every method.
    pub fn all<F>(&mut self, route: impl Into<RouteSource>, handler: F) -> &mut Self
    where
        F: Fn(&Router<Req, Res>, &mut Req, &mut Res, Next<'_>) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.add(route, handler, "all")
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<Req, Res>] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Log every registered rule in priority order.
    pub fn dump_routes(&self) {
        info!(routes_count = self.rules.len(), "Routing table");
        for (index, rule) in self.rules.iter().enumerate() {
            info!(
                rule_index = index,
                method = %rule.method,
                declaration = %rule.declaration(),
                pattern = %rule.matcher.pattern(),
                has_handler = rule.handler.is_some(),
                "Route"
            );
        }
    }

    /// Wrap the router in a shareable dispatch service.
    #[must_use]
    pub fn init(self) -> RouteService<Req, Res> {
        RouteService {
            router: Arc::new(self),
        }
    }
}

impl<Req: RoutableRequest, Res> Router<Req, Res> {
    /// Rules accepting `path` and the request's method, in registration order.
    #[must_use]
    pub fn matches(&self, req: &Req, path: &str) -> Vec<&Rule<Req, Res>> {
        let method = req.method();
        self.rules
            .iter()
            .filter(|rule| rule.accepts(method, path))
            .collect()
    }

    fn first_match(&self, req: &Req, path: &str) -> Option<(usize, &Rule<Req, Res>)> {
        let method = req.method();
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.accepts(method, path))
    }

    /// Match one request and invoke the first matching rule's handler.
    ///
    /// Calls `next` when no rule matches or the first matching rule has no
    /// handler. Errors from the handler, from `next`, and from decoding a
    /// captured value are returned unchanged.
    pub fn dispatch(&self, req: &mut Req, res: &mut Res, next: Next<'_>) -> anyhow::Result<()> {
        let path = path_of(req.url()).into_owned();

        let Some((index, rule)) = self.first_match(req, &path) else {
            debug!(method = %req.method(), path = %path, "No route matched");
            return next();
        };
        let Some(handler) = rule.handler.as_ref() else {
            debug!(
                method = %req.method(),
                path = %path,
                rule_index = index,
                "First matching rule has no handler"
            );
            return next();
        };

        let params = match (rule.matcher.param_names(), rule.matcher.captures(&path)) {
            (Some(names), Some(captures)) => Params::from_captures(names, &captures)?,
            _ => Params::default(),
        };
        debug!(
            method = %req.method(),
            path = %path,
            rule_index = index,
            declaration = %rule.declaration(),
            param_count = params.len(),
            "Route matched"
        );
        req.set_params(params);

        let normalized = self.normalized_url(req, &path, rule);
        let span = info_span!(
            "route",
            method = %req.method(),
            path = %path,
            declaration = %rule.declaration(),
            normalized_url = %normalized,
        );
        req.set_normalized_url(normalized);

        let _entered = span.enter();
        handler(self, req, res, next)
    }

    /// Mount prefix of the original URL joined with either the request path
    /// or the rule declaration.
    fn normalized_url(&self, req: &Req, path: &str, rule: &Rule<Req, Res>) -> String {
        let original = path_of(req.original_url().unwrap_or_else(|| req.url()));
        let path = if path == "/" { "" } else { path };
        let base_len = original.len().saturating_sub(path.len());
        let base = original.get(..base_len).unwrap_or_default();
        if self.config.use_path_as_normalized_url {
            format!("{base}{path}")
        } else {
            format!("{base}{}", rule.declaration())
        }
    }
}

/// Dispatch entry point produced by [`Router::init`].
///
/// Cheap to clone; every clone shares the same immutable registry.
pub struct RouteService<Req = Request, Res = Response> {
    router: Arc<Router<Req, Res>>,
}

impl<Req, Res> Clone for RouteService<Req, Res> {
    fn clone(&self) -> Self {
        RouteService {
            router: Arc::clone(&self.router),
        }
    }
}

impl<Req, Res> fmt::Debug for RouteService<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteService")
            .field("rules", &self.router.len())
            .finish()
    }
}

impl<Req: RoutableRequest, Res> RouteService<Req, Res> {
    pub fn call(&self, req: &mut Req, res: &mut Res, next: Next<'_>) -> anyhow::Result<()> {
        self.router.dispatch(req, res, next)
    }

    #[must_use]
    pub fn router(&self) -> &Router<Req, Res> {
        &self.router
    }
}

/// Build a router, let `init` register its rules, and return the dispatch
/// service.
pub fn router<Req, Res, F>(config: RouterConfig, init: F) -> RouteService<Req, Res>
where
    Req: RoutableRequest,
    F: FnOnce(&mut Router<Req, Res>),
{
    let mut router = Router::with_config(config);
    init(&mut router);
    router.init()
}
