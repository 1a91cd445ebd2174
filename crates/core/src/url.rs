//! Link targets for page entries
//!
//! A page link is built in one of two ways. A named route is reversed with
//! the page number added to its keyword arguments, or the current query
//! string is copied with the page parameter overwritten. Either way an
//! optional `#anchor` goes last.

use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;

use crate::query::QueryParams;

/// Query parameter that carries the page number unless configured otherwise
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// Separator between a namespace and a route name
pub const NAMESPACE_SEPARATOR: char = ':';

/// Keyword arguments for route reversal, sorted by name
pub type Kwargs = BTreeMap<String, String>;

/// A named route could not be turned into a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Reverse for '{name}' not found: {reason}")]
pub struct NoReverseMatch {
    pub name: String,
    pub reason: String,
}

impl NoReverseMatch {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Turns a route name and its arguments into a path
pub trait RouteResolver {
    fn reverse(
        &self,
        name: &str,
        args: &[String],
        kwargs: &Kwargs,
        current_app: Option<&str>,
    ) -> Result<String, NoReverseMatch>;
}

impl<R: RouteResolver + ?Sized> RouteResolver for &R {
    fn reverse(
        &self,
        name: &str,
        args: &[String],
        kwargs: &Kwargs,
        current_app: Option<&str>,
    ) -> Result<String, NoReverseMatch> {
        (**self).reverse(name, args, kwargs, current_app)
    }
}

/// Two-step resolution: the name as given, then qualified by the namespace
///
/// A failed lookup is retried exactly once as `"<namespace>:<name>"`. If that
/// fails too, the error from the first attempt is returned so the message
/// names the route the caller asked for.
#[derive(Debug, Clone)]
pub struct NamespaceFallback<R> {
    inner: R,
    namespace: Option<String>,
}

impl<R> NamespaceFallback<R> {
    pub fn new(inner: R, namespace: Option<String>) -> Self {
        Self { inner, namespace }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Name used for the retry, if a namespace is configured
    pub fn qualify(&self, name: &str) -> Option<String> {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .map(|ns| format!("{ns}{NAMESPACE_SEPARATOR}{name}"))
    }
}

impl<R: RouteResolver> RouteResolver for NamespaceFallback<R> {
    fn reverse(
        &self,
        name: &str,
        args: &[String],
        kwargs: &Kwargs,
        current_app: Option<&str>,
    ) -> Result<String, NoReverseMatch> {
        let original = match self.inner.reverse(name, args, kwargs, current_app) {
            Ok(url) => return Ok(url),
            Err(err) => err,
        };

        let Some(qualified) = self.qualify(name) else {
            return Err(original);
        };

        debug!("Route '{}' not found, retrying as '{}'", name, qualified);

        self.inner
            .reverse(&qualified, args, kwargs, current_app)
            .map_err(|_| original)
    }
}

/// How page URLs are produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlTarget {
    NamedRoute {
        route_name: String,
        args: Vec<String>,
        kwargs: Kwargs,
    },
    QueryRewrite {
        path: String,
    },
}

/// Everything needed to build the URL of any page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlContext {
    pub target: UrlTarget,
    pub page_param: String,
    /// Query parameters to carry. In named-route mode they are appended as-is.
    pub query: QueryParams,
    pub anchor: Option<String>,
    pub current_app: Option<String>,
}

impl UrlContext {
    /// Rewrite `query` with the page number and append it to `path`
    pub fn query_rewrite(path: impl Into<String>, query: QueryParams) -> Self {
        Self {
            target: UrlTarget::QueryRewrite { path: path.into() },
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            query,
            anchor: None,
            current_app: None,
        }
    }

    /// Reverse `route_name` with the page number as a keyword argument
    pub fn named_route(route_name: impl Into<String>, args: Vec<String>, kwargs: Kwargs) -> Self {
        Self {
            target: UrlTarget::NamedRoute {
                route_name: route_name.into(),
                args,
                kwargs,
            },
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            query: QueryParams::new(),
            anchor: None,
            current_app: None,
        }
    }

    #[must_use]
    pub fn with_page_param(mut self, page_param: impl Into<String>) -> Self {
        self.page_param = page_param.into();
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: Option<String>) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn with_current_app(mut self, current_app: Option<String>) -> Self {
        self.current_app = current_app;
        self
    }
}

/// Build the URL for `page`
///
/// # Arguments
/// * `page` - Page number the link points to
/// * `context` - URL strategy, page parameter, query and anchor
/// * `resolver` - Used only in named-route mode
pub fn build_url<R: RouteResolver + ?Sized>(
    page: usize,
    context: &UrlContext,
    resolver: &R,
) -> Result<String, NoReverseMatch> {
    let mut url = match &context.target {
        UrlTarget::NamedRoute {
            route_name,
            args,
            kwargs,
        } => {
            let mut kwargs = kwargs.clone();
            kwargs.insert(context.page_param.clone(), page.to_string());

            let mut url =
                resolver.reverse(route_name, args, &kwargs, context.current_app.as_deref())?;

            if !context.query.is_empty() {
                url.push('?');
                url.push_str(&context.query.encode());
            }

            url
        }
        UrlTarget::QueryRewrite { path } => {
            let mut query = context.query.clone();
            query.set(context.page_param.as_str(), page.to_string());
            format!("{path}?{}", query.encode())
        }
    };

    if let Some(anchor) = &context.anchor {
        url.push('#');
        url.push_str(anchor);
    }

    Ok(url)
}
