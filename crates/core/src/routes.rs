//! Route table storage and reversal
//!
//! Routes are loaded from a TOML file and compiled once. Reversal fills each
//! `<name>` or `<converter:name>` placeholder of a path pattern from keyword
//! arguments first and positional arguments second.
//!
//! ```toml
//! namespace = "blog"
//!
//! [[routes]]
//! name = "blog:archive"
//! path = "/blog/<int:year>/page/<int:page>/"
//! ```

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::url::{Kwargs, NoReverseMatch, RouteResolver};

const PLACEHOLDER: &str = r"<(?:(?P<converter>[a-z]+):)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)>";

/// Error type for route configuration
#[derive(Debug, Error)]
pub enum RouteConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid route '{name}': {reason}")]
    InvalidRoute { name: String, reason: String },
}

/// A named path pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub path: String,
    /// Application instance that owns this route, matched against `current_app`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            app: None,
        }
    }

    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }
}

/// Contents of a route file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Namespace tried when a route name doesn't resolve as given
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RoutesConfig {
    pub fn route_table(&self) -> Result<RouteTable, RouteConfigError> {
        RouteTable::new(self.routes.clone())
    }
}

/// Parse a route file from its TOML contents
pub fn parse_routes_config(contents: &str) -> Result<RoutesConfig, RouteConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Load a route file from the filesystem
pub fn load_routes_config(path: &Path) -> Result<RoutesConfig, RouteConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_routes_config(&contents)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Converter {
    Str,
    Int,
    Slug,
    Path,
}

impl Converter {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Converter::Str),
            "int" => Some(Converter::Int),
            "slug" => Some(Converter::Slug),
            "path" => Some(Converter::Path),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Converter::Str => "str",
            Converter::Int => "int",
            Converter::Slug => "slug",
            Converter::Path => "path",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Converter::Str => r"^[^/]+$",
            Converter::Int => r"^[0-9]+$",
            Converter::Slug => r"^[-a-zA-Z0-9_]+$",
            Converter::Path => r"^.+$",
        }
    }

    fn encode(&self, value: &str) -> String {
        match self {
            Converter::Path => value
                .split('/')
                .map(|part| urlencoding::encode(part).into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            _ => urlencoding::encode(value).into_owned(),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        converter: Converter,
        matcher: Regex,
    },
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    route: Route,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    fn compile(route: Route, placeholder: &Regex) -> Result<Self, RouteConfigError> {
        let invalid = |reason: String| RouteConfigError::InvalidRoute {
            name: route.name.clone(),
            reason,
        };

        if route.name.is_empty() {
            return Err(invalid("route name is empty".to_string()));
        }

        let mut segments = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let mut last = 0;

        for caps in placeholder.captures_iter(&route.path) {
            let Some(whole) = caps.get(0) else { continue };
            let name = caps["name"].to_string();

            let converter = match caps.name("converter") {
                Some(c) => Converter::parse(c.as_str())
                    .ok_or_else(|| invalid(format!("unknown converter '{}'", c.as_str())))?,
                None => Converter::Str,
            };

            if seen.contains(&name) {
                return Err(invalid(format!("placeholder '{name}' used twice")));
            }
            seen.push(name.clone());

            if whole.start() > last {
                segments.push(Segment::Literal(route.path[last..whole.start()].to_string()));
            }
            segments.push(Segment::Param {
                name,
                converter,
                matcher: Regex::new(converter.pattern())?,
            });
            last = whole.end();
        }

        if last < route.path.len() {
            segments.push(Segment::Literal(route.path[last..].to_string()));
        }

        Ok(Self { route, segments })
    }

    /// Fill the pattern, or explain why the arguments don't fit
    fn reverse(&self, args: &[String], kwargs: &Kwargs) -> Result<String, String> {
        let mut positional = args.iter();
        let mut used_kwargs = 0;
        let mut path = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param {
                    name,
                    converter,
                    matcher,
                } => {
                    let value = match kwargs.get(name) {
                        Some(value) => {
                            used_kwargs += 1;
                            value
                        }
                        None => positional
                            .next()
                            .ok_or_else(|| format!("missing value for '{name}'"))?,
                    };

                    if !matcher.is_match(value) {
                        return Err(format!(
                            "'{value}' does not match <{}:{name}>",
                            converter.name()
                        ));
                    }

                    path.push_str(&converter.encode(value));
                }
            }
        }

        if used_kwargs != kwargs.len() {
            let unexpected: Vec<&str> = kwargs
                .keys()
                .filter(|key| !self.has_param(key))
                .map(String::as_str)
                .collect();
            return Err(format!(
                "unexpected keyword arguments: {}",
                unexpected.join(", ")
            ));
        }

        if positional.next().is_some() {
            return Err("too many positional arguments".to_string());
        }

        Ok(path)
    }

    fn has_param(&self, key: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param { name, .. } if name == key))
    }
}

/// Compiled routes, reversible by name
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteConfigError> {
        let placeholder = Regex::new(PLACEHOLDER)?;

        let routes = routes
            .into_iter()
            .map(|route| CompiledRoute::compile(route, &placeholder))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { routes })
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|r| &r.route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteResolver for RouteTable {
    /// Routes owned by `current_app` are tried before the others
    fn reverse(
        &self,
        name: &str,
        args: &[String],
        kwargs: &Kwargs,
        current_app: Option<&str>,
    ) -> Result<String, NoReverseMatch> {
        let mut candidates: Vec<&CompiledRoute> =
            self.routes.iter().filter(|r| r.route.name == name).collect();

        if candidates.is_empty() {
            return Err(NoReverseMatch::new(name, "no route with this name"));
        }

        if let Some(app) = current_app {
            candidates.sort_by_key(|r| r.route.app.as_deref() != Some(app));
        }

        let mut reasons = Vec::new();
        for candidate in candidates {
            match candidate.reverse(args, kwargs) {
                Ok(path) => return Ok(path),
                Err(reason) => reasons.push(format!("{} ({})", candidate.route.path, reason)),
            }
        }

        Err(NoReverseMatch::new(name, reasons.join("; ")))
    }
}
