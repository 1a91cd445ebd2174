//! Typed pagination options
//!
//! Options arrive as template-style `key=value` strings. They are parsed and
//! validated here, before any page is planned, so a bad value fails the whole
//! request instead of silently falling back to a default.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::query::QueryParams;
use crate::url::{Kwargs, UrlContext, UrlTarget, DEFAULT_PAGE_PARAM};

/// A string is not a recognised truth value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid truth value: '{0}'")]
pub struct ParseBoolError(pub String);

/// Parse a boolean-like string
///
/// Case-insensitive, surrounding whitespace ignored. Accepts `true`, `t`,
/// `1`, `false`, `f` and `0`.
pub fn str_to_bool(value: &str) -> Result<bool, ParseBoolError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(ParseBoolError(value.to_string())),
    }
}

/// Error type for option parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Expected key=value, got '{0}'")]
    Malformed(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Option '{0}' given more than once")]
    Duplicate(String),

    #[error("Invalid value for '{option}': {reason}")]
    InvalidValue { option: String, reason: String },

    #[error("Invalid value for '{option}': {source}")]
    InvalidBool {
        option: String,
        #[source]
        source: ParseBoolError,
    },
}

/// Validated configuration for one pagination control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginateOptions {
    /// Window size. `0` shows every page.
    pub range: usize,
    pub url_view_name: Option<String>,
    pub url_param_name: String,
    pub url_extra_args: Vec<String>,
    pub url_extra_kwargs: Kwargs,
    /// Replaces the request's query parameters when set
    pub url_get_params: Option<QueryParams>,
    pub url_anchor: Option<String>,
    pub current_app: Option<String>,
    pub show_prev_next: bool,
    pub show_first_last: bool,
    pub show_index_range: bool,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            range: 0,
            url_view_name: None,
            url_param_name: DEFAULT_PAGE_PARAM.to_string(),
            url_extra_args: Vec::new(),
            url_extra_kwargs: Kwargs::new(),
            url_get_params: None,
            url_anchor: None,
            current_app: None,
            show_prev_next: true,
            show_first_last: false,
            show_index_range: false,
        }
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn invalid(option: &str, reason: impl Into<String>) -> OptionsError {
    OptionsError::InvalidValue {
        option: option.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(option: &str, value: &str) -> Result<String, OptionsError> {
    if value.is_empty() {
        return Err(invalid(option, "value must not be empty"));
    }
    Ok(value.to_string())
}

fn parse_flag(option: &str, value: &str) -> Result<bool, OptionsError> {
    str_to_bool(value).map_err(|source| OptionsError::InvalidBool {
        option: option.to_string(),
        source,
    })
}

/// `a,b,c`; blank items are dropped
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `key:value,key:value`
fn parse_kwargs(option: &str, value: &str) -> Result<Kwargs, OptionsError> {
    let mut kwargs = Kwargs::new();

    for item in parse_list(value) {
        let (key, val) = item
            .split_once(':')
            .ok_or_else(|| invalid(option, format!("expected key:value, got '{item}'")))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(invalid(option, format!("empty key in '{item}'")));
        }

        kwargs.insert(key.to_string(), val.trim().to_string());
    }

    Ok(kwargs)
}

impl PaginateOptions {
    /// Parse `key=value` arguments
    ///
    /// Values may be wrapped in single or double quotes. Every key may appear
    /// at most once. Unlisted keys keep their defaults.
    pub fn parse<I, S>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut seen = BTreeSet::new();

        for arg in args {
            let arg = arg.as_ref();
            let (key, raw) = arg
                .split_once('=')
                .ok_or_else(|| OptionsError::Malformed(arg.to_string()))?;

            let key = key.trim();
            if key.is_empty() {
                return Err(OptionsError::Malformed(arg.to_string()));
            }
            if !seen.insert(key.to_string()) {
                return Err(OptionsError::Duplicate(key.to_string()));
            }

            let value = unquote(raw);

            match key {
                "range" => {
                    options.range = value
                        .parse::<usize>()
                        .map_err(|_| invalid(key, "expected a non-negative integer"))?;
                }
                "url_view_name" => options.url_view_name = Some(non_empty(key, value)?),
                "url_param_name" => options.url_param_name = non_empty(key, value)?,
                "url_extra_args" => options.url_extra_args = parse_list(value),
                "url_extra_kwargs" => options.url_extra_kwargs = parse_kwargs(key, value)?,
                "url_get_params" => options.url_get_params = Some(QueryParams::parse(value)),
                "url_anchor" => {
                    options.url_anchor = Some(non_empty(key, value.trim_start_matches('#'))?)
                }
                "current_app" => options.current_app = Some(non_empty(key, value)?),
                "show_prev_next" => options.show_prev_next = parse_flag(key, value)?,
                "show_first_last" => options.show_first_last = parse_flag(key, value)?,
                "show_index_range" => options.show_index_range = parse_flag(key, value)?,
                _ => return Err(OptionsError::UnknownOption(key.to_string())),
            }
        }

        Ok(options)
    }

    /// URL context for these options
    ///
    /// `path` and `request_query` describe the current request. The
    /// request's query is used unless `url_get_params` overrides it.
    pub fn url_context(&self, path: &str, request_query: &QueryParams) -> UrlContext {
        let target = match &self.url_view_name {
            Some(view) => UrlTarget::NamedRoute {
                route_name: view.clone(),
                args: self.url_extra_args.clone(),
                kwargs: self.url_extra_kwargs.clone(),
            },
            None => UrlTarget::QueryRewrite {
                path: path.to_string(),
            },
        };

        UrlContext {
            target,
            page_param: self.url_param_name.clone(),
            query: self
                .url_get_params
                .clone()
                .unwrap_or_else(|| request_query.clone()),
            anchor: self.url_anchor.clone(),
            current_app: self.current_app.clone(),
        }
    }
}
