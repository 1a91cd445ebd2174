//! Core library for pagelinks
//!
//! This crate implements the **Functional Core** of pagelinks, following the
//! Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`pagelinks_core`** (this crate): Pure planning functions
//! - **`pagelinks`**: Argument parsing, configuration loading and output (the Imperative Shell)
//!
//! Every planning function is deterministic. The same page, options and
//! query always produce the same links, so everything here is tested with
//! plain fixture data.
//!
//! # Module Organization
//!
//! - [`pagination`]: Which page numbers to show, and where the ellipses go
//! - [`query`]: Ordered query parameters for rewriting the current URL
//! - [`url`]: Page URL construction and named-route resolution
//! - [`routes`]: Route table loaded from TOML, used to reverse route names
//! - [`options`]: Typed options parsed from template-style `key=value` strings
//! - [`plan`]: [`plan::PageLinkPlanner`], which ties the above together
//!
//! # Example Usage
//!
//! ```rust
//! use pagelinks_core::options::PaginateOptions;
//! use pagelinks_core::plan::{PageInfo, PageLinkPlanner};
//! use pagelinks_core::query::QueryParams;
//! use pagelinks_core::routes::RouteTable;
//!
//! let options = PaginateOptions::parse(["range=10", "url_anchor=results"]).unwrap();
//! let planner = PageLinkPlanner::new(options, RouteTable::default());
//!
//! let plan = planner
//!     .plan(&PageInfo::new(2, 30), &QueryParams::parse("q=rust"))
//!     .unwrap();
//!
//! assert_eq!(plan.entries[0].url(), Some("?q=rust&page=1#results"));
//! assert_eq!(plan.next_url.as_deref(), Some("?q=rust&page=3#results"));
//! ```

pub mod options;
pub mod pagination;
pub mod plan;
pub mod query;
pub mod routes;
pub mod url;
