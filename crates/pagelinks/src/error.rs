#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No routes configured. Pass --config or set PAGELINKS_CONFIG")]
    NoRoutes,
}
