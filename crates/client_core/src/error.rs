use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} are empty or too large")]
    InvalidDimensions { width: usize, height: usize },
    #[error("frame has {actual} cells, expected {expected}")]
    FrameLength { expected: usize, actual: usize },
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server url must start with http://, https://, ws:// or wss://, got '{0}'")]
    UnsupportedScheme(String),
}
