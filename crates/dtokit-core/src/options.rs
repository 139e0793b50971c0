//! Mapper configuration

/// Default ceiling on nested construction depth
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Options controlling a [`Mapper`](crate::Mapper)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    /// Maximum nesting depth of constructed instances (None = unlimited)
    ///
    /// The top-level instance is depth 0 and every nested construction adds
    /// one. Without a limit, a type that contains itself and is fed
    /// self-similar input recurses until the stack is exhausted.
    pub max_depth: Option<usize>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl MapperOptions {
    /// Create options with a specific depth ceiling
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    /// Create options without a depth ceiling
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }
}
