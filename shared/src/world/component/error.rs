use thiserror::Error;

/// Errors that can occur while declaring or packing a component
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// Number of values handed to a layout does not match its field count
    #[error("Component layout declares {expected} field(s) but {found} value(s) were supplied")]
    LayoutMismatch { expected: usize, found: usize },

    /// A layout may address at most 256 fields
    #[error("Component layout cannot hold more than {max} fields")]
    TooManyFields { max: usize },
}
