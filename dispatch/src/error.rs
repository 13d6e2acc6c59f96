use thiserror::Error;

/// Failure taxonomy of the reduction/merge core. Every variant is
/// surfaced to the caller unmodified; the core never retries, both the
/// reducer and the merger are deterministic so a retry with the same
/// input would reproduce the same error.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed or schema-mismatched table input.
    #[error(transparent)]
    Format(#[from] order_parser::FormatError),
    /// An order references a location the distance matrix does not know.
    #[error("no distance entry for location {0:?}")]
    Lookup(String),
    /// A result row does not fit the canonical schedule schema.
    #[error("result row has {found} columns, schedule schema has {expected}")]
    SchemaMismatch { expected: usize, found: usize },
    /// The merged order-key set does not equal the original model's.
    #[error("merged schedule is inconsistent: missing {missing:?}, duplicated {duplicated:?}, unknown {unknown:?}")]
    Consistency {
        missing: Vec<String>,
        duplicated: Vec<String>,
        unknown: Vec<String>,
    },
    /// A reduction strategy produced an overlapping or incomplete
    /// partition. This is a defect in the strategy, not a user error.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
