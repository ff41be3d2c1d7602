/// A list spec that is internally inconsistent.
///
/// Raised only while specs are built at startup; a malformed spec must abort
/// startup rather than degrade at request time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("{entity}: default page size must be at least 1")]
    ZeroPageSize { entity: String },

    #[error("{entity}: default page size {default} exceeds max page size {max}")]
    DefaultExceedsMax { entity: String, default: u32, max: u32 },

    #[error("{entity}: no default sort configured")]
    MissingDefaultSort { entity: String },

    #[error("{entity}: empty field name for key '{key}'")]
    EmptyField { entity: String, key: String },

    #[error("{entity}: enum filter '{key}' declares no allowed values")]
    EmptyEnum { entity: String, key: String },

    #[error("{entity}: key '{key}' declared more than once")]
    DuplicateKey { entity: String, key: String },
}
