use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Cookshelf operations.
///
/// Resolution variants carry the package name and the offending constraint
/// text so callers can render a precise message.
#[derive(Debug, Error, Diagnostic)]
pub enum ShelfError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Version text is not `x.y` or `x.y.z`.
    #[error("Invalid version '{version}'")]
    #[diagnostic(
        code(cookshelf::version),
        help("Versions must be two or three dot-separated numbers, like 1.2 or 1.2.3")
    )]
    InvalidVersionFormat { version: String },

    /// Constraint text is not exactly `OP VERSION`.
    #[error("Constraint '{constraint}' was not well-formed")]
    #[diagnostic(
        code(cookshelf::constraint),
        help("Constraints look like '>= 1.2.3': an operator, one space, a version")
    )]
    InvalidConstraintFormat { constraint: String },

    /// Constraint operator is not one of `=`, `>`, `>=`, `<`, `<=`, `~>`.
    #[error("Constraint '{constraint}' uses unknown operator '{operator}'")]
    #[diagnostic(code(cookshelf::constraint))]
    InvalidConstraint { constraint: String, operator: String },

    /// Run-list entry is not `name[::qualifier][@version]`.
    #[error("Invalid run list entry '{entry}'")]
    InvalidRunListEntry { entry: String },

    /// Version count for an info summary is not empty, `all`, or a number.
    #[error("Invalid number of versions '{count}'")]
    InvalidVersionCount { count: String },

    /// A run-list constraint and an environment constraint cannot both hold.
    #[error(
        "This run list has a constraint '{requested}' for {package} that conflicts with '{environment}' in the environment's cookbook versions"
    )]
    #[diagnostic(code(cookshelf::resolve::environment))]
    ConstraintConflict {
        package: String,
        requested: String,
        environment: String,
    },

    /// A transitive dependency constraint conflicts with constraints already
    /// collected for that package.
    #[error(
        "Cookbook {dependent} (ver {dependent_version}) depends on {package} matching '{constraint}', which conflicts with the previous constraints '{existing}'"
    )]
    #[diagnostic(code(cookshelf::resolve::dependency))]
    DependencyConflict {
        package: String,
        dependent: String,
        dependent_version: String,
        constraint: String,
        existing: String,
    },

    /// No version of a package satisfies its accumulated constraints.
    #[error("No version of {package} could satisfy the requested constraints: {constraints}")]
    #[diagnostic(code(cookshelf::resolve::unsatisfiable))]
    NoSatisfyingVersion { package: String, constraints: String },

    /// The named package does not exist.
    #[error("Cannot find a cookbook named {package}")]
    NotFound { package: String },

    /// The package exists but has no such version.
    #[error("Cannot find a cookbook named {package} with version {version}")]
    VersionNotFound { package: String, version: String },

    /// A version was created a second time instead of being updated.
    #[error("Version {version} of cookbook {package} already exists")]
    #[diagnostic(help("Update the existing version instead"))]
    VersionExists { package: String, version: String },

    /// Metadata update on a frozen version without `force`.
    #[error("The cookbook {package} at version {version} is frozen")]
    #[diagnostic(help("Use the 'force' option to override"))]
    Frozen { package: String, version: String },

    /// Package name contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid cookbook name '{name}'")]
    #[diagnostic(help("Names must only contain A-Z, a-z, 0-9, _ or -"))]
    InvalidName { name: String },

    /// An uploaded cookbook version failed validation.
    #[error("{message}")]
    Validation { message: String },

    /// Registry configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for results carrying a [`ShelfError`].
pub type ShelfResult<T> = Result<T, ShelfError>;
