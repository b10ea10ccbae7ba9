//! Type discovery
//!
//! A type opts in to JSON column treatment in one of two ways:
//!
//! 1. **Capability**: it implements [`JsonColumn`] and is declared with
//!    [`TypeDescriptor::capable`].
//! 2. **Annotation**: it is declared with [`TypeDescriptor::annotated`],
//!    which only asks for serde support.
//!
//! Types declared with [`TypeDescriptor::opaque`] are candidates that did not
//! opt in; discovery skips them. Candidates are listed explicitly, usually in
//! a [`TypeCatalog`] that plays the role of a module's type list.
//!
//! ```rust
//! use json_column::{discover, JsonColumn, TypeCatalog, TypeDescriptor};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Response { code: u16 }
//! impl JsonColumn for Response {}
//!
//! #[derive(Serialize, Deserialize)]
//! struct RequestParameter { name: String }
//!
//! struct History { id: i64 }
//!
//! let models = TypeCatalog::new("models")
//!     .with(TypeDescriptor::capable::<Response>())
//!     .with(TypeDescriptor::annotated::<RequestParameter>())
//!     .with(TypeDescriptor::opaque::<History>());
//!
//! let found = discover(&models).unwrap();
//! assert_eq!(found.len(), 2);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, TypeId};
use std::fmt;
use tracing::{debug, info};

use crate::builder::RegistryBuilder;
use crate::error::DiscoveryError;
use crate::traits::{JsonColumn, TypeSource};

type Installer = fn(&mut RegistryBuilder);

/// Candidate type with its opt-in flags
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
    capability: bool,
    annotation: bool,
    installer: Option<Installer>,
}

impl TypeDescriptor {
    /// Candidate that does not opt in
    #[must_use]
    pub fn opaque<T: 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            capability: false,
            annotation: false,
            installer: None,
        }
    }

    /// Candidate opting in through the [`JsonColumn`] capability
    #[must_use]
    pub fn capable<T: JsonColumn>() -> Self {
        Self {
            capability: true,
            installer: Some(install::<T> as Installer),
            ..Self::opaque::<T>()
        }
    }

    /// Candidate opting in through an explicit annotation
    #[must_use]
    pub fn annotated<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            annotation: true,
            installer: Some(install::<T> as Installer),
            ..Self::opaque::<T>()
        }
    }

    /// Add the annotation flag to an existing descriptor
    ///
    /// Annotating an opaque descriptor makes it eligible without giving it an
    /// adapter; discovery rejects that with
    /// [`DiscoveryError::MissingAdapter`].
    #[must_use]
    pub fn with_annotation(mut self) -> Self {
        self.annotation = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn is_capable(&self) -> bool {
        self.capability
    }

    #[must_use]
    pub fn is_annotated(&self) -> bool {
        self.annotation
    }

    /// Whether the type opted in by either mechanism
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.capability || self.annotation
    }

    pub(crate) fn install(&self, builder: &mut RegistryBuilder) -> Result<(), DiscoveryError> {
        let installer = self.installer.ok_or(DiscoveryError::MissingAdapter {
            type_name: self.name,
        })?;
        installer(builder);
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("annotation", &self.annotation)
            .field("has_adapter", &self.installer.is_some())
            .finish()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && self.capability == other.capability
            && self.annotation == other.annotation
    }
}

fn install<T>(builder: &mut RegistryBuilder)
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    builder.install::<T>();
}

/// Named list of candidate types
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    name: String,
    types: Vec<TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    pub fn push(&mut self, descriptor: TypeDescriptor) {
        self.types.push(descriptor);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }
}

impl TypeSource for TypeCatalog {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> Result<Vec<TypeDescriptor>, DiscoveryError> {
        Ok(self.types.clone())
    }
}

/// Candidate source backed by a fallible function
///
/// Models a type listing that can fail, such as one loaded from a plugin.
pub struct SourceFn<F> {
    name: String,
    list: F,
}

/// Wrap a function as a [`TypeSource`]
pub fn source_fn<F>(name: impl Into<String>, list: F) -> SourceFn<F>
where
    F: Fn() -> Result<Vec<TypeDescriptor>, String>,
{
    SourceFn {
        name: name.into(),
        list,
    }
}

impl<F> TypeSource for SourceFn<F>
where
    F: Fn() -> Result<Vec<TypeDescriptor>, String>,
{
    fn source_name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> Result<Vec<TypeDescriptor>, DiscoveryError> {
        (self.list)().map_err(|reason| DiscoveryError::Source {
            source_name: self.name.clone(),
            reason,
        })
    }
}

/// Select the candidates that opted in to JSON column treatment
///
/// # Errors
///
/// - [`DiscoveryError::Source`] if the candidates cannot be enumerated
/// - [`DiscoveryError::MissingAdapter`] if an eligible candidate has no
///   adapter
pub fn discover<S>(source: &S) -> Result<Vec<TypeDescriptor>, DiscoveryError>
where
    S: TypeSource + ?Sized,
{
    let candidates = source.candidates()?;
    debug!(
        source = source.source_name(),
        candidates = candidates.len(),
        "Scanning candidate types"
    );

    let mut found = Vec::new();
    for descriptor in candidates.into_iter().filter(TypeDescriptor::is_eligible) {
        if descriptor.installer.is_none() {
            return Err(DiscoveryError::MissingAdapter {
                type_name: descriptor.name,
            });
        }
        info!(
            type_name = descriptor.name,
            capability = descriptor.capability,
            annotation = descriptor.annotation,
            "Found JSON column type"
        );
        found.push(descriptor);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Marked;
    impl JsonColumn for Marked {}

    #[derive(Serialize, Deserialize)]
    struct Annotated;

    struct Plain;

    #[test]
    fn eligibility_is_capability_or_annotation() {
        assert!(TypeDescriptor::capable::<Marked>().is_eligible());
        assert!(TypeDescriptor::annotated::<Annotated>().is_eligible());
        assert!(!TypeDescriptor::opaque::<Plain>().is_eligible());

        let both = TypeDescriptor::capable::<Marked>().with_annotation();
        assert!(both.is_capable() && both.is_annotated());
        assert_eq!(both.type_id(), TypeId::of::<Marked>());
        assert_ne!(both.type_id(), TypeDescriptor::opaque::<Plain>().type_id());
    }

    #[test]
    fn discover_skips_opaque_types() {
        let catalog = TypeCatalog::new("models")
            .with(TypeDescriptor::opaque::<Plain>())
            .with(TypeDescriptor::capable::<Marked>())
            .with(TypeDescriptor::annotated::<Annotated>());

        let found = discover(&catalog).unwrap();
        let names: Vec<_> = found.iter().map(TypeDescriptor::name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|name| name.ends_with("Marked")));
        assert!(names.iter().any(|name| name.ends_with("Annotated")));
    }

    #[test]
    fn discover_is_repeatable() {
        let catalog = vec![
            TypeDescriptor::capable::<Marked>(),
            TypeDescriptor::opaque::<Plain>(),
        ];
        assert_eq!(discover(&catalog).unwrap(), discover(&catalog).unwrap());
    }

    #[test]
    fn annotated_opaque_type_is_rejected() {
        let catalog = vec![TypeDescriptor::opaque::<Plain>().with_annotation()];
        let err = discover(&catalog).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingAdapter { type_name } if type_name.ends_with("Plain")));
    }

    #[test]
    fn failing_source_reports_its_name() {
        let source = source_fn("plugins", || Err("metadata unavailable".to_string()));
        match discover(&source) {
            Err(DiscoveryError::Source { source_name, reason }) => {
                assert_eq!(source_name, "plugins");
                assert_eq!(reason, "metadata unavailable");
            }
            other => panic!("expected source error, got {other:?}"),
        }
    }
}
