//! Injectable callables with explicitly declared parameters.
//!
//! Instead of discovering dependencies from a signature at call time, every
//! parameter is declared up front, in order, alongside the body:
//!
//! ```text
//! let drive = Injectable::builder("drive")
//!     .gets::<dyn Engine>("engine")               // injected
//!     .gets_tagged::<dyn Engine>("spare", "gas")  // injected, tagged
//!     .arg("distance")                            // always explicit
//!     .build(|args| {
//!         let engine = args.get::<dyn Engine>("engine")?;
//!         let distance = args.get::<u32>("distance")?;
//!         Ok(engine.drive(*distance))
//!     });
//! ```
//!
//! The resolver fills injected slots and hands the rest to explicit arguments
//! positionally; the body sees one [`Arguments`] in declaration order.

use std::fmt;
use std::sync::Arc;

use jooce_ir::{InjectionKey, InjectionMeta, Instance, SharedMeta, Tag};

use crate::{ArgumentError, BoxError};

type Body<R> = Arc<dyn Fn(&Arguments) -> Result<R, BoxError> + Send + Sync>;

/// How a declared parameter is filled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Carries injection metadata; falls back to an explicit argument when the
    /// key is not registered.
    Injected(SharedMeta),
    /// Plain typed parameter; injected under its default key when registered.
    Typed(InjectionKey),
    /// Never injected.
    Explicit,
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    name: &'static str,
    kind: ParamKind,
}

impl Param {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Key to resolve this parameter under, if it may be injected.
    pub fn injection_key(&self) -> Option<&InjectionKey> {
        match &self.kind {
            ParamKind::Injected(meta) => Some(meta.key()),
            ParamKind::Typed(key) => Some(key),
            ParamKind::Explicit => None,
        }
    }
}

/// A callable whose parameters are declared for injection.
pub struct Injectable<R> {
    name: &'static str,
    params: Arc<[Param]>,
    body: Body<R>,
}

impl Injectable<()> {
    /// Start declaring a callable named `name`.
    ///
    /// The result type is fixed by the body passed to
    /// [`InjectableBuilder::build`].
    pub fn builder(name: &'static str) -> InjectableBuilder {
        InjectableBuilder {
            name,
            params: Vec::new(),
        }
    }
}

impl<R> Injectable<R> {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind `values` (one per declared parameter, in order) to this callable's
    /// parameter names.
    pub fn arguments(&self, values: Vec<Instance>) -> Arguments {
        Arguments {
            params: Arc::clone(&self.params),
            values,
        }
    }

    /// Run the body with fully populated arguments.
    pub fn call(&self, args: &Arguments) -> Result<R, BoxError> {
        (self.body)(args)
    }

    /// Same parameters, with `f` applied to the body's result.
    pub fn map<U>(self, f: impl Fn(R) -> U + Send + Sync + 'static) -> Injectable<U>
    where
        R: 'static,
        U: 'static,
    {
        let body = self.body;
        Injectable {
            name: self.name,
            params: self.params,
            body: Arc::new(move |args: &Arguments| body(args).map(&f)),
        }
    }
}

impl<R> Clone for Injectable<R> {
    fn clone(&self) -> Self {
        Injectable {
            name: self.name,
            params: Arc::clone(&self.params),
            body: Arc::clone(&self.body),
        }
    }
}

impl<R> fmt::Debug for Injectable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injectable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder declaring an injectable's parameters in order.
#[derive(Clone, Debug)]
pub struct InjectableBuilder {
    name: &'static str,
    params: Vec<Param>,
}

impl InjectableBuilder {
    fn push(mut self, name: &'static str, kind: ParamKind) -> Self {
        self.params.push(Param { name, kind });
        self
    }

    /// Parameter declared with metadata requesting `T`.
    #[must_use]
    pub fn gets<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.gets_keyed(name, InjectionKey::of::<T>())
    }

    /// Parameter declared with metadata requesting `T` under `tag`.
    #[must_use]
    pub fn gets_tagged<T: ?Sized + 'static>(
        self,
        name: &'static str,
        tag: impl Into<Tag>,
    ) -> Self {
        self.gets_keyed(name, InjectionKey::tagged::<T>(tag))
    }

    /// Parameter declared with metadata requesting an arbitrary key.
    #[must_use]
    pub fn gets_keyed(self, name: &'static str, key: InjectionKey) -> Self {
        self.declare(name, SharedMeta::new(InjectionMeta::new(key)))
    }

    /// Parameter declared with an existing (possibly interned) carrier.
    #[must_use]
    pub fn declare(self, name: &'static str, meta: SharedMeta) -> Self {
        self.push(name, ParamKind::Injected(meta))
    }

    /// Plain parameter of type `T`, injected only if `T` itself is registered.
    #[must_use]
    pub fn param<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.push(name, ParamKind::Typed(InjectionKey::of::<T>()))
    }

    /// Parameter that is always passed explicitly.
    #[must_use]
    pub fn arg(self, name: &'static str) -> Self {
        self.push(name, ParamKind::Explicit)
    }

    pub fn build<R, F>(self, body: F) -> Injectable<R>
    where
        F: Fn(&Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Injectable {
            name: self.name,
            params: self.params.into(),
            body: Arc::new(body),
        }
    }
}

/// Populated arguments, in declaration order.
#[derive(Clone, Debug)]
pub struct Arguments {
    params: Arc<[Param]>,
    values: Vec<Instance>,
}

impl Arguments {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `index`.
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.values.get(index)
    }

    /// Typed value of the parameter declared as `name`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ArgumentError> {
        let index = self
            .params
            .iter()
            .position(|param| param.name == name)
            .ok_or_else(|| ArgumentError::Missing {
                name: name.to_owned(),
            })?;
        self.at(index)
    }

    /// Typed value at `index`.
    pub fn at<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Arc<T>, ArgumentError> {
        let name = self
            .params
            .get(index)
            .map_or_else(|| index.to_string(), |param| param.name.to_owned());
        let instance = self
            .values
            .get(index)
            .ok_or_else(|| ArgumentError::Missing { name: name.clone() })?;
        instance
            .downcast::<T>()
            .ok_or_else(|| ArgumentError::TypeMismatch {
                name,
                expected: std::any::type_name::<T>(),
                found: instance.type_name(),
            })
    }
}
