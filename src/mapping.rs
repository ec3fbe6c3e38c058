//! The mapping capability consumed by the Krasnoselskii–Mann iteration.
//!
//! A [`Mapping`] is any rule `x ↦ T(x)` on vectors of a fixed dimension. The
//! iteration only converges when `T` is non-expansive (1-Lipschitz); that
//! property is the caller's responsibility and is never verified here.

use std::marker::PhantomData;

use nalgebra::DVector;

use crate::error::KmError;

/// A vector-valued map `T: R^n -> R^n` applied by the iteration engine.
pub trait Mapping {
    /// Error produced when the mapping cannot be evaluated.
    type Error;

    /// Evaluates `T(x)`.
    ///
    /// The returned vector must have the same dimension as `x`.
    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;
}

impl<M: Mapping + ?Sized> Mapping for &M {
    type Error = M::Error;

    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        (**self).apply(x)
    }
}

impl<M: Mapping + ?Sized> Mapping for Box<M> {
    type Error = M::Error;

    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        (**self).apply(x)
    }
}

/// Adapter turning a closure into a [`Mapping`]. Built by [`from_fn`] or [`try_from_fn`].
pub struct FnMapping<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F: Clone, E> Clone for FnMapping<F, E> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _error: PhantomData,
        }
    }
}

impl<F, E> std::fmt::Debug for FnMapping<F, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMapping").finish_non_exhaustive()
    }
}

impl<F, E> Mapping for FnMapping<F, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    type Error = E;

    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>, E> {
        (self.f)(x)
    }
}

/// Wraps an infallible closure. The resulting mapping reports [`KmError`] so it
/// composes with the built-in projections.
pub fn from_fn<F>(
    f: F,
) -> FnMapping<impl Fn(&DVector<f64>) -> Result<DVector<f64>, KmError>, KmError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    FnMapping {
        f: move |x: &DVector<f64>| Ok::<_, KmError>(f(x)),
        _error: PhantomData,
    }
}

/// Wraps a fallible closure. Its error type is returned unchanged by
/// [`KrasnoselskiiMann::solve`](crate::iteration::KrasnoselskiiMann::solve).
pub fn try_from_fn<F, E>(f: F) -> FnMapping<F, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    FnMapping {
        f,
        _error: PhantomData,
    }
}
