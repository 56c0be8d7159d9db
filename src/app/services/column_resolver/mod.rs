//! Column resolution for observation files
//!
//! Maps one [`VariableColumnSpec`](crate::app::models::VariableColumnSpec) to
//! exactly one column of a [`ParsedFile`](crate::app::models::ParsedFile).
//!
//! # Resolution Stages
//!
//! 1. **Candidate filter** ([`candidates`]): component name, effective matrix
//!    and statistic must be acceptable
//! 2. **Wavelength** ([`wavelength`]): only for specs with a target
//!    wavelength, keep the in-tolerance columns closest to the target
//! 3. **Tie-break cascade** ([`tie_break`]): matrix preference, statistic
//!    preference, fewest missing samples, then lowest column index
//!
//! An empty candidate set is a per-variable [`ObsError::VariableNotFound`];
//! a residual tie for a spec with `require_unique` is an
//! [`ObsError::ResolutionFailure`].
//!
//! [`ObsError::VariableNotFound`]: crate::error::ObsError::VariableNotFound
//! [`ObsError::ResolutionFailure`]: crate::error::ObsError::ResolutionFailure

pub mod candidates;
pub mod resolver;
pub mod tie_break;
pub mod wavelength;

#[cfg(test)]
pub mod tests;

pub use candidates::find_candidates;
pub use resolver::ColumnResolver;
pub use wavelength::filter_by_wavelength;
