use core::fmt::{Debug, Display};
use downcast_rs::{impl_downcast, DowncastSync};

/// Trait that allows the host to return custom error.
///
/// It should be useful for representing custom traps,
/// troubles at instantiation time or other host specific conditions.
///
/// Types that implement this trait can automatically be converted to a
/// `Trap` via the blanket `From` conversion and will cross the interpreter
/// as a captured exception carrying the host tag.
///
/// # Examples
///
/// ```rust
/// use std::fmt;
/// use rosmar_core::HostError;
///
/// #[derive(Debug)]
/// struct MyError {
///     code: u32,
/// }
///
/// impl fmt::Display for MyError {
///     fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
///         write!(f, "MyError, code={}", self.code)
///     }
/// }
///
/// impl HostError for MyError {}
/// ```
pub trait HostError: 'static + Display + Debug + DowncastSync {}
impl_downcast!(HostError);
