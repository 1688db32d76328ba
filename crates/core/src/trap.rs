use crate::HostError;
use core::fmt::{self, Display};
use std::{boxed::Box, error::Error as StdError, string::String};

/// Error type which can be produced by executing Wasm code or by the host.
///
/// Under some conditions, Wasm execution may produce a [`Trap`], which
/// immediately aborts execution. Traps cannot be handled by WebAssembly
/// code outside of a `catch_all` handler, but are reported to the host
/// embedder at the invocation boundary.
#[derive(Debug)]
pub struct Trap {
    /// The boxed reason of a [`Trap`].
    reason: Box<TrapReason>,
}

#[test]
fn trap_size() {
    assert_eq!(
        core::mem::size_of::<Trap>(),
        core::mem::size_of::<*const ()>()
    );
}

/// The reason of a [`Trap`].
#[derive(Debug)]
enum TrapReason {
    /// Traps during Wasm execution.
    InstructionTrap(TrapCode),
    /// An uncaught Wasm exception identified by its defining module and tag.
    ///
    /// Carries the raw payload bytes of the thrown exception package.
    UncaughtException {
        /// The index of the tag within its defining instance.
        tag_index: u32,
        /// The packed payload bytes of the exception.
        payload: Box<[u8]>,
    },
    /// An error described by a display message.
    Message(Box<str>),
    /// Traps and errors during host function execution.
    Host(Box<dyn HostError>),
}

impl Trap {
    /// Create a new [`Trap`] from the [`TrapReason`].
    fn with_reason(reason: TrapReason) -> Self {
        Self {
            reason: Box::new(reason),
        }
    }

    /// Creates a new [`Trap`] described by a `message`.
    #[cold]
    pub fn new<T>(message: T) -> Self
    where
        T: Into<String>,
    {
        Self::with_reason(TrapReason::Message(message.into().into_boxed_str()))
    }

    /// Creates a new [`Trap`] representing an uncaught Wasm exception.
    #[cold]
    pub fn uncaught_exception(tag_index: u32, payload: Box<[u8]>) -> Self {
        Self::with_reason(TrapReason::UncaughtException { tag_index, payload })
    }

    /// Returns the [`TrapCode`] if the [`Trap`] originates from Wasm execution.
    #[inline]
    pub fn trap_code(&self) -> Option<TrapCode> {
        if let TrapReason::InstructionTrap(trap_code) = &*self.reason {
            return Some(*trap_code);
        }
        None
    }

    /// Returns the tag index and payload if the [`Trap`] carries an uncaught exception.
    #[inline]
    pub fn uncaught_exception_tag(&self) -> Option<u32> {
        if let TrapReason::UncaughtException { tag_index, .. } = &*self.reason {
            return Some(*tag_index);
        }
        None
    }

    /// Returns a shared reference to the [`HostError`] if any.
    #[inline]
    pub fn as_host(&self) -> Option<&dyn HostError> {
        if let TrapReason::Host(host_error) = &*self.reason {
            return Some(&**host_error);
        }
        None
    }

    /// Downcasts the [`Trap`] into the `T: HostError` if possible.
    ///
    /// Returns `None` otherwise.
    #[inline]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: HostError,
    {
        self.as_host()
            .and_then(<dyn HostError + 'static>::downcast_ref)
    }

    /// Consumes `self` to downcast the [`Trap`] into the `T: HostError` if possible.
    ///
    /// Returns `None` otherwise.
    #[inline]
    pub fn downcast<T>(self) -> Option<T>
    where
        T: HostError,
    {
        if let TrapReason::Host(host_error) = *self.reason {
            return host_error.downcast().ok().map(|boxed| *boxed);
        }
        None
    }
}

impl From<TrapCode> for Trap {
    #[cold]
    fn from(error: TrapCode) -> Self {
        Self::with_reason(TrapReason::InstructionTrap(error))
    }
}

impl<E> From<E> for Trap
where
    E: HostError,
{
    #[inline]
    #[cold]
    fn from(host_error: E) -> Self {
        Self::with_reason(TrapReason::Host(Box::new(host_error)))
    }
}

impl Display for TrapReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InstructionTrap(trap_code) => Display::fmt(trap_code, f),
            Self::UncaughtException { tag_index, .. } => {
                write!(f, "uncaught exception with tag {tag_index}")
            }
            Self::Message(message) => write!(f, "{message}"),
            Self::Host(host_error) => Display::fmt(host_error, f),
        }
    }
}

impl Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <TrapReason as Display>::fmt(&self.reason, f)
    }
}

impl StdError for Trap {
    fn description(&self) -> &str {
        self.trap_code().map_or("", |code| code.trap_message())
    }
}

/// An invalid [`TrapCode`] integer value.
#[derive(Debug, Copy, Clone)]
pub struct InvalidTrapCode;

macro_rules! generate_trap_code {
    (
        $( $(#[$attr:meta])* $ident:ident = $discr:literal ),* $(,)?
    ) => {
        /// A deterministic runtime failure defined by WebAssembly semantics.
        ///
        /// Every trap carries a fixed code. All traps propagate through the
        /// same unwind mechanism as Wasm exceptions; only `catch_all`
        /// handlers may recover them.
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        #[repr(u8)]
        pub enum TrapCode {
            $(
                $( #[$attr] )*
                $ident = $discr
            ),*
        }

        impl From<TrapCode> for u8 {
            fn from(trap_code: TrapCode) -> Self {
                trap_code as _
            }
        }

        impl TryFrom<u8> for TrapCode {
            type Error = InvalidTrapCode;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $discr => Ok(TrapCode::$ident), )*
                    _ => Err(InvalidTrapCode),
                }
            }
        }

        #[test]
        fn trap_code_conversion() {
            $(
                assert_eq!(
                    TrapCode::try_from(TrapCode::$ident as u8).unwrap(),
                    TrapCode::$ident,
                );
            )*
            assert!(TrapCode::try_from(u8::MAX).is_err());
        }
    };
}
generate_trap_code! {
    // Note: zero is deliberately unassigned so that it can serve as the
    //       "no error" state of an execution context error field.

    /// Wasm code executed an `unreachable` instruction.
    UnreachableExecuted = 1,

    /// Attempt to load or store at an address which lies outside
    /// the bounds of the accessed linear memory.
    OutOfBoundsMemAccess = 2,

    /// Attempt to access a table element at an index which lies
    /// outside the bounds of the table.
    OutOfBoundsTableAccess = 3,

    /// A `call_indirect` was executed with a table index that lies
    /// out of the bounds of the table.
    UndefinedElement = 4,

    /// A `call_indirect` was executed on a table slot holding a null
    /// reference.
    UninitializedElement = 5,

    /// The function found by a `call_indirect` does not match the
    /// function type expected at the call site.
    IndirectCallTypeMismatch = 6,

    /// Attempt to divide an integer by zero.
    IntegerDivideByZero = 7,

    /// An integer arithmetic operation overflowed.
    ///
    /// Signed division of -2<sup>N-1</sup> by -1 is the canonical case.
    IntegerOverflow = 8,

    /// Attempted to truncate a NaN, infinity, or out-of-range float
    /// into an integer type.
    InvalidConversionToInteger = 9,

    /// The frame stack or call depth limit was exhausted.
    StackOverflow = 10,

    /// A null reference was dereferenced.
    ///
    /// Raised by `call_ref`, `struct.get/set`, `array.*`, `ref.as_non_null`
    /// and `throw_ref` when the operand reference is null.
    NullAccess = 11,

    /// A `ref.cast` failed because the operand is not a subtype of the
    /// target type.
    InvalidCast = 12,

    /// Attempt to access an array element at an index which lies outside
    /// the bounds of the array.
    OutOfBoundsArrayAccess = 13,

    /// A thrown exception crossed the outermost frame without being caught.
    UnhandledException = 14,

    /// The host requested asynchronous termination of the execution.
    Terminated = 15,

    /// A `memory.atomic.wait` was executed on an unshared memory.
    ExpectedSharedMemory = 16,
}

impl TrapCode {
    /// Returns the trap message as specified by the WebAssembly specification.
    ///
    /// # Note
    ///
    /// This API is primarily useful for the Wasm spec testsuite but might
    /// have other uses since it avoids heap memory allocation in certain
    /// cases.
    pub fn trap_message(&self) -> &'static str {
        match self {
            Self::UnreachableExecuted => "unreachable executed",
            Self::OutOfBoundsMemAccess => "out of bounds memory access",
            Self::OutOfBoundsTableAccess => "out of bounds table access",
            Self::UndefinedElement => "undefined element",
            Self::UninitializedElement => "uninitialized element",
            Self::IndirectCallTypeMismatch => "indirect call type mismatch",
            Self::IntegerDivideByZero => "integer divide by zero",
            Self::IntegerOverflow => "integer overflow",
            Self::InvalidConversionToInteger => "invalid conversion to integer",
            Self::StackOverflow => "call stack exhausted",
            Self::NullAccess => "null access",
            Self::InvalidCast => "cast failure",
            Self::OutOfBoundsArrayAccess => "out of bounds array access",
            Self::UnhandledException => "unhandled exception",
            Self::Terminated => "terminated by host",
            Self::ExpectedSharedMemory => "expected shared memory",
        }
    }
}

impl Display for TrapCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.trap_message())
    }
}
