//! Engine configuration.

use super::limits::StackLimits;
use wasmparser::WasmFeatures;

/// The execution backend executing compiled bytecode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ExecutionBackend {
    /// The bytecode interpreter; always available.
    #[default]
    Interpreter,
    /// A registered JIT backend, falling back to the interpreter for
    /// functions the backend rejects.
    Jit,
}

/// Configuration of an [`Engine`].
///
/// [`Engine`]: crate::Engine
#[derive(Debug, Clone)]
pub struct Config {
    /// The limits of the value stack and call depth.
    stack_limits: StackLimits,
    /// The execution backend.
    backend: ExecutionBackend,
    /// Is `true` if the `simd` and `relaxed-simd` proposals are enabled.
    simd: bool,
    /// Is `true` if the `threads` proposal is enabled.
    threads: bool,
    /// Is `true` if the `exception-handling` proposal is enabled.
    exceptions: bool,
    /// Is `true` if the `tail-call` proposal is enabled.
    tail_call: bool,
    /// Is `true` if the `multi-memory` proposal is enabled.
    multi_memory: bool,
    /// Is `true` if the `memory64` proposal is enabled.
    memory64: bool,
    /// Is `true` if the `function-references` and `gc` proposals are enabled.
    gc: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_limits: StackLimits::default(),
            backend: ExecutionBackend::default(),
            simd: true,
            threads: true,
            exceptions: true,
            tail_call: true,
            multi_memory: true,
            memory64: true,
            gc: true,
        }
    }
}

macro_rules! impl_config_switch {
    ( $( fn $name:ident($field:ident); )* ) => {
        $(
            #[doc = concat!("Enables or disables the `", stringify!($field), "` feature.")]
            pub fn $name(&mut self, enabled: bool) -> &mut Self {
                self.$field = enabled;
                self
            }
        )*
    };
}

impl Config {
    impl_config_switch! {
        fn wasm_simd(simd);
        fn wasm_threads(threads);
        fn wasm_exceptions(exceptions);
        fn wasm_tail_call(tail_call);
        fn wasm_multi_memory(multi_memory);
        fn wasm_memory64(memory64);
        fn wasm_gc(gc);
    }

    /// Sets the stack limits.
    pub fn set_stack_limits(&mut self, limits: StackLimits) -> &mut Self {
        self.stack_limits = limits;
        self
    }

    /// Returns the stack limits.
    pub fn stack_limits(&self) -> StackLimits {
        self.stack_limits
    }

    /// Selects the execution backend.
    pub fn set_backend(&mut self, backend: ExecutionBackend) -> &mut Self {
        self.backend = backend;
        self
    }

    /// Returns the selected execution backend.
    pub fn backend(&self) -> ExecutionBackend {
        self.backend
    }

    /// Returns the [`WasmFeatures`] handed to the validating parser.
    pub(crate) fn wasm_features(&self) -> WasmFeatures {
        let mut features = WasmFeatures::default();
        features.set(WasmFeatures::SIMD, self.simd);
        features.set(WasmFeatures::RELAXED_SIMD, self.simd);
        features.set(WasmFeatures::THREADS, self.threads);
        features.set(WasmFeatures::EXCEPTIONS, self.exceptions);
        features.set(WasmFeatures::LEGACY_EXCEPTIONS, self.exceptions);
        features.set(WasmFeatures::TAIL_CALL, self.tail_call);
        features.set(WasmFeatures::MULTI_MEMORY, self.multi_memory);
        features.set(WasmFeatures::MEMORY64, self.memory64);
        features.set(WasmFeatures::FUNCTION_REFERENCES, self.gc);
        features.set(WasmFeatures::GC, self.gc);
        features
    }
}
