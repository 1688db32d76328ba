//! The trampolined bytecode interpreter.
//!
//! A single dispatch loop executes the encoded instruction stream of one
//! function; calls allocate the callee frame at the caller's call-scratch
//! offset and recurse. No host-language unwinding crosses the loop:
//! handlers return control values, the unwinder routes traps and
//! exceptions through the translator's try tables, and host `Err` values
//! are only constructed at the public API boundary.

mod ops;

use crate::{
    engine::{CompiledFuncEntity, Engine},
    error::Error,
    func::{FuncEntity, FuncIdx, HostTrampoline},
    gc::{GcObject, RawRef},
    instance::InstanceIdx,
    store::StoreInner,
    tag::TagIdx,
    types::FuncType,
    value::Value,
};
use rosmar_ir::{CatchBlock, OpPos, StackOffset, TryBlockIdx};
use rosmar_core::{LittleEndianConvert, Trap, TrapCode};
use crate::collections::ArenaIndex;
use std::{sync::Arc, vec, vec::Vec};

/// The sentinel tag index carried by exception packages that wrap traps
/// and host errors; never allocated as a real tag.
const TRAP_TAG: usize = u32::MAX as usize;

/// The reason an activation is being unwound.
#[derive(Debug)]
pub(crate) enum Unwind {
    /// A deterministic runtime failure with its fixed code.
    Trap(TrapCode),
    /// A thrown Wasm exception package.
    Exception(RawRef),
    /// An error returned from a host function.
    Host(Trap),
}

/// How the dispatch loop proceeds after one instruction.
#[derive(Debug)]
enum Flow {
    /// Advance to the next instruction.
    Next,
    /// Jump to the byte position within the code buffer.
    Jump(usize),
    /// Return from the function.
    Return,
    /// Restart the loop with a new function, reusing the activation.
    TailCall {
        compiled: Arc<CompiledFuncEntity>,
        instance: InstanceIdx,
    },
}

/// The per-call execution state.
///
/// One level exists per in-flight call; JITted code hands values back and
/// forth through the scratch temporaries.
#[derive(Debug)]
pub(crate) struct ExecutionContext {
    /// The instance the executing function belongs to.
    pub instance: InstanceIdx,
    /// The program counter: a byte position within the code buffer.
    pub pc: usize,
    /// The base of the activation's frame within the value stack.
    pub base: usize,
    /// The most recently captured exception package.
    pub captured_exception: RawRef,
    /// The pending error tag, cleared when a handler recovers it.
    pub error: Option<TrapCode>,
    /// Scratch integer temporaries for callbacks from JITted code.
    #[allow(dead_code)]
    pub scratch: [u64; 4],
}

/// The contiguous byte stack holding all frames of an invocation.
#[derive(Debug)]
pub(crate) struct ValueStack {
    bytes: Vec<u8>,
    limit: usize,
}

impl ValueStack {
    /// Creates a stack with the configured initial size and limit.
    fn new(initial: usize, limit: usize) -> Self {
        Self {
            bytes: vec![0x00; initial],
            limit,
        }
    }

    /// Ensures the stack covers `len` bytes.
    ///
    /// # Errors
    ///
    /// [`TrapCode::StackOverflow`] when `len` exceeds the limit.
    fn ensure(&mut self, len: usize) -> Result<(), TrapCode> {
        if len > self.limit {
            return Err(TrapCode::StackOverflow);
        }
        if len > self.bytes.len() {
            self.bytes.resize(len, 0x00);
        }
        Ok(())
    }

    /// Reads a value at the byte position.
    #[inline]
    fn read<T: LittleEndianConvert>(&self, at: usize) -> T {
        let mut bytes = T::Bytes::default();
        let len = bytes.as_ref().len();
        bytes.as_mut().copy_from_slice(&self.bytes[at..at + len]);
        T::from_le_bytes(bytes)
    }

    /// Writes a value at the byte position.
    #[inline]
    fn write<T: LittleEndianConvert>(&mut self, at: usize, value: T) {
        let bytes = value.into_le_bytes();
        let len = bytes.as_ref().len();
        self.bytes[at..at + len].copy_from_slice(bytes.as_ref());
    }

    /// Returns the bytes at `at..at + len`.
    #[inline]
    fn slice(&self, at: usize, len: usize) -> &[u8] {
        &self.bytes[at..at + len]
    }

    /// Returns the bytes at `at..at + len` for writing.
    #[inline]
    fn slice_mut(&mut self, at: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[at..at + len]
    }

    /// Copies `len` bytes between stack positions.
    #[inline]
    fn copy(&mut self, src: usize, dst: usize, len: usize) {
        self.bytes.copy_within(src..src + len, dst);
    }

    /// Zeroes the bytes at `at..at + len`.
    fn zero(&mut self, at: usize, len: usize) {
        self.bytes[at..at + len].fill(0x00);
    }
}

/// Calls the function with the given arguments from the host side.
pub(crate) fn call_func(
    store: &mut StoreInner,
    func: FuncIdx,
    args: &[Value],
) -> Result<Vec<Value>, Error> {
    let engine = store.engine().clone();
    let ty = store.funcs[func].ty();
    let func_type = engine.resolve_func_type(ty);
    check_args(&func_type, args)?;
    match &store.funcs[func] {
        FuncEntity::Host(host) => {
            let trampoline = host.trampoline.clone();
            call_host_from_api(&func_type, &trampoline, args)
        }
        FuncEntity::Wasm(wasm) => {
            let compiled = engine.resolve_compiled_func(wasm.func);
            let instance = wasm.instance;
            let limits = engine.config().stack_limits();
            let mut executor = Executor {
                stack: ValueStack::new(
                    limits.initial_value_stack_size,
                    limits.maximum_value_stack_size,
                ),
                store,
                engine: engine.clone(),
                depth_limit: limits.maximum_recursion_depth,
            };
            executor
                .stack
                .ensure(compiled.frame_size as usize)
                .map_err(|code| Error::Trap(code.into()))?;
            let param_offsets = func_type.param_offsets();
            for (arg, offset) in args.iter().zip(&param_offsets) {
                let at = *offset as usize;
                let size = usize::from(arg_frame_size(arg));
                arg.write_to(executor.stack.slice_mut(at, size));
            }
            match executor.execute_compiled(instance, compiled, 0, 0) {
                Ok(()) => {}
                Err(unwind) => return Err(unwind_to_error(executor.store, unwind)),
            }
            let mut results = Vec::with_capacity(func_type.results().len());
            for (ty, offset) in func_type.results().iter().zip(func_type.result_offsets()) {
                let at = offset as usize;
                let size = usize::from(ty.frame_size());
                results.push(Value::read_from(*ty, executor.stack.slice(at, size)));
            }
            Ok(results)
        }
    }
}

/// Checks host-provided arguments against the signature.
fn check_args(func_type: &FuncType, args: &[Value]) -> Result<(), Error> {
    if args.len() != func_type.params().len() {
        return Err(Error::Func(crate::func::FuncError::MismatchingParameterLen));
    }
    for (arg, param) in args.iter().zip(func_type.params()) {
        if !arg.matches_type(*param) {
            return Err(Error::Func(
                crate::func::FuncError::MismatchingParameterType,
            ));
        }
    }
    Ok(())
}

/// The frame byte size of an argument value.
fn arg_frame_size(value: &Value) -> u16 {
    match value {
        Value::I32(_) | Value::F32(_) => 4,
        Value::I64(_) | Value::F64(_) | Value::Ref(_) => 8,
        Value::V128(_) => 16,
    }
}

/// Calls a host function directly from the public API.
fn call_host_from_api(
    func_type: &FuncType,
    trampoline: &HostTrampoline,
    args: &[Value],
) -> Result<Vec<Value>, Error> {
    let mut params = vec![0x00_u8; func_type.param_frame_size() as usize];
    for (arg, offset) in args.iter().zip(func_type.param_offsets()) {
        let at = offset as usize;
        let size = usize::from(arg_frame_size(arg));
        arg.write_to(&mut params[at..at + size]);
    }
    let mut results = vec![0x00_u8; func_type.result_frame_size() as usize];
    trampoline
        .call(&params, &mut results)
        .map_err(Error::Trap)?;
    let mut values = Vec::with_capacity(func_type.results().len());
    for (ty, offset) in func_type.results().iter().zip(func_type.result_offsets()) {
        let at = offset as usize;
        let size = usize::from(ty.frame_size());
        values.push(Value::read_from(*ty, &results[at..at + size]));
    }
    Ok(values)
}

/// Converts an escaped [`Unwind`] into the public error at the boundary.
fn unwind_to_error(store: &StoreInner, unwind: Unwind) -> Error {
    match unwind {
        Unwind::Trap(code) => Error::Trap(code.into()),
        Unwind::Host(trap) => Error::Trap(trap),
        Unwind::Exception(raw) => {
            let Some(idx) = raw.as_heap() else {
                return Error::Trap(TrapCode::UnhandledException.into());
            };
            match &store.gc[idx] {
                GcObject::Exception { tag, payload } => Error::Trap(Trap::uncaught_exception(
                    tag.into_usize() as u32,
                    payload.clone(),
                )),
                _ => Error::Trap(TrapCode::UnhandledException.into()),
            }
        }
    }
}

/// The interpreter over one invocation's value stack and store.
pub(crate) struct Executor<'a> {
    /// The contiguous frame stack.
    pub(crate) stack: ValueStack,
    /// The store owning all runtime entities.
    pub(crate) store: &'a mut StoreInner,
    /// The engine owning compiled code and the type registry.
    pub(crate) engine: Engine,
    /// The maximum call depth.
    depth_limit: usize,
}

impl Executor<'_> {
    /// Executes a compiled function with its frame at `base`.
    fn execute_compiled(
        &mut self,
        instance: InstanceIdx,
        compiled: Arc<CompiledFuncEntity>,
        base: usize,
        depth: usize,
    ) -> Result<(), Unwind> {
        let mut compiled = compiled;
        let mut instance = instance;
        // restarted by tail calls, which reuse the activation
        'activation: loop {
            if depth >= self.depth_limit {
                return Err(Unwind::Trap(TrapCode::StackOverflow));
            }
            if self.store.is_terminated() {
                return Err(Unwind::Trap(TrapCode::Terminated));
            }
            self.stack
                .ensure(base + compiled.frame_size as usize)
                .map_err(Unwind::Trap)?;
            // declared locals are default-initialised
            let locals_len = (compiled.locals_end - compiled.params_size) as usize;
            self.stack
                .zero(base + compiled.params_size as usize, locals_len);
            let mut ctx = ExecutionContext {
                instance,
                pc: 0,
                base,
                captured_exception: RawRef::NULL,
                error: None,
                scratch: [0; 4],
            };
            loop {
                let (op, next) = compiled.code.decode_at(ctx.pc);
                match self.run_op(op, &mut ctx, next, &compiled, depth) {
                    Ok(Flow::Next) => ctx.pc = next,
                    Ok(Flow::Jump(target)) => ctx.pc = target,
                    Ok(Flow::Return) => return Ok(()),
                    Ok(Flow::TailCall {
                        compiled: callee,
                        instance: callee_instance,
                    }) => {
                        compiled = callee;
                        instance = callee_instance;
                        continue 'activation;
                    }
                    Err(unwind) => match self.unwind(&compiled, &mut ctx, unwind) {
                        Ok(resume) => ctx.pc = resume,
                        Err(unwind) => return Err(unwind),
                    },
                }
            }
        }
    }

    /// Routes a trap or exception through the function's try table.
    ///
    /// Returns the handler position to resume at, or hands the unwind to
    /// the caller when the outermost try region is exceeded.
    fn unwind(
        &mut self,
        compiled: &CompiledFuncEntity,
        ctx: &mut ExecutionContext,
        unwind: Unwind,
    ) -> Result<usize, Unwind> {
        // handlers communicate through the context error field, never
        // through host-language unwinding
        ctx.error = Some(match &unwind {
            Unwind::Trap(code) => *code,
            Unwind::Exception(_) => TrapCode::UnhandledException,
            Unwind::Host(_) => TrapCode::UnhandledException,
        });
        let pc = OpPos(ctx.pc as u32);
        let mut current = compiled.try_table.find_innermost(pc);
        while let Some(idx) = current {
            let block = compiled.try_table.block(idx);
            for catch in &block.catches {
                if !self.catch_matches(ctx, catch, &unwind) {
                    continue;
                }
                let handler = catch.handler.to_usize();
                let catch = catch.clone();
                self.enter_catch(ctx, &catch, unwind);
                return Ok(handler);
            }
            current = match block.parent {
                TryBlockIdx::HOST => None,
                parent => Some(parent),
            };
        }
        Err(unwind)
    }

    /// Returns `true` when `catch` handles the unwind reason.
    fn catch_matches(
        &self,
        ctx: &ExecutionContext,
        catch: &CatchBlock,
        unwind: &Unwind,
    ) -> bool {
        match unwind {
            Unwind::Exception(raw) => {
                if catch.tag.is_catch_all() {
                    return true;
                }
                let Some(idx) = raw.as_heap() else {
                    return false;
                };
                let GcObject::Exception { tag, .. } = &self.store.gc[idx] else {
                    return false;
                };
                let expected =
                    self.store.instances[ctx.instance].tags[catch.tag.0 as usize];
                *tag == expected
            }
            // only the catch_all forms that capture the exception
            // reference may recover a trap
            Unwind::Trap(_) => catch.tag.is_catch_all() && catch.captures_exnref,
            Unwind::Host(_) => catch.tag.is_catch_all(),
        }
    }

    /// Transfers an unwind into a matched catch handler: copies the
    /// payload, captures the exception reference, clears the error.
    fn enter_catch(&mut self, ctx: &mut ExecutionContext, catch: &CatchBlock, unwind: Unwind) {
        let exn_raw = match unwind {
            Unwind::Exception(raw) => raw,
            Unwind::Trap(code) => self.alloc_trap_exception(code),
            Unwind::Host(_) => self.alloc_trap_exception(TrapCode::UnhandledException),
        };
        if !catch.payload.0.is_empty() {
            // the payload shape follows the tag's signature
            let Some(idx) = exn_raw.as_heap() else {
                unreachable!("payload-carrying catch matched a non-exception");
            };
            let (tag, payload) = match &self.store.gc[idx] {
                GcObject::Exception { tag, payload } => (*tag, payload.clone()),
                object => unreachable!("exception reference points at {object:?}"),
            };
            let tag_ty = self.store.tags[tag].ty();
            let func_type = self.engine.resolve_func_type(tag_ty);
            let offsets = func_type.param_offsets();
            for ((param, offset), slot) in func_type
                .params()
                .iter()
                .zip(offsets)
                .zip(&catch.payload.0)
            {
                let size = usize::from(param.frame_size());
                let at = offset as usize;
                self.stack
                    .slice_mut(ctx.base + slot.to_usize(), size)
                    .copy_from_slice(&payload[at..at + size]);
            }
        }
        if catch.captures_exnref {
            self.stack
                .write(ctx.base + catch.exnref_slot as usize, exn_raw.to_bits());
        }
        ctx.captured_exception = exn_raw;
        ctx.error = None;
    }

    /// Allocates the exception package wrapping a trap.
    fn alloc_trap_exception(&mut self, code: TrapCode) -> RawRef {
        let idx = self.store.gc.alloc(GcObject::Exception {
            tag: TagIdx::from_usize(TRAP_TAG),
            payload: Box::new([u8::from(code)]),
        });
        RawRef::heap(crate::gc::RefKind::Exn, idx)
    }

    /// Calls `callee` from the instruction at the current activation.
    ///
    /// `offsets` carries the parameter sources followed by the result
    /// destinations, both relative to the caller frame.
    fn call_function(
        &mut self,
        ctx: &ExecutionContext,
        callee: FuncIdx,
        offsets: &[StackOffset],
        num_params: usize,
        caller_frame_size: u32,
        depth: usize,
    ) -> Result<(), Unwind> {
        enum Callee {
            Wasm(crate::engine::CompiledFunc, InstanceIdx),
            Host(HostTrampoline),
        }
        let ty = self.store.funcs[callee].ty();
        let func_type = self.engine.resolve_func_type(ty);
        let target = match &self.store.funcs[callee] {
            FuncEntity::Wasm(wasm) => Callee::Wasm(wasm.func, wasm.instance),
            FuncEntity::Host(host) => Callee::Host(host.trampoline.clone()),
        };
        let param_offsets = func_type.param_offsets();
        let result_offsets = func_type.result_offsets();
        debug_assert_eq!(num_params, func_type.params().len());
        debug_assert_eq!(offsets.len(), num_params + func_type.results().len());
        match target {
            Callee::Wasm(compiled, callee_instance) => {
                let compiled = self.engine.resolve_compiled_func(compiled);
                let callee_base = ctx.base + caller_frame_size as usize;
                self.stack
                    .ensure(callee_base + compiled.frame_size as usize)
                    .map_err(Unwind::Trap)?;
                // the parameter copy widths come from the signature; no
                // type check is needed, validation guarantees the match
                for ((param, param_offset), src) in func_type
                    .params()
                    .iter()
                    .zip(&param_offsets)
                    .zip(&offsets[..num_params])
                {
                    let size = usize::from(param.frame_size());
                    self.stack.copy(
                        ctx.base + src.to_usize(),
                        callee_base + *param_offset as usize,
                        size,
                    );
                }
                self.execute_compiled(callee_instance, compiled, callee_base, depth + 1)?;
                for ((result, result_offset), dst) in func_type
                    .results()
                    .iter()
                    .zip(&result_offsets)
                    .zip(&offsets[num_params..])
                {
                    let size = usize::from(result.frame_size());
                    self.stack.copy(
                        callee_base + *result_offset as usize,
                        ctx.base + dst.to_usize(),
                        size,
                    );
                }
                Ok(())
            }
            Callee::Host(trampoline) => {
                let mut params = vec![0x00_u8; func_type.param_frame_size() as usize];
                for ((param, param_offset), src) in func_type
                    .params()
                    .iter()
                    .zip(&param_offsets)
                    .zip(&offsets[..num_params])
                {
                    let size = usize::from(param.frame_size());
                    let at = *param_offset as usize;
                    params[at..at + size]
                        .copy_from_slice(self.stack.slice(ctx.base + src.to_usize(), size));
                }
                let mut results = vec![0x00_u8; func_type.result_frame_size() as usize];
                trampoline
                    .call(&params, &mut results)
                    .map_err(Unwind::Host)?;
                for ((result, result_offset), dst) in func_type
                    .results()
                    .iter()
                    .zip(&result_offsets)
                    .zip(&offsets[num_params..])
                {
                    let size = usize::from(result.frame_size());
                    let at = *result_offset as usize;
                    self.stack
                        .slice_mut(ctx.base + dst.to_usize(), size)
                        .copy_from_slice(&results[at..at + size]);
                }
                Ok(())
            }
        }
    }

    /// Prepares a tail call: moves the parameters to the activation base
    /// and hands the callee back to the dispatch loop.
    fn tail_call_function(
        &mut self,
        ctx: &ExecutionContext,
        callee: FuncIdx,
        params: &[StackOffset],
    ) -> Result<Flow, Unwind> {
        let ty = self.store.funcs[callee].ty();
        let func_type = self.engine.resolve_func_type(ty);
        let param_offsets = func_type.param_offsets();
        // stage the parameters: sources may overlap the parameter region
        let mut staged: Vec<u8> = Vec::with_capacity(func_type.param_frame_size() as usize);
        staged.resize(func_type.param_frame_size() as usize, 0x00);
        for ((param, param_offset), src) in
            func_type.params().iter().zip(&param_offsets).zip(params)
        {
            let size = usize::from(param.frame_size());
            let at = *param_offset as usize;
            staged[at..at + size]
                .copy_from_slice(self.stack.slice(ctx.base + src.to_usize(), size));
        }
        match &self.store.funcs[callee] {
            FuncEntity::Wasm(wasm) => {
                let compiled = self.engine.resolve_compiled_func(wasm.func);
                let instance = wasm.instance;
                self.stack
                    .slice_mut(ctx.base, staged.len())
                    .copy_from_slice(&staged);
                Ok(Flow::TailCall { compiled, instance })
            }
            FuncEntity::Host(host) => {
                // a tail call to a host function returns its results as
                // the activation's own results
                let trampoline = host.trampoline.clone();
                let mut results = vec![0x00_u8; func_type.result_frame_size() as usize];
                trampoline
                    .call(&staged, &mut results)
                    .map_err(Unwind::Host)?;
                self.stack
                    .slice_mut(ctx.base, results.len())
                    .copy_from_slice(&results);
                Ok(Flow::Return)
            }
        }
    }
}
