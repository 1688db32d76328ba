//! Per-opcode execution handlers of the dispatch loop.
//!
//! Arithmetic, comparison and conversion handlers are uniform expansions
//! over the `rosmar_core::wasm` semantics; SIMD handlers wrap the
//! lanewise software implementations of `rosmar_core::simd`.

use super::{ExecutionContext, Executor, Flow, Unwind, TRAP_TAG};
use crate::{
    collections::ArenaIndex,
    engine::CompiledFuncEntity,
    func::FuncIdx,
    gc::{GcObject, RawRef, RefKind},
    global::GlobalIdx,
    memory::MemoryIdx,
    segment::{DataSegmentIdx, ElemSegmentIdx},
    table::TableIdx,
    tag::TagIdx,
    types::{CompTypeId, CompositeType, FieldType, HeapType, StorageType, StructType},
    waitqueue::{self, WaitResult},
};
use rosmar_core::{simd, wasm, LittleEndianConvert, TrapCode, V128};
use rosmar_ir::{Op, StackOffset};
use std::boxed::Box;

/// Reads a little endian value out of a byte buffer.
#[inline]
fn read_le<T: LittleEndianConvert>(bytes: &[u8], at: usize) -> T {
    let mut le = T::Bytes::default();
    let len = le.as_ref().len();
    le.as_mut().copy_from_slice(&bytes[at..at + len]);
    T::from_le_bytes(le)
}

/// Writes a little endian value into a byte buffer.
#[inline]
fn write_le<T: LittleEndianConvert>(bytes: &mut [u8], at: usize, value: T) {
    let le = value.into_le_bytes();
    let len = le.as_ref().len();
    bytes[at..at + len].copy_from_slice(le.as_ref());
}

macro_rules! bin {
    ($this:ident, $ctx:ident, $lhs:ident, $rhs:ident, $result:ident, $ty:ty, $f:expr) => {{
        let lhs: $ty = $this.frame_read($ctx, $lhs);
        let rhs: $ty = $this.frame_read($ctx, $rhs);
        $this.frame_write($ctx, $result, ($f)(lhs, rhs));
    }};
}

macro_rules! bin_fallible {
    ($this:ident, $ctx:ident, $lhs:ident, $rhs:ident, $result:ident, $ty:ty, $f:expr) => {{
        let lhs: $ty = $this.frame_read($ctx, $lhs);
        let rhs: $ty = $this.frame_read($ctx, $rhs);
        let value = ($f)(lhs, rhs).map_err(Unwind::Trap)?;
        $this.frame_write($ctx, $result, value);
    }};
}

macro_rules! cmp {
    ($this:ident, $ctx:ident, $lhs:ident, $rhs:ident, $result:ident, $ty:ty, $f:expr) => {{
        let lhs: $ty = $this.frame_read($ctx, $lhs);
        let rhs: $ty = $this.frame_read($ctx, $rhs);
        $this.frame_write($ctx, $result, u32::from(($f)(lhs, rhs)));
    }};
}

macro_rules! un {
    ($this:ident, $ctx:ident, $src:ident, $result:ident, $ty:ty, $f:expr) => {{
        let src: $ty = $this.frame_read($ctx, $src);
        $this.frame_write($ctx, $result, ($f)(src));
    }};
}

macro_rules! un_bool {
    ($this:ident, $ctx:ident, $src:ident, $result:ident, $ty:ty, $f:expr) => {{
        let src: $ty = $this.frame_read($ctx, $src);
        $this.frame_write($ctx, $result, u32::from(($f)(src)));
    }};
}

macro_rules! un_fallible {
    ($this:ident, $ctx:ident, $src:ident, $result:ident, $ty:ty, $f:expr) => {{
        let src: $ty = $this.frame_read($ctx, $src);
        let value = ($f)(src).map_err(Unwind::Trap)?;
        $this.frame_write($ctx, $result, value);
    }};
}

macro_rules! vbin {
    ($this:ident, $ctx:ident, $lhs:ident, $rhs:ident, $result:ident, $f:path) => {{
        let lhs: V128 = $this.frame_read($ctx, $lhs);
        let rhs: V128 = $this.frame_read($ctx, $rhs);
        $this.frame_write($ctx, $result, $f(lhs, rhs));
    }};
}

macro_rules! vun {
    ($this:ident, $ctx:ident, $src:ident, $result:ident, $f:path) => {{
        let src: V128 = $this.frame_read($ctx, $src);
        $this.frame_write($ctx, $result, $f(src));
    }};
}

macro_rules! vshift {
    ($this:ident, $ctx:ident, $value:ident, $amount:ident, $result:ident, $f:path) => {{
        let value: V128 = $this.frame_read($ctx, $value);
        let amount: i32 = $this.frame_read($ctx, $amount);
        $this.frame_write($ctx, $result, $f(value, amount));
    }};
}

macro_rules! load_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $result:ident, $mem_ty:ty => $frame_ty:ty) => {{
        let value: $mem_ty = $this.mem_load::<$mem_ty>($ctx, $offset, $memory, $addr, false)?;
        $this.frame_write($ctx, $result, value as $frame_ty);
    }};
}

macro_rules! aload_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $result:ident, $mem_ty:ty => $frame_ty:ty) => {{
        let value: $mem_ty = $this.mem_load::<$mem_ty>($ctx, $offset, $memory, $addr, true)?;
        $this.frame_write($ctx, $result, value as $frame_ty);
    }};
}

macro_rules! store_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $value:ident, $frame_ty:ty => $mem_ty:ty) => {{
        let value: $frame_ty = $this.frame_read($ctx, $value);
        $this.mem_store::<$mem_ty>($ctx, $offset, $memory, $addr, value as $mem_ty, false)?;
    }};
}

macro_rules! astore_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $value:ident, $frame_ty:ty => $mem_ty:ty) => {{
        let value: $frame_ty = $this.frame_read($ctx, $value);
        $this.mem_store::<$mem_ty>($ctx, $offset, $memory, $addr, value as $mem_ty, true)?;
    }};
}

macro_rules! rmw_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $value:ident, $result:ident, $mem_ty:ty => $frame_ty:ty, $f:expr) => {{
        let operand: $frame_ty = $this.frame_read($ctx, $value);
        let idx = $this.memory_idx($ctx, $memory);
        let addr = $this.read_addr($ctx, idx, $addr);
        let width = ::core::mem::size_of::<$mem_ty>() as u64;
        let mem = &mut $this.store.memories[idx];
        let ea = mem
            .effective_address(addr, $offset, width)
            .and_then(|ea| check_aligned(ea, width))
            .map_err(Unwind::Trap)?;
        let old: $mem_ty = mem.with_bytes_mut(|bytes| {
            let old = read_le::<$mem_ty>(bytes, ea);
            write_le::<$mem_ty>(bytes, ea, ($f)(old, operand as $mem_ty));
            old
        });
        $this.frame_write($ctx, $result, old as $frame_ty);
    }};
}

macro_rules! cmpxchg_arm {
    ($this:ident, $ctx:ident, $offset:ident, $memory:ident, $addr:ident, $expected:ident, $replacement:ident, $result:ident, $mem_ty:ty => $frame_ty:ty) => {{
        let expected: $frame_ty = $this.frame_read($ctx, $expected);
        let replacement: $frame_ty = $this.frame_read($ctx, $replacement);
        let idx = $this.memory_idx($ctx, $memory);
        let addr = $this.read_addr($ctx, idx, $addr);
        let width = ::core::mem::size_of::<$mem_ty>() as u64;
        let mem = &mut $this.store.memories[idx];
        let ea = mem
            .effective_address(addr, $offset, width)
            .and_then(|ea| check_aligned(ea, width))
            .map_err(Unwind::Trap)?;
        let old: $mem_ty = mem.with_bytes_mut(|bytes| {
            let old = read_le::<$mem_ty>(bytes, ea);
            if old == expected as $mem_ty {
                write_le::<$mem_ty>(bytes, ea, replacement as $mem_ty);
            }
            old
        });
        $this.frame_write($ctx, $result, old as $frame_ty);
    }};
}

/// Atomic accesses trap on unaligned effective addresses.
#[inline]
fn check_aligned(ea: usize, width: u64) -> Result<usize, TrapCode> {
    if ea as u64 % width != 0 {
        return Err(TrapCode::OutOfBoundsMemAccess);
    }
    Ok(ea)
}

impl Executor<'_> {
    /// Reads an operand from the activation frame.
    #[inline]
    pub(super) fn frame_read<T: LittleEndianConvert>(
        &self,
        ctx: &ExecutionContext,
        offset: StackOffset,
    ) -> T {
        self.stack.read(ctx.base + offset.to_usize())
    }

    /// Writes an operand to the activation frame.
    #[inline]
    pub(super) fn frame_write<T: LittleEndianConvert>(
        &mut self,
        ctx: &ExecutionContext,
        offset: StackOffset,
        value: T,
    ) {
        self.stack.write(ctx.base + offset.to_usize(), value);
    }

    fn memory_idx(&self, ctx: &ExecutionContext, memory: u16) -> MemoryIdx {
        self.store.instances[ctx.instance].memories[memory as usize]
    }

    fn table_idx(&self, ctx: &ExecutionContext, table: u32) -> TableIdx {
        self.store.instances[ctx.instance].tables[table as usize]
    }

    fn global_idx(&self, ctx: &ExecutionContext, global: u32) -> GlobalIdx {
        self.store.instances[ctx.instance].globals[global as usize]
    }

    fn func_idx(&self, ctx: &ExecutionContext, func: u32) -> FuncIdx {
        self.store.instances[ctx.instance].funcs[func as usize]
    }

    fn tag_idx(&self, ctx: &ExecutionContext, tag: u32) -> TagIdx {
        self.store.instances[ctx.instance].tags[tag as usize]
    }

    fn data_idx(&self, ctx: &ExecutionContext, segment: u32) -> DataSegmentIdx {
        self.store.instances[ctx.instance].data_segments[segment as usize]
    }

    fn elem_idx(&self, ctx: &ExecutionContext, segment: u32) -> ElemSegmentIdx {
        self.store.instances[ctx.instance].elem_segments[segment as usize]
    }

    fn type_id(&self, ctx: &ExecutionContext, ty: u32) -> CompTypeId {
        self.store.instances[ctx.instance].types[ty as usize]
    }

    /// Reads the dynamic address operand with the memory's index width.
    fn read_addr(&self, ctx: &ExecutionContext, memory: MemoryIdx, addr: StackOffset) -> u64 {
        if self.store.memories[memory].ty().is_64() {
            self.frame_read::<u64>(ctx, addr)
        } else {
            u64::from(self.frame_read::<u32>(ctx, addr))
        }
    }

    /// Loads a value from linear memory with the full access check.
    fn mem_load<T: LittleEndianConvert>(
        &mut self,
        ctx: &ExecutionContext,
        offset: u64,
        memory: u16,
        addr: StackOffset,
        atomic: bool,
    ) -> Result<T, Unwind> {
        let idx = self.memory_idx(ctx, memory);
        let addr = self.read_addr(ctx, idx, addr);
        let width = T::Bytes::default().as_ref().len() as u64;
        let mem = &self.store.memories[idx];
        let mut ea = mem
            .effective_address(addr, offset, width)
            .map_err(Unwind::Trap)?;
        if atomic {
            ea = check_aligned(ea, width).map_err(Unwind::Trap)?;
        }
        Ok(mem.with_bytes(|bytes| read_le::<T>(bytes, ea)))
    }

    /// Stores a value to linear memory with the full access check.
    fn mem_store<T: LittleEndianConvert>(
        &mut self,
        ctx: &ExecutionContext,
        offset: u64,
        memory: u16,
        addr: StackOffset,
        value: T,
        atomic: bool,
    ) -> Result<(), Unwind> {
        let idx = self.memory_idx(ctx, memory);
        let addr = self.read_addr(ctx, idx, addr);
        let width = T::Bytes::default().as_ref().len() as u64;
        let mem = &mut self.store.memories[idx];
        let mut ea = mem
            .effective_address(addr, offset, width)
            .map_err(Unwind::Trap)?;
        if atomic {
            ea = check_aligned(ea, width).map_err(Unwind::Trap)?;
        }
        mem.with_bytes_mut(|bytes| write_le(bytes, ea, value));
        Ok(())
    }

    /// Decodes a cast target from its `ty`/`flags` immediates.
    fn decode_cast_target(
        &self,
        ctx: &ExecutionContext,
        ty: u32,
        flags: u8,
    ) -> (HeapType, bool) {
        use crate::engine::translator::cast_encoding as enc;
        let nullable = flags & enc::NULLABLE != 0;
        if flags & enc::ABSTRACT == 0 {
            return (HeapType::Concrete(self.type_id(ctx, ty)), nullable);
        }
        let heap = match ty {
            enc::ANY => HeapType::Any,
            enc::EQ => HeapType::Eq,
            enc::I31 => HeapType::I31,
            enc::STRUCT => HeapType::Struct,
            enc::ARRAY => HeapType::Array,
            enc::NONE => HeapType::None,
            enc::FUNC => HeapType::Func,
            enc::NO_FUNC => HeapType::NoFunc,
            enc::EXTERN => HeapType::Extern,
            enc::NO_EXTERN => HeapType::NoExtern,
            enc::EXN => HeapType::Exn,
            enc::NO_EXN => HeapType::NoExn,
            other => unreachable!("invalid abstract cast target: {other}"),
        };
        (heap, nullable)
    }

    /// Returns the dynamic heap type of a non-null reference.
    fn ref_heap_type(&self, raw: RawRef) -> HeapType {
        match raw.kind().expect("heap type of the null reference") {
            RefKind::I31 => HeapType::I31,
            RefKind::Func => {
                let func = raw.as_func().expect("function reference payload");
                HeapType::Concrete(self.store.funcs[func].ty())
            }
            RefKind::Struct | RefKind::Array | RefKind::Extern | RefKind::Exn => {
                let idx = raw.as_heap().expect("heap reference payload");
                self.store.gc[idx].heap_type()
            }
        }
    }

    /// The runtime `ref.cast`/`ref.test` check: nullability, then value
    /// type equivalence through the subtype lattice.
    fn ref_matches(&self, ctx: &ExecutionContext, raw: RawRef, ty: u32, flags: u8) -> bool {
        let (target, nullable) = self.decode_cast_target(ctx, ty, flags);
        if raw.is_null() {
            return nullable;
        }
        let actual = self.ref_heap_type(raw);
        self.engine.is_heap_subtype(actual, target)
    }

    /// Resolves the struct type behind a module type index.
    fn struct_type(&self, ctx: &ExecutionContext, ty: u32) -> (CompTypeId, StructType) {
        let id = self.type_id(ctx, ty);
        let strukt = self.engine.with_registry(|registry| {
            match registry.composite(id) {
                CompositeType::Struct(ty) => ty.clone(),
                ty => unreachable!("struct instruction on non-struct type: {ty:?}"),
            }
        });
        (id, strukt)
    }

    /// Resolves the array element type behind a module type index.
    fn array_type(&self, ctx: &ExecutionContext, ty: u32) -> (CompTypeId, FieldType) {
        let id = self.type_id(ctx, ty);
        let elem = self.engine.with_registry(|registry| {
            match registry.composite(id) {
                CompositeType::Array(ty) => ty.elem,
                ty => unreachable!("array instruction on non-array type: {ty:?}"),
            }
        });
        (id, elem)
    }

    /// Copies a storage value from the frame into packed object bytes.
    fn pack_field(
        &self,
        ctx: &ExecutionContext,
        storage: StorageType,
        src: StackOffset,
        data: &mut [u8],
        at: usize,
    ) {
        match storage {
            StorageType::I8 => {
                let value: u32 = self.frame_read(ctx, src);
                data[at] = value as u8;
            }
            StorageType::I16 => {
                let value: u32 = self.frame_read(ctx, src);
                data[at..at + 2].copy_from_slice(&(value as u16).to_le_bytes());
            }
            StorageType::Val(ty) => {
                let size = usize::from(ty.frame_size());
                data[at..at + size]
                    .copy_from_slice(self.stack.slice(ctx.base + src.to_usize(), size));
            }
        }
    }

    /// Copies a storage value from packed object bytes into the frame,
    /// widening packed fields with the instruction-supplied signedness.
    fn unpack_field(
        &mut self,
        ctx: &ExecutionContext,
        storage: StorageType,
        data: &[u8],
        at: usize,
        dst: StackOffset,
        signed: bool,
    ) {
        match storage {
            StorageType::I8 => {
                let byte = data[at];
                let widened = if signed {
                    byte as i8 as i32
                } else {
                    i32::from(byte)
                };
                self.frame_write(ctx, dst, widened);
            }
            StorageType::I16 => {
                let mut le = [0x00_u8; 2];
                le.copy_from_slice(&data[at..at + 2]);
                let half = u16::from_le_bytes(le);
                let widened = if signed {
                    half as i16 as i32
                } else {
                    i32::from(half)
                };
                self.frame_write(ctx, dst, widened);
            }
            StorageType::Val(ty) => {
                let size = usize::from(ty.frame_size());
                let mut buf = [0x00_u8; 16];
                buf[..size].copy_from_slice(&data[at..at + size]);
                self.stack
                    .slice_mut(ctx.base + dst.to_usize(), size)
                    .copy_from_slice(&buf[..size]);
            }
        }
    }

    /// Reads a GC struct or array reference, checking for null.
    fn read_gc_ref(
        &self,
        ctx: &ExecutionContext,
        slot: StackOffset,
    ) -> Result<crate::gc::GcIdx, Unwind> {
        let raw = RawRef::from_bits(self.frame_read(ctx, slot));
        if raw.is_null() {
            return Err(Unwind::Trap(TrapCode::NullAccess));
        }
        raw.as_heap()
            .ok_or(Unwind::Trap(TrapCode::NullAccess))
    }
}

impl Executor<'_> {
    /// Executes one decoded instruction.
    #[allow(clippy::too_many_lines)]
    pub(super) fn run_op(
        &mut self,
        op: Op,
        ctx: &mut ExecutionContext,
        next: usize,
        compiled: &CompiledFuncEntity,
        depth: usize,
    ) -> Result<Flow, Unwind> {
        let jump = |delta: i32| Flow::Jump((ctx.pc as i64 + i64::from(delta)) as usize);
        match op {
            // === control flow ===
            Op::Unreachable {} => return Err(Unwind::Trap(TrapCode::UnreachableExecuted)),
            Op::Jump { delta } => return Ok(jump(delta.0)),
            Op::JumpIfTrue { cond, delta } => {
                if self.frame_read::<u32>(ctx, cond) != 0 {
                    return Ok(jump(delta.0));
                }
            }
            Op::JumpIfFalse { cond, delta } => {
                if self.frame_read::<u32>(ctx, cond) == 0 {
                    return Ok(jump(delta.0));
                }
            }
            Op::BrTable { index, targets } => {
                let index = self.frame_read::<u32>(ctx, index) as usize;
                let fallback = targets.0.len() - 1;
                let delta = targets.0[index.min(fallback)];
                return Ok(jump(delta.0));
            }
            Op::End { results } => {
                let func_type = self.engine.resolve_func_type(compiled.ty);
                let offsets = func_type.result_offsets();
                for ((ty, dst), src) in func_type
                    .results()
                    .iter()
                    .zip(offsets)
                    .zip(&results.0)
                {
                    let size = usize::from(ty.frame_size());
                    self.stack
                        .copy(ctx.base + src.to_usize(), ctx.base + dst as usize, size);
                }
                return Ok(Flow::Return);
            }
            Op::Call {
                func,
                num_params,
                offsets,
                ..
            } => {
                let callee = self.func_idx(ctx, func);
                self.call_function(
                    ctx,
                    callee,
                    &offsets.0,
                    num_params as usize,
                    compiled.frame_size,
                    depth,
                )?;
            }
            Op::CallIndirect {
                table,
                ty,
                num_params,
                index,
                offsets,
                ..
            } => {
                let callee = self.resolve_indirect_callee(ctx, table, ty, index)?;
                self.call_function(
                    ctx,
                    callee,
                    &offsets.0,
                    num_params as usize,
                    compiled.frame_size,
                    depth,
                )?;
            }
            Op::CallRef {
                ty: _,
                num_params,
                callee,
                offsets,
                ..
            } => {
                let callee = self.resolve_callee_ref(ctx, callee)?;
                self.call_function(
                    ctx,
                    callee,
                    &offsets.0,
                    num_params as usize,
                    compiled.frame_size,
                    depth,
                )?;
            }
            Op::ReturnCall { func, params } => {
                let callee = self.func_idx(ctx, func);
                return self.tail_call_function(ctx, callee, &params.0);
            }
            Op::ReturnCallIndirect {
                table,
                ty,
                index,
                params,
            } => {
                let callee = self.resolve_indirect_callee(ctx, table, ty, index)?;
                return self.tail_call_function(ctx, callee, &params.0);
            }
            Op::ReturnCallRef {
                ty: _,
                callee,
                params,
            } => {
                let callee = self.resolve_callee_ref(ctx, callee)?;
                return self.tail_call_function(ctx, callee, &params.0);
            }
            Op::Select32 {
                cond,
                val_true,
                val_false,
                result,
                ..
            } => self.exec_select(ctx, cond, val_true, val_false, result, 4),
            Op::Select64 {
                cond,
                val_true,
                val_false,
                result,
                ..
            } => self.exec_select(ctx, cond, val_true, val_false, result, 8),
            Op::Select128 {
                cond,
                val_true,
                val_false,
                result,
                ..
            } => self.exec_select(ctx, cond, val_true, val_false, result, 16),

            // === exceptions ===
            Op::Throw { tag, args } => {
                let tag_idx = self.tag_idx(ctx, tag);
                let tag_ty = self.store.tags[tag_idx].ty();
                let func_type = self.engine.resolve_func_type(tag_ty);
                let mut payload = vec![0x00_u8; func_type.param_frame_size() as usize];
                for ((param, offset), src) in func_type
                    .params()
                    .iter()
                    .zip(func_type.param_offsets())
                    .zip(&args.0)
                {
                    let size = usize::from(param.frame_size());
                    let at = offset as usize;
                    payload[at..at + size]
                        .copy_from_slice(self.stack.slice(ctx.base + src.to_usize(), size));
                }
                let idx = self.store.gc.alloc(GcObject::Exception {
                    tag: tag_idx,
                    payload: payload.into_boxed_slice(),
                });
                return Err(Unwind::Exception(RawRef::heap(RefKind::Exn, idx)));
            }
            Op::ThrowRef { exn } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, exn));
                if raw.is_null() {
                    return Err(Unwind::Trap(TrapCode::NullAccess));
                }
                let Some(idx) = raw.as_heap() else {
                    return Err(Unwind::Trap(TrapCode::NullAccess));
                };
                if let GcObject::Exception { tag, payload } = &self.store.gc[idx] {
                    // re-raising a trap package restores the original code
                    if tag.into_usize() == TRAP_TAG {
                        let code = TrapCode::try_from(payload[0])
                            .unwrap_or(TrapCode::UnhandledException);
                        return Err(Unwind::Trap(code));
                    }
                }
                return Err(Unwind::Exception(raw));
            }

            // === constants and moves ===
            Op::Const32 { value, result } => self.frame_write(ctx, result, value),
            Op::Const64 { value, result } => self.frame_write(ctx, result, value),
            Op::Const128 { value, result } => {
                self.frame_write(ctx, result, V128::from_le_bytes(value.0));
            }
            Op::Move32 { src, result } => {
                self.stack
                    .copy(ctx.base + src.to_usize(), ctx.base + result.to_usize(), 4);
            }
            Op::Move64 { src, result } => {
                self.stack
                    .copy(ctx.base + src.to_usize(), ctx.base + result.to_usize(), 8);
            }
            Op::Move128 { src, result } => {
                self.stack
                    .copy(ctx.base + src.to_usize(), ctx.base + result.to_usize(), 16);
            }

            // === globals ===
            Op::GlobalGet32 { global, result } => self.exec_global_get(ctx, global, result, 4),
            Op::GlobalGet64 { global, result } => self.exec_global_get(ctx, global, result, 8),
            Op::GlobalGet128 { global, result } => self.exec_global_get(ctx, global, result, 16),
            Op::GlobalSet32 { global, src } => self.exec_global_set(ctx, global, src, 4),
            Op::GlobalSet64 { global, src } => self.exec_global_set(ctx, global, src, 8),
            Op::GlobalSet128 { global, src } => self.exec_global_set(ctx, global, src, 16),

            // === linear memory ===
            Op::I32Load { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u32 => u32),
            Op::I32Load8S { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, i8 => i32),
            Op::I32Load8U { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u8 => u32),
            Op::I32Load16S { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, i16 => i32),
            Op::I32Load16U { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u16 => u32),
            Op::I64Load { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u64 => u64),
            Op::I64Load8S { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, i8 => i64),
            Op::I64Load8U { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u8 => u64),
            Op::I64Load16S { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, i16 => i64),
            Op::I64Load16U { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u16 => u64),
            Op::I64Load32S { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, i32 => i64),
            Op::I64Load32U { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u32 => u64),
            Op::F32Load { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u32 => u32),
            Op::F64Load { offset, memory, addr, result } => load_arm!(self, ctx, offset, memory, addr, result, u64 => u64),
            Op::V128Load { offset, memory, addr, result } => {
                let value: u128 = self.mem_load::<u128>(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, V128::from_u128(value));
            }
            Op::V128Load8x8S { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i16x8_extend_low_i8x16_s(vec));
            }
            Op::V128Load8x8U { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i16x8_extend_low_i8x16_u(vec));
            }
            Op::V128Load16x4S { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i32x4_extend_low_i16x8_s(vec));
            }
            Op::V128Load16x4U { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i32x4_extend_low_i16x8_u(vec));
            }
            Op::V128Load32x2S { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i64x2_extend_low_i32x4_s(vec));
            }
            Op::V128Load32x2U { offset, memory, addr, result } => {
                let half: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec = V128::from_u128(u128::from(half));
                self.frame_write(ctx, result, simd::i64x2_extend_low_i32x4_u(vec));
            }
            Op::V128Load8Splat { offset, memory, addr, result } => {
                let value: u8 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, simd::i8x16_splat(value as i8));
            }
            Op::V128Load16Splat { offset, memory, addr, result } => {
                let value: u16 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, simd::i16x8_splat(value as i16));
            }
            Op::V128Load32Splat { offset, memory, addr, result } => {
                let value: u32 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, simd::i32x4_splat(value as i32));
            }
            Op::V128Load64Splat { offset, memory, addr, result } => {
                let value: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, simd::i64x2_splat(value as i64));
            }
            Op::V128Load32Zero { offset, memory, addr, result } => {
                let value: u32 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, V128::from_u128(u128::from(value)));
            }
            Op::V128Load64Zero { offset, memory, addr, result } => {
                let value: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                self.frame_write(ctx, result, V128::from_u128(u128::from(value)));
            }
            Op::V128Load8Lane { offset, memory, lane, addr, value, result } => {
                let loaded: u8 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec: V128 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i8x16_replace_lane(vec, lane, loaded as i8));
            }
            Op::V128Load16Lane { offset, memory, lane, addr, value, result } => {
                let loaded: u16 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec: V128 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i16x8_replace_lane(vec, lane, loaded as i16));
            }
            Op::V128Load32Lane { offset, memory, lane, addr, value, result } => {
                let loaded: u32 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec: V128 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i32x4_replace_lane(vec, lane, loaded as i32));
            }
            Op::V128Load64Lane { offset, memory, lane, addr, value, result } => {
                let loaded: u64 = self.mem_load(ctx, offset, memory, addr, false)?;
                let vec: V128 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i64x2_replace_lane(vec, lane, loaded as i64));
            }
            Op::I32Store { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u32 => u32),
            Op::I32Store8 { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u32 => u8),
            Op::I32Store16 { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u32 => u16),
            Op::I64Store { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u64 => u64),
            Op::I64Store8 { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u64 => u8),
            Op::I64Store16 { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u64 => u16),
            Op::I64Store32 { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u64 => u32),
            Op::F32Store { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u32 => u32),
            Op::F64Store { offset, memory, addr, value } => store_arm!(self, ctx, offset, memory, addr, value, u64 => u64),
            Op::V128Store { offset, memory, addr, value } => {
                let vec: V128 = self.frame_read(ctx, value);
                self.mem_store::<u128>(ctx, offset, memory, addr, vec.as_u128(), false)?;
            }
            Op::V128Store8Lane { offset, memory, lane, addr, value } => {
                let vec: V128 = self.frame_read(ctx, value);
                let item = simd::i8x16_extract_lane_s(vec, lane) as u8;
                self.mem_store(ctx, offset, memory, addr, item, false)?;
            }
            Op::V128Store16Lane { offset, memory, lane, addr, value } => {
                let vec: V128 = self.frame_read(ctx, value);
                let item = simd::i16x8_extract_lane_s(vec, lane) as u16;
                self.mem_store(ctx, offset, memory, addr, item, false)?;
            }
            Op::V128Store32Lane { offset, memory, lane, addr, value } => {
                let vec: V128 = self.frame_read(ctx, value);
                let item = simd::i32x4_extract_lane(vec, lane) as u32;
                self.mem_store(ctx, offset, memory, addr, item, false)?;
            }
            Op::V128Store64Lane { offset, memory, lane, addr, value } => {
                let vec: V128 = self.frame_read(ctx, value);
                let item = simd::i64x2_extract_lane(vec, lane) as u64;
                self.mem_store(ctx, offset, memory, addr, item, false)?;
            }
            Op::MemorySize { memory, result } => {
                let idx = self.memory_idx(ctx, memory);
                let pages = self.store.memories[idx].size_in_pages();
                if self.store.memories[idx].ty().is_64() {
                    self.frame_write(ctx, result, pages);
                } else {
                    self.frame_write(ctx, result, pages as u32);
                }
            }
            Op::MemoryGrow { memory, delta, result } => {
                let idx = self.memory_idx(ctx, memory);
                let is64 = self.store.memories[idx].ty().is_64();
                let delta = if is64 {
                    self.frame_read::<u64>(ctx, delta)
                } else {
                    u64::from(self.frame_read::<u32>(ctx, delta))
                };
                let grown = self.store.memories[idx].grow(delta);
                if is64 {
                    self.frame_write(ctx, result, grown.unwrap_or(u64::MAX));
                } else {
                    self.frame_write(ctx, result, grown.map(|pages| pages as u32).unwrap_or(u32::MAX));
                }
            }
            Op::MemoryInit { memory, segment, dst, src, len } => {
                self.exec_memory_init(ctx, memory, segment, dst, src, len)?;
            }
            Op::MemoryCopy { dst_memory, src_memory, dst, src, len } => {
                self.exec_memory_copy(ctx, dst_memory, src_memory, dst, src, len)?;
            }
            Op::MemoryFill { memory, dst, value, len } => {
                self.exec_memory_fill(ctx, memory, dst, value, len)?;
            }
            Op::DataDrop { segment } => {
                let idx = self.data_idx(ctx, segment);
                self.store.datas[idx].drop_bytes();
            }

            // === tables ===
            Op::TableGet { table, index, result } => {
                let idx = self.table_idx(ctx, table);
                let index = u64::from(self.frame_read::<u32>(ctx, index));
                let raw = self.store.tables[idx]
                    .get(index)
                    .map_err(|_| Unwind::Trap(TrapCode::OutOfBoundsTableAccess))?;
                self.frame_write(ctx, result, raw.to_bits());
            }
            Op::TableSet { table, index, value } => {
                let idx = self.table_idx(ctx, table);
                let index = u64::from(self.frame_read::<u32>(ctx, index));
                let raw = RawRef::from_bits(self.frame_read(ctx, value));
                self.store.tables[idx]
                    .set(index, raw)
                    .map_err(|_| Unwind::Trap(TrapCode::OutOfBoundsTableAccess))?;
            }
            Op::TableSize { table, result } => {
                let idx = self.table_idx(ctx, table);
                let size = self.store.tables[idx].size() as u32;
                self.frame_write(ctx, result, size);
            }
            Op::TableGrow { table, delta, init, result } => {
                let idx = self.table_idx(ctx, table);
                let delta = u64::from(self.frame_read::<u32>(ctx, delta));
                let init = RawRef::from_bits(self.frame_read(ctx, init));
                let grown = self.store.tables[idx].grow(delta, init);
                self.frame_write(ctx, result, grown.map(|size| size as u32).unwrap_or(u32::MAX));
            }
            Op::TableInit { table, segment, dst, src, len } => {
                let table = self.table_idx(ctx, table);
                let segment = self.elem_idx(ctx, segment);
                let dst = u64::from(self.frame_read::<u32>(ctx, dst));
                let src = u64::from(self.frame_read::<u32>(ctx, src));
                let len = u64::from(self.frame_read::<u32>(ctx, len));
                let (tables, elems) = (&mut self.store.tables, &self.store.elems);
                tables[table]
                    .init(elems[segment].items(), dst, src, len)
                    .map_err(Unwind::Trap)?;
            }
            Op::TableCopy { dst_table, src_table, dst, src, len } => {
                let dst_idx = self.table_idx(ctx, dst_table);
                let src_idx = self.table_idx(ctx, src_table);
                let dst = u64::from(self.frame_read::<u32>(ctx, dst));
                let src = u64::from(self.frame_read::<u32>(ctx, src));
                let len = u64::from(self.frame_read::<u32>(ctx, len));
                if dst_idx == src_idx {
                    self.store.tables[dst_idx]
                        .copy_within(dst, src, len)
                        .map_err(Unwind::Trap)?;
                } else {
                    let (dst_table, src_table) = self
                        .store
                        .tables
                        .get_pair_mut(dst_idx, src_idx)
                        .expect("distinct table entities");
                    dst_table
                        .copy_from(src_table, dst, src, len)
                        .map_err(Unwind::Trap)?;
                }
            }
            Op::TableFill { table, index, value, len } => {
                let idx = self.table_idx(ctx, table);
                let index = u64::from(self.frame_read::<u32>(ctx, index));
                let raw = RawRef::from_bits(self.frame_read(ctx, value));
                let len = u64::from(self.frame_read::<u32>(ctx, len));
                self.store.tables[idx]
                    .fill(index, raw, len)
                    .map_err(Unwind::Trap)?;
            }
            Op::ElemDrop { segment } => {
                let idx = self.elem_idx(ctx, segment);
                self.store.elems[idx].drop_items();
            }

            // === i32/i64 arithmetic ===
            Op::I32Add { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_add),
            Op::I32Sub { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_sub),
            Op::I32Mul { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_mul),
            Op::I32DivS { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i32, wasm::i32_div_s),
            Op::I32DivU { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i32, wasm::i32_div_u),
            Op::I32RemS { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i32, wasm::i32_rem_s),
            Op::I32RemU { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i32, wasm::i32_rem_u),
            Op::I32And { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_and),
            Op::I32Or { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_or),
            Op::I32Xor { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_xor),
            Op::I32Shl { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_shl),
            Op::I32ShrS { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_shr_s),
            Op::I32ShrU { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_shr_u),
            Op::I32Rotl { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_rotl),
            Op::I32Rotr { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i32, wasm::i32_rotr),
            Op::I64Add { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_add),
            Op::I64Sub { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_sub),
            Op::I64Mul { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_mul),
            Op::I64DivS { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i64, wasm::i64_div_s),
            Op::I64DivU { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i64, wasm::i64_div_u),
            Op::I64RemS { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i64, wasm::i64_rem_s),
            Op::I64RemU { lhs, rhs, result } => bin_fallible!(self, ctx, lhs, rhs, result, i64, wasm::i64_rem_u),
            Op::I64And { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_and),
            Op::I64Or { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_or),
            Op::I64Xor { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_xor),
            Op::I64Shl { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_shl),
            Op::I64ShrS { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_shr_s),
            Op::I64ShrU { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_shr_u),
            Op::I64Rotl { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_rotl),
            Op::I64Rotr { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, i64, wasm::i64_rotr),

            // === f32/f64 arithmetic ===
            Op::F32Add { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_add),
            Op::F32Sub { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_sub),
            Op::F32Mul { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_mul),
            Op::F32Div { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_div),
            Op::F32Min { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_min),
            Op::F32Max { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_max),
            Op::F32Copysign { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f32, wasm::f32_copysign),
            Op::F64Add { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_add),
            Op::F64Sub { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_sub),
            Op::F64Mul { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_mul),
            Op::F64Div { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_div),
            Op::F64Min { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_min),
            Op::F64Max { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_max),
            Op::F64Copysign { lhs, rhs, result } => bin!(self, ctx, lhs, rhs, result, f64, wasm::f64_copysign),

            // === comparisons ===
            Op::I32Eq { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_eq),
            Op::I32Ne { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_ne),
            Op::I32LtS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_lt_s),
            Op::I32LtU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u32, wasm::i32_lt_u),
            Op::I32GtS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_gt_s),
            Op::I32GtU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u32, wasm::i32_gt_u),
            Op::I32LeS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_le_s),
            Op::I32LeU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u32, wasm::i32_le_u),
            Op::I32GeS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i32, wasm::i32_ge_s),
            Op::I32GeU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u32, wasm::i32_ge_u),
            Op::I64Eq { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_eq),
            Op::I64Ne { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_ne),
            Op::I64LtS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_lt_s),
            Op::I64LtU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u64, wasm::i64_lt_u),
            Op::I64GtS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_gt_s),
            Op::I64GtU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u64, wasm::i64_gt_u),
            Op::I64LeS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_le_s),
            Op::I64LeU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u64, wasm::i64_le_u),
            Op::I64GeS { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, i64, wasm::i64_ge_s),
            Op::I64GeU { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, u64, wasm::i64_ge_u),
            Op::F32Eq { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_eq),
            Op::F32Ne { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_ne),
            Op::F32Lt { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_lt),
            Op::F32Gt { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_gt),
            Op::F32Le { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_le),
            Op::F32Ge { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f32, wasm::f32_ge),
            Op::F64Eq { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_eq),
            Op::F64Ne { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_ne),
            Op::F64Lt { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_lt),
            Op::F64Gt { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_gt),
            Op::F64Le { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_le),
            Op::F64Ge { lhs, rhs, result } => cmp!(self, ctx, lhs, rhs, result, f64, wasm::f64_ge),

            // === scalar unary and conversions ===
            Op::I32Clz { src, result } => un!(self, ctx, src, result, i32, wasm::i32_clz),
            Op::I32Ctz { src, result } => un!(self, ctx, src, result, i32, wasm::i32_ctz),
            Op::I32Popcnt { src, result } => un!(self, ctx, src, result, i32, wasm::i32_popcnt),
            Op::I32Eqz { src, result } => un_bool!(self, ctx, src, result, i32, wasm::i32_eqz),
            Op::I64Clz { src, result } => un!(self, ctx, src, result, i64, wasm::i64_clz),
            Op::I64Ctz { src, result } => un!(self, ctx, src, result, i64, wasm::i64_ctz),
            Op::I64Popcnt { src, result } => un!(self, ctx, src, result, i64, wasm::i64_popcnt),
            Op::I64Eqz { src, result } => un_bool!(self, ctx, src, result, i64, wasm::i64_eqz),
            Op::F32Abs { src, result } => un!(self, ctx, src, result, f32, wasm::f32_abs),
            Op::F32Neg { src, result } => un!(self, ctx, src, result, f32, wasm::f32_neg),
            Op::F32Ceil { src, result } => un!(self, ctx, src, result, f32, wasm::f32_ceil),
            Op::F32Floor { src, result } => un!(self, ctx, src, result, f32, wasm::f32_floor),
            Op::F32Trunc { src, result } => un!(self, ctx, src, result, f32, wasm::f32_trunc),
            Op::F32Nearest { src, result } => un!(self, ctx, src, result, f32, wasm::f32_nearest),
            Op::F32Sqrt { src, result } => un!(self, ctx, src, result, f32, wasm::f32_sqrt),
            Op::F64Abs { src, result } => un!(self, ctx, src, result, f64, wasm::f64_abs),
            Op::F64Neg { src, result } => un!(self, ctx, src, result, f64, wasm::f64_neg),
            Op::F64Ceil { src, result } => un!(self, ctx, src, result, f64, wasm::f64_ceil),
            Op::F64Floor { src, result } => un!(self, ctx, src, result, f64, wasm::f64_floor),
            Op::F64Trunc { src, result } => un!(self, ctx, src, result, f64, wasm::f64_trunc),
            Op::F64Nearest { src, result } => un!(self, ctx, src, result, f64, wasm::f64_nearest),
            Op::F64Sqrt { src, result } => un!(self, ctx, src, result, f64, wasm::f64_sqrt),
            Op::I32Extend8S { src, result } => un!(self, ctx, src, result, i32, wasm::i32_extend8_s),
            Op::I32Extend16S { src, result } => un!(self, ctx, src, result, i32, wasm::i32_extend16_s),
            Op::I64Extend8S { src, result } => un!(self, ctx, src, result, i64, wasm::i64_extend8_s),
            Op::I64Extend16S { src, result } => un!(self, ctx, src, result, i64, wasm::i64_extend16_s),
            Op::I64Extend32S { src, result } => un!(self, ctx, src, result, i64, wasm::i64_extend32_s),
            Op::I32WrapI64 { src, result } => un!(self, ctx, src, result, i64, wasm::i32_wrap_i64),
            Op::I64ExtendI32S { src, result } => un!(self, ctx, src, result, i32, wasm::i64_extend_i32_s),
            Op::I64ExtendI32U { src, result } => un!(self, ctx, src, result, u32, wasm::i64_extend_i32_u),
            Op::F32DemoteF64 { src, result } => un!(self, ctx, src, result, f64, wasm::f32_demote_f64),
            Op::F64PromoteF32 { src, result } => un!(self, ctx, src, result, f32, wasm::f64_promote_f32),
            Op::I32TruncF32S { src, result } => un_fallible!(self, ctx, src, result, f32, wasm::i32_trunc_f32_s),
            Op::I32TruncF32U { src, result } => un_fallible!(self, ctx, src, result, f32, wasm::i32_trunc_f32_u),
            Op::I32TruncF64S { src, result } => un_fallible!(self, ctx, src, result, f64, wasm::i32_trunc_f64_s),
            Op::I32TruncF64U { src, result } => un_fallible!(self, ctx, src, result, f64, wasm::i32_trunc_f64_u),
            Op::I64TruncF32S { src, result } => un_fallible!(self, ctx, src, result, f32, wasm::i64_trunc_f32_s),
            Op::I64TruncF32U { src, result } => un_fallible!(self, ctx, src, result, f32, wasm::i64_trunc_f32_u),
            Op::I64TruncF64S { src, result } => un_fallible!(self, ctx, src, result, f64, wasm::i64_trunc_f64_s),
            Op::I64TruncF64U { src, result } => un_fallible!(self, ctx, src, result, f64, wasm::i64_trunc_f64_u),
            Op::I32TruncSatF32S { src, result } => un!(self, ctx, src, result, f32, wasm::i32_trunc_sat_f32_s),
            Op::I32TruncSatF32U { src, result } => un!(self, ctx, src, result, f32, wasm::i32_trunc_sat_f32_u),
            Op::I32TruncSatF64S { src, result } => un!(self, ctx, src, result, f64, wasm::i32_trunc_sat_f64_s),
            Op::I32TruncSatF64U { src, result } => un!(self, ctx, src, result, f64, wasm::i32_trunc_sat_f64_u),
            Op::I64TruncSatF32S { src, result } => un!(self, ctx, src, result, f32, wasm::i64_trunc_sat_f32_s),
            Op::I64TruncSatF32U { src, result } => un!(self, ctx, src, result, f32, wasm::i64_trunc_sat_f32_u),
            Op::I64TruncSatF64S { src, result } => un!(self, ctx, src, result, f64, wasm::i64_trunc_sat_f64_s),
            Op::I64TruncSatF64U { src, result } => un!(self, ctx, src, result, f64, wasm::i64_trunc_sat_f64_u),
            Op::F32ConvertI32S { src, result } => un!(self, ctx, src, result, i32, wasm::f32_convert_i32_s),
            Op::F32ConvertI32U { src, result } => un!(self, ctx, src, result, u32, wasm::f32_convert_i32_u),
            Op::F32ConvertI64S { src, result } => un!(self, ctx, src, result, i64, wasm::f32_convert_i64_s),
            Op::F32ConvertI64U { src, result } => un!(self, ctx, src, result, u64, wasm::f32_convert_i64_u),
            Op::F64ConvertI32S { src, result } => un!(self, ctx, src, result, i32, wasm::f64_convert_i32_s),
            Op::F64ConvertI32U { src, result } => un!(self, ctx, src, result, u32, wasm::f64_convert_i32_u),
            Op::F64ConvertI64S { src, result } => un!(self, ctx, src, result, i64, wasm::f64_convert_i64_s),
            Op::F64ConvertI64U { src, result } => un!(self, ctx, src, result, u64, wasm::f64_convert_i64_u),
            Op::I32ReinterpretF32 { src, result } => un!(self, ctx, src, result, f32, wasm::i32_reinterpret_f32),
            Op::I64ReinterpretF64 { src, result } => un!(self, ctx, src, result, f64, wasm::i64_reinterpret_f64),
            Op::F32ReinterpretI32 { src, result } => un!(self, ctx, src, result, i32, wasm::f32_reinterpret_i32),
            Op::F64ReinterpretI64 { src, result } => un!(self, ctx, src, result, i64, wasm::f64_reinterpret_i64),

            // === SIMD ===
            Op::I8x16Splat { src, result } => un!(self, ctx, src, result, i32, |v: i32| simd::i8x16_splat(v as i8)),
            Op::I16x8Splat { src, result } => un!(self, ctx, src, result, i32, |v: i32| simd::i16x8_splat(v as i16)),
            Op::I32x4Splat { src, result } => un!(self, ctx, src, result, i32, simd::i32x4_splat),
            Op::I64x2Splat { src, result } => un!(self, ctx, src, result, i64, simd::i64x2_splat),
            Op::F32x4Splat { src, result } => un!(self, ctx, src, result, f32, simd::f32x4_splat),
            Op::F64x2Splat { src, result } => un!(self, ctx, src, result, f64, simd::f64x2_splat),
            Op::I8x16ExtractLaneS { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::i8x16_extract_lane_s(v, lane) as i32),
            Op::I8x16ExtractLaneU { lane, src, result } => un!(self, ctx, src, result, V128, |v| u32::from(simd::i8x16_extract_lane_u(v, lane))),
            Op::I16x8ExtractLaneS { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::i16x8_extract_lane_s(v, lane) as i32),
            Op::I16x8ExtractLaneU { lane, src, result } => un!(self, ctx, src, result, V128, |v| u32::from(simd::i16x8_extract_lane_u(v, lane))),
            Op::I32x4ExtractLane { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::i32x4_extract_lane(v, lane)),
            Op::I64x2ExtractLane { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::i64x2_extract_lane(v, lane)),
            Op::F32x4ExtractLane { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::f32x4_extract_lane(v, lane)),
            Op::F64x2ExtractLane { lane, src, result } => un!(self, ctx, src, result, V128, |v| simd::f64x2_extract_lane(v, lane)),
            Op::I8x16ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: i32 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i8x16_replace_lane(vec, lane, item as i8));
            }
            Op::I16x8ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: i32 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i16x8_replace_lane(vec, lane, item as i16));
            }
            Op::I32x4ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: i32 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i32x4_replace_lane(vec, lane, item));
            }
            Op::I64x2ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: i64 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::i64x2_replace_lane(vec, lane, item));
            }
            Op::F32x4ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: f32 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::f32x4_replace_lane(vec, lane, item));
            }
            Op::F64x2ReplaceLane { lane, src, value, result } => {
                let vec: V128 = self.frame_read(ctx, src);
                let item: f64 = self.frame_read(ctx, value);
                self.frame_write(ctx, result, simd::f64x2_replace_lane(vec, lane, item));
            }
            Op::I8x16Shuffle { selector, lhs, rhs, result } => {
                let lhs: V128 = self.frame_read(ctx, lhs);
                let rhs: V128 = self.frame_read(ctx, rhs);
                self.frame_write(ctx, result, simd::i8x16_shuffle(lhs, rhs, selector.0));
            }
            Op::V128Not { src, result } => vun!(self, ctx, src, result, simd::v128_not),
            Op::V128AnyTrue { src, result } => un!(self, ctx, src, result, V128, simd::v128_any_true),
            Op::I8x16Abs { src, result } => vun!(self, ctx, src, result, simd::i8x16_abs),
            Op::I8x16Neg { src, result } => vun!(self, ctx, src, result, simd::i8x16_neg),
            Op::I8x16Popcnt { src, result } => vun!(self, ctx, src, result, simd::i8x16_popcnt),
            Op::I8x16AllTrue { src, result } => un!(self, ctx, src, result, V128, simd::i8x16_all_true),
            Op::I8x16Bitmask { src, result } => un!(self, ctx, src, result, V128, simd::i8x16_bitmask),
            Op::I16x8Abs { src, result } => vun!(self, ctx, src, result, simd::i16x8_abs),
            Op::I16x8Neg { src, result } => vun!(self, ctx, src, result, simd::i16x8_neg),
            Op::I16x8AllTrue { src, result } => un!(self, ctx, src, result, V128, simd::i16x8_all_true),
            Op::I16x8Bitmask { src, result } => un!(self, ctx, src, result, V128, simd::i16x8_bitmask),
            Op::I32x4Abs { src, result } => vun!(self, ctx, src, result, simd::i32x4_abs),
            Op::I32x4Neg { src, result } => vun!(self, ctx, src, result, simd::i32x4_neg),
            Op::I32x4AllTrue { src, result } => un!(self, ctx, src, result, V128, simd::i32x4_all_true),
            Op::I32x4Bitmask { src, result } => un!(self, ctx, src, result, V128, simd::i32x4_bitmask),
            Op::I64x2Abs { src, result } => vun!(self, ctx, src, result, simd::i64x2_abs),
            Op::I64x2Neg { src, result } => vun!(self, ctx, src, result, simd::i64x2_neg),
            Op::I64x2AllTrue { src, result } => un!(self, ctx, src, result, V128, simd::i64x2_all_true),
            Op::I64x2Bitmask { src, result } => un!(self, ctx, src, result, V128, simd::i64x2_bitmask),
            Op::F32x4Abs { src, result } => vun!(self, ctx, src, result, simd::f32x4_abs),
            Op::F32x4Neg { src, result } => vun!(self, ctx, src, result, simd::f32x4_neg),
            Op::F32x4Sqrt { src, result } => vun!(self, ctx, src, result, simd::f32x4_sqrt),
            Op::F32x4Ceil { src, result } => vun!(self, ctx, src, result, simd::f32x4_ceil),
            Op::F32x4Floor { src, result } => vun!(self, ctx, src, result, simd::f32x4_floor),
            Op::F32x4Trunc { src, result } => vun!(self, ctx, src, result, simd::f32x4_trunc),
            Op::F32x4Nearest { src, result } => vun!(self, ctx, src, result, simd::f32x4_nearest),
            Op::F64x2Abs { src, result } => vun!(self, ctx, src, result, simd::f64x2_abs),
            Op::F64x2Neg { src, result } => vun!(self, ctx, src, result, simd::f64x2_neg),
            Op::F64x2Sqrt { src, result } => vun!(self, ctx, src, result, simd::f64x2_sqrt),
            Op::F64x2Ceil { src, result } => vun!(self, ctx, src, result, simd::f64x2_ceil),
            Op::F64x2Floor { src, result } => vun!(self, ctx, src, result, simd::f64x2_floor),
            Op::F64x2Trunc { src, result } => vun!(self, ctx, src, result, simd::f64x2_trunc),
            Op::F64x2Nearest { src, result } => vun!(self, ctx, src, result, simd::f64x2_nearest),
            Op::I16x8ExtendLowI8x16S { src, result } => vun!(self, ctx, src, result, simd::i16x8_extend_low_i8x16_s),
            Op::I16x8ExtendHighI8x16S { src, result } => vun!(self, ctx, src, result, simd::i16x8_extend_high_i8x16_s),
            Op::I16x8ExtendLowI8x16U { src, result } => vun!(self, ctx, src, result, simd::i16x8_extend_low_i8x16_u),
            Op::I16x8ExtendHighI8x16U { src, result } => vun!(self, ctx, src, result, simd::i16x8_extend_high_i8x16_u),
            Op::I32x4ExtendLowI16x8S { src, result } => vun!(self, ctx, src, result, simd::i32x4_extend_low_i16x8_s),
            Op::I32x4ExtendHighI16x8S { src, result } => vun!(self, ctx, src, result, simd::i32x4_extend_high_i16x8_s),
            Op::I32x4ExtendLowI16x8U { src, result } => vun!(self, ctx, src, result, simd::i32x4_extend_low_i16x8_u),
            Op::I32x4ExtendHighI16x8U { src, result } => vun!(self, ctx, src, result, simd::i32x4_extend_high_i16x8_u),
            Op::I64x2ExtendLowI32x4S { src, result } => vun!(self, ctx, src, result, simd::i64x2_extend_low_i32x4_s),
            Op::I64x2ExtendHighI32x4S { src, result } => vun!(self, ctx, src, result, simd::i64x2_extend_high_i32x4_s),
            Op::I64x2ExtendLowI32x4U { src, result } => vun!(self, ctx, src, result, simd::i64x2_extend_low_i32x4_u),
            Op::I64x2ExtendHighI32x4U { src, result } => vun!(self, ctx, src, result, simd::i64x2_extend_high_i32x4_u),
            Op::I16x8ExtaddPairwiseI8x16S { src, result } => vun!(self, ctx, src, result, simd::i16x8_extadd_pairwise_i8x16_s),
            Op::I16x8ExtaddPairwiseI8x16U { src, result } => vun!(self, ctx, src, result, simd::i16x8_extadd_pairwise_i8x16_u),
            Op::I32x4ExtaddPairwiseI16x8S { src, result } => vun!(self, ctx, src, result, simd::i32x4_extadd_pairwise_i16x8_s),
            Op::I32x4ExtaddPairwiseI16x8U { src, result } => vun!(self, ctx, src, result, simd::i32x4_extadd_pairwise_i16x8_u),
            Op::F32x4ConvertI32x4S { src, result } => vun!(self, ctx, src, result, simd::f32x4_convert_i32x4_s),
            Op::F32x4ConvertI32x4U { src, result } => vun!(self, ctx, src, result, simd::f32x4_convert_i32x4_u),
            Op::F64x2ConvertLowI32x4S { src, result } => vun!(self, ctx, src, result, simd::f64x2_convert_low_i32x4_s),
            Op::F64x2ConvertLowI32x4U { src, result } => vun!(self, ctx, src, result, simd::f64x2_convert_low_i32x4_u),
            Op::I32x4TruncSatF32x4S { src, result } => vun!(self, ctx, src, result, simd::i32x4_trunc_sat_f32x4_s),
            Op::I32x4TruncSatF32x4U { src, result } => vun!(self, ctx, src, result, simd::i32x4_trunc_sat_f32x4_u),
            Op::I32x4TruncSatF64x2SZero { src, result } => vun!(self, ctx, src, result, simd::i32x4_trunc_sat_f64x2_s_zero),
            Op::I32x4TruncSatF64x2UZero { src, result } => vun!(self, ctx, src, result, simd::i32x4_trunc_sat_f64x2_u_zero),
            Op::F32x4DemoteF64x2Zero { src, result } => vun!(self, ctx, src, result, simd::f32x4_demote_f64x2_zero),
            Op::F64x2PromoteLowF32x4 { src, result } => vun!(self, ctx, src, result, simd::f64x2_promote_low_f32x4),
            Op::I32x4RelaxedTruncF32x4S { src, result } => vun!(self, ctx, src, result, simd::i32x4_relaxed_trunc_f32x4_s),
            Op::I32x4RelaxedTruncF32x4U { src, result } => vun!(self, ctx, src, result, simd::i32x4_relaxed_trunc_f32x4_u),
            Op::I32x4RelaxedTruncF64x2SZero { src, result } => vun!(self, ctx, src, result, simd::i32x4_relaxed_trunc_f64x2_s_zero),
            Op::I32x4RelaxedTruncF64x2UZero { src, result } => vun!(self, ctx, src, result, simd::i32x4_relaxed_trunc_f64x2_u_zero),
            Op::V128And { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::v128_and),
            Op::V128Or { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::v128_or),
            Op::V128Xor { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::v128_xor),
            Op::V128Andnot { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::v128_andnot),
            Op::I8x16Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_add),
            Op::I8x16Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_sub),
            Op::I8x16AddSatS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_add_sat_s),
            Op::I8x16AddSatU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_add_sat_u),
            Op::I8x16SubSatS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_sub_sat_s),
            Op::I8x16SubSatU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_sub_sat_u),
            Op::I8x16MinS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_min_s),
            Op::I8x16MinU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_min_u),
            Op::I8x16MaxS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_max_s),
            Op::I8x16MaxU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_max_u),
            Op::I8x16AvgrU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_avgr_u),
            Op::I16x8Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_add),
            Op::I16x8Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_sub),
            Op::I16x8Mul { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_mul),
            Op::I16x8AddSatS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_add_sat_s),
            Op::I16x8AddSatU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_add_sat_u),
            Op::I16x8SubSatS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_sub_sat_s),
            Op::I16x8SubSatU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_sub_sat_u),
            Op::I16x8MinS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_min_s),
            Op::I16x8MinU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_min_u),
            Op::I16x8MaxS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_max_s),
            Op::I16x8MaxU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_max_u),
            Op::I16x8AvgrU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_avgr_u),
            Op::I16x8Q15MulrSatS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_q15mulr_sat_s),
            Op::I32x4Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_add),
            Op::I32x4Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_sub),
            Op::I32x4Mul { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_mul),
            Op::I32x4MinS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_min_s),
            Op::I32x4MinU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_min_u),
            Op::I32x4MaxS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_max_s),
            Op::I32x4MaxU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_max_u),
            Op::I32x4DotI16x8S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_dot_i16x8_s),
            Op::I64x2Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_add),
            Op::I64x2Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_sub),
            Op::I64x2Mul { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_mul),
            Op::F32x4Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_add),
            Op::F32x4Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_sub),
            Op::F32x4Mul { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_mul),
            Op::F32x4Div { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_div),
            Op::F32x4Min { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_min),
            Op::F32x4Max { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_max),
            Op::F32x4Pmin { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_pmin),
            Op::F32x4Pmax { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_pmax),
            Op::F64x2Add { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_add),
            Op::F64x2Sub { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_sub),
            Op::F64x2Mul { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_mul),
            Op::F64x2Div { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_div),
            Op::F64x2Min { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_min),
            Op::F64x2Max { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_max),
            Op::F64x2Pmin { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_pmin),
            Op::F64x2Pmax { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_pmax),
            Op::I8x16Swizzle { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_swizzle),
            Op::I8x16RelaxedSwizzle { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_relaxed_swizzle),
            Op::I8x16NarrowI16x8S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_narrow_i16x8_s),
            Op::I8x16NarrowI16x8U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_narrow_i16x8_u),
            Op::I16x8NarrowI32x4S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_narrow_i32x4_s),
            Op::I16x8NarrowI32x4U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_narrow_i32x4_u),
            Op::I16x8ExtmulLowI8x16S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_extmul_low_i8x16_s),
            Op::I16x8ExtmulHighI8x16S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_extmul_high_i8x16_s),
            Op::I16x8ExtmulLowI8x16U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_extmul_low_i8x16_u),
            Op::I16x8ExtmulHighI8x16U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_extmul_high_i8x16_u),
            Op::I32x4ExtmulLowI16x8S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_extmul_low_i16x8_s),
            Op::I32x4ExtmulHighI16x8S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_extmul_high_i16x8_s),
            Op::I32x4ExtmulLowI16x8U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_extmul_low_i16x8_u),
            Op::I32x4ExtmulHighI16x8U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_extmul_high_i16x8_u),
            Op::I64x2ExtmulLowI32x4S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_extmul_low_i32x4_s),
            Op::I64x2ExtmulHighI32x4S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_extmul_high_i32x4_s),
            Op::I64x2ExtmulLowI32x4U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_extmul_low_i32x4_u),
            Op::I64x2ExtmulHighI32x4U { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_extmul_high_i32x4_u),
            Op::I16x8RelaxedQ15MulrS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_relaxed_q15mulr_s),
            Op::I16x8RelaxedDotI8x16I7x16S { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_relaxed_dot_i8x16_i7x16_s),
            Op::F32x4RelaxedMin { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_relaxed_min),
            Op::F32x4RelaxedMax { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_relaxed_max),
            Op::F64x2RelaxedMin { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_relaxed_min),
            Op::F64x2RelaxedMax { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_relaxed_max),
            Op::I8x16Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_eq),
            Op::I8x16Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_ne),
            Op::I8x16LtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_lt_s),
            Op::I8x16LtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_lt_u),
            Op::I8x16GtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_gt_s),
            Op::I8x16GtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_gt_u),
            Op::I8x16LeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_le_s),
            Op::I8x16LeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_le_u),
            Op::I8x16GeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_ge_s),
            Op::I8x16GeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i8x16_ge_u),
            Op::I16x8Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_eq),
            Op::I16x8Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_ne),
            Op::I16x8LtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_lt_s),
            Op::I16x8LtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_lt_u),
            Op::I16x8GtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_gt_s),
            Op::I16x8GtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_gt_u),
            Op::I16x8LeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_le_s),
            Op::I16x8LeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_le_u),
            Op::I16x8GeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_ge_s),
            Op::I16x8GeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i16x8_ge_u),
            Op::I32x4Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_eq),
            Op::I32x4Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_ne),
            Op::I32x4LtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_lt_s),
            Op::I32x4LtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_lt_u),
            Op::I32x4GtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_gt_s),
            Op::I32x4GtU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_gt_u),
            Op::I32x4LeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_le_s),
            Op::I32x4LeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_le_u),
            Op::I32x4GeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_ge_s),
            Op::I32x4GeU { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i32x4_ge_u),
            Op::I64x2Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_eq),
            Op::I64x2Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_ne),
            Op::I64x2LtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_lt_s),
            Op::I64x2GtS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_gt_s),
            Op::I64x2LeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_le_s),
            Op::I64x2GeS { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::i64x2_ge_s),
            Op::F32x4Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_eq),
            Op::F32x4Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_ne),
            Op::F32x4Lt { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_lt),
            Op::F32x4Gt { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_gt),
            Op::F32x4Le { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_le),
            Op::F32x4Ge { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f32x4_ge),
            Op::F64x2Eq { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_eq),
            Op::F64x2Ne { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_ne),
            Op::F64x2Lt { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_lt),
            Op::F64x2Gt { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_gt),
            Op::F64x2Le { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_le),
            Op::F64x2Ge { lhs, rhs, result } => vbin!(self, ctx, lhs, rhs, result, simd::f64x2_ge),
            Op::I8x16Shl { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i8x16_shl),
            Op::I8x16ShrS { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i8x16_shr_s),
            Op::I8x16ShrU { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i8x16_shr_u),
            Op::I16x8Shl { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i16x8_shl),
            Op::I16x8ShrS { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i16x8_shr_s),
            Op::I16x8ShrU { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i16x8_shr_u),
            Op::I32x4Shl { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i32x4_shl),
            Op::I32x4ShrS { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i32x4_shr_s),
            Op::I32x4ShrU { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i32x4_shr_u),
            Op::I64x2Shl { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i64x2_shl),
            Op::I64x2ShrS { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i64x2_shr_s),
            Op::I64x2ShrU { value, amount, result } => vshift!(self, ctx, value, amount, result, simd::i64x2_shr_u),
            Op::V128Bitselect { if_ones, if_zeros, mask, result } => {
                let a: V128 = self.frame_read(ctx, if_ones);
                let b: V128 = self.frame_read(ctx, if_zeros);
                let m: V128 = self.frame_read(ctx, mask);
                self.frame_write(ctx, result, simd::v128_bitselect(a, b, m));
            }
            Op::V128RelaxedLaneselect { if_ones, if_zeros, mask, result } => {
                let a: V128 = self.frame_read(ctx, if_ones);
                let b: V128 = self.frame_read(ctx, if_zeros);
                let m: V128 = self.frame_read(ctx, mask);
                self.frame_write(ctx, result, simd::v128_relaxed_laneselect(a, b, m));
            }
            Op::F32x4RelaxedMadd { a, b, c, result } => {
                let (x, y, z): (V128, V128, V128) = (self.frame_read(ctx, a), self.frame_read(ctx, b), self.frame_read(ctx, c));
                self.frame_write(ctx, result, simd::f32x4_relaxed_madd(x, y, z));
            }
            Op::F32x4RelaxedNmadd { a, b, c, result } => {
                let (x, y, z): (V128, V128, V128) = (self.frame_read(ctx, a), self.frame_read(ctx, b), self.frame_read(ctx, c));
                self.frame_write(ctx, result, simd::f32x4_relaxed_nmadd(x, y, z));
            }
            Op::F64x2RelaxedMadd { a, b, c, result } => {
                let (x, y, z): (V128, V128, V128) = (self.frame_read(ctx, a), self.frame_read(ctx, b), self.frame_read(ctx, c));
                self.frame_write(ctx, result, simd::f64x2_relaxed_madd(x, y, z));
            }
            Op::F64x2RelaxedNmadd { a, b, c, result } => {
                let (x, y, z): (V128, V128, V128) = (self.frame_read(ctx, a), self.frame_read(ctx, b), self.frame_read(ctx, c));
                self.frame_write(ctx, result, simd::f64x2_relaxed_nmadd(x, y, z));
            }
            Op::I32x4RelaxedDotI8x16I7x16AddS { a, b, c, result } => {
                let (x, y, z): (V128, V128, V128) = (self.frame_read(ctx, a), self.frame_read(ctx, b), self.frame_read(ctx, c));
                self.frame_write(ctx, result, simd::i32x4_relaxed_dot_i8x16_i7x16_add_s(x, y, z));
            }

            // === references and GC ===
            Op::RefFunc { func, result } => {
                let idx = self.func_idx(ctx, func);
                self.frame_write(ctx, result, RawRef::func(idx).to_bits());
            }
            Op::RefNull { result } => self.frame_write(ctx, result, RawRef::NULL.to_bits()),
            Op::RefIsNull { src, result } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                self.frame_write(ctx, result, u32::from(raw.is_null()));
            }
            Op::RefAsNonNull { src, result } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if raw.is_null() {
                    return Err(Unwind::Trap(TrapCode::NullAccess));
                }
                self.frame_write(ctx, result, raw.to_bits());
            }
            Op::RefEq { lhs, rhs, result } => {
                let lhs: u64 = self.frame_read(ctx, lhs);
                let rhs: u64 = self.frame_read(ctx, rhs);
                self.frame_write(ctx, result, u32::from(lhs == rhs));
            }
            Op::RefI31 { src, result } => {
                let value: i32 = self.frame_read(ctx, src);
                self.frame_write(ctx, result, RawRef::i31(value).to_bits());
            }
            Op::I31GetS { src, result } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                let value = raw
                    .i31_get_s()
                    .ok_or(Unwind::Trap(TrapCode::NullAccess))?;
                self.frame_write(ctx, result, value);
            }
            Op::I31GetU { src, result } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                let value = raw
                    .i31_get_u()
                    .ok_or(Unwind::Trap(TrapCode::NullAccess))?;
                self.frame_write(ctx, result, value);
            }
            Op::RefCast { ty, flags, src } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if !self.ref_matches(ctx, raw, ty, flags) {
                    return Err(Unwind::Trap(TrapCode::InvalidCast));
                }
            }
            Op::RefTest { ty, flags, src, result } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                let matches = self.ref_matches(ctx, raw, ty, flags);
                self.frame_write(ctx, result, u32::from(matches));
            }
            Op::BrOnCast { ty, flags, src, delta } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if self.ref_matches(ctx, raw, ty, flags) {
                    return Ok(jump(delta.0));
                }
            }
            Op::BrOnCastFail { ty, flags, src, delta } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if !self.ref_matches(ctx, raw, ty, flags) {
                    return Ok(jump(delta.0));
                }
            }
            Op::BrOnNull { src, delta } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if raw.is_null() {
                    return Ok(jump(delta.0));
                }
            }
            Op::BrOnNonNull { src, delta } => {
                let raw = RawRef::from_bits(self.frame_read(ctx, src));
                if !raw.is_null() {
                    return Ok(jump(delta.0));
                }
            }
            Op::AnyConvertExtern { src, result } | Op::ExternConvertAny { src, result } => {
                let raw: u64 = self.frame_read(ctx, src);
                self.frame_write(ctx, result, raw);
            }
            Op::StructNew { ty, result, fields } => {
                let (id, strukt) = self.struct_type(ctx, ty);
                let mut data = vec![0x00_u8; strukt.size as usize];
                for ((field, at), src) in strukt
                    .fields
                    .iter()
                    .zip(strukt.field_offsets.iter())
                    .zip(&fields.0)
                {
                    self.pack_field(ctx, field.storage, *src, &mut data, *at as usize);
                }
                let idx = self.store.gc.alloc(GcObject::Struct {
                    ty: id,
                    data: data.into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Struct, idx).to_bits());
            }
            Op::StructNewDefault { ty, result } => {
                let (id, strukt) = self.struct_type(ctx, ty);
                let data = vec![0x00_u8; strukt.size as usize];
                let idx = self.store.gc.alloc(GcObject::Struct {
                    ty: id,
                    data: data.into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Struct, idx).to_bits());
            }
            Op::StructGet { ty, field, src, result } => {
                self.exec_struct_get(ctx, ty, field, src, result, false)?;
            }
            Op::StructGetS { ty, field, src, result } => {
                self.exec_struct_get(ctx, ty, field, src, result, true)?;
            }
            Op::StructGetU { ty, field, src, result } => {
                self.exec_struct_get(ctx, ty, field, src, result, false)?;
            }
            Op::StructSet { ty, field, src, value } => {
                let (_, strukt) = self.struct_type(ctx, ty);
                let storage = strukt.fields[field as usize].storage;
                let at = strukt.field_offsets[field as usize] as usize;
                let idx = self.read_gc_ref(ctx, src)?;
                // stage through a scratch buffer to decouple the object
                // borrow from the frame borrow
                let mut scratch = [0x00_u8; 16];
                self.pack_field(ctx, storage, value, &mut scratch, 0);
                let size = storage.byte_size() as usize;
                match &mut self.store.gc[idx] {
                    GcObject::Struct { data, .. } => {
                        data[at..at + size].copy_from_slice(&scratch[..size]);
                    }
                    object => unreachable!("struct.set on {object:?}"),
                }
            }
            Op::ArrayNew { ty, init, len, result } => {
                let (id, elem) = self.array_type(ctx, ty);
                let len = self.frame_read::<u32>(ctx, len);
                let size = elem.storage.byte_size() as usize;
                let mut scratch = [0x00_u8; 16];
                self.pack_field(ctx, elem.storage, init, &mut scratch, 0);
                let total = size
                    .checked_mul(len as usize)
                    .filter(|total| *total <= u32::MAX as usize)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))?;
                let mut data = vec![0x00_u8; total];
                for chunk in data.chunks_exact_mut(size.max(1)) {
                    chunk.copy_from_slice(&scratch[..size]);
                }
                let idx = self.store.gc.alloc(GcObject::Array {
                    ty: id,
                    elem_size: size as u32,
                    len,
                    data: data.into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Array, idx).to_bits());
            }
            Op::ArrayNewDefault { ty, len, result } => {
                let (id, elem) = self.array_type(ctx, ty);
                let len = self.frame_read::<u32>(ctx, len);
                let size = elem.storage.byte_size() as usize;
                let total = size
                    .checked_mul(len as usize)
                    .filter(|total| *total <= u32::MAX as usize)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))?;
                let idx = self.store.gc.alloc(GcObject::Array {
                    ty: id,
                    elem_size: size as u32,
                    len,
                    data: vec![0x00_u8; total].into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Array, idx).to_bits());
            }
            Op::ArrayNewFixed { ty, result, elems } => {
                let (id, elem) = self.array_type(ctx, ty);
                let size = elem.storage.byte_size() as usize;
                let mut data = vec![0x00_u8; size * elems.0.len()];
                for (i, src) in elems.0.iter().enumerate() {
                    self.pack_field(ctx, elem.storage, *src, &mut data, i * size);
                }
                let idx = self.store.gc.alloc(GcObject::Array {
                    ty: id,
                    elem_size: size as u32,
                    len: elems.0.len() as u32,
                    data: data.into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Array, idx).to_bits());
            }
            Op::ArrayNewData { ty, segment, offset, len, result } => {
                let (id, elem) = self.array_type(ctx, ty);
                let size = elem.storage.byte_size() as usize;
                let offset = self.frame_read::<u32>(ctx, offset) as usize;
                let len = self.frame_read::<u32>(ctx, len);
                let seg = self.data_idx(ctx, segment);
                let bytes = self.store.datas[seg].bytes();
                let total = size
                    .checked_mul(len as usize)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsMemAccess))?;
                let end = offset
                    .checked_add(total)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsMemAccess))?;
                if end > bytes.len() {
                    return Err(Unwind::Trap(TrapCode::OutOfBoundsMemAccess));
                }
                let data: Box<[u8]> = bytes[offset..end].into();
                let idx = self.store.gc.alloc(GcObject::Array {
                    ty: id,
                    elem_size: size as u32,
                    len,
                    data,
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Array, idx).to_bits());
            }
            Op::ArrayNewElem { ty, segment, offset, len, result } => {
                let (id, elem) = self.array_type(ctx, ty);
                // element segments hold 8-byte references
                let size = elem.storage.byte_size() as usize;
                let offset = self.frame_read::<u32>(ctx, offset) as usize;
                let len = self.frame_read::<u32>(ctx, len);
                let seg = self.elem_idx(ctx, segment);
                let items = self.store.elems[seg].items();
                let end = offset
                    .checked_add(len as usize)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsTableAccess))?;
                if end > items.len() {
                    return Err(Unwind::Trap(TrapCode::OutOfBoundsTableAccess));
                }
                let mut data = vec![0x00_u8; len as usize * size];
                for (i, item) in items[offset..end].iter().enumerate() {
                    data[i * size..(i + 1) * size]
                        .copy_from_slice(&item.to_bits().to_le_bytes());
                }
                let idx = self.store.gc.alloc(GcObject::Array {
                    ty: id,
                    elem_size: size as u32,
                    len,
                    data: data.into_boxed_slice(),
                });
                self.frame_write(ctx, result, RawRef::heap(RefKind::Array, idx).to_bits());
            }
            Op::ArrayGet { ty, array, index, result } => {
                self.exec_array_get(ctx, ty, array, index, result, false)?;
            }
            Op::ArrayGetS { ty, array, index, result } => {
                self.exec_array_get(ctx, ty, array, index, result, true)?;
            }
            Op::ArrayGetU { ty, array, index, result } => {
                self.exec_array_get(ctx, ty, array, index, result, false)?;
            }
            Op::ArraySet { ty, array, index, value } => {
                let (_, elem) = self.array_type(ctx, ty);
                let size = elem.storage.byte_size() as usize;
                let idx = self.read_gc_ref(ctx, array)?;
                let index = self.frame_read::<u32>(ctx, index);
                let mut scratch = [0x00_u8; 16];
                self.pack_field(ctx, elem.storage, value, &mut scratch, 0);
                match &mut self.store.gc[idx] {
                    GcObject::Array { len, data, .. } => {
                        if index >= *len {
                            return Err(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess));
                        }
                        let at = index as usize * size;
                        data[at..at + size].copy_from_slice(&scratch[..size]);
                    }
                    object => unreachable!("array.set on {object:?}"),
                }
            }
            Op::ArrayLen { array, result } => {
                let idx = self.read_gc_ref(ctx, array)?;
                let len = match &self.store.gc[idx] {
                    GcObject::Array { len, .. } => *len,
                    object => unreachable!("array.len on {object:?}"),
                };
                self.frame_write(ctx, result, len);
            }
            Op::ArrayFill { ty, array, offset, value, len } => {
                let (_, elem) = self.array_type(ctx, ty);
                let size = elem.storage.byte_size() as usize;
                let idx = self.read_gc_ref(ctx, array)?;
                let offset = self.frame_read::<u32>(ctx, offset);
                let count = self.frame_read::<u32>(ctx, len);
                let mut scratch = [0x00_u8; 16];
                self.pack_field(ctx, elem.storage, value, &mut scratch, 0);
                match &mut self.store.gc[idx] {
                    GcObject::Array { len, data, .. } => {
                        let end = offset
                            .checked_add(count)
                            .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))?;
                        if end > *len {
                            return Err(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess));
                        }
                        for i in offset..end {
                            let at = i as usize * size;
                            data[at..at + size].copy_from_slice(&scratch[..size]);
                        }
                    }
                    object => unreachable!("array.fill on {object:?}"),
                }
            }
            Op::ArrayCopy { dst_ty, src_ty: _, dst, dst_offset, src, src_offset, len } => {
                let (_, elem) = self.array_type(ctx, dst_ty);
                let size = elem.storage.byte_size() as usize;
                let dst_idx = self.read_gc_ref(ctx, dst)?;
                let src_idx = self.read_gc_ref(ctx, src)?;
                let dst_offset = self.frame_read::<u32>(ctx, dst_offset);
                let src_offset = self.frame_read::<u32>(ctx, src_offset);
                let count = self.frame_read::<u32>(ctx, len);
                let check = |offset: u32, len: u32| -> Result<(), Unwind> {
                    offset
                        .checked_add(count)
                        .filter(|end| *end <= len)
                        .map(|_| ())
                        .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))
                };
                let src_at = src_offset as usize * size;
                let dst_at = dst_offset as usize * size;
                let bytes = count as usize * size;
                if dst_idx == src_idx {
                    match &mut self.store.gc[dst_idx] {
                        GcObject::Array { len, data, .. } => {
                            check(dst_offset, *len)?;
                            check(src_offset, *len)?;
                            data.copy_within(src_at..src_at + bytes, dst_at);
                        }
                        object => unreachable!("array.copy on {object:?}"),
                    }
                } else {
                    let (dst_obj, src_obj) = self
                        .store
                        .gc
                        .get_pair_mut(dst_idx, src_idx)
                        .expect("distinct array objects");
                    match (dst_obj, src_obj) {
                        (
                            GcObject::Array { len: dst_len, data: dst_data, .. },
                            GcObject::Array { len: src_len, data: src_data, .. },
                        ) => {
                            check(dst_offset, *dst_len)?;
                            check(src_offset, *src_len)?;
                            dst_data[dst_at..dst_at + bytes]
                                .copy_from_slice(&src_data[src_at..src_at + bytes]);
                        }
                        _ => unreachable!("array.copy on non-array objects"),
                    }
                }
            }
            Op::ArrayInitData { ty, segment, array, array_offset, data_offset, len } => {
                let (_, elem) = self.array_type(ctx, ty);
                let size = elem.storage.byte_size() as usize;
                let idx = self.read_gc_ref(ctx, array)?;
                let array_offset = self.frame_read::<u32>(ctx, array_offset);
                let data_offset = self.frame_read::<u32>(ctx, data_offset) as usize;
                let count = self.frame_read::<u32>(ctx, len);
                let seg = self.data_idx(ctx, segment);
                let bytes = count as usize * size;
                let (segment_bytes, gc) = (&self.store.datas, &mut self.store.gc);
                let source = segment_bytes[seg].bytes();
                let src_end = data_offset
                    .checked_add(bytes)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsMemAccess))?;
                if src_end > source.len() {
                    return Err(Unwind::Trap(TrapCode::OutOfBoundsMemAccess));
                }
                match &mut gc[idx] {
                    GcObject::Array { len, data, .. } => {
                        let end = array_offset
                            .checked_add(count)
                            .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))?;
                        if end > *len {
                            return Err(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess));
                        }
                        let at = array_offset as usize * size;
                        data[at..at + bytes].copy_from_slice(&source[data_offset..src_end]);
                    }
                    object => unreachable!("array.init_data on {object:?}"),
                }
            }
            Op::ArrayInitElem { ty: _, segment, array, array_offset, elem_offset, len } => {
                let idx = self.read_gc_ref(ctx, array)?;
                let array_offset = self.frame_read::<u32>(ctx, array_offset);
                let elem_offset = self.frame_read::<u32>(ctx, elem_offset) as usize;
                let count = self.frame_read::<u32>(ctx, len);
                let seg = self.elem_idx(ctx, segment);
                let (segments, gc) = (&self.store.elems, &mut self.store.gc);
                let items = segments[seg].items();
                let src_end = elem_offset
                    .checked_add(count as usize)
                    .ok_or(Unwind::Trap(TrapCode::OutOfBoundsTableAccess))?;
                if src_end > items.len() {
                    return Err(Unwind::Trap(TrapCode::OutOfBoundsTableAccess));
                }
                match &mut gc[idx] {
                    GcObject::Array { len, data, .. } => {
                        let end = array_offset
                            .checked_add(count)
                            .ok_or(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess))?;
                        if end > *len {
                            return Err(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess));
                        }
                        for (i, item) in items[elem_offset..src_end].iter().enumerate() {
                            let at = (array_offset as usize + i) * 8;
                            data[at..at + 8].copy_from_slice(&item.to_bits().to_le_bytes());
                        }
                    }
                    object => unreachable!("array.init_elem on {object:?}"),
                }
            }

            // === atomics ===
            Op::I32AtomicLoad { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u32 => u32),
            Op::I32AtomicLoad8U { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u8 => u32),
            Op::I32AtomicLoad16U { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u16 => u32),
            Op::I64AtomicLoad { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u64 => u64),
            Op::I64AtomicLoad8U { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u8 => u64),
            Op::I64AtomicLoad16U { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u16 => u64),
            Op::I64AtomicLoad32U { offset, memory, addr, result } => aload_arm!(self, ctx, offset, memory, addr, result, u32 => u64),
            Op::I32AtomicStore { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u32 => u32),
            Op::I32AtomicStore8 { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u32 => u8),
            Op::I32AtomicStore16 { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u32 => u16),
            Op::I64AtomicStore { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u64 => u64),
            Op::I64AtomicStore8 { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u64 => u8),
            Op::I64AtomicStore16 { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u64 => u16),
            Op::I64AtomicStore32 { offset, memory, addr, value } => astore_arm!(self, ctx, offset, memory, addr, value, u64 => u32),
            Op::I32AtomicRmwAdd { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, u32::wrapping_add),
            Op::I32AtomicRmw8AddU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, u8::wrapping_add),
            Op::I32AtomicRmw16AddU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, u16::wrapping_add),
            Op::I64AtomicRmwAdd { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, u64::wrapping_add),
            Op::I64AtomicRmw8AddU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, u8::wrapping_add),
            Op::I64AtomicRmw16AddU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, u16::wrapping_add),
            Op::I64AtomicRmw32AddU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, u32::wrapping_add),
            Op::I32AtomicRmwSub { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, u32::wrapping_sub),
            Op::I32AtomicRmw8SubU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, u8::wrapping_sub),
            Op::I32AtomicRmw16SubU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, u16::wrapping_sub),
            Op::I64AtomicRmwSub { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, u64::wrapping_sub),
            Op::I64AtomicRmw8SubU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, u8::wrapping_sub),
            Op::I64AtomicRmw16SubU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, u16::wrapping_sub),
            Op::I64AtomicRmw32SubU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, u32::wrapping_sub),
            Op::I32AtomicRmwAnd { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, |a, b| a & b),
            Op::I32AtomicRmw8AndU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, |a, b| a & b),
            Op::I32AtomicRmw16AndU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, |a, b| a & b),
            Op::I64AtomicRmwAnd { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, |a, b| a & b),
            Op::I64AtomicRmw8AndU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, |a, b| a & b),
            Op::I64AtomicRmw16AndU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, |a, b| a & b),
            Op::I64AtomicRmw32AndU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, |a, b| a & b),
            Op::I32AtomicRmwOr { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, |a, b| a | b),
            Op::I32AtomicRmw8OrU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, |a, b| a | b),
            Op::I32AtomicRmw16OrU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, |a, b| a | b),
            Op::I64AtomicRmwOr { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, |a, b| a | b),
            Op::I64AtomicRmw8OrU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, |a, b| a | b),
            Op::I64AtomicRmw16OrU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, |a, b| a | b),
            Op::I64AtomicRmw32OrU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, |a, b| a | b),
            Op::I32AtomicRmwXor { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, |a, b| a ^ b),
            Op::I32AtomicRmw8XorU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, |a, b| a ^ b),
            Op::I32AtomicRmw16XorU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, |a, b| a ^ b),
            Op::I64AtomicRmwXor { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, |a, b| a ^ b),
            Op::I64AtomicRmw8XorU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, |a, b| a ^ b),
            Op::I64AtomicRmw16XorU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, |a, b| a ^ b),
            Op::I64AtomicRmw32XorU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, |a, b| a ^ b),
            Op::I32AtomicRmwXchg { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u32, |_, b| b),
            Op::I32AtomicRmw8XchgU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u32, |_, b| b),
            Op::I32AtomicRmw16XchgU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u32, |_, b| b),
            Op::I64AtomicRmwXchg { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u64 => u64, |_, b| b),
            Op::I64AtomicRmw8XchgU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u8 => u64, |_, b| b),
            Op::I64AtomicRmw16XchgU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u16 => u64, |_, b| b),
            Op::I64AtomicRmw32XchgU { offset, memory, addr, value, result } => rmw_arm!(self, ctx, offset, memory, addr, value, result, u32 => u64, |_, b| b),
            Op::I32AtomicRmwCmpxchg { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u32 => u32),
            Op::I32AtomicRmw8CmpxchgU { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u8 => u32),
            Op::I32AtomicRmw16CmpxchgU { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u16 => u32),
            Op::I64AtomicRmwCmpxchg { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u64 => u64),
            Op::I64AtomicRmw8CmpxchgU { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u8 => u64),
            Op::I64AtomicRmw16CmpxchgU { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u16 => u64),
            Op::I64AtomicRmw32CmpxchgU { offset, memory, addr, expected, replacement, result } => cmpxchg_arm!(self, ctx, offset, memory, addr, expected, replacement, result, u32 => u64),
            Op::MemoryAtomicWait32 { offset, memory, addr, expected, timeout, result } => {
                self.exec_wait(ctx, offset, memory, addr, expected, timeout, result, false)?;
            }
            Op::MemoryAtomicWait64 { offset, memory, addr, expected, timeout, result } => {
                self.exec_wait(ctx, offset, memory, addr, expected, timeout, result, true)?;
            }
            Op::MemoryAtomicNotify { offset, memory, addr, count, result } => {
                let idx = self.memory_idx(ctx, memory);
                let address = self.read_addr(ctx, idx, addr);
                let count = self.frame_read::<u32>(ctx, count);
                let mem = &self.store.memories[idx];
                let ea = mem
                    .effective_address(address, offset, 4)
                    .and_then(|ea| check_aligned(ea, 4))
                    .map_err(Unwind::Trap)?;
                let woken = match mem.shared_key() {
                    // notifies on unshared memories never find a waiter
                    None => 0,
                    Some(key) => waitqueue::registry().notify(key, ea as u64, count),
                };
                self.frame_write(ctx, result, woken);
            }
            Op::AtomicFence {} => {
                core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
            }
        }
        Ok(Flow::Next)
    }

    /// Resolves the callee of a `call_indirect` with the full check chain.
    fn resolve_indirect_callee(
        &mut self,
        ctx: &ExecutionContext,
        table: u32,
        ty: u32,
        index: StackOffset,
    ) -> Result<FuncIdx, Unwind> {
        let table_idx = self.table_idx(ctx, table);
        let index = u64::from(self.frame_read::<u32>(ctx, index));
        let raw = self
            .store
            .tables[table_idx]
            .get(index)
            .map_err(|_| Unwind::Trap(TrapCode::UndefinedElement))?;
        if raw.is_null() {
            return Err(Unwind::Trap(TrapCode::UninitializedElement));
        }
        let callee = raw
            .as_func()
            .ok_or(Unwind::Trap(TrapCode::UninitializedElement))?;
        let expected = self.type_id(ctx, ty);
        let actual = self.store.funcs[callee].ty();
        if !self.engine.is_concrete_subtype(actual, expected) {
            return Err(Unwind::Trap(TrapCode::IndirectCallTypeMismatch));
        }
        Ok(callee)
    }

    /// Resolves the callee reference of a `call_ref`.
    fn resolve_callee_ref(
        &mut self,
        ctx: &ExecutionContext,
        callee: StackOffset,
    ) -> Result<FuncIdx, Unwind> {
        let raw = RawRef::from_bits(self.frame_read(ctx, callee));
        if raw.is_null() {
            return Err(Unwind::Trap(TrapCode::NullAccess));
        }
        raw.as_func().ok_or(Unwind::Trap(TrapCode::NullAccess))
    }

    /// Copies the selected operand of a `select`.
    fn exec_select(
        &mut self,
        ctx: &ExecutionContext,
        cond: StackOffset,
        val_true: StackOffset,
        val_false: StackOffset,
        result: StackOffset,
        width: usize,
    ) {
        let cond = self.frame_read::<u32>(ctx, cond);
        let chosen = if cond != 0 { val_true } else { val_false };
        self.stack.copy(
            ctx.base + chosen.to_usize(),
            ctx.base + result.to_usize(),
            width,
        );
    }

    fn exec_global_get(
        &mut self,
        ctx: &ExecutionContext,
        global: u32,
        result: StackOffset,
        width: usize,
    ) {
        let idx = self.global_idx(ctx, global);
        let mut scratch = [0x00_u8; 16];
        scratch[..width].copy_from_slice(&self.store.globals[idx].cell()[..width]);
        self.stack
            .slice_mut(ctx.base + result.to_usize(), width)
            .copy_from_slice(&scratch[..width]);
    }

    fn exec_global_set(
        &mut self,
        ctx: &ExecutionContext,
        global: u32,
        src: StackOffset,
        width: usize,
    ) {
        let idx = self.global_idx(ctx, global);
        let mut scratch = [0x00_u8; 16];
        scratch[..width].copy_from_slice(self.stack.slice(ctx.base + src.to_usize(), width));
        self.store.globals[idx].cell_mut()[..width].copy_from_slice(&scratch[..width]);
    }

    /// Reads a struct field onto the operand stack.
    fn exec_struct_get(
        &mut self,
        ctx: &ExecutionContext,
        ty: u32,
        field: u32,
        src: StackOffset,
        result: StackOffset,
        signed: bool,
    ) -> Result<(), Unwind> {
        let (_, strukt) = self.struct_type(ctx, ty);
        let storage = strukt.fields[field as usize].storage;
        let at = strukt.field_offsets[field as usize] as usize;
        let idx = self.read_gc_ref(ctx, src)?;
        let mut scratch = [0x00_u8; 16];
        let size = storage.byte_size() as usize;
        match &self.store.gc[idx] {
            GcObject::Struct { data, .. } => {
                scratch[..size].copy_from_slice(&data[at..at + size]);
            }
            object => unreachable!("struct.get on {object:?}"),
        }
        self.unpack_field(ctx, storage, &scratch, 0, result, signed);
        Ok(())
    }

    /// Reads an array element onto the operand stack.
    fn exec_array_get(
        &mut self,
        ctx: &ExecutionContext,
        ty: u32,
        array: StackOffset,
        index: StackOffset,
        result: StackOffset,
        signed: bool,
    ) -> Result<(), Unwind> {
        let (_, elem) = self.array_type(ctx, ty);
        let storage = elem.storage;
        let size = storage.byte_size() as usize;
        let idx = self.read_gc_ref(ctx, array)?;
        let index = self.frame_read::<u32>(ctx, index);
        let mut scratch = [0x00_u8; 16];
        match &self.store.gc[idx] {
            GcObject::Array { len, data, .. } => {
                if index >= *len {
                    return Err(Unwind::Trap(TrapCode::OutOfBoundsArrayAccess));
                }
                let at = index as usize * size;
                scratch[..size].copy_from_slice(&data[at..at + size]);
            }
            object => unreachable!("array.get on {object:?}"),
        }
        self.unpack_field(ctx, storage, &scratch, 0, result, signed);
        Ok(())
    }

    /// `memory.init`: copies data segment bytes into a memory.
    fn exec_memory_init(
        &mut self,
        ctx: &ExecutionContext,
        memory: u16,
        segment: u32,
        dst: StackOffset,
        src: StackOffset,
        len: StackOffset,
    ) -> Result<(), Unwind> {
        let mem_idx = self.memory_idx(ctx, memory);
        let dst = self.read_addr(ctx, mem_idx, dst);
        let src = u64::from(self.frame_read::<u32>(ctx, src));
        let len = u64::from(self.frame_read::<u32>(ctx, len));
        let seg = self.data_idx(ctx, segment);
        let (memories, datas) = (&mut self.store.memories, &self.store.datas);
        let bytes = datas[seg].bytes();
        let src_end = src
            .checked_add(len)
            .ok_or(Unwind::Trap(TrapCode::OutOfBoundsMemAccess))?;
        if src_end > bytes.len() as u64 {
            return Err(Unwind::Trap(TrapCode::OutOfBoundsMemAccess));
        }
        let mem = &mut memories[mem_idx];
        let ea = mem.effective_address(dst, 0, len).map_err(Unwind::Trap)?;
        mem.with_bytes_mut(|target| {
            target[ea..ea + len as usize]
                .copy_from_slice(&bytes[src as usize..src_end as usize]);
        });
        Ok(())
    }

    /// `memory.copy`: copies between (possibly the same) memories.
    fn exec_memory_copy(
        &mut self,
        ctx: &ExecutionContext,
        dst_memory: u16,
        src_memory: u16,
        dst: StackOffset,
        src: StackOffset,
        len: StackOffset,
    ) -> Result<(), Unwind> {
        let dst_idx = self.memory_idx(ctx, dst_memory);
        let src_idx = self.memory_idx(ctx, src_memory);
        let dst = self.read_addr(ctx, dst_idx, dst);
        let src = self.read_addr(ctx, src_idx, src);
        let both64 = self.store.memories[dst_idx].ty().is_64()
            && self.store.memories[src_idx].ty().is_64();
        let len = if both64 {
            self.frame_read::<u64>(ctx, len)
        } else {
            u64::from(self.frame_read::<u32>(ctx, len))
        };
        if dst_idx == src_idx {
            let mem = &mut self.store.memories[dst_idx];
            let dst_ea = mem.effective_address(dst, 0, len).map_err(Unwind::Trap)?;
            let src_ea = mem.effective_address(src, 0, len).map_err(Unwind::Trap)?;
            mem.with_bytes_mut(|bytes| {
                bytes.copy_within(src_ea..src_ea + len as usize, dst_ea);
            });
        } else {
            let (dst_mem, src_mem) = self
                .store
                .memories
                .get_pair_mut(dst_idx, src_idx)
                .expect("distinct memory entities");
            let dst_ea = dst_mem
                .effective_address(dst, 0, len)
                .map_err(Unwind::Trap)?;
            let src_ea = src_mem
                .effective_address(src, 0, len)
                .map_err(Unwind::Trap)?;
            src_mem.with_bytes(|source| {
                dst_mem.with_bytes_mut(|target| {
                    target[dst_ea..dst_ea + len as usize]
                        .copy_from_slice(&source[src_ea..src_ea + len as usize]);
                });
            });
        }
        Ok(())
    }

    /// `memory.fill`: fills a memory range with a byte value.
    fn exec_memory_fill(
        &mut self,
        ctx: &ExecutionContext,
        memory: u16,
        dst: StackOffset,
        value: StackOffset,
        len: StackOffset,
    ) -> Result<(), Unwind> {
        let mem_idx = self.memory_idx(ctx, memory);
        let dst = self.read_addr(ctx, mem_idx, dst);
        let value = self.frame_read::<u32>(ctx, value) as u8;
        let len = if self.store.memories[mem_idx].ty().is_64() {
            self.frame_read::<u64>(ctx, len)
        } else {
            u64::from(self.frame_read::<u32>(ctx, len))
        };
        let mem = &mut self.store.memories[mem_idx];
        let ea = mem.effective_address(dst, 0, len).map_err(Unwind::Trap)?;
        mem.with_bytes_mut(|bytes| {
            bytes[ea..ea + len as usize].fill(value);
        });
        Ok(())
    }

    /// `memory.atomic.wait{32,64}`.
    #[allow(clippy::too_many_arguments)]
    fn exec_wait(
        &mut self,
        ctx: &ExecutionContext,
        offset: u64,
        memory: u16,
        addr: StackOffset,
        expected: StackOffset,
        timeout: StackOffset,
        result: StackOffset,
        is_64: bool,
    ) -> Result<(), Unwind> {
        let idx = self.memory_idx(ctx, memory);
        let address = self.read_addr(ctx, idx, addr);
        let timeout = self.frame_read::<i64>(ctx, timeout);
        let width = if is_64 { 8 } else { 4 };
        let mem = &self.store.memories[idx];
        let ea = mem
            .effective_address(address, offset, width)
            .and_then(|ea| check_aligned(ea, width))
            .map_err(Unwind::Trap)?;
        let Some(key) = mem.shared_key() else {
            return Err(Unwind::Trap(TrapCode::ExpectedSharedMemory));
        };
        let outcome = if is_64 {
            let expected = self.frame_read::<u64>(ctx, expected);
            waitqueue::registry().wait(key, ea as u64, timeout, || {
                mem.with_bytes(|bytes| read_le::<u64>(bytes, ea) == expected)
            })
        } else {
            let expected = self.frame_read::<u32>(ctx, expected);
            waitqueue::registry().wait(key, ea as u64, timeout, || {
                mem.with_bytes(|bytes| read_le::<u32>(bytes, ea) == expected)
            })
        };
        let outcome: WaitResult = outcome;
        self.frame_write(ctx, result, outcome as u32);
        Ok(())
    }
}
