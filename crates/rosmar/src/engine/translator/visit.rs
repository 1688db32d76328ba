//! The per-operator translation rules.

use super::{FrameKind, FuncTranslator, StackValue};
use crate::{
    module::ModuleError,
    types::{CompositeType, HeapType, RefType, ValType},
};
use rosmar_ir::{Bytes16, CatchTag, DeltaList, JumpDelta, Op, RegHint, StackOffset};
use std::vec::Vec;

/// Encoding of cast targets in `ty`/`flags` immediates.
pub(crate) mod cast_encoding {
    /// Set when the cast target admits null.
    pub const NULLABLE: u8 = 1 << 0;
    /// Set when `ty` is an abstract heap type discriminant instead of a
    /// module type index.
    pub const ABSTRACT: u8 = 1 << 1;

    /// Abstract heap type discriminants.
    pub const ANY: u32 = 0;
    pub const EQ: u32 = 1;
    pub const I31: u32 = 2;
    pub const STRUCT: u32 = 3;
    pub const ARRAY: u32 = 4;
    pub const NONE: u32 = 5;
    pub const FUNC: u32 = 6;
    pub const NO_FUNC: u32 = 7;
    pub const EXTERN: u32 = 8;
    pub const NO_EXTERN: u32 = 9;
    pub const EXN: u32 = 10;
    pub const NO_EXN: u32 = 11;
}

/// Encodes a wasmparser cast target heap type into `(ty, flags)`.
fn encode_cast_target(hty: &wasmparser::HeapType, nullable: bool) -> (u32, u8) {
    use cast_encoding as enc;
    let mut flags = 0;
    if nullable {
        flags |= enc::NULLABLE;
    }
    let ty = match hty {
        wasmparser::HeapType::Concrete(index) => index
            .as_module_index()
            .unwrap_or_else(|| panic!("concrete heap type in unsupported canonical form")),
        wasmparser::HeapType::Abstract { ty, .. } => {
            use wasmparser::AbstractHeapType as A;
            flags |= enc::ABSTRACT;
            match ty {
                A::Any => enc::ANY,
                A::Eq => enc::EQ,
                A::I31 => enc::I31,
                A::Struct => enc::STRUCT,
                A::Array => enc::ARRAY,
                A::None => enc::NONE,
                A::Func => enc::FUNC,
                A::NoFunc => enc::NO_FUNC,
                A::Extern => enc::EXTERN,
                A::NoExtern => enc::NO_EXTERN,
                A::Exn => enc::EXN,
                A::NoExn => enc::NO_EXN,
                unsupported => panic!("unsupported abstract heap type: {unsupported:?}"),
            }
        }
    };
    (ty, flags)
}

macro_rules! binary {
    ($this:ident, $op:ident, $out:ident) => {{
        let (lhs, rhs) = $this.pop2();
        let result = $this.push_value(ValType::$out);
        $this.emit(Op::$op {
            lhs: StackOffset(lhs.offset),
            rhs: StackOffset(rhs.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! binary_trap {
    ($this:ident, $op:ident, $out:ident) => {{
        let (lhs, rhs) = $this.pop2();
        let result = $this.push_value(ValType::$out);
        $this.emit_trapping(Op::$op {
            lhs: StackOffset(lhs.offset),
            rhs: StackOffset(rhs.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! unary {
    ($this:ident, $op:ident, $out:ident) => {{
        let src = $this.pop_value();
        let result = $this.push_value(ValType::$out);
        $this.emit(Op::$op {
            src: StackOffset(src.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! unary_trap {
    ($this:ident, $op:ident, $out:ident) => {{
        let src = $this.pop_value();
        let result = $this.push_value(ValType::$out);
        $this.emit_trapping(Op::$op {
            src: StackOffset(src.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! load {
    ($this:ident, $op:ident, $memarg:expr, $out:ident) => {{
        let memarg = $memarg;
        let addr = $this.pop_value();
        let result = $this.push_value(ValType::$out);
        $this.emit_trapping(Op::$op {
            offset: memarg.offset,
            memory: memarg.memory as u16,
            addr: StackOffset(addr.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! store {
    ($this:ident, $op:ident, $memarg:expr) => {{
        let memarg = $memarg;
        let (addr, value) = $this.pop2();
        $this.emit_trapping(Op::$op {
            offset: memarg.offset,
            memory: memarg.memory as u16,
            addr: StackOffset(addr.offset),
            value: StackOffset(value.offset),
        });
    }};
}

macro_rules! rmw {
    ($this:ident, $op:ident, $memarg:expr, $out:ident) => {{
        let memarg = $memarg;
        let (addr, value) = $this.pop2();
        let result = $this.push_value(ValType::$out);
        $this.emit_trapping(Op::$op {
            offset: memarg.offset,
            memory: memarg.memory as u16,
            addr: StackOffset(addr.offset),
            value: StackOffset(value.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! cmpxchg {
    ($this:ident, $op:ident, $memarg:expr, $out:ident) => {{
        let memarg = $memarg;
        let (addr, expected, replacement) = $this.pop3();
        let result = $this.push_value(ValType::$out);
        $this.emit_trapping(Op::$op {
            offset: memarg.offset,
            memory: memarg.memory as u16,
            addr: StackOffset(addr.offset),
            expected: StackOffset(expected.offset),
            replacement: StackOffset(replacement.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! shift {
    ($this:ident, $op:ident) => {{
        let (value, amount) = $this.pop2();
        let result = $this.push_value(ValType::V128);
        $this.emit(Op::$op {
            value: StackOffset(value.offset),
            amount: StackOffset(amount.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! extract_lane {
    ($this:ident, $op:ident, $lane:expr, $out:ident) => {{
        let src = $this.pop_value();
        let result = $this.push_value(ValType::$out);
        $this.emit(Op::$op {
            lane: $lane,
            src: StackOffset(src.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! replace_lane {
    ($this:ident, $op:ident, $lane:expr) => {{
        let (src, value) = $this.pop2();
        let result = $this.push_value(ValType::V128);
        $this.emit(Op::$op {
            lane: $lane,
            src: StackOffset(src.offset),
            value: StackOffset(value.offset),
            result: StackOffset(result),
        });
    }};
}

macro_rules! ternary {
    ($this:ident, $op:ident { $a:ident, $b:ident, $c:ident }) => {{
        let (a, b, c) = $this.pop3();
        let result = $this.push_value(ValType::V128);
        $this.emit(Op::$op {
            $a: StackOffset(a.offset),
            $b: StackOffset(b.offset),
            $c: StackOffset(c.offset),
            result: StackOffset(result),
        });
    }};
}

impl FuncTranslator<'_> {
    /// Translates a single operator of the function body.
    pub(super) fn visit_operator(&mut self, op: wasmparser::Operator) -> Result<(), ModuleError> {
        use wasmparser::Operator as W;
        if !self.reachable && !is_control_op(&op) {
            return Ok(());
        }
        match op {
            // === control flow ===
            W::Unreachable => {
                self.emit_trapping(Op::Unreachable {});
                self.reachable = false;
            }
            W::Nop => {}
            W::Block { blockty } => {
                let (params, results) = self.block_type(blockty);
                self.open_frame(|_| FrameKind::Block, params, results);
            }
            W::Loop { blockty } => {
                let (params, results) = self.block_type(blockty);
                self.open_frame(
                    |this| FrameKind::Loop {
                        head: this.code.next_pos(),
                    },
                    params,
                    results,
                );
            }
            W::If { blockty } => {
                let (params, results) = self.block_type(blockty);
                let cond = self.reachable.then(|| self.pop_keep());
                let else_label = self.new_label();
                self.open_frame(
                    |_| FrameKind::If {
                        else_label,
                        seen_else: false,
                    },
                    params,
                    results,
                );
                if let Some(cond) = cond {
                    self.emit_jump_to(
                        Op::JumpIfFalse {
                            cond: StackOffset(cond.offset),
                            delta: JumpDelta(0),
                        },
                        else_label,
                    );
                    self.release(cond);
                }
            }
            W::Else => self.visit_else(),
            W::End => self.visit_end()?,
            W::Br { relative_depth } => {
                self.emit_branch(relative_depth);
                self.reachable = false;
            }
            W::BrIf { relative_depth } => self.visit_br_if(relative_depth),
            W::BrTable { targets } => self.visit_br_table(&targets)?,
            W::Return => {
                let arity = self.func_type.results().len();
                let offsets = self.top_offsets(arity);
                self.emit(Op::End { results: offsets });
                self.reachable = false;
            }
            W::Call { function_index } => self.visit_call(function_index),
            W::CallIndirect {
                type_index,
                table_index,
            } => self.visit_call_indirect(type_index, table_index),
            W::CallRef { type_index } => self.visit_call_ref(type_index),
            W::ReturnCall { function_index } => {
                let ty = self.view.func_types[function_index as usize];
                let params = self.pop_call_params(ty);
                self.emit_trapping(Op::ReturnCall {
                    func: function_index,
                    params,
                });
                self.reachable = false;
            }
            W::ReturnCallIndirect {
                type_index,
                table_index,
            } => {
                let index = self.pop_value();
                let ty = self.view.types[type_index as usize];
                let params = self.pop_call_params(ty);
                self.emit_trapping(Op::ReturnCallIndirect {
                    table: table_index,
                    ty: type_index,
                    index: StackOffset(index.offset),
                    params,
                });
                self.reachable = false;
            }
            W::ReturnCallRef { type_index } => {
                let callee = self.pop_value();
                let ty = self.view.types[type_index as usize];
                let params = self.pop_call_params(ty);
                self.emit_trapping(Op::ReturnCallRef {
                    ty: type_index,
                    callee: StackOffset(callee.offset),
                    params,
                });
                self.reachable = false;
            }
            W::Drop => {
                self.pop_value();
            }
            W::Select => self.visit_select(),
            W::TypedSelect { .. } => self.visit_select(),

            // === exceptions ===
            W::Try { blockty } => {
                let (params, results) = self.block_type(blockty);
                self.open_frame(
                    |this| {
                        let exn_slot = this.alloc.alloc(ValType::Ref(RefType::EXN_REF));
                        let block = this.open_try_region();
                        FrameKind::Try {
                            block,
                            exn_slot,
                            in_catch: false,
                            pending: Vec::new(),
                        }
                    },
                    params,
                    results,
                );
            }
            W::Catch { tag_index } => self.visit_catch(Some(tag_index)),
            W::CatchAll => self.visit_catch(None),
            W::Delegate { relative_depth } => self.visit_delegate(relative_depth)?,
            W::TryTable { try_table } => self.visit_try_table(try_table)?,
            W::Throw { tag_index } => {
                let tag_ty = self.view.tags[tag_index as usize];
                let arity = self
                    .view
                    .engine
                    .resolve_func_type(tag_ty)
                    .params()
                    .len();
                let mut args = Vec::with_capacity(arity);
                for _ in 0..arity {
                    args.push(StackOffset(self.pop_value().offset));
                }
                args.reverse();
                self.emit_trapping(Op::Throw {
                    tag: tag_index,
                    args: args.into_iter().collect(),
                });
                self.reachable = false;
            }
            W::ThrowRef => {
                let exn = self.pop_value();
                self.emit_trapping(Op::ThrowRef {
                    exn: StackOffset(exn.offset),
                });
                self.reachable = false;
            }
            W::Rethrow { relative_depth } => {
                let exn_slot = self.catch_exn_slot(relative_depth);
                self.emit_trapping(Op::ThrowRef {
                    exn: StackOffset(exn_slot),
                });
                self.reachable = false;
            }

            // === locals, globals, constants ===
            W::LocalGet { local_index } => {
                let (ty, offset) = self.locals[local_index as usize];
                let slot = self.push_value(ty);
                self.emit_move(ty, offset, slot);
            }
            W::LocalSet { local_index } => {
                let (ty, offset) = self.locals[local_index as usize];
                let value = self.pop_value();
                self.emit_move(ty, value.offset, offset);
            }
            W::LocalTee { local_index } => {
                let (ty, offset) = self.locals[local_index as usize];
                let value = *self.stack.last().expect("tee on validated stack");
                self.emit_move(ty, value.offset, offset);
            }
            W::GlobalGet { global_index } => {
                let ty = self.view.globals[global_index as usize].content();
                let result = StackOffset(self.push_value(ty));
                let global = global_index;
                let op = match ty.frame_size() {
                    4 => Op::GlobalGet32 { global, result },
                    8 => Op::GlobalGet64 { global, result },
                    _ => Op::GlobalGet128 { global, result },
                };
                self.emit(op);
            }
            W::GlobalSet { global_index } => {
                let ty = self.view.globals[global_index as usize].content();
                let src = StackOffset(self.pop_value().offset);
                let global = global_index;
                let op = match ty.frame_size() {
                    4 => Op::GlobalSet32 { global, src },
                    8 => Op::GlobalSet64 { global, src },
                    _ => Op::GlobalSet128 { global, src },
                };
                self.emit(op);
            }
            W::I32Const { value } => {
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit(Op::Const32 {
                    value: value as u32,
                    result,
                });
            }
            W::I64Const { value } => {
                let result = StackOffset(self.push_value(ValType::I64));
                self.emit(Op::Const64 {
                    value: value as u64,
                    result,
                });
            }
            W::F32Const { value } => {
                let result = StackOffset(self.push_value(ValType::F32));
                self.emit(Op::Const32 {
                    value: value.bits(),
                    result,
                });
            }
            W::F64Const { value } => {
                let result = StackOffset(self.push_value(ValType::F64));
                self.emit(Op::Const64 {
                    value: value.bits(),
                    result,
                });
            }
            W::V128Const { value } => {
                let result = StackOffset(self.push_value(ValType::V128));
                self.emit(Op::Const128 {
                    value: Bytes16((value.i128() as u128).to_le_bytes()),
                    result,
                });
            }

            // === linear memory ===
            W::I32Load { memarg } => load!(self, I32Load, memarg, I32),
            W::I32Load8S { memarg } => load!(self, I32Load8S, memarg, I32),
            W::I32Load8U { memarg } => load!(self, I32Load8U, memarg, I32),
            W::I32Load16S { memarg } => load!(self, I32Load16S, memarg, I32),
            W::I32Load16U { memarg } => load!(self, I32Load16U, memarg, I32),
            W::I64Load { memarg } => load!(self, I64Load, memarg, I64),
            W::I64Load8S { memarg } => load!(self, I64Load8S, memarg, I64),
            W::I64Load8U { memarg } => load!(self, I64Load8U, memarg, I64),
            W::I64Load16S { memarg } => load!(self, I64Load16S, memarg, I64),
            W::I64Load16U { memarg } => load!(self, I64Load16U, memarg, I64),
            W::I64Load32S { memarg } => load!(self, I64Load32S, memarg, I64),
            W::I64Load32U { memarg } => load!(self, I64Load32U, memarg, I64),
            W::F32Load { memarg } => load!(self, F32Load, memarg, F32),
            W::F64Load { memarg } => load!(self, F64Load, memarg, F64),
            W::V128Load { memarg } => load!(self, V128Load, memarg, V128),
            W::V128Load8x8S { memarg } => load!(self, V128Load8x8S, memarg, V128),
            W::V128Load8x8U { memarg } => load!(self, V128Load8x8U, memarg, V128),
            W::V128Load16x4S { memarg } => load!(self, V128Load16x4S, memarg, V128),
            W::V128Load16x4U { memarg } => load!(self, V128Load16x4U, memarg, V128),
            W::V128Load32x2S { memarg } => load!(self, V128Load32x2S, memarg, V128),
            W::V128Load32x2U { memarg } => load!(self, V128Load32x2U, memarg, V128),
            W::V128Load8Splat { memarg } => load!(self, V128Load8Splat, memarg, V128),
            W::V128Load16Splat { memarg } => load!(self, V128Load16Splat, memarg, V128),
            W::V128Load32Splat { memarg } => load!(self, V128Load32Splat, memarg, V128),
            W::V128Load64Splat { memarg } => load!(self, V128Load64Splat, memarg, V128),
            W::V128Load32Zero { memarg } => load!(self, V128Load32Zero, memarg, V128),
            W::V128Load64Zero { memarg } => load!(self, V128Load64Zero, memarg, V128),
            W::I32Store { memarg } => store!(self, I32Store, memarg),
            W::I32Store8 { memarg } => store!(self, I32Store8, memarg),
            W::I32Store16 { memarg } => store!(self, I32Store16, memarg),
            W::I64Store { memarg } => store!(self, I64Store, memarg),
            W::I64Store8 { memarg } => store!(self, I64Store8, memarg),
            W::I64Store16 { memarg } => store!(self, I64Store16, memarg),
            W::I64Store32 { memarg } => store!(self, I64Store32, memarg),
            W::F32Store { memarg } => store!(self, F32Store, memarg),
            W::F64Store { memarg } => store!(self, F64Store, memarg),
            W::V128Store { memarg } => store!(self, V128Store, memarg),
            W::V128Load8Lane { memarg, lane } => self.visit_load_lane(memarg, lane, 0),
            W::V128Load16Lane { memarg, lane } => self.visit_load_lane(memarg, lane, 1),
            W::V128Load32Lane { memarg, lane } => self.visit_load_lane(memarg, lane, 2),
            W::V128Load64Lane { memarg, lane } => self.visit_load_lane(memarg, lane, 3),
            W::V128Store8Lane { memarg, lane } => self.visit_store_lane(memarg, lane, 0),
            W::V128Store16Lane { memarg, lane } => self.visit_store_lane(memarg, lane, 1),
            W::V128Store32Lane { memarg, lane } => self.visit_store_lane(memarg, lane, 2),
            W::V128Store64Lane { memarg, lane } => self.visit_store_lane(memarg, lane, 3),
            W::MemorySize { mem } => {
                let ty = self.memory_index_type(mem);
                let result = StackOffset(self.push_value(ty));
                self.emit(Op::MemorySize {
                    memory: mem as u16,
                    result,
                });
            }
            W::MemoryGrow { mem } => {
                let ty = self.memory_index_type(mem);
                let delta = StackOffset(self.pop_value().offset);
                let result = StackOffset(self.push_value(ty));
                self.emit(Op::MemoryGrow {
                    memory: mem as u16,
                    delta,
                    result,
                });
            }
            W::MemoryInit { data_index, mem } => {
                let (dst, src, len) = self.pop3_offsets();
                self.emit_trapping(Op::MemoryInit {
                    memory: mem as u16,
                    segment: data_index,
                    dst,
                    src,
                    len,
                });
            }
            W::MemoryCopy { dst_mem, src_mem } => {
                let (dst, src, len) = self.pop3_offsets();
                self.emit_trapping(Op::MemoryCopy {
                    dst_memory: dst_mem as u16,
                    src_memory: src_mem as u16,
                    dst,
                    src,
                    len,
                });
            }
            W::MemoryFill { mem } => {
                let (dst, value, len) = self.pop3_offsets();
                self.emit_trapping(Op::MemoryFill {
                    memory: mem as u16,
                    dst,
                    value,
                    len,
                });
            }
            W::DataDrop { data_index } => {
                self.emit(Op::DataDrop {
                    segment: data_index,
                });
            }

            // === tables ===
            W::TableGet { table } => {
                let element = self.view.tables[table as usize].element();
                let index = StackOffset(self.pop_value().offset);
                let result = StackOffset(self.push_value(ValType::Ref(element)));
                self.emit_trapping(Op::TableGet {
                    table,
                    index,
                    result,
                });
            }
            W::TableSet { table } => {
                let (index, value) = self.pop2();
                self.emit_trapping(Op::TableSet {
                    table,
                    index: StackOffset(index.offset),
                    value: StackOffset(value.offset),
                });
            }
            W::TableSize { table } => {
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit(Op::TableSize { table, result });
            }
            W::TableGrow { table } => {
                let (init, delta) = self.pop2();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit(Op::TableGrow {
                    table,
                    delta: StackOffset(delta.offset),
                    init: StackOffset(init.offset),
                    result,
                });
            }
            W::TableInit { elem_index, table } => {
                let (dst, src, len) = self.pop3_offsets();
                self.emit_trapping(Op::TableInit {
                    table,
                    segment: elem_index,
                    dst,
                    src,
                    len,
                });
            }
            W::TableCopy {
                dst_table,
                src_table,
            } => {
                let (dst, src, len) = self.pop3_offsets();
                self.emit_trapping(Op::TableCopy {
                    dst_table,
                    src_table,
                    dst,
                    src,
                    len,
                });
            }
            W::TableFill { table } => {
                let (index, value, len) = self.pop3();
                self.emit_trapping(Op::TableFill {
                    table,
                    index: StackOffset(index.offset),
                    value: StackOffset(value.offset),
                    len: StackOffset(len.offset),
                });
            }
            W::ElemDrop { elem_index } => {
                self.emit(Op::ElemDrop {
                    segment: elem_index,
                });
            }

            // === i32/i64 arithmetic ===
            W::I32Add => binary!(self, I32Add, I32),
            W::I32Sub => binary!(self, I32Sub, I32),
            W::I32Mul => binary!(self, I32Mul, I32),
            W::I32DivS => binary_trap!(self, I32DivS, I32),
            W::I32DivU => binary_trap!(self, I32DivU, I32),
            W::I32RemS => binary_trap!(self, I32RemS, I32),
            W::I32RemU => binary_trap!(self, I32RemU, I32),
            W::I32And => binary!(self, I32And, I32),
            W::I32Or => binary!(self, I32Or, I32),
            W::I32Xor => binary!(self, I32Xor, I32),
            W::I32Shl => binary!(self, I32Shl, I32),
            W::I32ShrS => binary!(self, I32ShrS, I32),
            W::I32ShrU => binary!(self, I32ShrU, I32),
            W::I32Rotl => binary!(self, I32Rotl, I32),
            W::I32Rotr => binary!(self, I32Rotr, I32),
            W::I64Add => binary!(self, I64Add, I64),
            W::I64Sub => binary!(self, I64Sub, I64),
            W::I64Mul => binary!(self, I64Mul, I64),
            W::I64DivS => binary_trap!(self, I64DivS, I64),
            W::I64DivU => binary_trap!(self, I64DivU, I64),
            W::I64RemS => binary_trap!(self, I64RemS, I64),
            W::I64RemU => binary_trap!(self, I64RemU, I64),
            W::I64And => binary!(self, I64And, I64),
            W::I64Or => binary!(self, I64Or, I64),
            W::I64Xor => binary!(self, I64Xor, I64),
            W::I64Shl => binary!(self, I64Shl, I64),
            W::I64ShrS => binary!(self, I64ShrS, I64),
            W::I64ShrU => binary!(self, I64ShrU, I64),
            W::I64Rotl => binary!(self, I64Rotl, I64),
            W::I64Rotr => binary!(self, I64Rotr, I64),

            // === f32/f64 arithmetic ===
            W::F32Add => binary!(self, F32Add, F32),
            W::F32Sub => binary!(self, F32Sub, F32),
            W::F32Mul => binary!(self, F32Mul, F32),
            W::F32Div => binary!(self, F32Div, F32),
            W::F32Min => binary!(self, F32Min, F32),
            W::F32Max => binary!(self, F32Max, F32),
            W::F32Copysign => binary!(self, F32Copysign, F32),
            W::F64Add => binary!(self, F64Add, F64),
            W::F64Sub => binary!(self, F64Sub, F64),
            W::F64Mul => binary!(self, F64Mul, F64),
            W::F64Div => binary!(self, F64Div, F64),
            W::F64Min => binary!(self, F64Min, F64),
            W::F64Max => binary!(self, F64Max, F64),
            W::F64Copysign => binary!(self, F64Copysign, F64),

            // === comparisons ===
            W::I32Eq => binary!(self, I32Eq, I32),
            W::I32Ne => binary!(self, I32Ne, I32),
            W::I32LtS => binary!(self, I32LtS, I32),
            W::I32LtU => binary!(self, I32LtU, I32),
            W::I32GtS => binary!(self, I32GtS, I32),
            W::I32GtU => binary!(self, I32GtU, I32),
            W::I32LeS => binary!(self, I32LeS, I32),
            W::I32LeU => binary!(self, I32LeU, I32),
            W::I32GeS => binary!(self, I32GeS, I32),
            W::I32GeU => binary!(self, I32GeU, I32),
            W::I64Eq => binary!(self, I64Eq, I32),
            W::I64Ne => binary!(self, I64Ne, I32),
            W::I64LtS => binary!(self, I64LtS, I32),
            W::I64LtU => binary!(self, I64LtU, I32),
            W::I64GtS => binary!(self, I64GtS, I32),
            W::I64GtU => binary!(self, I64GtU, I32),
            W::I64LeS => binary!(self, I64LeS, I32),
            W::I64LeU => binary!(self, I64LeU, I32),
            W::I64GeS => binary!(self, I64GeS, I32),
            W::I64GeU => binary!(self, I64GeU, I32),
            W::F32Eq => binary!(self, F32Eq, I32),
            W::F32Ne => binary!(self, F32Ne, I32),
            W::F32Lt => binary!(self, F32Lt, I32),
            W::F32Gt => binary!(self, F32Gt, I32),
            W::F32Le => binary!(self, F32Le, I32),
            W::F32Ge => binary!(self, F32Ge, I32),
            W::F64Eq => binary!(self, F64Eq, I32),
            W::F64Ne => binary!(self, F64Ne, I32),
            W::F64Lt => binary!(self, F64Lt, I32),
            W::F64Gt => binary!(self, F64Gt, I32),
            W::F64Le => binary!(self, F64Le, I32),
            W::F64Ge => binary!(self, F64Ge, I32),

            // === scalar unary ===
            W::I32Clz => unary!(self, I32Clz, I32),
            W::I32Ctz => unary!(self, I32Ctz, I32),
            W::I32Popcnt => unary!(self, I32Popcnt, I32),
            W::I32Eqz => unary!(self, I32Eqz, I32),
            W::I64Clz => unary!(self, I64Clz, I64),
            W::I64Ctz => unary!(self, I64Ctz, I64),
            W::I64Popcnt => unary!(self, I64Popcnt, I64),
            W::I64Eqz => unary!(self, I64Eqz, I32),
            W::F32Abs => unary!(self, F32Abs, F32),
            W::F32Neg => unary!(self, F32Neg, F32),
            W::F32Ceil => unary!(self, F32Ceil, F32),
            W::F32Floor => unary!(self, F32Floor, F32),
            W::F32Trunc => unary!(self, F32Trunc, F32),
            W::F32Nearest => unary!(self, F32Nearest, F32),
            W::F32Sqrt => unary!(self, F32Sqrt, F32),
            W::F64Abs => unary!(self, F64Abs, F64),
            W::F64Neg => unary!(self, F64Neg, F64),
            W::F64Ceil => unary!(self, F64Ceil, F64),
            W::F64Floor => unary!(self, F64Floor, F64),
            W::F64Trunc => unary!(self, F64Trunc, F64),
            W::F64Nearest => unary!(self, F64Nearest, F64),
            W::F64Sqrt => unary!(self, F64Sqrt, F64),
            W::I32Extend8S => unary!(self, I32Extend8S, I32),
            W::I32Extend16S => unary!(self, I32Extend16S, I32),
            W::I64Extend8S => unary!(self, I64Extend8S, I64),
            W::I64Extend16S => unary!(self, I64Extend16S, I64),
            W::I64Extend32S => unary!(self, I64Extend32S, I64),

            // === conversions ===
            W::I32WrapI64 => unary!(self, I32WrapI64, I32),
            W::I64ExtendI32S => unary!(self, I64ExtendI32S, I64),
            W::I64ExtendI32U => unary!(self, I64ExtendI32U, I64),
            W::F32DemoteF64 => unary!(self, F32DemoteF64, F32),
            W::F64PromoteF32 => unary!(self, F64PromoteF32, F64),
            W::I32TruncF32S => unary_trap!(self, I32TruncF32S, I32),
            W::I32TruncF32U => unary_trap!(self, I32TruncF32U, I32),
            W::I32TruncF64S => unary_trap!(self, I32TruncF64S, I32),
            W::I32TruncF64U => unary_trap!(self, I32TruncF64U, I32),
            W::I64TruncF32S => unary_trap!(self, I64TruncF32S, I64),
            W::I64TruncF32U => unary_trap!(self, I64TruncF32U, I64),
            W::I64TruncF64S => unary_trap!(self, I64TruncF64S, I64),
            W::I64TruncF64U => unary_trap!(self, I64TruncF64U, I64),
            W::I32TruncSatF32S => unary!(self, I32TruncSatF32S, I32),
            W::I32TruncSatF32U => unary!(self, I32TruncSatF32U, I32),
            W::I32TruncSatF64S => unary!(self, I32TruncSatF64S, I32),
            W::I32TruncSatF64U => unary!(self, I32TruncSatF64U, I32),
            W::I64TruncSatF32S => unary!(self, I64TruncSatF32S, I64),
            W::I64TruncSatF32U => unary!(self, I64TruncSatF32U, I64),
            W::I64TruncSatF64S => unary!(self, I64TruncSatF64S, I64),
            W::I64TruncSatF64U => unary!(self, I64TruncSatF64U, I64),
            W::F32ConvertI32S => unary!(self, F32ConvertI32S, F32),
            W::F32ConvertI32U => unary!(self, F32ConvertI32U, F32),
            W::F32ConvertI64S => unary!(self, F32ConvertI64S, F32),
            W::F32ConvertI64U => unary!(self, F32ConvertI64U, F32),
            W::F64ConvertI32S => unary!(self, F64ConvertI32S, F64),
            W::F64ConvertI32U => unary!(self, F64ConvertI32U, F64),
            W::F64ConvertI64S => unary!(self, F64ConvertI64S, F64),
            W::F64ConvertI64U => unary!(self, F64ConvertI64U, F64),
            W::I32ReinterpretF32 => unary!(self, I32ReinterpretF32, I32),
            W::I64ReinterpretF64 => unary!(self, I64ReinterpretF64, I64),
            W::F32ReinterpretI32 => unary!(self, F32ReinterpretI32, F32),
            W::F64ReinterpretI64 => unary!(self, F64ReinterpretI64, F64),

            // === SIMD ===
            W::I8x16Splat => unary!(self, I8x16Splat, V128),
            W::I16x8Splat => unary!(self, I16x8Splat, V128),
            W::I32x4Splat => unary!(self, I32x4Splat, V128),
            W::I64x2Splat => unary!(self, I64x2Splat, V128),
            W::F32x4Splat => unary!(self, F32x4Splat, V128),
            W::F64x2Splat => unary!(self, F64x2Splat, V128),
            W::I8x16ExtractLaneS { lane } => extract_lane!(self, I8x16ExtractLaneS, lane, I32),
            W::I8x16ExtractLaneU { lane } => extract_lane!(self, I8x16ExtractLaneU, lane, I32),
            W::I16x8ExtractLaneS { lane } => extract_lane!(self, I16x8ExtractLaneS, lane, I32),
            W::I16x8ExtractLaneU { lane } => extract_lane!(self, I16x8ExtractLaneU, lane, I32),
            W::I32x4ExtractLane { lane } => extract_lane!(self, I32x4ExtractLane, lane, I32),
            W::I64x2ExtractLane { lane } => extract_lane!(self, I64x2ExtractLane, lane, I64),
            W::F32x4ExtractLane { lane } => extract_lane!(self, F32x4ExtractLane, lane, F32),
            W::F64x2ExtractLane { lane } => extract_lane!(self, F64x2ExtractLane, lane, F64),
            W::I8x16ReplaceLane { lane } => replace_lane!(self, I8x16ReplaceLane, lane),
            W::I16x8ReplaceLane { lane } => replace_lane!(self, I16x8ReplaceLane, lane),
            W::I32x4ReplaceLane { lane } => replace_lane!(self, I32x4ReplaceLane, lane),
            W::I64x2ReplaceLane { lane } => replace_lane!(self, I64x2ReplaceLane, lane),
            W::F32x4ReplaceLane { lane } => replace_lane!(self, F32x4ReplaceLane, lane),
            W::F64x2ReplaceLane { lane } => replace_lane!(self, F64x2ReplaceLane, lane),
            W::I8x16Shuffle { lanes } => {
                let (lhs, rhs) = self.pop2();
                let result = self.push_value(ValType::V128);
                self.emit(Op::I8x16Shuffle {
                    selector: Bytes16(lanes),
                    lhs: StackOffset(lhs.offset),
                    rhs: StackOffset(rhs.offset),
                    result: StackOffset(result),
                });
            }
            W::V128Not => unary!(self, V128Not, V128),
            W::V128AnyTrue => unary!(self, V128AnyTrue, I32),
            W::I8x16Abs => unary!(self, I8x16Abs, V128),
            W::I8x16Neg => unary!(self, I8x16Neg, V128),
            W::I8x16Popcnt => unary!(self, I8x16Popcnt, V128),
            W::I8x16AllTrue => unary!(self, I8x16AllTrue, I32),
            W::I8x16Bitmask => unary!(self, I8x16Bitmask, I32),
            W::I16x8Abs => unary!(self, I16x8Abs, V128),
            W::I16x8Neg => unary!(self, I16x8Neg, V128),
            W::I16x8AllTrue => unary!(self, I16x8AllTrue, I32),
            W::I16x8Bitmask => unary!(self, I16x8Bitmask, I32),
            W::I32x4Abs => unary!(self, I32x4Abs, V128),
            W::I32x4Neg => unary!(self, I32x4Neg, V128),
            W::I32x4AllTrue => unary!(self, I32x4AllTrue, I32),
            W::I32x4Bitmask => unary!(self, I32x4Bitmask, I32),
            W::I64x2Abs => unary!(self, I64x2Abs, V128),
            W::I64x2Neg => unary!(self, I64x2Neg, V128),
            W::I64x2AllTrue => unary!(self, I64x2AllTrue, I32),
            W::I64x2Bitmask => unary!(self, I64x2Bitmask, I32),
            W::F32x4Abs => unary!(self, F32x4Abs, V128),
            W::F32x4Neg => unary!(self, F32x4Neg, V128),
            W::F32x4Sqrt => unary!(self, F32x4Sqrt, V128),
            W::F32x4Ceil => unary!(self, F32x4Ceil, V128),
            W::F32x4Floor => unary!(self, F32x4Floor, V128),
            W::F32x4Trunc => unary!(self, F32x4Trunc, V128),
            W::F32x4Nearest => unary!(self, F32x4Nearest, V128),
            W::F64x2Abs => unary!(self, F64x2Abs, V128),
            W::F64x2Neg => unary!(self, F64x2Neg, V128),
            W::F64x2Sqrt => unary!(self, F64x2Sqrt, V128),
            W::F64x2Ceil => unary!(self, F64x2Ceil, V128),
            W::F64x2Floor => unary!(self, F64x2Floor, V128),
            W::F64x2Trunc => unary!(self, F64x2Trunc, V128),
            W::F64x2Nearest => unary!(self, F64x2Nearest, V128),
            W::I16x8ExtendLowI8x16S => unary!(self, I16x8ExtendLowI8x16S, V128),
            W::I16x8ExtendHighI8x16S => unary!(self, I16x8ExtendHighI8x16S, V128),
            W::I16x8ExtendLowI8x16U => unary!(self, I16x8ExtendLowI8x16U, V128),
            W::I16x8ExtendHighI8x16U => unary!(self, I16x8ExtendHighI8x16U, V128),
            W::I32x4ExtendLowI16x8S => unary!(self, I32x4ExtendLowI16x8S, V128),
            W::I32x4ExtendHighI16x8S => unary!(self, I32x4ExtendHighI16x8S, V128),
            W::I32x4ExtendLowI16x8U => unary!(self, I32x4ExtendLowI16x8U, V128),
            W::I32x4ExtendHighI16x8U => unary!(self, I32x4ExtendHighI16x8U, V128),
            W::I64x2ExtendLowI32x4S => unary!(self, I64x2ExtendLowI32x4S, V128),
            W::I64x2ExtendHighI32x4S => unary!(self, I64x2ExtendHighI32x4S, V128),
            W::I64x2ExtendLowI32x4U => unary!(self, I64x2ExtendLowI32x4U, V128),
            W::I64x2ExtendHighI32x4U => unary!(self, I64x2ExtendHighI32x4U, V128),
            W::I16x8ExtAddPairwiseI8x16S => unary!(self, I16x8ExtaddPairwiseI8x16S, V128),
            W::I16x8ExtAddPairwiseI8x16U => unary!(self, I16x8ExtaddPairwiseI8x16U, V128),
            W::I32x4ExtAddPairwiseI16x8S => unary!(self, I32x4ExtaddPairwiseI16x8S, V128),
            W::I32x4ExtAddPairwiseI16x8U => unary!(self, I32x4ExtaddPairwiseI16x8U, V128),
            W::F32x4ConvertI32x4S => unary!(self, F32x4ConvertI32x4S, V128),
            W::F32x4ConvertI32x4U => unary!(self, F32x4ConvertI32x4U, V128),
            W::F64x2ConvertLowI32x4S => unary!(self, F64x2ConvertLowI32x4S, V128),
            W::F64x2ConvertLowI32x4U => unary!(self, F64x2ConvertLowI32x4U, V128),
            W::I32x4TruncSatF32x4S => unary!(self, I32x4TruncSatF32x4S, V128),
            W::I32x4TruncSatF32x4U => unary!(self, I32x4TruncSatF32x4U, V128),
            W::I32x4TruncSatF64x2SZero => unary!(self, I32x4TruncSatF64x2SZero, V128),
            W::I32x4TruncSatF64x2UZero => unary!(self, I32x4TruncSatF64x2UZero, V128),
            W::F32x4DemoteF64x2Zero => unary!(self, F32x4DemoteF64x2Zero, V128),
            W::F64x2PromoteLowF32x4 => unary!(self, F64x2PromoteLowF32x4, V128),
            W::I32x4RelaxedTruncF32x4S => unary!(self, I32x4RelaxedTruncF32x4S, V128),
            W::I32x4RelaxedTruncF32x4U => unary!(self, I32x4RelaxedTruncF32x4U, V128),
            W::I32x4RelaxedTruncF64x2SZero => unary!(self, I32x4RelaxedTruncF64x2SZero, V128),
            W::I32x4RelaxedTruncF64x2UZero => unary!(self, I32x4RelaxedTruncF64x2UZero, V128),
            W::V128And => binary!(self, V128And, V128),
            W::V128Or => binary!(self, V128Or, V128),
            W::V128Xor => binary!(self, V128Xor, V128),
            W::V128AndNot => binary!(self, V128Andnot, V128),
            W::I8x16Add => binary!(self, I8x16Add, V128),
            W::I8x16Sub => binary!(self, I8x16Sub, V128),
            W::I8x16AddSatS => binary!(self, I8x16AddSatS, V128),
            W::I8x16AddSatU => binary!(self, I8x16AddSatU, V128),
            W::I8x16SubSatS => binary!(self, I8x16SubSatS, V128),
            W::I8x16SubSatU => binary!(self, I8x16SubSatU, V128),
            W::I8x16MinS => binary!(self, I8x16MinS, V128),
            W::I8x16MinU => binary!(self, I8x16MinU, V128),
            W::I8x16MaxS => binary!(self, I8x16MaxS, V128),
            W::I8x16MaxU => binary!(self, I8x16MaxU, V128),
            W::I8x16AvgrU => binary!(self, I8x16AvgrU, V128),
            W::I16x8Add => binary!(self, I16x8Add, V128),
            W::I16x8Sub => binary!(self, I16x8Sub, V128),
            W::I16x8Mul => binary!(self, I16x8Mul, V128),
            W::I16x8AddSatS => binary!(self, I16x8AddSatS, V128),
            W::I16x8AddSatU => binary!(self, I16x8AddSatU, V128),
            W::I16x8SubSatS => binary!(self, I16x8SubSatS, V128),
            W::I16x8SubSatU => binary!(self, I16x8SubSatU, V128),
            W::I16x8MinS => binary!(self, I16x8MinS, V128),
            W::I16x8MinU => binary!(self, I16x8MinU, V128),
            W::I16x8MaxS => binary!(self, I16x8MaxS, V128),
            W::I16x8MaxU => binary!(self, I16x8MaxU, V128),
            W::I16x8AvgrU => binary!(self, I16x8AvgrU, V128),
            W::I16x8Q15MulrSatS => binary!(self, I16x8Q15MulrSatS, V128),
            W::I32x4Add => binary!(self, I32x4Add, V128),
            W::I32x4Sub => binary!(self, I32x4Sub, V128),
            W::I32x4Mul => binary!(self, I32x4Mul, V128),
            W::I32x4MinS => binary!(self, I32x4MinS, V128),
            W::I32x4MinU => binary!(self, I32x4MinU, V128),
            W::I32x4MaxS => binary!(self, I32x4MaxS, V128),
            W::I32x4MaxU => binary!(self, I32x4MaxU, V128),
            W::I32x4DotI16x8S => binary!(self, I32x4DotI16x8S, V128),
            W::I64x2Add => binary!(self, I64x2Add, V128),
            W::I64x2Sub => binary!(self, I64x2Sub, V128),
            W::I64x2Mul => binary!(self, I64x2Mul, V128),
            W::F32x4Add => binary!(self, F32x4Add, V128),
            W::F32x4Sub => binary!(self, F32x4Sub, V128),
            W::F32x4Mul => binary!(self, F32x4Mul, V128),
            W::F32x4Div => binary!(self, F32x4Div, V128),
            W::F32x4Min => binary!(self, F32x4Min, V128),
            W::F32x4Max => binary!(self, F32x4Max, V128),
            W::F32x4PMin => binary!(self, F32x4Pmin, V128),
            W::F32x4PMax => binary!(self, F32x4Pmax, V128),
            W::F64x2Add => binary!(self, F64x2Add, V128),
            W::F64x2Sub => binary!(self, F64x2Sub, V128),
            W::F64x2Mul => binary!(self, F64x2Mul, V128),
            W::F64x2Div => binary!(self, F64x2Div, V128),
            W::F64x2Min => binary!(self, F64x2Min, V128),
            W::F64x2Max => binary!(self, F64x2Max, V128),
            W::F64x2PMin => binary!(self, F64x2Pmin, V128),
            W::F64x2PMax => binary!(self, F64x2Pmax, V128),
            W::I8x16Swizzle => binary!(self, I8x16Swizzle, V128),
            W::I8x16RelaxedSwizzle => binary!(self, I8x16RelaxedSwizzle, V128),
            W::I8x16NarrowI16x8S => binary!(self, I8x16NarrowI16x8S, V128),
            W::I8x16NarrowI16x8U => binary!(self, I8x16NarrowI16x8U, V128),
            W::I16x8NarrowI32x4S => binary!(self, I16x8NarrowI32x4S, V128),
            W::I16x8NarrowI32x4U => binary!(self, I16x8NarrowI32x4U, V128),
            W::I16x8ExtMulLowI8x16S => binary!(self, I16x8ExtmulLowI8x16S, V128),
            W::I16x8ExtMulHighI8x16S => binary!(self, I16x8ExtmulHighI8x16S, V128),
            W::I16x8ExtMulLowI8x16U => binary!(self, I16x8ExtmulLowI8x16U, V128),
            W::I16x8ExtMulHighI8x16U => binary!(self, I16x8ExtmulHighI8x16U, V128),
            W::I32x4ExtMulLowI16x8S => binary!(self, I32x4ExtmulLowI16x8S, V128),
            W::I32x4ExtMulHighI16x8S => binary!(self, I32x4ExtmulHighI16x8S, V128),
            W::I32x4ExtMulLowI16x8U => binary!(self, I32x4ExtmulLowI16x8U, V128),
            W::I32x4ExtMulHighI16x8U => binary!(self, I32x4ExtmulHighI16x8U, V128),
            W::I64x2ExtMulLowI32x4S => binary!(self, I64x2ExtmulLowI32x4S, V128),
            W::I64x2ExtMulHighI32x4S => binary!(self, I64x2ExtmulHighI32x4S, V128),
            W::I64x2ExtMulLowI32x4U => binary!(self, I64x2ExtmulLowI32x4U, V128),
            W::I64x2ExtMulHighI32x4U => binary!(self, I64x2ExtmulHighI32x4U, V128),
            W::I16x8RelaxedQ15mulrS => binary!(self, I16x8RelaxedQ15MulrS, V128),
            W::I16x8RelaxedDotI8x16I7x16S => binary!(self, I16x8RelaxedDotI8x16I7x16S, V128),
            W::F32x4RelaxedMin => binary!(self, F32x4RelaxedMin, V128),
            W::F32x4RelaxedMax => binary!(self, F32x4RelaxedMax, V128),
            W::F64x2RelaxedMin => binary!(self, F64x2RelaxedMin, V128),
            W::F64x2RelaxedMax => binary!(self, F64x2RelaxedMax, V128),
            W::I8x16Eq => binary!(self, I8x16Eq, V128),
            W::I8x16Ne => binary!(self, I8x16Ne, V128),
            W::I8x16LtS => binary!(self, I8x16LtS, V128),
            W::I8x16LtU => binary!(self, I8x16LtU, V128),
            W::I8x16GtS => binary!(self, I8x16GtS, V128),
            W::I8x16GtU => binary!(self, I8x16GtU, V128),
            W::I8x16LeS => binary!(self, I8x16LeS, V128),
            W::I8x16LeU => binary!(self, I8x16LeU, V128),
            W::I8x16GeS => binary!(self, I8x16GeS, V128),
            W::I8x16GeU => binary!(self, I8x16GeU, V128),
            W::I16x8Eq => binary!(self, I16x8Eq, V128),
            W::I16x8Ne => binary!(self, I16x8Ne, V128),
            W::I16x8LtS => binary!(self, I16x8LtS, V128),
            W::I16x8LtU => binary!(self, I16x8LtU, V128),
            W::I16x8GtS => binary!(self, I16x8GtS, V128),
            W::I16x8GtU => binary!(self, I16x8GtU, V128),
            W::I16x8LeS => binary!(self, I16x8LeS, V128),
            W::I16x8LeU => binary!(self, I16x8LeU, V128),
            W::I16x8GeS => binary!(self, I16x8GeS, V128),
            W::I16x8GeU => binary!(self, I16x8GeU, V128),
            W::I32x4Eq => binary!(self, I32x4Eq, V128),
            W::I32x4Ne => binary!(self, I32x4Ne, V128),
            W::I32x4LtS => binary!(self, I32x4LtS, V128),
            W::I32x4LtU => binary!(self, I32x4LtU, V128),
            W::I32x4GtS => binary!(self, I32x4GtS, V128),
            W::I32x4GtU => binary!(self, I32x4GtU, V128),
            W::I32x4LeS => binary!(self, I32x4LeS, V128),
            W::I32x4LeU => binary!(self, I32x4LeU, V128),
            W::I32x4GeS => binary!(self, I32x4GeS, V128),
            W::I32x4GeU => binary!(self, I32x4GeU, V128),
            W::I64x2Eq => binary!(self, I64x2Eq, V128),
            W::I64x2Ne => binary!(self, I64x2Ne, V128),
            W::I64x2LtS => binary!(self, I64x2LtS, V128),
            W::I64x2GtS => binary!(self, I64x2GtS, V128),
            W::I64x2LeS => binary!(self, I64x2LeS, V128),
            W::I64x2GeS => binary!(self, I64x2GeS, V128),
            W::F32x4Eq => binary!(self, F32x4Eq, V128),
            W::F32x4Ne => binary!(self, F32x4Ne, V128),
            W::F32x4Lt => binary!(self, F32x4Lt, V128),
            W::F32x4Gt => binary!(self, F32x4Gt, V128),
            W::F32x4Le => binary!(self, F32x4Le, V128),
            W::F32x4Ge => binary!(self, F32x4Ge, V128),
            W::F64x2Eq => binary!(self, F64x2Eq, V128),
            W::F64x2Ne => binary!(self, F64x2Ne, V128),
            W::F64x2Lt => binary!(self, F64x2Lt, V128),
            W::F64x2Gt => binary!(self, F64x2Gt, V128),
            W::F64x2Le => binary!(self, F64x2Le, V128),
            W::F64x2Ge => binary!(self, F64x2Ge, V128),
            W::I8x16Shl => shift!(self, I8x16Shl),
            W::I8x16ShrS => shift!(self, I8x16ShrS),
            W::I8x16ShrU => shift!(self, I8x16ShrU),
            W::I16x8Shl => shift!(self, I16x8Shl),
            W::I16x8ShrS => shift!(self, I16x8ShrS),
            W::I16x8ShrU => shift!(self, I16x8ShrU),
            W::I32x4Shl => shift!(self, I32x4Shl),
            W::I32x4ShrS => shift!(self, I32x4ShrS),
            W::I32x4ShrU => shift!(self, I32x4ShrU),
            W::I64x2Shl => shift!(self, I64x2Shl),
            W::I64x2ShrS => shift!(self, I64x2ShrS),
            W::I64x2ShrU => shift!(self, I64x2ShrU),
            W::V128Bitselect => ternary!(self, V128Bitselect { if_ones, if_zeros, mask }),
            W::I8x16RelaxedLaneselect
            | W::I16x8RelaxedLaneselect
            | W::I32x4RelaxedLaneselect
            | W::I64x2RelaxedLaneselect => {
                ternary!(self, V128RelaxedLaneselect { if_ones, if_zeros, mask })
            }
            W::F32x4RelaxedMadd => ternary!(self, F32x4RelaxedMadd { a, b, c }),
            W::F32x4RelaxedNmadd => ternary!(self, F32x4RelaxedNmadd { a, b, c }),
            W::F64x2RelaxedMadd => ternary!(self, F64x2RelaxedMadd { a, b, c }),
            W::F64x2RelaxedNmadd => ternary!(self, F64x2RelaxedNmadd { a, b, c }),
            W::I32x4RelaxedDotI8x16I7x16AddS => {
                ternary!(self, I32x4RelaxedDotI8x16I7x16AddS { a, b, c })
            }

            // === references and GC ===
            W::RefNull { hty } => {
                let heap = super::convert_heap_type(self.view.types, &hty);
                let result = StackOffset(self.push_value(ValType::Ref(RefType {
                    nullable: true,
                    heap,
                })));
                self.emit(Op::RefNull { result });
            }
            W::RefIsNull => unary!(self, RefIsNull, I32),
            W::RefFunc { function_index } => {
                let result = StackOffset(self.push_value(ValType::FUNC_REF));
                self.emit(Op::RefFunc {
                    func: function_index,
                    result,
                });
            }
            W::RefEq => binary!(self, RefEq, I32),
            W::RefAsNonNull => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(src.ty));
                self.emit_trapping(Op::RefAsNonNull {
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::RefI31 => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ValType::Ref(RefType {
                    nullable: false,
                    heap: HeapType::I31,
                })));
                self.emit(Op::RefI31 {
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::I31GetS => unary_trap!(self, I31GetS, I32),
            W::I31GetU => unary_trap!(self, I31GetU, I32),
            W::RefTestNonNull { hty } => self.visit_ref_test(&hty, false),
            W::RefTestNullable { hty } => self.visit_ref_test(&hty, true),
            W::RefCastNonNull { hty } => self.visit_ref_cast(&hty, false),
            W::RefCastNullable { hty } => self.visit_ref_cast(&hty, true),
            W::BrOnCast {
                relative_depth,
                to_ref_type,
                ..
            } => self.visit_br_on_cast(relative_depth, &to_ref_type, false),
            W::BrOnCastFail {
                relative_depth,
                to_ref_type,
                ..
            } => self.visit_br_on_cast(relative_depth, &to_ref_type, true),
            W::BrOnNull { relative_depth } => self.visit_br_on_null(relative_depth),
            W::BrOnNonNull { relative_depth } => self.visit_br_on_non_null(relative_depth),
            W::AnyConvertExtern => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ValType::Ref(RefType {
                    nullable: true,
                    heap: HeapType::Any,
                })));
                self.emit(Op::AnyConvertExtern {
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::ExternConvertAny => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ValType::EXTERN_REF));
                self.emit(Op::ExternConvertAny {
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::StructNew { struct_type_index } => {
                let arity = self.struct_field_count(struct_type_index);
                let mut fields = Vec::with_capacity(arity);
                for _ in 0..arity {
                    fields.push(StackOffset(self.pop_value().offset));
                }
                fields.reverse();
                let result = StackOffset(self.push_concrete_ref(struct_type_index));
                self.emit(Op::StructNew {
                    ty: struct_type_index,
                    result,
                    fields: fields.into_iter().collect(),
                });
            }
            W::StructNewDefault { struct_type_index } => {
                let result = StackOffset(self.push_concrete_ref(struct_type_index));
                self.emit(Op::StructNewDefault {
                    ty: struct_type_index,
                    result,
                });
            }
            W::StructGet {
                struct_type_index,
                field_index,
            } => {
                let ty = self.struct_field_type(struct_type_index, field_index);
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ty));
                self.emit_trapping(Op::StructGet {
                    ty: struct_type_index,
                    field: field_index,
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::StructGetS {
                struct_type_index,
                field_index,
            } => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit_trapping(Op::StructGetS {
                    ty: struct_type_index,
                    field: field_index,
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::StructGetU {
                struct_type_index,
                field_index,
            } => {
                let src = self.pop_value();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit_trapping(Op::StructGetU {
                    ty: struct_type_index,
                    field: field_index,
                    src: StackOffset(src.offset),
                    result,
                });
            }
            W::StructSet {
                struct_type_index,
                field_index,
            } => {
                let (src, value) = self.pop2();
                self.emit_trapping(Op::StructSet {
                    ty: struct_type_index,
                    field: field_index,
                    src: StackOffset(src.offset),
                    value: StackOffset(value.offset),
                });
            }
            W::ArrayNew { array_type_index } => {
                let (init, len) = self.pop2();
                let result = StackOffset(self.push_concrete_ref(array_type_index));
                self.emit(Op::ArrayNew {
                    ty: array_type_index,
                    init: StackOffset(init.offset),
                    len: StackOffset(len.offset),
                    result,
                });
            }
            W::ArrayNewDefault { array_type_index } => {
                let len = self.pop_value();
                let result = StackOffset(self.push_concrete_ref(array_type_index));
                self.emit(Op::ArrayNewDefault {
                    ty: array_type_index,
                    len: StackOffset(len.offset),
                    result,
                });
            }
            W::ArrayNewFixed {
                array_type_index,
                array_size,
            } => {
                let mut elems = Vec::with_capacity(array_size as usize);
                for _ in 0..array_size {
                    elems.push(StackOffset(self.pop_value().offset));
                }
                elems.reverse();
                let result = StackOffset(self.push_concrete_ref(array_type_index));
                self.emit(Op::ArrayNewFixed {
                    ty: array_type_index,
                    result,
                    elems: elems.into_iter().collect(),
                });
            }
            W::ArrayNewData {
                array_type_index,
                array_data_index,
            } => {
                let (offset, len) = self.pop2();
                let result = StackOffset(self.push_concrete_ref(array_type_index));
                self.emit_trapping(Op::ArrayNewData {
                    ty: array_type_index,
                    segment: array_data_index,
                    offset: StackOffset(offset.offset),
                    len: StackOffset(len.offset),
                    result,
                });
            }
            W::ArrayNewElem {
                array_type_index,
                array_elem_index,
            } => {
                let (offset, len) = self.pop2();
                let result = StackOffset(self.push_concrete_ref(array_type_index));
                self.emit_trapping(Op::ArrayNewElem {
                    ty: array_type_index,
                    segment: array_elem_index,
                    offset: StackOffset(offset.offset),
                    len: StackOffset(len.offset),
                    result,
                });
            }
            W::ArrayGet { array_type_index } => {
                let ty = self.array_elem_type(array_type_index);
                let (array, index) = self.pop2();
                let result = StackOffset(self.push_value(ty));
                self.emit_trapping(Op::ArrayGet {
                    ty: array_type_index,
                    array: StackOffset(array.offset),
                    index: StackOffset(index.offset),
                    result,
                });
            }
            W::ArrayGetS { array_type_index } => {
                let (array, index) = self.pop2();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit_trapping(Op::ArrayGetS {
                    ty: array_type_index,
                    array: StackOffset(array.offset),
                    index: StackOffset(index.offset),
                    result,
                });
            }
            W::ArrayGetU { array_type_index } => {
                let (array, index) = self.pop2();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit_trapping(Op::ArrayGetU {
                    ty: array_type_index,
                    array: StackOffset(array.offset),
                    index: StackOffset(index.offset),
                    result,
                });
            }
            W::ArraySet { array_type_index } => {
                let (array, index, value) = self.pop3();
                self.emit_trapping(Op::ArraySet {
                    ty: array_type_index,
                    array: StackOffset(array.offset),
                    index: StackOffset(index.offset),
                    value: StackOffset(value.offset),
                });
            }
            W::ArrayLen => {
                let array = self.pop_value();
                let result = StackOffset(self.push_value(ValType::I32));
                self.emit_trapping(Op::ArrayLen {
                    array: StackOffset(array.offset),
                    result,
                });
            }
            W::ArrayFill { array_type_index } => {
                let (array, offset, value, len) = self.pop4();
                self.emit_trapping(Op::ArrayFill {
                    ty: array_type_index,
                    array: StackOffset(array.offset),
                    offset: StackOffset(offset.offset),
                    value: StackOffset(value.offset),
                    len: StackOffset(len.offset),
                });
            }
            W::ArrayCopy {
                array_type_index_dst,
                array_type_index_src,
            } => {
                let len = self.pop_value();
                let (src, src_offset) = {
                    let src_offset = self.pop_value();
                    let src = self.pop_value();
                    (src, src_offset)
                };
                let (dst, dst_offset) = {
                    let dst_offset = self.pop_value();
                    let dst = self.pop_value();
                    (dst, dst_offset)
                };
                self.emit_trapping(Op::ArrayCopy {
                    dst_ty: array_type_index_dst,
                    src_ty: array_type_index_src,
                    dst: StackOffset(dst.offset),
                    dst_offset: StackOffset(dst_offset.offset),
                    src: StackOffset(src.offset),
                    src_offset: StackOffset(src_offset.offset),
                    len: StackOffset(len.offset),
                });
            }
            W::ArrayInitData {
                array_type_index,
                array_data_index,
            } => {
                let (array, array_offset, data_offset, len) = self.pop4();
                self.emit_trapping(Op::ArrayInitData {
                    ty: array_type_index,
                    segment: array_data_index,
                    array: StackOffset(array.offset),
                    array_offset: StackOffset(array_offset.offset),
                    data_offset: StackOffset(data_offset.offset),
                    len: StackOffset(len.offset),
                });
            }
            W::ArrayInitElem {
                array_type_index,
                array_elem_index,
            } => {
                let (array, array_offset, elem_offset, len) = self.pop4();
                self.emit_trapping(Op::ArrayInitElem {
                    ty: array_type_index,
                    segment: array_elem_index,
                    array: StackOffset(array.offset),
                    array_offset: StackOffset(array_offset.offset),
                    elem_offset: StackOffset(elem_offset.offset),
                    len: StackOffset(len.offset),
                });
            }

            // === atomics ===
            W::MemoryAtomicNotify { memarg } => {
                let (addr, count) = self.pop2();
                let result = self.push_value(ValType::I32);
                self.emit_trapping(Op::MemoryAtomicNotify {
                    offset: memarg.offset,
                    memory: memarg.memory as u16,
                    addr: StackOffset(addr.offset),
                    count: StackOffset(count.offset),
                    result: StackOffset(result),
                });
            }
            W::MemoryAtomicWait32 { memarg } => self.visit_wait(memarg, false),
            W::MemoryAtomicWait64 { memarg } => self.visit_wait(memarg, true),
            W::AtomicFence => {
                self.emit(Op::AtomicFence {});
            }
            W::I32AtomicLoad { memarg } => load!(self, I32AtomicLoad, memarg, I32),
            W::I32AtomicLoad8U { memarg } => load!(self, I32AtomicLoad8U, memarg, I32),
            W::I32AtomicLoad16U { memarg } => load!(self, I32AtomicLoad16U, memarg, I32),
            W::I64AtomicLoad { memarg } => load!(self, I64AtomicLoad, memarg, I64),
            W::I64AtomicLoad8U { memarg } => load!(self, I64AtomicLoad8U, memarg, I64),
            W::I64AtomicLoad16U { memarg } => load!(self, I64AtomicLoad16U, memarg, I64),
            W::I64AtomicLoad32U { memarg } => load!(self, I64AtomicLoad32U, memarg, I64),
            W::I32AtomicStore { memarg } => store!(self, I32AtomicStore, memarg),
            W::I32AtomicStore8 { memarg } => store!(self, I32AtomicStore8, memarg),
            W::I32AtomicStore16 { memarg } => store!(self, I32AtomicStore16, memarg),
            W::I64AtomicStore { memarg } => store!(self, I64AtomicStore, memarg),
            W::I64AtomicStore8 { memarg } => store!(self, I64AtomicStore8, memarg),
            W::I64AtomicStore16 { memarg } => store!(self, I64AtomicStore16, memarg),
            W::I64AtomicStore32 { memarg } => store!(self, I64AtomicStore32, memarg),
            W::I32AtomicRmwAdd { memarg } => rmw!(self, I32AtomicRmwAdd, memarg, I32),
            W::I32AtomicRmw8AddU { memarg } => rmw!(self, I32AtomicRmw8AddU, memarg, I32),
            W::I32AtomicRmw16AddU { memarg } => rmw!(self, I32AtomicRmw16AddU, memarg, I32),
            W::I64AtomicRmwAdd { memarg } => rmw!(self, I64AtomicRmwAdd, memarg, I64),
            W::I64AtomicRmw8AddU { memarg } => rmw!(self, I64AtomicRmw8AddU, memarg, I64),
            W::I64AtomicRmw16AddU { memarg } => rmw!(self, I64AtomicRmw16AddU, memarg, I64),
            W::I64AtomicRmw32AddU { memarg } => rmw!(self, I64AtomicRmw32AddU, memarg, I64),
            W::I32AtomicRmwSub { memarg } => rmw!(self, I32AtomicRmwSub, memarg, I32),
            W::I32AtomicRmw8SubU { memarg } => rmw!(self, I32AtomicRmw8SubU, memarg, I32),
            W::I32AtomicRmw16SubU { memarg } => rmw!(self, I32AtomicRmw16SubU, memarg, I32),
            W::I64AtomicRmwSub { memarg } => rmw!(self, I64AtomicRmwSub, memarg, I64),
            W::I64AtomicRmw8SubU { memarg } => rmw!(self, I64AtomicRmw8SubU, memarg, I64),
            W::I64AtomicRmw16SubU { memarg } => rmw!(self, I64AtomicRmw16SubU, memarg, I64),
            W::I64AtomicRmw32SubU { memarg } => rmw!(self, I64AtomicRmw32SubU, memarg, I64),
            W::I32AtomicRmwAnd { memarg } => rmw!(self, I32AtomicRmwAnd, memarg, I32),
            W::I32AtomicRmw8AndU { memarg } => rmw!(self, I32AtomicRmw8AndU, memarg, I32),
            W::I32AtomicRmw16AndU { memarg } => rmw!(self, I32AtomicRmw16AndU, memarg, I32),
            W::I64AtomicRmwAnd { memarg } => rmw!(self, I64AtomicRmwAnd, memarg, I64),
            W::I64AtomicRmw8AndU { memarg } => rmw!(self, I64AtomicRmw8AndU, memarg, I64),
            W::I64AtomicRmw16AndU { memarg } => rmw!(self, I64AtomicRmw16AndU, memarg, I64),
            W::I64AtomicRmw32AndU { memarg } => rmw!(self, I64AtomicRmw32AndU, memarg, I64),
            W::I32AtomicRmwOr { memarg } => rmw!(self, I32AtomicRmwOr, memarg, I32),
            W::I32AtomicRmw8OrU { memarg } => rmw!(self, I32AtomicRmw8OrU, memarg, I32),
            W::I32AtomicRmw16OrU { memarg } => rmw!(self, I32AtomicRmw16OrU, memarg, I32),
            W::I64AtomicRmwOr { memarg } => rmw!(self, I64AtomicRmwOr, memarg, I64),
            W::I64AtomicRmw8OrU { memarg } => rmw!(self, I64AtomicRmw8OrU, memarg, I64),
            W::I64AtomicRmw16OrU { memarg } => rmw!(self, I64AtomicRmw16OrU, memarg, I64),
            W::I64AtomicRmw32OrU { memarg } => rmw!(self, I64AtomicRmw32OrU, memarg, I64),
            W::I32AtomicRmwXor { memarg } => rmw!(self, I32AtomicRmwXor, memarg, I32),
            W::I32AtomicRmw8XorU { memarg } => rmw!(self, I32AtomicRmw8XorU, memarg, I32),
            W::I32AtomicRmw16XorU { memarg } => rmw!(self, I32AtomicRmw16XorU, memarg, I32),
            W::I64AtomicRmwXor { memarg } => rmw!(self, I64AtomicRmwXor, memarg, I64),
            W::I64AtomicRmw8XorU { memarg } => rmw!(self, I64AtomicRmw8XorU, memarg, I64),
            W::I64AtomicRmw16XorU { memarg } => rmw!(self, I64AtomicRmw16XorU, memarg, I64),
            W::I64AtomicRmw32XorU { memarg } => rmw!(self, I64AtomicRmw32XorU, memarg, I64),
            W::I32AtomicRmwXchg { memarg } => rmw!(self, I32AtomicRmwXchg, memarg, I32),
            W::I32AtomicRmw8XchgU { memarg } => rmw!(self, I32AtomicRmw8XchgU, memarg, I32),
            W::I32AtomicRmw16XchgU { memarg } => rmw!(self, I32AtomicRmw16XchgU, memarg, I32),
            W::I64AtomicRmwXchg { memarg } => rmw!(self, I64AtomicRmwXchg, memarg, I64),
            W::I64AtomicRmw8XchgU { memarg } => rmw!(self, I64AtomicRmw8XchgU, memarg, I64),
            W::I64AtomicRmw16XchgU { memarg } => rmw!(self, I64AtomicRmw16XchgU, memarg, I64),
            W::I64AtomicRmw32XchgU { memarg } => rmw!(self, I64AtomicRmw32XchgU, memarg, I64),
            W::I32AtomicRmwCmpxchg { memarg } => cmpxchg!(self, I32AtomicRmwCmpxchg, memarg, I32),
            W::I32AtomicRmw8CmpxchgU { memarg } => {
                cmpxchg!(self, I32AtomicRmw8CmpxchgU, memarg, I32)
            }
            W::I32AtomicRmw16CmpxchgU { memarg } => {
                cmpxchg!(self, I32AtomicRmw16CmpxchgU, memarg, I32)
            }
            W::I64AtomicRmwCmpxchg { memarg } => cmpxchg!(self, I64AtomicRmwCmpxchg, memarg, I64),
            W::I64AtomicRmw8CmpxchgU { memarg } => {
                cmpxchg!(self, I64AtomicRmw8CmpxchgU, memarg, I64)
            }
            W::I64AtomicRmw16CmpxchgU { memarg } => {
                cmpxchg!(self, I64AtomicRmw16CmpxchgU, memarg, I64)
            }
            W::I64AtomicRmw32CmpxchgU { memarg } => {
                cmpxchg!(self, I64AtomicRmw32CmpxchgU, memarg, I64)
            }

            unsupported => {
                unreachable!("unsupported operator in validated function body: {unsupported:?}")
            }
        }
        Ok(())
    }
}

/// Returns `true` for operators that must be processed even in
/// unreachable code to keep control frames balanced.
fn is_control_op(op: &wasmparser::Operator) -> bool {
    use wasmparser::Operator as W;
    matches!(
        op,
        W::Block { .. }
            | W::Loop { .. }
            | W::If { .. }
            | W::Else
            | W::End
            | W::Try { .. }
            | W::Catch { .. }
            | W::CatchAll
            | W::Delegate { .. }
            | W::TryTable { .. }
    )
}

// === helper routines of the operator visitor ===

impl FuncTranslator<'_> {
    /// Pops a value without returning its slot to the allocator.
    ///
    /// Used when the emitted instruction reads the slot after younger
    /// slots have been allocated; pair with [`FuncTranslator::release`].
    fn pop_keep(&mut self) -> StackValue {
        self.stack
            .pop()
            .unwrap_or_else(|| panic!("operand stack underflow in validated code"))
    }

    /// Releases a value obtained from [`FuncTranslator::pop_keep`].
    fn release(&mut self, value: StackValue) {
        if !value.pinned {
            self.alloc.free(value.ty, value.offset);
        }
    }

    /// Pops four values in push order.
    fn pop4(&mut self) -> (StackValue, StackValue, StackValue, StackValue) {
        let d = self.pop_value();
        let c = self.pop_value();
        let b = self.pop_value();
        let a = self.pop_value();
        (a, b, c, d)
    }

    /// Pops three values in push order, returning their offsets.
    fn pop3_offsets(&mut self) -> (StackOffset, StackOffset, StackOffset) {
        let (a, b, c) = self.pop3();
        (
            StackOffset(a.offset),
            StackOffset(b.offset),
            StackOffset(c.offset),
        )
    }

    /// Returns the offsets of the top `n` stack values in stack order.
    fn top_offsets(&self, n: usize) -> rosmar_ir::OffsetList {
        let top = self.stack.len();
        (top - n..top)
            .map(|i| StackOffset(self.stack[i].offset))
            .collect()
    }

    /// The index type of the memory at `mem`: `i64` for 64-bit memories.
    fn memory_index_type(&self, mem: u32) -> ValType {
        if self.view.memories[mem as usize].is_64() {
            ValType::I64
        } else {
            ValType::I32
        }
    }

    /// The number of fields of the struct type at the module index.
    fn struct_field_count(&self, type_index: u32) -> usize {
        let id = self.view.types[type_index as usize];
        self.view.engine.with_registry(|registry| {
            match registry.composite(id) {
                CompositeType::Struct(ty) => ty.fields.len(),
                ty => unreachable!("struct instruction on non-struct type: {ty:?}"),
            }
        })
    }

    /// The unpacked value type of a struct field.
    fn struct_field_type(&self, type_index: u32, field: u32) -> ValType {
        let id = self.view.types[type_index as usize];
        self.view.engine.with_registry(|registry| {
            match registry.composite(id) {
                CompositeType::Struct(ty) => ty.fields[field as usize].storage.unpacked(),
                ty => unreachable!("struct instruction on non-struct type: {ty:?}"),
            }
        })
    }

    /// The unpacked element type of an array type.
    fn array_elem_type(&self, type_index: u32) -> ValType {
        let id = self.view.types[type_index as usize];
        self.view.engine.with_registry(|registry| {
            match registry.composite(id) {
                CompositeType::Array(ty) => ty.elem.storage.unpacked(),
                ty => unreachable!("array instruction on non-array type: {ty:?}"),
            }
        })
    }

    /// Pushes a non-nullable reference to the concrete module type.
    fn push_concrete_ref(&mut self, type_index: u32) -> u16 {
        let id = self.view.types[type_index as usize];
        self.push_value(ValType::Ref(RefType {
            nullable: false,
            heap: HeapType::Concrete(id),
        }))
    }

    /// Pops the parameters of a call to a function of type `ty`.
    fn pop_call_params(&mut self, ty: crate::types::CompTypeId) -> rosmar_ir::OffsetList {
        let arity = self.view.engine.resolve_func_type(ty).params().len();
        let mut params = Vec::with_capacity(arity);
        for _ in 0..arity {
            params.push(StackOffset(self.pop_value().offset));
        }
        params.reverse();
        params.into_iter().collect()
    }

    /// Emits a `Call`: parameter sources followed by result destinations.
    fn visit_call(&mut self, function_index: u32) {
        let ty = self.view.func_types[function_index as usize];
        let func_type = self.view.engine.resolve_func_type(ty);
        let num_params = func_type.params().len();
        let params = self.pop_call_params(ty);
        let mut offsets: Vec<StackOffset> = params.0.into_vec();
        for result_ty in func_type.results() {
            offsets.push(StackOffset(self.push_value(*result_ty)));
        }
        self.emit_trapping(Op::Call {
            func: function_index,
            num_params: num_params as u16,
            reg_hint: RegHint(num_params.min(4) as u8),
            offsets: offsets.into_iter().collect(),
        });
    }

    fn visit_call_indirect(&mut self, type_index: u32, table_index: u32) {
        let ty = self.view.types[type_index as usize];
        let func_type = self.view.engine.resolve_func_type(ty);
        let num_params = func_type.params().len();
        let index = self.pop_value();
        let params = self.pop_call_params(ty);
        let mut offsets: Vec<StackOffset> = params.0.into_vec();
        for result_ty in func_type.results() {
            offsets.push(StackOffset(self.push_value(*result_ty)));
        }
        self.emit_trapping(Op::CallIndirect {
            table: table_index,
            ty: type_index,
            num_params: num_params as u16,
            reg_hint: RegHint(num_params.min(4) as u8),
            index: StackOffset(index.offset),
            offsets: offsets.into_iter().collect(),
        });
    }

    fn visit_call_ref(&mut self, type_index: u32) {
        let ty = self.view.types[type_index as usize];
        let func_type = self.view.engine.resolve_func_type(ty);
        let num_params = func_type.params().len();
        let callee = self.pop_value();
        let params = self.pop_call_params(ty);
        let mut offsets: Vec<StackOffset> = params.0.into_vec();
        for result_ty in func_type.results() {
            offsets.push(StackOffset(self.push_value(*result_ty)));
        }
        self.emit_trapping(Op::CallRef {
            ty: type_index,
            num_params: num_params as u16,
            reg_hint: RegHint(num_params.min(4) as u8),
            callee: StackOffset(callee.offset),
            offsets: offsets.into_iter().collect(),
        });
    }

    /// Emits a width-selected `select`.
    fn visit_select(&mut self) {
        let cond = self.pop_value();
        let (val_true, val_false) = {
            let val_false = self.pop_value();
            let val_true = self.pop_value();
            (val_true, val_false)
        };
        let result = self.push_value(val_true.ty);
        let cond = StackOffset(cond.offset);
        let val_true = StackOffset(val_true.offset);
        let val_false = StackOffset(val_false.offset);
        let result = StackOffset(result);
        let reg_hint = RegHint(1);
        let op = match self.stack.last().expect("select result was pushed").ty.frame_size() {
            4 => Op::Select32 {
                reg_hint,
                cond,
                val_true,
                val_false,
                result,
            },
            8 => Op::Select64 {
                reg_hint,
                cond,
                val_true,
                val_false,
                result,
            },
            _ => Op::Select128 {
                reg_hint,
                cond,
                val_true,
                val_false,
                result,
            },
        };
        self.emit(op);
    }

    /// Translates the `else` of an `if`.
    fn visit_else(&mut self) {
        let frame_idx = self.frames.len() - 1;
        // the true arm forwards its results and jumps over the false arm
        if self.reachable {
            let results = self.frames[frame_idx].results.clone();
            let top = self.stack.len();
            for (i, (ty, slot)) in results.iter().enumerate() {
                let value = self.stack[top - results.len() + i];
                self.emit_move(*ty, value.offset, *slot);
            }
            let end_label = self.frames[frame_idx].end_label;
            self.emit_jump_to(
                Op::Jump {
                    delta: JumpDelta(0),
                },
                end_label,
            );
        }
        let stack_height = self.frames[frame_idx].stack_height;
        self.truncate_stack(stack_height);
        let snapshot = self.frames[frame_idx].snapshot.clone();
        self.alloc.restore(snapshot);
        let else_label = match &mut self.frames[frame_idx].kind {
            FrameKind::If {
                else_label,
                seen_else,
            } => {
                *seen_else = true;
                *else_label
            }
            kind => unreachable!("else outside of an if frame: {kind:?}"),
        };
        self.resolve_label(else_label);
        let params = self.frames[frame_idx].params.clone();
        for (ty, slot) in params {
            self.push_pinned(ty, slot);
        }
        self.reachable = true;
    }

    /// Translates `end`, including the handler stubs of a `try_table`.
    fn visit_end(&mut self) -> Result<(), ModuleError> {
        let is_try_table = matches!(
            self.frames.last().map(|frame| &frame.kind),
            Some(FrameKind::Try { pending, .. }) if !pending.is_empty()
        );
        if !is_try_table {
            return self.close_frame();
        }
        let frame_idx = self.frames.len() - 1;
        // fall-through results, then jump over the handler stubs
        if self.reachable {
            let results = self.frames[frame_idx].results.clone();
            let top = self.stack.len();
            for (i, (ty, slot)) in results.iter().enumerate() {
                let value = self.stack[top - results.len() + i];
                self.emit_move(*ty, value.offset, *slot);
            }
        }
        let end_label = self.frames[frame_idx].end_label;
        self.emit_jump_to(
            Op::Jump {
                delta: JumpDelta(0),
            },
            end_label,
        );
        let (block, exn_slot, pending) = match &mut self.frames[frame_idx].kind {
            FrameKind::Try {
                block,
                exn_slot,
                pending,
                ..
            } => (*block, *exn_slot, core::mem::take(pending)),
            kind => unreachable!("try_table end on non-try frame: {kind:?}"),
        };
        self.mark_try_region_end(block);
        // handler stubs: copy the payload into the branch target's slots
        for catch in pending {
            let handler = self.code.next_pos();
            let target_slots = {
                let target = self.frames.len() - 1 - catch.depth as usize;
                self.frames[target].branch_slots().to_vec()
            };
            let mut sources: Vec<(ValType, u16)> = catch.payload.clone();
            if catch.is_ref {
                sources.push((ValType::Ref(RefType::EXN_REF), exn_slot));
            }
            debug_assert_eq!(sources.len(), target_slots.len());
            for ((ty, src), (_, dst)) in sources.iter().zip(&target_slots) {
                self.emit_move(*ty, *src, *dst);
            }
            let label = self.branch_label(catch.depth);
            self.emit_jump_to(
                Op::Jump {
                    delta: JumpDelta(0),
                },
                label,
            );
            let payload_offsets: Vec<StackOffset> =
                catch.payload.iter().map(|(_, slot)| StackOffset(*slot)).collect();
            self.push_catch(
                block,
                catch.tag,
                handler,
                payload_offsets,
                catch.is_ref,
                exn_slot,
            );
        }
        // the fall-through path already moved its results and jumped
        self.reachable = false;
        self.close_frame()
    }

    /// Translates `br_if`: values are copied on the taken path only.
    fn visit_br_if(&mut self, depth: u32) {
        let cond = self.pop_keep();
        let arity = {
            let frame = &self.frames[self.frames.len() - 1 - depth as usize];
            frame.branch_slots().len()
        };
        if arity == 0 {
            let label = self.branch_label(depth);
            self.emit_jump_to(
                Op::JumpIfTrue {
                    cond: StackOffset(cond.offset),
                    delta: JumpDelta(0),
                },
                label,
            );
        } else {
            let skip = self.new_label();
            self.emit_jump_to(
                Op::JumpIfFalse {
                    cond: StackOffset(cond.offset),
                    delta: JumpDelta(0),
                },
                skip,
            );
            self.emit_branch(depth);
            self.resolve_label(skip);
        }
        self.release(cond);
    }

    /// Translates `br_table` with per-target value-copy stubs.
    fn visit_br_table(&mut self, targets: &wasmparser::BrTable) -> Result<(), ModuleError> {
        let index = self.pop_keep();
        let mut depths: Vec<u32> = Vec::with_capacity(targets.len() as usize + 1);
        for depth in targets.targets() {
            depths.push(depth?);
        }
        depths.push(targets.default());
        let all_bare = depths.iter().all(|depth| {
            self.frames[self.frames.len() - 1 - *depth as usize]
                .branch_slots()
                .is_empty()
        });
        let table_pos = self.emit(Op::BrTable {
            index: StackOffset(index.offset),
            targets: DeltaList(vec![JumpDelta(0); depths.len()].into()),
        });
        if all_bare {
            for (i, depth) in depths.iter().enumerate() {
                let label = self.branch_label(*depth);
                self.use_label_for_br_table(label, table_pos, i);
            }
        } else {
            // stubs follow the table; everything after is only reachable
            // through it
            for (i, depth) in depths.iter().enumerate() {
                let stub = self.code.next_pos();
                self.code.patch_br_table_target(table_pos, i, stub);
                self.copy_branch_values(*depth);
                let label = self.branch_label(*depth);
                self.emit_jump_to(
                    Op::Jump {
                        delta: JumpDelta(0),
                    },
                    label,
                );
            }
        }
        self.release(index);
        self.reachable = false;
        Ok(())
    }

    /// Translates a legacy `catch` or `catch_all` arm.
    fn visit_catch(&mut self, tag: Option<u32>) {
        let frame_idx = self.frames.len() - 1;
        // close the previous arm: forward results and jump to the end
        if self.reachable {
            let results = self.frames[frame_idx].results.clone();
            let top = self.stack.len();
            for (i, (ty, slot)) in results.iter().enumerate() {
                let value = self.stack[top - results.len() + i];
                self.emit_move(*ty, value.offset, *slot);
            }
            let end_label = self.frames[frame_idx].end_label;
            self.emit_jump_to(
                Op::Jump {
                    delta: JumpDelta(0),
                },
                end_label,
            );
        }
        let stack_height = self.frames[frame_idx].stack_height;
        self.truncate_stack(stack_height);
        let snapshot = self.frames[frame_idx].snapshot.clone();
        self.alloc.restore(snapshot);
        let (block, exn_slot) = match &mut self.frames[frame_idx].kind {
            FrameKind::Try {
                block,
                exn_slot,
                in_catch,
                ..
            } => {
                *in_catch = true;
                (*block, *exn_slot)
            }
            kind => unreachable!("catch outside of a try frame: {kind:?}"),
        };
        self.mark_try_region_end(block);
        let handler = self.code.next_pos();
        let (catch_tag, payload_types) = match tag {
            Some(tag_index) => {
                let tag_ty = self.view.tags[tag_index as usize];
                let params = self.view.engine.resolve_func_type(tag_ty).params().to_vec();
                (CatchTag(tag_index), params)
            }
            None => (CatchTag::ALL, Vec::new()),
        };
        let mut payload = Vec::with_capacity(payload_types.len());
        for ty in payload_types {
            let slot = self.push_value(ty);
            payload.push(StackOffset(slot));
        }
        self.push_catch(block, catch_tag, handler, payload, true, exn_slot);
        self.reachable = true;
    }

    /// Translates a legacy `delegate`, reparenting the try region.
    fn visit_delegate(&mut self, relative_depth: u32) -> Result<(), ModuleError> {
        let block = match &self.frames[self.frames.len() - 1].kind {
            FrameKind::Try { block, .. } => *block,
            kind => unreachable!("delegate on non-try frame: {kind:?}"),
        };
        // the delegate target is the enclosing try at the label depth,
        // or the host when none exists there
        let target_idx = self.frames.len() - 1 - relative_depth as usize;
        let mut parent = rosmar_ir::TryBlockIdx::HOST;
        for frame in self.frames[..target_idx].iter().rev() {
            if let FrameKind::Try { block, .. } = &frame.kind {
                parent = *block;
                break;
            }
        }
        self.try_table.block_mut(block).parent = parent;
        self.close_frame()
    }

    /// Translates a `try_table`, recording its pending handler stubs.
    fn visit_try_table(&mut self, try_table: wasmparser::TryTable) -> Result<(), ModuleError> {
        let (params, results) = self.block_type(try_table.ty);
        self.open_frame(
            |this| {
                let exn_slot = this.alloc.alloc(ValType::Ref(RefType::EXN_REF));
                let block = this.open_try_region();
                FrameKind::Try {
                    block,
                    exn_slot,
                    in_catch: false,
                    pending: Vec::new(),
                }
            },
            params,
            results,
        );
        let mut pending = Vec::with_capacity(try_table.catches.len());
        for catch in &try_table.catches {
            use wasmparser::Catch;
            let (tag, depth, is_ref) = match catch {
                Catch::One { tag, label } => (CatchTag(*tag), *label, false),
                Catch::OneRef { tag, label } => (CatchTag(*tag), *label, true),
                Catch::All { label } => (CatchTag::ALL, *label, false),
                Catch::AllRef { label } => (CatchTag::ALL, *label, true),
            };
            let payload_types: Vec<ValType> = match tag.is_catch_all() {
                true => Vec::new(),
                false => {
                    let tag_ty = self.view.tags[tag.0 as usize];
                    self.view.engine.resolve_func_type(tag_ty).params().to_vec()
                }
            };
            let payload: Vec<(ValType, u16)> = payload_types
                .into_iter()
                .map(|ty| (ty, self.alloc.alloc(ty)))
                .collect();
            pending.push(super::PendingCatch {
                tag,
                depth,
                payload,
                is_ref,
            });
        }
        if let FrameKind::Try {
            pending: frame_pending,
            ..
        } = &mut self
            .frames
            .last_mut()
            .expect("try_table frame was just pushed")
            .kind
        {
            *frame_pending = pending;
        }
        Ok(())
    }

    /// Returns the hidden exception slot of the catch arm at `depth`.
    fn catch_exn_slot(&self, relative_depth: u32) -> u16 {
        let frame = &self.frames[self.frames.len() - 1 - relative_depth as usize];
        match &frame.kind {
            FrameKind::Try {
                exn_slot,
                in_catch: true,
                ..
            } => *exn_slot,
            kind => unreachable!("rethrow does not target a catch arm: {kind:?}"),
        }
    }

    /// Translates a `v128.loadN_lane` instruction; `width` selects N.
    fn visit_load_lane(&mut self, memarg: wasmparser::MemArg, lane: u8, width: u8) {
        let (addr, value) = self.pop2();
        let result = StackOffset(self.push_value(ValType::V128));
        let offset = memarg.offset;
        let memory = memarg.memory as u16;
        let addr = StackOffset(addr.offset);
        let value = StackOffset(value.offset);
        let op = match width {
            0 => Op::V128Load8Lane {
                offset,
                memory,
                lane,
                addr,
                value,
                result,
            },
            1 => Op::V128Load16Lane {
                offset,
                memory,
                lane,
                addr,
                value,
                result,
            },
            2 => Op::V128Load32Lane {
                offset,
                memory,
                lane,
                addr,
                value,
                result,
            },
            _ => Op::V128Load64Lane {
                offset,
                memory,
                lane,
                addr,
                value,
                result,
            },
        };
        self.emit_trapping(op);
    }

    /// Translates a `v128.storeN_lane` instruction; `width` selects N.
    fn visit_store_lane(&mut self, memarg: wasmparser::MemArg, lane: u8, width: u8) {
        let (addr, value) = self.pop2();
        let offset = memarg.offset;
        let memory = memarg.memory as u16;
        let addr = StackOffset(addr.offset);
        let value = StackOffset(value.offset);
        let op = match width {
            0 => Op::V128Store8Lane {
                offset,
                memory,
                lane,
                addr,
                value,
            },
            1 => Op::V128Store16Lane {
                offset,
                memory,
                lane,
                addr,
                value,
            },
            2 => Op::V128Store32Lane {
                offset,
                memory,
                lane,
                addr,
                value,
            },
            _ => Op::V128Store64Lane {
                offset,
                memory,
                lane,
                addr,
                value,
            },
        };
        self.emit_trapping(op);
    }

    /// Translates `memory.atomic.wait{32,64}`.
    fn visit_wait(&mut self, memarg: wasmparser::MemArg, is_64: bool) {
        let (addr, expected, timeout) = self.pop3();
        let result = StackOffset(self.push_value(ValType::I32));
        let offset = memarg.offset;
        let memory = memarg.memory as u16;
        let addr = StackOffset(addr.offset);
        let expected = StackOffset(expected.offset);
        let timeout = StackOffset(timeout.offset);
        let op = if is_64 {
            Op::MemoryAtomicWait64 {
                offset,
                memory,
                addr,
                expected,
                timeout,
                result,
            }
        } else {
            Op::MemoryAtomicWait32 {
                offset,
                memory,
                addr,
                expected,
                timeout,
                result,
            }
        };
        self.emit_trapping(op);
    }

    /// Translates `ref.test`.
    fn visit_ref_test(&mut self, hty: &wasmparser::HeapType, nullable: bool) {
        let (ty, flags) = encode_cast_target(hty, nullable);
        let src = self.pop_value();
        let result = StackOffset(self.push_value(ValType::I32));
        self.emit(Op::RefTest {
            ty,
            flags,
            src: StackOffset(src.offset),
            result,
        });
    }

    /// Translates `ref.cast`; the value keeps its slot.
    fn visit_ref_cast(&mut self, hty: &wasmparser::HeapType, nullable: bool) {
        let (ty, flags) = encode_cast_target(hty, nullable);
        let src = self
            .stack
            .last()
            .expect("ref.cast on validated stack")
            .offset;
        self.emit_trapping(Op::RefCast {
            ty,
            flags,
            src: StackOffset(src),
        });
    }

    /// Translates `br_on_cast` and `br_on_cast_fail` via inversion: the
    /// inverse test skips the value copies of the taken branch.
    fn visit_br_on_cast(
        &mut self,
        depth: u32,
        to: &wasmparser::RefType,
        branch_on_fail: bool,
    ) {
        let (ty, flags) = encode_cast_target(&to.heap_type(), to.is_nullable());
        let src = self
            .stack
            .last()
            .expect("br_on_cast on validated stack")
            .offset;
        let skip = self.new_label();
        let inverse = if branch_on_fail {
            Op::BrOnCast {
                ty,
                flags,
                src: StackOffset(src),
                delta: JumpDelta(0),
            }
        } else {
            Op::BrOnCastFail {
                ty,
                flags,
                src: StackOffset(src),
                delta: JumpDelta(0),
            }
        };
        let pos = self.emit(inverse);
        self.labels[skip.0].users.push(super::LabelUser::Jump(pos));
        self.emit_branch(depth);
        self.resolve_label(skip);
    }

    /// Translates `br_on_null`: branches without the reference.
    fn visit_br_on_null(&mut self, depth: u32) {
        let src = self
            .stack
            .last()
            .expect("br_on_null on validated stack")
            .offset;
        let skip = self.new_label();
        let pos = self.emit(Op::BrOnNonNull {
            src: StackOffset(src),
            delta: JumpDelta(0),
        });
        self.labels[skip.0].users.push(super::LabelUser::Jump(pos));
        // the branch does not carry the reference
        let reference = self.pop_keep();
        self.emit_branch(depth);
        self.stack.push(reference);
        self.resolve_label(skip);
    }

    /// Translates `br_on_non_null`: branches with the reference, drops it
    /// on fall-through.
    fn visit_br_on_non_null(&mut self, depth: u32) {
        let src = self
            .stack
            .last()
            .expect("br_on_non_null on validated stack")
            .offset;
        let skip = self.new_label();
        let pos = self.emit(Op::BrOnNull {
            src: StackOffset(src),
            delta: JumpDelta(0),
        });
        self.labels[skip.0].users.push(super::LabelUser::Jump(pos));
        self.emit_branch(depth);
        self.resolve_label(skip);
        self.pop_value();
    }
}
