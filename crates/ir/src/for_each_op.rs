//! The master listing of every rosmar bytecode.
//!
//! Consumer macros receive `Name { field: Type, ... }` entries and expand
//! them into the [`Opcode`] enum, the [`Op`] enum, the record codec, the
//! size function and the stack-offset accessors.
//!
//! Field types are restricted to single identifiers so that consumers can
//! match on them literally: `StackOffset` and `OffsetList` fields are the
//! ones collected by `Op::stack_offsets`.
//!
//! [`Opcode`]: crate::Opcode
//! [`Op`]: crate::Op

#[macro_export]
macro_rules! for_each_op {
    ($mac:ident) => {
        $mac! {
            // Control flow.

            /// Raises an unconditional `UnreachableExecuted` trap.
            Unreachable {},
            /// Jumps by a signed byte delta relative to this instruction's head.
            Jump { delta: JumpDelta },
            /// Jumps if the `i32` at `cond` is non-zero.
            JumpIfTrue { cond: StackOffset, delta: JumpDelta },
            /// Jumps if the `i32` at `cond` is zero.
            JumpIfFalse { cond: StackOffset, delta: JumpDelta },
            /// Jumps to `targets[index]`, or the trailing default target
            /// when `index` is out of bounds.
            BrTable { index: StackOffset, targets: DeltaList },
            /// Function epilogue: copies each `results` source into the
            /// packed result region at the frame base and returns.
            End { results: OffsetList },
            /// Calls the function at index `func`.
            ///
            /// The offset list carries the parameter sources followed by
            /// the result destinations; `num_params` separates the two.
            /// The calling convention is fully encoded here, the callee
            /// needs no knowledge of the caller's frame layout.
            Call { func: u32, num_params: u16, reg_hint: RegHint, offsets: OffsetList },
            /// Calls through a table slot after bounds, null and type checks.
            CallIndirect { table: u32, ty: u32, num_params: u16, reg_hint: RegHint, index: StackOffset, offsets: OffsetList },
            /// Calls the function referenced by the value at `callee`.
            CallRef { ty: u32, num_params: u16, reg_hint: RegHint, callee: StackOffset, offsets: OffsetList },
            /// Tail-calls the function at index `func`, reusing the activation.
            ReturnCall { func: u32, params: OffsetList },
            /// Tail-call variant of `CallIndirect`.
            ReturnCallIndirect { table: u32, ty: u32, index: StackOffset, params: OffsetList },
            /// Tail-call variant of `CallRef`.
            ReturnCallRef { ty: u32, callee: StackOffset, params: OffsetList },
            /// Selects between two 4-byte operands on a non-zero condition.
            Select32 { reg_hint: RegHint, cond: StackOffset, val_true: StackOffset, val_false: StackOffset, result: StackOffset },
            /// Selects between two 8-byte operands on a non-zero condition.
            Select64 { reg_hint: RegHint, cond: StackOffset, val_true: StackOffset, val_false: StackOffset, result: StackOffset },
            /// Selects between two 16-byte operands on a non-zero condition.
            Select128 { reg_hint: RegHint, cond: StackOffset, val_true: StackOffset, val_false: StackOffset, result: StackOffset },

            // Exceptions.

            /// Constructs an exception package for `tag` from `args` and unwinds.
            Throw { tag: u32, args: OffsetList },
            /// Re-raises the exception reference at `exn`.
            ThrowRef { exn: StackOffset },

            // Constants and moves.

            /// Writes a 4-byte immediate to `result`.
            Const32 { value: u32, result: StackOffset },
            /// Writes an 8-byte immediate to `result`.
            Const64 { value: u64, result: StackOffset },
            /// Writes a 16-byte immediate to `result`.
            Const128 { value: Bytes16, result: StackOffset },
            /// Copies 4 bytes between operand slots.
            Move32 { src: StackOffset, result: StackOffset },
            /// Copies 8 bytes between operand slots.
            Move64 { src: StackOffset, result: StackOffset },
            /// Copies 16 bytes between operand slots.
            Move128 { src: StackOffset, result: StackOffset },

            // Globals.

            GlobalGet32 { global: u32, result: StackOffset },
            GlobalGet64 { global: u32, result: StackOffset },
            GlobalGet128 { global: u32, result: StackOffset },
            GlobalSet32 { global: u32, src: StackOffset },
            GlobalSet64 { global: u32, src: StackOffset },
            GlobalSet128 { global: u32, src: StackOffset },

            // Linear memory loads.
            //
            // The effective address is `addr + offset`; the addition is
            // 32-bit with overflow-to-trap unless the memory is 64-bit.

            I32Load { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32Load8S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32Load8U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32Load16S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32Load16U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load8S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load8U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load16S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load16U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load32S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64Load32U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            F32Load { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            F64Load { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load8x8S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load8x8U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load16x4S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load16x4U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load32x2S { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load32x2U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load8Splat { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load16Splat { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load32Splat { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load64Splat { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load32Zero { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load64Zero { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            V128Load8Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset, result: StackOffset },
            V128Load16Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset, result: StackOffset },
            V128Load32Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset, result: StackOffset },
            V128Load64Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset, result: StackOffset },

            // Linear memory stores.

            I32Store { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I32Store8 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I32Store16 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64Store { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64Store8 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64Store16 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64Store32 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            F32Store { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            F64Store { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            V128Store { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            V128Store8Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset },
            V128Store16Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset },
            V128Store32Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset },
            V128Store64Lane { offset: u64, memory: u16, lane: u8, addr: StackOffset, value: StackOffset },

            // Bulk memory.

            MemorySize { memory: u16, result: StackOffset },
            MemoryGrow { memory: u16, delta: StackOffset, result: StackOffset },
            MemoryInit { memory: u16, segment: u32, dst: StackOffset, src: StackOffset, len: StackOffset },
            MemoryCopy { dst_memory: u16, src_memory: u16, dst: StackOffset, src: StackOffset, len: StackOffset },
            MemoryFill { memory: u16, dst: StackOffset, value: StackOffset, len: StackOffset },
            DataDrop { segment: u32 },

            // Tables.

            TableGet { table: u32, index: StackOffset, result: StackOffset },
            TableSet { table: u32, index: StackOffset, value: StackOffset },
            TableSize { table: u32, result: StackOffset },
            TableGrow { table: u32, delta: StackOffset, init: StackOffset, result: StackOffset },
            TableInit { table: u32, segment: u32, dst: StackOffset, src: StackOffset, len: StackOffset },
            TableCopy { dst_table: u32, src_table: u32, dst: StackOffset, src: StackOffset, len: StackOffset },
            TableFill { table: u32, index: StackOffset, value: StackOffset, len: StackOffset },
            ElemDrop { segment: u32 },

            // `i32` and `i64` arithmetic, bitwise and shift instructions.

            I32Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32DivS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32DivU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32RemS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32RemU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32And { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Or { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Xor { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Shl { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32ShrS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32ShrU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Rotl { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Rotr { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64DivS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64DivU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64RemS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64RemU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64And { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Or { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Xor { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Shl { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64ShrS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64ShrU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Rotl { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Rotr { lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // `f32` and `f64` arithmetic.

            F32Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Div { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Min { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Max { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Copysign { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Div { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Min { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Max { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Copysign { lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // Comparisons; results are `0` or `1` as `i32`.

            I32Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32LtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32GtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32LeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32GeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64LtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64GtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64LeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64GeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Lt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Gt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Le { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32Ge { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Lt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Gt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Le { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64Ge { lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // Scalar unary instructions.

            I32Clz { src: StackOffset, result: StackOffset },
            I32Ctz { src: StackOffset, result: StackOffset },
            I32Popcnt { src: StackOffset, result: StackOffset },
            I32Eqz { src: StackOffset, result: StackOffset },
            I64Clz { src: StackOffset, result: StackOffset },
            I64Ctz { src: StackOffset, result: StackOffset },
            I64Popcnt { src: StackOffset, result: StackOffset },
            I64Eqz { src: StackOffset, result: StackOffset },
            F32Abs { src: StackOffset, result: StackOffset },
            F32Neg { src: StackOffset, result: StackOffset },
            F32Ceil { src: StackOffset, result: StackOffset },
            F32Floor { src: StackOffset, result: StackOffset },
            F32Trunc { src: StackOffset, result: StackOffset },
            F32Nearest { src: StackOffset, result: StackOffset },
            F32Sqrt { src: StackOffset, result: StackOffset },
            F64Abs { src: StackOffset, result: StackOffset },
            F64Neg { src: StackOffset, result: StackOffset },
            F64Ceil { src: StackOffset, result: StackOffset },
            F64Floor { src: StackOffset, result: StackOffset },
            F64Trunc { src: StackOffset, result: StackOffset },
            F64Nearest { src: StackOffset, result: StackOffset },
            F64Sqrt { src: StackOffset, result: StackOffset },

            // Sign extension operators.

            I32Extend8S { src: StackOffset, result: StackOffset },
            I32Extend16S { src: StackOffset, result: StackOffset },
            I64Extend8S { src: StackOffset, result: StackOffset },
            I64Extend16S { src: StackOffset, result: StackOffset },
            I64Extend32S { src: StackOffset, result: StackOffset },

            // Conversions.

            I32WrapI64 { src: StackOffset, result: StackOffset },
            I64ExtendI32S { src: StackOffset, result: StackOffset },
            I64ExtendI32U { src: StackOffset, result: StackOffset },
            F32DemoteF64 { src: StackOffset, result: StackOffset },
            F64PromoteF32 { src: StackOffset, result: StackOffset },
            I32TruncF32S { src: StackOffset, result: StackOffset },
            I32TruncF32U { src: StackOffset, result: StackOffset },
            I32TruncF64S { src: StackOffset, result: StackOffset },
            I32TruncF64U { src: StackOffset, result: StackOffset },
            I64TruncF32S { src: StackOffset, result: StackOffset },
            I64TruncF32U { src: StackOffset, result: StackOffset },
            I64TruncF64S { src: StackOffset, result: StackOffset },
            I64TruncF64U { src: StackOffset, result: StackOffset },
            I32TruncSatF32S { src: StackOffset, result: StackOffset },
            I32TruncSatF32U { src: StackOffset, result: StackOffset },
            I32TruncSatF64S { src: StackOffset, result: StackOffset },
            I32TruncSatF64U { src: StackOffset, result: StackOffset },
            I64TruncSatF32S { src: StackOffset, result: StackOffset },
            I64TruncSatF32U { src: StackOffset, result: StackOffset },
            I64TruncSatF64S { src: StackOffset, result: StackOffset },
            I64TruncSatF64U { src: StackOffset, result: StackOffset },
            F32ConvertI32S { src: StackOffset, result: StackOffset },
            F32ConvertI32U { src: StackOffset, result: StackOffset },
            F32ConvertI64S { src: StackOffset, result: StackOffset },
            F32ConvertI64U { src: StackOffset, result: StackOffset },
            F64ConvertI32S { src: StackOffset, result: StackOffset },
            F64ConvertI32U { src: StackOffset, result: StackOffset },
            F64ConvertI64S { src: StackOffset, result: StackOffset },
            F64ConvertI64U { src: StackOffset, result: StackOffset },
            I32ReinterpretF32 { src: StackOffset, result: StackOffset },
            I64ReinterpretF64 { src: StackOffset, result: StackOffset },
            F32ReinterpretI32 { src: StackOffset, result: StackOffset },
            F64ReinterpretI64 { src: StackOffset, result: StackOffset },

            // SIMD splats, lane extraction and replacement.

            I8x16Splat { src: StackOffset, result: StackOffset },
            I16x8Splat { src: StackOffset, result: StackOffset },
            I32x4Splat { src: StackOffset, result: StackOffset },
            I64x2Splat { src: StackOffset, result: StackOffset },
            F32x4Splat { src: StackOffset, result: StackOffset },
            F64x2Splat { src: StackOffset, result: StackOffset },
            I8x16ExtractLaneS { lane: u8, src: StackOffset, result: StackOffset },
            I8x16ExtractLaneU { lane: u8, src: StackOffset, result: StackOffset },
            I16x8ExtractLaneS { lane: u8, src: StackOffset, result: StackOffset },
            I16x8ExtractLaneU { lane: u8, src: StackOffset, result: StackOffset },
            I32x4ExtractLane { lane: u8, src: StackOffset, result: StackOffset },
            I64x2ExtractLane { lane: u8, src: StackOffset, result: StackOffset },
            F32x4ExtractLane { lane: u8, src: StackOffset, result: StackOffset },
            F64x2ExtractLane { lane: u8, src: StackOffset, result: StackOffset },
            I8x16ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            I16x8ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            I32x4ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            I64x2ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            F32x4ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            F64x2ReplaceLane { lane: u8, src: StackOffset, value: StackOffset, result: StackOffset },
            I8x16Shuffle { selector: Bytes16, lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // SIMD unary instructions.

            V128Not { src: StackOffset, result: StackOffset },
            V128AnyTrue { src: StackOffset, result: StackOffset },
            I8x16Abs { src: StackOffset, result: StackOffset },
            I8x16Neg { src: StackOffset, result: StackOffset },
            I8x16Popcnt { src: StackOffset, result: StackOffset },
            I8x16AllTrue { src: StackOffset, result: StackOffset },
            I8x16Bitmask { src: StackOffset, result: StackOffset },
            I16x8Abs { src: StackOffset, result: StackOffset },
            I16x8Neg { src: StackOffset, result: StackOffset },
            I16x8AllTrue { src: StackOffset, result: StackOffset },
            I16x8Bitmask { src: StackOffset, result: StackOffset },
            I32x4Abs { src: StackOffset, result: StackOffset },
            I32x4Neg { src: StackOffset, result: StackOffset },
            I32x4AllTrue { src: StackOffset, result: StackOffset },
            I32x4Bitmask { src: StackOffset, result: StackOffset },
            I64x2Abs { src: StackOffset, result: StackOffset },
            I64x2Neg { src: StackOffset, result: StackOffset },
            I64x2AllTrue { src: StackOffset, result: StackOffset },
            I64x2Bitmask { src: StackOffset, result: StackOffset },
            F32x4Abs { src: StackOffset, result: StackOffset },
            F32x4Neg { src: StackOffset, result: StackOffset },
            F32x4Sqrt { src: StackOffset, result: StackOffset },
            F32x4Ceil { src: StackOffset, result: StackOffset },
            F32x4Floor { src: StackOffset, result: StackOffset },
            F32x4Trunc { src: StackOffset, result: StackOffset },
            F32x4Nearest { src: StackOffset, result: StackOffset },
            F64x2Abs { src: StackOffset, result: StackOffset },
            F64x2Neg { src: StackOffset, result: StackOffset },
            F64x2Sqrt { src: StackOffset, result: StackOffset },
            F64x2Ceil { src: StackOffset, result: StackOffset },
            F64x2Floor { src: StackOffset, result: StackOffset },
            F64x2Trunc { src: StackOffset, result: StackOffset },
            F64x2Nearest { src: StackOffset, result: StackOffset },

            // SIMD widening, pairwise and conversion instructions.

            I16x8ExtendLowI8x16S { src: StackOffset, result: StackOffset },
            I16x8ExtendHighI8x16S { src: StackOffset, result: StackOffset },
            I16x8ExtendLowI8x16U { src: StackOffset, result: StackOffset },
            I16x8ExtendHighI8x16U { src: StackOffset, result: StackOffset },
            I32x4ExtendLowI16x8S { src: StackOffset, result: StackOffset },
            I32x4ExtendHighI16x8S { src: StackOffset, result: StackOffset },
            I32x4ExtendLowI16x8U { src: StackOffset, result: StackOffset },
            I32x4ExtendHighI16x8U { src: StackOffset, result: StackOffset },
            I64x2ExtendLowI32x4S { src: StackOffset, result: StackOffset },
            I64x2ExtendHighI32x4S { src: StackOffset, result: StackOffset },
            I64x2ExtendLowI32x4U { src: StackOffset, result: StackOffset },
            I64x2ExtendHighI32x4U { src: StackOffset, result: StackOffset },
            I16x8ExtaddPairwiseI8x16S { src: StackOffset, result: StackOffset },
            I16x8ExtaddPairwiseI8x16U { src: StackOffset, result: StackOffset },
            I32x4ExtaddPairwiseI16x8S { src: StackOffset, result: StackOffset },
            I32x4ExtaddPairwiseI16x8U { src: StackOffset, result: StackOffset },
            F32x4ConvertI32x4S { src: StackOffset, result: StackOffset },
            F32x4ConvertI32x4U { src: StackOffset, result: StackOffset },
            F64x2ConvertLowI32x4S { src: StackOffset, result: StackOffset },
            F64x2ConvertLowI32x4U { src: StackOffset, result: StackOffset },
            I32x4TruncSatF32x4S { src: StackOffset, result: StackOffset },
            I32x4TruncSatF32x4U { src: StackOffset, result: StackOffset },
            I32x4TruncSatF64x2SZero { src: StackOffset, result: StackOffset },
            I32x4TruncSatF64x2UZero { src: StackOffset, result: StackOffset },
            F32x4DemoteF64x2Zero { src: StackOffset, result: StackOffset },
            F64x2PromoteLowF32x4 { src: StackOffset, result: StackOffset },
            I32x4RelaxedTruncF32x4S { src: StackOffset, result: StackOffset },
            I32x4RelaxedTruncF32x4U { src: StackOffset, result: StackOffset },
            I32x4RelaxedTruncF64x2SZero { src: StackOffset, result: StackOffset },
            I32x4RelaxedTruncF64x2UZero { src: StackOffset, result: StackOffset },

            // SIMD binary instructions.

            V128And { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            V128Or { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            V128Xor { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            V128Andnot { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16AddSatS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16AddSatU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16SubSatS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16SubSatU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16MinS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16MinU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16MaxS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16MaxU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16AvgrU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8AddSatS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8AddSatU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8SubSatS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8SubSatU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8MinS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8MinU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8MaxS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8MaxU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8AvgrU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Q15MulrSatS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4MinS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4MinU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4MaxS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4MaxU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4DotI16x8S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Div { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Min { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Max { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Pmin { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Pmax { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Add { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Sub { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Mul { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Div { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Min { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Max { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Pmin { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Pmax { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16Swizzle { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16RelaxedSwizzle { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16NarrowI16x8S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16NarrowI16x8U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8NarrowI32x4S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8NarrowI32x4U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8ExtmulLowI8x16S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8ExtmulHighI8x16S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8ExtmulLowI8x16U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8ExtmulHighI8x16U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4ExtmulLowI16x8S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4ExtmulHighI16x8S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4ExtmulLowI16x8U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4ExtmulHighI16x8U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2ExtmulLowI32x4S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2ExtmulHighI32x4S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2ExtmulLowI32x4U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2ExtmulHighI32x4U { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8RelaxedQ15MulrS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8RelaxedDotI8x16I7x16S { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4RelaxedMin { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4RelaxedMax { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2RelaxedMin { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2RelaxedMax { lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // SIMD comparisons.

            I8x16Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16LtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16GtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16LeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I8x16GeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8LtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8GtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8LeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I16x8GeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4LtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4GtU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4LeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I32x4GeU { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2LtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2GtS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2LeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            I64x2GeS { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Lt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Gt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Le { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F32x4Ge { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Eq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Ne { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Lt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Gt { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Le { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            F64x2Ge { lhs: StackOffset, rhs: StackOffset, result: StackOffset },

            // SIMD shifts; the shift amount is an `i32` operand.

            I8x16Shl { value: StackOffset, amount: StackOffset, result: StackOffset },
            I8x16ShrS { value: StackOffset, amount: StackOffset, result: StackOffset },
            I8x16ShrU { value: StackOffset, amount: StackOffset, result: StackOffset },
            I16x8Shl { value: StackOffset, amount: StackOffset, result: StackOffset },
            I16x8ShrS { value: StackOffset, amount: StackOffset, result: StackOffset },
            I16x8ShrU { value: StackOffset, amount: StackOffset, result: StackOffset },
            I32x4Shl { value: StackOffset, amount: StackOffset, result: StackOffset },
            I32x4ShrS { value: StackOffset, amount: StackOffset, result: StackOffset },
            I32x4ShrU { value: StackOffset, amount: StackOffset, result: StackOffset },
            I64x2Shl { value: StackOffset, amount: StackOffset, result: StackOffset },
            I64x2ShrS { value: StackOffset, amount: StackOffset, result: StackOffset },
            I64x2ShrU { value: StackOffset, amount: StackOffset, result: StackOffset },

            // SIMD ternary instructions.

            V128Bitselect { if_ones: StackOffset, if_zeros: StackOffset, mask: StackOffset, result: StackOffset },
            V128RelaxedLaneselect { if_ones: StackOffset, if_zeros: StackOffset, mask: StackOffset, result: StackOffset },
            F32x4RelaxedMadd { a: StackOffset, b: StackOffset, c: StackOffset, result: StackOffset },
            F32x4RelaxedNmadd { a: StackOffset, b: StackOffset, c: StackOffset, result: StackOffset },
            F64x2RelaxedMadd { a: StackOffset, b: StackOffset, c: StackOffset, result: StackOffset },
            F64x2RelaxedNmadd { a: StackOffset, b: StackOffset, c: StackOffset, result: StackOffset },
            I32x4RelaxedDotI8x16I7x16AddS { a: StackOffset, b: StackOffset, c: StackOffset, result: StackOffset },

            // References and GC.

            /// Writes the function reference for `func` to `result`.
            RefFunc { func: u32, result: StackOffset },
            /// Writes the null reference (all-zero encoding) to `result`.
            RefNull { result: StackOffset },
            RefIsNull { src: StackOffset, result: StackOffset },
            /// Copies the reference, trapping with `NullAccess` when it is null.
            RefAsNonNull { src: StackOffset, result: StackOffset },
            RefEq { lhs: StackOffset, rhs: StackOffset, result: StackOffset },
            /// Boxes the low 31 bits of an `i32` into an `i31` reference.
            RefI31 { src: StackOffset, result: StackOffset },
            I31GetS { src: StackOffset, result: StackOffset },
            I31GetU { src: StackOffset, result: StackOffset },
            /// Traps with `InvalidCast` unless the reference is a subtype of
            /// the target heap type encoded in `ty`/`flags`.
            RefCast { ty: u32, flags: u8, src: StackOffset },
            RefTest { ty: u32, flags: u8, src: StackOffset, result: StackOffset },
            /// Branches when the cast succeeds.
            BrOnCast { ty: u32, flags: u8, src: StackOffset, delta: JumpDelta },
            /// Branches when the cast fails.
            BrOnCastFail { ty: u32, flags: u8, src: StackOffset, delta: JumpDelta },
            BrOnNull { src: StackOffset, delta: JumpDelta },
            BrOnNonNull { src: StackOffset, delta: JumpDelta },
            AnyConvertExtern { src: StackOffset, result: StackOffset },
            ExternConvertAny { src: StackOffset, result: StackOffset },
            /// Allocates a struct; the offsets are the field sources in
            /// declaration order.
            StructNew { ty: u32, result: StackOffset, fields: OffsetList },
            StructNewDefault { ty: u32, result: StackOffset },
            StructGet { ty: u32, field: u32, src: StackOffset, result: StackOffset },
            /// Packed-field read widening with sign extension.
            StructGetS { ty: u32, field: u32, src: StackOffset, result: StackOffset },
            /// Packed-field read widening with zero extension.
            StructGetU { ty: u32, field: u32, src: StackOffset, result: StackOffset },
            StructSet { ty: u32, field: u32, src: StackOffset, value: StackOffset },
            ArrayNew { ty: u32, init: StackOffset, len: StackOffset, result: StackOffset },
            ArrayNewDefault { ty: u32, len: StackOffset, result: StackOffset },
            /// Allocates an array from the listed element sources.
            ArrayNewFixed { ty: u32, result: StackOffset, elems: OffsetList },
            ArrayNewData { ty: u32, segment: u32, offset: StackOffset, len: StackOffset, result: StackOffset },
            ArrayNewElem { ty: u32, segment: u32, offset: StackOffset, len: StackOffset, result: StackOffset },
            ArrayGet { ty: u32, array: StackOffset, index: StackOffset, result: StackOffset },
            ArrayGetS { ty: u32, array: StackOffset, index: StackOffset, result: StackOffset },
            ArrayGetU { ty: u32, array: StackOffset, index: StackOffset, result: StackOffset },
            ArraySet { ty: u32, array: StackOffset, index: StackOffset, value: StackOffset },
            ArrayLen { array: StackOffset, result: StackOffset },
            ArrayFill { ty: u32, array: StackOffset, offset: StackOffset, value: StackOffset, len: StackOffset },
            ArrayCopy { dst_ty: u32, src_ty: u32, dst: StackOffset, dst_offset: StackOffset, src: StackOffset, src_offset: StackOffset, len: StackOffset },
            ArrayInitData { ty: u32, segment: u32, array: StackOffset, array_offset: StackOffset, data_offset: StackOffset, len: StackOffset },
            ArrayInitElem { ty: u32, segment: u32, array: StackOffset, array_offset: StackOffset, elem_offset: StackOffset, len: StackOffset },

            // Atomics.

            I32AtomicLoad { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32AtomicLoad8U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32AtomicLoad16U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64AtomicLoad { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64AtomicLoad8U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64AtomicLoad16U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I64AtomicLoad32U { offset: u64, memory: u16, addr: StackOffset, result: StackOffset },
            I32AtomicStore { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I32AtomicStore8 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I32AtomicStore16 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64AtomicStore { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64AtomicStore8 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64AtomicStore16 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I64AtomicStore32 { offset: u64, memory: u16, addr: StackOffset, value: StackOffset },
            I32AtomicRmwAdd { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8AddU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16AddU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwAdd { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8AddU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16AddU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32AddU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwSub { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8SubU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16SubU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwSub { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8SubU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16SubU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32SubU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwAnd { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8AndU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16AndU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwAnd { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8AndU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16AndU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32AndU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwOr { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8OrU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16OrU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwOr { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8OrU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16OrU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32OrU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwXor { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8XorU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16XorU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwXor { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8XorU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16XorU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32XorU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwXchg { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw8XchgU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmw16XchgU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmwXchg { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw8XchgU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw16XchgU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I64AtomicRmw32XchgU { offset: u64, memory: u16, addr: StackOffset, value: StackOffset, result: StackOffset },
            I32AtomicRmwCmpxchg { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I32AtomicRmw8CmpxchgU { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I32AtomicRmw16CmpxchgU { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I64AtomicRmwCmpxchg { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I64AtomicRmw8CmpxchgU { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I64AtomicRmw16CmpxchgU { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            I64AtomicRmw32CmpxchgU { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, replacement: StackOffset, result: StackOffset },
            /// Parks the thread until notified, timed out, or the expected
            /// `i32` no longer matches. Results: 0 ok, 1 not-equal, 2 timed out.
            MemoryAtomicWait32 { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, timeout: StackOffset, result: StackOffset },
            /// 64-bit variant of `MemoryAtomicWait32`.
            MemoryAtomicWait64 { offset: u64, memory: u16, addr: StackOffset, expected: StackOffset, timeout: StackOffset, result: StackOffset },
            /// Wakes up to `count` waiters parked on the effective address.
            MemoryAtomicNotify { offset: u64, memory: u16, addr: StackOffset, count: StackOffset, result: StackOffset },
            /// Full two-way memory barrier.
            AtomicFence {},
        }
    };
}
