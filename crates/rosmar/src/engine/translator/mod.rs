//! The translator from validated WebAssembly function bodies to the
//! stack-offset bytecode.
//!
//! A single forward pass simulates the operand stack at compile time,
//! assigns every produced value a byte offset within the frame, lowers
//! structured control flow to signed-delta jumps, and emits the try/catch
//! side tables.
//!
//! The input is trusted to be validated; any internal inconsistency is an
//! unrecoverable programmer error and panics.

mod visit;

pub(crate) use self::visit::cast_encoding;

use crate::{
    engine::{CompiledFuncEntity, Engine},
    global::GlobalType,
    memory::MemoryType,
    module::ModuleError,
    table::TableType,
    types::{align_up, packed_offsets, CompTypeId, FuncType, ValType},
};
use rosmar_ir::{
    CatchBlock,
    CatchTag,
    CodeBuf,
    JumpDelta,
    Op,
    OpPos,
    StackOffset,
    TrapPointTable,
    TryBlock,
    TryBlockIdx,
    TryTable,
};
use std::vec::Vec;

/// The module context a function body is translated against.
#[derive(Copy, Clone)]
pub(crate) struct ModuleView<'a> {
    /// The engine owning the type registry and code map.
    pub engine: &'a Engine,
    /// Canonical identities of the module types.
    pub types: &'a [CompTypeId],
    /// Canonical function types, imported functions first.
    pub func_types: &'a [CompTypeId],
    /// Global types, imported globals first.
    pub globals: &'a [GlobalType],
    /// Memory types, imported memories first.
    pub memories: &'a [MemoryType],
    /// Table types, imported tables first.
    pub tables: &'a [TableType],
    /// Tag payload types, imported tags first.
    pub tags: &'a [CompTypeId],
}

/// The size classes of operand slots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SizeClass {
    /// 4-byte operands: `i32`, `f32`.
    Word,
    /// 8-byte operands: `i64`, `f64` and references.
    Double,
    /// 16-byte operands: `v128`.
    Quad,
}

impl SizeClass {
    fn of(ty: ValType) -> Self {
        match ty.frame_size() {
            4 => Self::Word,
            8 => Self::Double,
            16 => Self::Quad,
            size => unreachable!("invalid frame size: {size}"),
        }
    }

    fn bytes(self) -> u32 {
        match self {
            Self::Word => 4,
            Self::Double => 8,
            Self::Quad => 16,
        }
    }
}

/// The forward single-pass operand slot allocator.
///
/// At each value definition it picks the lowest free slot of the right
/// size class within the operand region and reuses slots once their last
/// consumer has been seen.
#[derive(Debug, Clone)]
struct SlotAlloc {
    /// The bump cursor past the highest allocated slot.
    cursor: u32,
    /// The high watermark of `cursor` over the whole function.
    high: u32,
    /// Freed 4-byte slots.
    free4: Vec<u16>,
    /// Freed 8-byte slots.
    free8: Vec<u16>,
    /// Freed 16-byte slots.
    free16: Vec<u16>,
}

/// A snapshot of the allocator for structured control flow.
///
/// Restoring at a block boundary releases every slot the block allocated
/// internally while keeping the block's own pinned slots alive.
type AllocSnapshot = SlotAlloc;

impl SlotAlloc {
    fn new(base: u32) -> Self {
        Self {
            cursor: base,
            high: base,
            free4: Vec::new(),
            free8: Vec::new(),
            free16: Vec::new(),
        }
    }

    fn free_list(&mut self, class: SizeClass) -> &mut Vec<u16> {
        match class {
            SizeClass::Word => &mut self.free4,
            SizeClass::Double => &mut self.free8,
            SizeClass::Quad => &mut self.free16,
        }
    }

    /// Allocates a slot for a value of type `ty`.
    fn alloc(&mut self, ty: ValType) -> u16 {
        let class = SizeClass::of(ty);
        if let Some(offset) = self.free_list(class).pop() {
            return offset;
        }
        let size = class.bytes();
        let offset = align_up(self.cursor, size);
        self.cursor = offset + size;
        self.high = self.high.max(self.cursor);
        u16::try_from(offset).unwrap_or_else(|_| panic!("operand region exceeds 64 KiB frame"))
    }

    /// Returns a slot of `ty` to its free list.
    fn free(&mut self, ty: ValType, offset: u16) {
        let class = SizeClass::of(ty);
        self.free_list(class).push(offset);
    }

    /// Captures the allocator state at a block boundary.
    fn snapshot(&self) -> AllocSnapshot {
        self.clone()
    }

    /// Restores a snapshot, keeping the function-wide high watermark.
    fn restore(&mut self, snapshot: AllocSnapshot) {
        let high = self.high.max(snapshot.high);
        *self = snapshot;
        self.high = high;
    }
}

/// A value of the compile-time operand stack.
#[derive(Debug, Copy, Clone)]
struct StackValue {
    /// The value type.
    ty: ValType,
    /// The operand slot holding the value.
    offset: u16,
    /// Pinned slots belong to an open control frame (block parameters and
    /// loop headers) and return to the allocator only when the frame is
    /// closed.
    pinned: bool,
}

/// An unresolved forward branch target.
#[derive(Debug, Default)]
struct LabelEntry {
    /// The resolved bytecode position, once known.
    resolved: Option<OpPos>,
    /// Branching instructions waiting for the resolution.
    users: Vec<LabelUser>,
}

/// One pending use of a label.
#[derive(Debug)]
enum LabelUser {
    /// The jump-family instruction at the position.
    Jump(OpPos),
    /// The `index`-th target of the `br_table` at the position.
    BrTable(OpPos, usize),
}

/// Identifier of a branch label.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct LabelId(usize);

/// The kind of an open control frame.
#[derive(Debug)]
enum FrameKind {
    /// A `block` or the implicit function body block.
    Block,
    /// A `loop`; branches jump back to `head`.
    Loop {
        /// The position of the first loop body instruction.
        head: OpPos,
    },
    /// An `if`, before or after its `else`.
    If {
        /// The label of the else arm (or the end when no else exists).
        else_label: LabelId,
        /// Set once the `else` keyword was seen.
        seen_else: bool,
    },
    /// A legacy `try` or a `try_table`.
    Try {
        /// The try region in the side table.
        block: TryBlockIdx,
        /// The hidden slot every catch arm captures the exception into.
        exn_slot: u16,
        /// Set while translating one of the legacy catch arms.
        in_catch: bool,
        /// The deferred `try_table` handlers, emitted as stubs at the end.
        pending: Vec<PendingCatch>,
    },
}

/// A `try_table` catch clause awaiting its handler stub.
#[derive(Debug)]
struct PendingCatch {
    /// The matched tag or the catch-all sentinel.
    tag: CatchTag,
    /// The branch target depth of the handler.
    depth: u32,
    /// The slots the unwinder writes the payload to.
    payload: Vec<(ValType, u16)>,
    /// Whether the handler additionally receives the exception reference.
    is_ref: bool,
}

/// An open structured control frame.
#[derive(Debug)]
struct ControlFrame {
    kind: FrameKind,
    /// The label branches to this frame resolve to (the loop head handles
    /// `loop` frames instead).
    end_label: LabelId,
    /// The pinned parameter slots.
    params: Vec<(ValType, u16)>,
    /// The pinned result slots.
    results: Vec<(ValType, u16)>,
    /// The operand stack height below the frame's values.
    stack_height: usize,
    /// The allocator state to restore when the frame closes.
    snapshot: AllocSnapshot,
}

impl ControlFrame {
    /// The values a branch to this frame carries.
    fn branch_slots(&self) -> &[(ValType, u16)] {
        match self.kind {
            FrameKind::Loop { .. } => &self.params,
            _ => &self.results,
        }
    }
}

/// Translates one function body.
pub(crate) struct FuncTranslator<'a> {
    view: ModuleView<'a>,
    /// The canonical type of the translated function.
    ty: CompTypeId,
    /// The resolved signature of the translated function.
    func_type: FuncType,
    /// The emitted bytecode.
    code: CodeBuf,
    /// Types and frame offsets of parameters and declared locals.
    locals: Vec<(ValType, u16)>,
    /// The byte size of the parameter region.
    params_size: u32,
    /// One past the last local byte; zero-initialised on entry.
    locals_end: u32,
    /// The operand slot allocator.
    alloc: SlotAlloc,
    /// The compile-time operand stack.
    stack: Vec<StackValue>,
    /// The open control frames, outermost first.
    frames: Vec<ControlFrame>,
    /// All labels of the function.
    labels: Vec<LabelEntry>,
    /// The emitted try regions.
    try_table: TryTable,
    /// The stack of currently open try regions.
    open_tries: Vec<TryBlockIdx>,
    /// Registered trap points inside try regions.
    trap_points: TrapPointTable,
    /// Whether the current code position is reachable.
    reachable: bool,
}

impl<'a> FuncTranslator<'a> {
    /// Creates a translator for a function of type `ty`.
    pub fn new(ty: CompTypeId, view: &ModuleView<'a>) -> Self {
        let func_type = view.engine.resolve_func_type(ty);
        Self {
            view: *view,
            ty,
            func_type,
            code: CodeBuf::new(),
            locals: Vec::new(),
            params_size: 0,
            locals_end: 0,
            alloc: SlotAlloc::new(0),
            stack: Vec::new(),
            frames: Vec::new(),
            labels: Vec::new(),
            try_table: TryTable::new(),
            open_tries: Vec::new(),
            trap_points: TrapPointTable::new(),
            reachable: true,
        }
    }

    /// Translates the function body into a [`CompiledFuncEntity`].
    ///
    /// # Errors
    ///
    /// If the frame layout exceeds the addressable 64 KiB.
    pub fn translate(
        mut self,
        body: wasmparser::FunctionBody,
    ) -> Result<CompiledFuncEntity, ModuleError> {
        self.layout_frame(&body)?;
        self.push_function_frame();
        let mut reader = body.get_operators_reader()?;
        while !reader.eof() {
            let op = reader.read()?;
            self.visit_operator(op)?;
        }
        self.finish()
    }

    /// Computes the frame layout: parameters, locals, operand region base.
    fn layout_frame(&mut self, body: &wasmparser::FunctionBody) -> Result<(), ModuleError> {
        let params: Vec<ValType> = self.func_type.params().to_vec();
        let offsets = packed_offsets(&params);
        let mut cursor = 0_u32;
        for (ty, offset) in params.iter().zip(offsets) {
            self.locals.push((*ty, to_offset(offset)?));
            cursor = offset + u32::from(ty.frame_size());
        }
        self.params_size = align_up(cursor, 8);
        cursor = self.params_size;
        let mut locals_reader = body.get_locals_reader()?;
        for _ in 0..locals_reader.get_count() {
            let (count, ty) = locals_reader.read()?;
            let ty = self.convert_val_type(&ty);
            for _ in 0..count {
                let size = u32::from(ty.frame_size());
                cursor = align_up(cursor, size);
                self.locals.push((ty, to_offset(cursor)?));
                cursor += size;
            }
        }
        self.locals_end = cursor;
        self.alloc = SlotAlloc::new(align_up(cursor, 16));
        Ok(())
    }

    /// Opens the implicit function body frame.
    fn push_function_frame(&mut self) {
        let results: Vec<(ValType, u16)> = self
            .func_type
            .results()
            .to_vec()
            .into_iter()
            .map(|ty| (ty, self.alloc.alloc(ty)))
            .collect();
        let end_label = self.new_label();
        let snapshot = self.alloc.snapshot();
        self.frames.push(ControlFrame {
            kind: FrameKind::Block,
            end_label,
            params: Vec::new(),
            results,
            stack_height: 0,
            snapshot,
        });
    }

    /// Finishes translation after the outermost `end`.
    fn finish(self) -> Result<CompiledFuncEntity, ModuleError> {
        debug_assert!(self.frames.is_empty(), "unbalanced control frames");
        let frame_size = align_up(self.alloc.high, 16);
        if frame_size > u32::from(u16::MAX) {
            return Err(ModuleError::FrameTooLarge);
        }
        Ok(CompiledFuncEntity {
            ty: self.ty,
            code: self.code,
            frame_size,
            params_size: self.params_size,
            locals_end: self.locals_end,
            try_table: self.try_table,
            trap_points: self.trap_points,
        })
    }

    // === emission helpers ===

    /// Emits `op`.
    fn emit(&mut self, op: Op) -> OpPos {
        self.code.push(&op)
    }

    /// Emits a potentially trapping `op`, registering it as a trap point
    /// when it lies inside an open try region.
    fn emit_trapping(&mut self, op: Op) -> OpPos {
        let pos = self.code.push(&op);
        if !self.open_tries.is_empty() {
            self.trap_points.register(pos);
        }
        pos
    }

    /// Emits a width-selected move between frame offsets.
    fn emit_move(&mut self, ty: ValType, src: u16, dst: u16) {
        if src == dst {
            return;
        }
        let src = StackOffset(src);
        let result = StackOffset(dst);
        let op = match ty.frame_size() {
            4 => Op::Move32 { src, result },
            8 => Op::Move64 { src, result },
            16 => Op::Move128 { src, result },
            size => unreachable!("invalid frame size: {size}"),
        };
        self.emit(op);
    }

    // === label management ===

    fn new_label(&mut self) -> LabelId {
        let id = LabelId(self.labels.len());
        self.labels.push(LabelEntry::default());
        id
    }

    /// Emits a jump-family instruction targeting `label`, patching it
    /// immediately for already-resolved (backward) labels.
    fn emit_jump_to(&mut self, op: Op, label: LabelId) {
        let pos = self.emit(op);
        match self.labels[label.0].resolved {
            Some(target) => self.code.patch_jump(pos, target),
            None => self.labels[label.0].users.push(LabelUser::Jump(pos)),
        }
    }

    /// Records the `index`-th target of the `br_table` at `pos`.
    fn use_label_for_br_table(&mut self, label: LabelId, pos: OpPos, index: usize) {
        match self.labels[label.0].resolved {
            Some(target) => self.code.patch_br_table_target(pos, index, target),
            None => self.labels[label.0]
                .users
                .push(LabelUser::BrTable(pos, index)),
        }
    }

    /// Resolves `label` to the next emitted position, patching all users.
    fn resolve_label(&mut self, label: LabelId) {
        let target = self.code.next_pos();
        let entry = &mut self.labels[label.0];
        debug_assert!(entry.resolved.is_none(), "label resolved twice");
        entry.resolved = Some(target);
        let users = core::mem::take(&mut entry.users);
        for user in users {
            match user {
                LabelUser::Jump(pos) => self.code.patch_jump(pos, target),
                LabelUser::BrTable(pos, index) => {
                    self.code.patch_br_table_target(pos, index, target)
                }
            }
        }
    }

    // === stack management ===

    /// Pushes a new owned value of type `ty`, returning its slot.
    fn push_value(&mut self, ty: ValType) -> u16 {
        let offset = self.alloc.alloc(ty);
        self.stack.push(StackValue {
            ty,
            offset,
            pinned: false,
        });
        offset
    }

    /// Pushes an existing pinned slot as a value.
    fn push_pinned(&mut self, ty: ValType, offset: u16) {
        self.stack.push(StackValue {
            ty,
            offset,
            pinned: true,
        });
    }

    /// Pops a value, returning its slot to the allocator unless pinned.
    fn pop_value(&mut self) -> StackValue {
        let value = self
            .stack
            .pop()
            .unwrap_or_else(|| panic!("operand stack underflow in validated code"));
        if !value.pinned {
            self.alloc.free(value.ty, value.offset);
        }
        value
    }

    /// Pops two values: `(lhs, rhs)`.
    fn pop2(&mut self) -> (StackValue, StackValue) {
        let rhs = self.pop_value();
        let lhs = self.pop_value();
        (lhs, rhs)
    }

    /// Pops three values: `(fst, snd, trd)`.
    fn pop3(&mut self) -> (StackValue, StackValue, StackValue) {
        let trd = self.pop_value();
        let snd = self.pop_value();
        let fst = self.pop_value();
        (fst, snd, trd)
    }

    /// Truncates the stack to `height`, releasing unpinned slots.
    fn truncate_stack(&mut self, height: usize) {
        while self.stack.len() > height {
            self.pop_value();
        }
    }

    // === control frame helpers ===

    /// Returns the block type's parameter and result types.
    fn block_type(&self, ty: wasmparser::BlockType) -> (Vec<ValType>, Vec<ValType>) {
        match ty {
            wasmparser::BlockType::Empty => (Vec::new(), Vec::new()),
            wasmparser::BlockType::Type(ty) => (Vec::new(), vec![self.convert_val_type(&ty)]),
            wasmparser::BlockType::FuncType(index) => {
                let id = self.view.types[index as usize];
                let func_type = self.view.engine.resolve_func_type(id);
                (func_type.params().to_vec(), func_type.results().to_vec())
            }
        }
    }

    /// Opens a control frame, materialising block parameters into pinned
    /// slots and reserving pinned result slots.
    fn open_frame(
        &mut self,
        kind_of: impl FnOnce(&mut Self) -> FrameKind,
        params: Vec<ValType>,
        results: Vec<ValType>,
    ) {
        let mut param_slots = Vec::with_capacity(params.len());
        if self.reachable {
            // move the entering values into the fixed parameter slots
            let values: Vec<StackValue> = params.iter().map(|_| self.pop_value()).collect();
            for (ty, value) in params.iter().zip(values.into_iter().rev()) {
                let slot = self.alloc.alloc(*ty);
                self.emit_move(*ty, value.offset, slot);
                param_slots.push((*ty, slot));
            }
        } else {
            self.truncate_stack(self.stack.len().saturating_sub(params.len()));
            for ty in &params {
                let slot = self.alloc.alloc(*ty);
                param_slots.push((*ty, slot));
            }
        }
        let result_slots: Vec<(ValType, u16)> = results
            .into_iter()
            .map(|ty| (ty, self.alloc.alloc(ty)))
            .collect();
        let stack_height = self.stack.len();
        // the frame kind may allocate long-lived slots (the hidden
        // exception slot of try regions), so the snapshot comes after
        let kind = kind_of(self);
        let snapshot = self.alloc.snapshot();
        let end_label = self.new_label();
        self.frames.push(ControlFrame {
            kind,
            end_label,
            params: param_slots,
            results: result_slots,
            stack_height,
            snapshot,
        });
        let params = self.frames.last().expect("frame was just pushed").params.clone();
        for (ty, slot) in params {
            self.push_pinned(ty, slot);
        }
    }

    /// Copies the branch-carried values of a `br` to the target frame's
    /// slots without consuming them.
    fn copy_branch_values(&mut self, depth: u32) {
        let frame_idx = self.frames.len() - 1 - depth as usize;
        let slots = self.frames[frame_idx].branch_slots().to_vec();
        let top = self.stack.len();
        for (i, (ty, slot)) in slots.iter().enumerate() {
            let value = self.stack[top - slots.len() + i];
            debug_assert_eq!(value.ty.frame_size(), ty.frame_size());
            self.emit_move(*ty, value.offset, *slot);
        }
    }

    /// Returns the branch label of the frame at `depth`: the loop head
    /// for loops, the end label otherwise.
    fn branch_label(&mut self, depth: u32) -> LabelId {
        let frame_idx = self.frames.len() - 1 - depth as usize;
        match self.frames[frame_idx].kind {
            FrameKind::Loop { head } => {
                // loops resolve immediately; synthesise a resolved label
                let label = self.new_label();
                self.labels[label.0].resolved = Some(head);
                label
            }
            _ => self.frames[frame_idx].end_label,
        }
    }

    /// Emits the copies and jump of an unconditional branch to `depth`.
    fn emit_branch(&mut self, depth: u32) {
        self.copy_branch_values(depth);
        let label = self.branch_label(depth);
        self.emit_jump_to(
            Op::Jump {
                delta: JumpDelta(0),
            },
            label,
        );
    }

    /// Closes the innermost frame at its `end`.
    fn close_frame(&mut self) -> Result<(), ModuleError> {
        // fall-through: move the remaining values into the result slots
        if self.reachable {
            let results = self
                .frames
                .last()
                .unwrap_or_else(|| panic!("no open frame at end"))
                .results
                .clone();
            let top = self.stack.len();
            for (i, (ty, slot)) in results.iter().enumerate() {
                let value = self.stack[top - results.len() + i];
                self.emit_move(*ty, value.offset, *slot);
            }
        }
        let frame = self
            .frames
            .pop()
            .unwrap_or_else(|| panic!("no open frame at end"));
        if let FrameKind::If {
            else_label,
            seen_else: false,
        } = frame.kind
        {
            // an `if` without `else`: synthesise the false arm, which
            // forwards the parameters as results
            if self.reachable {
                self.emit_jump_to(
                    Op::Jump {
                        delta: JumpDelta(0),
                    },
                    frame.end_label,
                );
            }
            self.resolve_label(else_label);
            let forwards: Vec<((ValType, u16), (ValType, u16))> = frame
                .params
                .iter()
                .copied()
                .zip(frame.results.iter().copied())
                .collect();
            for ((ty, param), (_, result)) in forwards {
                self.emit_move(ty, param, result);
            }
        }
        if let FrameKind::Try { block, .. } = &frame.kind {
            self.finish_try_region(*block);
        }
        self.truncate_stack(frame.stack_height);
        self.resolve_label(frame.end_label);
        self.alloc.restore(frame.snapshot);
        for (ty, slot) in &frame.params {
            self.alloc.free(*ty, *slot);
        }
        if self.frames.is_empty() {
            // the implicit function frame: emit the epilogue
            self.emit_function_epilogue(&frame.results);
        } else {
            for (ty, slot) in frame.results {
                self.stack.push(StackValue {
                    ty,
                    offset: slot,
                    pinned: false,
                });
            }
            self.reachable = true;
        }
        Ok(())
    }

    /// Emits the `End` epilogue copying results to the result region.
    fn emit_function_epilogue(&mut self, results: &[(ValType, u16)]) {
        let offsets = results
            .iter()
            .map(|(_, slot)| StackOffset(*slot))
            .collect();
        self.emit(Op::End { results: offsets });
    }

    /// Closes an open try region at the position of its first handler.
    fn mark_try_region_end(&mut self, block: TryBlockIdx) {
        let end = self.code.next_pos();
        let try_block = self.try_table.block_mut(block);
        if try_block.end == OpPos(u32::MAX) {
            try_block.end = end;
        }
    }

    /// Pops the try region from the open stack once fully translated.
    fn finish_try_region(&mut self, block: TryBlockIdx) {
        self.mark_try_region_end(block);
        let popped = self.open_tries.pop();
        debug_assert_eq!(popped, Some(block), "mismatched try region nesting");
    }

    /// Opens a try region in the side table.
    fn open_try_region(&mut self) -> TryBlockIdx {
        let parent = self.open_tries.last().copied().unwrap_or(TryBlockIdx::HOST);
        let begin = self.code.next_pos();
        let block = self.try_table.push(TryBlock {
            begin,
            end: OpPos(u32::MAX),
            parent,
            catches: Vec::new(),
        });
        self.open_tries.push(block);
        block
    }

    /// Appends a catch handler to a try region.
    fn push_catch(
        &mut self,
        block: TryBlockIdx,
        tag: CatchTag,
        handler: OpPos,
        payload: Vec<StackOffset>,
        captures_exnref: bool,
        exnref_slot: u16,
    ) {
        self.try_table.block_mut(block).catches.push(CatchBlock {
            tag,
            handler,
            payload: payload.into_iter().collect(),
            captures_exnref,
            exnref_slot,
        });
    }

    // === type conversion helpers ===

    /// Converts a wasmparser value type against the module's type list.
    pub(crate) fn convert_val_type(&self, ty: &wasmparser::ValType) -> ValType {
        convert_val_type(self.view.types, ty)
    }
}

/// Converts a wasmparser value type, resolving concrete heap indices
/// against the already-interned module type list.
pub(crate) fn convert_val_type(types: &[CompTypeId], ty: &wasmparser::ValType) -> ValType {
    match ty {
        wasmparser::ValType::I32 => ValType::I32,
        wasmparser::ValType::I64 => ValType::I64,
        wasmparser::ValType::F32 => ValType::F32,
        wasmparser::ValType::F64 => ValType::F64,
        wasmparser::ValType::V128 => ValType::V128,
        wasmparser::ValType::Ref(ty) => ValType::Ref(convert_ref_type(types, ty)),
    }
}

/// Converts a wasmparser reference type against interned module types.
pub(crate) fn convert_ref_type(types: &[CompTypeId], ty: &wasmparser::RefType) -> crate::types::RefType {
    crate::types::RefType {
        nullable: ty.is_nullable(),
        heap: convert_heap_type(types, &ty.heap_type()),
    }
}

/// Converts a wasmparser heap type against interned module types.
pub(crate) fn convert_heap_type(
    types: &[CompTypeId],
    ty: &wasmparser::HeapType,
) -> crate::types::HeapType {
    use crate::types::HeapType as H;
    match ty {
        wasmparser::HeapType::Concrete(index) => {
            let index = index
                .as_module_index()
                .unwrap_or_else(|| panic!("concrete heap type in unsupported canonical form"));
            H::Concrete(types[index as usize])
        }
        wasmparser::HeapType::Abstract { ty, .. } => {
            use wasmparser::AbstractHeapType;
            match ty {
                AbstractHeapType::Any => H::Any,
                AbstractHeapType::Eq => H::Eq,
                AbstractHeapType::I31 => H::I31,
                AbstractHeapType::Struct => H::Struct,
                AbstractHeapType::Array => H::Array,
                AbstractHeapType::None => H::None,
                AbstractHeapType::Func => H::Func,
                AbstractHeapType::NoFunc => H::NoFunc,
                AbstractHeapType::Extern => H::Extern,
                AbstractHeapType::NoExtern => H::NoExtern,
                AbstractHeapType::Exn => H::Exn,
                AbstractHeapType::NoExn => H::NoExn,
                unsupported => panic!("unsupported abstract heap type: {unsupported:?}"),
            }
        }
    }
}

/// Converts a `u32` frame offset into the `u16` operand encoding.
fn to_offset(offset: u32) -> Result<u16, ModuleError> {
    u16::try_from(offset).map_err(|_| ModuleError::FrameTooLarge)
}
