//! Module instantiation: import matching, entity creation, segment
//! application and the start function call.

use super::{DataKind, ElemKind, ExportKind, ImportKind, InitExpr, InitOp, Module};
use crate::{
    error::{Error, InstantiationError},
    external::{Extern, ExternVal},
    func::{FuncEntity, WasmFuncEntity},
    gc::{GcObject, RawRef, RefKind},
    global::GlobalEntity,
    instance::InstanceEntity,
    memory::MemoryEntity,
    segment::{DataSegmentEntity, ElemSegmentEntity},
    store::{Instance, Store},
    table::TableEntity,
    tag::TagEntity,
    types::{CompositeType, StorageType},
    value::{Ref, Value},
};
use rosmar_core::{F32, F64, V128};
use std::vec::Vec;

impl Store {
    /// Instantiates `module` with the positional `imports`.
    ///
    /// The imports must appear in the order the module declares them.
    ///
    /// # Errors
    ///
    /// - If an import is missing or does not satisfy its declared type.
    /// - If an active segment does not fit its target.
    /// - If the start function traps.
    pub fn instantiate(&mut self, module: &Module, imports: &[Extern]) -> Result<Instance, Error> {
        if imports.len() != module.len_imports() {
            return Err(Error::Instantiation(
                InstantiationError::ImportCountMismatch {
                    required: module.len_imports(),
                    provided: imports.len(),
                },
            ));
        }
        let engine = module.engine().clone();
        let instance_idx = self.inner.instances.alloc(InstanceEntity::default());
        let mut entity = InstanceEntity {
            types: module.types.clone(),
            ..InstanceEntity::default()
        };

        // bind imports in declaration order
        for (index, (import, provided)) in module.imports.iter().zip(imports).enumerate() {
            let mismatch = || {
                Error::Instantiation(InstantiationError::ImportTypeMismatch { index })
            };
            match (&import.kind, provided) {
                (ImportKind::Func(required), Extern::Func(func)) => {
                    let idx = self.inner.unwrap_stored(&func.0);
                    let actual = self.inner.funcs[idx].ty();
                    if !engine.is_concrete_subtype(actual, *required) {
                        return Err(mismatch());
                    }
                    entity.funcs.push(idx);
                }
                (ImportKind::Table(required), Extern::Table(table)) => {
                    let idx = self.inner.unwrap_stored(&table.0);
                    if !self.inner.tables[idx].ty().satisfies(required) {
                        return Err(mismatch());
                    }
                    entity.tables.push(idx);
                }
                (ImportKind::Memory(required), Extern::Memory(memory)) => {
                    let idx = self.inner.unwrap_stored(&memory.0);
                    if !self.inner.memories[idx].ty().satisfies(required) {
                        return Err(mismatch());
                    }
                    entity.memories.push(idx);
                }
                (ImportKind::Global(required), Extern::Global(global)) => {
                    let idx = self.inner.unwrap_stored(&global.0);
                    let actual = self.inner.globals[idx].ty();
                    if actual.content() != required.content()
                        || actual.is_mutable() != required.is_mutable()
                    {
                        return Err(mismatch());
                    }
                    entity.globals.push(idx);
                }
                (ImportKind::Tag(required), Extern::Tag(tag)) => {
                    let idx = self.inner.unwrap_stored(&tag.0);
                    if self.inner.tags[idx].ty() != *required {
                        return Err(mismatch());
                    }
                    entity.tags.push(idx);
                }
                _ => return Err(mismatch()),
            }
        }

        // internal functions
        for def in &module.funcs {
            let idx = self.inner.funcs.alloc(FuncEntity::Wasm(WasmFuncEntity {
                ty: def.ty,
                func: def.body,
                instance: instance_idx,
            }));
            entity.funcs.push(idx);
        }
        // internal tables; their element initialisers may reference
        // imported globals and the function index space
        for def in &module.tables {
            let init = match &def.init {
                None => RawRef::NULL,
                Some(expr) => match self.eval_init(&entity, module, expr)? {
                    Value::Ref(reference) => reference.raw,
                    value => unreachable!("table initialiser evaluated to {value:?}"),
                },
            };
            let idx = self.inner.tables.alloc(TableEntity::new(def.ty, init));
            entity.tables.push(idx);
        }
        // internal memories
        for ty in &module.memories {
            let idx = self
                .inner
                .memories
                .alloc(MemoryEntity::new(*ty).map_err(Error::Memory)?);
            entity.memories.push(idx);
        }
        // internal tags
        for ty in &module.tags {
            let idx = self.inner.tags.alloc(TagEntity::new(*ty));
            entity.tags.push(idx);
        }
        // internal globals
        for def in &module.globals {
            let value = self.eval_init(&entity, module, &def.init)?;
            let idx = self.inner.globals.alloc(GlobalEntity::new(def.ty, value));
            entity.globals.push(idx);
        }

        // element segments: evaluate items now, apply active ones
        for def in &module.elems {
            let items: Vec<RawRef> = def
                .items
                .iter()
                .map(|expr| {
                    Ok(match self.eval_init(&entity, module, expr)? {
                        Value::Ref(reference) => reference.raw,
                        value => unreachable!("element item evaluated to {value:?}"),
                    })
                })
                .collect::<Result<_, Error>>()?;
            let idx = match &def.kind {
                ElemKind::Active { table, offset } => {
                    let offset = match self.eval_init(&entity, module, offset)? {
                        Value::I32(offset) => offset as u32 as u64,
                        Value::I64(offset) => offset as u64,
                        value => unreachable!("segment offset evaluated to {value:?}"),
                    };
                    let table = entity.tables[*table as usize];
                    self.inner.tables[table]
                        .init(&items, offset, 0, items.len() as u64)
                        .map_err(|_| {
                            Error::Instantiation(InstantiationError::OutOfBoundsSegment)
                        })?;
                    self.inner.elems.alloc(ElemSegmentEntity::empty())
                }
                ElemKind::Passive => self
                    .inner
                    .elems
                    .alloc(ElemSegmentEntity::new(items.into_boxed_slice())),
                ElemKind::Declared => self.inner.elems.alloc(ElemSegmentEntity::empty()),
            };
            entity.elem_segments.push(idx);
        }

        // data segments
        for def in &module.datas {
            let idx = match &def.kind {
                DataKind::Active { memory, offset } => {
                    let offset = match self.eval_init(&entity, module, offset)? {
                        Value::I32(offset) => offset as u32 as u64,
                        Value::I64(offset) => offset as u64,
                        value => unreachable!("segment offset evaluated to {value:?}"),
                    };
                    let memory = entity.memories[*memory as usize];
                    let mem = &mut self.inner.memories[memory];
                    mem.effective_address(offset, 0, def.bytes.len() as u64)
                        .map_err(|_| {
                            Error::Instantiation(InstantiationError::OutOfBoundsSegment)
                        })?;
                    mem.write(offset as usize, &def.bytes)
                        .map_err(|_| {
                            Error::Instantiation(InstantiationError::OutOfBoundsSegment)
                        })?;
                    self.inner.datas.alloc(DataSegmentEntity::empty())
                }
                DataKind::Passive => self
                    .inner
                    .datas
                    .alloc(DataSegmentEntity::new(def.bytes.clone())),
            };
            entity.data_segments.push(idx);
        }

        // exports
        for (name, kind) in module.exports.iter() {
            let external = match kind {
                ExportKind::Func(index) => ExternVal::Func(entity.funcs[*index as usize]),
                ExportKind::Table(index) => ExternVal::Table(entity.tables[*index as usize]),
                ExportKind::Memory(index) => ExternVal::Memory(entity.memories[*index as usize]),
                ExportKind::Global(index) => ExternVal::Global(entity.globals[*index as usize]),
                ExportKind::Tag(index) => ExternVal::Tag(entity.tags[*index as usize]),
            };
            entity.exports.insert(name.clone(), external);
        }

        let start = module.start.map(|index| entity.funcs[index as usize]);
        self.inner.instances[instance_idx] = entity;
        if let Some(start) = start {
            crate::executor::call_func(&mut self.inner, start, &[]).map_err(|error| {
                match error {
                    Error::Trap(trap) => {
                        Error::Instantiation(InstantiationError::StartTrapped(trap))
                    }
                    other => other,
                }
            })?;
        }
        Ok(Instance(self.inner.stored(instance_idx)))
    }

    /// Evaluates a constant initialiser expression.
    fn eval_init(
        &mut self,
        entity: &InstanceEntity,
        module: &Module,
        expr: &InitExpr,
    ) -> Result<Value, Error> {
        let engine = module.engine().clone();
        let mut stack: Vec<Value> = Vec::with_capacity(2);
        for op in expr.ops() {
            match op {
                InitOp::I32Const(value) => stack.push(Value::I32(*value)),
                InitOp::I64Const(value) => stack.push(Value::I64(*value)),
                InitOp::F32Const(bits) => stack.push(Value::F32(F32::from_bits(*bits))),
                InitOp::F64Const(bits) => stack.push(Value::F64(F64::from_bits(*bits))),
                InitOp::V128Const(bits) => stack.push(Value::V128(V128::from_u128(*bits))),
                InitOp::GlobalGet(index) => {
                    let idx = entity.globals[*index as usize];
                    stack.push(self.inner.globals[idx].get());
                }
                InitOp::RefNull => stack.push(Value::Ref(Ref::null())),
                InitOp::RefFunc(index) => {
                    let idx = entity.funcs[*index as usize];
                    stack.push(Value::Ref(Ref::from_raw(RawRef::func(idx))));
                }
                InitOp::RefI31 => {
                    let value = pop_i32(&mut stack);
                    stack.push(Value::Ref(Ref::i31(value)));
                }
                InitOp::I32Add => {
                    let (rhs, lhs) = (pop_i32(&mut stack), pop_i32(&mut stack));
                    stack.push(Value::I32(lhs.wrapping_add(rhs)));
                }
                InitOp::I32Sub => {
                    let (rhs, lhs) = (pop_i32(&mut stack), pop_i32(&mut stack));
                    stack.push(Value::I32(lhs.wrapping_sub(rhs)));
                }
                InitOp::I32Mul => {
                    let (rhs, lhs) = (pop_i32(&mut stack), pop_i32(&mut stack));
                    stack.push(Value::I32(lhs.wrapping_mul(rhs)));
                }
                InitOp::I64Add => {
                    let (rhs, lhs) = (pop_i64(&mut stack), pop_i64(&mut stack));
                    stack.push(Value::I64(lhs.wrapping_add(rhs)));
                }
                InitOp::I64Sub => {
                    let (rhs, lhs) = (pop_i64(&mut stack), pop_i64(&mut stack));
                    stack.push(Value::I64(lhs.wrapping_sub(rhs)));
                }
                InitOp::I64Mul => {
                    let (rhs, lhs) = (pop_i64(&mut stack), pop_i64(&mut stack));
                    stack.push(Value::I64(lhs.wrapping_mul(rhs)));
                }
                InitOp::StructNew(type_index) | InitOp::StructNewDefault(type_index) => {
                    let id = entity.types[*type_index as usize];
                    let strukt = engine.with_registry(|registry| {
                        match registry.composite(id) {
                            CompositeType::Struct(ty) => ty.clone(),
                            ty => unreachable!("struct.new on non-struct type: {ty:?}"),
                        }
                    });
                    let mut data = vec![0x00_u8; strukt.size as usize];
                    if matches!(op, InitOp::StructNew(_)) {
                        for (field, at) in strukt
                            .fields
                            .iter()
                            .zip(strukt.field_offsets.iter())
                            .rev()
                        {
                            let value = stack.pop().expect("validated constant expression");
                            pack_value(&mut data, *at as usize, field.storage, &value);
                        }
                    }
                    let idx = self.inner.gc.alloc(GcObject::Struct {
                        ty: id,
                        data: data.into_boxed_slice(),
                    });
                    stack.push(Value::Ref(Ref::from_raw(RawRef::heap(
                        RefKind::Struct,
                        idx,
                    ))));
                }
                InitOp::ArrayNewFixed(type_index, size) => {
                    let id = entity.types[*type_index as usize];
                    let elem = engine.with_registry(|registry| {
                        match registry.composite(id) {
                            CompositeType::Array(ty) => ty.elem,
                            ty => unreachable!("array.new on non-array type: {ty:?}"),
                        }
                    });
                    let elem_size = elem.storage.byte_size() as usize;
                    let mut data = vec![0x00_u8; elem_size * *size as usize];
                    for i in (0..*size as usize).rev() {
                        let value = stack.pop().expect("validated constant expression");
                        pack_value(&mut data, i * elem_size, elem.storage, &value);
                    }
                    let idx = self.inner.gc.alloc(GcObject::Array {
                        ty: id,
                        elem_size: elem_size as u32,
                        len: *size,
                        data: data.into_boxed_slice(),
                    });
                    stack.push(Value::Ref(Ref::from_raw(RawRef::heap(RefKind::Array, idx))));
                }
                InitOp::ArrayNewDefault(type_index) => {
                    let id = entity.types[*type_index as usize];
                    let elem = engine.with_registry(|registry| {
                        match registry.composite(id) {
                            CompositeType::Array(ty) => ty.elem,
                            ty => unreachable!("array.new on non-array type: {ty:?}"),
                        }
                    });
                    let elem_size = elem.storage.byte_size() as usize;
                    let len = pop_i32(&mut stack) as u32;
                    let idx = self.inner.gc.alloc(GcObject::Array {
                        ty: id,
                        elem_size: elem_size as u32,
                        len,
                        data: vec![0x00_u8; elem_size * len as usize].into_boxed_slice(),
                    });
                    stack.push(Value::Ref(Ref::from_raw(RawRef::heap(RefKind::Array, idx))));
                }
            }
        }
        Ok(stack.pop().expect("validated constant expression"))
    }
}

fn pop_i32(stack: &mut Vec<Value>) -> i32 {
    match stack.pop() {
        Some(Value::I32(value)) => value,
        value => unreachable!("expected i32 constant operand, found {value:?}"),
    }
}

fn pop_i64(stack: &mut Vec<Value>) -> i64 {
    match stack.pop() {
        Some(Value::I64(value)) => value,
        value => unreachable!("expected i64 constant operand, found {value:?}"),
    }
}

/// Packs a constant value into object payload bytes.
fn pack_value(data: &mut [u8], at: usize, storage: StorageType, value: &Value) {
    match storage {
        StorageType::I8 => {
            let Value::I32(value) = value else {
                unreachable!("packed field initialised with {value:?}");
            };
            data[at] = *value as u8;
        }
        StorageType::I16 => {
            let Value::I32(value) = value else {
                unreachable!("packed field initialised with {value:?}");
            };
            data[at..at + 2].copy_from_slice(&(*value as u16).to_le_bytes());
        }
        StorageType::Val(ty) => {
            let size = usize::from(ty.frame_size());
            value.write_to(&mut data[at..at + size]);
        }
    }
}
