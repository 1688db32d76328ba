//! Parsing and validation of binary modules into the [`Module`] contract.

use super::{
    parse_const_expr,
    DataDef,
    DataKind,
    ElemDef,
    ElemKind,
    ExportKind,
    FuncDef,
    GlobalDef,
    Import,
    ImportKind,
    Module,
    ModuleError,
    TableDef,
};
use crate::{
    engine::{translator::{FuncTranslator, ModuleView}, Engine},
    global::GlobalType,
    memory::MemoryType,
    table::TableType,
    types::{
        ArrayType,
        CompTypeId,
        CompositeType,
        FieldType,
        FuncType,
        HeapType,
        RefType,
        StorageType,
        StructType,
        SubType,
        ValType,
    },
};
use std::{boxed::Box, collections::BTreeMap, vec::Vec};
use wasmparser::{Parser, Payload, ValidPayload, Validator};

/// Parses, validates and translates the binary `bytes` for `engine`.
pub fn parse(engine: &Engine, bytes: &[u8]) -> Result<Module, ModuleError> {
    let mut validator = Validator::new_with_features(engine.config().wasm_features());
    let mut builder = ModuleParser::new(engine.clone());
    let mut bodies = Vec::new();
    for payload in Parser::new(0).parse_all(bytes) {
        let payload = payload?;
        if let ValidPayload::Func(func, body) = validator.payload(&payload)? {
            bodies.push((func, body));
        }
        builder.process(payload)?;
    }
    for (func, body) in bodies {
        let mut func_validator = func.into_validator(Default::default());
        func_validator.validate(&body)?;
        builder.translate_body(body)?;
    }
    Ok(builder.finish())
}

/// Incremental builder of the [`Module`] contract.
struct ModuleParser {
    engine: Engine,
    types: Vec<CompTypeId>,
    imports: Vec<Import>,
    func_types: Vec<CompTypeId>,
    funcs: Vec<FuncDef>,
    tables: Vec<TableDef>,
    memories: Vec<MemoryType>,
    globals: Vec<GlobalDef>,
    tags: Vec<CompTypeId>,
    exports: BTreeMap<Box<str>, ExportKind>,
    start: Option<u32>,
    elems: Vec<ElemDef>,
    datas: Vec<DataDef>,
    /// Combined (imported and internal) index spaces for translation.
    all_table_types: Vec<TableType>,
    all_memory_types: Vec<MemoryType>,
    all_global_types: Vec<GlobalType>,
    all_tag_types: Vec<CompTypeId>,
    /// The number of translated bodies so far.
    translated: usize,
}

impl ModuleParser {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            types: Vec::new(),
            imports: Vec::new(),
            func_types: Vec::new(),
            funcs: Vec::new(),
            tables: Vec::new(),
            memories: Vec::new(),
            globals: Vec::new(),
            tags: Vec::new(),
            exports: BTreeMap::new(),
            start: None,
            elems: Vec::new(),
            datas: Vec::new(),
            all_table_types: Vec::new(),
            all_memory_types: Vec::new(),
            all_global_types: Vec::new(),
            all_tag_types: Vec::new(),
            translated: 0,
        }
    }

    fn process(&mut self, payload: Payload) -> Result<(), ModuleError> {
        match payload {
            Payload::TypeSection(section) => {
                for group in section {
                    self.intern_group(group?)?;
                }
            }
            Payload::ImportSection(section) => {
                for import in section {
                    self.process_import(import?)?;
                }
            }
            Payload::FunctionSection(section) => {
                for func in section {
                    let ty = self.types[func? as usize];
                    self.func_types.push(ty);
                }
            }
            Payload::TableSection(section) => {
                for table in section {
                    let table = table?;
                    let ty = self.convert_table_type(&table.ty);
                    let init = match table.init {
                        wasmparser::TableInit::RefNull => None,
                        wasmparser::TableInit::Expr(expr) => Some(parse_const_expr(&expr)?),
                    };
                    self.all_table_types.push(ty);
                    self.tables.push(TableDef { ty, init });
                }
            }
            Payload::MemorySection(section) => {
                for memory in section {
                    let ty = convert_memory_type(&memory?);
                    self.all_memory_types.push(ty);
                    self.memories.push(ty);
                }
            }
            Payload::TagSection(section) => {
                for tag in section {
                    let ty = self.types[tag?.func_type_idx as usize];
                    self.all_tag_types.push(ty);
                    self.tags.push(ty);
                }
            }
            Payload::GlobalSection(section) => {
                for global in section {
                    let global = global?;
                    let ty = self.convert_global_type(&global.ty);
                    let init = parse_const_expr(&global.init_expr)?;
                    self.all_global_types.push(ty);
                    self.globals.push(GlobalDef { ty, init });
                }
            }
            Payload::ExportSection(section) => {
                for export in section {
                    let export = export?;
                    let kind = match export.kind {
                        wasmparser::ExternalKind::Func => ExportKind::Func(export.index),
                        wasmparser::ExternalKind::Table => ExportKind::Table(export.index),
                        wasmparser::ExternalKind::Memory => ExportKind::Memory(export.index),
                        wasmparser::ExternalKind::Global => ExportKind::Global(export.index),
                        wasmparser::ExternalKind::Tag => ExportKind::Tag(export.index),
                    };
                    self.exports.insert(export.name.into(), kind);
                }
            }
            Payload::StartSection { func, .. } => {
                self.start = Some(func);
            }
            Payload::ElementSection(section) => {
                for elem in section {
                    self.process_element(elem?)?;
                }
            }
            Payload::DataSection(section) => {
                for data in section {
                    self.process_data(data?)?;
                }
            }
            // version header, code entries, custom sections and the like
            // are either handled by the validator or of no interest here
            _ => {}
        }
        Ok(())
    }

    /// Interns one recursive type group into the engine registry.
    fn intern_group(&mut self, group: wasmparser::RecGroup) -> Result<(), ModuleError> {
        let group_start = self.types.len() as u32;
        let mut pre_types = Vec::new();
        for sub in group.into_types() {
            let supertype = sub.supertype_idx.map(|idx| {
                let index = idx.as_module_index().unwrap_or_else(|| {
                    panic!("supertype index in unsupported canonical form")
                });
                self.type_id_for(index, group_start)
            });
            let composite = self.convert_composite(&sub.composite_type, group_start);
            pre_types.push(SubType {
                is_final: sub.is_final,
                supertype,
                composite,
            });
        }
        let ids = self.engine.intern_rec_group(pre_types);
        self.types.extend(ids);
        Ok(())
    }

    /// Resolves a module type index to its canonical identity, treating
    /// indices at or beyond `group_start` as references into the group
    /// that is currently being interned.
    fn type_id_for(&self, index: u32, group_start: u32) -> CompTypeId {
        if index >= group_start {
            return CompTypeId::local(index - group_start);
        }
        self.types[index as usize]
    }

    fn convert_composite(
        &self,
        ty: &wasmparser::CompositeType,
        group_start: u32,
    ) -> CompositeType {
        match &ty.inner {
            wasmparser::CompositeInnerType::Func(func) => {
                let params = func
                    .params()
                    .iter()
                    .map(|ty| self.convert_val_type(ty, group_start));
                let results = func
                    .results()
                    .iter()
                    .map(|ty| self.convert_val_type(ty, group_start));
                CompositeType::Func(FuncType::new(
                    params.collect::<Vec<_>>(),
                    results.collect::<Vec<_>>(),
                ))
            }
            wasmparser::CompositeInnerType::Struct(strukt) => {
                let fields = strukt
                    .fields
                    .iter()
                    .map(|field| self.convert_field_type(field, group_start))
                    .collect();
                CompositeType::Struct(StructType::new(fields))
            }
            wasmparser::CompositeInnerType::Array(array) => {
                CompositeType::Array(ArrayType {
                    elem: self.convert_field_type(&array.0, group_start),
                })
            }
            unsupported => panic!("unsupported composite type: {unsupported:?}"),
        }
    }

    fn convert_field_type(&self, ty: &wasmparser::FieldType, group_start: u32) -> FieldType {
        let storage = match ty.element_type {
            wasmparser::StorageType::I8 => StorageType::I8,
            wasmparser::StorageType::I16 => StorageType::I16,
            wasmparser::StorageType::Val(ty) => {
                StorageType::Val(self.convert_val_type(&ty, group_start))
            }
        };
        FieldType {
            storage,
            mutable: ty.mutable,
        }
    }

    /// Converts a value type, resolving concrete heap type indices.
    pub(crate) fn convert_val_type(&self, ty: &wasmparser::ValType, group_start: u32) -> ValType {
        match ty {
            wasmparser::ValType::I32 => ValType::I32,
            wasmparser::ValType::I64 => ValType::I64,
            wasmparser::ValType::F32 => ValType::F32,
            wasmparser::ValType::F64 => ValType::F64,
            wasmparser::ValType::V128 => ValType::V128,
            wasmparser::ValType::Ref(ty) => ValType::Ref(self.convert_ref_type(ty, group_start)),
        }
    }

    fn convert_ref_type(&self, ty: &wasmparser::RefType, group_start: u32) -> RefType {
        RefType {
            nullable: ty.is_nullable(),
            heap: self.convert_heap_type(&ty.heap_type(), group_start),
        }
    }

    fn convert_heap_type(&self, ty: &wasmparser::HeapType, group_start: u32) -> HeapType {
        match ty {
            wasmparser::HeapType::Concrete(index) => {
                let index = index.as_module_index().unwrap_or_else(|| {
                    panic!("concrete heap type in unsupported canonical form")
                });
                HeapType::Concrete(self.type_id_for(index, group_start))
            }
            wasmparser::HeapType::Abstract { ty, .. } => {
                use wasmparser::AbstractHeapType;
                match ty {
                    AbstractHeapType::Any => HeapType::Any,
                    AbstractHeapType::Eq => HeapType::Eq,
                    AbstractHeapType::I31 => HeapType::I31,
                    AbstractHeapType::Struct => HeapType::Struct,
                    AbstractHeapType::Array => HeapType::Array,
                    AbstractHeapType::None => HeapType::None,
                    AbstractHeapType::Func => HeapType::Func,
                    AbstractHeapType::NoFunc => HeapType::NoFunc,
                    AbstractHeapType::Extern => HeapType::Extern,
                    AbstractHeapType::NoExtern => HeapType::NoExtern,
                    AbstractHeapType::Exn => HeapType::Exn,
                    AbstractHeapType::NoExn => HeapType::NoExn,
                    unsupported => panic!("unsupported abstract heap type: {unsupported:?}"),
                }
            }
        }
    }

    fn convert_table_type(&self, ty: &wasmparser::TableType) -> TableType {
        let element = self.convert_ref_type(&ty.element_type, u32::MAX);
        TableType::new(element, ty.initial, ty.maximum)
    }

    fn convert_global_type(&self, ty: &wasmparser::GlobalType) -> GlobalType {
        GlobalType::new(self.convert_val_type(&ty.content_type, u32::MAX), ty.mutable)
    }

    fn process_import(&mut self, import: wasmparser::Import) -> Result<(), ModuleError> {
        let kind = match import.ty {
            wasmparser::TypeRef::Func(index) => {
                let ty = self.types[index as usize];
                self.func_types.push(ty);
                ImportKind::Func(ty)
            }
            wasmparser::TypeRef::Table(ty) => {
                let ty = self.convert_table_type(&ty);
                self.all_table_types.push(ty);
                ImportKind::Table(ty)
            }
            wasmparser::TypeRef::Memory(ty) => {
                let ty = convert_memory_type(&ty);
                self.all_memory_types.push(ty);
                ImportKind::Memory(ty)
            }
            wasmparser::TypeRef::Global(ty) => {
                let ty = self.convert_global_type(&ty);
                self.all_global_types.push(ty);
                ImportKind::Global(ty)
            }
            wasmparser::TypeRef::Tag(ty) => {
                let id = self.types[ty.func_type_idx as usize];
                self.all_tag_types.push(id);
                ImportKind::Tag(id)
            }
        };
        self.imports.push(Import {
            module: import.module.into(),
            name: import.name.into(),
            kind,
        });
        Ok(())
    }

    fn process_element(&mut self, elem: wasmparser::Element) -> Result<(), ModuleError> {
        let kind = match elem.kind {
            wasmparser::ElementKind::Active {
                table_index,
                offset_expr,
            } => ElemKind::Active {
                table: table_index.unwrap_or(0),
                offset: parse_const_expr(&offset_expr)?,
            },
            wasmparser::ElementKind::Passive => ElemKind::Passive,
            wasmparser::ElementKind::Declared => ElemKind::Declared,
        };
        let items: Vec<super::InitExpr> = match elem.items {
            wasmparser::ElementItems::Functions(items) => items
                .into_iter()
                .map(|func| {
                    let func = func?;
                    Ok(super::InitExpr::new(vec![super::InitOp::RefFunc(func)]))
                })
                .collect::<Result<_, ModuleError>>()?,
            wasmparser::ElementItems::Expressions(_, items) => items
                .into_iter()
                .map(|expr| parse_const_expr(&expr?))
                .collect::<Result<_, ModuleError>>()?,
        };
        self.elems.push(ElemDef {
            kind,
            items: items.into_boxed_slice(),
        });
        Ok(())
    }

    fn process_data(&mut self, data: wasmparser::Data) -> Result<(), ModuleError> {
        let kind = match data.kind {
            wasmparser::DataKind::Active {
                memory_index,
                offset_expr,
            } => DataKind::Active {
                memory: memory_index,
                offset: parse_const_expr(&offset_expr)?,
            },
            wasmparser::DataKind::Passive => DataKind::Passive,
        };
        self.datas.push(DataDef {
            kind,
            bytes: data.data.into(),
        });
        Ok(())
    }

    /// Translates the next function body into bytecode.
    fn translate_body(&mut self, body: wasmparser::FunctionBody) -> Result<(), ModuleError> {
        let index = self.translated;
        self.translated += 1;
        let num_imported = self
            .imports
            .iter()
            .filter(|import| matches!(import.kind, ImportKind::Func(_)))
            .count();
        let ty = self.func_types[num_imported + index];
        let view = ModuleView {
            engine: &self.engine,
            types: &self.types,
            func_types: &self.func_types,
            globals: &self.all_global_types,
            memories: &self.all_memory_types,
            tables: &self.all_table_types,
            tags: &self.all_tag_types,
        };
        let entity = FuncTranslator::new(ty, &view).translate(body)?;
        let compiled = self.engine.alloc_compiled_func(entity);
        self.funcs.push(FuncDef { ty, body: compiled });
        Ok(())
    }

    fn finish(self) -> Module {
        Module {
            engine: self.engine,
            types: self.types.into_boxed_slice(),
            imports: self.imports.into_boxed_slice(),
            func_types: self.func_types,
            funcs: self.funcs,
            tables: self.tables,
            memories: self.memories,
            globals: self.globals,
            tags: self.tags,
            exports: self.exports,
            start: self.start,
            elems: self.elems,
            datas: self.datas,
        }
    }
}

/// Converts a wasmparser memory type.
fn convert_memory_type(ty: &wasmparser::MemoryType) -> MemoryType {
    let converted = if ty.memory64 {
        MemoryType::new64(ty.initial, ty.maximum)
    } else {
        MemoryType::new(ty.initial, ty.maximum)
    };
    converted.with_shared(ty.shared)
}
