//! Constant initialiser expressions of globals and segments.
//!
//! Expressions are stored as a small operator sequence and evaluated with
//! a value stack at instantiation time, when the importing instance and
//! the store are available.

use crate::module::ModuleError;
use std::{boxed::Box, vec::Vec};

/// One operator of a constant expression.
#[derive(Debug, Copy, Clone)]
pub enum InitOp {
    /// Pushes an `i32` constant.
    I32Const(i32),
    /// Pushes an `i64` constant.
    I64Const(i64),
    /// Pushes an `f32` constant as raw bits.
    F32Const(u32),
    /// Pushes an `f64` constant as raw bits.
    F64Const(u64),
    /// Pushes a `v128` constant.
    V128Const(u128),
    /// Pushes the value of an imported or earlier global.
    GlobalGet(u32),
    /// Pushes the null reference.
    RefNull,
    /// Pushes a reference to the function at the module index.
    RefFunc(u32),
    /// Boxes the popped `i32` into an `i31` reference.
    RefI31,
    /// Extended-const arithmetic.
    I32Add,
    I32Sub,
    I32Mul,
    I64Add,
    I64Sub,
    I64Mul,
    /// Allocates a struct of the module type index from the popped fields.
    StructNew(u32),
    /// Allocates a default-initialised struct of the module type index.
    StructNewDefault(u32),
    /// Allocates an array of the module type index from `n` popped elements.
    ArrayNewFixed(u32, u32),
    /// Allocates a default-initialised array; pops the length.
    ArrayNewDefault(u32),
}

/// A validated constant expression.
#[derive(Debug, Clone)]
pub struct InitExpr {
    ops: Box<[InitOp]>,
}

impl InitExpr {
    /// Creates an [`InitExpr`] from a parsed operator sequence.
    pub fn new(ops: Vec<InitOp>) -> Self {
        Self {
            ops: ops.into_boxed_slice(),
        }
    }

    /// Creates a constant `i32` expression.
    pub fn i32(value: i32) -> Self {
        Self::new(vec![InitOp::I32Const(value)])
    }

    /// Returns the operator sequence.
    pub fn ops(&self) -> &[InitOp] {
        &self.ops
    }

    /// Returns the referenced function index for plain `ref.func`
    /// expressions, used to collect declared functions.
    pub fn as_ref_func(&self) -> Option<u32> {
        if let [InitOp::RefFunc(index)] = &self.ops[..] {
            return Some(*index);
        }
        None
    }
}

/// Parses a wasmparser constant expression into an [`InitExpr`].
///
/// # Errors
///
/// On operators outside the constant expression grammar the validator
/// accepts for the enabled features.
pub fn parse_const_expr(expr: &wasmparser::ConstExpr) -> Result<InitExpr, ModuleError> {
    use wasmparser::Operator;
    let mut ops = Vec::new();
    let mut reader = expr.get_operators_reader();
    loop {
        let op = reader.read()?;
        let parsed = match op {
            Operator::End => break,
            Operator::I32Const { value } => InitOp::I32Const(value),
            Operator::I64Const { value } => InitOp::I64Const(value),
            Operator::F32Const { value } => InitOp::F32Const(value.bits()),
            Operator::F64Const { value } => InitOp::F64Const(value.bits()),
            Operator::V128Const { value } => InitOp::V128Const(value.i128() as u128),
            Operator::GlobalGet { global_index } => InitOp::GlobalGet(global_index),
            Operator::RefNull { .. } => InitOp::RefNull,
            Operator::RefFunc { function_index } => InitOp::RefFunc(function_index),
            Operator::RefI31 => InitOp::RefI31,
            Operator::I32Add => InitOp::I32Add,
            Operator::I32Sub => InitOp::I32Sub,
            Operator::I32Mul => InitOp::I32Mul,
            Operator::I64Add => InitOp::I64Add,
            Operator::I64Sub => InitOp::I64Sub,
            Operator::I64Mul => InitOp::I64Mul,
            Operator::StructNew { struct_type_index } => InitOp::StructNew(struct_type_index),
            Operator::StructNewDefault { struct_type_index } => {
                InitOp::StructNewDefault(struct_type_index)
            }
            Operator::ArrayNewFixed {
                array_type_index,
                array_size,
            } => InitOp::ArrayNewFixed(array_type_index, array_size),
            Operator::ArrayNewDefault { array_type_index } => {
                InitOp::ArrayNewDefault(array_type_index)
            }
            unsupported => {
                return Err(ModuleError::UnsupportedConstExpr(format!("{unsupported:?}")))
            }
        };
        ops.push(parsed);
    }
    Ok(InitExpr::new(ops))
}
