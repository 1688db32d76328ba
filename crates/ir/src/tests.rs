use crate::{
    Bytes16,
    CatchBlock,
    CatchTag,
    CodeBuf,
    DeltaList,
    HandlerTable,
    JumpDelta,
    Op,
    Opcode,
    OffsetList,
    OpPos,
    RegHint,
    StackOffset,
    TryBlock,
    TryBlockIdx,
    TryTable,
    OP_ALIGN,
};

fn offsets(raw: &[u16]) -> OffsetList {
    raw.iter().copied().map(StackOffset).collect()
}

fn sample_ops() -> Vec<Op> {
    vec![
        Op::Unreachable {},
        Op::Const32 {
            value: 0xDEAD_BEEF,
            result: StackOffset(8),
        },
        Op::I32Add {
            lhs: StackOffset(0),
            rhs: StackOffset(4),
            result: StackOffset(8),
        },
        Op::I64Load {
            offset: 16,
            memory: 0,
            addr: StackOffset(8),
            result: StackOffset(16),
        },
        Op::Jump {
            delta: JumpDelta(-24),
        },
        Op::BrTable {
            index: StackOffset(4),
            targets: DeltaList(vec![JumpDelta(8), JumpDelta(16), JumpDelta(0)].into()),
        },
        Op::Call {
            func: 3,
            num_params: 2,
            reg_hint: RegHint(0),
            offsets: offsets(&[0, 8, 16]),
        },
        Op::Throw {
            tag: 1,
            args: offsets(&[4]),
        },
        Op::I8x16Shuffle {
            selector: Bytes16([0; 16]),
            lhs: StackOffset(0),
            rhs: StackOffset(16),
            result: StackOffset(32),
        },
        Op::End {
            results: offsets(&[8]),
        },
    ]
}

#[test]
fn encode_decode_roundtrip() {
    let mut buf = CodeBuf::new();
    let ops = sample_ops();
    let positions: Vec<OpPos> = ops.iter().map(|op| buf.push(op)).collect();
    for (op, pos) in ops.iter().zip(&positions) {
        let (decoded, _) = buf.decode_at(pos.to_usize());
        assert_eq!(&decoded, op);
    }
}

#[test]
fn buffer_size_is_sum_of_op_sizes() {
    let mut buf = CodeBuf::new();
    let ops = sample_ops();
    let mut expected = 0;
    for op in &ops {
        buf.push(op);
        expected += op.size();
    }
    assert_eq!(buf.len(), expected);
}

#[test]
fn op_size_matches_distance_to_next() {
    let mut buf = CodeBuf::new();
    for op in sample_ops() {
        buf.push(&op);
    }
    let mut pos = 0;
    for (head, op) in buf.iter() {
        assert_eq!(head.to_usize(), pos);
        assert_eq!(head.to_usize() % OP_ALIGN, 0);
        let (_, next) = buf.decode_at(pos);
        assert_eq!(next - pos, op.size());
        pos = next;
    }
    assert_eq!(pos, buf.len());
}

#[test]
fn stack_offsets_set_then_get() {
    for op in sample_ops() {
        let offsets = op.stack_offsets();
        for i in 0..offsets.len() {
            let mut patched = op.clone();
            assert!(patched.set_stack_offset(i, StackOffset(0x7777)));
            assert_eq!(patched.stack_offsets()[i], StackOffset(0x7777));
            // untouched offsets keep their values
            for (j, offset) in patched.stack_offsets().iter().enumerate() {
                if j != i {
                    assert_eq!(*offset, offsets[j]);
                }
            }
        }
        let mut patched = op.clone();
        assert!(!patched.set_stack_offset(offsets.len(), StackOffset(0)));
    }
}

#[test]
fn set_stack_offset_in_encoded_stream() {
    let mut buf = CodeBuf::new();
    let pos = buf.push(&Op::Call {
        func: 0,
        num_params: 1,
        reg_hint: RegHint(0),
        offsets: offsets(&[8, 24]),
    });
    assert!(buf.set_stack_offset(pos, 1, StackOffset(40)));
    let (decoded, _) = buf.decode_at(pos.to_usize());
    assert_eq!(decoded.stack_offsets()[1], StackOffset(40));
}

#[test]
fn patch_forward_jump() {
    let mut buf = CodeBuf::new();
    let jump = buf.push(&Op::Jump {
        delta: JumpDelta(0),
    });
    buf.push(&Op::Unreachable {});
    let target = buf.push(&Op::End {
        results: offsets(&[]),
    });
    buf.patch_jump(jump, target);
    let (decoded, _) = buf.decode_at(jump.to_usize());
    assert_eq!(
        decoded,
        Op::Jump {
            delta: JumpDelta((target.0 - jump.0) as i32),
        }
    );
}

#[test]
fn try_table_innermost_lookup() {
    let mut table = TryTable::new();
    let catch = CatchBlock {
        tag: CatchTag::ALL,
        handler: OpPos(0),
        payload: OffsetList::default(),
        captures_exnref: false,
        exnref_slot: 0,
    };
    let outer = table.push(TryBlock {
        begin: OpPos(0),
        end: OpPos(64),
        parent: TryBlockIdx::HOST,
        catches: vec![catch.clone()],
    });
    let inner = table.push(TryBlock {
        begin: OpPos(16),
        end: OpPos(32),
        parent: outer,
        catches: vec![catch],
    });
    assert_eq!(table.find_innermost(OpPos(20)), Some(inner));
    assert_eq!(table.find_innermost(OpPos(40)), Some(outer));
    assert_eq!(table.find_innermost(OpPos(64)), None);
    assert!(table.block(inner).parent == outer);
}

#[test]
fn handler_table_reverse_lookup() {
    let table = HandlerTable::build(|opcode| opcode as u16 as u64);
    let handler = *table.get(Opcode::I32Add);
    assert_eq!(table.opcode_of(&handler), Some(Opcode::I32Add));
    assert_eq!(*table.get(Opcode::Unreachable), Opcode::Unreachable as u16 as u64);
}

#[test]
fn opcode_repr_roundtrip() {
    for opcode in Opcode::ALL {
        assert_eq!(Opcode::from_repr(*opcode as u16), Some(*opcode));
    }
    assert_eq!(Opcode::from_repr(u16::MAX), None);
}
