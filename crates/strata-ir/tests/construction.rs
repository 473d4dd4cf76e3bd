//! End-to-end construction of both body forms through the public API.

use cranelift_entity::EntityRef;
use strata_ir::{
    Builder, GraphBuilder, IrContext, IrError, OperationState, StmtListParent, TreeBuilder,
    ValueFactory,
};

#[test]
fn interning_is_idempotent_across_builders() {
    let mut ctx = IrContext::new();
    let sig = Builder::new(&mut ctx).function_type(&[], &[]).unwrap();
    let graph_fn = ctx.create_graph_function("g", sig).unwrap();
    let tree_fn = ctx.create_tree_function("t", sig).unwrap();

    let (f32_a, i16_a, i32_a, map_a) = {
        let mut b = Builder::new(&mut ctx);
        let d0 = b.dim_expr(0);
        let map = b.affine_map(1, 0, &[d0], &[]).unwrap();
        (
            b.f32_type(),
            b.integer_type(16).unwrap(),
            b.integer_type(32).unwrap(),
            map,
        )
    };
    let (f32_b, map_b) = {
        let mut b = GraphBuilder::new(&mut ctx, graph_fn);
        let d0 = b.dim_expr(0);
        (b.f32_type(), b.affine_map(1, 0, &[d0], &[]).unwrap())
    };
    let (f32_c, i32_c) = {
        let mut b = TreeBuilder::new(&mut ctx, tree_fn);
        (b.f32_type(), b.integer_type(32).unwrap())
    };

    assert_eq!(f32_a, f32_b);
    assert_eq!(f32_a, f32_c);
    assert_eq!(i32_a, i32_c);
    assert_ne!(i16_a, i32_a);
    assert_eq!(map_a, map_b);
}

#[test]
fn affine_expressions_collapse() {
    let mut ctx = IrContext::new();
    let mut b = Builder::new(&mut ctx);
    let first = dim0_plus_one(&mut b);
    let second = dim0_plus_one(&mut b);
    assert_eq!(first, second);
}

fn dim0_plus_one(b: &mut impl ValueFactory) -> strata_ir::AffineExprRef {
    let d0 = b.dim_expr(0);
    let one = b.constant_expr(1);
    b.add_expr(d0, one).unwrap()
}

#[test]
fn omitted_loop_step_is_one() {
    let mut ctx = IrContext::new();
    let sig = Builder::new(&mut ctx).function_type(&[], &[]).unwrap();
    let func = ctx.create_tree_function("loop_nest", sig).unwrap();

    let mut b = TreeBuilder::new(&mut ctx, func);
    let lower = b.constant_expr(0);
    let upper = b.constant_expr(10);
    let l = b.create_loop(lower, upper, None).unwrap();

    let step = ctx.loop_data(l).unwrap().step;
    assert_eq!(ctx.affine_constant(step), Some(1));
}

#[test]
fn successive_cursor_positions_keep_order() {
    let mut ctx = IrContext::new();
    let sig = Builder::new(&mut ctx).function_type(&[], &[]).unwrap();
    let func = ctx.create_graph_function("ordered", sig).unwrap();

    let mut b = GraphBuilder::new(&mut ctx, func);
    let block = b.create_block();
    let mut created = Vec::new();
    for (index, name) in ["test.a", "test.b", "test.c"].into_iter().enumerate() {
        b.set_insertion_point(block, index).unwrap();
        created.push(b.create_operation(OperationState::new(name)).unwrap());
    }

    assert_eq!(ctx.block_ops(block), created.as_slice());
    let names: Vec<_> = created.iter().map(|&op| ctx.op_name(op)).collect();
    assert_eq!(names, ["test.a", "test.b", "test.c"]);
}

#[test]
fn graph_values_do_not_enter_tree_bodies() {
    let mut ctx = IrContext::new();
    let f32_ty = Builder::new(&mut ctx).f32_type();
    let sig = Builder::new(&mut ctx).function_type(&[], &[f32_ty]).unwrap();
    let graph_fn = ctx.create_graph_function("producer", sig).unwrap();
    let tree_fn = ctx.create_tree_function("consumer", sig).unwrap();

    let produced = {
        let mut b = GraphBuilder::new(&mut ctx, graph_fn);
        b.create_block();
        let one = b.float_attr(1.0);
        let op = b
            .create_operation(OperationState::new("constant").result(f32_ty).attr("value", one))
            .unwrap();
        b.context().op_result(op, 0)
    };

    let mut b = TreeBuilder::new(&mut ctx, tree_fn);
    let body = b.insertion_point().list;
    let err = b
        .create_operation(OperationState::new("negf").operand(produced).result(f32_ty))
        .unwrap_err();
    assert!(matches!(
        err,
        IrError::RepresentationMismatch {
            operand_index: 0,
            ..
        }
    ));
    assert!(ctx.stmt_list(body).is_empty());
    assert_eq!(ctx.stmt_list_parent(body), StmtListParent::Function(tree_fn));
}

#[test]
fn create_block_redirects_later_operations() {
    let mut ctx = IrContext::new();
    let sig = Builder::new(&mut ctx).function_type(&[], &[]).unwrap();
    let func = ctx.create_graph_function("blocks", sig).unwrap();

    let mut b = GraphBuilder::new(&mut ctx, func);
    let entry = b.create_block();
    b.create_operation(OperationState::new("test.first")).unwrap();
    let exit = b.create_block();
    let op = b.create_operation(OperationState::new("test.second")).unwrap();

    assert_eq!(ctx.function_blocks(func).last(), Some(&exit));
    assert_eq!(ctx.block_ops(entry).len(), 1);
    assert_eq!(ctx.block_ops(exit), &[op]);
}

/// A context whose tables are much larger than a fresh one, so its refs do
/// not resolve anywhere else.
fn crowded_context() -> IrContext {
    let mut ctx = IrContext::new();
    let mut b = Builder::new(&mut ctx);
    for n in 0..64 {
        b.integer_type(n + 1).unwrap();
        b.constant_expr(i64::from(n));
    }
    ctx
}

#[test]
fn refs_from_another_context_are_rejected() {
    let mut other = crowded_context();
    let (foreign_ty, foreign_upper) = {
        let mut b = Builder::new(&mut other);
        (b.integer_type(64).unwrap(), b.constant_expr(63))
    };

    let mut ctx = IrContext::new();
    assert!(matches!(
        ctx.create_tree_function("x", foreign_ty),
        Err(IrError::MalformedValue { .. })
    ));
    assert!(ctx.create_graph_function("x", foreign_ty).is_err());

    let sig = Builder::new(&mut ctx).function_type(&[], &[]).unwrap();
    let func = ctx.create_tree_function("kernel", sig).unwrap();
    let mut b = TreeBuilder::new(&mut ctx, func);
    let body = b.insertion_point().list;
    let lower = b.constant_expr(0);
    assert!(matches!(
        b.create_loop(lower, foreign_upper, None),
        Err(IrError::MalformedValue { .. })
    ));
    assert!(b.vector_type(&[4], foreign_ty).is_err());
    let one = b.constant_expr(1);
    assert!(b.add_expr(foreign_upper, one).is_err());

    // The rejected expression left no entry behind.
    let next = b.constant_expr(2);
    assert_eq!(next.index(), one.index() + 1);
    assert!(ctx.stmt_list(body).is_empty());
    assert_eq!(ctx.tree_functions().count(), 1);
}

#[test]
fn rejected_value_requests_leave_tables_unchanged() {
    let mut ctx = IrContext::new();
    let mut b = Builder::new(&mut ctx);
    let f32_ty = b.f32_type();
    let d0 = b.dim_expr(0);
    let d1 = b.dim_expr(1);
    let ten = b.constant_expr(10);
    let transpose = b.affine_map(2, 0, &[d1, d0], &[]).unwrap();
    let last_type = b.integer_type(8).unwrap();

    assert!(b.memref_type(&[4], f32_ty, &[transpose], 0).is_err());
    assert!(b.affine_map(1, 0, &[d0], &[ten, ten]).is_err());
    assert!(b.integer_set(0, 0, &[d0], &[true]).is_err());

    let next_type = b.integer_type(16).unwrap();
    assert_eq!(next_type.index(), last_type.index() + 1);
    let next_map = b.affine_map(2, 0, &[d0, d1], &[]).unwrap();
    assert_eq!(next_map.index(), transpose.index() + 1);
    let first_set = b.integer_set(1, 0, &[d0], &[false]).unwrap();
    assert_eq!(first_set.index(), 0);
}
