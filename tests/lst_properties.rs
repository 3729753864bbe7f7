//! Property tests over randomly generated, randomly formatted expressions.

use std::sync::Arc;

use lst_js::{compare, print, receive, send, RpcObjectData, TreeVisitor};
use quickcheck::{QuickCheck, TestResult};
use test_utils::lst::generator::FormattedExpr;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

struct Identity;

impl TreeVisitor<()> for Identity {}

#[test]
fn test_tight_layout_prints_canonical_source() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let printed = runtime().block_on(print(&e.tight().to_tree())).unwrap();
        TestResult::from_bool(printed == e.expr.to_string())
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}

#[test]
fn test_compare_is_reflexive() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let tree = e.to_unit();
        TestResult::from_bool(runtime().block_on(compare(&tree, &tree)).unwrap())
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}

#[test]
fn test_formatting_never_affects_equivalence() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let equivalent = runtime().block_on(compare(&e.to_tree(), &e.tight().to_tree())).unwrap();
        TestResult::from_bool(equivalent)
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}

#[test]
fn test_rpc_round_trip_is_lossless() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let tree = e.to_unit();
        let (printed, received_printed, equivalent) = runtime().block_on(async {
            let ops = send(&tree, None).await.unwrap();
            let received = receive(ops, None).await.unwrap();
            (
                print(&tree).await.unwrap(),
                print(&received).await.unwrap(),
                compare(&tree, &received).await.unwrap(),
            )
        });
        TestResult::from_bool(printed == received_printed && equivalent)
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}

#[test]
fn test_unchanged_tree_costs_one_op() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let tree = e.to_unit();
        let ops = runtime().block_on(send(&tree, Some(&tree))).unwrap();
        TestResult::from_bool(ops == vec![RpcObjectData::no_change()])
    }
    QuickCheck::new().tests(100).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}

#[test]
fn test_identity_visit_shares_every_node() {
    test_utils::setup();
    fn prop(e: FormattedExpr) -> TestResult {
        let tree = e.to_unit();
        let out = runtime().block_on(Identity.visit_root(&tree, &mut ())).unwrap();
        TestResult::from_bool(Arc::ptr_eq(&tree, &out))
    }
    QuickCheck::new().tests(100).quickcheck(prop as fn(FormattedExpr) -> TestResult);
}
