//! Benchmarks for LST operations
//!
//! Measures performance of:
//! - Identity and rewriting traversals over wide compilation units
//! - Structural comparison
//! - Full and incremental RPC sends
//! - Receiving a full send

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use async_trait::async_trait;
use lst_js::tree::j::Identifier;
use lst_js::tree::TreeRef;
use lst_js::{compare, receive, send, Cursor, Result, TreeVisitor};
use test_utils::lst::builders::{identifier_statements, unit};

const SIZES: &[usize] = &[10, 100, 1000];

struct Identity;

impl TreeVisitor<()> for Identity {}

/// Renames the first statement's identifier only.
struct RenameFirst;

#[async_trait]
impl TreeVisitor<()> for RenameFirst {
    async fn visit_identifier(&mut self, tree: &TreeRef, node: &Identifier, _p: &mut (), _cursor: &Cursor) -> Result<TreeRef> {
        if node.simple_name != "n0" {
            return Ok(tree.clone());
        }
        Ok(Identifier { simple_name: "renamed".to_string(), ..node.clone() }.into_tree())
    }
}

fn wide_unit(size: usize) -> TreeRef {
    let names: Vec<String> = (0..size).map(|i| format!("n{}", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    unit(identifier_statements(&names))
}

fn bench_traversal(c: &mut Criterion) {
    lst_js::install();
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("traversal");
    for &size in SIZES {
        let tree = wide_unit(size);
        group.bench_with_input(BenchmarkId::new("identity", size), &tree, |b, tree| {
            b.iter(|| rt.block_on(Identity.visit_root(black_box(tree), &mut ())).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("rename_one", size), &tree, |b, tree| {
            b.iter(|| rt.block_on(RenameFirst.visit_root(black_box(tree), &mut ())).unwrap())
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    lst_js::install();
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("compare");
    for &size in SIZES {
        let pair = (wide_unit(size), wide_unit(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &pair, |b, (left, right)| {
            b.iter(|| rt.block_on(compare(black_box(left), black_box(right))).unwrap())
        });
    }
    group.finish();
}

fn bench_rpc(c: &mut Criterion) {
    lst_js::install();
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("rpc");
    for &size in SIZES {
        let before = wide_unit(size);
        let after = rt.block_on(RenameFirst.visit_root(&before, &mut ())).unwrap();
        let full = rt.block_on(send(&before, None)).unwrap();

        group.bench_with_input(BenchmarkId::new("send_full", size), &before, |b, tree| {
            b.iter(|| rt.block_on(send(black_box(tree), None)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("send_delta", size), &(&before, &after), |b, (before, after)| {
            b.iter(|| rt.block_on(send(black_box(after), Some(before))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("receive_full", size), &full, |b, ops| {
            b.iter(|| rt.block_on(receive(black_box(ops.clone()), None)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_traversal, bench_compare, bench_rpc);
criterion_main!(benches);
