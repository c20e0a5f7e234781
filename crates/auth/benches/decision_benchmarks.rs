use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use siteerp_auth::{Action, Principal, Role, decide, explain};
use siteerp_core::{OrganizationId, UserId};

fn bench_decide(c: &mut Criterion) {
    let superadmin = Principal::superadmin(UserId::new(1));
    let member = Principal::member(UserId::new(2), Role::Manager, OrganizationId::new(5))
        .expect("member principal");

    let mut group = c.benchmark_group("decide");
    for (label, principal) in [("superadmin", &superadmin), ("member", &member)] {
        group.bench_with_input(BenchmarkId::new("same_tenant", label), principal, |b, p| {
            b.iter(|| decide(black_box(p), Action::Read, black_box(Some(OrganizationId::new(5)))))
        });
        group.bench_with_input(BenchmarkId::new("cross_tenant", label), principal, |b, p| {
            b.iter(|| decide(black_box(p), Action::Update, black_box(Some(OrganizationId::new(9)))))
        });
    }
    group.finish();

    c.bench_function("explain/cross_tenant", |b| {
        b.iter(|| {
            explain(
                black_box(&member),
                Action::Read,
                black_box(Some(OrganizationId::new(9))),
            )
        })
    });
}

criterion_group!(benches, bench_decide);
criterion_main!(benches);
