use chrono::Duration;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use medauth::auth::{Principal, Requirement, Role, RouteAuthorizationPolicy, TokenCodec};

fn bench_token_codec(c: &mut Criterion) {
    let codec = TokenCodec::new(b"bench-secret", Duration::seconds(3600));
    let principal = Principal::new("bench-1", "bench@clinic.test", "unused", [Role::Patient]).unwrap();

    c.bench_function("token_issue", |b| b.iter(|| codec.issue(black_box(&principal))));

    let token = codec.issue(&principal).unwrap();
    c.bench_function("token_verify", |b| {
        b.iter(|| codec.verify(black_box(token.as_str())))
    });

    c.bench_function("token_verify_malformed", |b| {
        b.iter(|| codec.verify(black_box("not.a.token")))
    });
}

fn bench_route_policy(c: &mut Criterion) {
    let policy = RouteAuthorizationPolicy::new()
        .with_rule("/api/v1/public/**", Requirement::Public)
        .unwrap()
        .with_rule("/api/v1/doctors/*/schedule", Requirement::Authenticated)
        .unwrap()
        .with_rule("/api/v1/testing/**", Requirement::Authenticated)
        .unwrap();

    c.bench_function("policy_first_rule", |b| {
        b.iter(|| policy.requirement_for(black_box("/api/v1/public/login")))
    });

    c.bench_function("policy_last_rule", |b| {
        b.iter(|| policy.requirement_for(black_box("/api/v1/testing/me")))
    });

    c.bench_function("policy_unmatched", |b| {
        b.iter(|| policy.requirement_for(black_box("/api/v2/other/path")))
    });
}

criterion_group!(benches, bench_token_codec, bench_route_policy);
criterion_main!(benches);
