use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::{low_cost_hasher, MockAuthRepository};
use service::auth::domain::{RegisterInput, LoginInput};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let cfg = AuthConfig { jwt_secret: "secret".into(), ..AuthConfig::default() };
    let svc = AuthService::new(repo, cfg).with_hasher(low_cost_hasher());

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput { username: "bench".into(), password: "Benchmark1".into() }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    c.bench_function("auth_token_verify", |b| {
        let session = rt
            .block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() }))
            .unwrap();
        b.iter(|| svc.verify_token(&session.access_token).unwrap());
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
