use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use wprouter::{RouteManifest, Router, RouterConfig, RoutingRequest, UrlType};

fn example_manifest() -> &'static str {
    r#"
routes:
  - name: home
    path: /
    handler: HomeController
  - name: zoo.animals
    path: /zoo/animals
    methods: [GET, POST]
    handler: AnimalController
  - name: zoo.health
    path: /zoo/health
    methods: [HEAD, OPTIONS]
    handler: HealthController
groups:
  - prefix: /zoo
    name: zoo
    routes:
      - name: animal
        path: /animals/{id}
        methods: [GET, PUT, PATCH, DELETE]
        handler: AnimalController@show
        requirements: { id: "[0-9]+" }
      - name: animal.toy
        path: /animals/{id}/toys/{toy_id}
        handler: ToyController@show
      - name: habitat.section
        path: /{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}
        handler: HabitatController@section
  - prefix: /inventory
    name: inventory
    routes:
      - name: batch
        path: /{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}
        methods: [POST]
        handler: BatchController@store
"#
}

fn router() -> Router {
    let manifest = RouteManifest::from_yaml_str(example_manifest()).expect("valid manifest");
    let mut router = Router::new(&RouterConfig::default()).expect("router");
    manifest.register(&mut router).expect("routes register");
    router.compile().expect("routes compile");
    router
}

fn bench_static_dispatch(c: &mut Criterion) {
    let router = router();
    let requests = [
        RoutingRequest::new(Method::GET, "/"),
        RoutingRequest::new(Method::POST, "/zoo/animals"),
        RoutingRequest::new(Method::OPTIONS, "/zoo/health"),
    ];
    c.bench_function("dispatch_static", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(router.dispatch(request).expect("dispatch"));
            }
        })
    });
}

fn bench_dynamic_dispatch(c: &mut Criterion) {
    let router = router();
    let requests = [
        RoutingRequest::new(Method::GET, "/zoo/animals/123"),
        RoutingRequest::new(Method::GET, "/zoo/animals/123/toys/456"),
        RoutingRequest::new(Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        RoutingRequest::new(Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        RoutingRequest::new(Method::DELETE, "/zoo/animals/abc"),
    ];
    c.bench_function("dispatch_dynamic", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(router.dispatch(request).expect("dispatch"));
            }
        })
    });
}

fn bench_url_generation(c: &mut Criterion) {
    let router = router();
    c.bench_function("url_static_memoized", |b| {
        b.iter(|| {
            black_box(
                router
                    .url_to_route("zoo.animals", &[], UrlType::AbsolutePath, None)
                    .expect("url"),
            )
        })
    });
    c.bench_function("url_dynamic_with_query", |b| {
        b.iter(|| {
            black_box(
                router
                    .url_to_route(
                        "zoo.habitat.section",
                        &[
                            ("category", "big cats"),
                            ("id", "7"),
                            ("habitat_id", "3"),
                            ("section_id", "north"),
                            ("sort", "name&age"),
                        ],
                        UrlType::AbsoluteUrl,
                        None,
                    )
                    .expect("url"),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_static_dispatch,
    bench_dynamic_dispatch,
    bench_url_generation
);
criterion_main!(benches);
