mod common;

use std::fs;

use common::{matched_name, register_blog_routes, request, temp_files};
use http::Method;
use wprouter::cache::{FsCacheFile, RouteCache, CACHE_FORMAT_VERSION};
use wprouter::route::CachedRouteCollection;
use wprouter::{DispatchOutcome, Router, RouterConfig, RouterError, UrlType};

fn cached_config(path: &std::path::Path) -> RouterConfig {
    RouterConfig::default().with_cache(path)
}

#[test]
fn test_cold_boot_writes_cache_on_first_dispatch() {
    let (_dir, path) = temp_files::cache_path();
    let mut router = Router::new(&cached_config(&path)).unwrap();
    assert!(!router.loaded_from_cache());
    register_blog_routes(&mut router);
    assert!(!path.exists());

    router.dispatch(&request(Method::GET, "/")).unwrap();
    assert!(path.exists());
    assert!(router.is_cached());

    let envelope: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(envelope["version"], CACHE_FORMAT_VERSION);
    assert!(envelope["route_collection"]["posts.show"].is_string());
    assert!(envelope["fast_route"]["static_routes"]["GET"]["/"].is_array());
}

#[test]
fn test_warm_boot_skips_registration_and_keeps_behavior() {
    let (_dir, path) = temp_files::cache_path();
    let cold = {
        let mut router = Router::new(&cached_config(&path)).unwrap();
        register_blog_routes(&mut router);
        router.compile().unwrap();
        router
    };

    let mut warm = Router::new(&cached_config(&path)).unwrap();
    assert!(warm.loaded_from_cache());

    let mut ran = false;
    warm.routes(|_| {
        ran = true;
        Ok(())
    })
    .unwrap();
    assert!(!ran, "registration must be skipped on a warm cache");

    for (method, uri) in [
        (Method::GET, "/posts/hello"),
        (Method::GET, "/archive/2024"),
        (Method::DELETE, "/foo"),
        (Method::GET, "/legacy"),
        (Method::GET, "/api/users/9"),
        (Method::GET, "/wp-admin/admin.php?page=settings/general"),
        (Method::GET, "/missing"),
    ] {
        let expected = cold.dispatch(&request(method.clone(), uri)).unwrap();
        let actual = warm.dispatch(&request(method.clone(), uri)).unwrap();
        assert_eq!(expected.kind(), actual.kind(), "{method} {uri}");
        assert_eq!(matched_name(&expected), matched_name(&actual), "{method} {uri}");
        if let (Some(a), Some(b)) = (expected.route_match(), actual.route_match()) {
            assert_eq!(a.path_params, b.path_params);
            assert_eq!(a.route, b.route);
        }
    }

    assert_eq!(
        warm.url_to_route("posts.show", &[("slug", "x")], UrlType::AbsolutePath, None)
            .unwrap(),
        cold.url_to_route("posts.show", &[("slug", "x")], UrlType::AbsolutePath, None)
            .unwrap()
    );
    assert_eq!(warm.admin_menu().unwrap().len(), 2);
}

#[test]
fn test_corrupt_cache_file_triggers_recompile() {
    let (_dir, path) = temp_files::cache_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"{\"version\": 1, \"route_collection\": ").unwrap();

    let mut router = Router::new(&cached_config(&path)).unwrap();
    assert!(!router.loaded_from_cache());
    register_blog_routes(&mut router);
    let outcome = router.dispatch(&request(Method::GET, "/posts/a")).unwrap();
    assert!(matches!(outcome, DispatchOutcome::Matched(_)));

    // the broken file was replaced with a valid one
    assert!(RouteCache::new(Box::new(FsCacheFile::new(&path)))
        .load()
        .unwrap()
        .is_some());
}

#[test]
fn test_stale_version_triggers_recompile() {
    let (_dir, path) = temp_files::cache_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        br#"{"version": 0, "route_collection": {}, "fast_route": {"static_routes": {}, "dynamic_routes": {}}}"#,
    )
    .unwrap();
    let router = Router::new(&cached_config(&path)).unwrap();
    assert!(!router.loaded_from_cache());
}

#[test]
fn test_corrupt_route_entry_is_fatal_on_access() {
    let (_dir, path) = temp_files::cache_path();
    {
        let mut router = Router::new(&cached_config(&path)).unwrap();
        register_blog_routes(&mut router);
        router.compile().unwrap();
    }

    let mut envelope: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    envelope["route_collection"]["posts.show"] = serde_json::json!("{not a route");
    fs::write(&path, serde_json::to_vec(&envelope).unwrap()).unwrap();

    let router = Router::new(&cached_config(&path)).unwrap();
    assert!(router.loaded_from_cache());
    assert!(router.dispatch(&request(Method::GET, "/")).is_ok());
    assert!(matches!(
        router.dispatch(&request(Method::GET, "/posts/a")),
        Err(RouterError::Route(wprouter::RouteError::CorruptCachedRoute { .. }))
    ));
}

#[test]
fn test_cached_collection_hydrates_lazily() {
    let (_dir, path) = temp_files::cache_path();
    {
        let mut router = Router::new(&cached_config(&path)).unwrap();
        register_blog_routes(&mut router);
        router.compile().unwrap();
    }
    let cached = RouteCache::new(Box::new(FsCacheFile::new(&path)))
        .load()
        .unwrap()
        .unwrap();
    let collection = CachedRouteCollection::new(cached.route_collection);
    assert_eq!(collection.hydrated_count(), 0);
    wprouter::RouteCollection::get(&collection, "home").unwrap();
    assert_eq!(collection.hydrated_count(), 1);
}

#[test]
fn test_cache_write_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    // a directory where the cache file should be
    let path = dir.path().join("routes.json");
    fs::create_dir_all(&path).unwrap();

    let mut router = Router::new(&cached_config(&path)).unwrap();
    register_blog_routes(&mut router);
    assert!(matches!(
        router.dispatch(&request(Method::GET, "/")),
        Err(RouterError::Cache(_))
    ));
}

#[test]
fn test_clear_cache() {
    let (_dir, path) = temp_files::cache_path();
    let mut router = Router::new(&cached_config(&path)).unwrap();
    register_blog_routes(&mut router);
    router.compile().unwrap();
    assert!(router.is_cached());
    router.cache().unwrap().clear().unwrap();
    assert!(!router.is_cached());
}
