#![allow(dead_code)]

use http::Method;
use wprouter::{DispatchOutcome, MenuItem, RouteGroup, Router, RouterConfig, RoutingRequest};

pub mod temp_files {
    use std::path::PathBuf;

    /// Writes `content` into a fresh temporary directory and returns the
    /// directory guard with the file path. The file lives as long as the guard.
    pub fn create_temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    /// Path of a not yet existing cache file inside a fresh temporary directory.
    pub fn cache_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("routes.json");
        (dir, path)
    }
}

/// Registers the blog routes used across the integration tests.
pub fn register_blog_routes(router: &mut Router) {
    router
        .routes(|r| {
            r.get("home", "/", "HomeController")?;
            r.match_methods(&[Method::GET, Method::POST], "foo", "/foo", "FooController")?;
            r.get("posts.show", "/posts/{slug}", "PostController@show")?;
            r.get("archive", "/archive/{year}/{month?}", "ArchiveController")?
                .require_num("year")?
                .default_value("month", "01");
            r.delegate("legacy", "/legacy", &[Method::GET])?;
            r.group(
                RouteGroup::new()
                    .with_prefix("/api")
                    .with_name("api")
                    .with_middleware("auth"),
                |r| {
                    r.get("users.show", "/users/{id}", "UserController@show")?
                        .require_num("id")?;
                    r.post("users.store", "/users", "UserController@store")?;
                    Ok(())
                },
            )?;
            r.admin(|r| {
                r.page(
                    "settings",
                    "/settings",
                    "SettingsController",
                    Some(MenuItem::new("Settings")),
                )?;
                r.page(
                    "settings.general",
                    "/settings/general",
                    "GeneralSettingsController",
                    Some(MenuItem::new("General").sub_page_of("settings")),
                )?;
                Ok(())
            })
        })
        .unwrap();
}

/// A router without caching and with the blog routes registered.
pub fn blog_router() -> Router {
    let mut router = Router::new(&RouterConfig::default()).unwrap();
    register_blog_routes(&mut router);
    router
}

pub fn request(method: Method, uri: &str) -> RoutingRequest {
    RoutingRequest::new(method, uri)
}

/// Name of the matched (or delegated) route, if any.
pub fn matched_name(outcome: &DispatchOutcome) -> Option<String> {
    outcome.route_match().map(|m| m.name().to_string())
}
