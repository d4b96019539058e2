mod common;

use common::register_blog_routes;
use wprouter::{Router, RouterConfig, UrlGenerationContext, UrlGenerationError, UrlType};

fn router(config: RouterConfig) -> Router {
    let mut router = Router::new(&config).unwrap();
    register_blog_routes(&mut router);
    router
}

#[test]
fn test_route_urls_with_leftover_query() {
    let router = router(RouterConfig::default());
    assert_eq!(
        router
            .url_to_route(
                "posts.show",
                &[("slug", "hello"), ("utm", "mail"), ("page", "2")],
                UrlType::AbsolutePath,
                None
            )
            .unwrap(),
        "/posts/hello?utm=mail&page=2"
    );
    assert_eq!(
        router
            .url_to_route("archive", &[("year", "2024")], UrlType::AbsolutePath, None)
            .unwrap(),
        "/archive/2024"
    );
}

#[test]
fn test_errors() {
    let router = router(RouterConfig::default());
    assert!(matches!(
        router.url_to_route("nope", &[], UrlType::AbsolutePath, None),
        Err(UrlGenerationError::RouteNotFound { .. })
    ));
    assert!(matches!(
        router.url_to_route("posts.show", &[], UrlType::AbsolutePath, None),
        Err(UrlGenerationError::MissingParameter { ref param, .. }) if param == "slug"
    ));
    assert!(matches!(
        router.url_to_route("api.users.show", &[("id", "seven")], UrlType::AbsolutePath, None),
        Err(UrlGenerationError::BadParameter { ref value, .. }) if value == "seven"
    ));
}

#[test]
fn test_absolute_urls_follow_context() {
    let config = RouterConfig {
        url: UrlGenerationContext {
            host: "blog.test".to_string(),
            http_port: 8080,
            https_port: 443,
            https_by_default: false,
        },
        ..RouterConfig::default()
    };
    let router = router(config);
    assert_eq!(
        router
            .url_to_route("home", &[], UrlType::AbsoluteUrl, None)
            .unwrap(),
        "http://blog.test:8080/"
    );
    assert_eq!(
        router
            .url_to_route("posts.show", &[("slug", "a")], UrlType::AbsolutePath, Some(true))
            .unwrap(),
        "https://blog.test/posts/a"
    );
    assert_eq!(
        router.url_to("/search", &[("q", "a b&c")], UrlType::AbsolutePath, None),
        "/search?q=a%20b%26c"
    );
}

#[test]
fn test_raw_query_delimiters() {
    let config = RouterConfig {
        raw_query_delimiters: true,
        ..RouterConfig::default()
    };
    let router = router(config);
    assert_eq!(
        router.url_to("/search", &[("q", "a=b&c")], UrlType::AbsolutePath, None),
        "/search?q=a=b&c"
    );
}

#[test]
fn test_admin_page_urls() {
    let router = router(RouterConfig::default());
    assert_eq!(
        router
            .url_to_route("settings", &[], UrlType::AbsolutePath, None)
            .unwrap(),
        "/wp-admin/admin.php?page=settings"
    );
    assert_eq!(
        router
            .url_to_route("settings.general", &[("tab", "mail")], UrlType::AbsolutePath, None)
            .unwrap(),
        "/wp-admin/admin.php?page=settings/general&tab=mail"
    );
}

#[test]
fn test_login_url() {
    let router = router(RouterConfig::default());
    assert_eq!(
        router
            .login_url(Some("/posts/a"), UrlType::AbsolutePath)
            .unwrap(),
        "/wp-login.php?redirect_to=/posts/a"
    );

    let mut with_route = Router::new(&RouterConfig::default()).unwrap();
    with_route
        .routes(|r| {
            r.get("auth.login", "/login", "LoginController")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(
        with_route.login_url(None, UrlType::AbsolutePath).unwrap(),
        "/login"
    );
}
