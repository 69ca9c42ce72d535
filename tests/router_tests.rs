use brrtmvc::collection::{GroupOptions, ResourceOptions, RouteOptions, Verb};
use brrtmvc::manifest::RouteManifest;
use brrtmvc::{RouteCollection, RouteError, Router, RouterConfig};
use http::Method;
use std::sync::Arc;

mod common;
use common::{fixtures::BLOG_MANIFEST, temp_files};

fn blog_router() -> Router {
    let path = temp_files::create_temp_yaml(BLOG_MANIFEST);
    let manifest = RouteManifest::load(&path).unwrap();
    temp_files::cleanup_temp_files(&[path]);
    let routes = manifest.build(&RouterConfig::default()).unwrap();
    Router::from_collection(&routes)
}

#[test]
fn test_backreferences_reorder_params() {
    let mut router = blog_router();
    let result = router.handle("/books/123/sometitle/456").unwrap();
    assert_eq!(result.controller_name(), Some(r"\App\Controllers\BlogController"));
    assert_eq!(result.method, "show");
    assert_eq!(result.params, ["456", "123"]);
}

#[test]
fn test_root_and_redirect() {
    let mut router = blog_router();
    router.handle("/").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\HomeController"));

    match router.handle("old-home") {
        Err(RouteError::Redirect { target, status }) => {
            assert_eq!(target, "/");
            assert_eq!(status, 301);
        }
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_custom_placeholder_from_manifest() {
    let mut router = blog_router();
    router.handle("posts/hello-world-2").unwrap();
    assert_eq!(router.params(), ["hello-world-2"]);
    assert!(router.handle("posts/Hello").unwrap_err().is_not_found());
}

#[test]
fn test_locale_route() {
    let mut router = blog_router();
    let result = router.handle("de/about").unwrap();
    assert_eq!(result.locale.as_deref(), Some("de"));
    assert!(result.params.is_empty());
}

#[test]
fn test_resource_routes_with_except() {
    let table = Arc::new(
        RouteManifest::parse(std::path::Path::new("m.yaml"), BLOG_MANIFEST)
            .unwrap()
            .build(&RouterConfig::default())
            .unwrap()
            .into_table(),
    );

    let mut get = Router::new(table.clone());
    get.handle("photos").unwrap();
    assert_eq!(get.method_name(), "index");
    get.handle("photos/5").unwrap();
    assert_eq!(get.method_name(), "show");
    assert_eq!(get.params(), ["5"]);
    // `new` was excluded, so photos/new resolves as show
    get.handle("photos/new").unwrap();
    assert_eq!(get.method_name(), "show");

    let mut put = Router::new(table.clone()).with_verb(Method::PUT);
    put.handle("photos/5").unwrap();
    assert_eq!(put.method_name(), "update");

    let mut delete = Router::new(table).with_verb(Method::DELETE);
    delete.handle("photos/5").unwrap();
    assert_eq!(delete.method_name(), "delete");
}

#[test]
fn test_group_namespace_and_middleware() {
    let mut router = blog_router();
    let result = router.handle("admin/users/9").unwrap();
    assert_eq!(result.controller_name(), Some(r"\App\Controllers\Admin\UsersController"));
    assert_eq!(result.middlewares, ["session"]);

    router.handle("admin/users").unwrap();
    assert_eq!(router.middlewares(), ["session", "csrf"]);
}

#[test]
fn test_reverse_routing() {
    let routes = RouteManifest::parse(std::path::Path::new("m.yaml"), BLOG_MANIFEST)
        .unwrap()
        .build(&RouterConfig::default())
        .unwrap();
    let table = routes.table();

    assert_eq!(
        table.reverse_route("books.show", &["1", "title", "2"]).unwrap(),
        "/books/1/title/2"
    );
    assert_eq!(table.reverse_route("admin.user", &["7"]).unwrap(), "/admin/users/7");
    assert_eq!(
        table.reverse_route(r"Posts::view/$1", &["a-b"]).unwrap(),
        "/posts/a-b"
    );
    assert!(matches!(
        table.reverse_route("books.show", &["x", "title", "2"]),
        Err(RouteError::Config { .. })
    ));
    assert!(table.reverse_route("books.show", &["1"]).is_err());
    assert!(table.reverse_route("nope", &[]).is_err());
}

#[test]
fn test_not_found_message() {
    let mut router = blog_router();
    let err = router.handle("url/not-exists").unwrap_err();
    assert_eq!(err.to_string(), "Can't find a route for 'get: url/not-exists'.");
}

#[test]
fn test_security_guards() {
    let mut routes = RouteCollection::new();
    routes
        .get("(:segment)/(:segment)/(:segment)", "$2::$3/$1")
        .unwrap();
    routes
        .get("admin/admins/edit/(:any)", "App/Admin/Admins::edit_show/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);

    let err = router.handle("admin/admins/edit/1").unwrap_err();
    assert!(err.is_router_exception());
    assert!(err.to_string().contains("backslash"));

    let err = router.handle("a/b/c").unwrap_err();
    assert!(err.is_router_exception());
    assert!(err.to_string().contains("dynamic controller"));
}

#[test]
fn test_ordering_with_priorities() {
    let mut routes = RouteCollection::new();
    routes
        .route(Verb::Method(Method::GET), "(:any)", "Pages::show/$1", RouteOptions::new().priority(1))
        .unwrap();
    routes.get("contact", "Contact::index").unwrap();

    let mut router = Router::from_collection(&routes);
    router.handle("contact").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\PagesController"));

    routes.set_prioritize(true);
    let mut router = Router::from_collection(&routes);
    router.handle("contact").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\ContactController"));
}

#[test]
fn test_translate_dashes_end_to_end() {
    let mut config = RouterConfig::default();
    config.translate_uri_dashes = true;
    config.default_namespace = String::new();
    let mut routes = RouteCollection::with_config(&config);
    routes
        .get("user-setting/(:segment)", "User_setting::detail/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("user-setting/2018-12-02").unwrap();
    assert_eq!(router.controller_name(), Some(r"\User_settingController"));
    assert_eq!(router.method_name(), "detail");
    assert_eq!(router.params(), ["2018-12-02"]);
}

#[test]
fn test_unicode_percent_encoded_path() {
    let mut routes = RouteCollection::new();
    routes.add_placeholder("bangla", r"[a-z0-9\x{0980}-\x{09ff}-]+");
    routes.get("news/(:bangla)", "News::view/$1").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("/news/a0%E0%A6%80%E0%A7%BF-").unwrap();
    assert_eq!(router.params(), ["a0ঀ৿-"]);
}

#[test]
fn test_nested_builder_groups_and_resources() {
    let mut routes = RouteCollection::new();
    routes
        .group("api", GroupOptions::new().middleware("api-auth"), |api| {
            api.group("v1", GroupOptions::new().namespace(r"App\Api\V1"), |v1| {
                v1.resource("orders", ResourceOptions::new().only(["index", "show"]))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    let mut router = Router::from_collection(&routes);
    router.handle("api/v1/orders/3").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Api\V1\OrdersController"));
    assert_eq!(router.method_name(), "show");
    assert_eq!(router.middlewares(), ["api-auth"]);
    assert_eq!(
        router.matched_route_options().unwrap().name.as_deref(),
        Some("orders.show")
    );
}

#[test]
fn test_shared_table_across_threads() {
    let table = Arc::new(
        RouteManifest::parse(std::path::Path::new("m.yaml"), BLOG_MANIFEST)
            .unwrap()
            .build(&RouterConfig::default())
            .unwrap()
            .into_table(),
    );
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let table = table.clone();
            std::thread::spawn(move || {
                let mut router = Router::new(table);
                let path = format!("books/{i}/t/{}", i * 10);
                let result = router.handle(&path).unwrap();
                assert_eq!(result.params, [(i * 10).to_string(), i.to_string()]);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
