use super::*;
use crate::collection::{GroupOptions, HandlerSpec, RouteCollection, RouteOptions, Verb};
use crate::error::RouteError;
use http::Method;
use serde_json::json;

fn collection() -> RouteCollection {
    let mut routes = RouteCollection::new();
    routes.set_default_namespace("");
    routes
}

#[test]
fn test_backreference_reordering() {
    let mut routes = collection();
    routes
        .get("books/(:num)/(:alpha)/(:num)", "Blog::show/$3/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("books/123/sometitle/456").unwrap();
    assert_eq!(router.controller_name(), Some(r"\BlogController"));
    assert_eq!(router.method_name(), "show");
    assert_eq!(router.params(), ["456", "123"]);
}

#[test]
fn test_unreferenced_groups_dropped() {
    let mut routes = collection();
    routes.get("products/(:num)/(:segment)", "Catalog::lookup").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("products/7/red").unwrap();
    assert_eq!(router.method_name(), "lookup");
    assert!(router.params().is_empty());
}

#[test]
fn test_literal_segments_in_method_template_are_params() {
    let mut routes = collection();
    routes.get("p/(:num)", "Pages::view/fixed/$1").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("p/9").unwrap();
    assert_eq!(router.params(), ["fixed", "9"]);
}

#[test]
fn test_any_capture_with_slashes_splits_into_params() {
    let mut routes = collection();
    routes.get("files/(:any)", "Files::serve/$1").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("files/a/b/c.txt").unwrap();
    assert_eq!(router.params(), ["a", "b", "c.txt"]);
}

#[test]
fn test_translate_dashes_excludes_params() {
    let mut routes = collection();
    routes.set_translate_uri_dashes(true);
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
fn test_controller_suffix_added_once() {
    let mut routes = collection();
    routes.get("a", "Alpha::index").unwrap();
    routes.get("b", "BetaController::index").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("a").unwrap();
    assert_eq!(router.controller_name(), Some(r"\AlphaController"));
    router.handle("b").unwrap();
    assert_eq!(router.controller_name(), Some(r"\BetaController"));

    routes.set_controller_suffix("");
    let mut router = Router::from_collection(&routes);
    router.handle("a").unwrap();
    assert_eq!(router.controller_name(), Some(r"\Alpha"));
}

#[test]
fn test_translate_dashes_in_controller_and_method() {
    let mut routes = collection();
    routes.set_translate_uri_dashes(true);
    routes.get("x/(:segment)", "Some-thing::do-it/$1").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("x/a-b").unwrap();
    assert_eq!(router.controller_name(), Some(r"\Some_thingController"));
    assert_eq!(router.method_name(), "do_it");
    assert_eq!(router.params(), ["a-b"]);
}

#[test]
fn test_dynamic_controller_rejected() {
    let mut routes = collection();
    routes
        .get("(:segment)/(:segment)/(:segment)", "$2::$3/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);

    let err = router.handle("en/blog/show").unwrap_err();
    assert!(matches!(err, RouteError::DynamicController { .. }));
    assert!(err.to_string().to_lowercase().contains("dynamic controller"));
    assert!(router.matched().is_none());
}

#[test]
fn test_slash_namespace_rejected() {
    let mut routes = collection();
    routes
        .get("admin/admins/edit/(:any)", "App/Admin/Admins::edit_show/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);

    let err = router.handle("admin/admins/edit/1").unwrap_err();
    assert!(matches!(err, RouteError::InvalidControllerName { .. }));
    let message = err.to_string();
    assert!(message.contains("backslash"));
    assert!(message.contains("slash"));
}

#[test]
fn test_unicode_capture_percent_encoded() {
    let mut routes = collection();
    routes
        .get(r"news/([a-z0-9\x{0980}-\x{09ff}-]+)", "News::view/$1")
        .unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("news/a0%E0%A6%80%E0%A7%BF-").unwrap();
    assert_eq!(router.params(), ["a0ঀ৿-"]);
}

#[test]
fn test_unicode_capture_custom_placeholder() {
    let mut routes = collection();
    routes.add_placeholder("custom", r"[a-z0-9\x{0980}-\x{09ff}-]+");
    routes.get("news/(:custom)", "News::view/$1").unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("news/a0%E0%A6%80%E0%A7%BF-").unwrap();
    assert_eq!(router.params(), ["a0ঀ৿-"]);
}

#[test]
fn test_not_found_message() {
    let mut routes = collection();
    routes.get("users", "Users::index").unwrap();
    let mut router = Router::from_collection(&routes);

    let err = router.handle("url/not-exists").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("get: url/not-exists"));
}

#[test]
fn test_first_registered_wins_without_prioritize() {
    let mut routes = collection();
    routes
        .route(Verb::Method(Method::GET), "(:any)", "Pages::wildcard/$1", RouteOptions::new().priority(1))
        .unwrap();
    routes.get("profile", "Users::profile").unwrap();

    let mut router = Router::from_collection(&routes);
    router.handle("profile").unwrap();
    assert_eq!(router.method_name(), "wildcard");

    routes.set_prioritize(true);
    let mut router = Router::from_collection(&routes);
    router.handle("profile").unwrap();
    assert_eq!(router.method_name(), "profile");
    router.handle("anything-else").unwrap();
    assert_eq!(router.method_name(), "wildcard");
}

#[test]
fn test_priority_ordering_invariant() {
    let mut routes = collection();
    routes.get("docs/intro", "Docs::intro").unwrap();
    routes
        .route(Verb::Method(Method::GET), "docs/(:any)", "Docs::page/$1", RouteOptions::new().priority(1))
        .unwrap();
    routes.get("docs/(:segment)", "Docs::specific/$1").unwrap();

    let mut router = Router::from_collection(&routes);
    router.handle("docs/intro").unwrap();
    assert_eq!(router.method_name(), "intro");
    router.handle("docs/setup").unwrap();
    assert_eq!(router.method_name(), "page");

    routes.set_prioritize(true);
    let mut router = Router::from_collection(&routes);
    router.handle("docs/setup").unwrap();
    assert_eq!(router.method_name(), "specific");
}

#[test]
fn test_determinism() {
    let mut routes = collection();
    routes.get("a/(:num)", "A::one/$1").unwrap();
    routes.get("a/(:segment)", "A::two/$1").unwrap();
    let mut router = Router::from_collection(&routes);
    for _ in 0..10 {
        router.handle("a/5").unwrap();
        assert_eq!(router.method_name(), "one");
        router.handle("a/x").unwrap();
        assert_eq!(router.method_name(), "two");
    }
}

#[test]
fn test_locale_extracted_not_in_params() {
    let mut routes = collection();
    routes.get("{locale}/pages/(:segment)", "Pages::view/$1").unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("fr/pages/about").unwrap();
    assert!(router.has_locale());
    assert_eq!(router.locale(), Some("fr"));
    assert_eq!(router.params(), ["about"]);
}

#[test]
fn test_unsupported_locale_is_not_found() {
    let mut routes = collection();
    routes.set_supported_locales(["en", "fr"], true);
    routes.get("{locale}/home", "Home::index").unwrap();
    let mut router = Router::from_collection(&routes);

    assert!(router.handle("fr/home").is_ok());
    assert!(router.handle("xx/home").unwrap_err().is_not_found());
}

#[test]
fn test_root_route() {
    let mut routes = collection();
    routes.get("/", "Home::index").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("/").unwrap();
    assert_eq!(router.controller_name(), Some(r"\HomeController"));
    router.handle("").unwrap();
    assert_eq!(router.method_name(), "index");
}

#[test]
fn test_explicit_default_route_elision() {
    let mut routes = RouteCollection::new();
    routes.get("home/index", "Home::index").unwrap();
    routes.get("blog/index", "Blog::index").unwrap();
    routes.get("shop/list", "Shop::list").unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("blog").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\BlogController"));
    assert_eq!(router.method_name(), "index");

    router.handle("home").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\HomeController"));
    router.handle("/").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\HomeController"));

    assert!(router.handle("shop").unwrap_err().is_not_found());
}

#[test]
fn test_defaults_before_handle() {
    let mut routes = RouteCollection::new();
    routes.get("home", "Home::index").unwrap();
    let mut router = Router::from_collection(&routes);
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\HomeController"));
    assert_eq!(router.method_name(), "index");
    assert!(router.params().is_empty());

    router.handle("home").unwrap();
    let resolved = router.controller_name().map(str::to_string);
    assert!(router.handle("missing").is_err());
    assert_eq!(router.controller_name().map(str::to_string), resolved);
}

#[test]
fn test_namespace_qualification() {
    let mut routes = RouteCollection::new();
    routes.get("a", "Alpha::index").unwrap();
    routes.get("b", r"\Vendor\Beta::index").unwrap();
    routes
        .route(Verb::Method(Method::GET), "c", "Gamma", RouteOptions::new().namespace(r"Modules\Shop"))
        .unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("a").unwrap();
    assert_eq!(router.controller_name(), Some(r"\App\Controllers\AlphaController"));
    router.handle("b").unwrap();
    assert_eq!(router.controller_name(), Some(r"\Vendor\BetaController"));
    router.handle("c").unwrap();
    assert_eq!(router.controller_name(), Some(r"\Modules\Shop\GammaController"));
    assert_eq!(router.method_name(), "index");
}

#[test]
fn test_group_middleware_and_options_exposed() {
    let mut routes = collection();
    routes
        .group("api", GroupOptions::new().middleware("cors"), |api| {
            api.route(
                Verb::Method(Method::GET),
                "users/(:num)",
                "Api::user/$1",
                RouteOptions::new().name("api.user").middleware("auth"),
            )?;
            Ok(())
        })
        .unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("api/users/3").unwrap();
    assert_eq!(router.middlewares(), ["cors", "auth"]);
    let options = router.matched_route_options().unwrap();
    assert_eq!(options.name.as_deref(), Some("api.user"));
}

#[test]
fn test_closure_handler_receives_captures() {
    let mut routes = collection();
    routes
        .get(
            "sum/(:num)/(:num)",
            HandlerSpec::closure(2, |params| {
                let total: u64 = params.iter().filter_map(|p| p.parse::<u64>().ok()).sum();
                json!(total)
            }),
        )
        .unwrap();
    let mut router = Router::from_collection(&routes);

    router.handle("sum/2/40").unwrap();
    assert!(router.controller_name().is_none());
    assert_eq!(router.params(), ["2", "40"]);
    let closure = router.closure().unwrap();
    assert_eq!(closure.call(router.params()), json!(42));
}

#[test]
fn test_redirect_route() {
    let mut routes = collection();
    routes.add_redirect("old/(:num)", "/new/$1", 308).unwrap();
    let mut router = Router::from_collection(&routes);

    let err = router.handle("old/5").unwrap_err();
    assert_eq!(
        err,
        RouteError::Redirect {
            target: "/new/5".into(),
            status: 308
        }
    );
    assert!(err.preserves_method());
}

#[test]
fn test_verb_buckets() {
    let mut routes = collection();
    routes.post("items", "Items::create").unwrap();
    routes.add("items", "Items::fallback").unwrap();
    routes
        .match_verbs(&[Method::PUT, Method::PATCH], "items/(:num)", "Items::update/$1", RouteOptions::new())
        .unwrap();

    let table = std::sync::Arc::new(routes.compile());

    let mut post = Router::new(table.clone()).with_verb(Method::POST);
    post.handle("items").unwrap();
    assert_eq!(post.method_name(), "create");

    let mut get = Router::new(table.clone());
    get.handle("items").unwrap();
    assert_eq!(get.method_name(), "fallback");

    let mut patch = Router::new(table.clone()).with_verb(Method::PATCH);
    patch.handle("items/4").unwrap();
    assert_eq!(patch.method_name(), "update");

    let mut delete = Router::new(table).with_verb(Method::DELETE);
    assert!(delete.handle("items/4").unwrap_err().is_not_found());
}

#[test]
fn test_hostname_and_subdomain() {
    let mut routes = collection();
    routes
        .route(Verb::Any, "dashboard", "Admin::dashboard", RouteOptions::new().subdomain("admin"))
        .unwrap();
    routes
        .route(Verb::Any, "dashboard", "Shop::dashboard", RouteOptions::new().hostname("shop.example.com"))
        .unwrap();
    let table = std::sync::Arc::new(routes.compile());

    let mut admin = Router::new(table.clone()).with_host("admin.example.com");
    admin.handle("dashboard").unwrap();
    assert_eq!(admin.controller_name(), Some(r"\AdminController"));

    let mut none = Router::new(table);
    assert!(none.handle("dashboard").unwrap_err().is_not_found());
}

#[test]
fn test_failed_handle_clears_previous_result() {
    let mut routes = collection();
    routes.get("ok", "Ok::index").unwrap();
    let mut router = Router::from_collection(&routes);
    router.handle("ok").unwrap();
    assert!(router.matched().is_some());
    assert!(router.handle("missing").is_err());
    assert!(router.matched().is_none());
}
