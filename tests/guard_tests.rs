//! Guard and middleware behaviour inside full navigations.

mod common;

use common::*;
use std::cell::Cell;
use std::rc::Rc;
use web_navigator::*;

fn routes(f: &Fixture) {
    f.router
        .add(Route::new("/", page("Home")))
        .unwrap()
        .add(Route::new("/login", page("Login")))
        .unwrap()
        .add(Route::new("/admin", page("Admin")).with_meta("requiresAuth", true))
        .unwrap();
}

// ---- guards ----

#[tokio::test]
async fn test_before_each_redirects_to_login() {
    let f = fixture();
    routes(&f);
    f.router.before_each(guard_fn(|to, _| {
        let protected = to.meta_flag("requiresAuth");
        async move {
            if protected {
                NavigationAction::redirect("/login")
            } else {
                NavigationAction::Continue
            }
        }
    }));

    let location = committed(f.router.navigate("/admin", NavigateOptions::default()).await);
    assert_eq!(location.path, "/login");
    assert_eq!(f.mount.html(), "<h1>Login</h1>");
    assert_eq!(f.history.paths(), ["/", "/login"]);
}

#[tokio::test]
async fn test_auth_guard() {
    let f = fixture();
    routes(&f);
    let signed_in = Rc::new(Cell::new(false));
    {
        let signed_in = Rc::clone(&signed_in);
        f.router
            .before_each(AuthGuard::new(move || signed_in.get(), "/login"));
    }

    let location = committed(f.router.navigate("/admin", NavigateOptions::default()).await);
    assert_eq!(location.path, "/login");

    signed_in.set(true);
    let location = committed(f.router.navigate("/admin", NavigateOptions::default()).await);
    assert_eq!(location.path, "/admin");
}

#[tokio::test]
async fn test_deny_keeps_current_route() {
    let f = fixture();
    routes(&f);
    f.router.before_each(guard_fn(|to, _| {
        let allowed = to.path != "/admin";
        async move { NavigationAction::from(allowed) }
    }));

    committed(f.router.navigate("/", NavigateOptions::default()).await);
    let renders = f.mount.render_count();

    let result = f.router.navigate("/admin", NavigateOptions::default()).await;
    assert!(result.is_aborted());
    assert_eq!(f.router.current_route().unwrap().path, "/");
    assert_eq!(f.mount.render_count(), renders);
    assert_eq!(f.mount.html(), "<h1>Home</h1>");
}

#[tokio::test]
async fn test_before_enter_runs_after_global_guards() {
    let f = fixture();
    let order = log();
    {
        let order = Rc::clone(&order);
        f.router.before_each(guard_fn(move |_, _| {
            order.borrow_mut().push("global".into());
            async { NavigationAction::Continue }
        }));
    }
    {
        let order = Rc::clone(&order);
        f.router
            .add(Route::new("/", page("Home")))
            .unwrap()
            .add(
                Route::new("/settings", page("Settings")).before_enter(guard_fn(move |_, _| {
                    order.borrow_mut().push("route".into());
                    async { NavigationAction::deny("unsaved changes") }
                })),
            )
            .unwrap();
    }

    assert!(f.router.navigate("/settings", NavigateOptions::default()).await.is_aborted());
    assert_eq!(entries(&order), ["global", "route"]);

    order.borrow_mut().clear();
    committed(f.router.navigate("/", NavigateOptions::default()).await);
    assert_eq!(entries(&order), ["global"]);
}

#[tokio::test]
async fn test_guard_sees_from_location() {
    let f = fixture();
    routes(&f);
    let seen = log();
    {
        let seen = Rc::clone(&seen);
        f.router.before_each(guard_fn(move |to, from| {
            seen.borrow_mut().push(format!("{} -> {}", from.path, to.path));
            async { NavigationAction::Continue }
        }));
    }

    f.router.navigate("/", NavigateOptions::default()).await;
    f.router.navigate("/login", NavigateOptions::default()).await;
    assert_eq!(entries(&seen), [" -> /", "/ -> /login"]);
}

#[tokio::test]
async fn test_guard_redirect_loop_fails() {
    let f = fixture();
    routes(&f);
    f.router.before_each(guard_fn(|to, _| {
        let target = if to.path == "/" { "/login" } else { "/" };
        async move { NavigationAction::redirect(target) }
    }));

    let error = failed(f.router.navigate("/", NavigateOptions::default()).await);
    assert!(matches!(error, RouterError::RedirectLoop { .. }));
    assert!(f.router.current_route().is_none());
}

// ---- middleware ----

#[tokio::test]
async fn test_middleware_onion_order() {
    let f = fixture();
    let order = log();
    {
        let order = Rc::clone(&order);
        f.router
            .add(Route::new("/", move |_| {
                order.borrow_mut().push("render".into());
                View::Empty
            }))
            .unwrap();
    }
    for name in ["a", "b"] {
        let order = Rc::clone(&order);
        f.router.use_middleware(middleware_fn(move |_cx, next| {
            let order = Rc::clone(&order);
            async move {
                order.borrow_mut().push(format!("{name}:in"));
                next.run().await?;
                order.borrow_mut().push(format!("{name}:out"));
                Ok(())
            }
        }));
    }

    committed(f.router.navigate("/", NavigateOptions::default()).await);
    assert_eq!(
        entries(&order),
        ["a:in", "b:in", "render", "b:out", "a:out"]
    );
}

#[tokio::test]
async fn test_middleware_without_next_aborts() {
    let f = fixture();
    routes(&f);
    f.router
        .use_middleware(middleware_fn(|_cx, _next| async { Ok(()) }));

    let result = f.router.navigate("/", NavigateOptions::default()).await;
    assert!(result.is_aborted());
    assert!(f.router.current_route().is_none());
    assert_eq!(f.mount.render_count(), 0);
}

#[tokio::test]
async fn test_middleware_error_fails_navigation() {
    let f = fixture();
    routes(&f);
    let errors = log();
    {
        let errors = Rc::clone(&errors);
        f.router.on_error(move |error| errors.borrow_mut().push(error.to_string()));
    }
    f.router.use_middleware(middleware_fn(|cx, next| async move {
        if cx.to.path == "/admin" {
            return Err(RouterError::custom("maintenance"));
        }
        next.run().await
    }));

    let error = failed(f.router.navigate("/admin", NavigateOptions::default()).await);
    assert_eq!(error.to_string(), "maintenance");
    assert_eq!(entries(&errors), ["maintenance"]);

    assert!(f.router.navigate("/", NavigateOptions::default()).await.is_committed());
}

#[tokio::test]
async fn test_middleware_sees_both_locations() {
    let f = fixture();
    routes(&f);
    let seen = log();
    {
        let seen = Rc::clone(&seen);
        f.router.use_middleware(middleware_fn(move |cx, next| {
            let seen = Rc::clone(&seen);
            async move {
                let current = cx.router.current_route().map(|r| r.path).unwrap_or_default();
                seen.borrow_mut()
                    .push(format!("{} -> {} (current {})", cx.from.path, cx.to.path, current));
                next.run().await
            }
        }));
    }

    f.router.navigate("/", NavigateOptions::default()).await;
    f.router.navigate("/login", NavigateOptions::default()).await;
    assert_eq!(
        entries(&seen),
        [" -> / (current )", "/ -> /login (current /)"]
    );
}

struct Timing {
    runs: Rc<Cell<usize>>,
}

impl Middleware for Timing {
    fn handle<'a>(&'a self, _cx: Rc<NavigationContext>, next: Next) -> MiddlewareFuture<'a> {
        Box::pin(async move {
            next.run().await?;
            self.runs.set(self.runs.get() + 1);
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "Timing"
    }
}

#[tokio::test]
async fn test_struct_middleware() {
    let f = fixture();
    routes(&f);
    let runs = Rc::new(Cell::new(0));
    f.router.use_middleware(Timing {
        runs: Rc::clone(&runs),
    });

    f.router.navigate("/", NavigateOptions::default()).await;
    f.router.navigate("/nowhere", NavigateOptions::default()).await;
    assert_eq!(runs.get(), 1);
}
