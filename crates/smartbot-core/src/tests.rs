#[cfg(test)]
mod tests {
    use crate::auth::*;
    use crate::client::ApiClient;
    use crate::event_bus::EventBus;
    use crate::manager::SessionManager;
    use crate::ports::*;
    use crate::services::*;
    use crate::shell::{AppShell, ShellState};
    use crate::store::SessionStore;
    use smartbot_types::config::ApiConfig;
    use smartbot_types::event::SessionEvent;
    use smartbot_types::route::Route;
    use smartbot_types::session::*;
    use smartbot_types::{Result, SmartBotError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    const BASE: &str = "http://127.0.0.1:8000/api/";

    // ─── Mocks ───────────────────────────────────────────────

    /// In-memory key-value slot that counts removals
    struct MemorySlot {
        data: RefCell<HashMap<String, String>>,
        removes: Cell<usize>,
    }

    impl MemorySlot {
        fn new() -> Self {
            Self {
                data: RefCell::new(HashMap::new()),
                removes: Cell::new(0),
            }
        }

        fn seed(&self, raw: &str) {
            self.data.borrow_mut().insert("user".to_string(), raw.to_string());
        }

        fn raw(&self) -> Option<String> {
            self.data.borrow().get("user").cloned()
        }
    }

    impl KeyValuePort for MemorySlot {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.data.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.removes.set(self.removes.get() + 1);
            self.data.borrow_mut().remove(key);
            Ok(())
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    /// Future that is pending exactly once, to interleave requests.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    type Handler = Box<dyn Fn(&str, &HttpRequest) -> Result<HttpResponse>>;

    /// Backend stub: answers by path and records every request
    struct MockHttp {
        handler: Handler,
        requests: RefCell<Vec<HttpRequest>>,
        yield_paths: Vec<&'static str>,
        yield_all: bool,
    }

    impl MockHttp {
        fn new(handler: impl Fn(&str, &HttpRequest) -> Result<HttpResponse> + 'static) -> Self {
            Self {
                handler: Box::new(handler),
                requests: RefCell::new(Vec::new()),
                yield_paths: Vec::new(),
                yield_all: false,
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl HttpPort for MockHttp {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
            let path = req.url.strip_prefix(BASE).unwrap_or(&req.url).to_string();
            self.requests.borrow_mut().push(req.clone());
            if self.yield_all || self.yield_paths.iter().any(|p| path.starts_with(p)) {
                YieldOnce(false).await;
            }
            (self.handler)(&path, &req)
        }
    }

    struct MockNavigator {
        start: Route,
        redirects: RefCell<Vec<Route>>,
    }

    impl MockNavigator {
        fn at(start: Route) -> Self {
            Self {
                start,
                redirects: RefCell::new(Vec::new()),
            }
        }
    }

    impl Navigator for MockNavigator {
        fn redirect(&self, route: Route) {
            self.redirects.borrow_mut().push(route);
        }

        fn current_route(&self) -> Route {
            self.start
        }
    }

    fn ok(body: Value) -> Result<HttpResponse> {
        Ok(HttpResponse::new(200, body))
    }

    fn status(code: u16, body: Value) -> Result<HttpResponse> {
        Ok(HttpResponse::new(code, body))
    }

    struct Fixture {
        slot: Rc<MemorySlot>,
        http: Rc<MockHttp>,
        manager: Rc<SessionManager>,
        client: ApiClient,
        auth: AuthService,
    }

    fn fixture(http: MockHttp) -> Fixture {
        let slot = Rc::new(MemorySlot::new());
        let http = Rc::new(http);
        let store = SessionStore::new(slot.clone(), "user");
        let manager = Rc::new(SessionManager::new(store, EventBus::new()));
        let client = ApiClient::new(ApiConfig::default(), http.clone(), manager.clone());
        let auth = AuthService::new(client.clone());
        Fixture {
            slot,
            http,
            manager,
            client,
            auth,
        }
    }

    fn signed_in(http: MockHttp, token: &str) -> Fixture {
        let f = fixture(http);
        f.slot.seed(&json!({ "token": token, "username": "alice", "user_id": 1 }).to_string());
        f
    }

    // Simple executor for single-threaded tests (we're not in WASM here)
    fn block_on<F: Future<Output = T>, T>(f: F) -> T {
        use std::sync::Arc;
        use std::task::{Wake, Waker};

        struct NoopWaker;
        impl Wake for NoopWaker {
            fn wake(self: Arc<Self>) {}
        }

        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(val) => return val,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    // ─── EventBus Tests ──────────────────────────────────────

    #[test]
    fn test_event_bus_new_is_empty() {
        let bus: EventBus = EventBus::new();
        assert!(!bus.has_pending());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        bus.emit(SessionEvent::SignedOut);
        bus.emit(SessionEvent::Invalidated { path: "messages/".to_string() });
        assert!(bus.has_pending());

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        bus1.emit(SessionEvent::SignedOut);
        assert!(bus2.has_pending());
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    #[test]
    fn test_event_bus_generic_payload() {
        let bus: EventBus<u32> = EventBus::new();
        bus.emit(1);
        bus.emit(2);
        assert_eq!(bus.drain(), vec![1, 2]);
    }

    // ─── SessionStore Tests ──────────────────────────────────

    fn store_over(slot: &Rc<MemorySlot>) -> SessionStore {
        SessionStore::new(slot.clone(), "user")
    }

    #[test]
    fn test_store_missing_slot_reads_none() {
        let slot = Rc::new(MemorySlot::new());
        assert!(store_over(&slot).read().is_none());
    }

    #[test]
    fn test_store_malformed_content_reads_none() {
        let slot = Rc::new(MemorySlot::new());
        slot.seed("this is {not json");
        let store = store_over(&slot);
        assert!(store.read().is_none());
        assert!(store.is_occupied());
    }

    #[test]
    fn test_store_tokenless_record_reads_none() {
        let slot = Rc::new(MemorySlot::new());
        slot.seed(r#"{"username": "alice"}"#);
        assert!(store_over(&slot).read().is_none());

        slot.seed(r#"{"token": "", "username": "alice"}"#);
        assert!(store_over(&slot).read().is_none());
    }

    #[test]
    fn test_store_write_then_read() {
        let slot = Rc::new(MemorySlot::new());
        let store = store_over(&slot);
        let mut session = Session::new("abc");
        session.username = Some("alice".to_string());
        store.write(&session).unwrap();
        assert_eq!(store.read(), Some(session));
    }

    #[test]
    fn test_store_clear() {
        let slot = Rc::new(MemorySlot::new());
        let store = store_over(&slot);
        store.write(&Session::new("abc")).unwrap();
        store.clear();
        assert!(store.read().is_none());
        assert!(!store.is_occupied());
    }

    // ─── SessionManager Tests ────────────────────────────────

    #[test]
    fn test_accessor_is_idempotent_without_session() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let first = f.manager.current();
        let second = f.manager.current();
        assert_eq!(first, second);
        assert!(first.is_none());
        assert!(f.http.requests().is_empty());
    }

    #[test]
    fn test_accessor_is_idempotent_with_session() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        assert_eq!(f.manager.current(), f.manager.check_auth());
        assert!(f.manager.is_authenticated());
    }

    #[test]
    fn test_establish_bumps_epoch_and_emits() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let before = f.manager.epoch();
        f.manager.establish(Session::new("abc")).unwrap();
        assert_eq!(f.manager.epoch(), before + 1);
        assert_eq!(f.manager.token().as_deref(), Some("abc"));

        let events = f.manager.events().drain();
        assert!(matches!(events.as_slice(), [SessionEvent::Established { .. }]));
    }

    #[test]
    fn test_invalidate_only_once_per_epoch() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        let epoch = f.manager.epoch();
        assert!(f.manager.invalidate(epoch, "messages/"));
        assert!(!f.manager.invalidate(epoch, "templates/"));
        assert!(f.manager.current().is_none());
        assert_eq!(f.slot.removes.get(), 1);
        assert_eq!(f.manager.events().drain().len(), 1);
    }

    #[test]
    fn test_merge_profile_refuses_stale_epoch() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        let stale = f.manager.epoch();
        f.manager.establish(Session::new("fresh")).unwrap();

        let profile = serde_json::from_value(json!({ "email": "x@y.z" })).unwrap();
        let result = f.manager.merge_profile(stale, &profile);
        assert!(matches!(result, Err(SmartBotError::Unauthenticated)));
        assert!(f.manager.current().unwrap().email.is_none());
    }

    #[test]
    fn test_validate_on_boot_wipes_corrupt_slot() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        f.slot.seed("garbage");
        assert!(f.manager.validate_on_boot().is_none());
        assert!(f.slot.raw().is_none());
    }

    // ─── ApiClient Tests ─────────────────────────────────────

    #[test]
    fn test_authorization_header_exact_format() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!([]))), "XYZ123");
        block_on(f.client.get("bot-configurations/")).unwrap();

        let requests = f.http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("Authorization"), Some("Token XYZ123"));
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].url, "http://127.0.0.1:8000/api/bot-configurations/");
        assert_eq!(requests[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_unauthenticated_request_has_no_header() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        block_on(f.client.post("accounts/register/", json!({}))).unwrap();
        let requests = f.http.requests();
        assert!(requests[0].header("Authorization").is_none());
        assert_eq!(requests[0].body, Some(json!({})));
    }

    #[test]
    fn test_success_returns_body() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!([{ "id": 1 }]))), "t");
        let body = block_on(f.client.get("response-templates/")).unwrap();
        assert_eq!(body, json!([{ "id": 1 }]));
    }

    #[test]
    fn test_get_json_decodes() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({ "count": 3 }))), "t");
        let stats: HashMap<String, u32> = block_on(f.client.get_json("dashboard-stats/")).unwrap();
        assert_eq!(stats["count"], 3);
    }

    #[test]
    fn test_401_clears_session_and_forwards_error() {
        let f = signed_in(
            MockHttp::new(|_, _| status(401, json!({ "detail": "Invalid token." }))),
            "expired",
        );
        let err = block_on(f.client.get("messages/")).unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(err.body().unwrap()["detail"], "Invalid token.");
        assert!(f.manager.current().is_none());
        let events = f.manager.events().drain();
        assert_eq!(events, vec![SessionEvent::Invalidated { path: "messages/".to_string() }]);
    }

    #[test]
    fn test_403_leaves_session_alone() {
        let f = signed_in(MockHttp::new(|_, _| status(403, json!({ "detail": "Forbidden" }))), "t");
        let err = block_on(f.client.delete("email-accounts/4/")).unwrap_err();
        assert!(err.is_forbidden());
        assert!(f.manager.is_authenticated());
        assert!(!f.manager.events().has_pending());
    }

    #[test]
    fn test_other_errors_carry_status_body_and_path() {
        let f = signed_in(
            MockHttp::new(|_, _| status(400, json!({ "name": ["This field is required."] }))),
            "t",
        );
        let err = block_on(f.client.post("bot-configurations/", json!({}))).unwrap_err();
        match err {
            SmartBotError::Http { status, body, path } => {
                assert_eq!(status, 400);
                assert_eq!(body["name"][0], "This field is required.");
                assert_eq!(path, "bot-configurations/");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(f.manager.is_authenticated());
    }

    #[test]
    fn test_network_failure_passes_through() {
        let f = signed_in(
            MockHttp::new(|_, _| Err(SmartBotError::Network("connection refused".to_string()))),
            "t",
        );
        let err = block_on(f.client.get("messages/")).unwrap_err();
        assert!(matches!(err, SmartBotError::Network(_)));
        assert!(f.manager.is_authenticated());
    }

    #[test]
    fn test_concurrent_401s_clear_and_redirect_once() {
        let mut http = MockHttp::new(|_, _| status(401, json!({})));
        http.yield_all = true;
        let f = signed_in(http, "expired");
        let navigator = Rc::new(MockNavigator::at(Route::Dashboard));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        shell.boot();
        assert!(shell.is_authenticated());

        let (a, b, c) = block_on(futures::future::join3(
            f.client.get("messages/"),
            f.client.get("bot-configurations/"),
            f.client.get("response-templates/"),
        ));
        assert!(a.unwrap_err().is_auth_failure());
        assert!(b.unwrap_err().is_auth_failure());
        assert!(c.unwrap_err().is_auth_failure());

        assert_eq!(f.slot.removes.get(), 1);
        shell.sync();
        assert_eq!(*navigator.redirects.borrow(), vec![Route::Login]);
        assert_eq!(shell.route(), Route::Login);
        assert_eq!(*shell.state(), ShellState::Unauthenticated);
    }

    // ─── AuthService Tests ───────────────────────────────────

    #[test]
    fn test_login_persists_session() {
        let f = fixture(MockHttp::new(|path, _| {
            assert_eq!(path, LOGIN_PATH);
            ok(json!({ "token": "abc", "username": "u" }))
        }));
        let outcome = block_on(f.auth.login("u", "p")).unwrap();

        assert_eq!(outcome.session().unwrap().token, "abc");
        let current = f.manager.current().unwrap();
        assert_eq!(current.token, "abc");
        assert_eq!(current.username.as_deref(), Some("u"));
        assert_eq!(
            f.http.requests()[0].body,
            Some(json!({ "username": "u", "password": "p" }))
        );
    }

    #[test]
    fn test_login_without_token_is_lenient() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({ "message": "check your email" }))));
        let outcome = block_on(f.auth.login("u", "p")).unwrap();
        assert_eq!(outcome, LoginOutcome::Tokenless(json!({ "message": "check your email" })));
        assert!(f.manager.current().is_none());
    }

    #[test]
    fn test_login_bad_credentials_is_an_error() {
        let f = fixture(MockHttp::new(|_, _| status(401, json!({ "error": "Identifiants invalides" }))));
        let err = block_on(f.auth.login("u", "wrong")).unwrap_err();
        assert!(err.is_auth_failure());
        assert!(f.manager.current().is_none());
    }

    #[test]
    fn test_logout_succeeds_when_backend_unreachable() {
        let f = signed_in(
            MockHttp::new(|_, _| Err(SmartBotError::Network("offline".to_string()))),
            "abc",
        );
        let outcome = block_on(f.auth.logout());
        assert!(outcome.success);
        assert!(!outcome.server_acknowledged);
        assert!(f.manager.current().is_none());
    }

    #[test]
    fn test_logout_sends_token() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({ "message": "ok" }))), "abc");
        let outcome = block_on(f.auth.logout());
        assert!(outcome.server_acknowledged);

        let requests = f.http.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.ends_with(LOGOUT_PATH));
        assert_eq!(requests[0].header("Authorization"), Some("Token abc"));
        assert!(f.manager.current().is_none());
        assert!(f
            .manager
            .events()
            .drain()
            .contains(&SessionEvent::SignedOut));
    }

    #[test]
    fn test_logout_with_expired_token_ends_session_once() {
        let f = signed_in(MockHttp::new(|_, _| status(401, json!({ "detail": "Invalid token." }))), "old");
        let outcome = block_on(f.auth.logout());
        assert!(outcome.success);
        assert!(!outcome.server_acknowledged);
        assert!(f.manager.current().is_none());
        assert_eq!(f.slot.removes.get(), 1);
        assert_eq!(
            f.manager.events().drain(),
            vec![SessionEvent::Invalidated {
                path: LOGOUT_PATH.to_string()
            }]
        );
    }

    #[test]
    fn test_logout_without_session_skips_server() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let outcome = block_on(f.auth.logout());
        assert!(outcome.success);
        assert!(f.http.requests().is_empty());
    }

    #[test]
    fn test_register_does_not_sign_in() {
        let f = fixture(MockHttp::new(|_, _| {
            status(201, json!({ "username": "bob", "email": "bob@example.com" }))
        }));
        let req = RegisterRequest {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let account = block_on(f.auth.register(&req)).unwrap();
        assert_eq!(account["username"], "bob");
        assert!(f.manager.current().is_none());

        let body = f.http.requests()[0].body.clone().unwrap();
        assert_eq!(body["password2"], "pw");
    }

    #[test]
    fn test_register_and_login() {
        let f = fixture(MockHttp::new(|path, _| match path {
            REGISTER_PATH => status(201, json!({ "username": "bob" })),
            LOGIN_PATH => ok(json!({ "token": "new", "username": "bob" })),
            _ => status(404, json!({})),
        }));
        let req = RegisterRequest {
            username: "bob".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        match block_on(f.auth.register_and_login(&req)).unwrap() {
            RegistrationOutcome::LoggedIn(session) => assert_eq!(session.token, "new"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_register_then_login_failure_is_reported() {
        let f = fixture(MockHttp::new(|path, _| match path {
            REGISTER_PATH => status(201, json!({ "username": "bob" })),
            _ => Err(SmartBotError::Network("offline".to_string())),
        }));
        let req = RegisterRequest {
            username: "bob".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let outcome = block_on(f.auth.register_and_login(&req)).unwrap();
        assert!(matches!(outcome, RegistrationOutcome::LoginFailed { .. }));
        assert!(f.manager.current().is_none());
    }

    #[test]
    fn test_fetch_profile_requires_session() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let err = block_on(f.auth.fetch_user_profile()).unwrap_err();
        assert!(matches!(err, SmartBotError::Unauthenticated));
        assert!(f.http.requests().is_empty());
    }

    #[test]
    fn test_fetch_profile_merges_and_keeps_token() {
        let f = signed_in(
            MockHttp::new(|_, _| {
                ok(json!({
                    "id": 1,
                    "username": "alice",
                    "email": "alice@example.com",
                    "first_name": "Alice",
                    "last_name": "Martin",
                    "date_joined": "2024-01-02T03:04:05Z",
                    "last_login": "2024-06-01T08:00:00Z",
                }))
            }),
            "abc",
        );
        let session = block_on(f.auth.fetch_user_profile()).unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.first_name.as_deref(), Some("Alice"));
        assert_eq!(session.user_id, Some(1));

        let persisted = f.manager.current().unwrap();
        assert_eq!(persisted, session);
    }

    #[test]
    fn test_stale_profile_does_not_resurrect_session() {
        let mut http = MockHttp::new(|path, _| match path {
            PROFILE_PATH => ok(json!({ "email": "alice@example.com" })),
            _ => status(401, json!({})),
        });
        http.yield_paths = vec![PROFILE_PATH];
        let f = signed_in(http, "abc");

        let (profile, other) = block_on(futures::future::join(
            f.auth.fetch_user_profile(),
            f.client.get("messages/"),
        ));

        assert!(other.unwrap_err().is_auth_failure());
        assert!(matches!(profile, Err(SmartBotError::Unauthenticated)));
        assert!(f.manager.current().is_none());
        assert!(f.slot.raw().is_none());
    }

    #[test]
    fn test_update_profile_refetches() {
        let f = signed_in(
            MockHttp::new(|path, req| match (req.method, path) {
                (HttpMethod::Put, PROFILE_PATH) => ok(json!({ "first_name": "Ally" })),
                (HttpMethod::Get, PROFILE_PATH) => ok(json!({
                    "first_name": "Ally",
                    "last_login": "2024-06-01T08:00:00Z",
                })),
                _ => status(404, json!({})),
            }),
            "abc",
        );
        let update = ProfileUpdate {
            first_name: Some("Ally".to_string()),
            ..Default::default()
        };
        let session = block_on(f.auth.update_profile(&update)).unwrap();
        assert_eq!(session.first_name.as_deref(), Some("Ally"));
        assert_eq!(session.last_login.as_deref(), Some("2024-06-01T08:00:00Z"));

        let methods: Vec<HttpMethod> = f.http.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Put, HttpMethod::Get]);
    }

    #[test]
    fn test_change_password_keeps_session() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({ "message": "ok" }))), "abc");
        let before = f.manager.current();
        block_on(f.auth.change_password("old", "new")).unwrap();

        let body = f.http.requests()[0].body.clone().unwrap();
        assert_eq!(body["new_password2"], "new");
        assert_eq!(f.manager.current(), before);
    }

    #[test]
    fn test_change_password_validation_error_forwarded() {
        let f = signed_in(
            MockHttp::new(|_, _| status(400, json!({ "old_password": ["Mot de passe incorrect."] }))),
            "abc",
        );
        let err = block_on(f.auth.change_password("bad", "new")).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(f.manager.is_authenticated());
    }

    // ─── AppShell Tests ──────────────────────────────────────

    #[test]
    fn test_shell_starts_loading() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let shell = AppShell::new(f.manager.clone(), Rc::new(MockNavigator::at(Route::Home)));
        assert!(shell.is_loading());
    }

    #[test]
    fn test_shell_boot_without_session() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let navigator = Rc::new(MockNavigator::at(Route::Home));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        assert_eq!(*shell.boot(), ShellState::Unauthenticated);
        assert_eq!(shell.route(), Route::Home);
        assert!(navigator.redirects.borrow().is_empty());
        assert!(f.http.requests().is_empty());
    }

    #[test]
    fn test_shell_boot_with_session() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        let mut shell = AppShell::new(f.manager.clone(), Rc::new(MockNavigator::at(Route::Messages)));
        shell.boot();
        assert!(shell.is_authenticated());
        assert_eq!(shell.user().unwrap().token, "abc");
        assert_eq!(shell.route(), Route::Messages);
    }

    #[test]
    fn test_shell_boot_redirects_protected_route() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        f.slot.seed("{broken");
        let navigator = Rc::new(MockNavigator::at(Route::Profile));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        shell.boot();
        assert_eq!(shell.route(), Route::Login);
        assert_eq!(*navigator.redirects.borrow(), vec![Route::Login]);
        assert!(f.slot.raw().is_none());
    }

    #[test]
    fn test_shell_rechecks_session_on_navigation() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        let navigator = Rc::new(MockNavigator::at(Route::Dashboard));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        shell.boot();

        // Session vanishes underneath the shell without it seeing an event
        f.slot.data.borrow_mut().clear();
        assert!(shell.is_authenticated());

        assert_eq!(shell.navigate(Route::Templates), Route::Login);
        assert_eq!(*shell.state(), ShellState::Unauthenticated);
        assert_eq!(*navigator.redirects.borrow(), vec![Route::Login]);
    }

    #[test]
    fn test_shell_verify_asks_manager() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({}))), "abc");
        let navigator = Rc::new(MockNavigator::at(Route::Messages));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        shell.boot();
        assert!(shell.verify());
        assert!(navigator.redirects.borrow().is_empty());

        f.slot.data.borrow_mut().clear();
        assert!(shell.is_authenticated());
        assert!(!shell.verify());
        assert_eq!(*shell.state(), ShellState::Unauthenticated);
        assert_eq!(shell.route(), Route::Login);
        assert_eq!(*navigator.redirects.borrow(), vec![Route::Login]);
    }

    #[test]
    fn test_shell_verify_on_public_route_does_not_redirect() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let navigator = Rc::new(MockNavigator::at(Route::Home));
        let mut shell = AppShell::new(f.manager.clone(), navigator.clone());
        shell.boot();
        assert!(!shell.verify());
        assert_eq!(shell.route(), Route::Home);
        assert!(navigator.redirects.borrow().is_empty());
    }

    #[test]
    fn test_shell_public_routes_need_no_session() {
        let f = fixture(MockHttp::new(|_, _| ok(json!({}))));
        let mut shell = AppShell::new(f.manager.clone(), Rc::new(MockNavigator::at(Route::Home)));
        shell.boot();
        assert_eq!(shell.navigate(Route::Register), Route::Register);
    }

    #[test]
    fn test_shell_follows_login_and_logout() {
        let f = fixture(MockHttp::new(|path, _| match path {
            LOGIN_PATH => ok(json!({ "token": "abc", "username": "u" })),
            _ => ok(json!({})),
        }));
        let mut shell = AppShell::new(f.manager.clone(), Rc::new(MockNavigator::at(Route::Login)));
        shell.boot();

        block_on(f.auth.login("u", "p")).unwrap();
        assert!(shell.sync());
        assert!(shell.is_authenticated());
        assert_eq!(shell.navigate(Route::Dashboard), Route::Dashboard);

        block_on(f.auth.logout());
        shell.sync();
        assert_eq!(*shell.state(), ShellState::Unauthenticated);
        assert_eq!(shell.route(), Route::Login);
    }

    // ─── Services Tests ──────────────────────────────────────

    #[test]
    fn test_collection_paths() {
        let f = signed_in(MockHttp::new(|_, req| ok(req.body.clone().unwrap_or(json!({})))), "t");
        let bot = BotService::new(f.client.clone());

        block_on(bot.configurations().list()).unwrap();
        block_on(bot.configurations().get(3)).unwrap();
        let created = block_on(bot.templates().create(&json!({ "name": "Hello" }))).unwrap();
        assert_eq!(created["name"], "Hello");
        block_on(bot.templates().update(5, &json!({ "name": "Bye" }))).unwrap();
        block_on(bot.templates().delete(5)).unwrap();

        let calls: Vec<(HttpMethod, String)> = f
            .http
            .requests()
            .iter()
            .map(|r| (r.method, r.url.trim_start_matches(BASE).to_string()))
            .collect();
        assert_eq!(
            calls,
            vec![
                (HttpMethod::Get, "bot-configurations/".to_string()),
                (HttpMethod::Get, "bot-configurations/3/".to_string()),
                (HttpMethod::Post, "response-templates/".to_string()),
                (HttpMethod::Put, "response-templates/5/".to_string()),
                (HttpMethod::Delete, "response-templates/5/".to_string()),
            ]
        );
    }

    #[test]
    fn test_account_collections() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!([]))), "t");
        let accounts = AccountService::new(f.client.clone());
        assert_eq!(accounts.email_accounts().item_path(2), "email-accounts/2/");
        assert_eq!(accounts.whatsapp_accounts().path(), "whatsapp-accounts/");
        block_on(accounts.whatsapp_accounts().list()).unwrap();
        assert!(f.http.requests()[0].url.ends_with("/api/whatsapp-accounts/"));
    }

    #[test]
    fn test_message_query_string() {
        assert_eq!(MessageQuery::default().to_query_string(), "?page=1");
        let query = MessageQuery {
            page: 3,
            status: Some("pending".to_string()),
            message_type: Some("email".to_string()),
        };
        assert_eq!(query.to_query_string(), "?page=3&status=pending&message_type=email");
    }

    #[test]
    fn test_messages_are_paginated() {
        let f = signed_in(
            MockHttp::new(|_, _| ok(json!({ "count": 23, "results": [{ "id": 1 }, { "id": 2 }] }))),
            "t",
        );
        let bot = BotService::new(f.client.clone());
        let query = MessageQuery {
            page: 2,
            status: Some("replied".to_string()),
            message_type: None,
        };
        let page = block_on(bot.messages(&query)).unwrap();
        assert_eq!(page.count, 23);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total_pages(), 3);
        assert!(f.http.requests()[0].url.ends_with("messages/?page=2&status=replied"));
    }

    #[test]
    fn test_page_from_value_shapes() {
        assert_eq!(Page::from_value(json!([1, 2])).count, 2);
        assert_eq!(Page::from_value(json!({ "results": [1] })).count, 1);
        assert_eq!(Page::from_value(json!(null)), Page::default());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
    }

    #[test]
    fn test_message_status_patch() {
        let f = signed_in(MockHttp::new(|_, _| ok(json!({ "status": "failed" }))), "t");
        let bot = BotService::new(f.client.clone());
        block_on(bot.update_message_status(9, "failed")).unwrap();
        let req = &f.http.requests()[0];
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.body, Some(json!({ "status": "failed" })));
        assert!(req.url.ends_with("messages/9/"));
    }

    #[test]
    fn test_reply_creates_response_then_marks_replied() {
        let f = signed_in(MockHttp::new(|_, req| ok(req.body.clone().unwrap_or(json!({})))), "t");
        let bot = BotService::new(f.client.clone());
        let created = block_on(bot.reply_to_message(4, "Merci !", Some(2))).unwrap();
        assert_eq!(created["template_used"], 2);

        let requests = f.http.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert!(requests[0].url.ends_with("message-responses/"));
        assert_eq!(
            requests[0].body,
            Some(json!({ "original_message": 4, "content": "Merci !", "template_used": 2 }))
        );
        assert_eq!(requests[1].method, HttpMethod::Patch);
        assert_eq!(requests[1].body, Some(json!({ "status": STATUS_REPLIED })));
    }

    #[test]
    fn test_failed_reply_leaves_status_alone() {
        let f = signed_in(MockHttp::new(|_, _| status(400, json!({ "content": ["required"] }))), "t");
        let bot = BotService::new(f.client.clone());
        assert!(block_on(bot.reply_to_message(4, "", None)).is_err());
        assert_eq!(f.http.requests().len(), 1);
    }

    #[test]
    fn test_dashboard_helpers_fall_back() {
        let f = signed_in(MockHttp::new(|_, _| status(500, json!("boom"))), "t");
        let bot = BotService::new(f.client.clone());
        let accounts = AccountService::new(f.client.clone());
        assert_eq!(block_on(bot.dashboard_stats()), json!({}));
        assert_eq!(block_on(bot.intents()), json!([]));
        assert_eq!(block_on(bot.recent_messages()), Page::default());
        assert_eq!(block_on(accounts.user_activities()), json!([]));
        assert_eq!(block_on(accounts.accounts_summary()), json!({}));
        assert!(f.manager.is_authenticated());
    }

    #[test]
    fn test_intent_categories() {
        let f = signed_in(
            MockHttp::new(|path, _| match path {
                "api/intent-categories/" => ok(json!([{ "id": 1, "name": "Support" }])),
                _ => status(404, json!({})),
            }),
            "t",
        );
        let bot = BotService::new(f.client.clone());
        assert_eq!(block_on(bot.intent_categories()), json!([{ "id": 1, "name": "Support" }]));

        let down = signed_in(MockHttp::new(|_, _| status(500, json!("boom"))), "t");
        let bot = BotService::new(down.client.clone());
        assert_eq!(block_on(bot.intent_categories()), json!([]));
    }

    #[test]
    fn test_dashboard_fallback_still_invalidates_on_401() {
        let f = signed_in(MockHttp::new(|_, _| status(401, json!({}))), "t");
        let bot = BotService::new(f.client.clone());
        assert_eq!(block_on(bot.dashboard_stats()), json!({}));
        assert!(f.manager.current().is_none());
    }
}
