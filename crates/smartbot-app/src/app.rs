//! Main egui application — composes the views and runs backend calls.

use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use smartbot_core::auth::AuthService;
use smartbot_core::client::ApiClient;
use smartbot_core::event_bus::EventBus;
use smartbot_core::manager::SessionManager;
use smartbot_core::ports::{HttpPort, KeyValuePort, Navigator};
use smartbot_core::services::{AccountService, BotService, Collection, MessageQuery};
use smartbot_core::shell::AppShell;
use smartbot_core::store::SessionStore;
use smartbot_platform::storage::auto_detect_storage;
use smartbot_platform::{BrowserNavigator, GlooHttpClient};
use smartbot_types::config::AppConfig;
use smartbot_types::route::Route;
use smartbot_ui::panels::{auth, dashboard, messages, nav, profile, resources};
use smartbot_ui::state::{ResourceKind, UiCommand, UiEvent, UiState};
use smartbot_ui::theme;

const CONFIG_STORAGE_KEY: &str = "smartbot:config";

/// Backend-facing handles, cheap to clone into spawned tasks
#[derive(Clone)]
struct Services {
    auth: AuthService,
    bot: BotService,
    accounts: AccountService,
    events: EventBus<UiEvent>,
}

impl Services {
    fn collection(&self, kind: ResourceKind) -> Option<&Collection> {
        match kind {
            ResourceKind::BotConfigurations => Some(self.bot.configurations()),
            ResourceKind::ResponseTemplates => Some(self.bot.templates()),
            ResourceKind::EmailAccounts => Some(self.accounts.email_accounts()),
            ResourceKind::WhatsAppAccounts => Some(self.accounts.whatsapp_accounts()),
            ResourceKind::Intents | ResourceKind::IntentCategories => None,
        }
    }

    async fn load_resource(&self, kind: ResourceKind) {
        let result = match (self.collection(kind), kind) {
            (Some(collection), _) => collection.list().await,
            (None, ResourceKind::IntentCategories) => Ok(self.bot.intent_categories().await),
            (None, _) => Ok(self.bot.intents().await),
        };
        self.events.emit(UiEvent::ResourceLoaded { kind, result });
    }

    async fn load_messages(&self, query: MessageQuery) {
        let result = self.bot.messages(&query).await;
        self.events.emit(UiEvent::MessagesLoaded(result));
    }
}

/// The main application state
pub struct SmartBotApp {
    ui_state: UiState,
    shell: AppShell,
    navigator: Rc<dyn Navigator>,
    services: Services,
    /// Route whose data was last requested
    entered: Option<Route>,
    first_frame: bool,
}

impl SmartBotApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let storage = auto_detect_storage();
        let config = Self::restore_config(storage.as_ref());

        let store = SessionStore::new(storage, config.api.session_key.clone());
        let manager = Rc::new(SessionManager::new(store, EventBus::new()));
        let http: Rc<dyn HttpPort> = Rc::new(GlooHttpClient::new(config.api.timeout_ms));
        let client = ApiClient::new(config.api.clone(), http, manager.clone());

        let navigator: Rc<dyn Navigator> = Rc::new(BrowserNavigator::new());
        let mut shell = AppShell::new(manager, navigator.clone());
        shell.boot();
        log::info!("Booted on {} (authenticated: {})", shell.route().path(), shell.is_authenticated());

        Self {
            ui_state: UiState::new(),
            shell,
            navigator,
            services: Services {
                auth: AuthService::new(client.clone()),
                bot: BotService::new(client.clone()),
                accounts: AccountService::new(client),
                events: EventBus::new(),
            },
            entered: None,
            first_frame: true,
        }
    }

    /// Restore config from storage, falling back to defaults
    fn restore_config(storage: &dyn KeyValuePort) -> AppConfig {
        match storage.get(CONFIG_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AppConfig>(&raw) {
                Ok(config) => {
                    log::info!("Config restored from {}", storage.backend_name());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring malformed config: {}", e);
                    AppConfig::default()
                }
            },
            Ok(None) => AppConfig::default(),
            Err(e) => {
                log::warn!("Cannot read config: {}", e);
                AppConfig::default()
            }
        }
    }

    /// Move to `route` through the shell's guard and load its data.
    fn navigate(&mut self, route: Route) {
        let target = self.shell.navigate(route);
        if self.navigator.current_route() != target {
            self.navigator.redirect(target);
        }
    }

    /// Fetch what the current route shows, once per visit.
    fn enter_route(&mut self, ctx: &egui::Context) {
        let route = self.shell.route();
        if self.entered == Some(route) {
            return;
        }
        self.entered = Some(route);
        if !route.is_protected() || !self.shell.verify() {
            return;
        }
        match route {
            Route::Dashboard => self.dispatch(UiCommand::LoadDashboard, ctx),
            Route::Profile => self.dispatch(UiCommand::LoadProfile, ctx),
            Route::Messages => {
                self.dispatch(UiCommand::LoadMessages, ctx);
                self.dispatch(UiCommand::LoadResource(ResourceKind::ResponseTemplates), ctx);
            }
            other => {
                for kind in ResourceKind::for_route(other) {
                    self.dispatch(UiCommand::LoadResource(*kind), ctx);
                }
            }
        }
    }
}

impl eframe::App for SmartBotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Session changes first, so views never render a stale user
        if self.shell.sync() {
            ctx.request_repaint();
        }

        let events = self.services.events.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }
        if let Some(follow_up) = self.ui_state.take_follow_up() {
            self.dispatch(follow_up, ctx);
        }
        if let Some(route) = self.ui_state.pending_route.take() {
            self.navigate(route);
        }

        // Back/forward buttons and typed URLs change the hash under us
        let location = self.navigator.current_route();
        if location != self.shell.route() {
            self.navigate(location);
        }
        self.enter_route(ctx);

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        if self.shell.is_loading() {
            CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| ui.spinner());
            });
            return;
        }

        let mut command = None;
        let route = self.shell.route();

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            command = nav::top_bar(
                ui,
                self.shell.user(),
                &self.ui_state.status_text,
                self.ui_state.is_busy(),
            );
        });

        // ── Sidebar ──────────────────────────────────────────
        if route.is_protected() && self.shell.is_authenticated() {
            SidePanel::left("sidebar")
                .resizable(false)
                .exact_width(200.0)
                .show(ctx, |ui| {
                    if let Some(cmd) = nav::sidebar(ui, route) {
                        command = Some(cmd);
                    }
                });
        }

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            let user = self.shell.user();
            let state = &mut self.ui_state;
            let action = match route {
                Route::Home => auth::home_page(ui, user.is_some()),
                Route::Login => auth::login_page(ui, &mut state.login),
                Route::Register => auth::register_page(ui, &mut state.register),
                _ if user.is_none() => {
                    ui.label(RichText::new("Redirection...").color(theme::TEXT_SECONDARY));
                    None
                }
                Route::Dashboard => dashboard::dashboard_page(ui, &state.dashboard, user),
                Route::Messages => messages::messages_page(ui, state),
                Route::Profile => profile::profile_page(ui, &mut state.profile, user),
                Route::BotConfig | Route::Templates | Route::Accounts | Route::RulesConfig => {
                    resources::resources_page(ui, route, state)
                }
            };
            if action.is_some() {
                command = action;
            }
        });

        if let Some(cmd) = command {
            self.dispatch(cmd, ctx);
        }
    }
}

impl SmartBotApp {
    /// Run a view command. Navigation is immediate; everything else is a
    /// backend call whose outcome comes back through the UI event bus.
    fn dispatch(&mut self, command: UiCommand, ctx: &egui::Context) {
        if let UiCommand::Navigate(route) = command {
            self.navigate(route);
            return;
        }

        // Protected calls ask the session manager again, not the cached state
        if Self::needs_session(&command) && !self.shell.verify() {
            log::warn!("Session gone before a protected call, back to login");
            return;
        }

        self.ui_state.begin(&command);
        let query = self.ui_state.messages.query();
        let services = self.services.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            Self::run(services, command, query).await;
            ctx.request_repaint();
        });
    }

    fn needs_session(command: &UiCommand) -> bool {
        !matches!(
            command,
            UiCommand::Navigate(_) | UiCommand::Login { .. } | UiCommand::Register(_) | UiCommand::Logout
        )
    }

    async fn run(services: Services, command: UiCommand, query: MessageQuery) {
        let events = &services.events;
        match command {
            UiCommand::Navigate(_) => {}
            UiCommand::Login { username, password } => {
                let result = services.auth.login(&username, &password).await;
                events.emit(UiEvent::LoginFinished(result));
            }
            UiCommand::Register(request) => {
                let result = services.auth.register_and_login(&request).await;
                events.emit(UiEvent::RegistrationFinished(result));
            }
            UiCommand::Logout => {
                let outcome = services.auth.logout().await;
                if !outcome.server_acknowledged {
                    log::info!("Logged out locally; server did not confirm");
                }
                events.emit(UiEvent::LoggedOut);
            }
            UiCommand::LoadDashboard => {
                let (stats, summary, activities, recent) = futures::join!(
                    services.bot.dashboard_stats(),
                    services.accounts.accounts_summary(),
                    services.accounts.user_activities(),
                    services.bot.recent_messages(),
                );
                events.emit(UiEvent::DashboardLoaded {
                    stats,
                    summary,
                    activities,
                    recent,
                });
            }
            UiCommand::LoadProfile => {
                let result = services.auth.fetch_user_profile().await;
                events.emit(UiEvent::ProfileLoaded(result));
            }
            UiCommand::UpdateProfile(update) => {
                let result = services.auth.update_profile(&update).await;
                events.emit(UiEvent::ProfileSaved(result));
            }
            UiCommand::ChangePassword { old_password, new_password } => {
                let result = services.auth.change_password(&old_password, &new_password).await;
                events.emit(UiEvent::PasswordChanged(result));
            }
            UiCommand::LoadResource(kind) => services.load_resource(kind).await,
            UiCommand::SaveResource { kind, id, record } => {
                let Some(collection) = services.collection(kind) else {
                    log::warn!("{} is read-only", kind.label());
                    return;
                };
                let result = match id {
                    Some(id) => collection.update(id, &record).await,
                    None => collection.create(&record).await,
                };
                let saved = result.is_ok();
                events.emit(UiEvent::ResourceSaved { kind, result });
                if saved {
                    services.load_resource(kind).await;
                }
            }
            UiCommand::DeleteResource { kind, id } => {
                let Some(collection) = services.collection(kind) else {
                    log::warn!("{} is read-only", kind.label());
                    return;
                };
                let result = collection.delete(id).await;
                events.emit(UiEvent::ResourceDeleted { kind, result });
                services.load_resource(kind).await;
            }
            UiCommand::LoadMessages => services.load_messages(query).await,
            UiCommand::LoadMessageResponses(id) => {
                let result = services.bot.message_responses(id).await;
                events.emit(UiEvent::MessageResponsesLoaded(result));
            }
            UiCommand::ReplyToMessage { message_id, content, template_id } => {
                let result = services
                    .bot
                    .reply_to_message(message_id, &content, template_id)
                    .await;
                let replied = result.is_ok();
                events.emit(UiEvent::MessageReplied(result));
                if replied {
                    let responses = services.bot.message_responses(message_id).await;
                    events.emit(UiEvent::MessageResponsesLoaded(responses));
                    services.load_messages(query).await;
                }
            }
            UiCommand::DeleteMessage(id) => {
                let result = services.bot.delete_message(id).await;
                events.emit(UiEvent::MessageDeleted(result));
                services.load_messages(query).await;
            }
        }
    }
}
