//! UI-level state that drives rendering.
//!
//! Views never talk to the backend themselves: panels return a
//! [`UiCommand`], the app runs it asynchronously, and the outcome comes back
//! as a [`UiEvent`] folded in by [`UiState::process_events`].

use std::ops::RangeInclusive;
use serde_json::Value;
use smartbot_core::services::{total_pages, MessageQuery, Page};
use smartbot_types::{
    SmartBotError,
    route::Route,
    session::{LoginOutcome, ProfileUpdate, RegisterRequest, RegistrationOutcome, Session},
};

// ─── Commands & Events ───────────────────────────────────────

/// Something a panel wants done
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Navigate(Route),
    Login { username: String, password: String },
    Register(RegisterRequest),
    Logout,
    LoadDashboard,
    LoadProfile,
    UpdateProfile(ProfileUpdate),
    ChangePassword { old_password: String, new_password: String },
    LoadResource(ResourceKind),
    SaveResource { kind: ResourceKind, id: Option<i64>, record: Value },
    DeleteResource { kind: ResourceKind, id: i64 },
    LoadMessages,
    LoadMessageResponses(i64),
    ReplyToMessage { message_id: i64, content: String, template_id: Option<i64> },
    DeleteMessage(i64),
}

/// Outcome of an asynchronous command
#[derive(Debug, Clone)]
pub enum UiEvent {
    LoginFinished(Result<LoginOutcome, SmartBotError>),
    RegistrationFinished(Result<RegistrationOutcome, SmartBotError>),
    LoggedOut,
    DashboardLoaded {
        stats: Value,
        summary: Value,
        activities: Value,
        recent: Page,
    },
    ProfileLoaded(Result<Session, SmartBotError>),
    ProfileSaved(Result<Session, SmartBotError>),
    PasswordChanged(Result<Value, SmartBotError>),
    ResourceLoaded { kind: ResourceKind, result: Result<Value, SmartBotError> },
    ResourceSaved { kind: ResourceKind, result: Result<Value, SmartBotError> },
    ResourceDeleted { kind: ResourceKind, result: Result<Value, SmartBotError> },
    MessagesLoaded(Result<Page, SmartBotError>),
    MessageResponsesLoaded(Result<Page, SmartBotError>),
    MessageReplied(Result<Value, SmartBotError>),
    MessageDeleted(Result<Value, SmartBotError>),
}

/// REST collections edited through the generic resource view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    BotConfigurations,
    ResponseTemplates,
    EmailAccounts,
    WhatsAppAccounts,
    Intents,
    IntentCategories,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::BotConfigurations => "Configurations du bot",
            ResourceKind::ResponseTemplates => "Modèles de réponse",
            ResourceKind::EmailAccounts => "Comptes email",
            ResourceKind::WhatsAppAccounts => "Comptes WhatsApp",
            ResourceKind::Intents => "Intentions",
            ResourceKind::IntentCategories => "Catégories d'intentions",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, ResourceKind::Intents | ResourceKind::IntentCategories)
    }

    /// Collections a route shows, in display order.
    pub fn for_route(route: Route) -> &'static [ResourceKind] {
        match route {
            Route::BotConfig => &[ResourceKind::BotConfigurations],
            Route::Templates => &[ResourceKind::ResponseTemplates],
            Route::Accounts => &[ResourceKind::EmailAccounts, ResourceKind::WhatsAppAccounts],
            Route::RulesConfig => &[
                ResourceKind::IntentCategories,
                ResourceKind::Intents,
                ResourceKind::ResponseTemplates,
            ],
            _ => &[],
        }
    }

    fn index(&self) -> usize {
        match self {
            ResourceKind::BotConfigurations => 0,
            ResourceKind::ResponseTemplates => 1,
            ResourceKind::EmailAccounts => 2,
            ResourceKind::WhatsAppAccounts => 3,
            ResourceKind::Intents => 4,
            ResourceKind::IntentCategories => 5,
        }
    }
}

// ─── View state ──────────────────────────────────────────────

/// Message shown after an action
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub message: String,
    pub success: bool,
}

impl Feedback {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { message: message.into(), success: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), success: false }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub busy: bool,
    pub feedback: Option<Feedback>,
}

impl RegisterForm {
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub old_password: String,
    pub new_password: String,
    pub loading: bool,
    pub feedback: Option<Feedback>,
}

impl ProfileForm {
    pub fn fill_from(&mut self, session: &Session) {
        self.first_name = session.first_name.clone().unwrap_or_default();
        self.last_name = session.last_name.clone().unwrap_or_default();
        self.email = session.email.clone().unwrap_or_default();
        self.phone_number = session
            .extra
            .get("phone_number")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }

    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone_number: Some(self.phone_number.trim().to_string()),
        }
    }
}

/// A loaded REST collection plus its JSON editor
#[derive(Debug, Clone, Default)]
pub struct ResourceList {
    pub items: Vec<Value>,
    pub loading: bool,
    pub feedback: Option<Feedback>,
    /// JSON text of the record being created or edited
    pub editor: String,
    /// `None` while creating, `Some(id)` while editing
    pub editing: Option<i64>,
}

impl ResourceList {
    pub fn start_edit(&mut self, record: &Value) {
        self.editing = record_id(record);
        self.editor = serde_json::to_string_pretty(record).unwrap_or_default();
    }

    pub fn reset_editor(&mut self) {
        self.editing = None;
        self.editor.clear();
    }

    /// Parse the editor text; `Err` holds a message for the user.
    pub fn parsed_editor(&self) -> Result<Value, String> {
        match serde_json::from_str::<Value>(&self.editor) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err("L'enregistrement doit être un objet JSON".to_string()),
            Err(e) => Err(format!("JSON invalide : {}", e)),
        }
    }
}

pub const STATUS_FILTERS: &[(&str, &str)] = &[
    ("all", "Tous les statuts"),
    ("pending", "En attente"),
    ("processed", "Traités"),
    ("replied", "Répondus"),
    ("failed", "Échoués"),
];

pub const TYPE_FILTERS: &[(&str, &str)] = &[
    ("all", "Tous les types"),
    ("email", "Email"),
    ("whatsapp", "WhatsApp"),
];

/// Paginated, filtered message list
#[derive(Debug, Clone)]
pub struct MessageListState {
    pub messages: Vec<Value>,
    pub page: u64,
    pub total_pages: u64,
    pub status_filter: String,
    pub type_filter: String,
    pub loading: bool,
    pub feedback: Option<Feedback>,
    pub selected: Option<Value>,
    pub responses: Vec<Value>,
    pub reply_text: String,
    pub reply_template: Option<i64>,
    /// The current page moved after a load and must be fetched again
    pub reload_requested: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            page: 1,
            total_pages: 1,
            status_filter: "all".to_string(),
            type_filter: "all".to_string(),
            loading: false,
            feedback: None,
            selected: None,
            responses: Vec::new(),
            reply_text: String::new(),
            reply_template: None,
            reload_requested: false,
        }
    }
}

impl MessageListState {
    pub fn query(&self) -> MessageQuery {
        let filter = |f: &str| (f != "all").then(|| f.to_string());
        MessageQuery {
            page: self.page,
            status: filter(&self.status_filter),
            message_type: filter(&self.type_filter),
        }
    }

    /// Returns true when the filter actually changed (and a reload is due).
    pub fn set_status_filter(&mut self, value: &str) -> bool {
        if self.status_filter == value {
            return false;
        }
        self.status_filter = value.to_string();
        self.page = 1;
        true
    }

    pub fn set_type_filter(&mut self, value: &str) -> bool {
        if self.type_filter == value {
            return false;
        }
        self.type_filter = value.to_string();
        self.page = 1;
        true
    }

    /// Jump to `page`, clamped to the known range.
    pub fn go_to_page(&mut self, page: u64) -> bool {
        let page = page.clamp(1, self.total_pages.max(1));
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Store a loaded page. When the result set shrank below the current
    /// page, the page is pulled back to the last one and true is returned:
    /// the rows held are from the old page and a reload is due.
    pub fn apply_page(&mut self, page: Page) -> bool {
        self.total_pages = total_pages(page.count);
        let stale = self.page > self.total_pages && page.count > 0;
        self.page = self.page.min(self.total_pages);
        self.messages = page.results;
        if stale {
            self.reload_requested = true;
        }
        stale
    }

    /// Pick a reply template; its `content` replaces the reply draft.
    pub fn choose_template(&mut self, template_id: Option<i64>, templates: &[Value]) {
        self.reply_template = template_id;
        let Some(id) = template_id else { return };
        let content = templates
            .iter()
            .find(|t| record_id(t) == Some(id))
            .and_then(|t| t.get("content"))
            .and_then(Value::as_str);
        if let Some(content) = content {
            self.reply_text = content.to_string();
        }
    }

    /// Page numbers shown around the current one.
    pub fn page_window(&self) -> RangeInclusive<u64> {
        let start = self.page.saturating_sub(2).max(1);
        let end = (self.page + 2).min(self.total_pages.max(1));
        start..=end
    }

    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub stats: Value,
    pub summary: Value,
    pub activities: Vec<Value>,
    pub recent_messages: Vec<Value>,
    pub loading: bool,
}

/// State visible to UI panels
pub struct UiState {
    pub login: LoginForm,
    pub register: RegisterForm,
    pub profile: ProfileForm,
    pub dashboard: DashboardData,
    pub messages: MessageListState,
    resources: [ResourceList; 6],
    /// Route the app should switch to after an event, picked up once
    pub pending_route: Option<Route>,
    pub status_text: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            login: LoginForm::default(),
            register: RegisterForm::default(),
            profile: ProfileForm::default(),
            dashboard: DashboardData::default(),
            messages: MessageListState::default(),
            resources: Default::default(),
            pending_route: None,
            status_text: "Prêt".to_string(),
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> &ResourceList {
        &self.resources[kind.index()]
    }

    pub fn resource_mut(&mut self, kind: ResourceKind) -> &mut ResourceList {
        &mut self.resources[kind.index()]
    }

    /// Command the view state needs run without user input, taken once.
    pub fn take_follow_up(&mut self) -> Option<UiCommand> {
        if std::mem::take(&mut self.messages.reload_requested) {
            return Some(UiCommand::LoadMessages);
        }
        None
    }

    /// Mark the target of a command as loading.
    pub fn begin(&mut self, command: &UiCommand) {
        match command {
            UiCommand::Login { .. } => {
                self.login.busy = true;
                self.login.error = None;
            }
            UiCommand::Register(_) => {
                self.register.busy = true;
                self.register.feedback = None;
            }
            UiCommand::LoadDashboard => self.dashboard.loading = true,
            UiCommand::LoadProfile | UiCommand::UpdateProfile(_) | UiCommand::ChangePassword { .. } => {
                self.profile.loading = true;
                self.profile.feedback = None;
            }
            UiCommand::LoadResource(kind)
            | UiCommand::SaveResource { kind, .. }
            | UiCommand::DeleteResource { kind, .. } => {
                let list = self.resource_mut(*kind);
                list.loading = true;
                list.feedback = None;
            }
            UiCommand::LoadMessages
            | UiCommand::ReplyToMessage { .. }
            | UiCommand::DeleteMessage(_) => {
                self.messages.loading = true;
                self.messages.feedback = None;
            }
            UiCommand::Navigate(_) | UiCommand::Logout | UiCommand::LoadMessageResponses(_) => {}
        }
        self.status_text = "Chargement...".to_string();
    }

    /// Fold finished commands into the view state.
    pub fn process_events(&mut self, events: Vec<UiEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: UiEvent) {
        self.status_text = "Prêt".to_string();
        match event {
            UiEvent::LoginFinished(result) => {
                self.login.busy = false;
                match result {
                    Ok(LoginOutcome::Authenticated(_)) => {
                        self.login = LoginForm::default();
                        self.pending_route = Some(Route::Dashboard);
                    }
                    Ok(LoginOutcome::Tokenless(_)) => {
                        self.login.error =
                            Some("Connexion acceptée mais aucun jeton reçu".to_string());
                    }
                    Err(e) => {
                        self.login.password.clear();
                        self.login.error = Some(describe_error(&e));
                    }
                }
            }
            UiEvent::RegistrationFinished(result) => {
                self.register.busy = false;
                match result {
                    Ok(RegistrationOutcome::LoggedIn(_)) => {
                        self.register = RegisterForm::default();
                        self.pending_route = Some(Route::Dashboard);
                    }
                    Ok(RegistrationOutcome::LoginFailed { reason, .. }) => {
                        log::warn!("Registered but automatic login failed: {}", reason);
                        self.register = RegisterForm::default();
                        self.login.error = Some(
                            "Inscription réussie, mais la connexion automatique a échoué. \
                             Veuillez vous connecter."
                                .to_string(),
                        );
                        self.pending_route = Some(Route::Login);
                    }
                    Err(e) => {
                        self.register.feedback = Some(Feedback::error(describe_error(&e)));
                    }
                }
            }
            UiEvent::LoggedOut => {
                self.profile = ProfileForm::default();
                self.dashboard = DashboardData::default();
                self.messages = MessageListState::default();
                self.resources = Default::default();
                self.pending_route = Some(Route::Login);
            }
            UiEvent::DashboardLoaded {
                stats,
                summary,
                activities,
                recent,
            } => {
                self.dashboard = DashboardData {
                    stats,
                    summary,
                    activities: Page::from_value(activities).results,
                    recent_messages: recent.results,
                    loading: false,
                };
            }
            UiEvent::ProfileLoaded(result) => {
                self.profile.loading = false;
                match result {
                    Ok(session) => self.profile.fill_from(&session),
                    Err(e) => self.profile.feedback = Some(Feedback::error(describe_error(&e))),
                }
            }
            UiEvent::ProfileSaved(result) => {
                self.profile.loading = false;
                match result {
                    Ok(session) => {
                        self.profile.fill_from(&session);
                        self.profile.feedback = Some(Feedback::ok("Profil mis à jour avec succès"));
                    }
                    Err(e) => self.profile.feedback = Some(Feedback::error(describe_error(&e))),
                }
            }
            UiEvent::PasswordChanged(result) => {
                self.profile.loading = false;
                self.profile.old_password.clear();
                self.profile.new_password.clear();
                self.profile.feedback = Some(match result {
                    Ok(_) => Feedback::ok("Mot de passe modifié avec succès"),
                    Err(e) => Feedback::error(describe_error(&e)),
                });
            }
            UiEvent::ResourceLoaded { kind, result } => {
                let list = self.resource_mut(kind);
                list.loading = false;
                match result {
                    Ok(value) => list.items = Page::from_value(value).results,
                    Err(e) => list.feedback = Some(Feedback::error(describe_error(&e))),
                }
            }
            UiEvent::ResourceSaved { kind, result } => {
                let list = self.resource_mut(kind);
                list.loading = false;
                match result {
                    Ok(_) => {
                        list.reset_editor();
                        list.feedback = Some(Feedback::ok("Enregistré avec succès"));
                    }
                    Err(e) => list.feedback = Some(Feedback::error(describe_error(&e))),
                }
            }
            UiEvent::ResourceDeleted { kind, result } => {
                let list = self.resource_mut(kind);
                list.loading = false;
                list.feedback = Some(match result {
                    Ok(_) => Feedback::ok("Supprimé avec succès"),
                    Err(e) => Feedback::error(describe_error(&e)),
                });
            }
            UiEvent::MessagesLoaded(result) => {
                self.messages.loading = false;
                match result {
                    Ok(page) => {
                        if self.messages.apply_page(page) {
                            log::debug!("Message page out of range, reloading page {}", self.messages.page);
                        }
                    }
                    Err(e) => {
                        self.messages.feedback = Some(Feedback::error(
                            "Erreur lors du chargement des messages. Veuillez réessayer.",
                        ));
                        log::error!("Loading messages failed: {}", e);
                    }
                }
            }
            UiEvent::MessageResponsesLoaded(result) => match result {
                Ok(page) => self.messages.responses = page.results,
                Err(e) => self.messages.feedback = Some(Feedback::error(describe_error(&e))),
            },
            UiEvent::MessageReplied(result) => {
                self.messages.loading = false;
                match result {
                    Ok(_) => {
                        self.messages.reply_text.clear();
                        self.messages.reply_template = None;
                        self.messages.feedback = Some(Feedback::ok("Réponse envoyée avec succès"));
                    }
                    Err(e) => self.messages.feedback = Some(Feedback::error(describe_error(&e))),
                }
            }
            UiEvent::MessageDeleted(result) => {
                self.messages.loading = false;
                self.messages.feedback = Some(match result {
                    Ok(_) => {
                        self.messages.selected = None;
                        Feedback::ok("Message supprimé avec succès")
                    }
                    Err(e) => Feedback::error(describe_error(&e)),
                });
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.login.busy
            || self.register.busy
            || self.profile.loading
            || self.messages.loading
            || self.dashboard.loading
            || self.resources.iter().any(|r| r.loading)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric `id` of an opaque record, if it has one.
pub fn record_id(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

/// Short human-readable summary of a record for list rows.
pub fn record_title(record: &Value) -> String {
    ["name", "title", "email", "phone_number", "subject", "sender"]
        .iter()
        .find_map(|k| record.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| record_id(record).map(|id| format!("#{}", id)))
        .unwrap_or_else(|| "(sans titre)".to_string())
}

/// User-facing message for a failed call.
pub fn describe_error(err: &SmartBotError) -> String {
    match err {
        SmartBotError::Http { status: 401, body, .. } => body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "Session expirée, veuillez vous reconnecter".to_string()),
        SmartBotError::Http { status: 403, .. } => {
            "Accès interdit : vous n'avez pas les droits nécessaires".to_string()
        }
        SmartBotError::Http { status, body, .. } if (400..500).contains(status) => {
            field_errors(body).unwrap_or_else(|| format!("Requête refusée (HTTP {})", status))
        }
        SmartBotError::Http { status, .. } => format!("Erreur du serveur (HTTP {})", status),
        SmartBotError::Network(_) => "Serveur injoignable, vérifiez votre connexion".to_string(),
        SmartBotError::Timeout(_) => "Le serveur ne répond pas, réessayez plus tard".to_string(),
        SmartBotError::Unauthenticated => {
            "Vous devez être connecté pour accéder à cette page".to_string()
        }
        other => other.to_string(),
    }
}

/// Flatten a field-level validation body: `{"email": ["taken"]}` → `email: taken`.
fn field_errors(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    let lines: Vec<String> = map
        .iter()
        .map(|(field, messages)| {
            let text = match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(" "),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if field == "detail" || field == "error" || field == "non_field_errors" {
                text
            } else {
                format!("{}: {}", field, text)
            }
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
