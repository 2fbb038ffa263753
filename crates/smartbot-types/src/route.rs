use serde::{Deserialize, Serialize};

/// Every view the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    BotConfig,
    Messages,
    Templates,
    Accounts,
    Profile,
    RulesConfig,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::BotConfig => "/bot-config",
            Route::Messages => "/messages",
            Route::Templates => "/templates",
            Route::Accounts => "/accounts",
            Route::Profile => "/profile",
            Route::RulesConfig => "/rules-config",
        }
    }

    /// Parse a location path or hash fragment. Unknown paths land on Home.
    pub fn from_path(path: &str) -> Route {
        let path = path.trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        Route::all()
            .iter()
            .copied()
            .find(|r| r.path().trim_end_matches('/') == path)
            .unwrap_or(Route::Home)
    }

    /// Views that sit behind the dashboard layout and need a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Login | Route::Register)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Accueil",
            Route::Login => "Connexion",
            Route::Register => "Inscription",
            Route::Dashboard => "Tableau de bord",
            Route::BotConfig => "Configuration du bot",
            Route::Messages => "Messages",
            Route::Templates => "Modèles",
            Route::Accounts => "Comptes",
            Route::Profile => "Profil",
            Route::RulesConfig => "Règles",
        }
    }

    pub fn all() -> &'static [Route] {
        &[
            Route::Home,
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::BotConfig,
            Route::Messages,
            Route::Templates,
            Route::Accounts,
            Route::Profile,
            Route::RulesConfig,
        ]
    }

    /// Entries of the dashboard sidebar, in display order.
    pub fn dashboard_menu() -> &'static [Route] {
        &[
            Route::Dashboard,
            Route::BotConfig,
            Route::RulesConfig,
            Route::Messages,
            Route::Templates,
            Route::Accounts,
            Route::Profile,
        ]
    }
}
