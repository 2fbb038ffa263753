//! Location-hash navigation.
//!
//! The dashboard is a single canvas, so routes live in the URL fragment
//! (`#/login`) where a reload or a shared link can find them again.

use smartbot_core::ports::Navigator;
use smartbot_types::route::Route;

#[derive(Default)]
pub struct BrowserNavigator;

impl BrowserNavigator {
    pub fn new() -> Self {
        Self
    }
}

impl Navigator for BrowserNavigator {
    fn redirect(&self, route: Route) {
        let location = gloo_utils::window().location();
        if let Err(e) = location.set_hash(route.path()) {
            log::error!("Failed to navigate to {}: {:?}", route.path(), e);
        }
    }

    fn current_route(&self) -> Route {
        match gloo_utils::window().location().hash() {
            Ok(hash) => Route::from_path(&hash),
            Err(e) => {
                log::warn!("Cannot read location hash: {:?}", e);
                Route::Home
            }
        }
    }
}
