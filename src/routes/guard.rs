use super::{Access, Route};
use crate::services::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Protected routes send guests to login, admin routes send students to the
/// dashboard, login/register send signed-in users to the dashboard.
pub fn guard(route: &Route, auth: &AuthState) -> RouteDecision {
    match (route.access(), auth.is_signed_in()) {
        (Access::Public, _) => RouteDecision::Allow,
        (Access::GuestOnly, false) => RouteDecision::Allow,
        (Access::GuestOnly, true) => RouteDecision::Redirect(Route::Dashboard),
        (Access::Protected | Access::Admin, false) => RouteDecision::Redirect(Route::Login),
        (Access::Protected, true) => RouteDecision::Allow,
        (Access::Admin, true) if auth.is_admin() => RouteDecision::Allow,
        (Access::Admin, true) => RouteDecision::Redirect(Route::Dashboard),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub label: &'static str,
    pub route: Route,
}

/// Sidebar entries visible to `auth`
pub fn sidebar(auth: &AuthState) -> Vec<SidebarItem> {
    let item = |label, route| SidebarItem { label, route };
    if !auth.is_signed_in() {
        return vec![
            item("Početna", Route::Home),
            item("Saveti", Route::Tips),
            item("Prijava", Route::Login),
        ];
    }

    let mut items = vec![
        item("Kontrolna tabla", Route::Dashboard),
        item("Testovi", Route::ExamList),
        item("Rezultati", Route::Results),
        item("Saveti", Route::Tips),
        item("Podešavanja", Route::Settings),
    ];
    if auth.is_admin() {
        items.push(item("Administracija", Route::AdminExams));
    }
    items
}
