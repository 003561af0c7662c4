//! Route table and access guards
//!
//! Public, protected (signed-in) and admin routes, the same split the web
//! client's router used.

pub mod guard;
pub mod route;

pub use guard::{guard, sidebar, RouteDecision, SidebarItem};
pub use route::{Access, Route};
