mod auth;
mod health;
mod pages;
mod projects;
mod uploads;

pub use auth::{login, logout, me};
pub use health::health;
pub use pages::{dashboard, dashboard_section, login as login_page};
pub use projects::{list_documents, list_projects};
pub use uploads::create_uploads;
