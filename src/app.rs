use std::sync::Arc;

use dioxus::prelude::*;

use crate::infra::api::client::ApiClient;
use crate::infra::config::{default_config_path, AppConfig};
use crate::ui::pages::alert_emails::AlertEmailsPage as AlertEmails;
use crate::ui::pages::audit_log::AuditLogPage as AuditLog;
use crate::ui::pages::batch_orders::BatchOrdersPage as BatchOrders;
use crate::ui::pages::batch_upload::BatchUploadPage as BatchUpload;
use crate::ui::pages::error_codes::ErrorCodesPage as ErrorCodes;
use crate::ui::pages::products::ProductsPage as Products;
use crate::ui::pages::voucher_types::VoucherTypesPage as VoucherTypes;
use crate::ui::pages::vouchers::VouchersPage as Vouchers;
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Ability, Action, Subject};

#[derive(Debug, Clone, PartialEq, Routable)]
pub enum Route {
    #[layout(Shell)]
    #[redirect("/", || Route::Vouchers { q: String::new(), batch_id: String::new() })]
    #[route("/vouchers?:q&:batch_id")]
    Vouchers { q: String, batch_id: String },
    #[route("/products")]
    Products {},
    #[route("/voucher-types")]
    VoucherTypes {},
    #[route("/batch-orders")]
    BatchOrders {},
    #[route("/batch-upload")]
    BatchUpload {},
    #[route("/alert-emails")]
    AlertEmails {},
    #[route("/error-codes")]
    ErrorCodes {},
    #[route("/audit-log")]
    AuditLog {},
}

#[component]
fn NavLink(to: Route, label: &'static str) -> Element {
    rsx! {
        Link {
            to,
            style: "display: block; padding: 8px 12px; border-radius: 6px; color: #343a40; text-decoration: none;",
            "{label}"
        }
    }
}

/// Sidebar plus toast host around the routed page. Navigation entries are
/// filtered by the session's capability policy; a session with no
/// recognized role gets a dead end instead of the outlet.
#[component]
fn Shell() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let ability = session.ability.clone();
    let may_enter = ability.can(Action::View, Subject::Any);
    let toasts = app.toasts.read().clone();

    rsx! {
        div {
            style: "display: flex; min-height: 100vh; font-family: sans-serif; background: #f8f9fa;",
            nav {
                style: "width: 200px; padding: 16px 8px; background: #fff; border-right: 1px solid #dee2e6;",
                h3 { style: "margin: 0 8px 16px;", "PVMS" }
                if ability.can(Action::View, Subject::Voucher) {
                    NavLink {
                        to: Route::Vouchers { q: String::new(), batch_id: String::new() },
                        label: "Vouchers",
                    }
                }
                if ability.can(Action::View, Subject::Product) {
                    NavLink { to: Route::Products {}, label: "Products" }
                }
                if ability.can(Action::View, Subject::BatchOrder) {
                    NavLink { to: Route::BatchOrders {}, label: "Batch orders" }
                }
                if ability.can(Action::Create, Subject::BatchOrder) {
                    NavLink { to: Route::BatchUpload {}, label: "Batch upload" }
                }
                if ability.can(Action::View, Subject::Management) {
                    NavLink { to: Route::VoucherTypes {}, label: "Voucher types" }
                    NavLink { to: Route::AlertEmails {}, label: "Alert e-mails" }
                    NavLink { to: Route::ErrorCodes {}, label: "Error codes" }
                    NavLink { to: Route::AuditLog {}, label: "Audit log" }
                }
            }
            main {
                style: "flex: 1; padding: 20px; overflow-x: auto;",
                if may_enter {
                    Outlet::<Route> {}
                } else {
                    div {
                        style: "padding: 48px; text-align: center; color: #868e96;",
                        h2 { "No access" }
                        p { "Your session carries no recognized PVMS role." }
                    }
                }
            }
        }

        div {
            style: "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 2000;",
            {toasts.iter().map(|toast| {
                let id = toast.id;
                let color = match toast.kind {
                    ToastKind::Info => "background: #2b8a3e; color: #fff;",
                    ToastKind::Error => "background: #c92a2a; color: #fff;",
                };
                rsx! {
                    div {
                        key: "{id}",
                        style: "display: flex; align-items: center; gap: 12px; padding: 10px 14px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.25); {color}",
                        span { "{toast.message}" }
                        button {
                            style: "border: none; background: transparent; color: inherit; cursor: pointer;",
                            onclick: move |_| app.dismiss(id),
                            "✕"
                        }
                    }
                }
            })}
        }
    }
}

#[component]
pub fn App() -> Element {
    let config = use_hook(|| {
        AppConfig::load()
            .map(Arc::new)
            .map_err(|err| format!("{err:#}"))
    });
    match config {
        Ok(config) => {
            use_context_provider(|| Session {
                api: Arc::new(ApiClient::new(
                    config.api_url.clone(),
                    config.access_token.clone(),
                )),
                ability: Ability::from_claims(config.roles.iter().map(String::as_str)),
            });
            let app_state = AppState::new();
            use_context_provider(|| app_state);
            rsx! {
                Router::<Route> {}
            }
        }
        Err(message) => {
            let hint = default_config_path()
                .map(|path| format!("Set PVMS_API_URL or create {}", path.display()))
                .unwrap_or_else(|_| "Set PVMS_API_URL in the environment".to_string());
            rsx! {
                div {
                    style: "padding: 48px; font-family: sans-serif;",
                    h2 { "Configuration error" }
                    p { "{message}" }
                    p { style: "color: #868e96;", "{hint}" }
                }
            }
        }
    }
}
