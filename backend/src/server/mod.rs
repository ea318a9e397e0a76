//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppConfig, AppConfigError, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use cookbook::Trace;
#[cfg(debug_assertions)]
use cookbook::doc::ApiDoc;
use cookbook::inbound::http::groups::{
    create_group, delete_group, get_group, list_groups, preview_invite, search_groups,
    update_group,
};
use cookbook::inbound::http::health::{HealthState, live, ready};
use cookbook::inbound::http::memberships::{
    approve_request, change_role, join_group, leave_group, reject_request, remove_member,
};
use cookbook::inbound::http::moderation::{
    approve_group, approve_recipe, counts, pending_groups, pending_recipes, reject_group,
    reject_recipe,
};
use cookbook::inbound::http::recipes::{
    create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe,
};
use cookbook::inbound::http::state::HttpState;
use cookbook::inbound::http::users::{
    current_user, login, logout, register, update_current_user,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Cookie settings for the `session` cookie shared by every worker.
#[derive(Clone)]
struct SessionCookie {
    key: Key,
    secure: bool,
    same_site: SameSite,
}

impl SessionCookie {
    /// Encrypted, HTTP-only cookie sessions expiring after two idle hours.
    fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        let lifecycle = PersistentSession::default().session_ttl(Duration::hours(2));
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_http_only(true)
            .cookie_secure(self.secure)
            .cookie_same_site(self.same_site)
            .cookie_content_security(CookieContentSecurity::Private)
            .session_lifecycle(lifecycle)
            .build()
    }
}

/// Register every `/api/v1` endpoint.
fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_current_user);

    // Literal paths must precede `/groups/{id}`.
    cfg.service(list_groups)
        .service(create_group)
        .service(search_groups)
        .service(preview_invite)
        .service(join_group)
        .service(get_group)
        .service(update_group)
        .service(delete_group);

    cfg.service(approve_request)
        .service(reject_request)
        .service(change_role)
        .service(remove_member)
        .service(leave_group);

    cfg.service(list_recipes)
        .service(create_recipe)
        .service(get_recipe)
        .service(update_recipe)
        .service(delete_recipe);

    cfg.service(pending_groups)
        .service(pending_recipes)
        .service(approve_group)
        .service(reject_group)
        .service(approve_recipe)
        .service(reject_recipe)
        .service(counts);
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cookie: SessionCookie,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").wrap(cookie.middleware()).configure(api_routes))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and start serving.
///
/// Readiness flips to healthy once the socket is bound; the caller awaits
/// the returned [`Server`].
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let cookie = SessionCookie {
        key: config.key,
        secure: config.cookie_secure,
        same_site: config.same_site,
    };
    let worker_health = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(worker_health.clone(), http_state.clone(), cookie.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
