//! Server construction and adapter wiring.
//!
//! The composition root lives here: the datastore (Postgres or in-memory)
//! and the payment gateway (Pi platform or simulator) are each selected
//! exactly once, from [`ServerConfig`], before any request is served.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::Trace;

use crate::domain::ports::{
    ChangePublisher, LinkRepository, NotificationRepository, PaymentGateway, ProfileRepository,
    TipRepository,
};
use crate::domain::{PaymentSimulator, SimulatorConfig};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::links::{create_link, delete_link, list_links, record_click, update_link};
use crate::inbound::http::notifications::{list_notifications, mark_read};
use crate::inbound::http::payments::{create_payment, get_payment, list_tips};
use crate::inbound::http::profiles::{get_profile, put_profile};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::usernames::check_availability;
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::outbound::feed::ChangeHub;
use crate::outbound::payments::{PiPlatformGateway, SimulatedGateway};
use crate::outbound::persistence::{
    DbPool, DieselLinkRepository, DieselNotificationRepository, DieselProfileRepository,
    DieselTipRepository, InMemoryLinkRepository, InMemoryNotificationRepository,
    InMemoryProfileRepository, InMemoryTipRepository, PoolConfig,
};

struct Repositories {
    profiles: Arc<dyn ProfileRepository>,
    links: Arc<dyn LinkRepository>,
    notifications: Arc<dyn NotificationRepository>,
    tips: Arc<dyn TipRepository>,
}

/// Select the datastore from configuration. With a `DATABASE_URL` all four
/// repositories share one Postgres pool; without one they share nothing and
/// records live for the lifetime of the process.
async fn build_repositories(config: &ServerConfig) -> std::io::Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(std::io::Error::other)?;
            info!("using Postgres datastore");
            Ok(Repositories {
                profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
                links: Arc::new(DieselLinkRepository::new(pool.clone())),
                notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
                tips: Arc::new(DieselTipRepository::new(pool)),
            })
        }
        None => {
            info!("using in-memory datastore");
            Ok(Repositories {
                profiles: Arc::new(InMemoryProfileRepository::default()),
                links: Arc::new(InMemoryLinkRepository::default()),
                notifications: Arc::new(InMemoryNotificationRepository::default()),
                tips: Arc::new(InMemoryTipRepository::default()),
            })
        }
    }
}

/// Select the payment gateway from configuration. A `PI_API_KEY` selects the
/// Pi platform client; otherwise payments run through the local simulator.
fn build_gateway(config: &ServerConfig) -> std::io::Result<Arc<dyn PaymentGateway>> {
    match &config.pi_api_key {
        Some(api_key) => {
            let gateway = match &config.pi_base_url {
                Some(base_url) => {
                    PiPlatformGateway::with_base_url(api_key.clone(), base_url.clone())
                }
                None => PiPlatformGateway::new(api_key.clone()),
            }
            .map_err(|error| std::io::Error::other(error.message().to_owned()))?;
            info!("using Pi platform payment gateway");
            Ok(Arc::new(gateway))
        }
        None => {
            info!(
                latency_ms = config.payment_latency_ms,
                "using simulated payment gateway"
            );
            let simulator = Arc::new(PaymentSimulator::new(SimulatorConfig {
                latency: config.payment_latency(),
            }));
            Ok(Arc::new(SimulatedGateway::new(simulator)))
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(check_availability)
        .service(get_profile)
        .service(put_profile)
        .service(list_links)
        .service(create_link)
        .service(update_link)
        .service(delete_link)
        .service(record_click)
        .service(list_notifications)
        .service(mark_read)
        .service(create_payment)
        .service(get_payment)
        .service(list_tips);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(Trace)
        .service(api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server from the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the datastore, the payment gateway, or
/// the socket binding cannot be initialised.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let repositories = build_repositories(&config).await?;
    let gateway = build_gateway(&config)?;

    let hub = Arc::new(ChangeHub::new());
    let publisher: Arc<dyn ChangePublisher> = hub.clone();

    let http_state = web::Data::new(HttpState::from(HttpStatePorts {
        profiles: repositories.profiles,
        links: repositories.links,
        notifications: repositories.notifications,
        tips: repositories.tips,
        gateway,
        publisher,
    }));
    let ws_state = web::Data::new(WsState::new(hub));

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
