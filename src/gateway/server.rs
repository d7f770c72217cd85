use super::Gateway;
use super::proxy;
use super::routes;
use crate::config::Settings;
use crate::context::HttpForecast;
use crate::context::WeatherService;
use crate::registry::Registry;
use crate::store::Store;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub struct Server;

impl Server {
    pub async fn run(settings: Settings) -> anyhow::Result<()> {
        let client = crate::db(&settings.db_url).await?;
        let store = Store::from(client);
        store.bootstrap().await?;
        let forecast =
            HttpForecast::new(settings.weather_url.clone(), settings.request_timeout)?;
        let weather = Arc::new(WeatherService::new(Box::new(forecast)));
        let registry = Arc::new(Registry::new(Some(store.clone())));
        let gateway = web::Data::new(Gateway::new(
            settings.clone(),
            registry.clone(),
            store,
            weather,
        )?);

        // background sweeps: expired cache entries, idle rate-limit
        // buckets, and terminal runs past retention
        let sweeper = gateway.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tick.tick().await;
                let expired = sweeper.cache.lock().expect("query cache lock").sweep();
                sweeper.limiter.sweep();
                let evicted = sweeper.registry.sweep();
                log::debug!("sweep: {} cache entries, {} runs evicted", expired, evicted);
            }
        });

        log::info!("starting HTTP server on {}", settings.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(gateway.clone())
                .route("/simulations", web::post().to(routes::create_simulation))
                .route("/simulations/{id}/status", web::get().to(routes::run_status))
                .route("/simulations/{id}", web::get().to(routes::run_result))
                .route("/simulations/{id}", web::delete().to(routes::cancel_run))
                .route("/health", web::get().to(routes::health))
                .route("/metrics", web::get().to(routes::metrics))
                .route("/teams", web::get().to(proxy::listing))
                .route("/teams/{id}", web::get().to(proxy::entity))
                .route("/players", web::get().to(proxy::listing))
                .route("/players/{id}", web::get().to(proxy::entity))
                .route("/games", web::get().to(proxy::listing))
                .route("/games/{id}", web::get().to(proxy::entity))
        })
        .bind(&settings.bind)?
        .run()
        .await?;
        log::info!("server drained, shutting down");
        Ok(())
    }
}
