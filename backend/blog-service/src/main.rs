use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use blog_service::cache::{IndexPageCache, MemoryPageCache, PageCache, RedisPageCache};
use blog_service::config::StorageBackend;
use blog_service::db::{init_pool, BlogRepository, DbConfig, InMemoryRepository, PgBlogRepository};
use blog_service::handlers::{self, AppState, HealthState};
use blog_service::pagination::Paginator;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Blog Service
///
/// # Routes
///
/// - `/`, `/group/{slug}/`, `/profile/{username}/`, `/follow/` - paginated feeds
/// - `/posts/{post_id}/` - post detail; `/create/`, `/posts/{post_id}/edit/`
/// - `/posts/{post_id}/comment/`, `/profile/{username}/(un)follow/`
/// - `/admin/cache/clear` - drop the cached index page
///
/// # Deployment
///
/// Runs on port 8080 (configurable via BLOG_SERVICE_PORT). With
/// `STORAGE_BACKEND=memory` no PostgreSQL or Redis is needed.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = blog_service::Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let (repo, page_store, health): (Arc<dyn BlogRepository>, Arc<dyn PageCache>, HealthState) =
        match config.storage {
            StorageBackend::Postgres => {
                let db_cfg = DbConfig::from(&config.database);
                let pool = init_pool(&db_cfg)
                    .await
                    .context("Failed to initialize database")?;
                tracing::info!("Connected to database");

                let redis = RedisPageCache::connect(&config.cache.url, config.cache.key_prefix.clone())
                    .await
                    .context("Failed to initialize Redis connection")?;
                tracing::info!("Connected to Redis");

                let repo: Arc<dyn BlogRepository> = Arc::new(PgBlogRepository::new(pool.clone()));
                let store: Arc<dyn PageCache> = Arc::new(redis.clone());
                (repo, store, HealthState::new(Some(pool), Some(redis)))
            }
            StorageBackend::Memory => {
                if config.app.is_production() {
                    anyhow::bail!("STORAGE_BACKEND=memory is not allowed in production");
                }
                tracing::warn!("Using in-memory storage; data is lost on restart");
                let repo: Arc<dyn BlogRepository> = Arc::new(InMemoryRepository::new());
                let store: Arc<dyn PageCache> = Arc::new(MemoryPageCache::default());
                (repo, store, HealthState::default())
            }
        };

    let index_cache = IndexPageCache::new(
        page_store,
        Duration::from_secs(config.cache.index_ttl_secs),
    );
    let app_state = web::Data::new(AppState::new(
        repo,
        index_cache,
        Paginator::new(config.feed.page_size),
    ));
    let health_state = web::Data::new(health);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(blog_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(handlers::health_summary))
            .route("/api/v1/health/ready", web::get().to(handlers::readiness_summary))
            .route("/api/v1/health/live", web::get().to(handlers::liveness_check))
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            result
                .context("HTTP server task panicked")?
                .context("HTTP server failed")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            server_task
                .await
                .context("HTTP server task panicked")?
                .context("HTTP server failed")?;
        }
    }

    tracing::info!("blog-service stopped");
    Ok(())
}
