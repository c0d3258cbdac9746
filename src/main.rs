use anyhow::Result;
use axum::Router;
use cacao_storefront::{app_state::AppState, bootstrap, config, db, routes, swagger};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let db_pool = db::build_pool(&config.database.url).await?;
    let state = AppState {
        db_pool,
        transition_mode: config.orders.transition_mode(),
    };

    let api = routes::routes_with_openapi()
        .merge(routes::products::routes_with_openapi())
        .merge(routes::carts::routes_with_openapi())
        .merge(routes::wishlists::routes_with_openapi())
        .merge(routes::promos::routes_with_openapi())
        .merge(routes::orders::routes_with_openapi())
        .merge(routes::admin::routes_with_openapi());

    let (router, mut openapi) = api.split_for_parts();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Cacao Storefront API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    let app = Router::new().merge(router.with_state(state)).merge(swagger_ui);

    bootstrap::serve("Storefront", app, &config.server.bind_addr).await?;
    Ok(())
}
