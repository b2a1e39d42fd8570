use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::admins::AdminRepository;
use crate::database::plants::PlantRepository;
use crate::storage::ImageStore;

/// Shared application state. Everything here is constructed once at startup
/// and handed to handlers through axum state — no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub tokens: TokenService,
    pub admins: AdminRepository,
    pub plants: PlantRepository,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        pool: PgPool,
        tokens: TokenService,
        images: ImageStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            admins: AdminRepository::new(pool.clone()),
            plants: PlantRepository::new(pool.clone()),
            pool,
            tokens,
            images,
        }
    }
}
