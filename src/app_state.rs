use crate::aliases::DbPool;
use crate::domain::status::TransitionMode;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub transition_mode: TransitionMode,
}
