use std::sync::Arc;

use application::RealtimeService;

use crate::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub realtime_service: Arc<RealtimeService>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(realtime_service: Arc<RealtimeService>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            realtime_service,
            jwt_service,
        }
    }
}
