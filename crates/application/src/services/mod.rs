mod realtime_service;

pub use realtime_service::{RealtimeService, RealtimeServiceDependencies};
