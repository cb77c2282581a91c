pub mod chart_service;
pub mod completion_client;
pub mod dashboard_service;
pub mod insight_service;
