//! Operations behind the routes.

/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room commands routed to the owning coordinator.
pub mod room_service;
/// WebSocket session handling for room channels.
pub mod websocket_service;
