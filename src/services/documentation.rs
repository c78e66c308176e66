//! OpenAPI document.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the tap rally backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::start_round,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::submit_result,
        crate::routes::rooms::submit_click,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::UserInput,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::UserIdRequest,
            crate::dto::room::ScoreRequest,
            crate::dto::room::RoomView,
            crate::dto::room::UserView,
            crate::dto::room::PhaseView,
            crate::dto::room::RankingEntry,
            crate::dto::room::RoomAccessResponse,
            crate::dto::room::RoomResponse,
            crate::dto::room::SuccessResponse,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::ClientMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room membership, rounds and live channels"),
    )
)]
/// OpenAPI document of every route and schema.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_room_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/rooms"));
        assert!(paths.contains_key("/rooms/{room_id}/join"));
        assert!(paths.contains_key("/ws/{room_id}"));
        assert!(paths.contains_key("/healthcheck"));
    }
}
