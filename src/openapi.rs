//! OpenAPI documentation and the Swagger UI mount.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::services::history::HistoryEvent;
use crate::services::items::{
    AddMetadataRequest, CreateItemRequest, CurrentLocation, CustodyInfo, ItemListResponse,
    ItemResponse, ItemStatus, PlacementInfo,
};
use crate::services::moves::{
    BulkMoveFailure, BulkMoveRequest, BulkMoveResponse, CreateMoveRequest, MoveListResponse,
    MoveResponse,
};
use crate::services::scrappages::{
    CreateScrappageRequest, ScrappageListResponse, ScrappageResponse,
};
use crate::services::structure::{
    CreateStructureLinkRequest, ItemSummary, StructureMappingResponse, StructureNeighbor,
    StructureRelation,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AssetTrack API",
        version = "0.3.0",
        description = r#"
# AssetTrack API

IT asset tracking backend: registered items move between rooms, cabinets and
personal toolbooks through a request/approve workflow, are retired through a
scrap workflow, can be linked into parent/child equipment structures, and
carry a reconstructable lifecycle history.

## Authentication

All endpoints except `/status` and `/health` require a bearer token issued by
the identity provider:

```
Authorization: Bearer <token>
```

Effective permissions are resolved per request from the directory groups
asserted in the token.

## Error handling

Errors use a consistent JSON shape with the HTTP status mirrored in the body.
Workflow conflicts (already finished requests, already inactive links,
duplicate links) return 400.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::handlers::moves::create_move,
        crate::handlers::moves::create_bulk_move,
        crate::handlers::moves::approve_move,
        crate::handlers::moves::reject_move,
        crate::handlers::scrappages::create_scrappage,
        crate::handlers::scrappages::approve_scrappage,
        crate::handlers::scrappages::reject_scrappage,
        crate::handlers::structure::create_structure_mapping,
        crate::handlers::structure::deactivate_structure_mapping,
        crate::handlers::items::get_item_history,
    ),
    components(schemas(
        ErrorResponse,
        HistoryEvent,
        ItemStatus,
        CreateItemRequest,
        AddMetadataRequest,
        ItemResponse,
        ItemListResponse,
        CurrentLocation,
        PlacementInfo,
        CustodyInfo,
        CreateMoveRequest,
        BulkMoveRequest,
        BulkMoveFailure,
        BulkMoveResponse,
        MoveResponse,
        MoveListResponse,
        CreateScrappageRequest,
        ScrappageResponse,
        ScrappageListResponse,
        CreateStructureLinkRequest,
        ItemSummary,
        StructureMappingResponse,
        StructureNeighbor,
        StructureRelation,
    )),
    tags(
        (name = "Items", description = "Item registration, location and history"),
        (name = "Moves", description = "Move request/approve/reject workflow"),
        (name = "Scrappages", description = "Scrap request/approve/reject workflow"),
        (name = "Structure", description = "Parent/child equipment links"),
    )
)]
pub struct ApiDoc;

/// Swagger UI served at `/docs`, spec at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
