use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::create_book,
        api::books::get_book,
        api::lookup::search_isbn,
        api::shelves::delete_shelf,
        api::owned::add_owned,
        api::owned::delete_owned,
        api::unshelved::shelve,
        api::wanted::purchase,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "shelfkeeper", description = "Shelfkeeper personal library API")
    )
)]
pub struct ApiDoc;
