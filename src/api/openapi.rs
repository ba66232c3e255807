//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the vidquiz REST API using utoipa for
//! compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the vidquiz REST API
///
/// The OpenAPI document can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (spec copy at `/api-docs/openapi.json`)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidquiz REST API",
        version = "0.1.0",
        description = "Turns the spoken content of a remote video into a multiple-choice quiz",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3210", description = "Local development server")
    ),
    paths(
        // Quiz
        crate::api::routes::generate_quiz,

        // System
        crate::api::routes::get_capabilities,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::QuizQuestion,
        crate::types::QuizQuestionSet,
        crate::types::Stage,
        crate::types::RunId,
        crate::types::Event,
        crate::types::Capabilities,
        crate::types::ToolInfo,

        // API request/response types from routes
        crate::api::routes::GenerateQuizRequest,
        crate::api::routes::GenerateQuizResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "quiz", description = "Quiz generation - Fetch, transcribe and quiz a video in one call"),
        (name = "system", description = "System endpoints - Health checks, capabilities, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
