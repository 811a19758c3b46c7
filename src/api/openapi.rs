//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, bian_handler, company_handler, data_source_handler, schema_handler,
    use_case_handler,
};
use crate::domain::{
    ApiRecommendation, Company, CompanySettings, CustomSchema, DataSource, DataSourceType,
    DomainRecommendation, FeatureFlags, Recommendations, SchemaOrigin, SelectedApi, SelectedDomain,
    StructuredFields, UpdateMember, UseCase, UseCaseFlow, UseCaseStatus, UserResponse, UserRole,
};
use crate::services::{DomainChoice, SessionResponse, ValidationReport};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the BIAN-CU backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BIAN-CU API",
        version = "0.1.0",
        description = "Author banking use cases, analyze them with AI and map them onto BIAN service domains and APIs",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::google_login,
        auth_handler::google_callback,
        auth_handler::me,
        auth_handler::logout,
        // Use cases
        use_case_handler::list_use_cases,
        use_case_handler::create_use_case,
        use_case_handler::get_use_case,
        use_case_handler::update_use_case,
        use_case_handler::delete_use_case,
        use_case_handler::analyze_use_case,
        use_case_handler::suggest,
        use_case_handler::recommendations,
        use_case_handler::select_domains,
        use_case_handler::select_apis,
        // BIAN catalog
        bian_handler::list_domains,
        bian_handler::list_apis,
        bian_handler::recommend,
        // Schemas
        schema_handler::list_schemas,
        schema_handler::add_schema,
        schema_handler::generate_schema,
        schema_handler::remove_schema,
        // Data sources
        data_source_handler::list_data_sources,
        data_source_handler::add_data_source,
        data_source_handler::validate_data_source,
        data_source_handler::remove_data_source,
        // Companies
        company_handler::get_company,
        company_handler::update_company,
        company_handler::list_members,
        company_handler::add_member,
        company_handler::update_member,
        company_handler::remove_member,
    ),
    components(
        schemas(
            // Domain types
            UseCase,
            UseCaseStatus,
            UseCaseFlow,
            StructuredFields,
            SelectedDomain,
            SelectedApi,
            CustomSchema,
            SchemaOrigin,
            DataSource,
            DataSourceType,
            Company,
            CompanySettings,
            FeatureFlags,
            UserRole,
            UserResponse,
            UpdateMember,
            DomainRecommendation,
            ApiRecommendation,
            Recommendations,
            PaginationMeta,
            // Service types
            SessionResponse,
            DomainChoice,
            ValidationReport,
            // Request and response bodies
            use_case_handler::CreateUseCaseRequest,
            use_case_handler::UpdateUseCaseRequest,
            use_case_handler::SuggestionsRequest,
            use_case_handler::SelectDomainsRequest,
            use_case_handler::SelectApisRequest,
            bian_handler::DomainResponse,
            bian_handler::CatalogApiResponse,
            bian_handler::RecommendationRequest,
            schema_handler::AddSchemaRequest,
            schema_handler::GenerateSchemaRequest,
            data_source_handler::AddDataSourceRequest,
            company_handler::UpdateCompanyRequest,
            company_handler::AddMemberRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Google sign-in and session"),
        (name = "Use Cases", description = "Use case authoring, AI analysis and BIAN selection"),
        (name = "BIAN", description = "Static BIAN catalog and keyword recommendations"),
        (name = "Schemas", description = "JSON schemas attached to a use case"),
        (name = "Data Sources", description = "Data sources attached to a use case"),
        (name = "Companies", description = "Company profile, settings and members")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued after Google sign-in"))
                        .build(),
                ),
            );
        }
    }
}
