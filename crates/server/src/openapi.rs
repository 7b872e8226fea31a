use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CredentialsRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

#[derive(ToSchema)]
pub struct UserSummaryDoc { pub id: i32, pub username: String }

#[derive(ToSchema)]
pub struct LoginResponse { pub access_token: String, pub user: UserSummaryDoc }

#[derive(ToSchema)]
pub struct DetailDoc { pub id: i32, pub product_id: i32, pub label: String, pub description: String }

#[derive(ToSchema)]
pub struct FileDoc { pub id: i32, pub product_id: i32, pub location: String, pub name: String }

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub details: Vec<DetailDoc>,
    pub files: Vec<FileDoc>,
}

#[derive(ToSchema)]
pub struct DetailInputDoc { pub label: String, pub description: String }

#[derive(ToSchema)]
pub struct CreateProductDoc {
    pub name: String,
    pub description: String,
    /// Ignored; new products go last
    pub priority: Option<i32>,
    pub details: Option<Vec<DetailInputDoc>>,
}

#[derive(ToSchema)]
pub struct UpdateProductDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    /// Replaces all existing details when present
    pub details: Option<Vec<DetailInputDoc>>,
}

#[derive(ToSchema)]
pub struct UploadFilesDoc {
    /// Up to 10 files
    #[schema(value_type = Vec<String>, format = Binary)]
    pub files: Vec<Vec<u8>>,
}

pub struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::products::list,
        crate::routes::products::get_one,
        crate::routes::products::create,
        crate::routes::products::upload_files,
        crate::routes::products::update,
        crate::routes::products::remove,
    ),
    components(
        schemas(
            HealthResponse,
            CredentialsRequest,
            MessageResponse,
            UserSummaryDoc,
            LoginResponse,
            DetailDoc,
            FileDoc,
            ProductDoc,
            DetailInputDoc,
            CreateProductDoc,
            UpdateProductDoc,
            UploadFilesDoc,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "product")
    )
)]
pub struct ApiDoc;
