use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::{AuthError, LoginRequest};
use crate::domain::company::{CompanyError, Mutation};
use crate::models::Company;
use super::session::{session_cookie, AuthenticatedUser};
use super::AppState;

/// Body extraction outcome. Overflow and read errors become `MalformedInput`
/// instead of actix's plain-text responses.
type Body = Result<web::Bytes, actix_web::Error>;

const DEGRADED_DELIVERY: &str = "change saved, but its event could not be published";

#[derive(Serialize)]
struct MutationBody {
    message: &'static str,
    company: Company,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

impl MutationBody {
    fn new(message: &'static str, mutation: Mutation<Company>) -> Self {
        Self {
            message,
            warning: mutation.delivery.is_degraded().then_some(DEGRADED_DELIVERY),
            company: mutation.value,
        }
    }
}

pub async fn login(state: web::Data<AppState>, body: Body) -> Result<HttpResponse, AuthError> {
    let body = body.map_err(|e| AuthError::MalformedInput(e.to_string()))?;
    let request = LoginRequest::decode(&body)?;
    let session = state.auth.authenticate(&request.username, &request.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session, state.cookie_secure))
        .json(serde_json::json!({ "message": "Login successful" })))
}

pub async fn create_company(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: Body,
) -> Result<HttpResponse, CompanyError> {
    tracing::debug!(username = %user.username, "Create company requested");
    let body = body.map_err(|e| CompanyError::MalformedInput(e.to_string()))?;
    let created = state.commands.create(&body).await?;

    Ok(HttpResponse::Created().json(MutationBody::new("Company created successfully", created)))
}

pub async fn get_company(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, CompanyError> {
    let company = state.commands.get(&id).await?;
    Ok(HttpResponse::Ok().json(company))
}

pub async fn update_company(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: Body,
) -> Result<HttpResponse, CompanyError> {
    tracing::debug!(username = %user.username, company_id = %id, "Update company requested");
    let body = body.map_err(|e| CompanyError::MalformedInput(e.to_string()))?;
    let updated = state.commands.update(&id, &body).await?;

    Ok(HttpResponse::Ok().json(MutationBody::new("Company updated successfully", updated)))
}

pub async fn delete_company(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, CompanyError> {
    tracing::debug!(username = %user.username, company_id = %id, "Delete company requested");
    // A degraded event delivery is already logged; delete always answers 204.
    state.commands.delete(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}
