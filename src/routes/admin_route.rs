use crate::models::approval::{
    ApprovalDecisionResponse, ApprovalListResponse, GroupedApprovalsResponse,
};
use crate::services::approval_service::ApprovalService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Change requests still waiting for a decision
#[openapi(tag = "Admin")]
#[get("/pending")]
pub async fn list_pending(
    approval_service: &State<ApprovalService>,
) -> Result<Json<ApprovalListResponse>, AppError> {
    let approvals = approval_service.list_pending().await?;
    Ok(Json(ApprovalListResponse { approvals }))
}

/// Every change request, grouped by status
#[openapi(tag = "Admin")]
#[get("/all")]
pub async fn list_all(
    approval_service: &State<ApprovalService>,
) -> Result<Json<GroupedApprovalsResponse>, AppError> {
    let approvals = approval_service.list_grouped().await?;
    Ok(Json(GroupedApprovalsResponse { approvals }))
}

/// Approve a request and mark the referenced record Approved
#[openapi(tag = "Admin")]
#[patch("/<approval_id>/approve")]
pub async fn approve(
    approval_id: &str,
    approval_service: &State<ApprovalService>,
) -> Result<Json<ApprovalDecisionResponse>, AppError> {
    let approval = approval_service.approve(approval_id).await?;
    Ok(Json(ApprovalDecisionResponse {
        message: format!("{} approved successfully.", approval.name),
        approval,
    }))
}

#[openapi(tag = "Admin")]
#[patch("/<approval_id>/reject")]
pub async fn reject(
    approval_id: &str,
    approval_service: &State<ApprovalService>,
) -> Result<Json<ApprovalDecisionResponse>, AppError> {
    let approval = approval_service.reject(approval_id).await?;
    Ok(Json(ApprovalDecisionResponse {
        message: format!("{} rejected.", approval.name),
        approval,
    }))
}
