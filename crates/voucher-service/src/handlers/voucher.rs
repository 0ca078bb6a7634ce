//! 折扣券 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::dto::{
    CreateVoucherRequest, ListVouchersQuery, UpdateVoucherRequest, VoucherListResponse,
    VoucherResponse,
};
use crate::error::Result;
use crate::extract::{JsonBody, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// 创建折扣券
///
/// POST /vouchers/
#[instrument(skip(state, req))]
pub async fn create_voucher(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateVoucherRequest>,
) -> Result<(StatusCode, Json<VoucherResponse>)> {
    let voucher = state
        .voucher_service
        .create_voucher(req.discount_percent, req.expires_at)
        .await?;

    Ok((StatusCode::CREATED, Json(voucher.into())))
}

/// 分页查询可用折扣券
///
/// GET /vouchers/?skip=&limit=
#[instrument(skip(state))]
pub async fn list_vouchers(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListVouchersQuery>,
) -> Result<Json<VoucherListResponse>> {
    let page = state
        .voucher_service
        .list_vouchers(query.skip, query.limit)
        .await?;

    Ok(Json(page.into()))
}

/// 获取单张可用折扣券
///
/// GET /vouchers/{code}
#[instrument(skip(state))]
pub async fn get_voucher(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VoucherResponse>> {
    let voucher = state.voucher_service.get_voucher(&code).await?;
    Ok(Json(voucher.into()))
}

/// 部分更新折扣券
///
/// PATCH /vouchers/{code}
#[instrument(skip(state, req))]
pub async fn update_voucher(
    State(state): State<AppState>,
    Path(code): Path<String>,
    JsonBody(req): JsonBody<UpdateVoucherRequest>,
) -> Result<Json<VoucherResponse>> {
    let patch = req.into_patch()?;
    let voucher = state.voucher_service.update_voucher(&code, patch).await?;
    Ok(Json(voucher.into()))
}

/// 停用折扣券（软删除）
///
/// DELETE /vouchers/{code}
#[instrument(skip(state))]
pub async fn delete_voucher(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode> {
    state.voucher_service.deactivate_voucher(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
