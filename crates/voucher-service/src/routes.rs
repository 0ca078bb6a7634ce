//! 路由配置模块

use axum::{
    Router, middleware,
    routing::get,
};
use voucher_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 折扣券路由，集合路径同时接受带与不带结尾斜杠的形式
pub fn voucher_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vouchers",
            get(handlers::voucher::list_vouchers).post(handlers::voucher::create_voucher),
        )
        .route(
            "/vouchers/",
            get(handlers::voucher::list_vouchers).post(handlers::voucher::create_voucher),
        )
        .route(
            "/vouchers/{code}",
            get(handlers::voucher::get_voucher)
                .patch(handlers::voucher::update_voucher)
                .delete(handlers::voucher::delete_voucher),
        )
}

/// 健康检查路由
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
}

/// 构建完整的应用路由，附带可观测性中间件
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(voucher_routes())
        .merge(health_routes())
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
