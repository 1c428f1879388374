//! API Key 认证中间件
//!
//! 通过 Header 中的 Authorization: Bearer <token> 进行认证
//! 只保护指定前缀的路径，配置的 Key 为空时不启用认证

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
    body::EitherBody,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::models::ApiResponse;

/// API Key 中间件
pub struct ApiKeyMiddleware {
    api_key: Rc<String>,
    protected: Rc<Vec<String>>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Rc::new(api_key),
            protected: Rc::new(Vec::new()),
        }
    }

    /// 添加需要认证的路径前缀
    pub fn protect(mut self, prefix: &str) -> Self {
        Rc::make_mut(&mut self.protected).push(prefix.to_string());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
            protected: self.protected.clone(),
        })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
    api_key: Rc<String>,
    protected: Rc<Vec<String>>,
}

impl<S> ApiKeyMiddlewareService<S> {
    fn requires_key(&self, path: &str) -> bool {
        !self.api_key.is_empty() && self.protected.iter().any(|p| path.starts_with(p.as_str()))
    }
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let api_key = self.api_key.clone();
        let requires_key = self.requires_key(req.path());

        Box::pin(async move {
            if !requires_key {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            // 验证 Bearer Token
            let provided_key = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));

            match provided_key {
                Some(key) if key == api_key.as_str() => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                _ => {
                    log::warn!("拒绝未认证请求: {}", req.path());
                    let response = HttpResponse::Unauthorized()
                        .json(ApiResponse::<()>::error("无效的 Bearer Token".to_string()));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    async fn ok_handler() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    macro_rules! app_with_key {
        ($key:expr) => {
            test::init_service(
                App::new()
                    .wrap(ApiKeyMiddleware::new($key.to_string()).protect("/api/v1/accounts"))
                    .route("/api/v1/accounts", web::get().to(ok_handler))
                    .route("/api/v1/health", web::get().to(ok_handler)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_protected_path_requires_bearer() {
        let app = app_with_key!("secret");

        let req = test::TestRequest::get().uri("/api/v1/accounts").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/v1/accounts")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/v1/accounts")
            .insert_header(("Authorization", "Bearer secret"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
    }

    #[actix_web::test]
    async fn test_unprotected_path_passes() {
        let app = app_with_key!("secret");
        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
    }

    #[actix_web::test]
    async fn test_empty_key_disables_auth() {
        let app = app_with_key!("");
        let req = test::TestRequest::get().uri("/api/v1/accounts").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
    }
}
