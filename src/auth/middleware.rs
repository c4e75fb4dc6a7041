use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::JwtKeys;
use crate::error::AppError;

/// Bearer-token guard for a scope.
///
/// On success the token's `Claims` are stored in the request extensions, where
/// `AuthenticatedUser` picks them up. `public_reads` lets `GET`/`HEAD`/`OPTIONS`
/// through untouched, which is how the product catalog stays publicly browsable while
/// its mutations require a login.
#[derive(Debug, Clone, Copy)]
pub struct AuthMiddleware {
    public_reads: bool,
}

impl AuthMiddleware {
    pub fn required() -> Self {
        Self {
            public_reads: false,
        }
    }

    pub fn public_reads() -> Self {
        Self { public_reads: true }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            public_reads: self.public_reads,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    public_reads: bool,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_read = matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);
        if self.public_reads && is_read {
            return self.forward(req);
        }

        let keys = match req.app_data::<web::Data<JwtKeys>>() {
            Some(keys) => keys.clone(),
            None => {
                return reject(
                    req,
                    AppError::InternalServerError("JwtKeys not registered".into()),
                )
            }
        };

        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match bearer {
            Some(token) => match keys.verify_access_token(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    self.forward(req)
                }
                Err(app_err) => {
                    log::debug!("rejected bearer token on {}: {}", req.path(), app_err);
                    reject(req, app_err)
                }
            },
            None => reject(req, AppError::Unauthorized("Missing token".into())),
        }
    }
}

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Short-circuits with the error rendered through the response envelope.
fn reject<B: 'static>(
    req: ServiceRequest,
    app_err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let res = req.error_response(app_err).map_into_right_body();
    Box::pin(async move { Ok(res) })
}
