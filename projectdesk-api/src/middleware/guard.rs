/// Route guard
///
/// Each protected route is wrapped in a [`Guard`] carrying its allowed
/// roles. The guard runs the admission decision on the `Authorization`
/// header and, on success, stores the caller's
/// [`Identity`](projectdesk_shared::auth::middleware::Identity) in the request
/// extensions for the handler's extractor.
///
/// # Example
///
/// ```no_run
/// use axum::{handler::Handler, middleware::from_fn_with_state, routing::get, Router};
/// use projectdesk_api::middleware::guard::{guard, Guard};
/// use projectdesk_shared::auth::authorization::ADMIN_ONLY;
///
/// # fn example(secret: std::sync::Arc<str>) {
/// async fn secret_stuff() -> &'static str { "ok" }
///
/// let admin = from_fn_with_state(Guard::roles(secret, ADMIN_ONLY), guard);
/// let app: Router = Router::new().route("/admin", get(secret_stuff.layer(admin)));
/// # }
/// ```

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use projectdesk_shared::auth::authorization::{admit, RouteAccess};
use projectdesk_shared::models::user::Role;
use std::sync::Arc;

/// Access declaration of one route plus the key to verify tokens with.
#[derive(Clone)]
pub struct Guard {
    access: RouteAccess,
    secret: Arc<str>,
}

impl Guard {
    pub fn new(secret: Arc<str>, access: RouteAccess) -> Self {
        Self { access, secret }
    }

    pub fn roles(secret: Arc<str>, roles: &'static [Role]) -> Self {
        Self::new(secret, RouteAccess::Roles(roles))
    }
}

pub async fn guard(State(guard): State<Guard>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    match admit(&guard.access, header, &guard.secret) {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
        }
        Ok(None) => {}
        Err(err) => {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                error = %err,
                "Request rejected by guard"
            );
            return Err(err.into());
        }
    }

    Ok(next.run(req).await)
}
