use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Authenticated user identity forwarded by the fronting auth gateway.
/// Session handling itself lives outside this service; the gateway strips any
/// client-supplied `x-user-id` and installs the verified one.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or("");

        if user_id.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthedUser(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthedUser, AppError> {
        let (mut parts, _) = request.into_parts();
        AuthedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_the_forwarded_identity() {
        let request = Request::builder()
            .header("x-user-id", "user-42")
            .body(())
            .unwrap();
        let user = extract(request).await.unwrap();
        assert_eq!(user.0, "user-42");
    }

    #[tokio::test]
    async fn rejects_missing_or_blank_identity() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await.unwrap_err(),
            AppError::Unauthorized
        ));

        let request = Request::builder()
            .header("x-user-id", "   ")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await.unwrap_err(),
            AppError::Unauthorized
        ));
    }
}
