//! Mapping of client errors to user-safe messages.

use storefront_api::Error;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const CONFLICT: &str = "This operation conflicts with the current state of the resource.";
pub const SERVER_ERROR: &str = "Something went wrong on our side. Please try again.";
pub const NETWORK_ERROR: &str = "Could not reach the server. Check your connection and try again.";

/// Coarse category of a failed request, by status and transport outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401
    Unauthenticated,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 422
    Validation,
    /// 5xx
    Server,
    /// No response was received.
    Network,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthenticated,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Validation,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    pub fn classify(err: &Error) -> Self {
        match err {
            Error::Api(api) => Self::from_status(api.status),
            Error::Transport(_) => match err.status() {
                0 => Self::Network,
                status => Self::from_status(status),
            },
            _ => Self::Other,
        }
    }
}

/// The backend's own message, unless it is the `HTTP <status>` placeholder.
pub fn server_message(err: &Error) -> Option<&str> {
    let api = err.as_api()?;
    if api.message == format!("HTTP {}", api.status) {
        None
    } else {
        Some(api.message.as_str())
    }
}

/// Maps `err` to a message safe to show a shopper or admin.
///
/// `fallback` is used when the backend gave nothing usable. `on_unauthorized`
/// runs only for 401s, so the caller can clear the session or redirect; this
/// function itself changes no state.
pub fn handle_api_error(err: &Error, fallback: &str, on_unauthorized: Option<&dyn Fn()>) -> String {
    let kind = ErrorKind::classify(err);
    match err.as_api() {
        Some(api) => tracing::warn!(
            status = api.status,
            code = api.code.as_deref().unwrap_or("-"),
            request_id = api.request_id.as_deref().unwrap_or("-"),
            url = %api.url,
            "API request failed: {}",
            api.message
        ),
        None => tracing::warn!("API request failed: {}", err),
    }

    let message = match kind {
        ErrorKind::Unauthenticated => {
            if let Some(hook) = on_unauthorized {
                hook();
            }
            SESSION_EXPIRED
        }
        ErrorKind::Forbidden => FORBIDDEN,
        ErrorKind::NotFound => NOT_FOUND,
        ErrorKind::Conflict => CONFLICT,
        ErrorKind::Server => SERVER_ERROR,
        ErrorKind::Network => NETWORK_ERROR,
        ErrorKind::Validation | ErrorKind::Other => server_message(err).unwrap_or(fallback),
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use storefront_api::ApiError;

    fn api(status: u16, message: &str) -> Error {
        Error::Api(ApiError {
            status,
            message: message.to_string(),
            code: None,
            details: None,
            request_id: None,
            url: "http://localhost:5000/admin/produtos".to_string(),
        })
    }

    #[test]
    fn statuses_map_to_kinds() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthenticated);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Other);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::Other);
    }

    #[test]
    fn non_http_errors_are_other() {
        let err = Error::InvalidMethod("NO PE".to_string());
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Other);
        assert_eq!(handle_api_error(&err, "Try later", None), "Try later");
    }

    #[test]
    fn unauthorized_runs_hook() {
        let calls = Cell::new(0);
        let hook = || calls.set(calls.get() + 1);
        let msg = handle_api_error(&api(401, "jwt expired"), "x", Some(&hook));
        insta::assert_snapshot!(msg, @"Your session has expired. Please sign in again.");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hook_not_run_for_forbidden() {
        let calls = Cell::new(0);
        let hook = || calls.set(calls.get() + 1);
        let msg = handle_api_error(&api(403, "admin only"), "x", Some(&hook));
        assert_eq!(msg, FORBIDDEN);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(handle_api_error(&api(404, "no"), "x", None), NOT_FOUND);
        assert_eq!(handle_api_error(&api(409, "dup"), "x", None), CONFLICT);
        assert_eq!(handle_api_error(&api(502, "bad gateway"), "x", None), SERVER_ERROR);
    }

    #[test]
    fn validation_passes_server_message_through() {
        let msg = handle_api_error(&api(422, "CEP inválido"), "Check the form", None);
        assert_eq!(msg, "CEP inválido");
    }

    #[test]
    fn placeholder_message_uses_fallback() {
        let msg = handle_api_error(&api(422, "HTTP 422"), "Check the form", None);
        assert_eq!(msg, "Check the form");
        let msg = handle_api_error(&api(400, "HTTP 400"), "Could not save coupon", None);
        assert_eq!(msg, "Could not save coupon");
    }

    #[test]
    fn other_statuses_pass_message_through() {
        let msg = handle_api_error(&api(400, "Quantidade inválida"), "x", None);
        assert_eq!(msg, "Quantidade inválida");
    }
}
