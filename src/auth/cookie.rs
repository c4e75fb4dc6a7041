//! The HTTP-only cookie that carries the refresh token.

use actix_web::cookie::{time, Cookie, SameSite};

use crate::config::Environment;

pub const REFRESH_COOKIE: &str = "refreshToken";

fn base(value: String, environment: Environment) -> Cookie<'static> {
    let same_site = if environment.is_production() {
        SameSite::Strict
    } else {
        SameSite::Lax
    };
    Cookie::build(REFRESH_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(same_site)
        .finish()
}

pub fn refresh_cookie(
    token: String,
    environment: Environment,
    max_age: chrono::Duration,
) -> Cookie<'static> {
    let mut cookie = base(token, environment);
    cookie.set_max_age(time::Duration::seconds(max_age.num_seconds()));
    cookie
}

/// A cookie that makes the browser drop the refresh token.
pub fn removal_cookie(environment: Environment) -> Cookie<'static> {
    let mut cookie = base(String::new(), environment);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_cookie_attributes() {
        let cookie = refresh_cookie(
            "token".into(),
            Environment::Development,
            chrono::Duration::days(7),
        );
        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn test_production_cookie_is_hardened() {
        let cookie = refresh_cookie(
            "token".into(),
            Environment::Production,
            chrono::Duration::days(7),
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(Environment::Development);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
