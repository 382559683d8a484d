//! The `refresh_token` cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;

/// Cookie carrying the raw refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Builds the refresh cookie: HttpOnly, SameSite=Lax, Path=/, expiring
/// with the session. `secure` is set in production.
pub fn refresh_cookie(raw: String, expires_at: DateTime<Utc>, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, raw))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();

    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}

/// A cookie that clears the refresh cookie: empty value, zero max-age,
/// expiry in the past.
pub fn refresh_cookie_removal(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::CookieJar;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn refresh_cookie_attributes() {
        let expires_at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let cookie = refresh_cookie("raw-value".to_string(), expires_at, true);

        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "raw-value");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(expires_at.timestamp())
        );
    }

    #[test]
    fn removal_clears_the_value() {
        let jar = CookieJar::new().add(refresh_cookie_removal(false));
        let removal = jar.get(REFRESH_COOKIE).unwrap();

        assert_eq!(removal.value(), "");
        assert_eq!(removal.path(), Some("/"));
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
    }
}
