//! One-time flash messages, carried in a short-lived cookie: set when a
//! handler redirects, read and cleared when the next view renders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use notejam_types::api::Flash;

pub const FLASH_COOKIE: &str = "notejam_flash";

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    // Base64 keeps the JSON payload inside the cookie-value charset
    let value = B64.encode(serde_json::to_string(&flash).unwrap_or_default());
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash: Option<Flash> = jar
        .get(FLASH_COOKIE)
        .and_then(|c| B64.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());

    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, None);
    }
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    (jar, flash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_take_clears() {
        let jar = CookieJar::new();
        let jar = set(jar, Flash::success("Now you can sign in"));

        let (jar, flash) = take(jar);
        let flash = flash.unwrap();
        assert_eq!(flash.message, "Now you can sign in");

        let (_, flash) = take(jar);
        assert!(flash.is_none());
    }

    #[test]
    fn garbage_cookie_yields_no_flash() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "not json"));
        let (_, flash) = take(jar);
        assert!(flash.is_none());
    }
}
