//! Cookie-carried sessions.
//!
//! The cookie value is `username|email` with each field percent-encoded, so
//! non-ASCII text and the delimiter itself survive the trip. It is neither signed
//! nor encrypted and nothing is stored server-side, so any client can forge a
//! session for any user. This is a known security defect of the current
//! design and must not be relied on for authorization.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

pub const DELIMITER: char = '|';

// Bytes that are not valid cookie octets, plus the delimiter and `%` itself.
// Non-ASCII bytes are always escaped.
const FIELD: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'|');

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

// Ten years; keeps the expiry arithmetic in range for absurd configs.
const MAX_SESSION_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No session cookie")]
    Missing,

    #[error("Malformed session cookie")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub email: String,
}

impl Session {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            utf8_percent_encode(&self.username, FIELD),
            DELIMITER,
            utf8_percent_encode(&self.email, FIELD)
        )
    }

    pub fn decode(value: &str) -> Result<Self, SessionError> {
        let parts: Vec<&str> = value.split(DELIMITER).collect();
        match parts.as_slice() {
            [username, email] => Ok(Self::new(decode_field(username)?, decode_field(email)?)),
            _ => Err(SessionError::Malformed),
        }
    }
}

/// Set-Cookie value carrying `session`, valid for `hours`.
pub fn session_cookie(name: &str, session: &Session, hours: u64) -> String {
    let hours = hours.min(MAX_SESSION_HOURS) as i64;
    let expires = Utc::now() + Duration::hours(hours);
    format!(
        "{}={}; Path=/; Expires={}; Max-Age={}",
        name,
        session.encode(),
        expires.format(HTTP_DATE),
        hours * 3600
    )
}

/// Set-Cookie value that makes the client drop the session.
pub fn clear_session_cookie(name: &str) -> String {
    format!(
        "{}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0",
        name
    )
}

pub fn read_session(headers: &HeaderMap, name: &str) -> Result<Session, SessionError> {
    let value = get_cookie_value(headers, name).ok_or(SessionError::Missing)?;
    Session::decode(value)
}

fn decode_field(field: &str) -> Result<String, SessionError> {
    percent_decode_str(field)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| SessionError::Malformed)
}

fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
