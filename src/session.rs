//! Mode and technician selection carried in cookies.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use strum::{Display, EnumString};
use utoipa::ToSchema;

pub const MODE_COOKIE: &str = "gw_mode";
pub const TECHNICIAN_COOKIE: &str = "gw_tech_id";

/// One year, matching how long the selection sticks on a floor terminal.
const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Admin,
    Technician,
}

impl Mode {
    /// Landing page for the mode.
    pub fn home_path(&self) -> &'static str {
        match self {
            Mode::Technician => "/floor/station",
            Mode::Admin => "/builds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NavEntry {
    pub href: String,
    pub label: String,
}

const ADMIN_NAV: [(&str, &str); 5] = [
    ("/admin/summary", "Summary"),
    ("/builds", "Builds"),
    ("/parts", "Parts"),
    ("/inventory", "Inventory"),
    ("/work-orders", "Work Orders"),
];

const TECHNICIAN_NAV: [(&str, &str); 4] = [
    ("/floor/station", "Station"),
    ("/technician/summary", "Summary"),
    ("/floor", "Today Board"),
    ("/floor/log", "Quick Log"),
];

pub fn navigation(mode: Mode) -> Vec<NavEntry> {
    let entries: &[(&str, &str)] = match mode {
        Mode::Admin => &ADMIN_NAV,
        Mode::Technician => &TECHNICIAN_NAV,
    };
    entries
        .iter()
        .map(|(href, label)| NavEntry {
            href: href.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Session state read from the request cookies. Never rejects: unknown or
/// missing values fall back to admin mode with no technician.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub mode: Mode,
    pub technician_id: Option<i64>,
}

impl Session {
    pub fn from_cookie_header(raw: &str) -> Self {
        let mode = cookie_value(raw, MODE_COOKIE)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let technician_id = cookie_value(raw, TECHNICIAN_COOKIE)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse().ok());
        Self {
            mode,
            technician_id,
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(Session::from_cookie_header)
            .fold(Session::default(), |acc, next| Session {
                mode: if next.mode != Mode::default() { next.mode } else { acc.mode },
                technician_id: next.technician_id.or(acc.technician_id),
            });
        Ok(session)
    }
}

/// `Set-Cookie` value for a session cookie.
pub fn set_cookie(name: &str, value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; Max-Age={}",
        name, value, COOKIE_MAX_AGE_SECS
    ))
    .ok()
}
