use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;

/// Realm announced in the `WWW-Authenticate` challenge.
pub const REALM: &str = "Protected";

/// The single username/password pair allowed to open the dashboard.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        BasicCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of an `Authorization` header carrying these credentials.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Result of checking an `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// No header at all.
    Missing,
    /// Header present but unreadable or with the wrong pair.
    Denied,
    Granted,
}

impl AccessOutcome {
    /// Body sent along with the 401 challenge.
    pub fn message(&self) -> &'static str {
        match self {
            AccessOutcome::Missing => "Auth required",
            AccessOutcome::Denied => "Access denied",
            AccessOutcome::Granted => "",
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AccessOutcome::Granted)
    }
}

/// `WWW-Authenticate` header value for a 401 response.
pub fn challenge() -> String {
    format!("Basic realm=\"{}\"", REALM)
}

/// Check an `Authorization` header against the expected credentials
///
/// # Arguments
/// * `header` - Raw header value, if the request carried one
/// * `expected` - The configured username/password pair
///
/// # Returns
/// * `AccessOutcome::Missing` when there is no header
/// * `AccessOutcome::Denied` when the scheme is not `Basic`, the payload does not
///   decode to `user:password`, or the pair does not match
/// * `AccessOutcome::Granted` otherwise
pub fn check_authorization(header: Option<&str>, expected: &BasicCredentials) -> AccessOutcome {
    let Some(header) = header else {
        return AccessOutcome::Missing;
    };

    match decode_basic(header) {
        Some((user, pass)) if credentials_match(&user, &pass, expected) => AccessOutcome::Granted,
        _ => AccessOutcome::Denied,
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // The password may itself contain ':'
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn credentials_match(user: &str, pass: &str, expected: &BasicCredentials) -> bool {
    let user_ok = user.as_bytes().ct_eq(expected.username.as_bytes());
    let pass_ok = pass.as_bytes().ct_eq(expected.password.as_bytes());
    (user_ok & pass_ok).into()
}
