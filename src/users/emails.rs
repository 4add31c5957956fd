//! Account notices sent during registration and password recovery.
//!
//! With an `Origin` header the messages link back to the front end, otherwise
//! they carry the raw token and the API route to call.

use crate::mail::Email;

const SUBJECT_PREFIX: &str = "Sign-up Verification API";

/// Escapes text for use inside HTML element content and quoted attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn verification(to: &str, token: &str, origin: Option<&str>) -> Email {
    let message = match origin {
        Some(origin) => {
            let url = escape(&format!("{origin}/user/verify-email?token={token}"));
            format!(
                "<p>Please click the below link to verify your email address:</p>\
                 <p><a href=\"{url}\">{url}</a></p>"
            )
        }
        None => format!(
            "<p>Please use the below token to verify your email address with the \
             <code>/users/verify-email</code> api route:</p>\
             <p><code>{}</code></p>",
            escape(token)
        ),
    };

    Email {
        to: to.to_string(),
        subject: format!("{SUBJECT_PREFIX} - Verify Email"),
        html: format!("<h4>Verify Email</h4><p>Thanks for registering!</p>{message}"),
    }
}

pub fn already_registered(to: &str, origin: Option<&str>) -> Email {
    let message = match origin {
        Some(origin) => format!(
            "<p>If you don't know your password please visit the \
             <a href=\"{}/user/forgot-password\">forgot password</a> page.</p>",
            escape(origin)
        ),
        None => "<p>If you don't know your password you can reset it via the \
                 <code>/users/forgot-password</code> api route.</p>"
            .to_string(),
    };

    Email {
        to: to.to_string(),
        subject: format!("{SUBJECT_PREFIX} - Email Already Registered"),
        html: format!(
            "<h4>Email Already Registered</h4>\
             <p>Your email <strong>{}</strong> is already registered.</p>{message}",
            escape(to)
        ),
    }
}

pub fn password_reset(to: &str, token: &str, origin: Option<&str>) -> Email {
    let message = match origin {
        Some(origin) => {
            let url = escape(&format!("{origin}/user/reset-password?token={token}"));
            format!(
                "<p>Please click the below link to reset your password, \
                 the link will be valid for 1 day:</p>\
                 <p><a href=\"{url}\">{url}</a></p>"
            )
        }
        None => format!(
            "<p>Please use the below token to reset your password with the \
             <code>/users/reset-password</code> api route:</p>\
             <p><code>{}</code></p>",
            escape(token)
        ),
    };

    Email {
        to: to.to_string(),
        subject: format!("{SUBJECT_PREFIX} - Reset Password"),
        html: format!("<h4>Reset Password Email</h4>{message}"),
    }
}
