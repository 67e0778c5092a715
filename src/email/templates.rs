use askama::Template;
use chrono::Duration;

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmail<'a> {
    name: &'a str,
    app_name: &'a str,
    reset_url: &'a str,
    lifetime: String,
}

pub fn render_password_reset(
    name: &str,
    app_name: &str,
    reset_url: &str,
    ttl: Duration,
) -> Result<String, askama::Error> {
    PasswordResetEmail {
        name,
        app_name,
        reset_url,
        lifetime: describe_lifetime(ttl),
    }
    .render()
}

/// Coarse, human wording for a link lifetime ("1 hour", "2 days", "90 seconds").
pub fn describe_lifetime(ttl: Duration) -> String {
    let units = [
        (ttl.num_days(), "day"),
        (ttl.num_hours(), "hour"),
        (ttl.num_minutes(), "minute"),
        (ttl.num_seconds(), "second"),
    ];
    for (count, unit) in units {
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural}");
        }
    }
    "less than a second".to_string()
}
