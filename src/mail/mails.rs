use super::sendmail::send_email;

pub fn create_reset_link(app_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", app_url.trim_end_matches('/'), token)
}

pub async fn send_forgot_password_email(
    to_email: &str,
    reset_link: &str,
    username: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Reset your HIRE.me password";
    let template_path = "src/mail/templates/ResetPassword-email.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{reset_link}}".to_string(), reset_link.to_string()),
    ];

    send_email(to_email, subject, template_path, &placeholders).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_points_at_frontend() {
        assert_eq!(
            create_reset_link("http://localhost:5173/", "abc123"),
            "http://localhost:5173/reset-password?token=abc123"
        );
    }
}
