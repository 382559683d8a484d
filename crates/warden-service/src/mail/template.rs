//! Invitation email contents.

use warden_core::traits::MailMessage;

/// Subject line of the invitation email.
pub const INVITATION_SUBJECT: &str = "You're invited to join Warden";

/// Builds the invitation email for `to`, linking to the accept endpoint.
pub fn invitation_email(base_url: &str, to: &str, token: &str, ttl_hours: u64) -> MailMessage {
    let link = format!(
        "{}/api/invitations/accept?token={token}",
        base_url.trim_end_matches('/')
    );

    let text_body = format!(
        "Hello!\n\n\
         You have been invited to join Warden.\n\
         Please open the link below to accept the invitation:\n\
         {link}\n\n\
         This link will expire in {ttl_hours} hours.\n\n\
         Best regards,\n\
         The Warden Team"
    );

    let html_body = format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.5;">
    <p>Hello,</p>
    <p>You have been invited to join <strong>Warden</strong>.</p>
    <p>
      <a href="{link}" style="display: inline-block; padding: 10px 20px; color: white; background-color: #4CAF50; text-decoration: none; border-radius: 5px;">
        Accept Invitation
      </a>
    </p>
    <p>This link will expire in {ttl_hours} hours.</p>
    <p>Best regards,<br>The Warden Team</p>
  </body>
</html>"#
    );

    MailMessage {
        to: to.to_string(),
        subject: INVITATION_SUBJECT.to_string(),
        text_body,
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_expiry_are_in_both_bodies() {
        let msg = invitation_email("https://warden.example/", "bob@example.com", "tok123", 48);

        let link = "https://warden.example/api/invitations/accept?token=tok123";
        assert_eq!(msg.to, "bob@example.com");
        assert!(msg.text_body.contains(link));
        assert!(msg.html_body.contains(link));
        assert!(msg.text_body.contains("expire in 48 hours"));
        assert!(msg.html_body.contains("expire in 48 hours"));
    }
}
