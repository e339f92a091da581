//! Rendering of license expiry notification emails.
//!
//! All due licenses for a client are batched into a single message with a
//! plain-text body and an HTML body.

use crate::models::{Client, License};

/// Rendered text and HTML bodies for one notification email.
#[derive(Debug, Clone)]
pub struct EmailBodies {
    pub text: String,
    pub html: String,
}

/// Render the expiry notification email for a client and its due licenses.
pub fn render_expiry_email(client: &Client, expiring_licenses: &[License]) -> EmailBodies {
    let text = render_text(client, expiring_licenses);
    let html = render_html(client, expiring_licenses);
    EmailBodies { text, html }
}

fn render_text(client: &Client, expiring_licenses: &[License]) -> String {
    let mut lines = String::new();
    for license in expiring_licenses {
        lines.push_str(&format!(
            "  - {} ({}), expires {}\n",
            license.package.display_name(),
            license.kind,
            license.expires_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    format!(
        r#"Hi {name},

The following licenses held by {client} are approaching expiration:

{lines}
Please contact your account manager to arrange renewal.

Best regards,
The License Portal Team"#,
        name = client.poc_contact_name,
        client = client.client_name,
        lines = lines
    )
}

fn render_html(client: &Client, expiring_licenses: &[License]) -> String {
    let mut items = String::new();
    for license in expiring_licenses {
        items.push_str(&format!(
            "            <li><strong>{}</strong> ({}) &mdash; expires {}</li>\n",
            license.package.display_name(),
            license.kind,
            license.expires_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>License expiry info</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #1f2a44; padding: 30px; border-radius: 10px 10px 0 0;">
        <h1 style="color: white; margin: 0; font-size: 24px;">License Portal</h1>
    </div>
    <div style="background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px;">
        <h2 style="color: #333; margin-top: 0;">Upcoming license expirations</h2>
        <p>Hi {name},</p>
        <p>The following licenses held by {client} are approaching expiration:</p>
        <ul>
{items}        </ul>
        <p>Please contact your account manager to arrange renewal.</p>
        <hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;">
        <p style="color: #999; font-size: 12px;">You receive this message because you are the point of contact for {client}.</p>
    </div>
</body>
</html>"#,
        name = client.poc_contact_name,
        client = client.client_name,
        items = items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LicenseKind, Package};
    use chrono::{Duration, TimeZone, Utc};

    fn fixture_client() -> Client {
        Client {
            id: 1,
            client_name: "Client A".to_string(),
            poc_contact_name: "Client Admin A".to_string(),
            poc_contact_email: "poc@clienta.example.com".to_string(),
            admin_owner: "admin@portal.example.com".to_string(),
        }
    }

    fn fixture_license(id: i64, package: Package) -> License {
        let now = Utc.with_ymd_and_hms(2023, 2, 18, 15, 0, 0).unwrap();
        License {
            id,
            client_id: 1,
            package,
            kind: LicenseKind::Production,
            created_at: now,
            expires_at: now + Duration::days(6),
        }
    }

    #[test]
    fn test_html_contains_package_display_names() {
        let licenses = vec![
            fixture_license(1, Package::SdkJs),
            fixture_license(2, Package::SdkIos),
        ];
        let bodies = render_expiry_email(&fixture_client(), &licenses);

        assert!(bodies.html.contains("JavaScript SDK"));
        assert!(bodies.html.contains("iOS SDK"));
    }

    #[test]
    fn test_text_addresses_contact_and_names_client() {
        let licenses = vec![fixture_license(1, Package::SdkAndroid)];
        let bodies = render_expiry_email(&fixture_client(), &licenses);

        assert!(bodies.text.contains("Hi Client Admin A"));
        assert!(bodies.text.contains("Client A"));
        assert!(bodies.text.contains("Android SDK"));
        assert!(bodies.text.contains("2023-02-24"));
    }

    #[test]
    fn test_one_list_item_per_license() {
        let licenses = vec![
            fixture_license(1, Package::SdkJs),
            fixture_license(2, Package::SdkIos),
            fixture_license(3, Package::SdkAndroid),
        ];
        let bodies = render_expiry_email(&fixture_client(), &licenses);

        assert_eq!(bodies.html.matches("<li>").count(), 3);
    }
}
