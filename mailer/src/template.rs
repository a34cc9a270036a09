use crate::MailPayload;

/// Builds the invitation sent to someone added to a project.
pub fn project_invite(
    to: &str,
    product_name: &str,
    project_name: &str,
    dashboard_url: &str,
) -> MailPayload {
    let body = format!(
        r#"<p>You have been invited to join the project: <strong>{escaped_name}</strong>.</p>
<p>Click the button below to access the project:</p>
<a href="{dashboard_url}" style="background-color: #4CAF50; color: white; padding: 10px 20px; text-align: center; text-decoration: none; display: inline-block; font-size: 16px; margin: 10px 2px; cursor: pointer;">Go to Dashboard</a>"#,
        escaped_name = escape_html(project_name),
        dashboard_url = escape_html(dashboard_url),
    );

    MailPayload::new(
        to,
        &format!("{product_name} - Invitation to join the project: {project_name}"),
        &body,
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_names_project_and_links_dashboard() {
        let mail = project_invite(
            "bob@example.com",
            "Acme",
            "Churn model",
            "https://acme.test/dashboard",
        );

        assert_eq!(mail.to(), "bob@example.com");
        assert_eq!(
            mail.subject(),
            "Acme - Invitation to join the project: Churn model"
        );
        assert!(mail.body().contains("<strong>Churn model</strong>"));
        assert!(mail.body().contains("href=\"https://acme.test/dashboard\""));
    }

    #[test]
    fn invite_escapes_project_name() {
        let mail = project_invite("bob@example.com", "Acme", "<b>x</b>", "https://acme.test");

        assert!(mail.body().contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!mail.body().contains("<b>x</b>"));
    }
}
