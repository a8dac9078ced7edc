//! HTML bodies of the account e-mails.

const BRAND: &str = "Grupo Tel Aviv";

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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; background-color: #f4f4f4; font-family: Arial, sans-serif;">
  <table align="center" border="0" cellpadding="0" cellspacing="0" width="600" style="max-width: 600px; margin: 20px auto; background-color: #ffffff;">
    <tr style="background-color: #005d7c; color: #ffffff;">
      <td style="padding: 20px 30px;"><h1 style="margin: 0; font-size: 22px;">{title}</h1></td>
    </tr>
    <tr>
      <td style="padding: 30px; color: #555555; font-size: 16px; line-height: 1.5;">
{body}
      </td>
    </tr>
    <tr style="background-color: #f9f9f9;">
      <td style="padding: 20px 30px; text-align: center; color: #777777; font-size: 14px;">Atenciosamente,<br><strong>{BRAND}</strong></td>
    </tr>
  </table>
</body>
</html>
"#
    )
}

pub const WELCOME_SUBJECT: &str = "Bem-vindo ao Sistema";
pub const RECOVERY_SUBJECT: &str = "Recuperação de Senha";
pub const PASSWORD_CHANGED_SUBJECT: &str = "Sua senha foi alterada com sucesso!";

/// Welcome mail carrying the temporary password.
pub fn welcome(name: &str, email: &str, temporary_password: &str) -> String {
    let body = format!(
        r#"        <p>Olá, {name}!</p>
        <p>Sua conta foi criada. Use os dados abaixo para o primeiro acesso:</p>
        <p><strong>E-mail:</strong> {email}<br><strong>Senha temporária:</strong> {password}</p>
        <p>Recomendamos trocar a senha após o primeiro acesso.</p>"#,
        name = escape(name),
        email = escape(email),
        password = escape(temporary_password),
    );
    layout("Bem-vindo", &body)
}

/// Password reset mail with the recovery link.
pub fn recovery(username: &str, link: &str) -> String {
    let body = format!(
        r#"        <p>Olá, {name}!</p>
        <p>Recebemos uma solicitação para redefinir a senha da sua conta.</p>
        <p><a href="{link}" target="_blank" style="background-color: #005d7c; color: #ffffff; padding: 14px 28px; text-decoration: none; border-radius: 5px;">Redefinir Minha Senha</a></p>
        <p>Se você não solicitou esta alteração, ignore este e-mail.</p>"#,
        name = escape(username),
        link = escape(link),
    );
    layout(RECOVERY_SUBJECT, &body)
}

/// Confirmation that the password changed.
pub fn password_changed(username: &str) -> String {
    let body = format!(
        r#"        <p>Olá, {name},</p>
        <p>Este é um e-mail para confirmar que a senha da sua conta foi alterada com sucesso.</p>
        <p>Se você não realizou esta alteração, entre em contato com o suporte imediatamente.</p>"#,
        name = escape(username),
    );
    layout("Senha Alterada com Sucesso", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_includes_credentials() {
        let html = welcome("Ana", "ana@example.com", "s3cr3t-pass");
        assert!(html.contains("Olá, Ana!"));
        assert!(html.contains("ana@example.com"));
        assert!(html.contains("s3cr3t-pass"));
    }

    #[test]
    fn recovery_links_to_the_reset_page() {
        let html = recovery("ana", "https://panel.test/recuperar/abc");
        assert!(html.contains(r#"href="https://panel.test/recuperar/abc""#));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = password_changed("<script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
