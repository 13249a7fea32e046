use super::FoundNotice;

pub struct NotificationTemplates;

impl NotificationTemplates {
    pub fn pet_found_subject(pet_name: &str) -> String {
        format!("🐾 {} ha sido encontrado", pet_name)
    }

    pub fn map_link(latitude: f64, longitude: f64) -> String {
        format!("https://maps.google.com/maps?q={},{}", latitude, longitude)
    }

    /// HTML body for the "your pet was found" e-mail. Every interpolated value
    /// comes from a finder or a registrant, so all of it is escaped.
    pub fn pet_found_email(notice: &FoundNotice) -> String {
        let breed_html = notice
            .pet_breed
            .as_deref()
            .map(|b| format!("<p><strong>Raza:</strong> {}</p>", escape(b)))
            .unwrap_or_default();

        let message_html = notice
            .finder_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(|m| format!("<p><strong>Mensaje:</strong> {}</p>", escape(m)))
            .unwrap_or_default();

        let address_html = notice
            .address
            .as_deref()
            .map(|a| format!("<p><strong>Ubicación:</strong> {}</p>", escape(a)))
            .unwrap_or_default();

        let map_html = notice
            .position
            .map(|p| {
                format!(
                    r#"<p><strong>Ver en mapa:</strong> <a href="{}">Abrir en Google Maps</a></p>"#,
                    Self::map_link(p.latitude, p.longitude)
                )
            })
            .unwrap_or_default();

        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background: #667eea; padding: 30px; text-align: center; color: white; }}
        .card {{ background: white; padding: 20px; border-radius: 10px; margin: 20px 0; }}
        .call {{ background: #28a745; color: white; padding: 15px 30px; text-decoration: none; border-radius: 25px; display: inline-block; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h1>¡{pet_name} ha sido encontrado!</h1></div>
        <div class="card">
            <p><strong>Fecha y hora:</strong> {reported_at}</p>
            {address_html}
            {map_html}
            <p><strong>Rescatista:</strong> {finder_name}</p>
            <p><strong>Teléfono:</strong> <a href="tel:{finder_phone}">{finder_phone}</a></p>
            {message_html}
        </div>
        <div class="card">
            <h3>Información de {pet_name}</h3>
            <p><strong>Especie:</strong> {species}</p>
            <p><strong>Color:</strong> {color}</p>
            <p><strong>Sexo:</strong> {sex}</p>
            {breed_html}
        </div>
        <div style="text-align: center;">
            <a class="call" href="tel:{finder_phone}">Llamar ahora: {finder_phone}</a>
        </div>
        <div class="footer">
            <p>Esta notificación se envió cuando alguien escaneó el código {pet_code}.</p>
        </div>
    </div>
</body>
</html>
"#,
            pet_name = escape(&notice.pet_name),
            reported_at = notice.reported_at.format("%d/%m/%Y %H:%M UTC"),
            address_html = address_html,
            map_html = map_html,
            finder_name = escape(&notice.finder_name),
            finder_phone = escape(&notice.finder_phone),
            message_html = message_html,
            species = escape(&notice.pet_species),
            color = escape(&notice.pet_color),
            sex = escape(&notice.pet_sex),
            breed_html = breed_html,
            pet_code = escape(&notice.pet_code),
        )
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
