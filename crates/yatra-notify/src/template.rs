use crate::ConfirmationRequest;

pub const CONFIRMATION_SUBJECT: &str = "Kanwariya Yatra Registration Confirmation";
pub const DEFAULT_FROM: &str = "Kanwariya Yatra <onboarding@resend.dev>";

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<tr>\
         <td style=\"padding: 8px 0; font-weight: bold; color: #555;\">{label}:</td>\
         <td style=\"padding: 8px 0; color: #333;\">{}</td>\
         </tr>",
        escape_html(value)
    )
}

/// Renders the fixed confirmation mail. Every registration field lands in
/// the details table; the medical row is skipped when nothing was reported.
pub fn render_confirmation_html(request: &ConfirmationRequest) -> String {
    let mut rows = String::new();
    rows.push_str(&detail_row("Name", &request.full_name));
    rows.push_str(&detail_row("Email", &request.email));
    rows.push_str(&detail_row("Phone", &request.phone));
    rows.push_str(&detail_row("Age", &format!("{} years", request.age)));
    rows.push_str(&detail_row("Gender", &request.gender));
    rows.push_str(&detail_row("Address", &request.address));
    rows.push_str(&detail_row("Emergency Contact", &request.emergency_contact));
    rows.push_str(&format!(
        "<tr>\
         <td style=\"padding: 8px 0; font-weight: bold; color: #555;\">Yatra Date:</td>\
         <td style=\"padding: 8px 0; color: #ff6b35; font-weight: bold;\">{}</td>\
         </tr>",
        escape_html(&request.selected_date)
    ));
    if let Some(medical) = request
        .medical_conditions
        .as_deref()
        .filter(|m| !m.trim().is_empty())
    {
        rows.push_str(&detail_row("Medical Conditions", medical));
    }

    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9;\">\
         <div style=\"background-color: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1);\">\
         <h1 style=\"color: #ff6b35; text-align: center; margin-bottom: 30px;\">\u{1f6a9} Kanwariya Yatra Registration Confirmed</h1>\
         <p style=\"font-size: 16px; color: #333; margin-bottom: 20px;\">Namaste <strong>{name}</strong>,</p>\
         <p style=\"font-size: 16px; color: #333; margin-bottom: 20px;\">Your registration for the Kanwariya Yatra has been successfully confirmed! \u{1f64f}</p>\
         <div style=\"background-color: #fff4e6; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #ff6b35;\">\
         <h2 style=\"color: #ff6b35; margin-top: 0;\">Registration Details:</h2>\
         <table style=\"width: 100%; border-collapse: collapse;\">{rows}</table>\
         </div>\
         <div style=\"background-color: #e8f5e8; padding: 15px; border-radius: 8px; margin: 20px 0;\">\
         <h3 style=\"color: #2d5a2d; margin-top: 0;\">Important Instructions:</h3>\
         <ul style=\"color: #2d5a2d; margin: 0; padding-left: 20px;\">\
         <li>Please arrive at the designated meeting point 30 minutes before the scheduled time</li>\
         <li>Carry your ID proof and this confirmation email</li>\
         <li>Bring comfortable walking shoes and appropriate clothing</li>\
         <li>Stay hydrated and follow all safety instructions</li>\
         </ul>\
         </div>\
         <p style=\"font-size: 16px; color: #333; text-align: center; margin-top: 30px;\">Har Har Mahadev! \u{1f531}<br><em>May Lord Shiva bless your journey!</em></p>\
         <div style=\"text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee;\">\
         <p style=\"color: #888; font-size: 14px;\">For any queries, please contact us at support@kanwariyayatra.com</p>\
         </div>\
         </div>\
         </div>",
        name = escape_html(&request.full_name),
        rows = rows,
    )
}
