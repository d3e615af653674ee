//! OTP email content

/// Subject line of every OTP email
pub const OTP_SUBJECT: &str = "DigitLens - Password Reset Code";

/// Plain-text body carrying `otp`
pub fn otp_text(otp: &str) -> String {
    format!("Your password reset code is: {otp}. It expires in 5 minutes.")
}

/// HTML body carrying `otp`, escaped
pub fn otp_html(otp: &str) -> String {
    let otp = escape_html(otp);
    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; color: #333;">
  <h2 style="color: #2563eb;">DigitLens Password Reset</h2>
  <p>You requested a password reset. Use the code below:</p>
  <div style="background: #f1f5f9; padding: 15px; border-radius: 8px; font-size: 24px; font-weight: bold; letter-spacing: 5px; text-align: center; margin: 20px 0;">
    {otp}
  </div>
  <p style="font-size: 12px; color: #666;">
    If you did not request this, you can ignore this email.
  </p>
</div>"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
