//! HTML pages served to the payer's browser.

use crate::session::{Amount, PaymentStatus, SessionId};

const BRAND_BACKGROUND: &str = "linear-gradient(180deg, #A50064 0%, #7B004B 100%)";
const NEUTRAL_BACKGROUND: &str = "linear-gradient(135deg, #f8f9fa 0%, #e9ecef 100%)";

const CHECK_ICON: &str = r#"<path d="M9 16.17L4.83 12l-1.42 1.41L9 19 21 7l-1.41-1.41z"/>"#;
const CROSS_ICON: &str = r#"<path d="M19 6.41L17.59 5 12 10.59 6.41 5 5 6.41 10.59 12 5 17.59 6.41 19 12 13.41 17.59 19 19 17.59 13.41 12z"/>"#;

/// Message shown when a session is unknown or past its TTL.
pub const NOT_FOUND_MESSAGE: &str = "Phien thanh toan khong ton tai hoac da het han.";

/// Message shown when a session was already confirmed or cancelled.
pub const ALREADY_PROCESSED_MESSAGE: &str = "Phien thanh toan da duoc xu ly truoc do.";

/// Format an amount the way vi-VN locales do: `.` groups thousands, `,`
/// separates at most three fraction digits.
pub fn format_vnd(amount: f64) -> String {
    let fixed = format!("{:.3}", amount);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = group_thousands(int_part);
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn layout(title: &str, background: &str, style: &str, card: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: {background};
            min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 20px;
        }}
        .card {{
            background: white; border-radius: 24px; padding: 40px; text-align: center;
            box-shadow: 0 20px 60px rgba(0,0,0,0.2); max-width: 380px; width: 100%;
        }}
{style}
    </style>
</head>
<body>
    <div class="card">
{card}
    </div>
</body>
</html>"#
    )
}

fn result_page(
    title: &str,
    heading: &str,
    outcome: &str,
    color: &str,
    gradient: &str,
    icon: &str,
) -> String {
    let style = format!(
        r#"        .icon {{
            width: 80px; height: 80px; background: {gradient};
            border-radius: 50%; display: flex; align-items: center; justify-content: center;
            margin: 0 auto 24px;
        }}
        .icon svg {{ width: 40px; height: 40px; fill: white; }}
        h1 {{ color: {color}; font-size: 24px; margin-bottom: 12px; }}
        p {{ color: #6c757d; font-size: 16px; line-height: 1.5; }}"#
    );
    let card = format!(
        r#"        <div class="icon"><svg viewBox="0 0 24 24">{icon}</svg></div>
        <h1>{heading}</h1>
        <p>Giao dich cua ban {outcome}.<br>Ban co the dong tab nay.</p>"#
    );
    layout(title, NEUTRAL_BACKGROUND, &style, &card)
}

/// Confirmation page for a pending session.
pub fn payment_page(id: &SessionId, amount: Amount) -> String {
    let style = r#"        .logo { width: 72px; height: 72px; margin: 0 auto 20px; }
        .logo img { width: 100%; height: 100%; object-fit: contain; }
        h1 { color: #A50064; font-size: 22px; font-weight: 700; margin-bottom: 8px; }
        .subtitle { color: #666; font-size: 14px; margin-bottom: 24px; }
        .amount-label { color: #888; font-size: 14px; margin-bottom: 8px; }
        .amount { font-size: 36px; font-weight: 700; color: #1a1a1a; margin-bottom: 8px; }
        .currency { color: #666; font-size: 14px; margin-bottom: 32px; }
        .divider { height: 1px; background: #eee; margin: 24px 0; }
        .btn {
            width: 100%; padding: 16px 24px; border: none; border-radius: 12px;
            font-size: 16px; font-weight: 600; cursor: pointer; margin-bottom: 12px;
        }
        .btn-confirm { background: linear-gradient(135deg, #A50064 0%, #D6006F 100%); color: white; }
        .btn-cancel { background: #f0f0f0; color: #666; }
        .security-note { margin-top: 20px; font-size: 12px; color: #999; }"#;
    let card = format!(
        r#"        <div class="logo">
            <img src="https://upload.wikimedia.org/wikipedia/vi/f/fe/MoMo_Logo.png" alt="MoMo Logo" />
        </div>
        <h1>Thanh toan MoMo</h1>
        <p class="subtitle">Don hang tu MyShop</p>
        <p class="amount-label">So tien thanh toan</p>
        <p class="amount">{amount}</p>
        <p class="currency">VND</p>
        <div class="divider"></div>
        <form action="/api/confirm/{id}" method="POST">
            <button class="btn btn-confirm" type="submit">Xac nhan thanh toan</button>
        </form>
        <form action="/api/cancel/{id}" method="POST">
            <button class="btn btn-cancel" type="submit">Huy</button>
        </form>
        <p class="security-note">Giao dich duoc bao mat boi MoMo</p>"#,
        amount = format_vnd(amount.value()),
    );
    layout("Thanh toan MoMo", BRAND_BACKGROUND, style, &card)
}

/// Shown after a successful confirmation.
pub fn success_page() -> String {
    result_page(
        "Thanh toan thanh cong",
        "Thanh toan thanh cong!",
        "da duoc xu ly",
        "#28a745",
        "linear-gradient(135deg, #28a745 0%, #20c997 100%)",
        CHECK_ICON,
    )
}

/// Shown after a cancellation.
pub fn cancelled_page() -> String {
    result_page(
        "Da huy thanh toan",
        "Da huy thanh toan",
        "da bi huy",
        "#6c757d",
        "linear-gradient(135deg, #6c757d 0%, #adb5bd 100%)",
        CROSS_ICON,
    )
}

/// Shown when the payment page is opened for an unknown or expired session.
pub fn expired_page() -> String {
    layout(
        "Phien het han",
        BRAND_BACKGROUND,
        "        h1 { color: #dc3545; font-size: 22px; margin-bottom: 12px; }\n        p { color: #666; font-size: 15px; }",
        "        <h1>Phien thanh toan het han</h1>\n        <p>Vui long tao giao dich moi tu ung dung.</p>",
    )
}

/// Shown when the payment page is opened for a finalized session.
pub fn processed_page(status: PaymentStatus) -> String {
    let (color, heading) = match status {
        PaymentStatus::Success => ("#28a745", "Giao dich da thanh cong"),
        _ => ("#6c757d", "Giao dich da bi huy"),
    };
    let style = format!(
        "        h1 {{ color: {color}; font-size: 22px; margin-bottom: 12px; }}\n        p {{ color: #666; font-size: 15px; }}"
    );
    let card = format!(
        "        <h1>{heading}</h1>\n        <p>Phien thanh toan nay da duoc xu ly truoc do.</p>"
    );
    layout("Giao dich da xu ly", BRAND_BACKGROUND, &style, &card)
}

/// Generic error card.
pub fn error_page(message: &str) -> String {
    layout(
        "Loi",
        BRAND_BACKGROUND,
        "        h1 { color: #dc3545; font-size: 20px; }",
        &format!("        <h1>{}</h1>", escape_html(message)),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
