//! The signature block as it is shown to the user.
//!
//! [`SignaturePreview`] holds the final display strings (formatters and
//! placeholders already applied). It renders either as markup for the
//! rendering surface or as plain text for the terminal.

use crate::assets;
use crate::dom::escape_html;
use crate::fields::Field;
use crate::format;
use crate::state::FormState;
use crate::ExportConfig;

/// `id` of the element that export captures.
pub const PREVIEW_ID: &str = "signature-preview";

/// Shown in the avatar circle when the name yields no initials. Initials also
/// stand in for an avatar whose format cannot be rasterized.
pub const INITIALS_FALLBACK: &str = "?";

const PAGE_TITLE: &str = "Gerador de Assinaturas de E-mail - Prefeitura Municipal de Itaguaí";

const NAVY: &str = "#375582";
const BLUE: &str = "#0266AF";
const SLATE: &str = "#64748B";
const SKY: &str = "#0EA5E9";

/// Display strings for one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePreview {
    pub name: String,
    pub role: String,
    pub department: String,
    pub address: String,
    pub phone: String,
    pub initials: String,
    pub avatar_src: Option<String>,
    pub logo_src: Option<String>,
    pub organization: String,
}

impl SignaturePreview {
    pub fn new(state: &FormState, config: &ExportConfig) -> Self {
        let fields = state.fields();
        let or_placeholder = |value: String, field: Field| {
            if value.trim().is_empty() {
                field.placeholder().to_string()
            } else {
                value.trim().to_string()
            }
        };

        let initials = format::initials(fields.name.trim());
        Self {
            name: format::format_display_name(&fields.name),
            role: or_placeholder(format::capitalize_words(&fields.role), Field::Role),
            department: or_placeholder(fields.get(Field::Department).to_string(), Field::Department),
            address: or_placeholder(fields.address.clone(), Field::Address),
            phone: or_placeholder(format::format_phone(&fields.phone), Field::Phone),
            initials: if initials.is_empty() { INITIALS_FALLBACK.to_string() } else { initials },
            avatar_src: state
                .avatar()
                .filter(|a| assets::can_decode(a.mime()))
                .map(|a| a.data_url().to_string()),
            logo_src: config
                .logo_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            organization: config.organization.clone(),
        }
    }

    /// Terminal rendering.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n\n{}: {}\n{}: {}\n{}: {}\n",
            self.name,
            self.role,
            Field::Department.label(),
            self.department,
            Field::Address.label(),
            self.address,
            Field::Phone.label(),
            self.phone,
        )
    }

    /// Full page markup with the signature block under `#signature-preview`.
    pub fn to_html(&self) -> String {
        let avatar = match &self.avatar_src {
            Some(src) => format!(
                r#"<img src="{}" alt="Avatar" style="width: 72px; height: 72px">"#,
                escape_html(src)
            ),
            None => format!(
                r#"<p style="font-size: 32px; font-weight: bold; color: {}; padding: 20px">{}</p>"#,
                SLATE,
                escape_html(&self.initials)
            ),
        };
        let logo = match &self.logo_src {
            Some(src) => format!(
                r#"<img src="{}" alt="{}" style="width: 192px; height: 72px">"#,
                escape_html(src),
                escape_html(&self.organization)
            ),
            None => format!(
                r#"<p style="font-size: 14px; font-weight: bold; color: {}">{}</p>"#,
                NAVY,
                escape_html(&self.organization)
            ),
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="background-color: #F0F9FF">
<div id="signature-card" style="padding: 8px; background-color: #FFFFFF; border: 4px solid #FFFFFF">
<div id="{id}" style="padding: 16px; background-color: #FFFFFF">
  <div style="display: flex; gap: 16px; margin-bottom: 20px">
    <div style="width: 88px; height: 88px; border: 4px solid {sky}; background-color: #E2E8F0">{avatar}</div>
    <div style="padding: 8px">
      <p style="font-size: 20px; font-weight: bold; color: {navy}; margin-bottom: 6px">{name}</p>
      <p style="font-size: 16px; font-weight: bold; color: {blue}">{role}</p>
    </div>
    <div style="width: 192px">{logo}</div>
  </div>
  <div style="display: flex; gap: 8px; border-top: 1px solid #E2E8F0; padding-top: 20px">
    {department}
    {address}
    {phone}
  </div>
</div>
</div>
</body>
</html>
"#,
            title = PAGE_TITLE,
            id = PREVIEW_ID,
            sky = SKY,
            navy = NAVY,
            blue = BLUE,
            avatar = avatar,
            name = escape_html(&self.name),
            role = escape_html(&self.role),
            logo = logo,
            department = info_column(Field::Department, &self.department, None),
            address = info_column(Field::Address, &self.address, Some(176)),
            phone = info_column(Field::Phone, &self.phone, Some(176)),
        )
    }
}

fn info_column(field: Field, value: &str, width: Option<u32>) -> String {
    let width = width
        .map(|w| format!(r#" style="width: {}px""#, w))
        .unwrap_or_default();
    format!(
        r#"<div{width}><p style="font-size: 14px; font-weight: bold; color: {navy}; margin-bottom: 4px">{label}</p><p style="font-size: 14px; color: {slate}">{value}</p></div>"#,
        width = width,
        navy = NAVY,
        slate = SLATE,
        label = escape_html(field.label()),
        value = escape_html(value),
    )
}
