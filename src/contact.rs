//! Deep links built from the contact settings.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;
use crate::quote::QuoteForm;

pub const DEFAULT_WHATSAPP_MESSAGE: &str =
    "Hi! I'm interested in a cleaning quote. Could you help me schedule an estimate?";

/// Bytes left as-is in a query value; the same set `encodeURIComponent` keeps.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

pub fn tel_href(phone: &str) -> String {
    format!("tel:{phone}")
}

pub fn mailto_href(email: &str) -> String {
    format!("mailto:{email}")
}

/// `https://wa.me/<digits>?text=<message>`. Everything but digits is stripped
/// from the phone number.
pub fn whatsapp_href(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}?text={}", encode(message))
}

/// Embeddable map centred on a free-text location.
pub fn map_embed_url(query: &str, zoom: u8) -> String {
    format!(
        "https://www.google.com/maps?q={}&z={zoom}&output=embed",
        encode(query)
    )
}

/// Full map search page for a free-text location.
pub fn map_view_url(query: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        encode(query)
    )
}

/// Ready-made links for the contact tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLinks {
    pub tel: String,
    pub mailto: String,
    pub whatsapp: String,
    pub map_embed: String,
    pub map_view: String,
}

impl ContactLinks {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            tel: tel_href(&config.phone_tel),
            mailto: mailto_href(&config.email),
            whatsapp: whatsapp_href(&config.phone_tel, DEFAULT_WHATSAPP_MESSAGE),
            map_embed: map_embed_url(&config.address, config.map_zoom),
            map_view: map_view_url(&config.address),
        }
    }
}

/// WhatsApp link offered after a quote is sent, prefilled from the form.
pub fn quote_follow_up_href(config: &SiteConfig, form: &QuoteForm) -> String {
    whatsapp_href(&config.phone_tel, &form.follow_up_message(&config.business_name))
}
