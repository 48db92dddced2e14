//! Quote request form: state, a pure reducer, validation and submission.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::multipart;
use tracing::{info, warn};

use crate::{ReviewsError, ReviewsResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuoteField {
    Name,
    City,
    Email,
    Phone,
    Facility,
    Frequency,
    BestTime,
    Notes,
    Consent,
    /// Hidden honeypot; people leave it empty, bots do not.
    Company,
}

impl QuoteField {
    /// Form field name as posted.
    pub fn key(self) -> &'static str {
        match self {
            QuoteField::Name => "name",
            QuoteField::City => "city",
            QuoteField::Email => "email",
            QuoteField::Phone => "phone",
            QuoteField::Facility => "facility",
            QuoteField::Frequency => "frequency",
            QuoteField::BestTime => "best_time",
            QuoteField::Notes => "notes",
            QuoteField::Consent => "consent",
            QuoteField::Company => "company",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContactMethod {
    #[default]
    PhoneCall,
    WhatsApp,
    Email,
}

impl ContactMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactMethod::PhoneCall => "Phone call",
            ContactMethod::WhatsApp => "WhatsApp",
            ContactMethod::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteForm {
    pub name: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub facility: String,
    pub frequency: String,
    pub contact_method: ContactMethod,
    pub best_time: String,
    pub notes: String,
    pub consent: bool,
    pub company: String,
    /// Validation message per field, in form order.
    pub errors: BTreeMap<QuoteField, &'static str>,
    pub status: SubmitStatus,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            city: String::new(),
            email: String::new(),
            phone: String::new(),
            facility: String::new(),
            frequency: String::new(),
            contact_method: ContactMethod::default(),
            best_time: String::new(),
            notes: String::new(),
            consent: true,
            company: String::new(),
            errors: BTreeMap::new(),
            status: SubmitStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteAction {
    /// Change a text field. Validated fields are re-checked right away.
    Edit(QuoteField, String),
    SetContactMethod(ContactMethod),
    SetConsent(bool),
    Submit,
    /// Outcome of the POST started by `Submit`.
    Settled { ok: bool },
    Reset,
}

const VALIDATED: [QuoteField; 7] = [
    QuoteField::Name,
    QuoteField::City,
    QuoteField::Email,
    QuoteField::Phone,
    QuoteField::Facility,
    QuoteField::Frequency,
    QuoteField::Consent,
];

impl QuoteForm {
    fn text(&self, field: QuoteField) -> Option<&str> {
        let value = match field {
            QuoteField::Name => &self.name,
            QuoteField::City => &self.city,
            QuoteField::Email => &self.email,
            QuoteField::Phone => &self.phone,
            QuoteField::Facility => &self.facility,
            QuoteField::Frequency => &self.frequency,
            QuoteField::BestTime => &self.best_time,
            QuoteField::Notes => &self.notes,
            QuoteField::Company => &self.company,
            QuoteField::Consent => return None,
        };
        Some(value)
    }

    fn text_mut(&mut self, field: QuoteField) -> Option<&mut String> {
        let value = match field {
            QuoteField::Name => &mut self.name,
            QuoteField::City => &mut self.city,
            QuoteField::Email => &mut self.email,
            QuoteField::Phone => &mut self.phone,
            QuoteField::Facility => &mut self.facility,
            QuoteField::Frequency => &mut self.frequency,
            QuoteField::BestTime => &mut self.best_time,
            QuoteField::Notes => &mut self.notes,
            QuoteField::Company => &mut self.company,
            QuoteField::Consent => return None,
        };
        Some(value)
    }

    /// Message for `field`, `None` when it is valid or never validated.
    pub fn validate_field(&self, field: QuoteField) -> Option<&'static str> {
        let value = self.text(field).unwrap_or_default();
        match field {
            QuoteField::Name if value.trim().is_empty() => Some("Your name is required."),
            QuoteField::City if value.trim().is_empty() => Some("Your city is required."),
            QuoteField::Email if value.trim().is_empty() => Some("Email is required."),
            QuoteField::Email if !EMAIL_RE.is_match(value.trim()) => Some("Enter a valid email."),
            QuoteField::Phone if value.trim().is_empty() => Some("Phone number is required."),
            QuoteField::Phone if digit_count(value) < MIN_PHONE_DIGITS => {
                Some("Enter a valid phone (min. 8 digits).")
            }
            QuoteField::Facility if value.is_empty() => Some("Please select a facility type."),
            QuoteField::Frequency if value.is_empty() => {
                Some("Please select a cleaning frequency.")
            }
            QuoteField::Consent if !self.consent => {
                Some("You must agree to be contacted to proceed.")
            }
            _ => None,
        }
    }

    pub fn validate_all(&self) -> BTreeMap<QuoteField, &'static str> {
        VALIDATED
            .into_iter()
            .filter_map(|f| self.validate_field(f).map(|msg| (f, msg)))
            .collect()
    }

    fn revalidate(&mut self, field: QuoteField) {
        match self.validate_field(field) {
            Some(msg) => self.errors.insert(field, msg),
            None => self.errors.remove(&field),
        };
    }

    /// Field to focus after a failed submit.
    pub fn first_error(&self) -> Option<QuoteField> {
        self.errors.keys().next().copied()
    }

    pub fn honeypot_filled(&self) -> bool {
        !self.company.is_empty()
    }

    /// Named fields to post: trimmed, empty ones left out, honeypot never sent.
    pub fn payload(&self) -> Vec<(&'static str, String)> {
        let mut out: Vec<(&'static str, String)> = [
            QuoteField::Name,
            QuoteField::City,
            QuoteField::Email,
            QuoteField::Phone,
            QuoteField::Facility,
            QuoteField::Frequency,
        ]
        .into_iter()
        .filter_map(|f| self.text(f).map(|v| (f.key(), v.trim().to_string())))
        .collect();

        out.push(("contact_method", self.contact_method.as_str().to_string()));
        for f in [QuoteField::BestTime, QuoteField::Notes] {
            if let Some(v) = self.text(f) {
                out.push((f.key(), v.trim().to_string()));
            }
        }
        if self.consent {
            out.push((QuoteField::Consent.key(), "on".to_string()));
        }

        out.retain(|(_, v)| !v.is_empty());
        out
    }

    /// Prefilled WhatsApp text offered after a successful submission.
    pub fn follow_up_message(&self, business: &str) -> String {
        let name = non_empty(&self.name).unwrap_or("a new lead");
        let city = non_empty(&self.city).unwrap_or("the SF Bay Area");

        let mut lines = vec![format!("Hi {business}! I'm {name} from {city}.")];
        if let Some(f) = non_empty(&self.facility) {
            lines.push(format!("Facility: {f}."));
        }
        if let Some(f) = non_empty(&self.frequency) {
            lines.push(format!("Frequency: {f}."));
        }
        if let Some(t) = non_empty(&self.best_time) {
            lines.push(format!("Best time to contact: {t}."));
        }
        lines.push("I'd like to schedule a quick call for a custom quote.".to_string());
        lines.join(" ")
    }
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Apply `action` to `state`.
pub fn reduce(mut state: QuoteForm, action: QuoteAction) -> QuoteForm {
    match action {
        QuoteAction::Edit(field, value) => {
            if let Some(slot) = state.text_mut(field) {
                *slot = value;
            }
            if VALIDATED.contains(&field) {
                state.revalidate(field);
            }
        }
        QuoteAction::SetContactMethod(method) => state.contact_method = method,
        QuoteAction::SetConsent(consent) => {
            state.consent = consent;
            state.revalidate(QuoteField::Consent);
        }
        QuoteAction::Submit => {
            if state.status == SubmitStatus::Submitting || state.honeypot_filled() {
                return state;
            }
            state.errors = state.validate_all();
            if state.errors.is_empty() {
                state.status = SubmitStatus::Submitting;
            }
        }
        QuoteAction::Settled { ok } => {
            if state.status != SubmitStatus::Submitting {
                return state;
            }
            if ok {
                return QuoteForm {
                    status: SubmitStatus::Sent,
                    ..QuoteForm::default()
                };
            }
            state.status = SubmitStatus::Failed;
        }
        QuoteAction::Reset => return QuoteForm::default(),
    }
    state
}

/// Posts quote forms to the third-party form endpoint.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    endpoint: String,
}

impl QuoteClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// POST the form's payload as multipart form data. One attempt.
    pub async fn submit(&self, form: &QuoteForm) -> ReviewsResult<()> {
        let body = form
            .payload()
            .into_iter()
            .fold(multipart::Form::new(), |body, (k, v)| body.text(k, v));

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "quote submission did not reach the endpoint");
                ReviewsError::Submission(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "quote submission rejected");
            return Err(ReviewsError::Submission(status.to_string()));
        }
        info!(endpoint = %self.endpoint, "quote submitted");
        Ok(())
    }
}
