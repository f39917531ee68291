//! Client-side checks run before a request or price is sent.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::{ClientError, ClientResult, ValidationErrors};
use crate::models::{NewHiringRequest, Priority};

pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 20;

lazy_static! {
    /// Loose address check: something@domain.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// A hiring request as typed in by the requester.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub service_type: Option<u64>,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl RequestDraft {
    /// Check every field and build the request body.
    ///
    /// All failures are collected. For an authenticated requester the name
    /// and email are left out; the backend takes identity from the token.
    pub fn validate(&self, authenticated: bool, today: NaiveDate) -> ClientResult<NewHiringRequest> {
        let mut errors = ValidationErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "Title is required");
        } else if title.chars().count() < MIN_TITLE_CHARS {
            errors.add("title", format!("Minimum {} characters", MIN_TITLE_CHARS));
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required");
        } else if description.chars().count() < MIN_DESCRIPTION_CHARS {
            errors.add(
                "description",
                format!("Minimum {} characters", MIN_DESCRIPTION_CHARS),
            );
        }

        if self.service_type.is_none() {
            errors.add("service_type", "Service type is required");
        }

        if let Some(deadline) = self.deadline {
            if deadline < today {
                errors.add("deadline", "Deadline cannot be in the past");
            }
        }

        let (name, email) = if authenticated {
            if self.name.is_some() || self.email.is_some() {
                debug!("Dropping name/email from an authenticated request");
            }
            (None, None)
        } else {
            let name = non_blank(&self.name);
            let email = non_blank(&self.email);
            if name.is_none() {
                errors.add("name", "Name is required");
            }
            match &email {
                None => {
                    errors.add("email", "Email is required");
                }
                Some(email) if !is_valid_email(email) => {
                    errors.add("email", "Invalid email format");
                }
                Some(_) => {}
            }
            (name, email)
        };

        errors.finish()?;

        Ok(NewHiringRequest {
            title: title.to_string(),
            description: description.to_string(),
            requirements: non_blank(&self.requirements),
            // checked above
            service_type: self.service_type.unwrap_or_default(),
            priority: self.priority,
            deadline: self.deadline,
            name,
            email,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse an admin-entered price. Must be a finite number greater than zero.
pub fn parse_price(input: &str) -> ClientResult<f64> {
    let mut errors = ValidationErrors::new();
    match input.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
        Ok(_) => {
            errors.add("quoted_price", "Price must be greater than zero");
        }
        Err(_) => {
            errors.add("quoted_price", "Please enter a valid price");
        }
    }
    Err(ClientError::Validation(errors))
}
