//! Measurement report handed to the mail composer.

use std::fmt;

use crate::error::ReportError;

/// Placeholder for fields without a value.
pub const NOT_AVAILABLE: &str = "N/A";

const FIRST_NAME: &str = "First name";
const LAST_NAME: &str = "Last name";
const EMAIL_ADDRESS: &str = "Email address";
const FAR_PD: &str = "Far PD";
const NEAR_PD: &str = "Near PD";
const LEFT_SH: &str = "Left SH";
const RIGHT_SH: &str = "Right SH";

/// Validated contact fields entered before measuring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    first_name: String,
    last_name: String,
    email_address: String,
}

impl ContactDetails {
    /// Validate and create contact details. Every field must contain
    /// something other than whitespace, fit on one line and differ from
    /// [`NOT_AVAILABLE`].
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let first_name = non_empty(FIRST_NAME, first_name.into())?;
        let last_name = non_empty(LAST_NAME, last_name.into())?;
        let email_address = non_empty(EMAIL_ADDRESS, email_address.into())?;

        Ok(Self {
            first_name,
            last_name,
            email_address,
        })
    }

    /// First name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Email address.
    pub fn email_address(&self) -> &str {
        &self.email_address
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ReportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReportError::EmptyContactField(field));
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(ReportError::MultilineContactField(field));
    }
    if trimmed == NOT_AVAILABLE {
        return Err(ReportError::ReservedContactValue(field, NOT_AVAILABLE));
    }
    Ok(trimmed.to_string())
}

/// Accumulates report fields; [`build`](Self::build) freezes them.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    first_name: Option<String>,
    last_name: Option<String>,
    email_address: Option<String>,
    far_pd: Option<f32>,
    near_pd: Option<f32>,
    left_sh: Option<f32>,
    right_sh: Option<f32>,
}

impl ReportBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets all contact fields.
    pub fn contact(mut self, contact: &ContactDetails) -> Self {
        self.first_name = Some(contact.first_name.clone());
        self.last_name = Some(contact.last_name.clone());
        self.email_address = Some(contact.email_address.clone());
        self
    }

    /// Sets the far PD, in millimeters.
    pub fn far_pd(mut self, far_pd: impl Into<Option<f32>>) -> Self {
        self.far_pd = far_pd.into();
        self
    }

    /// Sets the near PD, in millimeters.
    pub fn near_pd(mut self, near_pd: impl Into<Option<f32>>) -> Self {
        self.near_pd = near_pd.into();
        self
    }

    /// Sets the left segment height, in millimeters.
    pub fn left_sh(mut self, left_sh: impl Into<Option<f32>>) -> Self {
        self.left_sh = left_sh.into();
        self
    }

    /// Sets the right segment height, in millimeters.
    pub fn right_sh(mut self, right_sh: impl Into<Option<f32>>) -> Self {
        self.right_sh = right_sh.into();
        self
    }

    /// Freeze the accumulated fields into a report.
    pub fn build(self) -> EmailReport {
        EmailReport {
            first_name: self.first_name,
            last_name: self.last_name,
            email_address: self.email_address,
            far_pd: self.far_pd,
            near_pd: self.near_pd,
            left_sh: self.left_sh,
            right_sh: self.right_sh,
        }
    }
}

/// Immutable snapshot of contact fields and final measurements.
///
/// The body is seven `Label: value` lines; unset fields read `N/A` and
/// measurements carry one decimal.
///
/// Example:
/// ```
/// use optifit::report::ReportBuilder;
///
/// let report = ReportBuilder::new().far_pd(62.0).near_pd(59.0).build();
/// assert!(report.body().contains("Far PD: 62.0"));
/// assert!(report.body().contains("Left SH: N/A"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EmailReport {
    first_name: Option<String>,
    last_name: Option<String>,
    email_address: Option<String>,
    far_pd: Option<f32>,
    near_pd: Option<f32>,
    left_sh: Option<f32>,
    right_sh: Option<f32>,
}

impl EmailReport {
    /// First name.
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Last name.
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Email address.
    pub fn email_address(&self) -> Option<&str> {
        self.email_address.as_deref()
    }

    /// Far PD, in millimeters.
    pub fn far_pd(&self) -> Option<f32> {
        self.far_pd
    }

    /// Near PD, in millimeters.
    pub fn near_pd(&self) -> Option<f32> {
        self.near_pd
    }

    /// Left segment height, in millimeters.
    pub fn left_sh(&self) -> Option<f32> {
        self.left_sh
    }

    /// Right segment height, in millimeters.
    pub fn right_sh(&self) -> Option<f32> {
        self.right_sh
    }

    /// Plain text body of the report.
    pub fn body(&self) -> String {
        self.to_string()
    }

    /// Re-extract the fields from a report body.
    ///
    /// Measurements come back rounded to the one decimal they were written with.
    pub fn from_body(body: &str) -> Result<Self, ReportError> {
        let mut lines = body.lines().map(str::trim).filter(|line| !line.is_empty());
        let mut next = |label: &'static str| -> Result<Option<String>, ReportError> {
            let line = lines.next().unwrap_or_default();
            let value = line
                .strip_prefix(label)
                .and_then(|rest| rest.strip_prefix(':'))
                .ok_or_else(|| ReportError::UnexpectedLine {
                    expected: label,
                    found: line.to_string(),
                })?
                .trim();
            Ok((value != NOT_AVAILABLE).then(|| value.to_string()))
        };

        let first_name = next(FIRST_NAME)?;
        let last_name = next(LAST_NAME)?;
        let email_address = next(EMAIL_ADDRESS)?;
        let far_pd = parse_measurement(FAR_PD, next(FAR_PD)?)?;
        let near_pd = parse_measurement(NEAR_PD, next(NEAR_PD)?)?;
        let left_sh = parse_measurement(LEFT_SH, next(LEFT_SH)?)?;
        let right_sh = parse_measurement(RIGHT_SH, next(RIGHT_SH)?)?;

        Ok(Self {
            first_name,
            last_name,
            email_address,
            far_pd,
            near_pd,
            left_sh,
            right_sh,
        })
    }
}

fn parse_measurement(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<f32>, ReportError> {
    value
        .map(|value| {
            value
                .parse::<f32>()
                .map_err(|_| ReportError::InvalidNumber { field, value })
        })
        .transpose()
}

struct Text<'a>(Option<&'a str>);

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or(NOT_AVAILABLE))
    }
}

struct Millimeters(Option<f32>);

impl fmt::Display for Millimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.1}"),
            None => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl fmt::Display for EmailReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{FIRST_NAME}: {}", Text(self.first_name()))?;
        writeln!(f, "{LAST_NAME}: {}", Text(self.last_name()))?;
        writeln!(f, "{EMAIL_ADDRESS}: {}", Text(self.email_address()))?;
        writeln!(f, "{FAR_PD}: {}", Millimeters(self.far_pd))?;
        writeln!(f, "{NEAR_PD}: {}", Millimeters(self.near_pd))?;
        writeln!(f, "{LEFT_SH}: {}", Millimeters(self.left_sh))?;
        write!(f, "{RIGHT_SH}: {}", Millimeters(self.right_sh))
    }
}
