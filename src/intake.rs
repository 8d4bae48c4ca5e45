//! Product idea intake and the instructions sent to the agents.

use serde::{Deserialize, Serialize};

use crate::errors::IntakeError;
use crate::package::ContentView;

pub const DEFAULT_PRODUCT_TYPE: &str = "Digital Product";
pub const DEFAULT_AUDIENCE: &str = "General";
pub const DEFAULT_PRICE_RANGE: &str = "Mid-range ($15-$49)";

/// Most file names mentioned in a publish instruction.
pub const MAX_PUBLISH_FILES: usize = 10;

/// Product types offered by the intake form.
pub const PRODUCT_TYPES: &[&str] = &[
    "Digital Product",
    "Template",
    "E-book / Guide",
    "Course",
    "Toolkit",
    "Software / Script",
    "Printable",
];

/// Price-range preferences offered by the intake form.
pub const PRICE_RANGES: &[&str] = &[
    "Budget ($5-$14)",
    "Mid-range ($15-$49)",
    "Premium ($50-$149)",
    "High-ticket ($150+)",
];

/// What the user typed into the intake form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeForm {
    pub idea: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
}

fn or_default(value: &Option<String>, default: &'static str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl IntakeForm {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            ..Self::default()
        }
    }

    /// Check the form before anything is sent.
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.idea.trim().is_empty() {
            return Err(IntakeError::EmptyIdea);
        }
        Ok(())
    }

    pub fn product_type(&self) -> String {
        or_default(&self.product_type, DEFAULT_PRODUCT_TYPE)
    }

    pub fn target_audience(&self) -> String {
        or_default(&self.target_audience, DEFAULT_AUDIENCE)
    }

    pub fn price_range(&self) -> String {
        or_default(&self.price_range, DEFAULT_PRICE_RANGE)
    }

    /// The single instruction sent to the manager agent.
    pub fn generation_instruction(&self) -> Result<String, IntakeError> {
        self.validate()?;
        Ok(format!(
            "Create a complete digital product package for the following idea.\n\
             \n\
             Product idea: {idea}\n\
             Product type: {product_type}\n\
             Target audience: {audience}\n\
             Price range: {price_range}\n\
             \n\
             Run market research (overview, target audience, market size, demand level, \
             competitors, pricing benchmarks, recommended price), build the product content \
             (format, summary, full content, tech stack, files), and write a sales listing \
             (title, tagline, description, price, feature bullets, category tags, SEO keywords). \
             Return everything as a product_package JSON object with the keys product_name, \
             product_type, market_research, product_content, listing, status and created_at.",
            idea = self.idea.trim(),
            product_type = self.product_type(),
            audience = self.target_audience(),
            price_range = self.price_range(),
        ))
    }
}

/// The edited listing fields that go to the publisher.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest<'a> {
    pub product_name: &'a str,
    pub product_type: &'a str,
    pub title: &'a str,
    pub tagline: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub feature_bullets: &'a [String],
    pub category_tags: &'a [String],
}

impl PublishRequest<'_> {
    /// The single instruction sent to the publisher agent.
    pub fn instruction(&self, content: &ContentView) -> String {
        let bullets = self
            .feature_bullets
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n");
        let files = content.file_names(MAX_PUBLISH_FILES);
        let files = if files.is_empty() {
            "none".to_string()
        } else {
            files.join(", ")
        };

        format!(
            "Format and publish this product listing to the Payhip store.\n\
             \n\
             Product name: {name}\n\
             Product type: {product_type}\n\
             Title: {title}\n\
             Tagline: {tagline}\n\
             Price: ${price:.2}\n\
             Description:\n{description}\n\
             \n\
             Feature bullets:\n{bullets}\n\
             \n\
             Category tags: {tags}\n\
             Product files: {files}\n\
             \n\
             Report the outcome with published_at, product_url, status and message.",
            name = self.product_name,
            product_type = self.product_type,
            title = self.title,
            tagline = self.tagline,
            price = self.price,
            description = self.description,
            tags = self.category_tags.join(", "),
        )
    }
}
