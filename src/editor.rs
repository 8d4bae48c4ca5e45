//! Editable shadow copy of a generated listing.
//!
//! Seeded from the normalized listing every time a package is loaded. Nothing
//! here touches the catalog; edits only reach storage through an explicit
//! publish or draft save.

use crate::errors::IntakeError;
use crate::package::ListingView;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingEditor {
    pub title: String,
    pub tagline: String,
    pub description: String,
    price: f64,
    bullets: Vec<String>,
    tags: Vec<String>,
}

impl ListingEditor {
    pub fn seed(listing: &ListingView) -> Self {
        Self {
            title: listing.title.clone(),
            tagline: listing.tagline.clone(),
            description: listing.description.clone(),
            price: listing.price,
            bullets: listing.feature_bullets.clone(),
            tags: listing.category_tags.clone(),
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), IntakeError> {
        if !price.is_finite() || price < 0.0 {
            return Err(IntakeError::InvalidPrice(price));
        }
        self.price = price;
        Ok(())
    }

    pub fn add_bullet(&mut self, text: impl Into<String>) {
        self.bullets.push(text.into());
    }

    pub fn edit_bullet(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), IntakeError> {
        let len = self.bullets.len();
        let slot = self
            .bullets
            .get_mut(index)
            .ok_or(IntakeError::BulletIndex { index, len })?;
        *slot = text.into();
        Ok(())
    }

    pub fn remove_bullet(&mut self, index: usize) -> Result<String, IntakeError> {
        if index >= self.bullets.len() {
            return Err(IntakeError::BulletIndex {
                index,
                len: self.bullets.len(),
            });
        }
        Ok(self.bullets.remove(index))
    }

    /// Tags are appended as given; duplicates are allowed. Blank tags are ignored.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() {
            self.tags.push(tag.to_string());
        }
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<String, IntakeError> {
        if index >= self.tags.len() {
            return Err(IntakeError::TagIndex {
                index,
                len: self.tags.len(),
            });
        }
        Ok(self.tags.remove(index))
    }
}
