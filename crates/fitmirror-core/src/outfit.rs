//! Outfit and garment records supplied by the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Garment category. Unknown categories deserialize to [`GarmentType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentType {
    Top,
    Bottom,
    Shoes,
    Accessory,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Garment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GarmentType,
    pub price: f64,
    pub platform: String,
    pub image_url: String,
    pub buy_url: String,
    /// Colour name or CSS hex value as given by the catalog.
    pub color: String,
    pub brand: String,
}

/// Ordered set of garments. Item order is draw order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub id: String,
    pub name: String,
    pub occasion: String,
    pub mood: String,
    pub items: Vec<Garment>,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub image_url: String,
}

impl Garment {
    /// Minimal garment with only the fields the overlay reads.
    pub fn new(name: &str, kind: GarmentType, color: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            kind,
            price: 0.0,
            platform: String::new(),
            image_url: String::new(),
            buy_url: String::new(),
            color: color.to_string(),
            brand: String::new(),
        }
    }
}

impl Outfit {
    /// Outfit holding the given garments, with empty metadata.
    pub fn from_items(id: &str, name: &str, items: Vec<Garment>) -> Self {
        let total_price = items.iter().map(|g| g.price).sum();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            occasion: String::new(),
            mood: String::new(),
            items,
            total_price,
            created_at: DateTime::<Utc>::default(),
            scheduled_date: None,
            image_url: String::new(),
        }
    }

    /// Lowercase ASCII slug of the name, for file names.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        let mut dash = false;
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                dash = false;
            } else if !dash && !slug.is_empty() {
                slug.push('-');
                dash = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }
}
