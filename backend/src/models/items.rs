//! List item models matching the admin editor's item shapes.

use serde::{Deserialize, Serialize};

/// Menu categories the editor groups items by, in display order.
pub const MENU_CATEGORIES: [&str; 6] = ["Cut", "Color", "Perm", "Treatment", "Spa", "Other"];

/// Image used for freshly created gallery and staff entries.
pub const PLACEHOLDER_IMAGE: &str = "/images/hero.png";

/// Anything that lives in an orderable content list.
pub trait ListItem {
    fn id(&self) -> &str;
}

/// A service on the price menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub category: String,
    pub name: String,
    /// Price in whole currency units
    pub price: u32,
    #[serde(default)]
    pub description: String,
}

impl MenuItem {
    pub fn new_in_category(category: &str) -> Self {
        Self {
            id: new_id(),
            category: category.to_string(),
            name: "New menu item".to_string(),
            price: 0,
            description: String::new(),
        }
    }
}

/// A styled-work photo in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl GalleryItem {
    pub fn new_placeholder() -> Self {
        Self {
            id: new_id(),
            image: PLACEHOLDER_IMAGE.to_string(),
            title: "New Style".to_string(),
            description: String::new(),
        }
    }
}

/// A staff profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StaffItem {
    pub id: String,
    pub name: String,
    pub role: String,
    pub image: String,
    #[serde(default)]
    pub message: String,
}

impl StaffItem {
    pub fn new_placeholder() -> Self {
        Self {
            id: new_id(),
            name: "New Staff".to_string(),
            role: "Stylist".to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
            message: String::new(),
        }
    }
}

/// A question/answer pair on the FAQ page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl FaqItem {
    pub fn new_placeholder() -> Self {
        Self {
            id: new_id(),
            question: "New question".to_string(),
            answer: String::new(),
        }
    }
}

macro_rules! impl_list_item {
    ($($ty:ty),*) => {
        $(impl ListItem for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_list_item!(MenuItem, GalleryItem, StaffItem, FaqItem);

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
