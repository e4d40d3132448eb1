use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{CaptureBuffer, FieldKind, ValidationError, ValidationIssue};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingRow {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub notes: String,
}

impl FeedingRow {
    pub fn new(
        weight: impl Into<String>,
        amount: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            weight: weight.into(),
            amount: amount.into(),
            notes: notes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    #[default]
    Food,
    Treat,
    Supplement,
    Other,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Food => write!(f, "Food"),
            ProductType::Treat => write!(f, "Treat"),
            ProductType::Supplement => write!(f, "Supplement"),
            ProductType::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(ProductType::Food),
            "treat" => Ok(ProductType::Treat),
            "supplement" => Ok(ProductType::Supplement),
            "other" => Ok(ProductType::Other),
            _ => Err(ValidationError::single(
                "productType",
                format!("must be one of Food, Treat, Supplement, Other (got `{}`)", value.trim()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodForm {
    #[default]
    Kibble,
    Wet,
    Raw,
    Other,
}

impl fmt::Display for FoodForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodForm::Kibble => write!(f, "Kibble"),
            FoodForm::Wet => write!(f, "Wet"),
            FoodForm::Raw => write!(f, "Raw"),
            FoodForm::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for FoodForm {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kibble" => Ok(FoodForm::Kibble),
            "wet" => Ok(FoodForm::Wet),
            "raw" => Ok(FoodForm::Raw),
            "other" => Ok(FoodForm::Other),
            _ => Err(ValidationError::single(
                "foodForm",
                format!("must be one of Kibble, Wet, Raw, Other (got `{}`)", value.trim()),
            )),
        }
    }
}

/// The product as submitted to storage. Field names on the wire are camelCase;
/// images travel as PNG data URLs, empty string when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub feeding_guidelines: Vec<FeedingRow>,
    #[serde(default, with = "image_data_url")]
    pub feeding_guidelines_image: Option<CaptureBuffer>,
    #[serde(default)]
    pub barcode_text: String,
    #[serde(default, with = "image_data_url")]
    pub product_image: Option<CaptureBuffer>,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub food_form: FoodForm,
}

impl ProductRecord {
    /// Stores `value` into a text field. Returns false for non-text fields.
    pub fn set_text_field(&mut self, field: FieldKind, value: String) -> bool {
        let slot = match field {
            FieldKind::Brand => &mut self.brand_name,
            FieldKind::ProductName => &mut self.product_name,
            FieldKind::Ingredients => &mut self.ingredients,
            FieldKind::Barcode => &mut self.barcode_text,
            FieldKind::FeedingGuidelines | FieldKind::ProductPhoto => return false,
        };
        *slot = value;
        true
    }

    /// Switches the feeding guidelines to the row representation.
    pub fn set_feeding_rows(&mut self, rows: Vec<FeedingRow>) {
        self.feeding_guidelines = rows;
        self.feeding_guidelines_image = None;
    }

    /// Switches the feeding guidelines to the cropped-image representation.
    pub fn set_feeding_image(&mut self, image: CaptureBuffer) {
        self.feeding_guidelines_image = Some(image);
        self.feeding_guidelines.clear();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.product_name.trim().is_empty() {
            issues.push(ValidationIssue::new("productName", "is required"));
        }

        if !self.feeding_guidelines.is_empty() && self.feeding_guidelines_image.is_some() {
            issues.push(ValidationIssue::new(
                "feedingGuidelines",
                "cannot be combined with feedingGuidelinesImage",
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// A product as returned by a storage search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProduct {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_type: String,
}

mod image_data_url {
    use base64::Engine;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::core::models::CaptureBuffer;
    use crate::global_constants::IMAGE_DATA_URL_PREFIX;

    pub fn serialize<S>(image: &Option<CaptureBuffer>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match image {
            None => serializer.serialize_str(""),
            Some(buffer) => {
                let png = buffer.encode_png().map_err(S::Error::custom)?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(png);
                serializer.serialize_str(&format!("{}{}", IMAGE_DATA_URL_PREFIX, encoded))
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<CaptureBuffer>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        if value.is_empty() {
            return Ok(None);
        }

        let payload = match value.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(',')
                .map(|(_, data)| data)
                .ok_or_else(|| D::Error::custom("data URL without a payload"))?,
            None => value.as_str(),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(D::Error::custom)?;
        CaptureBuffer::from_encoded_bytes(&bytes)
            .map(Some)
            .map_err(D::Error::custom)
    }
}
