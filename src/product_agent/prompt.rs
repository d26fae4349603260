//! Typed extraction instruction for the vision model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Industries a product may be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductIndustry {
    BeautyAndCosmetics,
    Electronics,
    Fashion,
    FoodAndBeverage,
    Stationary,
    HomeDecor,
}

impl ProductIndustry {
    pub const ALL: [Self; 6] = [
        Self::BeautyAndCosmetics,
        Self::Electronics,
        Self::Fashion,
        Self::FoodAndBeverage,
        Self::Stationary,
        Self::HomeDecor,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeautyAndCosmetics => "beauty_and_cosmetics",
            Self::Electronics => "electronics",
            Self::Fashion => "fashion",
            Self::FoodAndBeverage => "food_and_beverage",
            Self::Stationary => "stationary",
            Self::HomeDecor => "home_decor",
        }
    }
}

/// Visual style of the banner template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStyle {
    Bold,
    Classic,
    Elegant,
    Minimalist,
    Modern,
}

impl TemplateStyle {
    pub const ALL: [Self; 5] = [
        Self::Bold,
        Self::Classic,
        Self::Elegant,
        Self::Minimalist,
        Self::Modern,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Classic => "classic",
            Self::Elegant => "elegant",
            Self::Minimalist => "minimalist",
            Self::Modern => "modern",
        }
    }
}

/// One field the model is asked to fill, with its guidance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptField {
    pub name: String,
    pub guidance: String,
}

impl PromptField {
    fn new(name: &str, guidance: &str) -> Self {
        Self {
            name: name.to_string(),
            guidance: guidance.to_string(),
        }
    }
}

/// Instruction sent with the product page screenshot
///
/// Categories and template styles are closed sets, so the model can only
/// be told to pick from values the pipeline understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPrompt {
    pub fields: Vec<PromptField>,
    pub categories: Vec<ProductIndustry>,
    pub template_types: Vec<TemplateStyle>,
}

impl Default for ExtractionPrompt {
    fn default() -> Self {
        Self {
            fields: vec![
                PromptField::new("product_name", "name of the product"),
                PromptField::new("sale_price", "price after the offer"),
                PromptField::new("regular_price", "price without offer"),
                PromptField::new("offer", "discount or promotion text"),
                PromptField::new("currency", "3-letter code, like INR for \"₹\" or USD for \"$\""),
                PromptField::new("category", "one of the categories listed below"),
                PromptField::new("description", "empty string if not found"),
                PromptField::new("product_features", "list of all feature bullet points, empty if not found"),
                PromptField::new("template_type", "one of the template types listed below"),
                PromptField::new("ratings", "average rating of the product"),
                PromptField::new(
                    "stock",
                    "object with items (number left), out_of_stock (bool), not_found (bool, true if no inventory details)",
                ),
            ],
            categories: ProductIndustry::ALL.to_vec(),
            template_types: TemplateStyle::ALL.to_vec(),
        }
    }
}

impl ExtractionPrompt {
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = ProductIndustry>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_template_types(mut self, styles: impl IntoIterator<Item = TemplateStyle>) -> Self {
        self.template_types = styles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, guidance: &str) -> Self {
        self.fields.push(PromptField::new(name, guidance));
        self
    }

    /// The instruction text
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ExtractionPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "You are an eCommerce data extraction assistant. Extract structured product data from the product page screenshot."
        )?;
        writeln!(f, "Return the result in JSON format with the following fields:")?;
        writeln!(f)?;
        for field in &self.fields {
            writeln!(f, "- {}: {}", field.name, field.guidance)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Categories: {}",
            quoted_list(self.categories.iter().map(ProductIndustry::as_str))
        )?;
        writeln!(
            f,
            "Template types: {}",
            quoted_list(self.template_types.iter().map(TemplateStyle::as_str))
        )?;
        writeln!(f)?;
        write!(
            f,
            "Map fields from the visual layout and text. Only return a valid JSON object."
        )
    }
}
