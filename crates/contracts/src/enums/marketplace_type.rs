use serde::{Deserialize, Serialize};

/// Source marketplace of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketplaceType {
    Amazon,
    Flipkart,
}

impl MarketplaceType {
    /// Code used in URLs and the database
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceType::Amazon => "amazon",
            MarketplaceType::Flipkart => "flipkart",
        }
    }

    /// Human readable name, also the persisted `account` value
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketplaceType::Amazon => "Amazon",
            MarketplaceType::Flipkart => "Flipkart",
        }
    }

    pub fn all() -> Vec<MarketplaceType> {
        vec![MarketplaceType::Amazon, MarketplaceType::Flipkart]
    }

    /// Parse from a code or display name (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::all().into_iter().find(|m| m.code() == code)
    }
}

impl std::fmt::Display for MarketplaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
