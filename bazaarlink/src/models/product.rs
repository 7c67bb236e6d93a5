//! Product display data and ranked recommendation items

use serde::{Deserialize, Serialize};

/// Display metadata resolved for a ranked product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    pub product_id: String,
    pub name: String,
    pub shop_name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub image_url: Option<String>,
}

/// One item of a recommendation response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub product_id: String,
    pub product_name: String,
    pub shop_name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub image_url: Option<String>,

    /// Combined score, rounded to three decimals
    pub score: f64,

    /// Why this product was recommended
    pub reason: String,
}

impl Recommendation {
    /// Build a response item from resolved details and a ranked score
    pub fn from_details(details: ProductDetails, score: f64, reason: String) -> Self {
        Self {
            product_id: details.product_id,
            product_name: details.name,
            shop_name: details.shop_name,
            price: details.price,
            discount_price: details.discount_price,
            image_url: details.image_url,
            score: round_score(score),
            reason,
        }
    }
}

/// Round a score to three decimals for presentation
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.123);
        assert_eq!(round_score(0.9996), 1.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_from_details_keeps_metadata() {
        let details = ProductDetails {
            product_id: "p1".to_string(),
            name: "Sourdough".to_string(),
            shop_name: "Corner Bakery".to_string(),
            price: 4.5,
            discount_price: Some(4.0),
            image_url: None,
        };
        let rec = Recommendation::from_details(details, 0.24004, "because".to_string());
        assert_eq!(rec.product_name, "Sourdough");
        assert_eq!(rec.shop_name, "Corner Bakery");
        assert_eq!(rec.discount_price, Some(4.0));
        assert_eq!(rec.score, 0.24);
    }
}
