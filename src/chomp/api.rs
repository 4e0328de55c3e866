//! Upstream JSON document returned by the Chomp branded-food endpoints.
//!
//! Missing and `null` fields decode to their zero values, and so do `null`
//! list elements. Integers are 64-bit here and narrowed during conversion.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` as `T::default()`.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a `null` list as empty and `null` elements as `T::default()`.
fn nullable_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Top-level payload: a list of matching items, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompResponse {
    #[serde(deserialize_with = "nullable_seq")]
    pub items: Vec<ChompFoodItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompFoodItem {
    #[serde(deserialize_with = "nullable")]
    pub barcode: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub brand: String,
    #[serde(deserialize_with = "nullable")]
    pub ingredients: String,
    #[serde(deserialize_with = "nullable")]
    pub package: ChompPackage,
    #[serde(deserialize_with = "nullable")]
    pub serving: ChompServing,
    #[serde(deserialize_with = "nullable_seq")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub nutrients: Vec<ChompNutrient>,
    #[serde(deserialize_with = "nullable")]
    pub diet_labels: ChompDietLabels,
    #[serde(deserialize_with = "nullable_seq")]
    pub diet_flags: Vec<ChompDietFlag>,
    #[serde(deserialize_with = "nullable")]
    pub packaging_photos: ChompPackagingPhotos,
    #[serde(deserialize_with = "nullable_seq")]
    pub allergens: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub brand_list: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub countries: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub country_details: ChompCountryDetails,
    #[serde(deserialize_with = "nullable_seq")]
    pub palm_oil_ingredients: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub ingredient_list: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub has_english_ingredients: bool,
    #[serde(deserialize_with = "nullable_seq")]
    pub minerals: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub traces: Vec<String>,
    #[serde(deserialize_with = "nullable_seq")]
    pub vitamins: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable_seq")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompPackage {
    #[serde(deserialize_with = "nullable")]
    pub quantity: i64,
    #[serde(deserialize_with = "nullable")]
    pub size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompServing {
    #[serde(deserialize_with = "nullable")]
    pub size: String,
    #[serde(deserialize_with = "nullable")]
    pub measurement_unit: String,
    #[serde(deserialize_with = "nullable")]
    pub size_fulltext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompNutrient {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub per_100g: i64,
    #[serde(deserialize_with = "nullable")]
    pub measurement_unit: String,
    #[serde(deserialize_with = "nullable")]
    pub rank: i64,
    #[serde(deserialize_with = "nullable")]
    pub data_points: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompDietLabels {
    #[serde(deserialize_with = "nullable")]
    pub vegan: ChompDietLabel,
    #[serde(deserialize_with = "nullable")]
    pub vegetarian: ChompDietLabel,
    #[serde(deserialize_with = "nullable")]
    pub gluten_free: ChompDietLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompDietLabel {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub is_compatible: bool,
    #[serde(deserialize_with = "nullable")]
    pub compatibility_level: i64,
    #[serde(deserialize_with = "nullable")]
    pub confidence: i64,
    #[serde(deserialize_with = "nullable")]
    pub confidence_description: String,
}

/// Per-ingredient diet flag. `is_compatible` is a string upstream
/// ("yes", "no", "maybe"), unlike the diet labels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompDietFlag {
    #[serde(deserialize_with = "nullable")]
    pub ingredient: String,
    #[serde(deserialize_with = "nullable")]
    pub ingredient_description: String,
    #[serde(deserialize_with = "nullable")]
    pub diet_label: String,
    #[serde(deserialize_with = "nullable")]
    pub is_compatible: String,
    #[serde(deserialize_with = "nullable")]
    pub compatibility_level: i64,
    #[serde(deserialize_with = "nullable")]
    pub compatibility_description: String,
    #[serde(deserialize_with = "nullable")]
    pub is_allergen: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompPackagingPhotos {
    #[serde(deserialize_with = "nullable")]
    pub front: ChompPhoto,
    #[serde(deserialize_with = "nullable")]
    pub nutrition: ChompPhoto,
    #[serde(deserialize_with = "nullable")]
    pub ingredients: ChompPhoto,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompPhoto {
    #[serde(deserialize_with = "nullable")]
    pub small: String,
    #[serde(deserialize_with = "nullable")]
    pub thumb: String,
    #[serde(deserialize_with = "nullable")]
    pub display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChompCountryDetails {
    #[serde(deserialize_with = "nullable")]
    pub english_speaking: i64,
    #[serde(deserialize_with = "nullable")]
    pub non_english_speaking: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let payload: ChompResponse =
            serde_json::from_str(r#"{"items":[{"barcode":"0123","package":{"size":"1 l"}}]}"#)
                .unwrap();

        let item = &payload.items[0];
        assert_eq!(item.barcode, "0123");
        assert_eq!(item.package.size, "1 l");
        assert_eq!(item.package.quantity, 0);
        assert!(item.nutrients.is_empty());
        assert!(!item.diet_labels.vegan.is_compatible);
    }

    #[test]
    fn missing_items_is_an_empty_list() {
        let payload: ChompResponse = serde_json::from_str(r#"{"error":"bad key"}"#).unwrap();
        assert!(payload.items.is_empty());
    }

    #[test]
    fn null_items_is_an_empty_list() {
        let payload: ChompResponse = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(payload.items.is_empty());
    }

    #[test]
    fn null_fields_decode_to_zero_values() {
        let payload: ChompResponse = serde_json::from_str(
            r#"{"items":[{
                "barcode":"1",
                "name":null,
                "brand_list":null,
                "keywords":["a",null,"b"],
                "package":null,
                "nutrients":[null,{"name":"Protein","per_100g":null}],
                "diet_labels":{"vegan":null,"gluten_free":{"is_compatible":null}},
                "packaging_photos":{"front":{"small":null}},
                "has_english_ingredients":null
            }]}"#,
        )
        .unwrap();

        let item = &payload.items[0];
        assert_eq!(item.barcode, "1");
        assert_eq!(item.name, "");
        assert!(item.brand_list.is_empty());
        assert_eq!(item.keywords, ["a", "", "b"]);
        assert_eq!(item.package, ChompPackage::default());
        assert_eq!(item.nutrients[0], ChompNutrient::default());
        assert_eq!(item.nutrients[1].name, "Protein");
        assert_eq!(item.nutrients[1].per_100g, 0);
        assert_eq!(item.diet_labels.vegan, ChompDietLabel::default());
        assert!(!item.diet_labels.gluten_free.is_compatible);
        assert_eq!(item.packaging_photos.front.small, "");
        assert!(!item.has_english_ingredients);
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        assert!(serde_json::from_str::<ChompResponse>(r#"{"items":"none"}"#).is_err());
    }
}
