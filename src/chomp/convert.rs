//! Structural conversion from the upstream document to `chomp.v1beta1`.
//!
//! Pure and total: every upstream field has exactly one destination. Integers
//! are narrowed with `as i32`, so values outside the int32 range wrap.

use crate::chomp::api::{
    ChompDietFlag, ChompDietLabel, ChompFoodItem, ChompNutrient, ChompPhoto, ChompResponse,
};
use crate::chomp::error::ServiceError;
use crate::chomp::proto::{
    CountryDetails, DietFlag, DietLabel, DietLabels, Food, Nutrient, Package, PackagingPhotos,
    Photo, Serving,
};

/// First item of a lookup, or `NotFound` when the list is empty.
pub fn first_food(response: ChompResponse) -> Result<Food, ServiceError> {
    response
        .items
        .into_iter()
        .next()
        .map(convert)
        .ok_or(ServiceError::NotFound)
}

/// Every item of a search, or `NotFound` when the list is empty.
pub fn all_foods(response: ChompResponse) -> Result<Vec<Food>, ServiceError> {
    if response.items.is_empty() {
        return Err(ServiceError::NotFound);
    }
    Ok(response.items.into_iter().map(convert).collect())
}

/// Convert one upstream item.
pub fn convert(item: ChompFoodItem) -> Food {
    Food {
        barcode: item.barcode,
        name: item.name,
        brand: item.brand,
        ingredients: item.ingredients,
        package: Some(Package {
            quantity: item.package.quantity as i32,
            size: item.package.size,
        }),
        serving: Some(Serving {
            size: item.serving.size,
            measurement_unit: item.serving.measurement_unit,
            size_fulltext: item.serving.size_fulltext,
        }),
        categories: item.categories,
        nutrients: item.nutrients.into_iter().map(nutrient).collect(),
        diet_labels: Some(DietLabels {
            vegan: Some(diet_label(item.diet_labels.vegan)),
            vegetarian: Some(diet_label(item.diet_labels.vegetarian)),
            gluten_free: Some(diet_label(item.diet_labels.gluten_free)),
        }),
        diet_flags: item.diet_flags.into_iter().map(diet_flag).collect(),
        packaging_photos: Some(PackagingPhotos {
            front: Some(photo(item.packaging_photos.front)),
            nutrition: Some(photo(item.packaging_photos.nutrition)),
            ingredients: Some(photo(item.packaging_photos.ingredients)),
        }),
        allergens: item.allergens,
        brand_list: item.brand_list,
        countries: item.countries,
        country_details: Some(CountryDetails {
            english_speaking: item.country_details.english_speaking as i32,
            non_english_speaking: item.country_details.non_english_speaking as i32,
        }),
        palm_oil_ingredients: item.palm_oil_ingredients,
        ingredient_list: item.ingredient_list,
        has_english_ingredients: item.has_english_ingredients,
        minerals: item.minerals,
        traces: item.traces,
        vitamins: item.vitamins,
        description: item.description,
        keywords: item.keywords,
    }
}

fn nutrient(n: ChompNutrient) -> Nutrient {
    Nutrient {
        name: n.name,
        per_100g: n.per_100g as i32,
        measurement_unit: n.measurement_unit,
        rank: n.rank as i32,
        data_points: n.data_points as i32,
        description: n.description,
    }
}

fn diet_label(l: ChompDietLabel) -> DietLabel {
    DietLabel {
        name: l.name,
        is_compatible: l.is_compatible,
        compatibility_level: l.compatibility_level as i32,
        confidence: l.confidence as i32,
        confidence_description: l.confidence_description,
    }
}

fn diet_flag(d: ChompDietFlag) -> DietFlag {
    DietFlag {
        ingredient: d.ingredient,
        ingredient_description: d.ingredient_description,
        diet_label: d.diet_label,
        is_compatible: d.is_compatible,
        compatibility_level: d.compatibility_level as i32,
        compatibility_description: d.compatibility_description,
        is_allergen: d.is_allergen,
    }
}

fn photo(p: ChompPhoto) -> Photo {
    Photo {
        small: p.small,
        thumb: p.thumb,
        display: p.display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chomp::api::ChompCountryDetails;

    fn item(barcode: &str) -> ChompFoodItem {
        ChompFoodItem {
            barcode: barcode.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_lookup_is_not_found() {
        assert!(matches!(first_food(ChompResponse::default()), Err(ServiceError::NotFound)));
        assert!(matches!(all_foods(ChompResponse::default()), Err(ServiceError::NotFound)));
    }

    #[test]
    fn lookup_takes_the_first_item() {
        let response = ChompResponse {
            items: vec![item("first"), item("second")],
        };
        assert_eq!(first_food(response).unwrap().barcode, "first");
    }

    #[test]
    fn search_keeps_every_item_in_order() {
        let response = ChompResponse {
            items: vec![item("a"), item("b"), item("c")],
        };
        let barcodes: Vec<_> = all_foods(response)
            .unwrap()
            .into_iter()
            .map(|f| f.barcode)
            .collect();
        assert_eq!(barcodes, ["a", "b", "c"]);
    }

    #[test]
    fn integers_are_narrowed_to_32_bits() {
        let mut input = item("big");
        input.country_details = ChompCountryDetails {
            english_speaking: i64::from(i32::MAX) + 1,
            non_english_speaking: 7,
        };
        input.nutrients.push(ChompNutrient {
            per_100g: 1 << 32,
            rank: -3,
            ..Default::default()
        });

        let food = convert(input);
        let details = food.country_details.unwrap();
        assert_eq!(details.english_speaking, i32::MIN);
        assert_eq!(details.non_english_speaking, 7);
        assert_eq!(food.nutrients[0].per_100g, 0);
        assert_eq!(food.nutrients[0].rank, -3);
    }

    #[test]
    fn nested_messages_are_always_present() {
        let food = convert(ChompFoodItem::default());
        assert!(food.package.is_some());
        assert!(food.serving.is_some());
        assert!(food.diet_labels.unwrap().gluten_free.is_some());
        assert!(food.packaging_photos.unwrap().nutrition.is_some());
        assert!(food.country_details.is_some());
    }
}
