use crate::models::FoodCatalogItem;

/// Read-only source of reference foods.
pub trait FoodCatalog: Send + Sync {
    fn all(&self) -> Vec<FoodCatalogItem>;

    /// Case-insensitive exact name match.
    fn find(&self, name: &str) -> Option<FoodCatalogItem> {
        let wanted = name.trim().to_lowercase();
        self.all()
            .into_iter()
            .find(|f| f.name.to_lowercase() == wanted)
    }

    fn by_category(&self, category: &str) -> Vec<FoodCatalogItem> {
        let wanted = category.trim().to_lowercase();
        self.all()
            .into_iter()
            .filter(|f| f.category.to_lowercase() == wanted)
            .collect()
    }

    /// Items whose name or description contains `query`.
    fn search(&self, query: &str) -> Vec<FoodCatalogItem> {
        let q = query.trim().to_lowercase();
        self.all()
            .into_iter()
            .filter(|f| f.name.to_lowercase().contains(&q) || f.description.to_lowercase().contains(&q))
            .collect()
    }

    /// Sorted, de-duplicated category names.
    fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self.all().into_iter().map(|f| f.category).collect();
        cats.sort();
        cats.dedup();
        cats
    }
}

#[allow(clippy::type_complexity)]
// name, category, kcal, protein, carbs, fat, fiber (per 100g), description
const BUILTIN_FOODS: &[(&str, &str, f64, f64, f64, f64, f64, &str)] = &[
    ("Idli", "Breakfast", 58.0, 2.0, 12.0, 0.1, 0.6, "Steamed rice and lentil cakes"),
    ("Dosa", "Breakfast", 168.0, 4.0, 28.0, 4.0, 1.2, "Fermented crepe made from rice and lentils"),
    ("Uttapam", "Breakfast", 188.0, 5.0, 32.0, 4.5, 1.8, "Thick pancake with vegetables"),
    ("Appam", "Breakfast", 120.0, 2.5, 25.0, 1.0, 0.8, "Bowl-shaped fermented rice pancake"),
    ("Puttu", "Breakfast", 112.0, 2.8, 23.0, 0.5, 2.0, "Steamed rice flour with coconut"),
    ("Pongal", "Breakfast", 150.0, 4.5, 28.0, 2.5, 1.5, "Rice and lentil porridge"),
    ("Upma", "Breakfast", 85.0, 2.5, 16.0, 1.5, 1.0, "Semolina porridge with vegetables"),
    ("Plain Rice", "Rice", 130.0, 2.7, 28.0, 0.3, 0.4, "Steamed white rice"),
    ("Sambar Rice", "Rice", 145.0, 5.0, 30.0, 1.5, 3.0, "Rice mixed with lentil curry"),
    ("Rasam Rice", "Rice", 135.0, 3.0, 29.0, 0.8, 1.5, "Rice with tangy tomato broth"),
    ("Curd Rice", "Rice", 98.0, 3.5, 18.0, 1.2, 0.5, "Rice mixed with yogurt"),
    ("Lemon Rice", "Rice", 155.0, 3.0, 32.0, 2.0, 1.0, "Rice flavored with lemon and spices"),
    ("Coconut Rice", "Rice", 180.0, 3.5, 35.0, 3.5, 2.0, "Rice cooked with coconut"),
    ("Tamarind Rice", "Rice", 165.0, 3.2, 34.0, 2.2, 1.8, "Rice with tangy tamarind sauce"),
    ("Sambar", "Curry", 85.0, 4.5, 15.0, 1.0, 4.0, "Lentil curry with vegetables"),
    ("Rasam", "Curry", 45.0, 2.0, 8.0, 0.5, 1.5, "Tangy tomato and tamarind broth"),
    ("Kuzhambu", "Curry", 95.0, 3.0, 18.0, 1.5, 3.5, "Tamarind-based vegetable curry"),
    ("Kootu", "Curry", 75.0, 3.5, 12.0, 2.0, 4.0, "Lentil and vegetable stew"),
    ("Poriyal", "Curry", 65.0, 2.5, 10.0, 2.5, 3.5, "Dry vegetable stir-fry"),
    ("Aviyal", "Curry", 88.0, 2.8, 14.0, 3.0, 4.5, "Mixed vegetables in coconut gravy"),
    ("Vadai", "Snack", 245.0, 8.0, 25.0, 12.0, 5.0, "Deep-fried lentil donuts"),
    ("Bajji", "Snack", 180.0, 4.0, 22.0, 8.0, 2.5, "Batter-fried vegetables"),
    ("Bonda", "Snack", 195.0, 5.0, 28.0, 7.0, 2.0, "Deep-fried potato balls"),
    ("Murukku", "Snack", 520.0, 12.0, 55.0, 28.0, 3.0, "Spiral-shaped rice flour snack"),
    ("Sundal", "Snack", 125.0, 6.0, 20.0, 2.5, 6.0, "Spiced boiled legumes"),
    ("Paniyaram", "Snack", 165.0, 4.5, 28.0, 4.0, 1.5, "Round fermented rice balls"),
    ("Payasam", "Sweet", 185.0, 4.0, 35.0, 4.5, 1.0, "Sweet rice pudding"),
    ("Laddu", "Sweet", 425.0, 8.0, 65.0, 15.0, 2.5, "Round sweet balls"),
    ("Halwa", "Sweet", 385.0, 6.0, 55.0, 16.0, 3.0, "Dense sweet pudding"),
    ("Mysore Pak", "Sweet", 518.0, 7.0, 45.0, 35.0, 1.5, "Ghee-rich gram flour sweet"),
    ("Jangiri", "Sweet", 445.0, 5.5, 68.0, 18.0, 2.0, "Spiral-shaped syrup-soaked sweet"),
    ("Chicken Curry", "Non-Veg", 165.0, 25.0, 5.0, 5.5, 1.0, "Spiced chicken in gravy"),
    ("Fish Curry", "Non-Veg", 145.0, 22.0, 3.0, 5.0, 0.5, "Fish cooked in spicy gravy"),
    ("Mutton Curry", "Non-Veg", 195.0, 26.0, 4.0, 8.5, 1.0, "Goat meat in rich gravy"),
    ("Prawn Curry", "Non-Veg", 125.0, 20.0, 3.5, 3.5, 0.5, "Prawns in coconut curry"),
    ("Filter Coffee", "Beverage", 25.0, 1.5, 3.0, 1.0, 0.0, "Traditional South Indian coffee"),
    ("Buttermilk", "Beverage", 40.0, 3.1, 4.8, 0.9, 0.0, "Spiced yogurt drink"),
    ("Tender Coconut", "Beverage", 19.0, 0.7, 3.7, 0.2, 1.1, "Fresh coconut water"),
    ("Biryani", "Rice", 185.0, 8.0, 35.0, 2.5, 1.5, "Fragrant spiced rice with meat/vegetables"),
    ("Parotta", "Bread", 300.0, 8.0, 45.0, 10.0, 2.0, "Layered flatbread"),
    ("Chapati", "Bread", 265.0, 9.0, 49.0, 4.0, 3.0, "Whole wheat flatbread"),
];

/// Built-in South Indian food table.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    items: Vec<FoodCatalogItem>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        let items = BUILTIN_FOODS
            .iter()
            .map(
                |&(name, category, calories, protein, carbs, fat, fiber, description)| {
                    FoodCatalogItem {
                        name: name.to_string(),
                        category: category.to_string(),
                        calories_per_100g: calories,
                        protein_per_100g: protein,
                        carbs_per_100g: carbs,
                        fat_per_100g: fat,
                        fiber_per_100g: fiber,
                        description: description.to_string(),
                        is_custom: false,
                    }
                },
            )
            .collect();
        Self { items }
    }

    /// A catalog over an arbitrary list, mainly for tests.
    #[must_use]
    pub fn from_items(items: Vec<FoodCatalogItem>) -> Self {
        Self { items }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodCatalog for StaticCatalog {
    fn all(&self) -> Vec<FoodCatalogItem> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let catalog = StaticCatalog::new();
        assert_eq!(catalog.all().len(), 41);
        assert!(catalog.all().iter().all(|f| !f.is_custom && f.per_100g().is_valid()));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = StaticCatalog::new();
        let idli = catalog.find("iDLi").unwrap();
        assert_eq!(idli.name, "Idli");
        assert!((idli.calories_per_100g - 58.0).abs() < f64::EPSILON);
        assert!(catalog.find("  plain rice ").is_some());
        assert!(catalog.find("Pizza").is_none());
        // exact match only
        assert!(catalog.find("Idl").is_none());
    }

    #[test]
    fn test_by_category() {
        let catalog = StaticCatalog::new();
        let breads = catalog.by_category("bread");
        let names: Vec<&str> = breads.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Parotta", "Chapati"]);
        assert!(catalog.by_category("Dessert").is_empty());
    }

    #[test]
    fn test_search_name_and_description() {
        let catalog = StaticCatalog::new();
        // "Coconut Rice", "Tender Coconut" by name; "Puttu", "Aviyal", "Prawn Curry" by description
        let hits: Vec<String> = catalog.search("coconut").into_iter().map(|f| f.name).collect();
        assert!(hits.contains(&"Coconut Rice".to_string()));
        assert!(hits.contains(&"Puttu".to_string()));
        assert!(hits.contains(&"Prawn Curry".to_string()));
        assert!(!hits.contains(&"Idli".to_string()));
    }

    #[test]
    fn test_categories_sorted_unique() {
        let catalog = StaticCatalog::new();
        assert_eq!(
            catalog.categories(),
            vec!["Beverage", "Bread", "Breakfast", "Curry", "Non-Veg", "Rice", "Snack", "Sweet"]
        );
    }
}
