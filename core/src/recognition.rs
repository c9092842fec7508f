use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::catalog::FoodCatalog;
use crate::models::ScanResult;

pub const SIMULATED_CONFIDENCE: f64 = 0.85;
pub const MAX_SUGGESTIONS: usize = 8;

const DIETARY_TIPS: [&str; 5] = [
    "Try adding more vegetables for fiber",
    "Consider portion size for balanced nutrition",
    "Pair with protein for better satiety",
    "Add healthy fats like nuts or seeds",
    "Include whole grains for sustained energy",
];

const COMMON_FOODS: [&str; 16] = [
    "Apple",
    "Banana",
    "Orange",
    "Grapes",
    "Mango",
    "Chicken Curry",
    "Fish Fry",
    "Egg Curry",
    "Mutton Curry",
    "White Rice",
    "Brown Rice",
    "Chapati",
    "Naan",
    "Mixed Vegetables",
    "Potato Curry",
    "Tomato Rice",
];

/// Produces a food guess for a meal photo.
pub trait FoodRecognizer {
    fn recognize(&mut self, catalog: &dyn FoodCatalog) -> Result<ScanResult>;
}

/// Stand-in scanner: picks a random catalog item without looking at any image.
pub struct SimulatedRecognizer {
    rng: StdRng,
}

impl SimulatedRecognizer {
    /// A fixed seed gives a reproducible sequence of guesses.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl FoodRecognizer for SimulatedRecognizer {
    fn recognize(&mut self, catalog: &dyn FoodCatalog) -> Result<ScanResult> {
        let items = catalog.all();
        let Some(item) = items.choose(&mut self.rng).cloned() else {
            bail!("Food catalog is empty, nothing to guess from");
        };
        let mut tips = DIETARY_TIPS.to_vec();
        tips.shuffle(&mut self.rng);
        debug!(food = %item.name, "simulated scan picked catalog item");
        Ok(ScanResult {
            item,
            confidence: SIMULATED_CONFIDENCE,
            suggestions: tips.into_iter().take(3).map(String::from).collect(),
            is_guess: true,
        })
    }
}

/// Autocomplete names: catalog matches first, then common foods.
#[must_use]
pub fn suggest_food_names(catalog: &dyn FoodCatalog, query: &str) -> Vec<String> {
    let q = query.trim().to_lowercase();
    let mut names: Vec<String> = Vec::new();
    let catalog_names = catalog.all().into_iter().map(|f| f.name);
    let common_names = COMMON_FOODS.iter().map(|s| (*s).to_string());
    for name in catalog_names.chain(common_names) {
        if !name.to_lowercase().contains(&q) {
            continue;
        }
        if names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            continue;
        }
        names.push(name);
        if names.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    names
}
