//! Synthetic data for cold-start areas and for filling gaps in provider
//! records.
//!
//! Every generator takes the RNG explicitly so callers (and tests) control
//! the randomness source. The ranges here are fixed on purpose and are not
//! exposed through configuration.

use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;

use crate::candidates::{
    Category, GeoPoint, NewCandidate, NewCategory, SyncItem, DEFAULT_CATEGORY_ID,
    DEFAULT_DESCRIPTION, DEFAULT_PRICE_LABEL,
};

pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=800&q=80";

/// First half of a generated restaurant name.
pub const NAME_GIVEN: &[&str] = &[
    "老王", "张姐", "阿强", "快乐", "深夜", "精致", "好味", "地道",
];

/// Second half of a generated restaurant name.
pub const NAME_SUFFIX: &[&str] = &[
    "小馆", "食堂", "面馆", "大排档", "餐厅", "料理", "烘焙", "麻辣烫",
];

pub const PRICE_BUCKETS: &[&str] = &["￥20-40", "￥40-60", "￥60-100", "￥100+"];

pub const BOOTSTRAP_TAGS: &[&str] = &["口碑好", "上菜快", "环境优雅"];

pub const BOOTSTRAP_DESCRIPTION: &str = "这里是为您精心挑选的周边美食。";

/// Default categories seeded into an empty store, in stored order.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("快餐简餐", "Utensils"),
    ("中式炒菜", "Flame"),
    ("西式料理", "Pizza"),
    ("日韩料理", "Soup"),
    ("甜点饮品", "Coffee"),
];

/// Maximum per-axis jitter applied to bootstrap coordinates, in degrees
/// (about 1.5 km).
pub const BOOTSTRAP_JITTER_DEG: f64 = 0.015;

pub const BOOTSTRAP_MIN_COUNT: usize = 6;
pub const BOOTSTRAP_MAX_COUNT: usize = 10;

#[must_use]
pub fn default_categories() -> Vec<NewCategory> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, icon)| NewCategory {
            name: (*name).to_string(),
            icon: Some((*icon).to_string()),
        })
        .collect()
}

/// Picks the first category whose name occurs in `kind`, scanning in stored
/// order. Falls back to [`DEFAULT_CATEGORY_ID`].
#[must_use]
pub fn categorize(kind: Option<&str>, categories: &[Category]) -> i64 {
    let Some(kind) = kind else {
        return DEFAULT_CATEGORY_ID;
    };
    categories
        .iter()
        .find(|c| !c.name.is_empty() && kind.contains(c.name.as_str()))
        .map_or(DEFAULT_CATEGORY_ID, |c| c.id)
}

/// Uniform rating in `[lo_tenths / 10, hi_tenths / 10]`, rounded to one decimal.
fn rating_between<R: Rng + ?Sized>(rng: &mut R, lo_tenths: i64, hi_tenths: i64) -> Decimal {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let tenths = rng
        .random_range(lo_tenths as f64..=hi_tenths as f64)
        .round() as i64;
    Decimal::new(tenths, 1)
}

/// Rating assigned to synced records that arrive without one: `[3.5, 5.0]`.
pub fn synthesize_rating<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    rating_between(rng, 35, 50)
}

/// Rating assigned to bootstrap candidates: `[4.0, 5.0]`.
pub fn bootstrap_rating<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    rating_between(rng, 40, 50)
}

impl SyncItem {
    /// Fills missing fields and assigns a category, producing an insertable record.
    pub fn into_new_candidate<R: Rng + ?Sized>(
        self,
        categories: &[Category],
        rng: &mut R,
    ) -> NewCandidate {
        let category_id = categorize(self.kind.as_deref(), categories);
        let rating = match self.rating {
            Some(r) => r,
            None => synthesize_rating(rng),
        };
        NewCandidate {
            name: self.name,
            address: self.address,
            category_id,
            rating,
            price_label: self
                .price_label
                .unwrap_or_else(|| DEFAULT_PRICE_LABEL.to_string()),
            tags: self.tags.unwrap_or_default(),
            image_url: Some(
                self.image_url
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            ),
            description: self
                .kind
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            location: self.location,
        }
    }

    /// Builds an unpersisted snapshot candidate for the local cache, keeping
    /// the provider's distance.
    pub fn into_snapshot<R: Rng + ?Sized>(self, id: i64, rng: &mut R) -> crate::Candidate {
        let distance_meters = self.distance_meters;
        let mut candidate = self.into_new_candidate(&[], rng).into_candidate(id);
        candidate.distance_meters = distance_meters;
        candidate
    }
}

/// Generates 6 to 10 plausible restaurants scattered around `anchor`.
///
/// Returns an empty list when `categories` is empty; callers seed
/// [`default_categories`] first.
pub fn generate_bootstrap_candidates<R: Rng + ?Sized>(
    anchor: GeoPoint,
    categories: &[Category],
    rng: &mut R,
) -> Vec<NewCandidate> {
    if categories.is_empty() {
        return Vec::new();
    }

    let count = rng.random_range(BOOTSTRAP_MIN_COUNT..=BOOTSTRAP_MAX_COUNT);
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        let given = NAME_GIVEN.choose(rng).copied().unwrap_or_default();
        let suffix = NAME_SUFFIX.choose(rng).copied().unwrap_or_default();
        let category_id = categories.choose(rng).map_or(DEFAULT_CATEGORY_ID, |c| c.id);
        let price_label = PRICE_BUCKETS
            .choose(rng)
            .copied()
            .unwrap_or(DEFAULT_PRICE_LABEL)
            .to_string();
        let tag_count = rng.random_range(1..=2);
        let tags = BOOTSTRAP_TAGS
            .choose_multiple(rng, tag_count)
            .map(|t| (*t).to_string())
            .collect();
        let location = GeoPoint::new(
            anchor.lat + rng.random_range(-BOOTSTRAP_JITTER_DEG..=BOOTSTRAP_JITTER_DEG),
            anchor.lng + rng.random_range(-BOOTSTRAP_JITTER_DEG..=BOOTSTRAP_JITTER_DEG),
        );

        out.push(NewCandidate {
            name: format!("{given}{suffix}"),
            address: format!("美食街 {} 号", rng.random_range(100..900)),
            category_id,
            rating: bootstrap_rating(rng),
            price_label,
            tags,
            image_url: Some(PLACEHOLDER_IMAGE_URL.to_string()),
            description: BOOTSTRAP_DESCRIPTION.to_string(),
            location,
        });
    }

    out
}
