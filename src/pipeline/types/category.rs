use serde::{Deserialize, Serialize};
use std::fmt;

/// Waste category. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Recyclable = 0,
    Reusable = 1,
    Compostable = 2,
    Trash = 3,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Recyclable,
        Category::Reusable,
        Category::Compostable,
        Category::Trash,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Recyclable => "Recyclable",
            Category::Reusable => "Reusable",
            Category::Compostable => "Compostable",
            Category::Trash => "Trash",
        }
    }

    /// Short disposal advice shown next to a result.
    pub fn disposal_tip(self) -> &'static str {
        match self {
            Category::Recyclable => "Rinse bottles/containers and recycle in the correct bin.",
            Category::Reusable => {
                "Clean and reuse this item, or donate it to extend its life cycle."
            }
            Category::Compostable => {
                "Compost this organic waste to reduce landfill and create nutrient-rich soil."
            }
            Category::Trash => "Dispose in general waste, avoid mixing with recyclables.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per category, indexed by `Category`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PerCategory<T> {
    pub recyclable: T,
    pub reusable: T,
    pub compostable: T,
    pub trash: T,
}

impl<T> PerCategory<T> {
    pub fn get_ref(&self, category: Category) -> &T {
        match category {
            Category::Recyclable => &self.recyclable,
            Category::Reusable => &self.reusable,
            Category::Compostable => &self.compostable,
            Category::Trash => &self.trash,
        }
    }

    pub fn iter_ref(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get_ref(c)))
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Recyclable => &mut self.recyclable,
            Category::Reusable => &mut self.reusable,
            Category::Compostable => &mut self.compostable,
            Category::Trash => &mut self.trash,
        }
    }
}

impl<T: Copy> PerCategory<T> {
    pub fn splat(value: T) -> Self {
        Self {
            recyclable: value,
            reusable: value,
            compostable: value,
            trash: value,
        }
    }

    pub fn get(&self, category: Category) -> T {
        *self.get_ref(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
