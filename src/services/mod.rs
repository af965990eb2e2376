//! Business services. Each service owns a shared database handle and an
//! optional event sender; handlers reach them through [`crate::AppServices`].

// Shared helpers
pub mod images;
pub mod measurements;
pub mod order_code;
pub mod slug;

// Retail orders and the checkout channels that create them
pub mod checkout;
pub mod orders;
pub mod payments;

// Tailoring
pub mod custom_orders;

// Catalog
pub mod catalog;
pub mod categories;
pub mod products;

// Back office
pub mod contact;
pub mod dashboard;
pub mod notifications;
pub mod seed;
pub mod settings;
pub mod themes;
pub mod users;

use serde::{Deserialize, Serialize};

/// Who performed a change. Recorded on every history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Option<i32>,
    pub name: String,
}

impl Actor {
    pub fn user(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Orders placed by shoppers through the public checkout.
    pub fn storefront() -> Self {
        Self {
            id: None,
            name: "Tienda online".to_string(),
        }
    }

    pub fn system() -> Self {
        Self {
            id: None,
            name: "Sistema".to_string(),
        }
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 || self.per_page == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Normalizes 1-based page requests, clamping page size to `1..=max`.
pub(crate) fn page_window(page: u64, per_page: u64, max: u64) -> (u64, u64) {
    (page.max(1), per_page.clamp(1, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page {
            items: vec![1, 2],
            total: 31,
            page: 1,
            per_page: 15,
        };
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.map(|n| n * 2).items, vec![2, 4]);
    }

    #[test]
    fn page_window_clamps_inputs() {
        assert_eq!(page_window(0, 0, 100), (1, 1));
        assert_eq!(page_window(3, 500, 100), (3, 100));
    }

    #[test]
    fn storefront_actor_has_no_user_id() {
        assert_eq!(Actor::storefront().id, None);
        assert_eq!(Actor::user(4, "Ana").id, Some(4));
    }
}
