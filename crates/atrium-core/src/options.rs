//! Shared dropdown-option catalog.
//!
//! [`OptionCatalog`] owns every option list and is the only thing that
//! mutates them. Each mutation is persisted through an
//! [`OptionRepository`] and then published to all open subscriptions.
//! A view subscribes when it opens and unsubscribes by dropping its
//! [`OptionSubscription`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::error::{AtriumError, AtriumResult};
use crate::models::option_list::OptionList;
use crate::repository::OptionRepository;

/// Immutable view of all option lists, keyed by category.
pub type OptionSnapshot = Arc<BTreeMap<String, Vec<String>>>;

pub struct OptionCatalog<R: OptionRepository> {
    repo: R,
    state: watch::Sender<OptionSnapshot>,
    /// Serializes read-modify-persist cycles.
    write_lock: Mutex<()>,
}

impl<R: OptionRepository> OptionCatalog<R> {
    /// Build the catalog from whatever the repository currently holds.
    pub async fn load(repo: R) -> AtriumResult<Self> {
        let lists = repo.load_all().await?;
        let map: BTreeMap<String, Vec<String>> = lists
            .into_iter()
            .map(|list| (list.category, list.values))
            .collect();
        debug!(categories = map.len(), "Loaded option catalog");

        Ok(Self {
            repo,
            state: watch::Sender::new(Arc::new(map)),
            write_lock: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> OptionSnapshot {
        self.state.borrow().clone()
    }

    /// Values for `category`, empty if the category does not exist.
    pub fn values(&self, category: &str) -> Vec<String> {
        self.state
            .borrow()
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> OptionSubscription {
        OptionSubscription {
            rx: self.state.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    /// Replace the whole list for `category`. Blank values are dropped
    /// and duplicates collapsed, keeping first occurrence order.
    pub async fn replace(&self, category: &str, values: Vec<String>) -> AtriumResult<()> {
        let category = validate_category(category)?;
        let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim();
            if !value.is_empty() && !cleaned.iter().any(|v| v == value) {
                cleaned.push(value.to_string());
            }
        }

        let _guard = self.write_lock.lock().await;
        self.commit(category, cleaned).await
    }

    /// Append `value` to `category`. Returns `false` if it was already
    /// present.
    pub async fn add_value(&self, category: &str, value: &str) -> AtriumResult<bool> {
        let category = validate_category(category)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(AtriumError::Validation {
                message: "option value must not be blank".into(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut values = self.values(&category);
        if values.iter().any(|v| v == value) {
            return Ok(false);
        }
        values.push(value.to_string());
        self.commit(category, values).await?;
        Ok(true)
    }

    /// Remove `value` from `category`. Returns `false` if it was absent.
    pub async fn remove_value(&self, category: &str, value: &str) -> AtriumResult<bool> {
        let category = validate_category(category)?;

        let _guard = self.write_lock.lock().await;
        let mut values = self.values(&category);
        let before = values.len();
        values.retain(|v| v != value);
        if values.len() == before {
            return Ok(false);
        }
        self.commit(category, values).await?;
        Ok(true)
    }

    async fn commit(&self, category: String, values: Vec<String>) -> AtriumResult<()> {
        self.repo
            .save(OptionList {
                category: category.clone(),
                values: values.clone(),
            })
            .await?;

        let mut next = (**self.state.borrow()).clone();
        next.insert(category.clone(), values);
        self.state.send_replace(Arc::new(next));
        debug!(
            category = %category,
            subscribers = self.state.receiver_count(),
            "Published option change"
        );
        Ok(())
    }
}

fn validate_category(category: &str) -> AtriumResult<String> {
    let category = category.trim();
    if category.is_empty() {
        return Err(AtriumError::Validation {
            message: "option category must not be blank".into(),
        });
    }
    Ok(category.to_string())
}

/// A view's handle on the catalog. Dropping it unsubscribes.
pub struct OptionSubscription {
    rx: watch::Receiver<OptionSnapshot>,
}

impl OptionSubscription {
    pub fn current(&self) -> OptionSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published change. Returns `None` once the
    /// catalog has been dropped.
    pub async fn changed(&mut self) -> Option<OptionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
