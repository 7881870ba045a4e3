use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::data_types::ServerTemplateData;

/// Holds the active template snapshot. Readers take an `Arc` before
/// evaluating, so a concurrent `store` never changes what they see.
pub struct TemplateStore {
    cache: ArcSwapOption<ServerTemplateData>,
}

impl TemplateStore {
    pub fn new() -> TemplateStore {
        TemplateStore {
            cache: ArcSwapOption::empty(),
        }
    }

    pub fn load(&self) -> Option<Arc<ServerTemplateData>> {
        self.cache.load_full()
    }

    pub fn store(&self, template: ServerTemplateData) {
        self.cache.store(Some(Arc::new(template)));
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.load().is_some()
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}
