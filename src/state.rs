use std::sync::Arc;

use crate::evaluation::FlagEvaluator;
use crate::store::FlagStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FlagStore>,
    pub evaluator: FlagEvaluator,
}

impl AppState {
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        AppState {
            evaluator: FlagEvaluator::new(store.clone()),
            store,
        }
    }
}
