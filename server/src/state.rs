use matcher::Matcher;

use crate::user_store::UserStore;

pub struct AppState {
    pub store: UserStore,
    pub matcher: Matcher,
    /// Onboarded candidates loaded per discover request
    pub max_candidates: usize,
}
