use crate::{config::Config, recorder::ResultRecorder};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub recorder: ResultRecorder,
    pub config: Config,
}

impl FromRef<AppState> for ResultRecorder {
    fn from_ref(state: &AppState) -> Self {
        state.recorder.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
