use folio_client::{
    api::{Session, User},
    HttpApi,
};

mod storage;
mod ui;
mod util;

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<ui::App>::new().render();
}

/// Which backend to talk to, and as whom
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Backend {
    pub host: String,
    pub session: Option<Session>,
}

impl Backend {
    pub fn api(&self) -> HttpApi {
        HttpApi::new(self.host.clone()).with_token(self.session.as_ref().map(|s| s.token.clone()))
    }

    pub fn viewer(&self) -> Option<User> {
        self.session.as_ref().and_then(|s| s.user.clone())
    }
}
