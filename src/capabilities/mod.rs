mod auth;
mod map;
mod store;

pub use self::auth::{Auth, AuthError, AuthOperation, AuthOutput, AuthResult};
pub use self::map::{Map, MapError, MapOperation, MapOutput, MapResult};
pub use self::store::{Store, StoreDoc, StoreError, StoreOperation, StoreOutput, StoreResult};

// Crux's built-in Render capability triggers view refreshes; nothing custom
// is needed for that concern.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

pub type AppAuth = Auth<Event>;
pub type AppMap = Map<Event>;
pub type AppRender = Render<Event>;
pub type AppStore = Store<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub store: Store<Event>,
    pub map: Map<Event>,
    pub auth: Auth<Event>,
}
