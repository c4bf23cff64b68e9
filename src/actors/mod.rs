mod card_actor;

pub use card_actor::{CardActor, CardCommand};
