mod fixture;
mod h2h;
mod player;
mod team;

pub use fixture::*;
pub use h2h::*;
pub use player::*;
pub use team::*;
