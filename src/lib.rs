pub mod articles;
pub mod fetch;
pub mod style;
pub mod util;
pub mod warn;
pub mod webparts;
pub mod webutils;
