mod close;
mod team;

pub use close::close;
pub use team::team;
