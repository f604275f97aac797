mod talent;

pub use talent::{Talent, TalentStatus};
