mod employment;

pub use employment::{Employment, EmploymentCategory, EmploymentTag};
