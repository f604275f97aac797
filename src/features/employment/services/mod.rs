mod employment_service;

pub use employment_service::EmploymentService;
