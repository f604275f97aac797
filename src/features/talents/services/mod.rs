mod talent_service;

pub use talent_service::TalentService;
