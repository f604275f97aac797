mod talent_dto;

pub use talent_dto::{
    normalize_skills, CreateTalentDto, ListTalentsQuery, RecommenderDto, SetFeaturedDto,
    TalentResponseDto, UpdateTalentDto,
};
