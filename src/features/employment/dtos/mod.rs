mod employment_dto;

pub use employment_dto::{
    CreateEmploymentDto, EmploymentAuthorDto, EmploymentResponseDto, ListEmploymentQuery,
    UpdateEmploymentDto,
};
