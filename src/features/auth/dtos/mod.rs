pub mod auth_dto;

pub use auth_dto::{DevCredentialsDto, LoginDto, LoginResponseDto, UpdateProfileDto};
