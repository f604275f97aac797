mod news_dto;

pub use news_dto::{CreateNewsDto, ListNewsQuery, NewsAuthorDto, NewsResponseDto, UpdateNewsDto};
